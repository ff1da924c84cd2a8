use jobconnect_backend::{
    build_backend,
    config::{get_config, init_config},
    routes::app_router,
    AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("jobconnect_backend=info,tower_http=info")),
        )
        .init();

    init_config()?;
    let config = get_config()?;

    let backend = build_backend(config)?;
    let app_state = AppState::new(config, backend);
    app_state.watch_sessions();

    info!(backend = app_state.backend_name, "Backend provider selected");

    let app = app_router(app_state);

    let addr: SocketAddr = config.server_address.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
