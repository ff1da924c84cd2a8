pub mod backend;
pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::backend::{memory::InMemoryBackend, supabase::SupabaseBackend, Backend};
use crate::config::{BackendProvider, Config};
use crate::error::Result;
use crate::middleware::auth::TokenVerifier;
use crate::services::{
    application_service::ApplicationTracker, company_service::CompanyService,
    dashboard_service::DashboardService, job_service::JobService,
    listing_service::ListingService,
    session_service::{SessionEvent, SessionProvider},
};

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub backend_name: &'static str,
    pub site_url: Option<String>,
    pub token_verifier: TokenVerifier,
    pub session: SessionProvider,
    pub listing_service: ListingService,
    pub job_service: JobService,
    pub application_tracker: ApplicationTracker,
    pub company_service: CompanyService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub fn new(config: &Config, backend: Arc<dyn Backend>) -> Self {
        let backend_name = match config.backend_provider {
            BackendProvider::Supabase => "supabase",
            BackendProvider::Memory => "memory",
        };
        let token_verifier =
            TokenVerifier::new(&config.baas_jwt_secret, &config.baas_jwt_audience);
        let session = SessionProvider::new(backend.clone(), config.site_url.clone());
        let application_tracker = ApplicationTracker::new(backend.clone());
        let listing_service = ListingService::new(backend.clone());
        let job_service = JobService::new(backend.clone(), application_tracker.clone());
        let company_service = CompanyService::new(backend.clone());
        let dashboard_service = DashboardService::new(
            backend.clone(),
            session.clone(),
            application_tracker.clone(),
        );

        Self {
            backend,
            backend_name,
            site_url: config.site_url.clone(),
            token_verifier,
            session,
            listing_service,
            job_service,
            application_tracker,
            company_service,
            dashboard_service,
        }
    }

    /// Forwards sign-outs to the per-user application cache.
    pub fn watch_sessions(&self) -> JoinHandle<()> {
        let mut events = self.session.subscribe();
        let tracker = self.application_tracker.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(SessionEvent::SignedOut { user_id }) => tracker.forget(user_id).await,
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Session listener lagged behind");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

pub fn build_backend(config: &Config) -> Result<Arc<dyn Backend>> {
    let backend: Arc<dyn Backend> = match config.backend_provider {
        BackendProvider::Supabase => Arc::new(SupabaseBackend::from_config(config)?),
        BackendProvider::Memory => Arc::new(InMemoryBackend::new(
            config.baas_jwt_secret.clone(),
            config.baas_jwt_audience.clone(),
        )),
    };
    Ok(backend)
}
