pub mod applications;
pub mod auth;
pub mod companies;
pub mod dashboard;
pub mod health;
pub mod jobs;
pub mod navigation;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::{auth::resolve_viewer, cors::site_cors};
use crate::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/sign-out", post(auth::sign_out))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/session", get(auth::current_session))
        .route("/session/refresh", post(auth::refresh_session))
        .route("/jobs", get(jobs::list_jobs).post(jobs::post_job))
        .route("/jobs/quote", get(jobs::quote))
        .route("/jobs/:id", get(jobs::job_details))
        .route("/jobs/:id/status", patch(jobs::toggle_job_status))
        .route("/jobs/:id/company", get(jobs::company_link))
        .route("/jobs/:id/apply", post(applications::quick_apply))
        .route("/jobs/:id/applications", post(applications::submit_application))
        .route("/jobs/:id/save", post(applications::toggle_save))
        .route(
            "/applications/:table/:id",
            axum::routing::delete(applications::withdraw),
        )
        .route("/applications/:table/:id/review", post(applications::review))
        .route("/applications/:table/:id/reject", post(applications::reject))
        .route("/companies", get(companies::list_companies))
        .route("/companies/:id", get(companies::company_details))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/profile", patch(dashboard::update_profile))
        .route("/routes/resolve", get(navigation::resolve_route))
}

/// The full application router, shared by the binary and the integration tests.
pub fn app_router(state: AppState) -> Router {
    let cors = site_cors(state.site_url.as_deref());
    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api_router())
        .layer(from_fn_with_state(state.clone(), resolve_viewer))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
