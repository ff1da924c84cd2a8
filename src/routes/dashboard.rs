use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::dashboard_dto::ProfileUpdatePayload, error::Result, middleware::auth::Viewer, AppState,
};

#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Job seeker or employer dashboard"),
        (status = 401, description = "Sign in required"),
        (status = 404, description = "No profile for this account")
    )
)]
#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
) -> Result<impl IntoResponse> {
    let identity = viewer.require()?;
    let dashboard = state.dashboard_service.dashboard(identity).await?;
    Ok(Json(dashboard))
}

#[utoipa::path(
    patch,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile updated"),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Sign in required")
    )
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Json(payload): Json<ProfileUpdatePayload>,
) -> Result<impl IntoResponse> {
    let identity = viewer.require()?;
    payload.validate()?;
    let response = state
        .dashboard_service
        .update_profile(identity, payload)
        .await?;
    Ok(Json(response))
}
