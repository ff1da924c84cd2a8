use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::session_dto::{ForgotPasswordPayload, ResetPasswordPayload, SignInPayload, SignUpPayload},
    error::Result,
    middleware::auth::Viewer,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/sign-in",
    responses(
        (status = 200, description = "Signed in"),
        (status = 401, description = "Invalid login credentials")
    )
)]
#[axum::debug_handler]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let response = state.session.sign_in(&payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/sign-up",
    responses(
        (status = 201, description = "Account created"),
        (status = 409, description = "Email already registered")
    )
)]
#[axum::debug_handler]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let response = state.session.sign_up(&payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/auth/sign-out",
    responses(
        (status = 200, description = "Signed out, redirect to home"),
        (status = 401, description = "Not signed in")
    )
)]
#[axum::debug_handler]
pub async fn sign_out(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
) -> Result<impl IntoResponse> {
    let identity = viewer.require()?;
    let response = state.session.sign_out(identity).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    responses((status = 200, description = "Reset email requested"))
)]
#[axum::debug_handler]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let response = state.session.request_password_reset(&payload.email).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    responses(
        (status = 200, description = "Password updated"),
        (status = 401, description = "Recovery session required")
    )
)]
#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<impl IntoResponse> {
    let identity = viewer.require()?;
    payload.validate()?;
    let response = state.session.reset_password(identity, &payload.password).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/session",
    responses((status = 200, description = "Current session, profile and navigation"))
)]
#[axum::debug_handler]
pub async fn current_session(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
) -> Result<impl IntoResponse> {
    let view = state.session.view(&viewer).await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/api/session/refresh",
    responses(
        (status = 200, description = "Profile reloaded"),
        (status = 401, description = "Not signed in")
    )
)]
#[axum::debug_handler]
pub async fn refresh_session(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
) -> Result<impl IntoResponse> {
    let identity = viewer.require()?;
    state.session.refresh(identity).await?;
    let view = state.session.view(&viewer).await?;
    Ok(Json(view))
}
