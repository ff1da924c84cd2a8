use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{ApplicationFormPayload, ReceivedApplication},
    error::Result,
    middleware::auth::Viewer,
    models::application::{ApplicationStatus, ApplicationTable},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/jobs/{id}/apply",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 201, description = "Application submitted"),
        (status = 401, description = "Sign in required"),
        (status = 409, description = "Already applied")
    )
)]
#[axum::debug_handler]
pub async fn quick_apply(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let identity = viewer.require()?;
    let response = state.application_tracker.apply(identity, id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/jobs/{id}/applications",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 201, description = "Application submitted"),
        (status = 400, description = "Cover letter missing"),
        (status = 401, description = "Sign in required"),
        (status = 409, description = "Already applied")
    )
)]
#[axum::debug_handler]
pub async fn submit_application(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApplicationFormPayload>,
) -> Result<impl IntoResponse> {
    let identity = viewer.require()?;
    payload.validate()?;
    let response = state
        .application_tracker
        .submit_application(identity, id, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/jobs/{id}/save",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "New saved state"),
        (status = 401, description = "Sign in required")
    )
)]
#[axum::debug_handler]
pub async fn toggle_save(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let identity = viewer.require()?;
    let response = state.application_tracker.toggle_save(identity, id).await?;
    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/api/applications/{table}/{id}",
    params(
        ("table" = String, Path, description = "applications or job_applications"),
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application withdrawn"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path((table, id)): Path<(ApplicationTable, Uuid)>,
) -> Result<impl IntoResponse> {
    let identity = viewer.require()?;
    let response = state.application_tracker.withdraw(identity, table, id).await?;
    Ok(Json(response))
}

async fn triage(
    state: &AppState,
    viewer: &Viewer,
    table: ApplicationTable,
    id: Uuid,
    status: ApplicationStatus,
) -> Result<Json<ReceivedApplication>> {
    let identity = viewer.require()?;
    let updated = state
        .application_tracker
        .set_status(identity, table, id, status)
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    post,
    path = "/api/applications/{table}/{id}/review",
    params(
        ("table" = String, Path, description = "applications or job_applications"),
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses((status = 200, description = "Marked as under review"))
)]
#[axum::debug_handler]
pub async fn review(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path((table, id)): Path<(ApplicationTable, Uuid)>,
) -> Result<impl IntoResponse> {
    triage(&state, &viewer, table, id, ApplicationStatus::Reviewed).await
}

#[utoipa::path(
    post,
    path = "/api/applications/{table}/{id}/reject",
    params(
        ("table" = String, Path, description = "applications or job_applications"),
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses((status = 200, description = "Marked as rejected"))
)]
#[axum::debug_handler]
pub async fn reject(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path((table, id)): Path<(ApplicationTable, Uuid)>,
) -> Result<impl IntoResponse> {
    triage(&state, &viewer, table, id, ApplicationStatus::Rejected).await
}
