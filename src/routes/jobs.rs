use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::job_dto::{JobListQuery, PostJobPayload, QuoteQuery},
    error::Result,
    middleware::auth::Viewer,
    services::job_service::posting_quote,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/jobs",
    params(
        ("offset" = Option<i64>, Query, description = "Window start, a multiple of the page size"),
        ("type" = Option<String>, Query, description = "Filter by job type"),
        ("remote" = Option<bool>, Query, description = "Only remote jobs")
    ),
    responses(
        (status = 200, description = "One page of job cards"),
        (status = 502, description = "A later page could not be loaded")
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.listing_service.page(&viewer.caller(), &query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/jobs/quote",
    params(("featured" = Option<bool>, Query, description = "Featured listing add-on")),
    responses((status = 200, description = "Posting price in dollars"))
)]
#[axum::debug_handler]
pub async fn quote(Query(query): Query<QuoteQuery>) -> Result<impl IntoResponse> {
    Ok(Json(posting_quote(query.featured)))
}

#[utoipa::path(
    post,
    path = "/api/jobs",
    responses(
        (status = 201, description = "Job posted"),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Sign in required")
    )
)]
#[axum::debug_handler]
pub async fn post_job(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Json(payload): Json<PostJobPayload>,
) -> Result<impl IntoResponse> {
    let identity = viewer.require()?;
    payload.validate()?;
    let job = state.job_service.post(identity, &payload).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job details"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn job_details(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let details = state.job_service.details(&viewer, id).await?;
    Ok(Json(details))
}

#[utoipa::path(
    patch,
    path = "/api/jobs/{id}/status",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Status toggled"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn toggle_job_status(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let identity = viewer.require()?;
    let status = state.job_service.toggle_status(identity, id).await?;
    Ok(Json(status))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}/company",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses((status = 200, description = "Company profile route"))
)]
#[axum::debug_handler]
pub async fn company_link(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let link = state.job_service.company_link(&viewer, id).await?;
    Ok(Json(link))
}
