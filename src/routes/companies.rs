use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;

use crate::{dto::company_dto::CompanyListQuery, error::Result, middleware::auth::Viewer, AppState};

#[utoipa::path(
    get,
    path = "/api/companies",
    params(
        ("search" = Option<String>, Query, description = "Name or description contains"),
        ("industry" = Option<String>, Query, description = "Filter by industry"),
        ("size" = Option<String>, Query, description = "Filter by head-count bucket")
    ),
    responses((status = 200, description = "Company directory"))
)]
#[axum::debug_handler]
pub async fn list_companies(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Query(query): Query<CompanyListQuery>,
) -> Result<impl IntoResponse> {
    let directory = state
        .company_service
        .directory(&viewer.caller(), &query)
        .await?;
    Ok(Json(directory))
}

#[utoipa::path(
    get,
    path = "/api/companies/{id}",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company with its jobs"),
        (status = 404, description = "Company not found")
    )
)]
#[axum::debug_handler]
pub async fn company_details(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let details = state.company_service.details(&viewer.caller(), id).await?;
    Ok(Json(details))
}
