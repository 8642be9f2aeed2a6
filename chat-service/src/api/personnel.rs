//! `/personnel` endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
};
use uuid::Uuid;

use crate::domain::{CreatePersonnelInput, Personnel, UpdatePersonnelInput};
use crate::error::ErrorResponse;
use crate::handlers::{
    ApiError, BaseResponse, Created, PageQuery, PaginationResponse, ValidatedJson,
};
use crate::middleware::Claims;
use crate::query::FilterInput;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/personnel/{id}",
    tag = "personnel",
    params(("id" = Uuid, Path, description = "Personnel id")),
    responses(
        (status = 200, body = BaseResponse<Personnel>),
        (status = 404, body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn find_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<BaseResponse<Personnel>, ApiError> {
    Ok(BaseResponse::new(state.personnel().find_by_id(id).await?))
}

/// Filter personnel of the caller's organization
#[utoipa::path(
    post,
    path = "/api/v1/personnel/filter",
    tag = "personnel",
    params(PageQuery),
    request_body = FilterInput,
    responses(
        (status = 200, body = PaginationResponse<Personnel>),
        (status = 400, body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn filter(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(page): Query<PageQuery>,
    ValidatedJson(input): ValidatedJson<FilterInput>,
) -> Result<PaginationResponse<Personnel>, ApiError> {
    let result = state
        .personnel()
        .filter(claims.organization_id(), input, &page.to_options())
        .await?;
    Ok(PaginationResponse::new(result.items, result.total, &page)
        .with_associations(result.associations))
}

/// Create a personnel record in the caller's organization
#[utoipa::path(
    post,
    path = "/api/v1/personnel",
    tag = "personnel",
    request_body = CreatePersonnelInput,
    responses(
        (status = 201, body = BaseResponse<Personnel>),
        (status = 400, body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(input): ValidatedJson<CreatePersonnelInput>,
) -> Result<Created<Personnel>, ApiError> {
    let personnel = state
        .personnel()
        .create(claims.organization_id(), input)
        .await?;
    let location = format!("/api/v1/personnel/{}", personnel.id);
    Ok(Created::new(personnel).with_location(location))
}

/// Update the non-empty fields of a personnel record
#[utoipa::path(
    put,
    path = "/api/v1/personnel/{id}",
    tag = "personnel",
    params(("id" = Uuid, Path, description = "Personnel id")),
    request_body = UpdatePersonnelInput,
    responses(
        (status = 200, body = BaseResponse<Personnel>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<UpdatePersonnelInput>,
) -> Result<BaseResponse<Personnel>, ApiError> {
    Ok(BaseResponse::new(
        state.personnel().update(id, input).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/personnel/{id}",
    tag = "personnel",
    params(("id" = Uuid, Path, description = "Personnel id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.personnel().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
