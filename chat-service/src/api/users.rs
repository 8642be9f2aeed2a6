//! `/users` endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
};
use uuid::Uuid;

use crate::domain::{LoginInput, LoginOutput, RegisterUserInput, UpdateUserInput, User};
use crate::error::ErrorResponse;
use crate::handlers::{
    ApiError, BaseResponse, Created, PageQuery, PaginationResponse, ValidatedJson,
};
use crate::middleware::Claims;
use crate::query::FilterInput;
use crate::state::AppState;

/// Register a user and its personnel record
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = RegisterUserInput,
    responses(
        (status = 201, description = "User registered", body = BaseResponse<User>),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 409, description = "User name taken", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RegisterUserInput>,
) -> Result<Created<User>, ApiError> {
    let user = state.users().register(input).await?;
    let location = format!("/api/v1/users/{}", user.id);
    Ok(Created::new(user).with_location(location))
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    tag = "users",
    request_body = LoginInput,
    responses(
        (status = 200, description = "Token issued", body = BaseResponse<LoginOutput>),
        (status = 401, description = "Bad credentials", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<LoginInput>,
) -> Result<BaseResponse<LoginOutput>, ApiError> {
    Ok(BaseResponse::new(state.users().login(input).await?))
}

/// Find a user by id
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, body = BaseResponse<User>),
        (status = 404, body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn find_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<BaseResponse<User>, ApiError> {
    Ok(BaseResponse::new(state.users().find_by_id(id).await?))
}

/// Find a user by user name
#[utoipa::path(
    get,
    path = "/api/v1/users/username/{username}",
    tag = "users",
    params(("username" = String, Path, description = "E.164 user name")),
    responses(
        (status = 200, body = BaseResponse<User>),
        (status = 404, body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn find_by_user_name(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<BaseResponse<User>, ApiError> {
    Ok(BaseResponse::new(
        state.users().find_by_user_name(&username).await?,
    ))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserInput,
    responses(
        (status = 200, body = BaseResponse<User>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<UpdateUserInput>,
) -> Result<BaseResponse<User>, ApiError> {
    Ok(BaseResponse::new(state.users().update(id, input).await?))
}

/// Soft delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
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
    state.users().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Filter users of the caller's organization
#[utoipa::path(
    post,
    path = "/api/v1/users/filter",
    tag = "users",
    params(PageQuery),
    request_body = FilterInput,
    responses(
        (status = 200, body = PaginationResponse<User>),
        (status = 400, body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn filter(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(page): Query<PageQuery>,
    ValidatedJson(input): ValidatedJson<FilterInput>,
) -> Result<PaginationResponse<User>, ApiError> {
    let result = state
        .users()
        .filter(claims.organization_id(), input, &page.to_options())
        .await?;
    Ok(PaginationResponse::new(result.items, result.total, &page)
        .with_associations(result.associations))
}
