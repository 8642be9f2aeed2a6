//! `/messages` endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
};
use uuid::Uuid;

use crate::domain::{
    CreateMessageInput, Message, MessageQuery, MessageStatus, UpdateMessageInput,
    UpdateMessageStatusInput,
};
use crate::error::ErrorResponse;
use crate::handlers::{
    ApiError, BaseResponse, Created, PageQuery, PaginationResponse, ValidatedJson,
};
use crate::middleware::Claims;
use crate::query::FilterInput;
use crate::state::AppState;

/// All messages, or those of one sender or receiver
#[utoipa::path(
    get,
    path = "/api/v1/messages",
    tag = "messages",
    params(MessageQuery),
    responses((status = 200, body = BaseResponse<Vec<Message>>)),
    security(("bearer_auth" = []))
)]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> Result<BaseResponse<Vec<Message>>, ApiError> {
    Ok(BaseResponse::new(state.messages().list(&query).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/messages/{id}",
    tag = "messages",
    params(("id" = Uuid, Path, description = "Message id")),
    responses(
        (status = 200, body = BaseResponse<Message>),
        (status = 404, body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn find_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<BaseResponse<Message>, ApiError> {
    Ok(BaseResponse::new(state.messages().find_by_id(id).await?))
}

/// Send a message; its status starts as `Sent`
#[utoipa::path(
    post,
    path = "/api/v1/messages",
    tag = "messages",
    request_body = CreateMessageInput,
    responses(
        (status = 201, body = BaseResponse<Message>),
        (status = 400, body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateMessageInput>,
) -> Result<Created<Message>, ApiError> {
    let message = state.messages().create(input).await?;
    let location = format!("/api/v1/messages/{}", message.id);
    Ok(Created::new(message).with_location(location))
}

#[utoipa::path(
    put,
    path = "/api/v1/messages/{id}",
    tag = "messages",
    params(("id" = Uuid, Path, description = "Message id")),
    request_body = UpdateMessageInput,
    responses(
        (status = 200, body = BaseResponse<Message>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<UpdateMessageInput>,
) -> Result<BaseResponse<Message>, ApiError> {
    Ok(BaseResponse::new(state.messages().update(id, input).await?))
}

/// Move a message to `Sent`, `Delivered` or `Read`
#[utoipa::path(
    put,
    path = "/api/v1/messages/{id}/status",
    tag = "messages",
    params(("id" = Uuid, Path, description = "Message id")),
    request_body = UpdateMessageStatusInput,
    responses(
        (status = 200, body = BaseResponse<MessageStatus>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<UpdateMessageStatusInput>,
) -> Result<BaseResponse<MessageStatus>, ApiError> {
    Ok(BaseResponse::new(
        state.messages().update_status(id, input).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/messages/filter",
    tag = "messages",
    params(PageQuery),
    request_body = FilterInput,
    responses(
        (status = 200, body = PaginationResponse<Message>),
        (status = 400, body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn filter(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(page): Query<PageQuery>,
    ValidatedJson(input): ValidatedJson<FilterInput>,
) -> Result<PaginationResponse<Message>, ApiError> {
    let result = state
        .messages()
        .filter(claims.organization_id(), input, &page.to_options())
        .await?;
    Ok(PaginationResponse::new(result.items, result.total, &page)
        .with_associations(result.associations))
}

/// Soft delete a message and its status rows
#[utoipa::path(
    delete,
    path = "/api/v1/messages/{id}",
    tag = "messages",
    params(("id" = Uuid, Path, description = "Message id")),
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
    state.messages().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
