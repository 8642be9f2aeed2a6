//! Response envelopes for REST handlers
//!
//! Single records are wrapped in [`BaseResponse`], filter results in
//! [`PaginationResponse`], and creations in [`Created`] which adds the
//! `Location` header.
//!
//! # Example
//!
//! ```rust
//! use chat_service::handlers::{BaseResponse, PageQuery, PaginationResponse};
//!
//! let single = BaseResponse::new("hello");
//! assert_eq!(single.data, "hello");
//!
//! let page = PaginationResponse::new(vec![1, 2, 3], 10, &PageQuery::default());
//! assert_eq!(page.size, 500);
//! assert_eq!(page.page, 0);
//! ```

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::query::PageQuery;
use crate::repository::Associations;

/// Envelope for a single record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct BaseResponse<T> {
    /// The record
    pub data: T,
}

impl<T> BaseResponse<T> {
    /// Wrap `data`
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for BaseResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Envelope for one page of a filter result
///
/// `size` and `page` echo the effective values after clamping, not the raw
/// query string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct PaginationResponse<T> {
    /// Rows of the requested page
    pub data: Vec<T>,
    /// Rows matching the filter across all pages
    pub total: i64,
    /// Effective page size
    pub size: i64,
    /// Effective zero based page number
    pub page: i64,
    /// Loaded associations keyed by name
    #[serde(default, skip_serializing_if = "Associations::is_empty")]
    #[schema(value_type = Object)]
    pub associations: Associations,
}

impl<T> PaginationResponse<T> {
    /// Page of `data` out of `total` rows, echoing the effective paging of `query`
    pub fn new(data: Vec<T>, total: i64, query: &PageQuery) -> Self {
        Self {
            data,
            total,
            size: query.page_size(),
            page: query.page_number(),
            associations: Associations::new(),
        }
    }

    /// Attach loaded associations
    #[must_use]
    pub fn with_associations(mut self, associations: Associations) -> Self {
        self.associations = associations;
        self
    }
}

impl<T: Serialize> IntoResponse for PaginationResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// HTTP 201 Created wrapping the record in a [`BaseResponse`]
#[derive(Debug)]
pub struct Created<T> {
    data: T,
    location: Option<String>,
}

impl<T> Created<T> {
    /// Created response for `data`
    pub fn new(data: T) -> Self {
        Self {
            data,
            location: None,
        }
    }

    /// Add a Location header pointing to the created resource
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        let mut response =
            (StatusCode::CREATED, Json(BaseResponse::new(&self.data))).into_response();

        if let Some(location) = self.location {
            if let Ok(value) = HeaderValue::from_str(&location) {
                response.headers_mut().insert(header::LOCATION, value);
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_response_shape() {
        let body = serde_json::to_value(BaseResponse::new(json!({"id": 1}))).unwrap();
        assert_eq!(body, json!({"data": {"id": 1}}));
    }

    #[test]
    fn test_pagination_echoes_effective_paging() {
        let query = PageQuery {
            page: Some("-4".to_string()),
            size: Some("900".to_string()),
            ..Default::default()
        };
        let page = PaginationResponse::new(vec!["a"], 1, &query);
        assert_eq!(page.size, 500);
        assert_eq!(page.page, 0);
    }

    #[test]
    fn test_associations_omitted_when_empty() {
        let page = PaginationResponse::new(Vec::<i32>::new(), 0, &PageQuery::default());
        let body = serde_json::to_value(&page).unwrap();
        assert!(body.get("associations").is_none());

        let mut associations = Associations::new();
        associations.insert("user".to_string(), vec![json!({"id": 1})]);
        let body = serde_json::to_value(page.with_associations(associations)).unwrap();
        assert_eq!(body["associations"]["user"][0]["id"], 1);
    }

    #[test]
    fn test_created_sets_location() {
        let response = Created::new(json!({"id": 7}))
            .with_location("/api/v1/messages/7")
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/api/v1/messages/7"
        );
    }
}
