//! REST API under `/api/v1`
//!
//! Registration and login are public; every other route requires a bearer
//! token and sees the caller's [`Claims`](crate::middleware::Claims).

pub mod messages;
pub mod personnel;
pub mod users;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::docs::{self, DocsState};
use crate::middleware::JwtAuth;
use crate::openapi;
use crate::state::AppState;

/// Version prefix of every API route
pub const API_PREFIX: &str = "/api/v1";

/// Build the API router
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/users", post(users::register))
        .route("/users/login", post(users::login));

    let protected = Router::new()
        .route("/users/filter", post(users::filter))
        .route("/users/username/{username}", get(users::find_by_user_name))
        .route(
            "/users/{id}",
            get(users::find_by_id).put(users::update).delete(users::delete),
        )
        .route("/personnel", post(personnel::create))
        .route("/personnel/filter", post(personnel::filter))
        .route(
            "/personnel/{id}",
            get(personnel::find_by_id)
                .put(personnel::update)
                .delete(personnel::delete),
        )
        .route("/messages", get(messages::list).post(messages::create))
        .route("/messages/filter", post(messages::filter))
        .route(
            "/messages/{id}",
            get(messages::find_by_id)
                .put(messages::update)
                .delete(messages::delete),
        )
        .route("/messages/{id}/status", put(messages::update_status))
        .route_layer(middleware::from_fn_with_state(
            state.jwt().clone(),
            JwtAuth::middleware,
        ));

    Router::new()
        .nest(API_PREFIX, public.merge(protected))
        .with_state(state)
}

/// Build the whole application: the API plus, when enabled, the docs
pub fn app(state: AppState) -> Router {
    let docs_config = state.config().docs.clone();
    let api = router(state.clone());
    if !docs_config.enabled {
        return api;
    }

    let openapi = openapi::api_doc(&docs_config);
    let docs_state = DocsState::new(docs_config, state.docs_sessions().clone());
    api.merge(docs::router(docs_state, openapi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtIssuer, TokenGenerator};
    use crate::middleware::Claims;
    use crate::state::test_state;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    fn json(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let response = router(test_state())
            .oneshot(
                Request::get(format!("/api/v1/users/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_filter_requires_token() {
        let response = router(test_state())
            .oneshot(json("POST", "/api/v1/messages/filter", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_is_public_and_validated() {
        let response = router(test_state())
            .oneshot(json(
                "POST",
                "/api/v1/users",
                r#"{"first_name":"","last_name":"Doe","user_name":"12345","role":"KING","password":"secret"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["fields"].as_array().unwrap().len() >= 3);
    }

    #[tokio::test]
    async fn test_login_rejects_malformed_body() {
        let response = router(test_state())
            .oneshot(json("POST", "/api/v1/users/login", "{"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_app_serves_docs_login() {
        let response = app(test_state())
            .oneshot(Request::get("/login").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_status_update_is_validated_after_auth() {
        let state = test_state();
        let token = JwtIssuer::new(&state.config().jwt)
            .unwrap()
            .generate_token(&Claims::new(Uuid::new_v4(), "USER", None))
            .unwrap();

        let mut request = json(
            "PUT",
            &format!("/api/v1/messages/{}/status", Uuid::new_v4()),
            r#"{"m_status":"Lost"}"#,
        );
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );

        let response = router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_filter_rejects_unknown_operator() {
        let state = test_state();
        let token = JwtIssuer::new(&state.config().jwt)
            .unwrap()
            .generate_token(&Claims::new(Uuid::new_v4(), "ADMIN", None))
            .unwrap();

        let mut request = json(
            "POST",
            "/api/v1/users/filter",
            r#"{"fields":[{"field":"role","operator":"contains","value":"ADMIN"}]}"#,
        );
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );

        let response = router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["fields"].as_array().unwrap().len(), 1);
    }
}
