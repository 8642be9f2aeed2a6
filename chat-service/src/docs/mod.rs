//! Swagger UI behind a login form
//!
//! `GET /` and `GET /login` render the form, `POST /authenticate` checks the
//! configured docs credentials and sets a session cookie. The Swagger UI and
//! the OpenAPI document redirect to the form without a live session.

pub mod login;
pub mod session;

pub use login::{LoginForm, LOGIN_PATH, SESSION_COOKIE, SWAGGER_UI_PATH};
pub use session::DocsSessionStore;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::DocsConfig;

/// Path of the served OpenAPI document
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// State of the docs routes
#[derive(Clone)]
pub struct DocsState {
    config: Arc<DocsConfig>,
    sessions: DocsSessionStore,
}

impl DocsState {
    /// Create the state from the docs configuration and a session store
    pub fn new(config: DocsConfig, sessions: DocsSessionStore) -> Self {
        Self {
            config: Arc::new(config),
            sessions,
        }
    }
}

/// Build the docs router serving `openapi`
pub fn router(state: DocsState, openapi: utoipa::openapi::OpenApi) -> Router {
    if !state.config.has_credentials() {
        tracing::warn!("docs username or password not configured, docs login will always fail");
    }

    let swagger: Router = SwaggerUi::new("/swagger-ui")
        .url(OPENAPI_PATH, openapi)
        .into();
    let guarded = swagger.layer(middleware::from_fn_with_state(
        state.clone(),
        login::require_session,
    ));

    Router::new()
        .route("/", get(login::login_page))
        .route(LOGIN_PATH, get(login::login_page))
        .route("/authenticate", post(login::authenticate))
        .with_state(state)
        .merge(guarded)
}
