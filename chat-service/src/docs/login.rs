//! Login form in front of the Swagger UI

use axum::{
    extract::{Form, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::DocsState;

/// Name of the docs session cookie
pub const SESSION_COOKIE: &str = "chat-service-docs-session";

/// Where a logged in user is sent
pub const SWAGGER_UI_PATH: &str = "/swagger-ui/";

/// Where an anonymous user is sent
pub const LOGIN_PATH: &str = "/login";

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Docs login form fields
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    #[serde(rename = "swaggerUsername", default)]
    pub username: String,
    #[serde(rename = "swaggerPassword", default)]
    pub password: String,
}

/// `GET /` and `GET /login`
///
/// A valid session goes straight to the Swagger UI.
pub async fn login_page(State(state): State<DocsState>, headers: HeaderMap) -> Response {
    if has_session(&state, &headers) {
        return Redirect::permanent(SWAGGER_UI_PATH).into_response();
    }
    Html(render_login_page(None)).into_response()
}

/// `POST /authenticate`
pub async fn authenticate(
    State(state): State<DocsState>,
    Form(form): Form<LoginForm>,
) -> Response {
    let accepted = state.config.has_credentials()
        && form.username == state.config.username
        && form.password == state.config.password;

    if !accepted {
        tracing::warn!(username = %form.username, "docs login rejected");
        return (
            StatusCode::UNAUTHORIZED,
            Html(render_login_page(Some(INVALID_CREDENTIALS))),
        )
            .into_response();
    }

    let purged = state.sessions.purge_expired();
    if purged > 0 {
        tracing::debug!(purged, "expired docs sessions purged");
    }

    let token = state.sessions.create();
    let cookie = session_cookie(
        &token,
        state.sessions.ttl().as_secs(),
        state.config.secure_cookie,
    );

    (
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Redirect::to(SWAGGER_UI_PATH),
    )
        .into_response()
}

/// Send requests without a live docs session to the login page
pub async fn require_session(
    State(state): State<DocsState>,
    request: Request,
    next: Next,
) -> Response {
    if has_session(&state, request.headers()) {
        return next.run(request).await;
    }
    Redirect::temporary(LOGIN_PATH).into_response()
}

fn has_session(state: &DocsState, headers: &HeaderMap) -> bool {
    cookie_value(headers, SESSION_COOKIE).is_some_and(|token| state.sessions.validate(token))
}

/// Value of the cookie `name` across all `Cookie` headers
pub fn cookie_value<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

fn session_cookie(token: &str, max_age_secs: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn render_login_page(error: Option<&str>) -> String {
    let notice = error
        .map(|message| format!(r#"<p class="error">{}</p>"#, message))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Login</title>
    <style>
        body {{ background: #e2e2e2; font-family: sans-serif; }}
        main {{ width: 360px; margin: 10vh auto; padding: 1em 2em; background: #fff; border-bottom: 2px solid #ccc; }}
        label, input {{ display: block; width: 100%; margin-bottom: 0.75em; }}
        .error {{ color: red; }}
    </style>
</head>
<body>
<main>
    <h3>Login</h3>
    {}
    <form action="/authenticate" method="POST">
        <label for="swaggerUsername">Username</label>
        <input id="swaggerUsername" name="swaggerUsername" placeholder="Username">
        <label for="swaggerPassword">Password</label>
        <input id="swaggerPassword" name="swaggerPassword" placeholder="Password" type="password">
        <button type="submit">Login</button>
    </form>
</main>
</body>
</html>"#,
        notice
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("a=1; chat-service-docs-session=abc"),
        );

        assert_eq!(cookie_value(&headers, SESSION_COOKIE), Some("abc"));
        assert_eq!(cookie_value(&headers, "theme"), Some("dark"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc", 86400, true);
        assert!(cookie.starts_with("chat-service-docs-session=abc;"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(cookie.ends_with("; Secure"));
        assert!(!session_cookie("abc", 60, false).contains("Secure"));
    }

    #[test]
    fn test_login_page_shows_error() {
        assert!(!render_login_page(None).contains(INVALID_CREDENTIALS));
        assert!(render_login_page(Some(INVALID_CREDENTIALS)).contains(INVALID_CREDENTIALS));
    }
}
