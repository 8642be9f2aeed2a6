//! OpenAPI document
//!
//! Generated by utoipa from the route annotations in [`crate::api`]; served
//! by the Swagger UI in [`crate::docs`].

use utoipa::openapi::{server::ServerBuilder, OpenApi as OpenApiDoc};
use utoipa::{Modify, OpenApi};

use crate::api::{messages, personnel, users};
use crate::config::DocsConfig;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chat APP",
        description = "Users, personnel and messages with filter, sort and pagination"
    ),
    paths(
        users::register,
        users::login,
        users::find_by_id,
        users::find_by_user_name,
        users::update,
        users::delete,
        users::filter,
        personnel::find_by_id,
        personnel::filter,
        personnel::create,
        personnel::update,
        personnel::delete,
        messages::list,
        messages::find_by_id,
        messages::create,
        messages::update,
        messages::update_status,
        messages::filter,
        messages::delete,
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "users", description = "Registration, login and user accounts"),
        (name = "personnel", description = "Personnel records"),
        (name = "messages", description = "Messages and delivery status"),
    )
)]
struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut OpenApiDoc) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("bearer_auth", security::bearer_auth());
    }
}

/// The API document, advertising `host_url` under each configured scheme
pub fn api_doc(config: &DocsConfig) -> OpenApiDoc {
    let mut openapi = ApiDoc::openapi();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();

    if !config.host_url.is_empty() {
        let servers = config
            .schemes
            .iter()
            .map(|scheme| scheme.trim())
            .filter(|scheme| !scheme.is_empty())
            .map(|scheme| {
                ServerBuilder::new()
                    .url(format!("{}://{}", scheme, config.host_url))
                    .build()
            })
            .collect::<Vec<_>>();
        if !servers.is_empty() {
            openapi.servers = Some(servers);
        }
    }

    openapi
}

/// OpenAPI security scheme helpers
pub mod security {
    use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

    /// Create a Bearer token security scheme (for JWT)
    pub fn bearer_auth() -> SecurityScheme {
        SecurityScheme::Http(
            HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("JWT")
                .build(),
        )
    }
}
