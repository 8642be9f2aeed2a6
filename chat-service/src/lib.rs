//! # chat-service
//!
//! Multi-tenant chat backend: user accounts, personnel records and messages
//! over PostgreSQL, with a dynamic filter, sort and pagination query builder.
//!
//! ## Layout
//!
//! - [`query`]: predicate compiler, sort/pagination composer and column allow-lists
//! - [`repository`]: typed repositories with association loading and soft delete
//! - [`transaction`]: explicit units of work shared by composite writes
//! - [`service`]: business operations over the repositories
//! - [`api`]: axum routes under `/api/v1`, guarded by JWT
//! - [`docs`]: Swagger UI behind a session login
//!
//! ## Example
//!
//! ```rust,no_run
//! use chat_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let pool = create_pool(&config.database).await?;
//!     run_migrations(&pool).await?;
//!
//!     let state = AppState::builder()
//!         .config(config.clone())
//!         .pool(pool)
//!         .build()?;
//!
//!     Server::new(config).serve(app(state)).await
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod docs;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod openapi;
pub mod query;
pub mod repository;
pub mod server;
pub mod service;
pub mod state;
pub mod transaction;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::api::app;
    pub use crate::config::Config;
    pub use crate::database::{create_pool, run_migrations};
    pub use crate::error::{Error, Result};
    pub use crate::observability::{init_tracing, shutdown_tracing};
    pub use crate::server::Server;
    pub use crate::state::AppState;
}
