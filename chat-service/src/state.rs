//! Application state management

use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    auth::{JwtIssuer, PasswordHasher},
    config::Config,
    docs::DocsSessionStore,
    error::{Error, Result},
    middleware::JwtAuth,
    repository::{MessageRepository, PersonnelRepository, UserRepository},
    service::{MessageService, PersonnelService, UserService},
    transaction::Transactioner,
};

/// Application state shared across handlers
///
/// Everything inside is reference counted, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    pool: PgPool,
    users: UserService,
    personnel: PersonnelService,
    messages: MessageService,
    jwt: JwtAuth,
    docs_sessions: DocsSessionStore,
}

impl AppState {
    /// Create a new builder for AppState
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the database pool
    pub fn db(&self) -> &PgPool {
        &self.pool
    }

    /// User accounts
    pub fn users(&self) -> &UserService {
        &self.users
    }

    /// Personnel records
    pub fn personnel(&self) -> &PersonnelService {
        &self.personnel
    }

    /// Messages
    pub fn messages(&self) -> &MessageService {
        &self.messages
    }

    /// Bearer token validation
    pub fn jwt(&self) -> &JwtAuth {
        &self.jwt
    }

    /// Docs login sessions
    pub fn docs_sessions(&self) -> &DocsSessionStore {
        &self.docs_sessions
    }
}

/// Builder wiring repositories and services onto one pool
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<Config>,
    pool: Option<PgPool>,
}

impl AppStateBuilder {
    /// Create a new builder
    ///
    /// Config falls back to `Config::default()` when not provided; the pool
    /// is required.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the database pool
    pub fn pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Build the AppState
    ///
    /// Fails without a pool, or when the JWT or password settings are unusable.
    pub fn build(self) -> Result<AppState> {
        let config = self.config.unwrap_or_default();
        let pool = self
            .pool
            .ok_or_else(|| Error::Internal("database pool not provided".to_string()))?;

        let compiler = config.compiler_options();
        let transactioner = Transactioner::new(pool.clone());
        let users = UserRepository::new(pool.clone(), compiler);
        let personnel = PersonnelRepository::new(pool.clone(), compiler);
        let messages = MessageRepository::new(pool.clone(), compiler);

        let hasher = PasswordHasher::new(&config.password)?;
        let issuer = JwtIssuer::new(&config.jwt)?;
        let jwt = JwtAuth::new(&config.jwt)?;

        tracing::debug!(
            between = ?compiler.between,
            not_in = ?compiler.not_in,
            sort = ?compiler.sort,
            "filter compiler configured"
        );

        Ok(AppState {
            users: UserService::new(
                users,
                personnel.clone(),
                transactioner.clone(),
                hasher,
                issuer,
                compiler,
            ),
            personnel: PersonnelService::new(personnel, transactioner.clone(), compiler),
            messages: MessageService::new(messages, transactioner, compiler),
            jwt,
            docs_sessions: DocsSessionStore::new(config.docs.session_ttl()),
            config: Arc::new(config),
            pool,
        })
    }
}

/// State over a lazy pool that never connects, for router tests
#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    AppState::builder()
        .config(tests::test_config())
        .pool(tests::lazy_pool())
        .build()
        .unwrap()
}
