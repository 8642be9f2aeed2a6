//! Database harness for integration tests
//!
//! Tests run only when `CHAT_TEST_DATABASE_URL` points at a PostgreSQL
//! server. Each harness migrates a private schema and drops it on teardown.

#![allow(dead_code)]

use chat_service::config::Config;
use chat_service::database::run_migrations;
use chat_service::domain::NewUser;
use chat_service::repository::{Repository, UserRepository};
use chat_service::state::AppState;
use chat_service::transaction::TxContext;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

pub const DATABASE_URL_VAR: &str = "CHAT_TEST_DATABASE_URL";

pub struct TestHarness {
    pub pool: PgPool,
    pub state: AppState,
    admin: PgPool,
    schema: String,
}

impl TestHarness {
    /// Connect and migrate a fresh schema, or `None` when no database is configured
    pub async fn start() -> Option<Self> {
        let Ok(url) = std::env::var(DATABASE_URL_VAR) else {
            eprintln!("{} not set, skipping database test", DATABASE_URL_VAR);
            return None;
        };

        let admin = PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .unwrap();
        let schema = format!("chat_test_{}", Uuid::new_v4().simple());
        sqlx::query(&format!("CREATE SCHEMA {}", schema))
            .execute(&admin)
            .await
            .unwrap();

        let options = PgConnectOptions::from_str(&url)
            .unwrap()
            .options([("search_path", schema.as_str())]);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();

        let state = AppState::builder()
            .config(test_config())
            .pool(pool.clone())
            .build()
            .unwrap();

        Some(Self {
            pool,
            state,
            admin,
            schema,
        })
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone(), self.state.config().compiler_options())
    }

    /// Insert a user directly, skipping registration
    pub async fn seed_user(&self, user_name: &str, role: &str, org: Option<Uuid>) -> Uuid {
        self.users()
            .create(
                TxContext::NoTx,
                NewUser {
                    user_name: user_name.to_string(),
                    password_hash: "not-a-real-hash".to_string(),
                    role: role.to_string(),
                    organization_id: org,
                },
            )
            .await
            .unwrap()
            .id
    }

    pub async fn teardown(self) {
        self.pool.close().await;
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.admin)
            .await
            .unwrap();
        self.admin.close().await;
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.jwt.secret = "integration-secret".to_string();
    config.password.memory_cost_kib = 1024;
    config.password.time_cost = 1;
    config.password.parallelism = 1;
    config
}
