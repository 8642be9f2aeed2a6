use anyhow::{Context, Result};
use chat_service::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("loading configuration")?;
    init_tracing(&config)?;

    let pool = create_pool(&config.database)
        .await
        .context("connecting to the database")?;

    if config.database.auto_migrate {
        run_migrations(&pool).await.context("running migrations")?;
    } else {
        tracing::info!("Automatic migrations disabled");
    }

    let state = AppState::builder()
        .config(config.clone())
        .pool(pool.clone())
        .build()
        .context("building application state")?;

    Server::new(config).serve(app(state)).await?;

    pool.close().await;
    shutdown_tracing();
    Ok(())
}
