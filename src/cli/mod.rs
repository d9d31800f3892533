pub mod server;
pub mod user;

/// Open the configured database and bring its schema up to date.
pub async fn migrate(config: &crate::config::Config) -> anyhow::Result<()> {
    tracing::info!("Running database migrations...");

    let pool = imbds_db::create_pool(&config.database.url, 1).await?;
    imbds_db::migrate(&pool).await?;
    pool.close().await;

    tracing::info!("Migrations completed successfully");

    Ok(())
}
