//! Database migration command.
//!
//! Reads the connection string from `SHOP_DATABASE_URL` (falling back to
//! `DATABASE_URL`) and applies the embedded migrations from
//! `crates/shop/migrations/`.

use tamarind_shop::ShopConfig;
use tamarind_shop::db;

/// Errors from the migrate command.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    Config(#[from] tamarind_shop::config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database URL is missing, the connection
/// fails, or a migration fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    let config = ShopConfig::from_env()?;

    tracing::info!("Connecting to shop database...");
    let pool = db::create_pool(&config.database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../shop/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
