use anyhow::Result;
use sqlx::migrate::MigrateDatabase;
use sqlx_migrator::migrator::{Migrate, Plan};

/// Creates the database if needed and applies pending migrations.
#[tracing::instrument(skip_all, fields(url = %config.database.url))]
pub async fn migrate(config: &crate::Config) -> Result<()> {
    tracing::info!("Running database migrations...");

    if !sqlx::Sqlite::database_exists(&config.database.url).await? {
        tracing::info!("Database does not exist, creating it");
        sqlx::Sqlite::create_database(&config.database.url).await?;
    }

    let pool = crate::db::create_pool(&config.database.url, 1).await?;
    run_migrations(&pool).await?;
    pool.close().await;

    tracing::info!("Migrations completed successfully");

    Ok(())
}

/// Drops the database and migrates from scratch.
#[tracing::instrument(skip_all, fields(url = %config.database.url))]
pub async fn reset(config: &crate::Config) -> Result<()> {
    if sqlx::Sqlite::database_exists(&config.database.url).await? {
        tracing::warn!("Dropping existing database");
        sqlx::Sqlite::drop_database(&config.database.url).await?;
    } else {
        tracing::info!("Database does not exist, nothing to drop");
    }

    migrate(config).await?;

    tracing::info!("Database reset completed successfully");

    Ok(())
}

pub async fn run_migrations(pool: &sqlx::SqlitePool) -> Result<()> {
    let mut conn = pool.acquire().await?;
    mealdays_db::migrator()?
        .run(&mut *conn, &Plan::apply_all())
        .await?;

    Ok(())
}
