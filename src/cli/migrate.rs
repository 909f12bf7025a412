use anyhow::Result;
use sqlx::{Sqlite, SqlitePool, migrate::MigrateDatabase};
use sqlx_migrator::{Migrate, Plan};

use crate::config::Config;

/// Apply pending migrations on an open pool.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let mut conn = pool.acquire().await?;
    advent_db::migrator::<Sqlite>()?
        .run(&mut conn, &Plan::apply_all())
        .await?;

    Ok(())
}

#[tracing::instrument(skip(config))]
pub async fn migrate(config: Config) -> Result<()> {
    tracing::info!("running database migrations");

    let pool = crate::db::create_pool(&config.database.url, 1).await?;
    run_migrations(&pool).await?;
    pool.close().await;

    tracing::info!("migrations completed");

    Ok(())
}

#[tracing::instrument(skip(config))]
pub async fn reset(config: Config) -> Result<()> {
    if Sqlite::database_exists(&config.database.url).await? {
        tracing::warn!(url = %config.database.url, "dropping existing database");
        Sqlite::drop_database(&config.database.url).await?;
    } else {
        tracing::info!(url = %config.database.url, "database does not exist, nothing to drop");
    }

    migrate(config).await?;

    tracing::info!("database reset completed");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: String) -> Config {
        let mut config = Config::load(Some("does-not-exist.toml".to_owned())).unwrap();
        config.database.url = url;
        config
    }

    #[tokio::test]
    async fn test_reset_recreates_schema() -> anyhow::Result<()> {
        let dir = temp_dir::TempDir::new()?;
        let url = format!("sqlite:{}", dir.child("advent.db").display());

        migrate(config(url.clone())).await?;

        let pool = crate::db::create_pool(&url, 1).await?;
        sqlx::query("INSERT INTO users (session_id, created_at) VALUES ('01JRESET', 0)")
            .execute(&pool)
            .await?;
        pool.close().await;

        reset(config(url.clone())).await?;

        let pool = crate::db::create_pool(&url, 1).await?;
        let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await?;
        assert_eq!(users, 0);

        Ok(())
    }
}
