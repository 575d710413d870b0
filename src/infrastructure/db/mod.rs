use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::application::ports::health_probe::HealthProbe;

pub type PgPool = Pool<Postgres>;

/// Builds the process-wide pool without touching the network; connections are
/// opened on first use and reopened transparently by sqlx.
pub fn connect_pool_lazy(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect_lazy(database_url)?;
    Ok(pool)
}

pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    // Uses compile-time embedded migrations under ./migrations
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn close_pool(pool: &PgPool) {
    pool.close().await;
    tracing::info!("database_pool_closed");
}

pub struct PgHealthProbe {
    pub pool: PgPool,
}

#[async_trait]
impl HealthProbe for PgHealthProbe {
    async fn ping(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}

pub mod repositories;
