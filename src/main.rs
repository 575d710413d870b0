use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use tracing::{error, info};

use notearc::bootstrap::app_context::{AppContext, AppServices};
use notearc::bootstrap::config::{Config, PersistenceBackend};
use notearc::infrastructure::db::{self, PgHealthProbe, PgPool};
use notearc::infrastructure::db::repositories::log_repository_sqlx::SqlxLogRepository;
use notearc::infrastructure::db::repositories::user_repository_sqlx::SqlxUserRepository;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "notearc=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(
        api_port = cfg.api_port,
        backend = ?cfg.persistence_backend,
        production = cfg.is_production,
        "Starting notearc backend"
    );

    let (services, pool): (AppServices, Option<PgPool>) = match cfg.persistence_backend {
        PersistenceBackend::Postgres => {
            // Lazy pool: nothing connects until the first query
            let pool = db::connect_pool_lazy(&cfg.database_url)?;
            if cfg.run_migrations {
                db::migrate(&pool).await?;
            }
            let services = AppServices::new(
                Arc::new(SqlxLogRepository::new(pool.clone())),
                Arc::new(SqlxUserRepository::new(pool.clone())),
                Arc::new(PgHealthProbe { pool: pool.clone() }),
            );
            (services, Some(pool))
        }
        PersistenceBackend::Memory => {
            tracing::warn!("using in-memory persistence; data is lost on exit");
            (AppServices::in_memory(), None)
        }
    };

    let ctx = AppContext::new(cfg.clone(), services);
    let app = notearc::presentation::http::router(ctx);

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(?e, "API server failed");
    }

    if let Some(pool) = pool {
        db::close_pool(&pool).await;
    }
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(?e, "ctrl_c_handler_failed");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(?e, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
