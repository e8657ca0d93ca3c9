mod api;
mod middleware;
mod realtime;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
    realtime::new_snapshot_cache,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(revlens_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = revlens_db::PoolConfig::from_app_config(&config);
    let pool = revlens_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = revlens_db::run_migrations(&pool).await?;
    if applied > 0 {
        tracing::info!(applied, "applied database migrations");
    }

    let stores_file = revlens_core::stores::load_stores(&config.stores_path)?;
    let synced = revlens_db::upsert_stores(&pool, &stores_file.stores).await?;
    tracing::info!(synced, "synchronized stores from config");

    if config.seed_demo {
        seed_demo_data(&pool, &config).await?;
    }

    let _scheduler = scheduler::build_scheduler(pool.clone(), &config.digest_schedule).await?;

    let snapshots = new_snapshot_cache();
    let _refresher = realtime::spawn_refresher(pool.clone(), snapshots.clone());

    let auth = AuthState::from_config(&config)?;
    let app = build_app(AppState { pool, snapshots }, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "revlens server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Populate empty stores with demo reviews so a fresh development
/// environment has something to render. Refuses to run outside
/// development.
async fn seed_demo_data(
    pool: &sqlx::PgPool,
    config: &revlens_core::AppConfig,
) -> anyhow::Result<()> {
    if config.env != revlens_core::Environment::Development {
        tracing::warn!(env = %config.env, "REVLENS_SEED_DEMO ignored outside development");
        return Ok(());
    }

    for store in revlens_db::list_stores(pool).await? {
        if revlens_db::count_reviews(pool, store.id).await? == 0 {
            let inserted = revlens_db::seed_demo_reviews(pool, store.id, 40).await?;
            tracing::info!(store = %store.slug, inserted, "seeded demo reviews");
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
