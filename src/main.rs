use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reel_finder::{
    config::Config,
    db::{
        create_pool, create_redis_client, Cache, CatalogStore, MemoryCatalogStore,
        PgCatalogStore,
    },
    routes::{create_router, AppState},
    services::{CatalogService, CatalogSettings},
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("reel_finder=debug,tower_http=debug,axum=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    let (store, pool) = match &config.catalog_seed_file {
        Some(path) => {
            let store: Arc<dyn CatalogStore> = Arc::new(MemoryCatalogStore::from_json_file(path)?);
            (store, None)
        }
        None => {
            let pool = create_pool(&config.database_url, config.database_max_connections)
                .await
                .context("Failed to connect to PostgreSQL")?;
            sqlx::migrate!()
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            let store: Arc<dyn CatalogStore> = Arc::new(PgCatalogStore::new(pool.clone()));
            (store, Some(pool))
        }
    };

    let (cache, cache_handle) = match &config.redis_url {
        Some(redis_url) => {
            let client = create_redis_client(redis_url)?;
            let (cache, handle) = Cache::new(client).await;
            (Some(cache), Some(handle))
        }
        None => {
            tracing::info!("REDIS_URL not set, vocabulary caching disabled");
            (None, None)
        }
    };

    tracing::info!(store = store.name(), cache = cache.is_some(), "Catalog store ready");

    let catalog = CatalogService::new(store, cache, CatalogSettings::from(&config));
    let app = create_router(Arc::new(AppState::new(catalog)));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }
    if let Some(pool) = pool {
        pool.close().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}
