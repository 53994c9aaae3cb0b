use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_recs_api::{
    api::{create_router, AppState, RecommendationLimits},
    cache::DetailCache,
    config::Config,
    services::{Catalog, Recommender, SimilarityStore, TmdbDetailFetcher},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movie_recs_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Both data sources must load and agree before anything is served
    let catalog = Catalog::load(&config.catalog_path)
        .with_context(|| format!("Failed to load catalog from {}", config.catalog_path))?;

    let source = config.matrix_source();
    let matrix = SimilarityStore::default()
        .get_or_load(&source)
        .await
        .with_context(|| format!("Failed to load similarity matrix from {}", source))?;

    let recommender = Recommender::new(Arc::new(catalog), matrix)
        .context("Catalog and similarity matrix are misaligned")?;

    let mut state = AppState::new(recommender).with_limits(RecommendationLimits {
        default_count: config.default_recommendations,
        max_count: config.max_recommendations,
    });

    let cache_handle = match &config.tmdb_api_key {
        Some(api_key) => {
            let (cache, handle) = DetailCache::new();
            let fetcher = TmdbDetailFetcher::new(
                cache,
                api_key.clone(),
                config.tmdb_api_url.clone(),
                config.tmdb_poster_base_url.clone(),
            );
            state = state.with_detail_fetcher(Arc::new(fetcher));
            Some(handle)
        }
        None => {
            tracing::warn!("TMDB_API_KEY not set, movie details are disabled");
            None
        }
    };

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
