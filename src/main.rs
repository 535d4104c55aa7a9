use embedding_similarity::api::{create_router, AppState};
use embedding_similarity::application::{ComparisonService, ModelCache};
use embedding_similarity::infrastructure::{AppConfig, OnnxModelLoader};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "embedding_similarity=debug,api=debug,tower_http=debug".into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f == "json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::load()?;

    let loader = Arc::new(OnnxModelLoader::new(config.config.models.clone()));
    let cache = Arc::new(ModelCache::new(loader));

    if config.config.models.preload {
        info!("Loading embedding models...");
        match cache.preload_all().await {
            Ok(()) => info!("All models loaded"),
            Err(e) => warn!(error = %e, "some models failed to preload; they will load on first use"),
        }
    }

    let comparison = Arc::new(ComparisonService::new(cache));
    let server = config.config.server.clone();
    let app = create_router(AppState::new(comparison, config));

    let addr = SocketAddr::new(server.host.parse()?, server.port);

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
