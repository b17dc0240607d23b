use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vista_api::{build_router, config::Config, state::AppState, sweeper::spawn_store_sweeper};
use vista_gateway::{ClientFactory, ProviderType};
use vista_persist::ThreadStore;
use vista_pipeline::Pipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Vista API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    let provider = config.provider_config();
    if provider.provider_type() == ProviderType::Gemini && config.nano_api_key.is_none() {
        tracing::warn!("NANO_API_KEY is not set; generate and refine will fail until it is provided");
    }
    let image_client = ClientFactory::create_client(provider)?;
    tracing::info!(
        provider = image_client.name(),
        model = %config.gateway.model,
        "Image client ready"
    );

    let store: Arc<dyn ThreadStore> = Arc::new(config.store.build_store());
    if let Some(every) = config.store.sweep_interval() {
        tracing::info!(ttl_secs = config.store.ttl_secs, "Thread expiry enabled");
        spawn_store_sweeper(store.clone(), every);
    }

    let pipeline = Pipeline::builder()
        .image_client(image_client)
        .thread_store(store)
        .serialize_threads(config.store.serialize_threads)
        .build()?;

    let state = Arc::new(AppState::new(config.clone(), pipeline));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api/docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        }
        _ => {
            registry.with(tracing_subscriber::fmt::layer().pretty()).init();
        }
    }
}
