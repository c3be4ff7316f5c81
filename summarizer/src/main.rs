use std::sync::Arc;

use tracing::info;
use warp::Filter;

use summarizer::config::Config;
use summarizer::domain::{CLINICAL, VETERINARY};
use summarizer::error::{handle_rejection, ApiError};
use summarizer::pipeline::SummaryService;
use summarizer::{api, metrics, middleware, providers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!("Starting clinical summary service");

    let client = providers::http_client(&config)?;
    let clinical_provider =
        providers::build_provider(&CLINICAL, &config.summary_provider, &config, client.clone());
    let veterinary_provider =
        providers::build_provider(&VETERINARY, &config.veterinary_provider, &config, client);

    let clinical = Arc::new(SummaryService::new(&CLINICAL, clinical_provider));
    let veterinary = Arc::new(SummaryService::new(&VETERINARY, veterinary_provider));

    // Build API routes
    let api_routes = api::routes(clinical, veterinary);

    // Health check route
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({"status": "healthy"})));

    // Metrics route
    let metrics_route = warp::path("metrics")
        .and(warp::get())
        .and_then(|| async {
            let (buffer, content_type) = metrics::render()
                .map_err(|e| warp::reject::custom(ApiError::from(e)))?;
            Ok::<_, warp::Rejection>(warp::reply::with_header(buffer, "Content-Type", content_type))
        });

    let routes = health
        .or(metrics_route)
        .or(api_routes)
        .recover(handle_rejection)
        .with(warp::log("api"))
        .with(middleware::cors());

    // Start server
    let addr = ([0, 0, 0, 0], config.port);
    info!("Server listening on {}", addr.1);

    warp::serve(routes).run(addr).await;

    Ok(())
}
