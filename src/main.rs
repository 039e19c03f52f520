use std::sync::Arc;

use pdf_analyzer::{build_app, config::AppConfig, run_server, AppState};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_analyzer=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    if config.gemini.api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; /analyze requests will fail");
    }
    info!(
        model = %config.gemini.model,
        upload_dir = %config.upload_dir.display(),
        "starting pdf-analyzer"
    );

    let app = build_app(Arc::new(AppState::from_config(&config)));
    run_server(app, config.port).await?;
    Ok(())
}
