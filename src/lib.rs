//! HTTP service that extracts text from uploaded PDFs and asks Gemini for a
//! summary plus question/answer pairs.

pub mod analysis;
pub mod api;
pub mod config;
pub mod extract;
pub mod gemini;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tracing::info;

use config::AppConfig;
use gemini::GeminiClient;

#[derive(Debug, Clone)]
pub struct AppState {
    pub model: GeminiClient,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: GeminiClient::new(config.gemini.clone()),
            upload_dir: config.upload_dir.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

pub fn build_app(state: Arc<AppState>) -> Router {
    api::router(state)
}

pub async fn run_server(app: Router, port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await
}
