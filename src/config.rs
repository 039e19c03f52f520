use std::env;
use std::path::PathBuf;

use crate::gemini::GeminiConfig;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub gemini: GeminiConfig,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// A missing `GEMINI_API_KEY` is not an error here; model calls fail
    /// when they are made.
    pub fn from_env() -> Self {
        let port = parsed_var("PORT").unwrap_or(DEFAULT_PORT);

        let gemini = GeminiConfig {
            api_key: env::var("GEMINI_API_KEY")
                .ok()
                .filter(|value| !value.trim().is_empty()),
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout_ms: parsed_var("GEMINI_TIMEOUT_MS").unwrap_or(DEFAULT_TIMEOUT_MS),
        };

        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::temp_dir());

        let max_upload_bytes =
            parsed_var("MAX_UPLOAD_BYTES").unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        Self {
            port,
            gemini,
            upload_dir,
            max_upload_bytes,
        }
    }
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.parse::<T>().ok())
}
