use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
    pub user_prompt: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
