use std::sync::Arc;

use crate::config::Config;
use crate::extraction::{ExtractionPipeline, ExtractionResult};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: ExtractionPipeline,
}

impl AppState {
    pub fn new(config: Config, pipeline: ExtractionPipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ExtractionResponse {
    pub info: ExtractionResult,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub model: String,
}
