use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn, Instrument};

use super::document_type::DocumentType;
use super::loader::{self, LoaderError};
use crate::config::Config;
use crate::llm::{LLMAdapter, LLMMessage, LLMRequest, ResponseFormat};
use crate::types::AppError;

const TEMP_FILE_PREFIX: &str = "docextract-";

/// One uploaded document waiting to be processed.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub document_bytes: Bytes,
    pub document_type: DocumentType,
}

/// The model's JSON answer, passed through unchanged. Normally an object
/// keyed by rubric field name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExtractionResult {
    pub info: Value,
}

impl ExtractionResult {
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        self.info.as_object()
    }

    /// Rubric fields the model did not answer, in rubric order. Empty when
    /// the answer is not an object.
    pub fn missing_fields(&self, document_type: DocumentType) -> Vec<&'static str> {
        match self.fields() {
            Some(fields) => document_type
                .field_names()
                .filter(|name| !fields.contains_key(*name))
                .collect(),
            None => Vec::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Failed to stage upload: {0}")]
    Staging(#[from] std::io::Error),

    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    LLM(#[from] AppError),

    #[error("LLM request timed out after {0:?}")]
    Timeout(Duration),

    #[error("LLM response is not valid JSON: {0}")]
    MalformedJson(String),

    #[error("Extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub model: String,
    pub temperature: f32,
    pub request_timeout: Duration,
    pub temp_dir: PathBuf,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.llm.model.clone(),
            temperature: 0.0,
            request_timeout: config.llm.timeout(),
            temp_dir: config.uploads.tmp_dir.clone(),
        }
    }
}

/// Stages an upload on disk, reads its text and asks the model for the
/// document type's fields.
#[derive(Clone)]
pub struct ExtractionPipeline {
    llm: Arc<dyn LLMAdapter>,
    settings: PipelineSettings,
}

impl ExtractionPipeline {
    pub fn new(llm: Arc<dyn LLMAdapter>, settings: PipelineSettings) -> Self {
        Self { llm, settings }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub async fn extract(&self, request: ExtractionRequest) -> Result<ExtractionResult, ExtractionError> {
        let span = tracing::info_span!(
            "extract",
            request_id = %uuid::Uuid::new_v4(),
            document_type = %request.document_type,
        );
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: ExtractionRequest) -> Result<ExtractionResult, ExtractionError> {
        let document_type = request.document_type;
        info!(bytes = request.document_bytes.len(), "Extracting {}", document_type.description());

        // The staged file is removed when `staged` drops, on every exit path.
        let (staged, text) = self.stage_and_load(request).await?;
        debug!(path = %staged.path().display(), chars = text.len(), "Document text loaded");

        let llm_request = LLMRequest {
            model: self.settings.model.clone(),
            messages: vec![
                LLMMessage::system(document_type.system_prompt()),
                LLMMessage::user(text),
            ],
            max_tokens: None,
            temperature: Some(self.settings.temperature),
            response_format: ResponseFormat::JsonObject,
        };

        let response = tokio::time::timeout(
            self.settings.request_timeout,
            self.llm.create_chat_completion(&llm_request),
        )
        .await
        .map_err(|_| ExtractionError::Timeout(self.settings.request_timeout))??;
        debug!(
            finish_reason = %response.finish_reason,
            total_tokens = response.usage.total_tokens,
            "LLM response received"
        );

        let result = parse_fields(&response.content)?;

        match result.fields() {
            Some(_) => {
                let missing = result.missing_fields(document_type);
                if !missing.is_empty() {
                    warn!(?missing, "LLM response omitted rubric fields");
                }
            }
            None => warn!(kind = json_kind(&result.info), "LLM response is not a field mapping"),
        }

        if let Err(e) = staged.close() {
            warn!("Failed to remove staged upload: {}", e);
        }

        info!(
            fields = result.fields().map_or(0, Map::len),
            "Extraction completed"
        );
        Ok(result)
    }

    async fn stage_and_load(
        &self,
        request: ExtractionRequest,
    ) -> Result<(NamedTempFile, String), ExtractionError> {
        let format = request.document_type.format();
        let temp_dir = self.settings.temp_dir.clone();

        tokio::task::spawn_blocking(move || {
            let mut staged = tempfile::Builder::new()
                .prefix(TEMP_FILE_PREFIX)
                .suffix(format.extension())
                .tempfile_in(&temp_dir)?;
            staged.write_all(&request.document_bytes)?;
            staged.flush()?;

            let text = loader::load_text(format, staged.path())?;
            Ok::<_, ExtractionError>((staged, text))
        })
        .await?
    }
}

fn parse_fields(content: &str) -> Result<ExtractionResult, ExtractionError> {
    serde_json::from_str::<Value>(content)
        .map(|info| ExtractionResult { info })
        .map_err(|e| ExtractionError::MalformedJson(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
