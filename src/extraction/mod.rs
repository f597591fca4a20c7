//! Document extraction pipeline
//!
//! - `document_type` - the five supported document types and their field rubrics
//! - `loader` - plain-text loaders for Word and PDF uploads
//! - `pipeline` - stage upload, load text, ask the model, parse its JSON

pub mod document_type;
pub mod loader;
pub mod pipeline;

pub use document_type::{DocumentFormat, DocumentType, FieldSpec};
pub use loader::LoaderError;
pub use pipeline::{ExtractionError, ExtractionPipeline, ExtractionRequest, ExtractionResult, PipelineSettings};
