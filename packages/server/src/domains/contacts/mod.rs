//! Contacts domain: the generation-validation-ingestion pipeline.

pub mod errors;
pub mod extraction;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod prompts;

// Re-export commonly used types
pub use errors::{ErrorClass, PipelineError};
pub use ingest::IngestionWriter;
pub use models::{AuditEntry, AuditOutcome, BatchResult, ContactRecord, GenerationRequest};
pub use pipeline::{generate_batch, BatchRun, PipelineSettings, PipelineState};
