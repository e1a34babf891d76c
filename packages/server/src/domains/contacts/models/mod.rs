pub mod audit;
pub mod batch;
pub mod request;

pub use audit::{AuditEntry, AuditOutcome};
pub use batch::BatchResult;
pub use request::{GenerationRequest, DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE, MIN_BATCH_SIZE};

use crate::common::Record;

/// A contact row conforming to `CONTACT_SCHEMA`.
pub type ContactRecord = Record;
