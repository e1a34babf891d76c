//! Schools domain: directory reads and per-school AD enrichment.

pub mod enrich;
pub mod models;
pub mod prompts;

pub use enrich::{enrich_batch, list_schools, EnrichmentSettings};
pub use models::{EnrichRequest, EnrichmentSummary, School};
