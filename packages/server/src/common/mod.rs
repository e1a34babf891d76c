// Common types and utilities shared across the application

pub mod record;
pub mod schema;
pub mod utils;

pub use record::Record;
pub use schema::{FieldKind, FieldSpec, Schema, CONTACT_SCHEMA, ENRICHMENT_SCHEMA};
