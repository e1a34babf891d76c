//! Append normalized rows to the store, plus one audit row per batch.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::errors::PipelineError;
use super::models::{AuditEntry, ContactRecord};
use crate::common::utils::normalize_key;
use crate::common::CONTACT_SCHEMA;
use crate::kernel::{BaseTabularStore, Row};

const KEY_FIELDS: (&str, &str) = ("school_name", "athletic_director_title");

/// Writes batches to the primary contacts location and the audit location.
pub struct IngestionWriter<'a> {
    store: &'a dyn BaseTabularStore,
    contacts_range: &'a str,
    audit_range: &'a str,
}

impl<'a> IngestionWriter<'a> {
    pub fn new(store: &'a dyn BaseTabularStore, contacts_range: &'a str, audit_range: &'a str) -> Self {
        Self {
            store,
            contacts_range,
            audit_range,
        }
    }

    /// Drop records whose (school, role) key is already stored or repeats
    /// within the batch. Returns the kept records and the number skipped.
    pub async fn dedupe(
        &self,
        records: Vec<ContactRecord>,
    ) -> Result<(Vec<ContactRecord>, usize), PipelineError> {
        let existing = self
            .store
            .read_rows(self.contacts_range)
            .await
            .map_err(|e| PipelineError::storage(format!("duplicate lookup failed: {:#}", e)))?;

        let mut seen: HashSet<(String, String)> = existing.iter().filter_map(row_key).collect();
        let before = records.len();
        let kept: Vec<ContactRecord> = records
            .into_iter()
            .filter(|record| seen.insert(record_key(record)))
            .collect();

        let skipped = before - kept.len();
        if skipped > 0 {
            debug!(skipped, "Skipped duplicate contacts");
        }
        Ok((kept, skipped))
    }

    /// Append all records or fail. A short write is an error, not a success.
    pub async fn append_records(&self, records: &[ContactRecord]) -> Result<usize, PipelineError> {
        if records.is_empty() {
            return Ok(0);
        }

        let rows: Vec<Row> = records.iter().map(ContactRecord::to_row).collect();
        let written = self
            .store
            .append_rows(self.contacts_range, rows)
            .await
            .map_err(|e| PipelineError::storage(format!("{:#}", e)))?;

        if written != records.len() {
            return Err(PipelineError::storage(format!(
                "partial write: store reported {} of {} rows",
                written,
                records.len()
            )));
        }

        info!(rows = written, range = %self.contacts_range, "Appended contacts");
        Ok(written)
    }

    /// Append the audit row. Failure is logged and reported as `false`;
    /// already-committed primary rows are never rolled back for it.
    pub async fn record_audit(&self, entry: &AuditEntry) -> bool {
        match self
            .store
            .append_rows(self.audit_range, vec![entry.to_row()])
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(
                    error = %format!("{:#}", e),
                    range = %self.audit_range,
                    "Audit log append failed"
                );
                false
            }
        }
    }
}

fn record_key(record: &ContactRecord) -> (String, String) {
    (
        normalize_key(record.text(KEY_FIELDS.0)),
        normalize_key(record.text(KEY_FIELDS.1)),
    )
}

fn row_key(row: &Row) -> Option<(String, String)> {
    let position = |name: &str| CONTACT_SCHEMA.fields.iter().position(|f| f.name == name);
    let cell = |index: usize| row.get(index).and_then(Value::as_str).unwrap_or_default();

    let school = cell(position(KEY_FIELDS.0)?);
    if school.trim().is_empty() {
        return None;
    }
    Some((normalize_key(school), normalize_key(cell(position(KEY_FIELDS.1)?))))
}
