use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

/// Outcome tag recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    /// At least one row was appended
    Ok,
    /// The run completed with nothing to append
    Empty,
}

impl std::fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditOutcome::Ok => write!(f, "OK"),
            AuditOutcome::Empty => write!(f, "EMPTY"),
        }
    }
}

/// One audit-log row per batch run. Append-only.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub row_count: usize,
    pub outcome: AuditOutcome,
}

impl AuditEntry {
    pub fn new(timestamp: DateTime<Utc>, query: impl Into<String>, row_count: usize) -> Self {
        let outcome = if row_count > 0 {
            AuditOutcome::Ok
        } else {
            AuditOutcome::Empty
        };
        Self {
            timestamp,
            query: query.into(),
            row_count,
            outcome,
        }
    }

    /// `timestamp, query, row_count, outcome`
    pub fn to_row(&self) -> Vec<Value> {
        vec![
            json!(self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
            json!(self.query),
            json!(self.row_count),
            json!(self.outcome.to_string()),
        ]
    }
}
