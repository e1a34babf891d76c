use serde::Serialize;

use super::ContactRecord;

/// Number of persisted rows echoed back to the caller.
pub const PREVIEW_LIMIT: usize = 3;

/// Outcome of one pipeline run. Built once per request, not retained.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// Schema-conformant rows produced from the model output
    #[serde(skip)]
    pub generated: usize,
    /// Rows actually appended to the store
    #[serde(rename = "added")]
    pub persisted: usize,
    pub preview: Vec<ContactRecord>,
    /// Non-fatal diagnostic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BatchResult {
    pub fn new(generated: usize, persisted: &[ContactRecord], message: Option<String>) -> Self {
        Self {
            generated,
            persisted: persisted.len(),
            preview: persisted.iter().take(PREVIEW_LIMIT).cloned().collect(),
            message,
        }
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            generated: 0,
            persisted: 0,
            preview: Vec::new(),
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Record, CONTACT_SCHEMA};

    #[test]
    fn test_preview_is_capped() {
        let records = vec![Record::with_defaults(&CONTACT_SCHEMA); 5];
        let result = BatchResult::new(5, &records, None);

        assert_eq!(result.persisted, 5);
        assert_eq!(result.preview.len(), PREVIEW_LIMIT);
    }

    #[test]
    fn test_response_shape() {
        let result = BatchResult::empty("nothing found");
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["added"], 0);
        assert_eq!(value["preview"], serde_json::json!([]));
        assert_eq!(value["message"], "nothing found");
        assert!(value.get("generated").is_none());

        let value = serde_json::to_value(BatchResult::new(0, &[], None)).unwrap();
        assert!(value.get("message").is_none());
    }
}
