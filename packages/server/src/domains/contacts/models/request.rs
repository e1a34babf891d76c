use serde_json::Value;

use crate::domains::contacts::errors::PipelineError;

pub const MIN_BATCH_SIZE: usize = 1;
pub const MAX_BATCH_SIZE: usize = 50;
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// One inbound `generateBatch` call. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    query: String,
    batch_size: usize,
}

impl GenerationRequest {
    /// Validated request. `query` must contain non-whitespace text; the batch
    /// size is clamped into `[MIN_BATCH_SIZE, MAX_BATCH_SIZE]`.
    pub fn new(query: impl Into<String>, batch_size: i64) -> Result<Self, PipelineError> {
        let query = query.into();
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(PipelineError::Validation(
                "Missing or invalid 'query' in request body".into(),
            ));
        }

        Ok(Self {
            query: trimmed.to_string(),
            batch_size: clamp_batch_size(batch_size),
        })
    }

    /// Parse the `{ query, batchSize }` HTTP body.
    pub fn from_json(body: &Value) -> Result<Self, PipelineError> {
        let object = body.as_object().ok_or_else(|| {
            PipelineError::Validation("Request body must be a JSON object".into())
        })?;

        let query = object
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                PipelineError::Validation("Missing or invalid 'query' in request body".into())
            })?;

        let batch_size = match object.get("batchSize") {
            None | Some(Value::Null) => DEFAULT_BATCH_SIZE as i64,
            Some(Value::Number(n)) => number_to_size(n.as_f64())?,
            Some(Value::String(s)) => number_to_size(s.trim().parse::<f64>().ok())?,
            Some(_) => return Err(invalid_batch_size()),
        };

        Self::new(query, batch_size)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

fn invalid_batch_size() -> PipelineError {
    PipelineError::Validation("'batchSize' must be a number".into())
}

fn number_to_size(value: Option<f64>) -> Result<i64, PipelineError> {
    match value {
        Some(v) if v.is_finite() => Ok(v.trunc() as i64),
        _ => Err(invalid_batch_size()),
    }
}

fn clamp_batch_size(requested: i64) -> usize {
    requested.clamp(MIN_BATCH_SIZE as i64, MAX_BATCH_SIZE as i64) as usize
}
