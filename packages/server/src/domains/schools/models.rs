use serde::Serialize;
use serde_json::Value;

use crate::domains::contacts::PipelineError;

/// One row of the `Schools_Main` directory (columns A-G).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct School {
    pub school_id: String,
    pub school_name: String,
    pub conference: String,
    pub division: String,
    pub state: String,
    pub total_enrollment: Option<u64>,
    pub student_athlete_count: Option<u64>,
}

impl School {
    /// Map a directory row. Rows without a `school_id` are not schools.
    pub fn from_row(row: &[Value]) -> Option<Self> {
        let school_id = cell_text(row, 0);
        if school_id.is_empty() {
            return None;
        }

        Some(Self {
            school_id,
            school_name: cell_text(row, 1),
            conference: cell_text(row, 2),
            division: cell_text(row, 3),
            state: cell_text(row, 4),
            total_enrollment: cell_count(row, 5),
            student_athlete_count: cell_count(row, 6),
        })
    }
}

fn cell_text(row: &[Value], index: usize) -> String {
    match row.get(index) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Lenient count: `31200`, `"31,200"` and `" 500 "` parse; anything else is `None`.
fn cell_count(row: &[Value], index: usize) -> Option<u64> {
    match row.get(index)? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

/// Body of `POST /api/enrich-batch`: `{ "schoolIds": ["uk", "uga"] }`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichRequest {
    pub school_ids: Vec<String>,
}

impl EnrichRequest {
    pub fn from_json(body: &Value) -> Result<Self, PipelineError> {
        let invalid =
            || PipelineError::Validation("Body must include { schoolIds: [\"uk\", \"uga\"] }".into());

        let ids = body
            .get("schoolIds")
            .and_then(Value::as_array)
            .filter(|ids| !ids.is_empty())
            .ok_or_else(invalid)?;

        let school_ids = ids
            .iter()
            .map(|id| match id.as_str().map(str::trim) {
                Some(id) if !id.is_empty() => Ok(id.to_string()),
                _ => Err(invalid()),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { school_ids })
    }
}

/// Response of `POST /api/enrich-batch`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentSummary {
    pub requested_count: usize,
    pub found_schools: usize,
    pub enriched_count: usize,
    pub failed_count: usize,
    pub inserted_count: usize,
}
