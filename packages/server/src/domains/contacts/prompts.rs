//! LLM prompts for contact generation.

use serde_json::{Map, Value};

use crate::common::Schema;
use crate::domains::contacts::models::{MAX_BATCH_SIZE, MIN_BATCH_SIZE};

/// Search focus used when the caller supplies none.
pub const DEFAULT_FOCUS: &str = "NCAA Division I athletic directors in the US, with school, AD name, title, and email if publicly available";

/// Prompt asking for a JSON array of contact rows.
pub const SEARCH_CONTACTS_PROMPT: &str = r#"You are helping build a spreadsheet called "Contacts_AD_NIL".
Each row represents ONE college athletic director or NIL decision-maker.

The target sheet has these columns in EXACT order (keys must match exactly):

{columns}

Using ONLY public, non-sensitive information, generate up to {size} NEW rows for this search focus:

"{query}"

Rules:
- Return ONLY a JSON array of objects. No markdown, no commentary, no extra text.
- Each object must have exactly the keys listed above, in that order, and no others.
- Use null or "" when a value is not confidently available. Never guess emails or phone numbers.
- Every row must describe a real, currently operating institution. Do not invent schools or people.
- Rows must be unique: never repeat the same school and role-holder twice.
- "school_id" should be a short, slug-like ID (e.g. "uk" or "uga") if you can infer it, else "".
- "data_quality_score" must be a number between 0 and 1 representing your confidence, or null.
- "created_at" should be an ISO 8601 UTC timestamp of when you generated the row.
- "created_by" should be "{provenance}".
- "last_verified_date" is the date you believe the contact was last valid, if you can infer it.

Shape of each object (keys only, values show the type):

{skeleton}"#;

/// Keys-only example object for a schema: `""` for text fields, `null` for scores.
pub fn schema_skeleton(schema: &Schema) -> String {
    let map: Map<String, Value> = schema
        .fields
        .iter()
        .map(|f| (f.name.to_string(), f.kind.prompt_value()))
        .collect();
    serde_json::to_string_pretty(&Value::Object(map)).unwrap_or_default()
}

/// Format the contact search prompt.
///
/// A blank focus is replaced by [`DEFAULT_FOCUS`]; the batch size is clamped
/// into the supported range.
pub fn format_search_prompt(
    schema: &Schema,
    focus: &str,
    batch_size: usize,
    provenance: &str,
) -> String {
    let focus = match focus.trim() {
        "" => DEFAULT_FOCUS,
        trimmed => trimmed,
    };
    let size = batch_size.clamp(MIN_BATCH_SIZE, MAX_BATCH_SIZE);
    let columns = schema.field_names().collect::<Vec<_>>().join(", ");

    // Query goes in last so braces in user text are never re-expanded.
    SEARCH_CONTACTS_PROMPT
        .replace("{columns}", &columns)
        .replace("{size}", &size.to_string())
        .replace("{provenance}", provenance)
        .replace("{skeleton}", &schema_skeleton(schema))
        .replace("{query}", &focus.replace('"', "'"))
}
