//! LLM prompt for per-school athletic director enrichment.

use super::models::School;
use crate::common::ENRICHMENT_SCHEMA;
use crate::domains::contacts::prompts::schema_skeleton;

pub const ENRICH_SCHOOL_PROMPT: &str = r#"You are helping build a contact database for college athletic departments.

Given this school:
- Name: {name}
- State: {state}
- Conference: {conference}
- Division: {division}

1. Identify the current Athletic Director (or the equivalent role if the title differs).
2. Provide the AD's full name, title, best official email (avoid generic catch-all
   addresses) and phone number (direct line or main athletics office).
3. If available, include an assistant or deputy contact.
4. Provide links (staff directory, athletics site, etc.) as source URLs.
5. Use null or "" for anything you are not confident about. Never guess emails.
6. "confidence" is a number between 0 and 1.

Return ONLY a JSON object with this shape, no markdown and no commentary:

{skeleton}"#;

fn or_unknown(value: &str) -> &str {
    if value.trim().is_empty() {
        "Unknown"
    } else {
        value
    }
}

pub fn format_enrich_prompt(school: &School) -> String {
    ENRICH_SCHOOL_PROMPT
        .replace("{state}", or_unknown(&school.state))
        .replace("{conference}", or_unknown(&school.conference))
        .replace("{division}", or_unknown(&school.division))
        .replace("{skeleton}", &schema_skeleton(&ENRICHMENT_SCHEMA))
        .replace("{name}", or_unknown(&school.school_name))
}
