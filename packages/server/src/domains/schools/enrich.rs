//! School directory reads and per-school AD enrichment.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::{info, info_span, warn, Instrument};

use super::models::{EnrichRequest, EnrichmentSummary, School};
use super::prompts::format_enrich_prompt;
use crate::common::{Record, ENRICHMENT_SCHEMA};
use crate::domains::contacts::extraction::extract_json_object;
use crate::domains::contacts::normalize::normalize_object;
use crate::domains::contacts::pipeline::complete_json_with_timeout;
use crate::domains::contacts::PipelineError;
use crate::kernel::{BaseTabularStore, Row, ServerDeps};

#[derive(Debug, Clone)]
pub struct EnrichmentSettings {
    pub schools_range: String,
    pub enrichment_range: String,
    pub generation_timeout: Duration,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            schools_range: "Schools_Main!A2:Z".to_string(),
            enrichment_range: "AD_Contacts!A2".to_string(),
            generation_timeout: Duration::from_secs(60),
        }
    }
}

/// Every school in the directory, in sheet order.
pub async fn list_schools(
    store: &dyn BaseTabularStore,
    range: &str,
) -> Result<Vec<School>, PipelineError> {
    let rows = store
        .read_rows(range)
        .await
        .map_err(|e| PipelineError::storage(format!("school directory read failed: {:#}", e)))?;

    Ok(rows.iter().filter_map(|row| School::from_row(row)).collect())
}

/// Schools whose id is in `ids`, in directory order.
pub fn find_by_ids(schools: Vec<School>, ids: &[String]) -> Vec<School> {
    let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
    schools
        .into_iter()
        .filter(|school| wanted.contains(school.school_id.as_str()))
        .collect()
}

/// `school_id, school_name, <enrichment fields>, created_at`
pub fn enrichment_row(school: &School, record: &Record, created_at: DateTime<Utc>) -> Row {
    let mut row = Vec::with_capacity(record.schema().len() + 3);
    row.push(Value::String(school.school_id.clone()));
    row.push(Value::String(school.school_name.clone()));
    row.extend(record.to_row());
    row.push(Value::String(
        created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    ));
    row
}

async fn enrich_school(
    deps: &ServerDeps,
    school: &School,
    timeout: Duration,
) -> Result<Record, PipelineError> {
    let prompt = format_enrich_prompt(school);
    let raw = complete_json_with_timeout(deps.ai.as_ref(), &prompt, timeout).await?;
    let object = extract_json_object(&raw)?;

    normalize_object(&ENRICHMENT_SCHEMA, &object).ok_or_else(|| PipelineError::MalformedOutput {
        reason: "enrichment object missing required fields".into(),
        raw,
    })
}

/// Enrich each requested school with one generation call and append the
/// results. Schools whose generation fails are counted, never filled in.
pub async fn enrich_batch(
    deps: &ServerDeps,
    settings: &EnrichmentSettings,
    request: &EnrichRequest,
) -> Result<EnrichmentSummary, PipelineError> {
    let schools = list_schools(deps.store.as_ref(), &settings.schools_range).await?;
    let found = find_by_ids(schools, &request.school_ids);

    let mut summary = EnrichmentSummary {
        requested_count: request.school_ids.len(),
        found_schools: found.len(),
        ..Default::default()
    };

    let now = Utc::now();
    let mut rows = Vec::with_capacity(found.len());
    for school in &found {
        let span = info_span!("enrich_school", school_id = %school.school_id);
        match enrich_school(deps, school, settings.generation_timeout)
            .instrument(span)
            .await
        {
            Ok(record) => rows.push(enrichment_row(school, &record, now)),
            Err(e) => {
                warn!(school_id = %school.school_id, error = %e, "Enrichment failed, skipping school");
                summary.failed_count += 1;
            }
        }
    }
    summary.enriched_count = rows.len();

    if !rows.is_empty() {
        let submitted = rows.len();
        let written = deps
            .store
            .append_rows(&settings.enrichment_range, rows)
            .await
            .map_err(|e| PipelineError::storage(format!("{:#}", e)))?;
        if written != submitted {
            return Err(PipelineError::storage(format!(
                "partial write: store reported {} of {} rows",
                written, submitted
            )));
        }
        summary.inserted_count = written;
    }

    info!(
        requested = summary.requested_count,
        found = summary.found_schools,
        enriched = summary.enriched_count,
        failed = summary.failed_count,
        "Enrichment batch finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::demo_enrichment;
    use crate::kernel::{MemoryStore, MockAI, TestDependencies};
    use serde_json::json;

    fn directory() -> Vec<Row> {
        vec![
            vec![json!("uk"), json!("University of Kentucky"), json!("SEC")],
            vec![json!("uga"), json!("University of Georgia"), json!("SEC")],
            vec![json!(""), json!("blank id")],
        ]
    }

    #[tokio::test]
    async fn test_list_and_find() {
        let store = MemoryStore::new().with_rows("Schools_Main!A2:Z", directory());
        let schools = list_schools(&store, "Schools_Main!A2:Z").await.unwrap();
        assert_eq!(schools.len(), 2);

        let found = find_by_ids(schools, &["uga".to_string(), "missing".to_string()]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].school_id, "uga");
    }

    #[tokio::test]
    async fn test_enrich_batch_skips_failed_schools() {
        let settings = EnrichmentSettings::default();
        let deps = TestDependencies::new(
            MockAI::new()
                .with_response(format!(
                    "```json\n{}\n```",
                    demo_enrichment("uk", "University of Kentucky")
                ))
                .with_error("quota exceeded"),
            MemoryStore::new().with_rows(&settings.schools_range, directory()),
        );
        let request = EnrichRequest {
            school_ids: vec!["uk".into(), "uga".into(), "nope".into()],
        };

        let summary = enrich_batch(&deps.server_deps(), &settings, &request)
            .await
            .unwrap();

        assert_eq!(summary.requested_count, 3);
        assert_eq!(summary.found_schools, 2);
        assert_eq!(summary.enriched_count, 1);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.inserted_count, 1);

        let rows = deps.store.rows(&settings.enrichment_range);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), ENRICHMENT_SCHEMA.len() + 3);
        assert_eq!(rows[0][0], json!("uk"));
        assert_eq!(rows[0][2], json!("Demo AD for University of Kentucky"));
        assert_eq!(deps.ai.json_call_count(), 2);
    }

    #[tokio::test]
    async fn test_directory_failure_is_storage_error() {
        let settings = EnrichmentSettings::default();
        let deps = TestDependencies::new(
            MockAI::new(),
            MemoryStore::new().failing_on(&settings.schools_range),
        );
        let request = EnrichRequest {
            school_ids: vec!["uk".into()],
        };

        let err = enrich_batch(&deps.server_deps(), &settings, &request)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::StorageWrite(_)));
        assert_eq!(deps.ai.call_count(), 0);
    }
}
