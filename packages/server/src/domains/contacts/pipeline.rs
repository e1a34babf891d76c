//! Pipeline orchestrator: one request in, one `BatchResult` (or a classified
//! error) out.
//!
//! ```text
//! Idle -> Building -> Generating -> Extracting -> Normalizing -> Ingesting -> Done
//!   \__________\___________\____________\_____________\____________\---> Failed
//! ```

use std::fmt;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::errors::PipelineError;
use super::extraction::extract_json_array;
use super::ingest::IngestionWriter;
use super::models::{AuditEntry, BatchResult, ContactRecord, GenerationRequest};
use super::normalize::normalize;
use super::prompts::format_search_prompt;
use crate::common::CONTACT_SCHEMA;
use crate::config::DEFAULT_PROVENANCE_TAG;
use crate::kernel::{BaseAI, GenerationTimedOut, ServerDeps};

/// Message returned when a run ends with nothing to append.
pub const EMPTY_BATCH_MESSAGE: &str = "No new contacts were generated for this query";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Building,
    Generating,
    Extracting,
    Normalizing,
    Ingesting,
    Done,
    Failed,
}

impl PipelineState {
    /// The state that follows on success. `Done` and `Failed` are terminal.
    pub fn next(self) -> Option<PipelineState> {
        use PipelineState::*;
        match self {
            Idle => Some(Building),
            Building => Some(Generating),
            Generating => Some(Extracting),
            Extracting => Some(Normalizing),
            Normalizing => Some(Ingesting),
            Ingesting => Some(Done),
            Done | Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Building => "building",
            PipelineState::Generating => "generating",
            PipelineState::Extracting => "extracting",
            PipelineState::Normalizing => "normalizing",
            PipelineState::Ingesting => "ingesting",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Locations and knobs for the contact pipeline
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub contacts_range: String,
    pub audit_range: String,
    pub provenance_tag: String,
    pub generation_timeout: Duration,
    /// Generation calls allowed per request (1 = no retry)
    pub generation_attempts: u32,
    pub dedupe: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            contacts_range: "Contacts_AD_NIL!A:Z".to_string(),
            audit_range: "Change_Log!A:D".to_string(),
            provenance_tag: DEFAULT_PROVENANCE_TAG.to_string(),
            generation_timeout: Duration::from_secs(60),
            generation_attempts: 1,
            dedupe: false,
        }
    }
}

/// State of one batch run, with every state it passed through.
#[derive(Debug)]
pub struct BatchRun {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl BatchRun {
    pub fn new() -> Self {
        Self {
            id: Uuid::now_v7(),
            started_at: Utc::now(),
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Move to the next state. No-op once terminal.
    pub fn advance(&mut self) -> PipelineState {
        if let Some(next) = self.state.next() {
            debug!(from = %self.state, to = %next, "Pipeline transition");
            self.enter(next);
        }
        self.state
    }

    /// Short-circuit to `Failed` from any non-terminal state.
    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            self.enter(PipelineState::Failed);
        }
    }

    fn enter(&mut self, state: PipelineState) {
        self.state = state;
        self.history.push(state);
    }
}

impl Default for BatchRun {
    fn default() -> Self {
        Self::new()
    }
}

/// Call the model once, bounded by `timeout`.
pub async fn complete_with_timeout(
    ai: &dyn BaseAI,
    prompt: &str,
    timeout: Duration,
) -> Result<String, PipelineError> {
    bounded(ai.complete(prompt), timeout).await
}

/// Like [`complete_with_timeout`], using the provider's JSON output mode.
pub async fn complete_json_with_timeout(
    ai: &dyn BaseAI,
    prompt: &str,
    timeout: Duration,
) -> Result<String, PipelineError> {
    bounded(ai.complete_json(prompt), timeout).await
}

/// Provider-reported timeouts and our own deadline both surface as `timed_out`.
async fn bounded(
    call: impl Future<Output = anyhow::Result<String>>,
    timeout: Duration,
) -> Result<String, PipelineError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) if e.is::<GenerationTimedOut>() => Err(PipelineError::timeout(timeout)),
        Ok(Err(e)) => Err(PipelineError::upstream(format!("{:#}", e))),
        Err(_) => Err(PipelineError::timeout(timeout)),
    }
}

/// Set `created_by` to the tag, and `created_at` when the model left it empty.
pub fn stamp_provenance(record: &mut ContactRecord, tag: &str, timestamp: DateTime<Utc>) {
    record.set("created_by", Value::String(tag.to_string()));
    if record.text("created_at").is_empty() {
        record.set(
            "created_at",
            Value::String(timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
    }
}

/// Run one batch end to end.
pub async fn generate_batch(
    deps: &ServerDeps,
    settings: &PipelineSettings,
    request: &GenerationRequest,
) -> Result<BatchResult, PipelineError> {
    let mut run = BatchRun::new();
    let span = info_span!("generate_batch", batch_id = %run.id);

    async {
        info!(query = %request.query(), batch_size = request.batch_size(), "Starting batch");

        match execute(&mut run, deps, settings, request).await {
            Ok(result) => {
                info!(added = result.persisted, state = %run.state(), "Batch finished");
                Ok(result)
            }
            Err(e) => {
                let failed_in = run.state();
                run.fail();
                warn!(error = %e, class = ?e.class(), failed_in = %failed_in, "Batch failed");
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}

async fn execute(
    run: &mut BatchRun,
    deps: &ServerDeps,
    settings: &PipelineSettings,
    request: &GenerationRequest,
) -> Result<BatchResult, PipelineError> {
    let batch_size = request.batch_size();

    run.advance();
    let prompt = format_search_prompt(
        &CONTACT_SCHEMA,
        request.query(),
        batch_size,
        &settings.provenance_tag,
    );

    run.advance();
    let raw = generate_with_attempts(deps.ai.as_ref(), &prompt, settings).await?;

    run.advance();
    let items = extract_json_array(&raw)?;
    debug!(candidates = items.len(), "Extracted candidate rows");

    run.advance();
    let mut outcome = normalize(&CONTACT_SCHEMA, &items);
    if outcome.records.len() > batch_size {
        warn!(
            returned = outcome.records.len(),
            requested = batch_size,
            "Model returned more rows than requested, truncating"
        );
        outcome.records.truncate(batch_size);
    }
    for record in &mut outcome.records {
        stamp_provenance(record, &settings.provenance_tag, run.started_at);
    }
    let generated = outcome.records.len();

    run.advance();
    let writer = IngestionWriter::new(
        deps.store.as_ref(),
        &settings.contacts_range,
        &settings.audit_range,
    );
    let (records, duplicates) = if settings.dedupe && !outcome.records.is_empty() {
        writer.dedupe(outcome.records).await?
    } else {
        (outcome.records, 0)
    };
    let added = writer.append_records(&records).await?;
    writer
        .record_audit(&AuditEntry::new(run.started_at, request.query(), added))
        .await;

    run.advance();
    let mut notes = Vec::new();
    if added == 0 {
        notes.push(EMPTY_BATCH_MESSAGE.to_string());
    }
    if outcome.rejected > 0 {
        notes.push(format!("{} rows failed validation", outcome.rejected));
    }
    if duplicates > 0 {
        notes.push(format!("{} duplicate rows skipped", duplicates));
    }
    let message = (!notes.is_empty()).then(|| notes.join("; "));

    Ok(BatchResult::new(generated, &records, message))
}

async fn generate_with_attempts(
    ai: &dyn BaseAI,
    prompt: &str,
    settings: &PipelineSettings,
) -> Result<String, PipelineError> {
    let attempts = settings.generation_attempts.max(1);
    let mut attempt = 1;
    loop {
        match complete_with_timeout(ai, prompt, settings.generation_timeout).await {
            Ok(text) => return Ok(text),
            Err(e) if attempt < attempts => {
                warn!(attempt, error = %e, "Generation failed, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Record;
    use crate::kernel::{MemoryStore, MockAI, TestDependencies};
    use serde_json::json;

    #[test]
    fn test_state_order() {
        let mut run = BatchRun::new();
        while !run.state().is_terminal() {
            run.advance();
        }

        assert_eq!(
            run.history(),
            &[
                PipelineState::Idle,
                PipelineState::Building,
                PipelineState::Generating,
                PipelineState::Extracting,
                PipelineState::Normalizing,
                PipelineState::Ingesting,
                PipelineState::Done,
            ]
        );
        run.fail();
        assert_eq!(run.state(), PipelineState::Done);
    }

    #[test]
    fn test_fail_short_circuits() {
        let mut run = BatchRun::new();
        run.advance();
        run.advance();
        run.fail();

        assert_eq!(run.state(), PipelineState::Failed);
        assert_eq!(run.advance(), PipelineState::Failed);
        assert_eq!(run.history().len(), 4);
    }

    #[test]
    fn test_stamp_provenance_keeps_model_timestamp() {
        let now = Utc::now();
        let mut record = Record::with_defaults(&CONTACT_SCHEMA);
        record.set("created_by", json!("gemini"));
        stamp_provenance(&mut record, "tag_v1", now);

        assert_eq!(record.text("created_by"), "tag_v1");
        assert_eq!(
            record.text("created_at"),
            now.to_rfc3339_opts(SecondsFormat::Secs, true)
        );

        record.set("created_at", json!("2024-01-01T00:00:00Z"));
        stamp_provenance(&mut record, "tag_v1", now);
        assert_eq!(record.text("created_at"), "2024-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn test_timeout_is_upstream_failure() {
        let ai = MockAI::new()
            .with_response("[]")
            .with_delay(Duration::from_millis(200));

        let err = complete_with_timeout(&ai, "prompt", Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UpstreamGeneration { timed_out: true, .. }
        ));
    }

    #[tokio::test]
    async fn test_provider_timeout_is_timed_out() {
        let ai = MockAI::new().with_timeout_error().with_error("503");

        let err = complete_with_timeout(&ai, "prompt", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UpstreamGeneration { timed_out: true, .. }
        ));

        let err = complete_with_timeout(&ai, "prompt", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UpstreamGeneration { timed_out: false, .. }
        ));
    }

    #[tokio::test]
    async fn test_json_completion_uses_json_mode() {
        let ai = MockAI::new().with_response("{}").with_response("[]");

        complete_json_with_timeout(&ai, "describe", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(ai.json_call_count(), 1);

        complete_with_timeout(&ai, "list", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(ai.json_call_count(), 1);
        assert_eq!(ai.call_count(), 2);
    }

    #[tokio::test]
    async fn test_retries_only_upstream_failures() {
        let deps = TestDependencies::new(
            MockAI::new().with_error("503").with_response("[]"),
            MemoryStore::new(),
        );
        let settings = PipelineSettings {
            generation_attempts: 2,
            ..Default::default()
        };
        let request = GenerationRequest::new("SEC schools", 2).unwrap();

        let result = generate_batch(&deps.server_deps(), &settings, &request)
            .await
            .unwrap();
        assert_eq!(result.persisted, 0);
        assert_eq!(deps.ai.call_count(), 2);

        let deps = TestDependencies::new(
            MockAI::new().with_response("not json").with_response("[]"),
            MemoryStore::new(),
        );
        let err = generate_batch(&deps.server_deps(), &settings, &request)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::MalformedOutput { .. }));
        assert_eq!(deps.ai.call_count(), 1);
    }
}
