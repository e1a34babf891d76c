// TestDependencies - mock implementations for testing
//
// Provides in-memory services that can be injected into ServerDeps for tests
// and for local runs without spreadsheet credentials.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{BaseAI, BaseTabularStore, GenerationTimedOut, Row, ServerDeps};

// =============================================================================
// Mock AI
// =============================================================================

enum Scripted {
    Text(String),
    Failure(String),
    TimedOut,
}

/// Scripted AI: returns queued responses in order, then `"[]"`.
#[derive(Default)]
pub struct MockAI {
    responses: Arc<Mutex<VecDeque<Scripted>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    json_calls: Arc<Mutex<usize>>,
    delay: Option<Duration>,
}

impl MockAI {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful completion
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Scripted::Text(text.into()));
        self
    }

    /// Queue a failed completion
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Scripted::Failure(message.into()));
        self
    }

    /// Queue a failure the provider reports as a timeout
    pub fn with_timeout_error(self) -> Self {
        self.responses.lock().unwrap().push_back(Scripted::TimedOut);
        self
    }

    /// Sleep before answering (exercises timeouts)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every prompt received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Calls that went through the JSON output mode
    pub fn json_call_count(&self) -> usize {
        *self.json_calls.lock().unwrap()
    }
}

#[async_trait]
impl BaseAI for MockAI {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::Failure(message)) => Err(anyhow!(message)),
            Some(Scripted::TimedOut) => {
                Err(anyhow!("deadline exceeded").context(GenerationTimedOut))
            }
            None => Ok("[]".to_string()),
        }
    }

    async fn complete_json(&self, prompt: &str) -> Result<String> {
        *self.json_calls.lock().unwrap() += 1;
        self.complete(prompt).await
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// Append-only in-memory table store keyed by location string.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    failing: RwLock<HashSet<String>>,
    write_limits: RwLock<HashMap<String, usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed rows at a location
    pub fn with_rows(self, location: &str, rows: Vec<Row>) -> Self {
        self.tables
            .write()
            .unwrap()
            .entry(location.to_string())
            .or_default()
            .extend(rows);
        self
    }

    /// Make every read and append at `location` fail
    pub fn failing_on(self, location: &str) -> Self {
        self.failing.write().unwrap().insert(location.to_string());
        self
    }

    /// Accept at most `limit` rows per append at `location` (simulates a partial write)
    pub fn with_write_limit(self, location: &str, limit: usize) -> Self {
        self.write_limits
            .write()
            .unwrap()
            .insert(location.to_string(), limit);
        self
    }

    /// Snapshot of rows at a location
    pub fn rows(&self, location: &str) -> Vec<Row> {
        self.tables
            .read()
            .unwrap()
            .get(location)
            .cloned()
            .unwrap_or_default()
    }

    pub fn row_count(&self, location: &str) -> usize {
        self.tables
            .read()
            .unwrap()
            .get(location)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn check_available(&self, location: &str) -> Result<()> {
        if self.failing.read().unwrap().contains(location) {
            return Err(anyhow!("store unavailable for {}", location));
        }
        Ok(())
    }
}

#[async_trait]
impl BaseTabularStore for MemoryStore {
    async fn append_rows(&self, location: &str, rows: Vec<Row>) -> Result<usize> {
        self.check_available(location)?;

        let limit = self.write_limits.read().unwrap().get(location).copied();
        let accepted: Vec<Row> = match limit {
            Some(limit) => rows.into_iter().take(limit).collect(),
            None => rows,
        };
        let written = accepted.len();

        self.tables
            .write()
            .unwrap()
            .entry(location.to_string())
            .or_default()
            .extend(accepted);

        Ok(written)
    }

    async fn read_rows(&self, location: &str) -> Result<Vec<Row>> {
        self.check_available(location)?;
        Ok(self.rows(location))
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Bundle of mocks with handles kept for assertions
pub struct TestDependencies {
    pub ai: Arc<MockAI>,
    pub store: Arc<MemoryStore>,
}

impl TestDependencies {
    pub fn new(ai: MockAI, store: MemoryStore) -> Self {
        Self {
            ai: Arc::new(ai),
            store: Arc::new(store),
        }
    }

    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(self.ai.clone(), self.store.clone())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Clearly fake enrichment payload for a school. Test fixture only: never
/// returned by a production code path in place of model output.
pub fn demo_enrichment(school_id: &str, school_name: &str) -> Value {
    json!({
        "ad_name": format!("Demo AD for {}", school_name),
        "ad_title": "Athletic Director",
        "ad_email": format!("ad@{}.edu", school_id),
        "ad_phone": "555-000-0000",
        "assistant_name": null,
        "assistant_email": null,
        "confidence": 0.1,
        "notes": "Demo enrichment data - test fixture.",
        "source_urls": []
    })
}

/// Raw model text for `count` SEC contacts, wrapped in a markdown fence.
pub fn fenced_contacts(count: usize) -> String {
    let rows: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "school_id": format!("sec{}", i),
                "school_name": format!("SEC University {}", i),
                "conference": "SEC",
                "athletic_director_name": format!("Director {}", i),
                "athletic_director_title": "Athletic Director",
                "data_quality_score": 0.8
            })
        })
        .collect();
    format!(
        "Here are the contacts:\n```json\n{}\n```\nLet me know if you need more.",
        serde_json::to_string_pretty(&rows).unwrap_or_default()
    )
}
