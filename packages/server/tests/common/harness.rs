//! Router-level harness: mocks in, HTTP responses out.

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use rolodex_core::domains::contacts::PipelineSettings;
use rolodex_core::domains::schools::EnrichmentSettings;
use rolodex_core::kernel::{MemoryStore, MockAI, TestDependencies};
use rolodex_core::server::build_app;
use serde_json::Value;
use tower::ServiceExt;

pub const CONTACTS: &str = "Contacts_AD_NIL!A:Z";
pub const AUDIT: &str = "Change_Log!A:D";
pub const SCHOOLS: &str = "Schools_Main!A2:Z";
pub const ENRICHMENT: &str = "AD_Contacts!A2";

pub struct TestHarness {
    pub deps: TestDependencies,
    router: Router,
}

impl TestHarness {
    pub fn new(ai: MockAI, store: MemoryStore) -> Self {
        let deps = TestDependencies::new(ai, store);
        let router = build_app(
            deps.server_deps(),
            PipelineSettings::default(),
            EnrichmentSettings::default(),
        );
        Self { deps, router }
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Response) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let allow = response
            .headers()
            .get("allow")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, Response { json, allow })
    }

    pub async fn post_json(&self, uri: &str, body: &str) -> (StatusCode, Response) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Response) {
        self.send(Method::GET, uri, None).await
    }
}

pub struct Response {
    pub json: Value,
    pub allow: Option<String>,
}
