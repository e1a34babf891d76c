//! JSON error responses for the HTTP surface.

use axum::{
    extract::rejection::JsonRejection,
    http::{header::ALLOW, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::common::utils::truncate_to_char_boundary;
use crate::domains::contacts::PipelineError;

/// Raw model text echoed back in `details` is capped at this many bytes.
pub const MAX_RAW_DETAILS: usize = 2000;

/// Caller-facing failure: `{ error, details? }` with a non-2xx status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<String>,
    allow: Option<&'static str>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
            allow: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// 405 with an `Allow` header listing `allow`.
    pub fn method_not_allowed(allow: &'static str) -> Self {
        Self {
            allow: Some(allow),
            ..Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
        }
    }

    fn body(&self) -> Value {
        match &self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(message) => ApiError::bad_request(message),
            PipelineError::UpstreamGeneration {
                message,
                timed_out: true,
            } => ApiError::new(StatusCode::GATEWAY_TIMEOUT, "Generation timed out")
                .with_details(message),
            PipelineError::UpstreamGeneration { message, .. } => {
                ApiError::new(StatusCode::BAD_GATEWAY, "Upstream generation failed")
                    .with_details(message)
            }
            PipelineError::MalformedOutput { reason, raw } => ApiError::new(
                StatusCode::BAD_GATEWAY,
                format!("Model output could not be parsed: {}", reason),
            )
            .with_details(truncate_to_char_boundary(&raw, MAX_RAW_DETAILS)),
            PipelineError::StorageWrite(message) => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to write to store")
                    .with_details(message)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request("Request body must be valid JSON").with_details(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = self.status.as_u16(),
                error = %self.error,
                details = self.details.as_deref().unwrap_or_default(),
                "Request failed"
            );
        }

        let mut response = (self.status, Json(self.body())).into_response();
        if let Some(allow) = self.allow {
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static(allow));
        }
        response
    }
}
