//! Per-request filter context and the terminal result slot.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Fixed message carried by every denial.
pub const DENIAL_MESSAGE: &str = "You do not have the required role to access this resource.";

/// JSON body of a denied request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DenialPayload {
    pub status_code: u16,
    pub message: String,
}

impl DenialPayload {
    /// The one payload the authorization filters ever produce.
    pub fn forbidden() -> Self {
        Self {
            status_code: StatusCode::FORBIDDEN.as_u16(),
            message: DENIAL_MESSAGE.to_string(),
        }
    }
}

/// Terminal response written into the context by a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterResult {
    pub status: StatusCode,
    pub body: serde_json::Value,
}

impl FilterResult {
    pub fn new(status: StatusCode, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    /// 403 carrying the [`DenialPayload`] shape.
    pub fn forbidden() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            serde_json::json!({
                "statusCode": StatusCode::FORBIDDEN.as_u16(),
                "message": DENIAL_MESSAGE,
            }),
        )
    }
}

impl IntoResponse for FilterResult {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Outcome of the authorization stages for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Result slot untouched; the handler runs.
    Continue,
    /// A filter set the result; the handler was skipped.
    ShortCircuit,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Continue => "continue",
            Decision::ShortCircuit => "short_circuit",
        }
    }
}

/// One in-flight request as seen by the filters.
#[derive(Debug, Clone)]
pub struct FilterContext {
    handler_name: String,
    method: Method,
    path: String,
    request_id: Option<String>,
    result: Option<FilterResult>,
    status: Option<StatusCode>,
}

impl FilterContext {
    pub fn new(handler_name: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            handler_name: handler_name.into(),
            method,
            path: path.into(),
            request_id: None,
            result: None,
            status: None,
        }
    }

    /// Build a context from an incoming request.
    pub fn from_request(handler_name: impl Into<String>, req: &Request<Body>) -> Self {
        let request_id = req
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self {
            request_id,
            ..Self::new(handler_name, req.method().clone(), req.uri().path())
        }
    }

    /// Display name of the endpoint this request targets.
    pub fn handler_name(&self) -> &str {
        &self.handler_name
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn result(&self) -> Option<&FilterResult> {
        self.result.as_ref()
    }

    /// Set the terminal result. Nothing downstream runs once this is set.
    pub fn set_result(&mut self, result: FilterResult) {
        self.result = Some(result);
    }

    pub fn is_short_circuited(&self) -> bool {
        self.result.is_some()
    }

    pub(crate) fn take_result(&mut self) -> Option<FilterResult> {
        self.result.take()
    }

    /// Status of the response that left the pipeline, once known.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }
}
