//! ABOUTME: The `{success, data?, error?, metadata?}` JSON envelope shared by both MCP servers (spec §4.K)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docbro_core::error::DocBroError;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl<T: Serialize> Envelope<T> {
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None, metadata: None }
    }

    #[must_use]
    pub fn ok_with_metadata(data: T, metadata: Value) -> Self {
        Self { success: true, data: Some(data), error: None, metadata: Some(metadata) }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = if self.success { StatusCode::OK } else { StatusCode::INTERNAL_SERVER_ERROR };
        (status, Json(self)).into_response()
    }
}

/// Maps a `DocBroError` onto the envelope + the spec's HTTP status table in
/// one step — every handler's error path funnels through this.
pub struct ApiError(pub DocBroError);

impl From<DocBroError> for ApiError {
    fn from(err: DocBroError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Envelope::<()> {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: self.0.code().to_string(),
                message: self.0.to_string(),
                suggestion: self.0.suggestion(),
            }),
            metadata: None,
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Envelope<T>, ApiError>;
