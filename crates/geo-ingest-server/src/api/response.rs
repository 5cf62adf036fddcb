//! API response types
//!
//! Every route answers with the same envelope: `{"success":true,"data":..}`
//! or `{"success":false,"error":{"code":..,"message":..}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use geo_ingest::IngestError;
use serde::Serialize;

/// Standard success response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Standard error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// A failed ingestion rendered as an HTTP response
///
/// The failure has already been alerted by the time it is wrapped here.
#[derive(Debug)]
pub struct IngestFailure(pub IngestError);

impl From<IngestError> for IngestFailure {
    fn from(err: IngestError) -> Self {
        IngestFailure(err)
    }
}

impl IntoResponse for IngestFailure {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status =
            StatusCode::from_u16(kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let error_response = ErrorResponse::new(kind.code(), self.0.to_string());
        (status, Json(error_response)).into_response()
    }
}

/// Alias for Result with IngestFailure
pub type ApiResult<T> = Result<ApiResponse<T>, IngestFailure>;

#[cfg(test)]
mod tests {
    use super::*;
    use geo_ingest::schema::SchemaError;

    #[test]
    fn test_invalid_data_is_bad_request() {
        let response = IngestFailure::from(IngestError::from(SchemaError::Empty)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_source_error_is_server_error() {
        let response =
            IngestFailure::from(IngestError::source_error("unsupported file type")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_envelope() {
        let body = serde_json::to_value(ErrorResponse::new("INVALID_DATA", "csv data is empty"))
            .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "error": { "code": "INVALID_DATA", "message": "csv data is empty" }
            })
        );
    }
}
