//! Error types for the diagnostics service
//!
//! Provides unified error handling using thiserror. The cache itself never
//! produces errors of its own; failures of a computation reach the caller
//! unchanged, so the variants here describe service-level conditions.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Service Error Enum ==
/// Unified error type for the service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Unknown cache or key
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The request gave up waiting for a computation, which keeps running
    #[error("Timed out: {0}")]
    Timeout(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the service.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let test_cases = vec![
            (ServiceError::NotFound("cache".to_string()), StatusCode::NOT_FOUND),
            (ServiceError::InvalidRequest("bad".to_string()), StatusCode::BAD_REQUEST),
            (ServiceError::Timeout("aggregate".to_string()), StatusCode::GATEWAY_TIMEOUT),
        ];

        for (error, expected_status) in test_cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);
        }
    }

    #[test]
    fn test_error_display() {
        let error = ServiceError::NotFound("cache 'x'".to_string());
        assert_eq!(error.to_string(), "Not found: cache 'x'");
    }
}
