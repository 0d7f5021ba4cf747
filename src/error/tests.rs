//! Unit tests for error module.

use super::*;

// ============================================================================
// ErrorResponse Tests
// ============================================================================

#[test]
fn test_error_response_serialization() {
    let response = ErrorResponse {
        error: "Backend API unavailable".to_string(),
        code: "BACKEND_UNAVAILABLE".to_string(),
    };

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"error\":\"Backend API unavailable\""));
    assert!(json.contains("\"code\":\"BACKEND_UNAVAILABLE\""));
}

// ============================================================================
// ApiError Display Tests
// ============================================================================

#[test]
fn test_api_error_backend_unavailable_display_hides_cause() {
    let error = ApiError::BackendUnavailable("connection refused".to_string());
    assert_eq!(format!("{}", error), BACKEND_UNAVAILABLE_MESSAGE);
}

#[test]
fn test_api_error_invalid_request_display() {
    let error = ApiError::InvalidRequest("Body too large".to_string());
    assert_eq!(format!("{}", error), "Invalid request: Body too large");
}

// ============================================================================
// ApiError IntoResponse Tests
// ============================================================================

#[test]
fn test_api_error_backend_unavailable_into_response() {
    let error = ApiError::BackendUnavailable("refused".to_string());
    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_api_error_backend_unavailable_body() {
    let response = ApiError::BackendUnavailable("refused".to_string()).into_response();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["error"], "Backend API unavailable");
    assert_eq!(body["code"], "BACKEND_UNAVAILABLE");
}

#[test]
fn test_api_error_invalid_request_into_response() {
    let error = ApiError::InvalidRequest("Bad input".to_string());
    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// ApiError Debug Tests
// ============================================================================

#[test]
fn test_api_error_debug() {
    let error = ApiError::BackendUnavailable("connection refused".to_string());
    let debug = format!("{:?}", error);
    assert!(debug.contains("BackendUnavailable"));
    assert!(debug.contains("connection refused"));
}
