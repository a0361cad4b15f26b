//! Unit tests for error module.

use super::*;
use crate::brokerage::BrokerageError;
use std::time::Duration;

// ============================================================================
// ErrorResponse Tests
// ============================================================================

#[test]
fn test_error_response_serialization() {
    let response = ErrorResponse {
        error: "Something went wrong".to_string(),
        code: "INTERNAL_ERROR".to_string(),
    };

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"error\":\"Something went wrong\""));
    assert!(json.contains("\"code\":\"INTERNAL_ERROR\""));
}

// ============================================================================
// ApiError Display Tests
// ============================================================================

#[test]
fn test_api_error_not_connected_display() {
    let error = ApiError::NotConnected;
    assert!(error.to_string().to_lowercase().contains("not connected"));
}

#[test]
fn test_api_error_no_confirmation_display() {
    let error = ApiError::NoConfirmation {
        command_id: 12,
        operation: CommandKind::PlaceTrade,
    };
    assert_eq!(
        error.to_string(),
        "No confirmation received for place_trade (command #12)"
    );
}

#[test]
fn test_api_error_invalid_request_display() {
    let error = ApiError::InvalidRequest("strike is required".to_string());
    assert_eq!(format!("{}", error), "Invalid request: strike is required");
}

// ============================================================================
// ApiError IntoResponse Tests
// ============================================================================

#[test]
fn test_api_error_status_codes() {
    let cases = [
        (ApiError::InvalidRequest("x".to_string()), StatusCode::BAD_REQUEST),
        (ApiError::NotConnected, StatusCode::BAD_REQUEST),
        (
            ApiError::ContractNotFound("SPY 20251219 $600 C".to_string()),
            StatusCode::NOT_FOUND,
        ),
        (ApiError::Connection("refused".to_string()), StatusCode::BAD_GATEWAY),
        (ApiError::Brokerage("rejected".to_string()), StatusCode::BAD_GATEWAY),
        (
            ApiError::NoConfirmation {
                command_id: 1,
                operation: CommandKind::Connect,
            },
            StatusCode::GATEWAY_TIMEOUT,
        ),
        (ApiError::NotFound("x".to_string()), StatusCode::NOT_FOUND),
        (ApiError::Internal("x".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (error, expected) in cases {
        let label = error.to_string();
        assert_eq!(error.into_response().status(), expected, "{}", label);
    }
}

// ============================================================================
// Conversion Tests
// ============================================================================

#[test]
fn test_from_execution_error() {
    assert!(matches!(
        ApiError::from(ExecutionError::NotConnected),
        ApiError::NotConnected
    ));
    assert!(matches!(
        ApiError::from(ExecutionError::ContractNotFound("SPY".to_string())),
        ApiError::ContractNotFound(_)
    ));
    assert!(matches!(
        ApiError::from(ExecutionError::ConnectTimeout(Duration::from_secs(20))),
        ApiError::Connection(ref msg) if msg.contains("20s")
    ));
    assert!(matches!(
        ApiError::from(ExecutionError::Brokerage(BrokerageError::Rejected(
            "no margin".to_string()
        ))),
        ApiError::Brokerage(ref msg) if msg.contains("no margin")
    ));
    assert!(matches!(
        ApiError::from(ExecutionError::WorkerUnavailable),
        ApiError::Internal(_)
    ));
}

#[test]
fn test_from_trade_params_error() {
    let error = ApiError::from(TradeParamsError::MissingExpiry);
    assert!(matches!(error, ApiError::InvalidRequest(ref msg) if msg == "expiry is required"));
}

#[test]
fn test_api_error_debug() {
    let error = ApiError::NotConnected;
    assert_eq!(format!("{:?}", error), "NotConnected");
}
