//! Unit tests for types module.

use super::*;
use rust_decimal_macros::dec;

// ============================================================================
// OptionRight Tests
// ============================================================================

#[test]
fn test_option_right_display() {
    assert_eq!(format!("{}", OptionRight::Call), "C");
    assert_eq!(format!("{}", OptionRight::Put), "P");
}

#[test]
fn test_option_right_deserialization_aliases() {
    let put: OptionRight = serde_json::from_str("\"put\"").unwrap();
    let call: OptionRight = serde_json::from_str("\"C\"").unwrap();

    assert_eq!(put, OptionRight::Put);
    assert_eq!(call, OptionRight::Call);
}

// ============================================================================
// PlaceTradeRequest Tests
// ============================================================================

#[test]
fn test_place_trade_request_builder() {
    let request = PlaceTradeRequest::new(dec!(2.45), dec!(600), "20251219", OptionRight::Put)
        .with_qty(3)
        .with_levels(dec!(600.39), dec!(0.05), dec!(0.03));

    assert_eq!(request.qty, 3);
    assert_eq!(request.strike, Some(dec!(600)));
    assert_eq!(request.trigger_price, Some(dec!(600.39)));
    assert_eq!(request.tp, Some(dec!(0.05)));
    assert_eq!(request.sl, Some(dec!(0.03)));
}

#[test]
fn test_place_trade_request_serialization_skips_unset_levels() {
    let request = PlaceTradeRequest::new(dec!(1.10), dec!(598), "20251219", OptionRight::Call);
    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["price"], "1.10");
    assert_eq!(json["right"], "C");
    assert_eq!(json["qty"], 1);
    assert!(json.get("tp").is_none());
    assert!(json.get("trigger_price").is_none());
}

// ============================================================================
// LadderQuery Tests
// ============================================================================

#[test]
fn test_ladder_query_urlencoded() {
    let query = LadderQuery {
        offset: Some(-2),
        radius: None,
        tp: Some(dec!(0.05)),
        sl: None,
    };

    let encoded = serde_urlencoded::to_string(&query).unwrap();
    assert_eq!(encoded, "offset=-2&tp=0.05");
}

#[test]
fn test_ladder_query_default_is_empty() {
    let encoded = serde_urlencoded::to_string(LadderQuery::default()).unwrap();
    assert!(encoded.is_empty());
}

// ============================================================================
// Response Tests
// ============================================================================

#[test]
fn test_ladder_response_deserialization() {
    let json = r#"{
        "status": "ready",
        "underlying_price": "149.23",
        "levels": {
            "offset": 0,
            "option_price": "5.00",
            "entry_trigger": "149.23",
            "take_profit": "149.28",
            "stop_loss": "149.20"
        },
        "entries": [
            {"grid_index": 500, "option_price": "5.00", "trigger_price": "149.23",
             "is_mid_market": true, "is_selected": true}
        ]
    }"#;

    let response: LadderResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.status, LadderStatus::Ready);
    assert_eq!(response.underlying_price, Some(dec!(149.23)));
    let levels = response.levels.unwrap();
    assert_eq!(levels.take_profit, dec!(149.28));
    assert!(response.entries[0].is_mid_market);
}

#[test]
fn test_status_response_with_last_error() {
    let json = r#"{
        "server_running": true,
        "version": "0.1.0",
        "port": 8080,
        "brokerage_connected": false,
        "brokerage_endpoint": null,
        "last_error": {
            "command_id": 7,
            "command": "place_trade",
            "message": "brokerage not connected",
            "at": "2025-12-19T14:30:00Z"
        },
        "underlying_price": null,
        "price_updated_at": null,
        "open_orders": 0,
        "open_positions": 0
    }"#;

    let status: StatusResponse = serde_json::from_str(json).unwrap();
    let last_error = status.last_error.unwrap();
    assert_eq!(last_error.command_id, 7);
    assert_eq!(last_error.command, CommandKind::PlaceTrade);
}

#[test]
fn test_order_status_deserialization() {
    let status: OrderStatus = serde_json::from_str("\"submitted\"").unwrap();
    assert_eq!(status, OrderStatus::Submitted);
}

#[test]
fn test_ladder_status_display() {
    assert_eq!(format!("{}", LadderStatus::Waiting), "waiting");
    assert_eq!(format!("{}", LadderStatus::Ready), "ready");
}
