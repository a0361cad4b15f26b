//! API request handlers.

use crate::brokerage::{OrderId, TradeId};
use crate::error::{ApiError, ErrorResponse};
use crate::models::{
    AckResponse, CancelOrderResponse, ClosePositionResponse, ConnectRequest, ConnectResponse,
    HealthResponse, LadderQuery, LadderResponse, OptionChainResponse, OrdersResponse,
    PlaceTradeRequest, PlaceTradeResponse, StatusResponse, UpdatePriceRequest,
    UpdatePriceResponse, VerifyContractRequest, VerifyContractResponse,
};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use std::sync::Arc;

// ============================================================================
// Health & Status
// ============================================================================

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Server and brokerage status.
#[utoipa::path(
    get,
    path = "/api/v1/status",
    responses(
        (status = 200, description = "Status snapshot", body = StatusResponse)
    ),
    tag = "Health"
)]
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(state.gateway.status())
}

// ============================================================================
// Price Feed & Ladder
// ============================================================================

/// Pushes the latest underlying price.
#[utoipa::path(
    post,
    path = "/api/v1/price",
    request_body = UpdatePriceRequest,
    responses(
        (status = 200, description = "Price stored", body = UpdatePriceResponse),
        (status = 400, description = "Invalid price", body = ErrorResponse)
    ),
    tag = "Ladder"
)]
pub async fn update_price(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdatePriceRequest>,
) -> Result<Json<UpdatePriceResponse>, ApiError> {
    state.gateway.update_price(request).map(Json)
}

/// Ladder window and trade levels around the latest price.
#[utoipa::path(
    get,
    path = "/api/v1/ladder",
    params(LadderQuery),
    responses(
        (status = 200, description = "Ladder, or a waiting status before the first price", body = LadderResponse),
        (status = 400, description = "TP or SL distance out of range", body = ErrorResponse)
    ),
    tag = "Ladder"
)]
pub async fn get_ladder(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LadderQuery>,
) -> Result<Json<LadderResponse>, ApiError> {
    state.gateway.ladder(&query).map(Json)
}

// ============================================================================
// Brokerage Session
// ============================================================================

/// Connects to the brokerage, replacing any live session.
#[utoipa::path(
    post,
    path = "/api/v1/brokerage/connect",
    request_body = ConnectRequest,
    responses(
        (status = 200, description = "Connected", body = ConnectResponse),
        (status = 502, description = "Connection failed", body = ErrorResponse),
        (status = 504, description = "No confirmation received", body = ErrorResponse)
    ),
    tag = "Brokerage"
)]
pub async fn connect(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConnectRequest>,
) -> Result<Json<ConnectResponse>, ApiError> {
    state.gateway.connect(request).await.map(Json)
}

/// Disconnects from the brokerage.
#[utoipa::path(
    post,
    path = "/api/v1/brokerage/disconnect",
    responses(
        (status = 200, description = "Disconnected", body = AckResponse),
        (status = 504, description = "No confirmation received", body = ErrorResponse)
    ),
    tag = "Brokerage"
)]
pub async fn disconnect(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AckResponse>, ApiError> {
    state.gateway.disconnect().await.map(Json)
}

// ============================================================================
// Trading
// ============================================================================

/// Places a BUY limit order on an option of the configured instrument.
#[utoipa::path(
    post,
    path = "/api/v1/trades",
    request_body = PlaceTradeRequest,
    responses(
        (status = 200, description = "Order placed", body = PlaceTradeResponse),
        (status = 400, description = "Invalid request or not connected", body = ErrorResponse),
        (status = 404, description = "Contract not found", body = ErrorResponse),
        (status = 502, description = "Brokerage error", body = ErrorResponse),
        (status = 504, description = "No confirmation received", body = ErrorResponse)
    ),
    tag = "Trading"
)]
pub async fn place_trade(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlaceTradeRequest>,
) -> Result<Json<PlaceTradeResponse>, ApiError> {
    state.gateway.place_trade(request).await.map(Json)
}

/// Lists tracked orders and positions.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses(
        (status = 200, description = "Orders and positions, empty while disconnected", body = OrdersResponse)
    ),
    tag = "Trading"
)]
pub async fn list_orders(State(state): State<Arc<AppState>>) -> Json<OrdersResponse> {
    Json(state.gateway.orders())
}

/// Cancels an order. Unknown ids succeed without effect.
#[utoipa::path(
    delete,
    path = "/api/v1/orders/{order_id}",
    params(
        ("order_id" = u64, Path, description = "Order id")
    ),
    responses(
        (status = 200, description = "Cancel processed", body = CancelOrderResponse),
        (status = 400, description = "Not connected", body = ErrorResponse),
        (status = 504, description = "No confirmation received", body = ErrorResponse)
    ),
    tag = "Trading"
)]
pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<CancelOrderResponse>, ApiError> {
    state.gateway.cancel_order(order_id).await.map(Json)
}

/// Closes a position. Unknown ids succeed without effect.
#[utoipa::path(
    delete,
    path = "/api/v1/positions/{trade_id}",
    params(
        ("trade_id" = u64, Path, description = "Trade id")
    ),
    responses(
        (status = 200, description = "Close processed", body = ClosePositionResponse),
        (status = 504, description = "No confirmation received", body = ErrorResponse)
    ),
    tag = "Trading"
)]
pub async fn close_position(
    State(state): State<Arc<AppState>>,
    Path(trade_id): Path<TradeId>,
) -> Result<Json<ClosePositionResponse>, ApiError> {
    state.gateway.close_position(trade_id).await.map(Json)
}

// ============================================================================
// Discovery
// ============================================================================

/// Summarized option chain of the configured instrument.
#[utoipa::path(
    get,
    path = "/api/v1/option-chain",
    responses(
        (status = 200, description = "Expirations and nearby strikes", body = OptionChainResponse),
        (status = 400, description = "Not connected", body = ErrorResponse),
        (status = 404, description = "No option chain", body = ErrorResponse)
    ),
    tag = "Discovery"
)]
pub async fn get_option_chain(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OptionChainResponse>, ApiError> {
    state.gateway.option_chain().await.map(Json)
}

/// Checks that an option contract is listed.
#[utoipa::path(
    post,
    path = "/api/v1/contracts/verify",
    request_body = VerifyContractRequest,
    responses(
        (status = 200, description = "Contract found", body = VerifyContractResponse),
        (status = 400, description = "Invalid request or not connected", body = ErrorResponse),
        (status = 404, description = "Contract not found", body = ErrorResponse)
    ),
    tag = "Discovery"
)]
pub async fn verify_contract(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VerifyContractRequest>,
) -> Result<Json<VerifyContractResponse>, ApiError> {
    state.gateway.verify_contract(request).await.map(Json)
}
