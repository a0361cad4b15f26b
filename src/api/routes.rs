//! Route configuration.

use crate::api::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::{delete, get, post};
use std::sync::Arc;

/// Creates the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/api/v1/status", get(handlers::get_status))
        // Price feed and ladder
        .route("/api/v1/price", post(handlers::update_price))
        .route("/api/v1/ladder", get(handlers::get_ladder))
        // Brokerage session
        .route("/api/v1/brokerage/connect", post(handlers::connect))
        .route("/api/v1/brokerage/disconnect", post(handlers::disconnect))
        // Trading
        .route("/api/v1/trades", post(handlers::place_trade))
        .route("/api/v1/orders", get(handlers::list_orders))
        .route("/api/v1/orders/{order_id}", delete(handlers::cancel_order))
        .route(
            "/api/v1/positions/{trade_id}",
            delete(handlers::close_position),
        )
        // Discovery
        .route("/api/v1/option-chain", get(handlers::get_option_chain))
        .route("/api/v1/contracts/verify", post(handlers::verify_contract))
        .with_state(state)
}
