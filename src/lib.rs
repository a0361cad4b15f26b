//! # Ladder Execution Backend - REST API Server
//!
//! Places, cancels and closes short-dated option trades against a brokerage
//! venue, pricing them from a discrete ladder derived from an externally fed
//! underlying price. Built with [Axum](https://crates.io/crates/axum) and
//! documented through [utoipa](https://crates.io/crates/utoipa).
//!
//! ## Key Features
//!
//! - **Serialized Execution**: every brokerage operation goes through one
//!   command queue drained by a single worker task, so calls never interleave
//!   and run in submission order.
//!
//! - **Per-command Replies**: each queued command carries its own reply slot.
//!   Callers wait on their own result with a bounded timeout and never see
//!   another request's error.
//!
//! - **Price Ladder**: a 0..1000 cent grid of option prices mapped to
//!   underlying trigger levels, with entry, take-profit and stop-loss levels
//!   for the selected row. Exact decimal arithmetic throughout.
//!
//! - **Paper Venue**: a built-in in-memory brokerage for local runs and tests.
//!
//! - **OpenAPI Documentation**: Swagger UI at `/swagger-ui/`.
//!
//! ## Architecture
//!
//! ```text
//! HTTP handler → RequestGateway → ExecutionQueue → ExecutionWorker → Brokerage
//!                     │                                  │
//!                     │                                  ├→ TradeRegistry
//!                     │                                  └→ ConnectionState
//!                     └→ PriceLadder (synchronous)
//! ```
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Route handlers and router configuration |
//! | [`brokerage`] | Venue capability trait and the paper venue |
//! | [`config`] | TOML configuration |
//! | [`error`] | API error types with `IntoResponse` implementation |
//! | [`execution`] | Command queue, worker and connection state |
//! | [`gateway`] | Validation and bounded waits in front of the queue |
//! | [`ladder`] | Price ladder computation |
//! | [`models`] | Request/response DTOs with OpenAPI schemas |
//! | [`registry`] | In-memory orders and positions |
//! | [`state`] | Application state management |
//!
//! ## API Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/status` | Server and brokerage status |
//! | POST | `/api/v1/price` | Push the latest underlying price |
//! | GET | `/api/v1/ladder` | Ladder window and trade levels |
//! | POST | `/api/v1/brokerage/connect` | Connect to the brokerage |
//! | POST | `/api/v1/brokerage/disconnect` | Disconnect |
//! | POST | `/api/v1/trades` | Place a BUY limit order |
//! | GET | `/api/v1/orders` | List orders and positions |
//! | DELETE | `/api/v1/orders/{order_id}` | Cancel an order |
//! | DELETE | `/api/v1/positions/{trade_id}` | Close a position |
//! | GET | `/api/v1/option-chain` | Option chain summary |
//! | POST | `/api/v1/contracts/verify` | Verify a contract is listed |
//!
//! ## Example Usage
//!
//! ```bash
//! # Start with defaults (paper venue, port 8080)
//! cargo run
//!
//! # With a config file and port override
//! CONFIG_PATH=config.toml PORT=3000 cargo run
//!
//! curl -X POST http://localhost:8080/api/v1/price \
//!   -H "Content-Type: application/json" -d '{"price": 600.37}'
//!
//! curl "http://localhost:8080/api/v1/ladder?offset=2&tp=0.05&sl=0.03"
//!
//! curl -X POST http://localhost:8080/api/v1/brokerage/connect \
//!   -H "Content-Type: application/json" -d '{}'
//!
//! curl -X POST http://localhost:8080/api/v1/trades \
//!   -H "Content-Type: application/json" \
//!   -d '{"price": 5.02, "strike": 600, "expiry": "20251219", "type": "C", "qty": 1,
//!        "tp": 0.05, "sl": 0.03, "trigger_price": 600.39}'
//! ```

pub mod api;
pub mod brokerage;
pub mod config;
pub mod error;
pub mod execution;
pub mod gateway;
pub mod ladder;
pub mod models;
pub mod registry;
pub mod state;
