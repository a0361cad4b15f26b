//! HTTP client library for the Ladder Execution API.
//!
//! This crate provides a typed HTTP client for the ladder execution backend.
//! It covers every REST endpoint: status, price feed, ladder, brokerage
//! session, trading and discovery.
//!
//! # Example
//!
//! ```no_run
//! use ladder_client::{ClientConfig, LadderClient, UpdatePriceRequest};
//! use rust_decimal::Decimal;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ladder_client::Error> {
//!     let client = LadderClient::new(ClientConfig {
//!         base_url: "http://localhost:8080".into(),
//!         timeout: Duration::from_secs(30),
//!     })?;
//!
//!     client
//!         .update_price(&UpdatePriceRequest {
//!             price: Decimal::new(60037, 2),
//!         })
//!         .await?;
//!     let ladder = client.get_ladder(None).await?;
//!     println!("Ladder status: {}", ladder.status);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::{ClientConfig, LadderClient};
pub use error::Error;
pub use types::*;
