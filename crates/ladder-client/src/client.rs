//! HTTP client for the ladder execution API.

use crate::error::Error;
use crate::types::*;
use reqwest::Client;
use std::time::Duration;


/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "http://localhost:8080").
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the Ladder Execution API.
#[derive(Debug, Clone)]
pub struct LadderClient {
    client: Client,
    base_url: String,
}

impl LadderClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a new client with default configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::new(ClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================================================
    // Health & Status
    // ========================================================================

    /// Performs a health check.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn health_check(&self) -> Result<HealthResponse, Error> {
        let url = format!("{}/health", self.base_url);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Gets server and brokerage status.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_status(&self) -> Result<StatusResponse, Error> {
        let url = format!("{}/api/v1/status", self.base_url);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Price & Ladder
    // ========================================================================

    /// Pushes the latest underlying price.
    ///
    /// # Errors
    /// Returns error if the request fails or the price is rejected.
    pub async fn update_price(
        &self,
        request: &UpdatePriceRequest,
    ) -> Result<UpdatePriceResponse, Error> {
        let url = format!("{}/api/v1/price", self.base_url);
        let resp = self.client.post(&url).json(request).send().await?;
        self.handle_response(resp).await
    }

    /// Gets the ladder window, optionally with a selected offset and levels.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_ladder(&self, query: Option<&LadderQuery>) -> Result<LadderResponse, Error> {
        let mut url = format!("{}/api/v1/ladder", self.base_url);
        if let Some(q) = query {
            let qs = serde_urlencoded::to_string(q)?;
            if !qs.is_empty() {
                url = format!("{}?{}", url, qs);
            }
        }
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Brokerage Session
    // ========================================================================

    /// Connects to the brokerage. Unset request fields use server defaults.
    ///
    /// # Errors
    /// Returns error if the request fails or the connection cannot be opened.
    pub async fn connect(&self, request: &ConnectRequest) -> Result<ConnectResponse, Error> {
        let url = format!("{}/api/v1/brokerage/connect", self.base_url);
        let resp = self.client.post(&url).json(request).send().await?;
        self.handle_response(resp).await
    }

    /// Disconnects from the brokerage.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn disconnect(&self) -> Result<AckResponse, Error> {
        let url = format!("{}/api/v1/brokerage/disconnect", self.base_url);
        let resp = self.client.post(&url).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Trading
    // ========================================================================

    /// Places a BUY limit order.
    ///
    /// # Errors
    /// Returns error if the request fails or the trade is rejected.
    pub async fn place_trade(
        &self,
        request: &PlaceTradeRequest,
    ) -> Result<PlaceTradeResponse, Error> {
        let url = format!("{}/api/v1/trades", self.base_url);
        let resp = self.client.post(&url).json(request).send().await?;
        self.handle_response(resp).await
    }

    /// Lists tracked orders and positions.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_orders(&self) -> Result<OrdersResponse, Error> {
        let url = format!("{}/api/v1/orders", self.base_url);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Cancels an order.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<CancelOrderResponse, Error> {
        let url = format!("{}/api/v1/orders/{}", self.base_url, order_id);
        let resp = self.client.delete(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Closes a position.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn close_position(&self, trade_id: TradeId) -> Result<ClosePositionResponse, Error> {
        let url = format!("{}/api/v1/positions/{}", self.base_url, trade_id);
        let resp = self.client.delete(&url).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Discovery
    // ========================================================================

    /// Gets the option chain summary for the configured instrument.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_option_chain(&self) -> Result<OptionChainResponse, Error> {
        let url = format!("{}/api/v1/option-chain", self.base_url);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    /// Verifies that a contract is listed.
    ///
    /// # Errors
    /// Returns error if the request fails or the contract is not listed.
    pub async fn verify_contract(
        &self,
        request: &VerifyContractRequest,
    ) -> Result<VerifyContractResponse, Error> {
        let url = format!("{}/api/v1/contracts/verify", self.base_url);
        let resp = self.client.post(&url).json(request).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status.is_success() {
            return Ok(resp.json().await?);
        }

        let text = resp.text().await.unwrap_or_default();
        Err(error_from_body(status.as_u16(), text))
    }
}

fn error_from_body(status: u16, text: String) -> Error {
    let (code, message) = match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) => (body.code, body.error),
        Err(_) => (String::new(), text),
    };

    if status == 404 {
        Error::NotFound(message)
    } else {
        Error::Api {
            status,
            code,
            message,
        }
    }
}
