//! Ladder Execution Backend Server
//!
//! REST API server in front of the serialized brokerage execution queue.

use ladder_execution_backend::api::create_router;
use ladder_execution_backend::config::Config;
use ladder_execution_backend::models::ConnectRequest;
use ladder_execution_backend::state::AppState;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use ladder_execution_backend::brokerage::{Contract, Endpoint, OptionRight, OrderAction};
use ladder_execution_backend::error::ErrorResponse;
use ladder_execution_backend::execution::{CommandKind, RecordedError};
use ladder_execution_backend::ladder::{LadderEntry, TradeLevels};
use ladder_execution_backend::models::{
    AckResponse, CancelOrderResponse, ClosePositionResponse, ConnectResponse, HealthResponse,
    LadderResponse, LadderStatus, OptionChainResponse, OrdersResponse, PlaceTradeRequest,
    PlaceTradeResponse, StatusResponse, UpdatePriceRequest, UpdatePriceResponse,
    VerifyContractRequest, VerifyContractResponse,
};
use ladder_execution_backend::registry::{OrderRecord, OrderStatus, PositionRecord};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        ladder_execution_backend::api::handlers::health_check,
        ladder_execution_backend::api::handlers::get_status,
        ladder_execution_backend::api::handlers::update_price,
        ladder_execution_backend::api::handlers::get_ladder,
        ladder_execution_backend::api::handlers::connect,
        ladder_execution_backend::api::handlers::disconnect,
        ladder_execution_backend::api::handlers::place_trade,
        ladder_execution_backend::api::handlers::list_orders,
        ladder_execution_backend::api::handlers::cancel_order,
        ladder_execution_backend::api::handlers::close_position,
        ladder_execution_backend::api::handlers::get_option_chain,
        ladder_execution_backend::api::handlers::verify_contract,
    ),
    components(
        schemas(
            HealthResponse,
            StatusResponse,
            RecordedError,
            CommandKind,
            Endpoint,
            UpdatePriceRequest,
            UpdatePriceResponse,
            LadderResponse,
            LadderStatus,
            LadderEntry,
            TradeLevels,
            ConnectRequest,
            ConnectResponse,
            AckResponse,
            PlaceTradeRequest,
            PlaceTradeResponse,
            Contract,
            OptionRight,
            OrderAction,
            CancelOrderResponse,
            ClosePositionResponse,
            OrdersResponse,
            OrderRecord,
            OrderStatus,
            PositionRecord,
            OptionChainResponse,
            VerifyContractRequest,
            VerifyContractResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health and status endpoints"),
        (name = "Ladder", description = "Underlying price feed and price ladder"),
        (name = "Brokerage", description = "Brokerage session management"),
        (name = "Trading", description = "Order placement, cancellation and positions"),
        (name = "Discovery", description = "Option chain and contract lookup"),
    ),
    info(
        title = "Ladder Execution API",
        version = "0.1.0",
        description = "REST API for ladder-priced option orders executed through a serialized brokerage queue",
        license(name = "MIT")
    )
)]
struct ApiDoc;

fn load_config() -> anyhow::Result<Config> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let mut config = if Path::new(&path).exists() {
        info!("Loading configuration from {}", path);
        Config::load(&path)?
    } else {
        info!("No configuration at {}, using defaults", path);
        Config::default()
    };

    // Get host and port from environment if set
    if let Ok(host) = std::env::var("HOST") {
        config.server.host = host;
    }
    if let Ok(port) = std::env::var("PORT") {
        config.server.port = port
            .parse()
            .map_err(|e| anyhow::anyhow!("PORT must be a valid number: {}", e))?;
    }

    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;
    let host = config.server.host.clone();
    let port = config.server.port;
    let auto_connect = config.brokerage.auto_connect;

    // Create application state
    let (state, execution) = AppState::from_config(config);
    let state = Arc::new(state);

    if auto_connect {
        match state.gateway.connect(ConnectRequest::default()).await {
            Ok(response) => info!("Auto-connected to {}", response.endpoint),
            Err(e) => warn!("Auto-connect failed: {}", e),
        }
    }

    info!("Starting Ladder Execution Backend on {}:{}", host, port);
    info!(
        "Swagger UI available at http://{}:{}/swagger-ui/",
        host, port
    );

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = create_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start the server
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    execution.shutdown().await;
    Ok(())
}
