//! Configuration module for loading and parsing TOML configuration files.

use crate::brokerage::{Endpoint, parse_expiry};
use crate::ladder::GRID_MAX_INDEX;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse TOML configuration.
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Invalid configuration value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Brokerage connection defaults.
    pub brokerage: BrokerageConfig,
    /// The single traded instrument.
    pub instrument: InstrumentConfig,
    /// Ladder defaults.
    pub ladder: LadderConfig,
    /// Gateway wait limits.
    pub gateway: GatewayConfig,
    /// Paper venue listing.
    pub paper: PaperVenueConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port number to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Brokerage connection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrokerageConfig {
    /// Gateway host.
    pub host: String,
    /// Gateway port.
    pub port: u16,
    /// Client id presented to the gateway.
    pub client_id: i32,
    /// Session open timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Queue a connect command at startup.
    pub auto_connect: bool,
}

impl BrokerageConfig {
    /// Endpoint built from the configured defaults.
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            host: self.host.clone(),
            port: self.port,
            client_id: self.client_id,
        }
    }

    /// Session open timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for BrokerageConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7497,
            client_id: 1,
            connect_timeout_secs: 20,
            auto_connect: false,
        }
    }
}

/// The instrument all option contracts are written on.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    /// Underlying symbol.
    pub symbol: String,
    /// Routing exchange.
    pub exchange: String,
    /// Trading currency.
    pub currency: String,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            symbol: "SPY".to_string(),
            exchange: "SMART".to_string(),
            currency: "USD".to_string(),
        }
    }
}

/// Ladder defaults used when a request leaves them out.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LadderConfig {
    /// Take-profit distance in dollars.
    pub take_profit: Decimal,
    /// Stop-loss distance in dollars.
    pub stop_loss: Decimal,
    /// Rows shown on each side of the selected row.
    pub window_radius: u32,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            take_profit: dec!(0.05),
            stop_loss: dec!(0.03),
            window_radius: 15,
        }
    }
}

/// How long the gateway waits for the worker to confirm a command.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Wait for trade, cancel, close and discovery commands (ms).
    pub command_wait_ms: u64,
    /// Wait for connect and disconnect commands (ms).
    pub connect_wait_ms: u64,
}

impl GatewayConfig {
    /// Wait applied to ordinary commands.
    #[must_use]
    pub fn command_wait(&self) -> Duration {
        Duration::from_millis(self.command_wait_ms)
    }

    /// Wait applied to session commands.
    #[must_use]
    pub fn connect_wait(&self) -> Duration {
        Duration::from_millis(self.connect_wait_ms)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            command_wait_ms: 2000,
            connect_wait_ms: 3000,
        }
    }
}

/// Listing served by the paper venue.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaperVenueConfig {
    /// Exchange reported on qualified contracts.
    pub exchange: String,
    /// Listed expirations in YYYYMMDD format.
    pub expirations: Vec<String>,
    /// Center of the strike grid.
    pub strike_center: Decimal,
    /// Number of listed strikes.
    pub num_strikes: u32,
    /// Strike spacing in dollars.
    pub strike_spacing: Decimal,
    /// Refuse every session (exercises the connection failure path).
    pub reject_connections: bool,
}

impl PaperVenueConfig {
    /// Generates strike prices centered around `strike_center`.
    ///
    /// Strikes that would fall at or below zero are dropped.
    #[must_use]
    pub fn generate_strikes(&self) -> Vec<Decimal> {
        let half_count = i64::from(self.num_strikes / 2);

        (0..i64::from(self.num_strikes))
            .map(|i| self.strike_center + Decimal::from(i - half_count) * self.strike_spacing)
            .filter(|strike| strike.is_sign_positive() && !strike.is_zero())
            .collect()
    }
}

impl Default for PaperVenueConfig {
    fn default() -> Self {
        Self {
            exchange: "SMART".to_string(),
            expirations: vec!["20251219".to_string(), "20251231".to_string()],
            strike_center: dec!(600),
            num_strikes: 81,
            strike_spacing: dec!(1),
            reject_connections: false,
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file.
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Arguments
    /// * `content` - TOML content as string.
    ///
    /// # Errors
    /// Returns error if content cannot be parsed.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.brokerage.port == 0 {
            return Err(ConfigError::InvalidValue(
                "brokerage port must be positive".to_string(),
            ));
        }
        if self.brokerage.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "brokerage connect_timeout_secs must be positive".to_string(),
            ));
        }
        if self.instrument.symbol.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "instrument symbol cannot be empty".to_string(),
            ));
        }
        if self.ladder.take_profit.is_sign_negative() || self.ladder.stop_loss.is_sign_negative()
        {
            return Err(ConfigError::InvalidValue(
                "ladder take_profit and stop_loss cannot be negative".to_string(),
            ));
        }
        if self.ladder.window_radius > GRID_MAX_INDEX as u32 {
            return Err(ConfigError::InvalidValue(format!(
                "ladder window_radius cannot exceed {}",
                GRID_MAX_INDEX
            )));
        }
        if self.gateway.command_wait_ms == 0 || self.gateway.connect_wait_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "gateway waits must be positive".to_string(),
            ));
        }
        if self.paper.num_strikes == 0 {
            return Err(ConfigError::InvalidValue(
                "paper num_strikes must be positive".to_string(),
            ));
        }
        if self.paper.strike_spacing <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue(
                "paper strike_spacing must be positive".to_string(),
            ));
        }
        if let Some(bad) = self.paper.expirations.iter().find(|e| parse_expiry(e).is_none()) {
            return Err(ConfigError::InvalidValue(format!(
                "paper expiration {} is not YYYYMMDD",
                bad
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[server]
host = "127.0.0.1"
port = 3000

[brokerage]
host = "10.0.0.5"
port = 4002
client_id = 7
connect_timeout_secs = 10

[instrument]
symbol = "QQQ"

[ladder]
take_profit = 0.10
stop_loss = 0.04
window_radius = 20

[gateway]
command_wait_ms = 1500

[paper]
expirations = ["20251219"]
strike_center = 500
num_strikes = 11
strike_spacing = 0.5
"#;

        let config = Config::parse(toml_content).expect("should parse");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.brokerage.endpoint().to_string(), "10.0.0.5:4002 client=7");
        assert_eq!(config.brokerage.connect_timeout(), Duration::from_secs(10));
        assert!(!config.brokerage.auto_connect);
        assert_eq!(config.instrument.symbol, "QQQ");
        assert_eq!(config.instrument.exchange, "SMART");
        assert_eq!(config.ladder.take_profit, dec!(0.10));
        assert_eq!(config.ladder.stop_loss, dec!(0.04));
        assert_eq!(config.ladder.window_radius, 20);
        assert_eq!(config.gateway.command_wait(), Duration::from_millis(1500));
        assert_eq!(config.gateway.connect_wait(), Duration::from_millis(3000));
        assert_eq!(config.paper.strike_spacing, dec!(0.5));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").expect("should parse");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.brokerage.port, 7497);
        assert_eq!(config.brokerage.client_id, 1);
        assert_eq!(config.brokerage.connect_timeout_secs, 20);
        assert_eq!(config.instrument.symbol, "SPY");
        assert_eq!(config.ladder.take_profit, dec!(0.05));
        assert_eq!(config.ladder.stop_loss, dec!(0.03));
        assert_eq!(config.ladder.window_radius, 15);
        assert_eq!(config.gateway.command_wait_ms, 2000);
        assert_eq!(config.gateway.connect_wait_ms, 3000);
    }

    #[test]
    fn test_generate_strikes() {
        let paper = PaperVenueConfig {
            strike_center: dec!(100),
            num_strikes: 5,
            strike_spacing: dec!(2.5),
            ..PaperVenueConfig::default()
        };

        let strikes = paper.generate_strikes();
        assert_eq!(
            strikes,
            vec![dec!(95), dec!(97.5), dec!(100), dec!(102.5), dec!(105)]
        );
    }

    #[test]
    fn test_generate_strikes_drops_non_positive() {
        let paper = PaperVenueConfig {
            strike_center: dec!(1),
            num_strikes: 5,
            strike_spacing: dec!(1),
            ..PaperVenueConfig::default()
        };

        assert_eq!(paper.generate_strikes(), vec![dec!(1), dec!(2), dec!(3)]);
    }

    #[test]
    fn test_validation_rejects_negative_take_profit() {
        let result = Config::parse("[ladder]\ntake_profit = -0.05\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_validation_rejects_bad_expiration() {
        let result = Config::parse("[paper]\nexpirations = [\"2025-12-19\"]\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let config = Config {
            brokerage: BrokerageConfig {
                connect_timeout_secs: 0,
                ..BrokerageConfig::default()
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
