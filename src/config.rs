use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// How the stock applier writes a new stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockWriteMode {
    /// One increment executed by the store.
    #[default]
    Atomic,
    /// Read the stock, then write `current + delta` guarded by the version read.
    ReadModifyWrite,
}

/// What the stock applier does with a line whose product no longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingProductPolicy {
    /// Read it as stock 0 and attempt the write; the line is reported unmatched.
    #[default]
    AssumeZero,
    /// Fail the line.
    Reject,
}

/// Which order types must name a partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnerRequirement {
    SaleAndPurchase,
    #[default]
    AllKinds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReconcilerConfig {
    #[serde(default)]
    pub stock_write_mode: StockWriteMode,
    #[serde(default)]
    pub missing_product: MissingProductPolicy,
    #[serde(default)]
    pub partner_requirement: PartnerRequirement,
    #[serde(default)]
    pub enforce_unique_order_number: bool,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_actor_buffer")]
    pub actor_buffer: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_actor_buffer() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            stock_write_mode: StockWriteMode::default(),
            missing_product: MissingProductPolicy::default(),
            partner_requirement: PartnerRequirement::default(),
            enforce_unique_order_number: false,
            request_timeout_ms: default_request_timeout_ms(),
            actor_buffer: default_actor_buffer(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl ReconcilerConfig {
    /// Loads `.env`, an optional `backoffice.{toml,yaml,json}` file, then
    /// `BACKOFFICE__*` environment variables, later sources winning.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("backoffice").required(false))
            .add_source(Environment::with_prefix("BACKOFFICE").separator("__"))
            .build()?;

        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        config.try_deserialize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
