//! Configuration types for bdr-reporter

use crate::market::LookbackPeriod;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Yahoo Finance chart API host
pub const YAHOO_API_URL: &str = "https://query1.finance.yahoo.com";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default = "default_assets")]
    pub assets: Vec<AssetConfig>,
}

/// Report output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Lookback window requested from the provider
    #[serde(default = "default_period")]
    pub period: LookbackPeriod,

    /// Symbol of the local-per-foreign currency rate
    #[serde(default = "default_exchange_rate_symbol")]
    pub exchange_rate_symbol: String,

    /// Path of the generated PDF
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_period() -> LookbackPeriod {
    LookbackPeriod::FiveYears
}
fn default_exchange_rate_symbol() -> String {
    "USDBRL=X".to_string()
}
fn default_output() -> PathBuf {
    PathBuf::from("bdr_analysis_report_5y.pdf")
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
            exchange_rate_symbol: default_exchange_rate_symbol(),
            output: default_output(),
        }
    }
}

/// Market data provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Yahoo rejects requests without a browser-like agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Prefer split/dividend adjusted closes when the provider returns them
    #[serde(default = "default_true")]
    pub adjusted_close: bool,
}

fn default_base_url() -> String {
    YAHOO_API_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36"
        .to_string()
}
fn default_true() -> bool {
    true
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            adjusted_close: true,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

/// A depositary receipt paired with its underlying stock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetConfig {
    /// Display name used in page titles
    pub name: String,
    /// Locally traded receipt (e.g. "AAPL34.SA")
    pub receipt_symbol: String,
    /// Underlying foreign stock (e.g. "AAPL")
    pub stock_symbol: String,
    /// Receipt units per one underlying share
    pub conversion_factor: u32,
}

impl AssetConfig {
    pub fn new(
        name: impl Into<String>,
        receipt_symbol: impl Into<String>,
        stock_symbol: impl Into<String>,
        conversion_factor: u32,
    ) -> Self {
        Self {
            name: name.into(),
            receipt_symbol: receipt_symbol.into(),
            stock_symbol: stock_symbol.into(),
            conversion_factor,
        }
    }
}

fn default_assets() -> Vec<AssetConfig> {
    vec![
        AssetConfig::new("Apple Inc.", "AAPL34.SA", "AAPL", 20),
        AssetConfig::new("Microsoft Corporation", "MSFT34.SA", "MSFT", 24),
        AssetConfig::new("Google (Alphabet Inc.)", "GOGL34.SA", "GOOGL", 12),
        AssetConfig::new("Amazon Inc.", "AMZO34.SA", "AMZN", 20),
        AssetConfig::new("NVIDIA Corporation", "NVDC34.SA", "NVDA", 48),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report: ReportConfig::default(),
            provider: ProviderConfig::default(),
            telemetry: TelemetryConfig::default(),
            assets: default_assets(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No assets configured")]
    NoAssets,
    #[error("Asset {0:?} has a zero conversion factor")]
    ZeroConversionFactor(String),
    #[error("Asset {0:?} has a blank symbol")]
    BlankSymbol(String),
    #[error("Exchange rate symbol is blank")]
    BlankExchangeRateSymbol,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Check the invariants the pipeline relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.assets.is_empty() {
            return Err(ConfigError::NoAssets);
        }
        if self.report.exchange_rate_symbol.trim().is_empty() {
            return Err(ConfigError::BlankExchangeRateSymbol);
        }
        for asset in &self.assets {
            if asset.conversion_factor == 0 {
                return Err(ConfigError::ZeroConversionFactor(asset.name.clone()));
            }
            if asset.receipt_symbol.trim().is_empty() || asset.stock_symbol.trim().is_empty() {
                return Err(ConfigError::BlankSymbol(asset.name.clone()));
            }
        }
        Ok(())
    }
}
