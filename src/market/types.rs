//! Market data types

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lookback window understood by the chart endpoint's `range` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LookbackPeriod {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    YearToDate,
    Max,
}

impl LookbackPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookbackPeriod::OneMonth => "1mo",
            LookbackPeriod::ThreeMonths => "3mo",
            LookbackPeriod::SixMonths => "6mo",
            LookbackPeriod::OneYear => "1y",
            LookbackPeriod::TwoYears => "2y",
            LookbackPeriod::FiveYears => "5y",
            LookbackPeriod::TenYears => "10y",
            LookbackPeriod::YearToDate => "ytd",
            LookbackPeriod::Max => "max",
        }
    }
}

impl fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookbackPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1mo" => Ok(LookbackPeriod::OneMonth),
            "3mo" => Ok(LookbackPeriod::ThreeMonths),
            "6mo" => Ok(LookbackPeriod::SixMonths),
            "1y" => Ok(LookbackPeriod::OneYear),
            "2y" => Ok(LookbackPeriod::TwoYears),
            "5y" => Ok(LookbackPeriod::FiveYears),
            "10y" => Ok(LookbackPeriod::TenYears),
            "ytd" => Ok(LookbackPeriod::YearToDate),
            "max" => Ok(LookbackPeriod::Max),
            other => Err(format!(
                "unknown period {other:?} (expected 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd or max)"
            )),
        }
    }
}

impl TryFrom<String> for LookbackPeriod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LookbackPeriod> for String {
    fn from(period: LookbackPeriod) -> Self {
        period.as_str().to_string()
    }
}

/// Daily closing prices for one symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingSeries {
    /// Provider symbol (e.g. "AAPL34.SA")
    pub symbol: String,
    /// Ascending by date, at most one point per date
    pub points: Vec<(NaiveDate, Decimal)>,
}

impl ClosingSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<(NaiveDate, Decimal)>) -> Self {
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Market data retrieval errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure (DNS, TLS, timeout...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success status without a provider error payload
    #[error("Provider returned {status}: {body}")]
    Status { status: u16, body: String },
    /// Error object reported by the provider
    #[error("Provider error {code}: {description}")]
    Provider { code: String, description: String },
    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    /// Response was well-formed but carried no usable closes
    #[error("No price data for {symbol}")]
    NoData { symbol: String },
}
