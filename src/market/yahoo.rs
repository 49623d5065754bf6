//! Yahoo Finance chart API client
//!
//! Fetches daily closing prices from the v8 chart endpoint. Timestamps are
//! exchange-session opens in UTC; each one is converted to the exchange's
//! local date through its IANA zone, so bars keep their date across DST
//! changes. The fixed `gmtoffset` is only used when the zone is unknown.

use super::{ClosingSeries, FetchError, LookbackPeriod, PriceSource};
use crate::config::ProviderConfig;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

/// Client for the Yahoo Finance chart API
pub struct YahooClient {
    config: ProviderConfig,
    client: Client,
}

impl YahooClient {
    /// Create a new client with custom configuration
    pub fn with_config(config: ProviderConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { config, client })
    }

    /// Build the chart URL for a symbol
    fn chart_url(&self, symbol: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}",
            self.config.base_url.trim_end_matches('/'),
            symbol
        )
    }
}

#[async_trait]
impl PriceSource for YahooClient {
    async fn fetch_closes(
        &self,
        symbol: &str,
        period: LookbackPeriod,
    ) -> Result<ClosingSeries, FetchError> {
        let url = self.chart_url(symbol);

        tracing::debug!(url = %url, %period, "Fetching daily closes");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("range", period.as_str()),
                ("interval", "1d"),
                ("includeAdjustedClose", "true"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_error(status.as_u16(), body));
        }

        let series = parse_chart(symbol, &body, self.config.adjusted_close)?;

        tracing::debug!(
            symbol,
            points = series.len(),
            "Parsed chart response"
        );

        Ok(series)
    }
}

/// Map a non-success response to an error
///
/// Unknown symbols come back as 404 with an error envelope; anything else
/// keeps the raw status and body.
fn classify_error(status: u16, body: String) -> FetchError {
    match serde_json::from_str::<ChartEnvelope>(&body) {
        Ok(ChartEnvelope {
            chart: ChartBody {
                error: Some(error),
                ..
            },
        }) => error.into(),
        _ => FetchError::Status { status, body },
    }
}

/// Parse a chart API response body into a closing series
///
/// Missing, non-finite and non-positive closes are dropped. When several
/// points fall on the same trading date the last one wins. Adjusted closes
/// are used when `adjusted` is set and the response carries them.
pub fn parse_chart(symbol: &str, body: &str, adjusted: bool) -> Result<ClosingSeries, FetchError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;

    if let Some(error) = envelope.chart.error {
        return Err(error.into());
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| FetchError::NoData {
            symbol: symbol.to_string(),
        })?;

    let zone = SessionZone::from_meta(&result.meta);
    let closes = select_closes(result.indicators, adjusted);

    let mut by_date: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for (ts, close) in result.timestamp.iter().zip(closes) {
        let Some(date) = zone.trading_date(*ts) else {
            continue;
        };
        let Some(price) = close.and_then(close_to_decimal) else {
            continue;
        };
        by_date.insert(date, price);
    }

    if by_date.is_empty() {
        return Err(FetchError::NoData {
            symbol: symbol.to_string(),
        });
    }

    Ok(ClosingSeries::new(
        result.meta.symbol.unwrap_or_else(|| symbol.to_string()),
        by_date.into_iter().collect(),
    ))
}

fn select_closes(indicators: Indicators, adjusted: bool) -> Vec<Option<f64>> {
    if adjusted {
        if let Some(adj) = indicators
            .adjclose
            .into_iter()
            .next()
            .filter(|a| !a.adjclose.is_empty())
        {
            return adj.adjclose;
        }
    }
    indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default()
}

/// Clock used to turn session timestamps into local trading dates
#[derive(Debug, Clone, Copy, PartialEq)]
enum SessionZone {
    Named(Tz),
    /// Offset in seconds, valid only for the DST state at request time
    Fixed(i64),
}

impl SessionZone {
    fn from_meta(meta: &ChartMeta) -> Self {
        match meta
            .exchange_timezone_name
            .as_deref()
            .map(|name| name.parse::<Tz>())
        {
            Some(Ok(tz)) => SessionZone::Named(tz),
            Some(Err(_)) => {
                tracing::debug!(
                    zone = ?meta.exchange_timezone_name,
                    gmtoffset = meta.gmtoffset,
                    "Unknown exchange zone, using fixed offset"
                );
                SessionZone::Fixed(meta.gmtoffset)
            }
            None => SessionZone::Fixed(meta.gmtoffset),
        }
    }

    fn trading_date(&self, timestamp: i64) -> Option<NaiveDate> {
        match self {
            SessionZone::Named(tz) => DateTime::from_timestamp(timestamp, 0)
                .map(|utc| utc.with_timezone(tz).date_naive()),
            SessionZone::Fixed(offset) => {
                DateTime::from_timestamp(timestamp.checked_add(*offset)?, 0)
                    .map(|dt| dt.date_naive())
            }
        }
    }
}

fn close_to_decimal(close: f64) -> Option<Decimal> {
    if !close.is_finite() || close <= 0.0 {
        return None;
    }
    // Shortest round-trip text keeps 185.64 from becoming 185.639999...
    Decimal::from_str(&close.to_string()).ok()
}

/// Top-level chart response
#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

/// Error object embedded in the chart response
#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

impl From<ChartError> for FetchError {
    fn from(error: ChartError) -> Self {
        FetchError::Provider {
            code: error.code,
            description: error.description.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    /// Absent when the range holds no sessions
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    symbol: Option<String>,
    /// Exchange offset from UTC at request time (seconds)
    #[serde(default)]
    gmtoffset: i64,
    /// IANA zone of the exchange (e.g. "America/Sao_Paulo")
    #[serde(rename = "exchangeTimezoneName")]
    exchange_timezone_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}
