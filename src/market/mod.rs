//! Market data module
//!
//! Daily closing prices from the Yahoo Finance chart API

mod types;
mod yahoo;

pub use types::{ClosingSeries, FetchError, LookbackPeriod};
pub use yahoo::{parse_chart, YahooClient};

use async_trait::async_trait;

/// Trait for historical price sources
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch daily closes for `symbol` over `period`
    async fn fetch_closes(
        &self,
        symbol: &str,
        period: LookbackPeriod,
    ) -> Result<ClosingSeries, FetchError>;
}
