//! Report pipeline
//!
//! For each configured asset, in order: fetch the receipt, stock and
//! exchange-rate closes, align them, compute the valuation and append one
//! page. Fetch failures and empty tables skip the asset; only page sink
//! errors abort the run. [`Reporter::write_report`] finalizes the document
//! whether or not the run completed, so pages appended before a failure
//! still reach disk.

use crate::chart::{AssetPage, PageSink, RenderError};
use crate::config::{AssetConfig, ReportConfig};
use crate::market::{FetchError, LookbackPeriod, PriceSource};
use crate::table::PriceTable;
use crate::valuation::Valuation;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Why an asset produced no page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// A series could not be retrieved
    Fetch { symbol: String, error: String },
    /// No overlapping dates survived cleaning
    Empty,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Fetch { symbol, error } => {
                write!(f, "failed to fetch {symbol}: {error}")
            }
            SkipReason::Empty => f.write_str("no data after cleaning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedAsset {
    pub name: String,
    pub reason: SkipReason,
}

/// Outcome of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Names of assets that got a page, in page order
    pub rendered: Vec<String>,
    pub skipped: Vec<SkippedAsset>,
    /// Pages in the written document, zero until the sink is finished
    pub pages: usize,
}

/// Runs the fetch/compute/render loop against a price source
pub struct Reporter<P: PriceSource> {
    source: P,
    period: LookbackPeriod,
    exchange_rate_symbol: String,
}

impl<P: PriceSource> Reporter<P> {
    pub fn new(source: P, config: &ReportConfig) -> Self {
        Self {
            source,
            period: config.period,
            exchange_rate_symbol: config.exchange_rate_symbol.clone(),
        }
    }

    /// Process every asset, appending one page per usable asset to `sink`
    pub async fn run<S: PageSink>(
        &self,
        assets: &[AssetConfig],
        sink: &mut S,
    ) -> Result<RunSummary, RenderError> {
        let mut summary = RunSummary::default();

        for asset in assets {
            tracing::info!(asset = %asset.name, receipt = %asset.receipt_symbol, "Processing");

            let page = match self.build_page(asset).await {
                Ok(page) => page,
                Err(reason) => {
                    tracing::warn!(asset = %asset.name, %reason, "Skipping asset");
                    summary.skipped.push(SkippedAsset {
                        name: asset.name.clone(),
                        reason,
                    });
                    continue;
                }
            };

            sink.append(&page)?;
            summary.rendered.push(asset.name.clone());
        }

        tracing::info!(
            rendered = summary.rendered.len(),
            skipped = summary.skipped.len(),
            "Run complete"
        );

        Ok(summary)
    }

    /// Run over `assets` and finish `sink` into `path`, even when the run fails
    ///
    /// A run error takes precedence over a finish error; the latter is logged.
    pub async fn write_report<S: PageSink>(
        &self,
        assets: &[AssetConfig],
        mut sink: S,
        path: impl AsRef<Path>,
    ) -> Result<RunSummary, RenderError> {
        let path = path.as_ref();
        let outcome = self.run(assets, &mut sink).await;
        let finished = sink.finish(path);

        match (outcome, finished) {
            (Ok(mut summary), Ok(pages)) => {
                summary.pages = pages;
                Ok(summary)
            }
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(pages)) => {
                tracing::error!(
                    path = %path.display(),
                    pages,
                    error = %e,
                    "Run aborted, partial report written"
                );
                Err(e)
            }
            (Err(e), Err(finish_error)) => {
                tracing::error!(
                    path = %path.display(),
                    error = %finish_error,
                    "Run aborted and partial report could not be written"
                );
                Err(e)
            }
        }
    }

    /// Fetch, align and value one asset
    async fn build_page(&self, asset: &AssetConfig) -> Result<AssetPage, SkipReason> {
        let receipt = self.fetch(&asset.receipt_symbol).await?;
        let stock = self.fetch(&asset.stock_symbol).await?;
        let fx = self.fetch(&self.exchange_rate_symbol).await?;

        if let Some(series) = [&receipt, &stock, &fx].into_iter().find(|s| s.is_empty()) {
            tracing::debug!(asset = %asset.name, symbol = %series.symbol, "Series has no closes");
            return Err(SkipReason::Empty);
        }

        let table = PriceTable::align(&receipt, &stock, &fx);
        let valuation = Valuation::compute(&table, asset.conversion_factor);

        let Some(latest) = valuation.latest() else {
            return Err(SkipReason::Empty);
        };

        tracing::info!(
            asset = %asset.name,
            rows = valuation.rows().len(),
            date = %latest.date,
            divergence_pct = %latest.divergence_pct.round_dp(2),
            "Most recent divergence"
        );

        Ok(AssetPage::new(
            asset,
            &self.exchange_rate_symbol,
            self.period,
            &valuation,
        ))
    }

    async fn fetch(&self, symbol: &str) -> Result<crate::market::ClosingSeries, SkipReason> {
        self.source
            .fetch_closes(symbol, self.period)
            .await
            .map_err(|e: FetchError| SkipReason::Fetch {
                symbol: symbol.to_string(),
                error: e.to_string(),
            })
    }
}
