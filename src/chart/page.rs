//! Page content and the sink pages are appended to

use super::RenderError;
use crate::config::AssetConfig;
use crate::market::LookbackPeriod;
use crate::valuation::{Valuation, ValuationRow};
use std::path::Path;

/// Everything drawn on one asset page
#[derive(Debug, Clone, PartialEq)]
pub struct AssetPage {
    /// Asset display name
    pub name: String,
    pub title: String,
    pub subtitle: String,
    pub rows: Vec<ValuationRow>,
}

impl AssetPage {
    pub fn new(
        asset: &AssetConfig,
        exchange_rate_symbol: &str,
        period: LookbackPeriod,
        valuation: &Valuation,
    ) -> Self {
        let title = format!(
            "Analysis Report: {} ({}) - {}",
            asset.name, asset.receipt_symbol, period
        );

        let mut subtitle = format!(
            "{} x {} / {}",
            asset.stock_symbol, exchange_rate_symbol, asset.conversion_factor
        );
        if let (Some(first), Some(last)) = (valuation.rows().first(), valuation.latest()) {
            subtitle.push_str(&format!(" | {} to {}", first.date, last.date));
        }
        if let Some(summary) = valuation.summary() {
            subtitle.push_str(&format!(
                " | divergence latest {:.2}%, mean {:.2}%, range {:.2}% to {:.2}%",
                summary.latest, summary.mean, summary.min, summary.max
            ));
        }

        Self {
            name: asset.name.clone(),
            title,
            subtitle,
            rows: valuation.rows().to_vec(),
        }
    }
}

/// Append-only destination for rendered pages
pub trait PageSink {
    /// Render `page` as the next page of the document
    fn append(&mut self, page: &AssetPage) -> Result<(), RenderError>;

    /// Number of pages appended so far
    fn pages(&self) -> usize;

    /// Write the document to `path`, returning the page count
    fn finish(self, path: impl AsRef<Path>) -> Result<usize, RenderError>
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{PriceRow, PriceTable};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_page_text() {
        let asset = AssetConfig::new("Apple Inc.", "AAPL34.SA", "AAPL", 20);
        let table = PriceTable::from_rows(vec![
            PriceRow {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                receipt: dec!(36),
                stock: dec!(150),
                exchange_rate: dec!(5),
            },
            PriceRow {
                date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                receipt: dec!(40),
                stock: dec!(150),
                exchange_rate: dec!(5),
            },
        ]);
        let valuation = Valuation::compute(&table, 20);
        let page = AssetPage::new(&asset, "USDBRL=X", LookbackPeriod::FiveYears, &valuation);

        assert_eq!(page.title, "Analysis Report: Apple Inc. (AAPL34.SA) - 5y");
        assert!(page.subtitle.starts_with("AAPL x USDBRL=X / 20 | 2024-01-02 to 2024-01-03"));
        assert!(page.subtitle.contains("latest 6.67%"));
        assert!(page.subtitle.contains("range -4.00% to 6.67%"));
        assert_eq!(page.rows.len(), 2);
    }
}
