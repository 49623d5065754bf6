//! End-to-end pipeline tests against an in-memory price source

use async_trait::async_trait;
use bdr_reporter::chart::{AssetPage, PageSink, PdfReport, RenderError};
use bdr_reporter::config::{AssetConfig, ReportConfig};
use bdr_reporter::market::{parse_chart, ClosingSeries, FetchError, LookbackPeriod, PriceSource};
use bdr_reporter::report::{Reporter, SkipReason};
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::path::Path;

/// Deterministic daily series for a handful of symbols
struct FixtureSource {
    series: HashMap<&'static str, ClosingSeries>,
}

impl FixtureSource {
    fn new() -> Self {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let daily = |symbol: &'static str, base: Decimal, step: Decimal| {
            let points = (0..400)
                .map(|i| {
                    (
                        start + Duration::days(i),
                        base + step * Decimal::from(i % 30),
                    )
                })
                .collect();
            (symbol, ClosingSeries::new(symbol, points))
        };

        let series = HashMap::from([
            daily("AAPL34.SA", dec!(40), dec!(0.1)),
            daily("AAPL", dec!(150), dec!(0.5)),
            daily("MSFT34.SA", dec!(70), dec!(0.2)),
            daily("MSFT", dec!(330), dec!(1)),
            daily("USDBRL=X", dec!(5), dec!(0.01)),
            ("NVDC34.SA", ClosingSeries::new("NVDC34.SA", Vec::new())),
            daily("NVDA", dec!(480), dec!(2)),
        ]);

        Self { series }
    }
}

#[async_trait]
impl PriceSource for FixtureSource {
    async fn fetch_closes(
        &self,
        symbol: &str,
        _period: LookbackPeriod,
    ) -> Result<ClosingSeries, FetchError> {
        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| FetchError::NoData {
                symbol: symbol.to_string(),
            })
    }
}

fn assets() -> Vec<AssetConfig> {
    vec![
        AssetConfig::new("Apple Inc.", "AAPL34.SA", "AAPL", 20),
        AssetConfig::new("Amazon Inc.", "AMZO34.SA", "AMZN", 20),
        AssetConfig::new("Microsoft Corporation", "MSFT34.SA", "MSFT", 24),
        AssetConfig::new("NVIDIA Corporation", "NVDC34.SA", "NVDA", 48),
    ]
}

/// Forwards to a PDF report until `limit` pages are held, then fails
struct LimitedSink {
    inner: PdfReport,
    limit: usize,
}

impl PageSink for LimitedSink {
    fn append(&mut self, page: &AssetPage) -> Result<(), RenderError> {
        if self.inner.pages() >= self.limit {
            return Err(RenderError::Pdf(format!("page limit reached at {}", page.name)));
        }
        self.inner.append(page)
    }

    fn pages(&self) -> usize {
        self.inner.pages()
    }

    fn finish(self, path: impl AsRef<Path>) -> Result<usize, RenderError> {
        self.inner.finish(path)
    }
}

#[tokio::test]
async fn test_report_has_one_page_per_usable_asset() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("bdr_report.pdf");

    let reporter = Reporter::new(FixtureSource::new(), &ReportConfig::default());
    let mut pdf = PdfReport::new("BDR Analysis");

    let summary = reporter.run(&assets(), &mut pdf).await.unwrap();

    assert_eq!(summary.rendered, vec!["Apple Inc.", "Microsoft Corporation"]);
    assert_eq!(summary.skipped.len(), 2);
    assert_eq!(summary.skipped[0].name, "Amazon Inc.");
    assert!(matches!(summary.skipped[0].reason, SkipReason::Fetch { .. }));
    assert_eq!(summary.skipped[1].name, "NVIDIA Corporation");
    assert_eq!(summary.skipped[1].reason, SkipReason::Empty);
    assert_eq!(pdf.pages(), 2);

    assert_eq!(pdf.finish(&output).unwrap(), 2);
    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_report_with_no_usable_assets_writes_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("empty.pdf");

    let reporter = Reporter::new(FixtureSource::new(), &ReportConfig::default());
    let mut pdf = PdfReport::new("BDR Analysis");

    let only_broken = vec![AssetConfig::new("NVIDIA Corporation", "NVDC34.SA", "NVDA", 48)];
    let summary = reporter.run(&only_broken, &mut pdf).await.unwrap();

    assert!(summary.rendered.is_empty());
    assert_eq!(pdf.finish(&output).unwrap(), 0);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_write_report_keeps_pages_before_failure() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("partial.pdf");

    let reporter = Reporter::new(FixtureSource::new(), &ReportConfig::default());
    let sink = LimitedSink {
        inner: PdfReport::new("BDR Analysis"),
        limit: 1,
    };

    let result = reporter.write_report(&assets(), sink, &output).await;

    match result {
        Err(RenderError::Pdf(msg)) => assert!(msg.contains("Microsoft Corporation")),
        other => panic!("expected render error, got {other:?}"),
    }
    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_write_report_counts_pages() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("bdr_report.pdf");

    let reporter = Reporter::new(FixtureSource::new(), &ReportConfig::default());
    let summary = reporter
        .write_report(&assets(), PdfReport::new("BDR Analysis"), &output)
        .await
        .unwrap();

    assert_eq!(summary.pages, 2);
    assert!(output.exists());
}

#[test]
fn test_parsed_chart_feeds_alignment() {
    let body = r#"{"chart": {"result": [{
        "meta": {"symbol": "AAPL", "gmtoffset": -18000},
        "timestamp": [1704205800, 1704292200],
        "indicators": {"quote": [{"close": [185.64, 184.25]}]}
    }], "error": null}}"#;

    let series = parse_chart("AAPL", body, false).unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series.points[1].1, dec!(184.25));
}
