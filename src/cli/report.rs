//! Report command implementation

use crate::chart::PdfReport;
use crate::config::{AssetConfig, Config};
use crate::market::{LookbackPeriod, YahooClient};
use crate::report::Reporter;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Output PDF path (overrides the config file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Lookback period: 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd or max
    #[arg(short, long)]
    pub period: Option<LookbackPeriod>,

    /// Only process assets whose receipt or stock symbol matches (repeatable)
    #[arg(long)]
    pub only: Vec<String>,
}

impl ReportArgs {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(output) = &self.output {
            config.report.output = output.clone();
        }
        if let Some(period) = self.period {
            config.report.period = period;
        }
        if !self.only.is_empty() {
            config.assets.retain(|asset| self.selects(asset));
        }
        config
    }

    fn selects(&self, asset: &AssetConfig) -> bool {
        self.only.iter().any(|symbol| {
            symbol.eq_ignore_ascii_case(&asset.receipt_symbol)
                || symbol.eq_ignore_ascii_case(&asset.stock_symbol)
        })
    }

    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let config = self.apply(config);
        config.validate()?;

        tracing::info!(
            output = %config.report.output.display(),
            period = %config.report.period,
            assets = config.assets.len(),
            "Starting BDR analysis"
        );

        let client = YahooClient::with_config(config.provider.clone())?;
        let reporter = Reporter::new(client, &config.report);
        let pdf = PdfReport::new(format!("BDR Analysis - {}", config.report.period));

        let summary = reporter
            .write_report(&config.assets, pdf, &config.report.output)
            .await?;

        println!("Report: {}", config.report.output.display());
        println!("  Pages: {}", summary.pages);
        for name in &summary.rendered {
            println!("  [+] {}", name);
        }
        for skipped in &summary.skipped {
            println!("  [!] {}: {}", skipped.name, skipped.reason);
        }

        Ok(())
    }
}
