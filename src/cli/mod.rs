//! CLI interface for bdr-reporter
//!
//! Provides subcommands for:
//! - `report`: Fetch prices and write the PDF report
//! - `assets`: List the configured receipt/stock pairs
//! - `config`: Show the effective configuration

mod report;

pub use report::ReportArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bdr-reporter")]
#[command(about = "Compare Brazilian Depositary Receipts with their underlying stocks")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch prices and write the PDF report
    Report(ReportArgs),
    /// List configured receipt/stock pairs
    Assets,
    /// Show the effective configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::LookbackPeriod;

    #[test]
    fn test_parse_report_defaults() {
        let cli = Cli::try_parse_from(["bdr-reporter", "report"]).unwrap();
        assert_eq!(cli.config, "config.toml");
        match cli.command {
            Commands::Report(args) => {
                assert!(args.output.is_none());
                assert!(args.period.is_none());
                assert!(args.only.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_report_overrides() {
        let cli = Cli::try_parse_from([
            "bdr-reporter",
            "--config",
            "custom.toml",
            "report",
            "--output",
            "out.pdf",
            "--period",
            "1y",
            "--only",
            "AAPL34.SA",
            "--only",
            "NVDA",
        ])
        .unwrap();
        assert_eq!(cli.config, "custom.toml");
        let Commands::Report(args) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.output.as_deref(), Some(std::path::Path::new("out.pdf")));
        assert_eq!(args.period, Some(LookbackPeriod::OneYear));
        assert_eq!(args.only, vec!["AAPL34.SA", "NVDA"]);
    }

    #[test]
    fn test_parse_rejects_bad_period() {
        assert!(Cli::try_parse_from(["bdr-reporter", "report", "--period", "7w"]).is_err());
    }
}
