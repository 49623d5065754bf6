//! Integration tests for configuration loading

use bdr_reporter::config::{Config, LogFormat};
use bdr_reporter::market::LookbackPeriod;
use std::io::Write;

#[test]
fn test_config_example_loads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(include_str!("../../config.toml.example").as_bytes())
        .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.report.period, LookbackPeriod::FiveYears);
    assert_eq!(config.report.exchange_rate_symbol, "USDBRL=X");
    assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
    assert_eq!(config.assets.len(), 5);
    assert_eq!(config.assets[4].receipt_symbol, "NVDC34.SA");
    assert_eq!(config.assets[4].conversion_factor, 48);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_config_keeps_default_assets() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[report]\nperiod = \"ytd\"").unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.report.period, LookbackPeriod::YearToDate);
    assert_eq!(config.assets, Config::default().assets);
}

#[test]
fn test_invalid_config_is_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[report]\nperiod = 5").unwrap();

    assert!(Config::load(file.path()).is_err());
}
