use bdr_reporter::cli::{Cli, Commands};
use bdr_reporter::config::Config;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            toml::from_str(include_str!("../config.toml.example"))?
        }
    };

    // Initialize telemetry
    bdr_reporter::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Report(args) => {
            args.execute(config).await?;
        }
        Commands::Assets => {
            println!("{:<24} {:<10} {:<6} {:>6}", "Name", "Receipt", "Stock", "Factor");
            for asset in &config.assets {
                println!(
                    "{:<24} {:<10} {:<6} {:>6}",
                    asset.name, asset.receipt_symbol, asset.stock_symbol, asset.conversion_factor
                );
            }
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Period: {}", config.report.period);
            println!("  Exchange rate: {}", config.report.exchange_rate_symbol);
            println!("  Output: {}", config.report.output.display());
            println!(
                "  Provider: {} (timeout {}s, adjusted closes: {})",
                config.provider.base_url, config.provider.timeout_secs, config.provider.adjusted_close
            );
            println!("  Assets: {}", config.assets.len());
            println!("  Log level: {}", config.telemetry.log_level);
        }
    }

    Ok(())
}
