use anyhow::Context;
use clap::Parser;
use kandel_backtest::cli::{Cli, Commands};
use kandel_backtest::config::Config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("Could not load config from {}", cli.config.display()))?;

    kandel_backtest::telemetry::init_telemetry(&config.telemetry)?;

    match &cli.command {
        Commands::Run(args) => {
            tracing::info!(mode = ?config.data.mode, "Starting backtest");
            args.execute(&config)?;
        }
        Commands::Backtest(args) => {
            tracing::info!("Starting single backtest");
            args.execute(&config)?;
        }
        Commands::Sweep(args) => {
            tracing::info!("Starting sample sweep");
            args.execute(&config)?;
        }
        Commands::Config => {
            println!("Current configuration:");
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
