use clap::{Parser, Subcommand};
use defi_position_monitor::{
    blockchain::EthereumClient,
    config::{MarketsFile, Settings},
    services::{MonitoringService, PositionAggregator, ReportFormatter, ReportSink, StdoutSink, WatchSession},
    utils::init_logging,
    AppError,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Read-only monitor for vault and borrow positions.
#[derive(Parser, Debug)]
#[command(name = "defi-position-monitor")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Value every configured market once for each address
    Check {
        /// Addresses to report on
        #[arg(required = true)]
        addresses: Vec<String>,

        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report on one address periodically until interrupted
    Monitor {
        /// Addresses to track
        #[arg(required = true)]
        addresses: Vec<String>,

        /// 1-based position of the address to report on
        #[arg(long, default_value_t = 1)]
        select: usize,

        /// Seconds between checks, overrides CHECK_INTERVAL_SECONDS
        #[arg(long)]
        interval: Option<u64>,

        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// List configured markets
    Markets,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let settings = match Settings::new() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&settings.logging) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli.command, settings).await {
        error!(error = %e, "Fatal error");
        std::process::exit(1);
    }
}

async fn run(command: Commands, settings: Settings) -> Result<(), AppError> {
    let markets = settings.load_markets()?;

    match command {
        Commands::Markets => {
            let lending = markets.lending_markets()?;
            let borrow = markets.borrow_markets()?;
            print!("{}", ReportFormatter::format_markets(&lending, &borrow));
            Ok(())
        }
        Commands::Check { addresses, json } => {
            let mut session = WatchSession::new();
            for address in &addresses {
                session.add_address(address)?;
            }

            let aggregator = connect(&settings, &markets).await?;
            let sink = StdoutSink::new(json);
            for address in session.addresses() {
                let report = aggregator.fetch_positions(*address).await;
                sink.publish(&report);
            }
            Ok(())
        }
        Commands::Monitor {
            addresses,
            select,
            interval,
            json,
        } => {
            let mut session = WatchSession::new();
            for address in &addresses {
                session.add_address(address)?;
            }
            session.select(select)?;
            session.toggle_monitoring()?;

            let aggregator = Arc::new(connect(&settings, &markets).await?);
            let mut service = MonitoringService::new(aggregator.clone(), &settings.monitoring);
            if let Some(seconds) = interval.filter(|seconds| *seconds > 0) {
                service = MonitoringService::with_intervals(
                    aggregator,
                    Duration::from_secs(seconds),
                    Duration::from_secs(settings.monitoring.first_check_delay_seconds),
                );
            }

            let sink = StdoutSink::new(json);
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!(error = %e, "Failed to listen for shutdown signal");
                    std::future::pending::<()>().await;
                }
                info!("Shutdown signal received");
            };

            let cycles = service.run_until(&session, &sink, shutdown).await?;
            info!(cycles, "Monitor stopped");
            Ok(())
        }
    }
}

async fn connect(
    settings: &Settings,
    markets: &MarketsFile,
) -> Result<PositionAggregator, AppError> {
    let client = EthereumClient::new(settings.blockchain.require_rpc_url()?).await?;
    let call_timeout = Duration::from_secs(settings.blockchain.rpc_timeout_seconds);
    PositionAggregator::connect(client, markets, call_timeout).await
}
