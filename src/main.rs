//! Habit tracker HTTP service entry point.

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use habit_tracker::api::{bind, serve, AppState};
use habit_tracker::config::Config;
use habit_tracker::metrics;
use habit_tracker::utils::shutdown_signal;

/// In-memory users and habits HTTP service.
#[derive(Parser, Debug)]
#[command(name = "habit-tracker")]
#[command(about = "Track users and their daily, weekly or monthly habits over HTTP")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// Interface to bind (overrides HABITS_HOST).
    #[arg(long)]
    host: Option<String>,

    /// HTTP port (overrides HABITS_PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default).
    Run {
        /// Interface to bind (overrides HABITS_HOST).
        #[arg(long)]
        host: Option<String>,

        /// HTTP port (overrides HABITS_PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the effective configuration and exit.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    let loaded = Config::load();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("habit_tracker=debug,tower_http=debug,info")
    } else {
        let fallback = loaded.as_ref().map(|c| c.log_level.as_str()).unwrap_or("info");
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(args.json_logs.then(|| fmt::layer().json()))
        .with((!args.json_logs).then(fmt::layer))
        .init();

    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::Run { host, port }) => {
            apply_overrides(&mut config, host, port);
            cmd_run(config).await
        }
        None => {
            apply_overrides(&mut config, args.host, args.port);
            cmd_run(config).await
        }
    }
}

fn apply_overrides(config: &mut Config, host: Option<String>, port: Option<u16>) {
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
}

/// Print the effective configuration.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("HABIT TRACKER - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Listen Address: {}:{}", config.host, config.port);
    println!("  Log Level: {}", config.log_level);
    println!("  Id Strategy: {}", config.id_strategy()?);
    println!("  Strict Not Found: {}", config.strict_not_found);
    println!("  Seed Users: {}", config.seed_users);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Serve the API until a shutdown signal arrives.
async fn cmd_run(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    let store = config.build_store()?;
    info!(
        users = store.len(),
        id_strategy = %store.id_strategy(),
        strict_not_found = config.strict_not_found,
        "Store initialized"
    );

    let mut state = AppState::new(store).with_strict_not_found(config.strict_not_found);
    match metrics::install_recorder() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => warn!("Prometheus recorder unavailable: {}", e),
    }

    let listener = match bind(&config.host, config.port).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}:{}: {}", config.host, config.port, e);
            std::process::exit(1);
        }
    };

    serve(listener, state, shutdown_signal()).await?;

    info!("Server stopped");
    Ok(())
}
