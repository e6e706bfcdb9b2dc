//! arris-modem-exporter
//!
//! Polls the downstream channel table of an Arris cable modem and serves it as
//! Prometheus metrics. This is the main entry point that initializes the server
//! and handles subcommands.
//!
//! The poller runs on its own thread with a blocking HTTP client; the tokio
//! runtime only serves HTTP and is built after the collector exists.

mod cache;
mod cli;
mod commands;
mod config;
mod handlers;
mod metrics;
mod poller;
mod state;

use axum::{routing::get, Router};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::{mpsc, Arc};
use std::time::Duration;
use tokio::{net::TcpListener, signal};
use tracing::{debug, error, info, level_filters::LevelFilter};

use cli::{Args, Commands, LogLevel};
use commands::{command_charts, command_check, command_config, command_test};
use config::{
    resolve_config, show_config, validate_effective_config, Config, DEFAULT_BIND_ADDR,
    DEFAULT_PORT, DEFAULT_UPDATE_EVERY,
};
use handlers::{
    charts_handler, config_handler, data_handler, health_handler, metrics_handler, root_handler,
};
use poller::{build_collector, spawn_poller};
use state::{AppState, SharedState};

/// Initializes tracing logging subsystem with the configured log level.
fn setup_logging(config: &Config) {
    let level = config
        .log_level
        .as_deref()
        .and_then(LogLevel::from_name)
        .unwrap_or(LogLevel::Info);

    let filter = match level {
        LogLevel::Off => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return;
    }

    debug!("Logging initialized with level: {}", level.as_str());
}

/// Exits the process with error code 1 if validation fails.
fn require_valid_config(config: &Config) {
    if let Err(e) = validate_effective_config(config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
}

/// Main application entry point.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            require_valid_config(&config);
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format);
    }

    let config = resolve_config(&args)?;
    setup_logging(&config);

    if let Some(command) = &args.command {
        return match command {
            Commands::Check => {
                if !command_check(&config)? {
                    std::process::exit(1);
                }
                Ok(())
            }

            Commands::Config {
                output,
                format,
                commented,
            } => Ok(command_config(output.clone(), *format, *commented)?),

            Commands::Test {
                iterations,
                verbose,
            } => {
                require_valid_config(&config);
                Ok(command_test(*iterations, *verbose, &config)?)
            }

            Commands::Charts { format } => {
                require_valid_config(&config);
                Ok(command_charts(*format, &config)?)
            }
        };
    }

    serve(config)
}

/// Runs the exporter: poller thread plus HTTP server until a shutdown signal.
fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    require_valid_config(&config);

    info!("Starting arris-modem-exporter");

    let collector = build_collector(&config)?;
    let state: SharedState = Arc::new(AppState::new(config.clone())?);
    debug!("Prometheus registry initialized");

    let interval = Duration::from_secs(config.update_every.unwrap_or(DEFAULT_UPDATE_EVERY));
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
    let poller = spawn_poller(state.clone(), collector, interval, shutdown_rx)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run_server(state, &config));

    drop(shutdown_tx);
    if poller.join().is_err() {
        error!("Poller thread panicked");
    }

    if result.is_ok() {
        info!("arris-modem-exporter stopped gracefully");
    }
    result
}

/// Completes on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}

async fn run_server(state: SharedState, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let bind_ip_str = config.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
    let port = config.port.unwrap_or(DEFAULT_PORT);
    let addr: SocketAddr = format!("{}:{}", bind_ip_str, port).parse()?;

    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler));

    if config.enable_health.unwrap_or(true) {
        app = app.route("/health", get(health_handler));
    }

    let app = app
        .route("/charts", get(charts_handler))
        .route("/data", get(data_handler))
        .route("/config", get(config_handler))
        .with_state(state);

    let listener = TcpListener::bind(addr).await?;
    info!(
        "arris-modem-exporter listening on http://{}:{}",
        bind_ip_str, port
    );

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(e.into());
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received, exiting...");
        }
    }

    Ok(())
}
