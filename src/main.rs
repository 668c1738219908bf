mod config;
mod display;
mod poller;
mod render;
mod snapshot;

use clap::Parser;
use config::Config;
use display::TerminalDashboard;
use poller::{PollOutcome, Poller};
use reqwest::Client;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "./sysboard.yaml";

#[derive(Parser, Debug)]
#[command(name = "sysboard")]
#[command(version)]
struct Cli {
    #[arg(long)]
    config: Option<String>,
    #[arg(long)]
    print_default_config: bool,
    /// Poll and render a single snapshot, then exit.
    #[arg(long)]
    once: bool,
    /// Append logs to this file instead of stderr. The dashboard redraws the
    /// whole terminal, which wipes anything stderr printed to the same tty.
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = init_tracing(cli.log_file.as_deref()) {
        eprintln!("failed to open log file: {err}");
        std::process::exit(1);
    }
    if cli.print_default_config {
        println!("{}", Config::example_yaml());
        return;
    }

    let cfg = match load_config(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => {
            error!(error = %err, "failed to load configuration");
            std::process::exit(1);
        }
    };

    info!(
        endpoint = %cfg.endpoint,
        interval_ms = cfg.interval_ms,
        request_timeout_ms = cfg.request_timeout_ms,
        "starting sysboard"
    );

    let client = Client::builder()
        .user_agent(concat!("sysboard/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new());
    let dashboard = Arc::new(Mutex::new(TerminalDashboard::stdout(cfg.endpoint.clone())));
    let poller = Arc::new(Poller::new(
        client,
        cfg.endpoint.clone(),
        cfg.request_timeout(),
        dashboard,
    ));

    if cli.once {
        if poller.poll_and_render().await != PollOutcome::Rendered {
            std::process::exit(1);
        }
        return;
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let poll_task = {
        let poller = poller.clone();
        let interval = cfg.interval();
        let mut shutdown = shutdown_rx.clone();
        tokio::spawn(async move {
            // First tick completes immediately, so the initial poll runs at startup.
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown.changed() => {
                        info!("shutdown signal received, stopping poll loop");
                        break;
                    }
                    _ = ticker.tick() => {
                        let poller = poller.clone();
                        tokio::spawn(async move {
                            poller.poll_and_render().await;
                        });
                    }
                }
            }
        })
    };

    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to wait for Ctrl+C");
    }
    info!("received Ctrl+C, shutting down");

    let _ = shutdown_tx.send(true);
    let _ = poll_task.await;
}

fn init_tracing(log_file: Option<&str>) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (writer, ansi) = match log_file {
        Some(path) => (BoxMakeWriter::new(Mutex::new(open_log_file(path)?)), false),
        None => (BoxMakeWriter::new(io::stderr), true),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .init();
    Ok(())
}

fn open_log_file(path: impl AsRef<Path>) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn load_config(path: Option<&str>) -> Result<Config, config::ConfigError> {
    match path {
        Some(path) => Config::load_from_file(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            Config::load_from_file(DEFAULT_CONFIG_PATH)
        }
        None => Ok(Config::default()),
    }
}
