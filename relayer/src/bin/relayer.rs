//! Relayer binary: loads configuration, constructs one chain handler and
//! deposit store per configured chain, and runs the reconcile loops
//! until interrupted.

use std::sync::Arc;

use clap::Parser;
use relayer::chain::HandlerFactory;
use relayer::config::Settings;
use relayer::reconcile::{run_finalize_loop, run_initialize_loop, run_past_scan_loop};
use relayer::store::FileStore;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "relayer", about = "tBTC cross-chain deposit relayer")]
struct Args {
    /// Path to a TOML configuration file. Falls back to environment
    /// variables alone when omitted.
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() {
    relayer::logging::init();
    let _metrics_handle = relayer::metrics::install_recorder();

    let args = Args::parse();
    let settings = match Settings::load(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(error) => {
            tracing::error!(%error, "failed to load configuration");
            std::process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let mut tasks = Vec::new();

    for chain_config in settings.chains.clone() {
        let chain_name = chain_config.chain_name.clone();
        let store_dir = std::path::Path::new(&settings.json_path).join(&chain_name);
        let store: Arc<dyn relayer::store::DepositStore> = Arc::new(FileStore::new(store_dir));

        let mut handler = match HandlerFactory::build(chain_config, store) {
            Ok(handler) => handler,
            Err(error) => {
                tracing::error!(chain = %chain_name, %error, "failed to construct chain handler");
                continue;
            }
        };

        if let Err(error) = handler.initialize().await {
            tracing::error!(chain = %chain_name, %error, "failed to initialize chain handler");
            continue;
        }
        if let Err(error) = handler.setup_listeners().await {
            tracing::error!(chain = %chain_name, %error, "failed to set up chain listeners");
            continue;
        }

        let handler: Arc<dyn relayer::chain::ChainHandler> = Arc::from(handler);

        tasks.push(tokio::spawn(run_initialize_loop(handler.clone(), shutdown_rx.clone())));
        tasks.push(tokio::spawn(run_finalize_loop(handler.clone(), shutdown_rx.clone())));
        tasks.push(tokio::spawn(run_past_scan_loop(
            handler,
            settings.backfill_minutes,
            shutdown_rx.clone(),
        )));
    }

    if tasks.is_empty() {
        tracing::error!("no chain handlers started successfully; exiting");
        std::process::exit(1);
    }

    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("failed to install ctrl-c handler");
    }
    tracing::info!("shutdown signal received, stopping reconcile loops");
    let _ = shutdown_tx.send(true);

    for task in tasks {
        let _ = task.await;
    }
}
