use anyhow::Result;
use clap::Parser;
use config_api::ConfigClient;
use kube::{Client, CustomResourceExt};
use tracing::{info, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod config_client_controller;

use config::{Cli, Command, ControllerConfig};
use config_client_controller::ConfigClientController;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Run) {
        Command::Crd => {
            print!("{}", serde_yaml::to_string(&ConfigClient::crd())?);
            Ok(())
        }
        Command::Run => run(cli.controller, cli.log_json).await,
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

async fn run(config: ControllerConfig, log_json: bool) -> Result<()> {
    init_tracing(log_json);

    info!("Starting config-controller...");

    let client = Client::try_default().await?;
    let controller = ConfigClientController::new(client, config);

    // Start ConfigClient reconciliation
    tokio::spawn(async move {
        if let Err(e) = controller.run().await {
            error!("ConfigClient controller error: {}", e);
        }
    });

    // Keep the process alive
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting...");

    Ok(())
}
