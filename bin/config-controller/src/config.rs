//! Command line and environment configuration

use clap::{Parser, Subcommand};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Controller that gives every ConfigClient its own ConfigMap",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub controller: ControllerConfig,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON", global = true)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run the controller (default)
    Run,
    /// Print the ConfigClient CustomResourceDefinition as YAML
    Crd,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ControllerConfig {
    /// Only watch ConfigClients in this namespace (default: all namespaces)
    #[arg(long, env = "WATCH_NAMESPACE")]
    pub namespace: Option<String>,

    /// Number of reconciles that may run at the same time
    #[arg(
        long,
        env = "CONTROLLER_WORKERS",
        default_value_t = 2,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub workers: u16,

    /// Seconds between full resyncs of every ConfigClient, 0 to disable
    #[arg(long, env = "RESYNC_SECS", default_value_t = 3600)]
    pub resync_secs: u64,

    /// Seconds to wait before retrying a failed reconcile
    #[arg(long, env = "ERROR_REQUEUE_SECS", default_value_t = 60)]
    pub error_requeue_secs: u64,
}

impl ControllerConfig {
    pub fn resync_period(&self) -> Option<Duration> {
        (self.resync_secs > 0).then(|| Duration::from_secs(self.resync_secs))
    }

    pub fn error_requeue(&self) -> Duration {
        Duration::from_secs(self.error_requeue_secs)
    }
}
