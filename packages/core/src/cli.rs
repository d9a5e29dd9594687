use std::path::PathBuf;

use clap::Parser;

/// Vaccine availability monitor CLI arguments
#[derive(Debug, Parser)]
#[command(
    name = "vaccine-availability-monitor",
    version,
    about = "Posts a Slack alert when vaccine appointments open up nearby"
)]
pub struct Cli {
    /// Directory containing search area JSON files
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Polling interval in seconds
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Port for the health/metrics server
    #[arg(long)]
    pub port: Option<u16>,

    /// Run a single poll cycle and exit
    #[arg(long)]
    pub once: bool,
}
