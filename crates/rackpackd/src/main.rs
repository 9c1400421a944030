//! rackpackd: drive the rack bin-packing plugin over a cluster file.
//!
//! Loads a cluster description (topology, nodes, jobs), runs one scheduling
//! cycle through the plugin, and prints the per-task node scores and the
//! per-job rack decisions as JSON.
//!
//! # Usage
//!
//! ```text
//! rackpackd score --cluster demos/two-racks.toml --pretty
//! rackpackd racks --cluster demos/two-racks.toml
//! ```

mod config;
mod cycle;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::ClusterConfig;

#[derive(Parser)]
#[command(
    name = "rackpackd",
    about = "Rack-aware bin-packing scorer",
    version,
    propagate_version = true
)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one scheduling cycle and print scores and decisions.
    Score {
        /// Cluster description file.
        #[arg(short, long)]
        cluster: PathBuf,

        /// Pretty-print the JSON report.
        #[arg(long)]
        pretty: bool,
    },
    /// List racks and their member nodes.
    Racks {
        /// Cluster description file.
        #[arg(short, long)]
        cluster: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Command::Score { cluster, pretty } => {
            let config = ClusterConfig::from_file(&cluster)?;
            let report = cycle::run_cycle(&config)?;
            let out = if pretty {
                serde_json::to_string_pretty(&report)
            } else {
                serde_json::to_string(&report)
            }
            .context("failed to encode report")?;
            println!("{out}");
        }
        Command::Racks { cluster } => {
            let config = ClusterConfig::from_file(&cluster)?;
            let cache = config.topology_cache()?;
            for rack in cache.rack_ids()? {
                let nodes = cache.nodes_in_rack(&rack)?;
                println!("{rack}: {}", nodes.join(", "));
            }
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,rackpackd=debug,rackpack_scheduler=debug,rackpack_placement=debug")
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
