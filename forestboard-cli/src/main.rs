#![deny(dead_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use forestboard_core::config::Config;

mod api;
mod commands;
mod output;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "forestboard",
    about = "Train a random forest classifier and serve its results",
    long_about = None,
)]
struct Cli {
    /// Config file (default: ./forestboard.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train on the CSV dataset and write the results document.
    Train(TrainArgs),

    /// Serve the results document and the dashboard over HTTP.
    Serve(ServeArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Headered CSV whose last column is the label.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Where to write the results document.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of trees in the forest.
    #[arg(long)]
    trees: Option<usize>,

    /// Seed for the split and the forest.
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or pretty.
    #[arg(long, default_value = "json")]
    format: String,
}

impl TrainArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(input) = &self.input {
            config.data.input = input.clone();
        }
        if let Some(output) = &self.output {
            config.data.output = output.clone();
        }
        if let Some(trees) = self.trees {
            config.training.n_trees = trees;
        }
        if let Some(seed) = self.seed {
            config.training.seed = seed;
        }
    }
}

#[derive(Args)]
struct ServeArgs {
    /// Results document to serve.
    #[arg(long)]
    results: Option<PathBuf>,

    /// Directory of static dashboard files.
    #[arg(long)]
    dashboard: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,
}

impl ServeArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(results) = &self.results {
            config.data.output = results.clone();
        }
        if let Some(dashboard) = &self.dashboard {
            config.server.dashboard = dashboard.clone();
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("failed to load config")?;

    match cli.command {
        Command::Train(a) => {
            a.apply(&mut config);
            commands::train::run(&config, &a.format)
        }
        Command::Serve(a) => {
            a.apply(&mut config);
            commands::serve::run(&config)
        }
    }
}
