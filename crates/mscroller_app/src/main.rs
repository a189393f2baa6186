use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use mscroller_app::logging::{self, LogDestination};
use mscroller_app::load_config;
use mscroller_core::AgentConfig;

mod commands;

#[derive(Parser)]
#[command(name = "mscroller")]
#[command(author, version, long_about = None)]
#[command(
    about = "Hands-free reading for web manga: auto-scroll, chapter detection and reading stats"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Where log lines go
    #[arg(long, global = true, value_enum, default_value_t = LogDestination::Terminal)]
    log: LogDestination,

    /// Agent config file (RON); defaults apply when absent
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding settings.json and stats.json
    #[arg(long, global = true, value_name = "DIR", default_value = ".mscroller")]
    data_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the chapter info derived from a page as JSON
    Inspect {
        /// Page URL; links are resolved against it
        url: String,

        /// Read the page from this file instead of fetching it
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Content-Type to assume for --file
        #[arg(long)]
        content_type: Option<String>,
    },

    /// Auto-scroll a simulated page and print the timeline
    Simulate(commands::simulate::SimulateArgs),

    /// Print reading stats from the data directory
    Stats {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(cli.log, level);

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AgentConfig::default(),
    };

    match cli.command {
        Commands::Inspect {
            url,
            file,
            content_type,
        } => commands::inspect::execute(&url, file.as_deref(), content_type.as_deref()),
        Commands::Simulate(args) => commands::simulate::execute(&args, config, &cli.data_dir),
        Commands::Stats { json } => commands::stats::execute(&cli.data_dir, &config, json),
    }
}
