//! Glimmer CLI - Headless driver for the greeting-card particle scene

mod commands;
mod config;
mod script;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{classify, config as config_cmd, run};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "glimmer")]
#[command(about = "Gesture-driven particle greeting card, simulated headless", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (replaces ./glimmer.toml; ~/.glimmer/config.toml still applies)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate the scene frame by frame with a scripted hand
    Run {
        /// Number of frames (default: script length plus two seconds)
        #[arg(long)]
        frames: Option<u64>,

        /// Simulated frame rate
        #[arg(long, default_value = "60")]
        fps: f64,

        /// Seed for all random layouts (overrides config)
        #[arg(long)]
        seed: Option<u32>,

        /// Gesture script (TOML list of [[step]] at_ms/pose entries)
        #[arg(long)]
        script: Option<PathBuf>,

        /// Pointer motion: orbit or none
        #[arg(long, default_value = "orbit")]
        pointer: String,

        /// Block until text targets are sampled before the first frame
        #[arg(long)]
        wait_text: bool,

        /// Pace frames on the wall clock and run gesture control on a worker thread
        #[arg(long)]
        realtime: bool,

        /// Write a JSON run summary to this path
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Classify a hand from a JSON array of 21 [x, y, z] landmarks
    Classify {
        /// Path to the landmarks file
        landmarks: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            frames,
            fps,
            seed,
            script,
            pointer,
            wait_text,
            realtime,
            output,
        } => run::run(run::RunArgs {
            config: cli.config,
            frames,
            fps,
            seed,
            script,
            pointer,
            wait_text,
            realtime,
            output,
        }),
        Commands::Classify { landmarks } => classify::run(&landmarks, cli.config.as_deref()),
        Commands::Config => config_cmd::run(cli.config.as_deref()),
    }
}
