//! Steadybox CLI: replay recorded detections through the tracker.
//!
//! Usage:
//!   steadybox replay <FRAMES>     Smooth a recorded detection stream
//!   steadybox validate <FRAMES>   Check a detection recording
//!   steadybox config show         Print the effective configuration
//!   steadybox config init         Write a default config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use steadybox_common::config::{AppConfig, DecayPolicy};

mod commands;

#[derive(Parser)]
#[command(
    name = "steadybox",
    about = "Temporal smoothing and lightweight tracking for object detections",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/steadybox/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Smooth a recorded JSONL detection stream
    Replay {
        /// Path to the detection recording
        frames: PathBuf,

        /// Write smoothed tracks to this JSONL file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pace the replay at this many frames per second (0 = as fast as possible)
        #[arg(long, default_value = "0")]
        fps: u32,

        /// EMA weight of the newest box, in (0, 1]
        #[arg(long)]
        smoothing_factor: Option<f64>,

        /// Smoothed boxes kept per track
        #[arg(long)]
        history_size: Option<usize>,

        /// Minimum IOU to continue a track, in (0, 1]
        #[arg(long)]
        iou_threshold: Option<f64>,

        /// When unmatched tracks lose life: empty-frame-only|any-unmatched
        #[arg(long)]
        decay_policy: Option<DecayPolicy>,

        /// Feed every detection to the tracker, ignoring confidence and class filters
        #[arg(long)]
        no_filter: bool,
    },

    /// Check a JSONL detection recording
    Validate {
        /// Path to the detection recording
        frames: PathBuf,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as JSON
    Show,

    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => AppConfig::load(),
    };

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    steadybox_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Replay {
            frames,
            output,
            fps,
            smoothing_factor,
            history_size,
            iou_threshold,
            decay_policy,
            no_filter,
        } => {
            let overrides = commands::replay::TrackerOverrides {
                smoothing_factor,
                history_size,
                iou_threshold,
                decay_policy,
            };
            commands::replay::run(config, frames, output, fps, overrides, no_filter).await
        }
        Commands::Validate { frames } => commands::validate::run(frames),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config, cli.config.as_deref()),
            ConfigAction::Init { force } => commands::config::init(cli.config.as_deref(), force),
        },
    }
}
