//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::{Profile, Source};

/// Capture, train and exchange on-device classifier collections
#[derive(Parser, Debug)]
#[command(name = "classifier-studio")]
#[command(version, about = "Classifier and face enrollment collection tool", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the manifest, per-class sample counts and SHA-256 of an archive
    Inspect {
        /// Path to a .ipcc collection
        archive: PathBuf,
    },
    /// Replay a directory of images into a class, train, and export
    Record(RecordArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct RecordArgs {
    /// Directory of images replayed as camera frames
    #[arg(long)]
    pub frames: PathBuf,

    /// Class slot to record into
    #[arg(long, default_value = "0")]
    pub class: usize,

    /// Name to give the class
    #[arg(long)]
    pub name: Option<String>,

    /// Capture ticks to hold the record button for (default: one pass over the frames)
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Collection profile
    #[arg(long, default_value = "classifier")]
    pub profile: Profile,

    /// Camera backend
    #[arg(long, default_value = "webcam")]
    pub source: Source,

    /// Mirror frames horizontally
    #[arg(long)]
    pub mirror: bool,

    /// Existing collection to start from
    #[arg(long)]
    pub from: Option<PathBuf>,

    /// Directory the archive is written to
    #[arg(long, short, default_value = ".")]
    pub out: PathBuf,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}
