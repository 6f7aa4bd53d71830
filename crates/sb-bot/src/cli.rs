//! Command-line argument definitions.

use std::path::PathBuf;

use clap::Parser;

/// Study-room presence notifier.
///
/// Watches one voice channel, announces entries and exits to a notification
/// channel, and reports how long each visit lasted.
#[derive(Debug, Parser)]
#[command(name = "studybell", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
