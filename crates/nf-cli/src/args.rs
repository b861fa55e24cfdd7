//! Command-line argument definitions for the `nf` session runner.
//!
//! [`Args`] selects the project to start from, the editing script to
//! replay against it, where the result goes, and how chatty the log is.

use std::path::PathBuf;

use clap::Parser;

/// Replay an editing session against a NeonForge project
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Project to open (JSON or MessagePack). A new project is created when absent.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Name of the project created when no input is given
    #[arg(short, long, default_value = "Untitled")]
    pub name: String,

    /// Session script (JSON array of steps)
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Where to write the resulting project. Standard output when absent.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write MessagePack instead of pretty JSON
    #[arg(short, long)]
    pub binary: bool,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
