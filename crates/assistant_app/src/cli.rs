use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

/// Terminal client for the healthcare document assistant.
#[derive(Debug, Clone, Parser)]
#[command(name = "assistant", version)]
pub struct Cli {
    /// RON config file. Defaults to ./assistant.ron when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Backend base URL.
    #[arg(long)]
    pub backend_url: Option<String>,

    /// Directory that generated reports are saved into.
    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    /// Where log output goes.
    #[arg(long, value_enum)]
    pub log: Option<LogTarget>,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}
