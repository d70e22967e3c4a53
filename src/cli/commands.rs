//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Page forward and backward through a cursor-only collection
#[derive(Parser, Debug)]
#[command(name = "cursor-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pager configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Browse the collection page by page
    Browse {
        /// Browse a local JSON array instead of the configured endpoint
        #[arg(long)]
        data: Option<PathBuf>,

        /// Comma-separated commands to run instead of reading stdin
        /// (e.g. "next,next,prev,filter status=Open")
        #[arg(long)]
        script: Option<String>,

        /// Override the configured page size
        #[arg(long)]
        page_size: Option<u32>,

        /// Initial filter selection (repeatable, name=value)
        #[arg(long = "filter", value_name = "NAME=VALUE")]
        filters: Vec<String>,
    },

    /// Serve a JSON array over the paginated listing endpoint
    Serve {
        /// JSON file holding the items in store order
        #[arg(long)]
        data: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Match a filter against a differently named field (repeatable, filter=field)
        #[arg(long = "alias", value_name = "FILTER=FIELD")]
        aliases: Vec<String>,
    },

    /// Validate the configuration file
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per displayed page
    Json,
    /// Human-readable output
    Pretty,
}

/// Split `name=value`
pub(crate) fn parse_assignment(raw: &str) -> Option<(String, String)> {
    let (name, value) = raw.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}
