//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// QuickBase API command-line client
#[derive(Parser, Debug)]
#[command(name = "quickbase")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client options file (YAML); `QB_*` environment variables otherwise
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Log request and page summaries
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every JSON API operation
    Ops,

    /// Invoke a JSON API operation
    Call {
        /// Operation name, e.g. `runQuery` or `run_query`
        name: String,

        /// Parameters as a JSON object
        #[arg(short, long, default_value = "{}")]
        params: String,

        /// Fetch every page and print the combined result
        #[arg(long, conflicts_with = "pages")]
        all: bool,

        /// Print each page as it arrives
        #[arg(long)]
        pages: bool,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Print a temporary token for an app or table
    Token {
        /// App or table id
        dbid: String,
    },

    /// Run a legacy XML API action
    Xml {
        /// App or table id (`main` for realm-level actions)
        dbid: String,

        /// Action, e.g. `API_GetSchema` or `GetSchema`
        action: String,

        /// XML fragment placed inside the request envelope
        #[arg(short, long, default_value = "")]
        body: String,

        /// Print the response XML instead of converting it to JSON
        #[arg(long)]
        raw: bool,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
