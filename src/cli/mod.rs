//! CLI module
//!
//! Command-line interface over both API surfaces.
//!
//! # Commands
//!
//! - `ops` - List every JSON API operation
//! - `call` - Invoke an operation, optionally across all pages
//! - `token` - Print a temporary token for an app or table
//! - `xml` - Run a legacy XML action

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
