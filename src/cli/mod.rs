//! CLI module
//!
//! Command-line interface for browsing and serving paginated collections.
//!
//! # Commands
//!
//! - `browse` - Page through the configured endpoint or a local data file
//! - `serve` - Serve a data file over the paginated listing endpoint
//! - `validate` - Check a pager configuration file

mod commands;
mod runner;
mod server;
mod session;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use server::{router, serve, serve_on, ServerConfig};
pub use session::{BrowseCommand, BrowseSession};
