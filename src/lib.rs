// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # cursor-pager
//!
//! Forward and backward page navigation over a remote collection that only
//! supports cursor ("start at" / "start after" a document id) queries.
//!
//! Going forward needs the last item of the page on screen. Going back needs
//! the first item of the previous page, which the store cannot compute, so
//! the controller remembers every page's first cursor on a LIFO stack.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cursor_pager::{PagerConfig, PaginationController};
//! use cursor_pager::fetch::HttpFetcher;
//!
//! #[tokio::main]
//! async fn main() -> cursor_pager::Result<()> {
//!     let config = PagerConfig::from_file("pager.yaml")?;
//!     let fetcher = HttpFetcher::from_config(&config)?;
//!     let mut pager = PaginationController::new(config.page_size, config.initial_filters());
//!
//!     pager.refresh(&fetcher).await;   // page 1
//!     pager.advance(&fetcher).await;   // page 2
//!     pager.retreat(&fetcher).await;   // back to page 1
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   PaginationController                       │
//! │  advance()  retreat()  refresh()  on_filter_change()         │
//! │  page_number · BoundaryStack · current page · filters        │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ FetchRequest / FetchResponse
//! ┌──────────────────┬───────────┴────────┬──────────────────────┐
//! │   HttpFetcher    │   MemoryFetcher    │      FnFetcher       │
//! ├──────────────────┼────────────────────┼──────────────────────┤
//! │ Retry · Backoff  │ MemoryStore        │ Injected closure     │
//! │ Rate Limit       │ Failure injection  │                      │
//! └──────────────────┴────────────────────┴──────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Cursors, items, pages and filter sets
pub mod types;

/// Boundary stack and pagination controller
pub mod pagination;

/// Remote fetch contract and fetcher implementations
pub mod fetch;

/// HTTP client with retry and rate limiting
pub mod http;

/// Pager configuration
pub mod config;

/// In-memory cursor store
pub mod store;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{FilterDefinition, PagerConfig};
pub use fetch::{FetchRequest, FetchResponse, RemoteFetcher};
pub use pagination::{BoundaryStack, Navigation, NavigationOutcome, PaginationController};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
