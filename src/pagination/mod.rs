//! Pagination module
//!
//! Forward and backward paging over a store that only answers
//! "start at cursor X" / "start after cursor Y" queries.
//!
//! # Overview
//!
//! - `BoundaryStack` - LIFO of first-item cursors of pages left going forward
//! - `PaginationController` - maps `{advance, retreat, refresh, reset_filters}`
//!   onto fetch arguments and commits stack changes once a fetch succeeds
//!
//! # Staleness
//!
//! Boundaries are replayed as-is. If the store gains or loses items between
//! navigations, stepping backward lands on the window that starts at the
//! remembered item, which may no longer line up with what was shown before.
//! That window is accepted; no reconciliation is attempted.

mod controller;
mod stack;
mod types;

pub use controller::{PaginationController, DEFAULT_PAGE_SIZE};
pub use stack::BoundaryStack;
pub use types::{Navigation, NavigationOutcome, PaginationState, PendingFetch};
