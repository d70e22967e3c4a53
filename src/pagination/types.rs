//! Pagination types
//!
//! Transitions, pending fetches and outcomes used by the controller.

use crate::error::Error;
use crate::fetch::FetchRequest;
use crate::types::{Cursor, FilterSet, Page};
use serde::Serialize;
use std::fmt;

/// A requested page transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Step forward one page
    Advance,
    /// Step backward one page
    Retreat,
    /// Re-fetch the current window
    Refresh,
    /// Replace the filter set and start over from the first page
    ResetFilters(FilterSet),
}

impl Navigation {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Advance => "advance",
            Self::Retreat => "retreat",
            Self::Refresh => "refresh",
            Self::ResetFilters(_) => "reset_filters",
        }
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stack change committed when a fetch succeeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StackOp {
    /// Leave the stack as is
    Keep,
    /// Remember the boundary of the page being left
    Push(Cursor),
    /// Consume the boundary that was replayed
    Pop,
}

/// A fetch that has been issued but not yet applied
///
/// Produced by [`PaginationController::begin`](super::PaginationController::begin)
/// and handed back to [`PaginationController::complete`](super::PaginationController::complete)
/// together with the fetch result. Each ticket is accepted at most once.
#[derive(Debug)]
pub struct PendingFetch {
    pub(crate) sequence: u64,
    pub(crate) navigation: &'static str,
    pub(crate) target_page: u32,
    pub(crate) stack_op: StackOp,
    pub(crate) request: FetchRequest,
}

impl PendingFetch {
    /// Sequence number tagging this request
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Arguments to pass to the remote fetch
    pub fn request(&self) -> &FetchRequest {
        &self.request
    }

    /// Page number that becomes current if this fetch is applied
    pub fn target_page(&self) -> u32 {
        self.target_page
    }

    /// Name of the transition that produced this fetch
    pub fn navigation(&self) -> &'static str {
        self.navigation
    }
}

/// Result of completing a navigation
#[derive(Debug)]
pub enum NavigationOutcome {
    /// The fetched page is now displayed
    Applied {
        /// New current page number
        page_number: u32,
        /// Number of items on the new page
        items: usize,
    },
    /// The fetch failed; the displayed page is unchanged
    Failed {
        /// What went wrong
        error: Error,
    },
    /// A newer request was issued before this one resolved; nothing applied
    Stale {
        /// Sequence number of the discarded request
        sequence: u64,
    },
}

impl NavigationOutcome {
    /// Check if the result was applied
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// Check if the fetch failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Check if the result was discarded as superseded
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }
}

/// Snapshot of the controller, for display and diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationState {
    /// Current page number (starts at 1)
    pub page_number: u32,
    /// Boundaries from oldest to newest
    pub stack: Vec<Cursor>,
    /// Currently displayed page
    pub current_page: Page,
    /// Active filters
    pub filters: FilterSet,
    /// Whether a fetch is in flight
    pub loading: bool,
    /// User-visible error from the last failed fetch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
