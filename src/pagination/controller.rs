//! Pagination controller
//!
//! Turns page transitions into start-at / start-after fetch arguments and
//! keeps the boundary stack consistent with what is actually displayed.

use super::stack::BoundaryStack;
use super::types::{Navigation, NavigationOutcome, PaginationState, PendingFetch, StackOp};
use crate::error::{Error, Result};
use crate::fetch::{FetchRequest, FetchResponse, RemoteFetcher};
use crate::types::{Cursor, FilterSet, Page};
use tracing::{debug, info, warn};

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Drives forward/backward navigation over a cursor-only store
///
/// One controller lives for one view session. Stack changes are committed
/// only when a fetch succeeds, and only the most recently issued fetch may
/// be applied; older results are reported as [`NavigationOutcome::Stale`].
///
/// # Example
///
/// ```rust,ignore
/// let mut pager = PaginationController::new(20, FilterSet::new());
/// pager.refresh(&fetcher).await;   // first page
/// pager.advance(&fetcher).await;   // page 2
/// pager.retreat(&fetcher).await;   // back to page 1
/// ```
#[derive(Debug)]
pub struct PaginationController {
    page_size: u32,
    page_number: u32,
    stack: BoundaryStack,
    current_page: Page,
    filters: FilterSet,
    /// Last sequence number handed out
    sequence: u64,
    in_flight: Option<u64>,
    last_error: Option<String>,
}

impl PaginationController {
    /// Create a controller positioned before the first fetch
    pub fn new(page_size: u32, filters: FilterSet) -> Self {
        Self {
            page_size: page_size.max(1),
            page_number: 1,
            stack: BoundaryStack::new(),
            current_page: Page::empty(),
            filters,
            sequence: 0,
            in_flight: None,
            last_error: None,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Current page number (starts at 1)
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Items per page
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Currently displayed page
    pub fn current_page(&self) -> &Page {
        &self.current_page
    }

    /// Active filter set
    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Boundary history
    pub fn stack(&self) -> &BoundaryStack {
        &self.stack
    }

    /// Number of boundaries held
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether a fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// User-visible message from the last failed fetch
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether stepping backward makes sense
    pub fn can_retreat(&self) -> bool {
        self.page_number > 1
    }

    /// Whether stepping forward may yield more items
    ///
    /// A short page means the store ran out. A full page may still be the
    /// last one; the store exposes no count to tell.
    pub fn can_advance(&self) -> bool {
        self.current_page.len() >= self.page_size as usize
    }

    /// Snapshot for display
    pub fn state(&self) -> PaginationState {
        PaginationState {
            page_number: self.page_number,
            stack: self.stack.iter().cloned().collect(),
            current_page: self.current_page.clone(),
            filters: self.filters.clone(),
            loading: self.is_loading(),
            error: self.last_error.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // Two-phase API
    // ------------------------------------------------------------------------

    /// Plan a transition and issue a sequence number for its fetch
    ///
    /// The stack is not touched here except by [`Navigation::ResetFilters`],
    /// which discards every boundary immediately: cursors captured under the
    /// old filters must never meet a query issued under the new ones.
    pub fn begin(&mut self, navigation: Navigation) -> PendingFetch {
        let curr_first = Cursor::from(self.current_page.first_cursor());
        let curr_last = Cursor::from(self.current_page.last_cursor());
        let name = navigation.name();

        let (target_page, stack_op, start_at, start_after) = match navigation {
            Navigation::Retreat => {
                // An empty stack means "back to the very first page"
                let prev_first = Cursor::from(self.stack.peek());
                let target = self.page_number.saturating_sub(1).max(1);
                let op = if self.stack.is_empty() {
                    StackOp::Keep
                } else {
                    StackOp::Pop
                };
                (target, op, prev_first, Cursor::empty())
            }
            Navigation::Advance => (
                self.page_number.saturating_add(1),
                StackOp::Push(curr_first),
                Cursor::empty(),
                curr_last,
            ),
            Navigation::Refresh => (self.page_number, StackOp::Keep, curr_first, Cursor::empty()),
            Navigation::ResetFilters(filters) => {
                self.reset(filters);
                (1, StackOp::Keep, Cursor::empty(), Cursor::empty())
            }
        };

        self.sequence += 1;
        self.in_flight = Some(self.sequence);

        let request = FetchRequest {
            start_at,
            start_after,
            page_size: self.page_size,
            filters: self.filters.clone(),
        };

        debug!(
            sequence = self.sequence,
            navigation = name,
            start_at = %request.start_at,
            start_after = %request.start_after,
            page_size = request.page_size,
            "Issuing page fetch"
        );

        PendingFetch {
            sequence: self.sequence,
            navigation: name,
            target_page,
            stack_op,
            request,
        }
    }

    /// Apply (or discard) the result of a fetch issued by [`begin`](Self::begin)
    pub fn complete(
        &mut self,
        pending: PendingFetch,
        result: Result<FetchResponse>,
    ) -> NavigationOutcome {
        // Only the outstanding fetch may land; superseded or already
        // completed tickets are discarded
        if self.in_flight != Some(pending.sequence) {
            debug!(
                sequence = pending.sequence,
                latest = self.sequence,
                navigation = pending.navigation,
                "Discarding superseded page fetch"
            );
            return NavigationOutcome::Stale {
                sequence: pending.sequence,
            };
        }

        self.in_flight = None;

        let items = match result.and_then(FetchResponse::into_items) {
            Ok(items) => items,
            Err(error) => {
                warn!(
                    navigation = pending.navigation,
                    page = pending.target_page,
                    "Page fetch failed: {}",
                    error
                );
                self.last_error = Some(error.user_message());
                return NavigationOutcome::Failed { error };
            }
        };

        match pending.stack_op {
            StackOp::Keep => {}
            StackOp::Push(cursor) => self.stack.push(cursor),
            StackOp::Pop => {
                self.stack.pop();
            }
        }

        let count = items.len();
        self.current_page = Page::new(items);
        self.page_number = pending.target_page;
        self.last_error = None;

        debug!(
            navigation = pending.navigation,
            page = self.page_number,
            items = count,
            depth = self.stack.len(),
            "Page applied"
        );

        NavigationOutcome::Applied {
            page_number: self.page_number,
            items: count,
        }
    }

    /// Abandon the outstanding fetch, if any
    ///
    /// For callers of [`begin`](Self::begin) that drop a [`PendingFetch`]
    /// without completing it. A later `complete` with that ticket is stale.
    pub fn cancel(&mut self) {
        if let Some(sequence) = self.in_flight.take() {
            debug!(sequence, "Page fetch cancelled");
        }
    }

    // ------------------------------------------------------------------------
    // One-shot API
    // ------------------------------------------------------------------------

    /// Run a transition end to end against `fetcher`
    ///
    /// Dropping the returned future mid-fetch cancels the navigation: the
    /// loading flag is cleared and the stack is left as `begin` left it.
    pub async fn navigate(
        &mut self,
        navigation: Navigation,
        fetcher: &dyn RemoteFetcher,
    ) -> NavigationOutcome {
        let pending = self.begin(navigation);
        let mut guard = CancelOnDrop {
            controller: self,
            sequence: pending.sequence,
        };
        let result = fetcher.fetch_page(pending.request()).await;
        guard.controller.complete(pending, result)
    }

    /// Step forward one page
    pub async fn advance(&mut self, fetcher: &dyn RemoteFetcher) -> NavigationOutcome {
        self.navigate(Navigation::Advance, fetcher).await
    }

    /// Step backward one page
    pub async fn retreat(&mut self, fetcher: &dyn RemoteFetcher) -> NavigationOutcome {
        self.navigate(Navigation::Retreat, fetcher).await
    }

    /// Re-fetch the current window without touching the stack
    pub async fn refresh(&mut self, fetcher: &dyn RemoteFetcher) -> NavigationOutcome {
        self.navigate(Navigation::Refresh, fetcher).await
    }

    /// Switch to a new filter set and load its first page
    pub async fn on_filter_change(
        &mut self,
        filters: FilterSet,
        fetcher: &dyn RemoteFetcher,
    ) -> NavigationOutcome {
        self.navigate(Navigation::ResetFilters(filters), fetcher)
            .await
    }

    /// Start over from the first page under the current filters
    ///
    /// Used after the collection changed under the view, e.g. a record was added.
    pub async fn restart(&mut self, fetcher: &dyn RemoteFetcher) -> NavigationOutcome {
        let filters = self.filters.clone();
        self.on_filter_change(filters, fetcher).await
    }

    /// Move to `new_page_number`, which must be the current page or one away
    pub async fn request_page(
        &mut self,
        new_page_number: u32,
        fetcher: &dyn RemoteFetcher,
    ) -> Result<NavigationOutcome> {
        let navigation = self.classify(new_page_number)?;
        Ok(self.navigate(navigation, fetcher).await)
    }

    /// Map a target page number onto a transition
    pub fn classify(&self, new_page_number: u32) -> Result<Navigation> {
        if new_page_number == 0 {
            return Err(Error::InvalidPageNumber {
                page: new_page_number,
            });
        }
        if new_page_number.abs_diff(self.page_number) > 1 {
            return Err(Error::PageJump {
                from: self.page_number,
                to: new_page_number,
            });
        }

        Ok(match new_page_number.cmp(&self.page_number) {
            std::cmp::Ordering::Less => Navigation::Retreat,
            std::cmp::Ordering::Greater => Navigation::Advance,
            std::cmp::Ordering::Equal => Navigation::Refresh,
        })
    }

    fn reset(&mut self, filters: FilterSet) {
        info!(
            discarded = self.stack.len(),
            from_page = self.page_number,
            "Filters changed, resetting pagination"
        );
        self.stack.clear();
        self.page_number = 1;
        self.current_page = Page::empty();
        self.filters = filters;
        self.last_error = None;
    }
}

/// Clears the in-flight marker if a one-shot navigation is dropped before
/// its fetch completes
struct CancelOnDrop<'a> {
    controller: &'a mut PaginationController,
    sequence: u64,
}

impl Drop for CancelOnDrop<'_> {
    fn drop(&mut self) {
        if self.controller.in_flight == Some(self.sequence) {
            debug!(sequence = self.sequence, "Navigation dropped mid-fetch");
            self.controller.in_flight = None;
        }
    }
}
