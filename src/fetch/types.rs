//! Fetch contract types
//!
//! The request/response pair exchanged with a remote store, and the trait
//! every store adapter implements.

use crate::error::{Error, Result};
use crate::types::{Cursor, FilterSet, Item};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

/// Arguments of one page fetch
///
/// At most one of `start_at` / `start_after` is non-empty in intended use.
/// Both empty requests the first page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Include the item with this cursor and everything after it
    pub start_at: Cursor,
    /// Everything strictly after the item with this cursor
    pub start_after: Cursor,
    /// Maximum number of items
    pub page_size: u32,
    /// Active filters (empty values = no filter)
    pub filters: FilterSet,
}

impl FetchRequest {
    /// Request for the first page
    pub fn first_page(page_size: u32, filters: FilterSet) -> Self {
        Self {
            start_at: Cursor::empty(),
            start_after: Cursor::empty(),
            page_size,
            filters,
        }
    }

    /// Check if both cursors are empty
    pub fn is_first_page(&self) -> bool {
        self.start_at.is_empty() && self.start_after.is_empty()
    }
}

/// What a remote store returned
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchResponse {
    /// Items in store order; meaningless unless the status is a success
    pub items: Vec<Item>,
    /// HTTP-style status code
    pub status_code: u16,
}

impl FetchResponse {
    /// Successful response
    pub fn ok(items: Vec<Item>) -> Self {
        Self {
            items,
            status_code: 200,
        }
    }

    /// Failed response with no usable items
    pub fn failed(status_code: u16) -> Self {
        Self {
            items: Vec::new(),
            status_code,
        }
    }

    /// Check if the status code is a 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Items if successful, a fetch error otherwise
    pub fn into_items(self) -> Result<Vec<Item>> {
        if self.is_success() {
            Ok(self.items)
        } else {
            Err(Error::fetch(
                self.status_code,
                format!("remote store answered with status {}", self.status_code),
            ))
        }
    }
}

/// A remote store that can answer cursor queries
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Fetch one page
    async fn fetch_page(&self, request: &FetchRequest) -> Result<FetchResponse>;
}

#[async_trait]
impl<T: RemoteFetcher + ?Sized> RemoteFetcher for Arc<T> {
    async fn fetch_page(&self, request: &FetchRequest) -> Result<FetchResponse> {
        (**self).fetch_page(request).await
    }
}

/// Adapter turning an async closure into a [`RemoteFetcher`]
pub struct FnFetcher<F> {
    f: F,
}

impl<F> std::fmt::Debug for FnFetcher<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFetcher").finish_non_exhaustive()
    }
}

/// Wrap an injected fetch function
///
/// ```rust,ignore
/// let fetcher = fetcher_fn(|request: FetchRequest| async move {
///     Ok(FetchResponse::ok(vec![]))
/// });
/// ```
pub fn fetcher_fn<F, Fut>(f: F) -> FnFetcher<F>
where
    F: Fn(FetchRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<FetchResponse>> + Send + 'static,
{
    FnFetcher { f }
}

#[async_trait]
impl<F, Fut> RemoteFetcher for FnFetcher<F>
where
    F: Fn(FetchRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<FetchResponse>> + Send + 'static,
{
    async fn fetch_page(&self, request: &FetchRequest) -> Result<FetchResponse> {
        (self.f)(request.clone()).await
    }
}
