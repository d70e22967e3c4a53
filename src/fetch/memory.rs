//! In-process fetcher
//!
//! Serves pages from a [`MemoryStore`], records every request it receives,
//! and can be told to fail upcoming fetches.

use super::types::{FetchRequest, FetchResponse, RemoteFetcher};
use crate::error::{Error, Result};
use crate::store::MemoryStore;
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Fetcher backed by an in-memory store
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    store: RwLock<MemoryStore>,
    requests: Mutex<Vec<FetchRequest>>,
    failures: Mutex<VecDeque<u16>>,
}

impl MemoryFetcher {
    /// Create a fetcher over `store`
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store: RwLock::new(store),
            requests: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
        }
    }

    /// Make the next fetch answer with `status` instead of items
    pub async fn fail_next(&self, status: u16) {
        self.failures.lock().await.push_back(status);
    }

    /// Every request received so far, oldest first
    pub async fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().await.clone()
    }

    /// The most recent request
    pub async fn last_request(&self) -> Option<FetchRequest> {
        self.requests.lock().await.last().cloned()
    }

    /// Mutate the underlying store
    pub async fn update_store<F>(&self, f: F)
    where
        F: FnOnce(&mut MemoryStore),
    {
        let mut store = self.store.write().await;
        f(&mut store);
    }
}

#[async_trait]
impl RemoteFetcher for MemoryFetcher {
    async fn fetch_page(&self, request: &FetchRequest) -> Result<FetchResponse> {
        self.requests.lock().await.push(request.clone());

        if let Some(status) = self.failures.lock().await.pop_front() {
            debug!(status, "Injected fetch failure");
            return Ok(FetchResponse::failed(status));
        }

        match self.store.read().await.query(request) {
            Ok(items) => Ok(FetchResponse::ok(items)),
            Err(Error::Fetch { status, message }) => {
                debug!(status, "Store rejected query: {}", message);
                Ok(FetchResponse::failed(status))
            }
            Err(e) => Err(e),
        }
    }
}
