//! Fetch module
//!
//! The remote store collaborator, abstracted behind [`RemoteFetcher`].
//!
//! # Implementations
//!
//! - `HttpFetcher` - REST listing endpoint with start-at / start-after parameters
//! - `MemoryFetcher` - in-process [`MemoryStore`](crate::store::MemoryStore), with request log
//! - `FnFetcher` - any injected async closure, via [`fetcher_fn`]

mod http;
mod memory;
mod types;

pub use http::HttpFetcher;
pub use memory::MemoryFetcher;
pub use types::{fetcher_fn, FetchRequest, FetchResponse, FnFetcher, RemoteFetcher};
