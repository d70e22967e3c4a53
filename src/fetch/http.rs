//! REST fetcher
//!
//! Talks to a paginated listing endpoint of the form
//! `GET {base}/{path}?pageSize=20&startAtDoc=&startAfterDoc=id_19&status=Open`
//! answering `{"issuesPaginated": [{"id": "...", ...}, ...]}`.

use super::types::{FetchRequest, FetchResponse, RemoteFetcher};
use crate::config::{PagerConfig, QueryParams};
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::types::{Item, JsonValue};
use async_trait::async_trait;
use tracing::debug;

/// Fetcher for a REST listing endpoint
#[derive(Debug)]
pub struct HttpFetcher {
    client: HttpClient,
    path: String,
    params: QueryParams,
    items_path: String,
    cursor_field: String,
}

impl HttpFetcher {
    /// Create a fetcher with the default endpoint layout
    pub fn new(client: HttpClient) -> Self {
        let defaults = PagerConfig::new("http://localhost");
        Self {
            client,
            path: defaults.path,
            params: defaults.params,
            items_path: defaults.items_path,
            cursor_field: defaults.cursor_field,
        }
    }

    /// Build client and fetcher from a pager config
    pub fn from_config(config: &PagerConfig) -> Result<Self> {
        let client = HttpClient::with_config(config.to_http_config())?;
        Ok(Self {
            client,
            path: config.path.clone(),
            params: config.params.clone(),
            items_path: config.items_path.clone(),
            cursor_field: config.cursor_field.clone(),
        })
    }

    /// Set the endpoint path
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set where the item array lives in the response body
    #[must_use]
    pub fn with_items_path(mut self, items_path: impl Into<String>) -> Self {
        self.items_path = items_path.into();
        self
    }

    /// Set the item field holding the cursor
    #[must_use]
    pub fn with_cursor_field(mut self, cursor_field: impl Into<String>) -> Self {
        self.cursor_field = cursor_field.into();
        self
    }

    /// Query string for a request; every declared filter is sent, empty or not
    fn request_config(&self, request: &FetchRequest) -> RequestConfig {
        let mut config = RequestConfig::new()
            .query(&self.params.page_size, request.page_size.to_string())
            .query(&self.params.start_at, request.start_at.as_str())
            .query(&self.params.start_after, request.start_after.as_str());

        for (name, value) in request.filters.iter() {
            config = config.query(name, value);
        }
        config
    }

    fn decode_items(&self, body: JsonValue) -> Result<Vec<Item>> {
        let array = extract_path(body, &self.items_path).ok_or_else(|| {
            Error::decode(format!("response has no field '{}'", self.items_path))
        })?;

        let JsonValue::Array(values) = array else {
            return Err(Error::decode(format!(
                "field '{}' is not an array",
                self.items_path
            )));
        };

        values
            .into_iter()
            .map(|value| Item::from_json(value, &self.cursor_field))
            .collect()
    }
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
    async fn fetch_page(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let config = self.request_config(request);

        let response = match self.client.get(&self.path, config).await {
            Ok(response) => response,
            Err(Error::HttpStatus { status, body }) => {
                debug!(status, "Listing endpoint rejected request: {}", body);
                return Ok(FetchResponse::failed(status));
            }
            Err(e) => return Err(e),
        };

        let status_code = response.status().as_u16();
        let body: JsonValue = response.json().await?;
        let items = self.decode_items(body)?;

        debug!(items = items.len(), status_code, "Fetched page over HTTP");
        Ok(FetchResponse { items, status_code })
    }
}

/// Walk a dotted path (`data.records`); the empty path is the root
fn extract_path(value: JsonValue, path: &str) -> Option<JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        match current {
            JsonValue::Object(mut map) => current = map.remove(part)?,
            _ => return None,
        }
    }
    Some(current)
}
