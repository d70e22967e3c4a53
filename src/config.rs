//! Pager configuration
//!
//! Describes the remote endpoint, its wire names, page size, declared
//! filters and HTTP behavior. Loaded from YAML or JSON.

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::types::{BackoffType, FilterSet, StringMap};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete pager configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagerConfig {
    /// Base URL of the backend
    pub base_url: String,

    /// Path of the paginated listing endpoint
    #[serde(default = "default_path")]
    pub path: String,

    /// Items per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Query parameter names
    #[serde(default)]
    pub params: QueryParams,

    /// Dotted path to the item array in the response body (empty = root)
    #[serde(default = "default_items_path")]
    pub items_path: String,

    /// Item field holding the cursor
    #[serde(default = "default_cursor_field")]
    pub cursor_field: String,

    /// Filters the view exposes
    #[serde(default = "default_filters")]
    pub filters: Vec<FilterDefinition>,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpSettings,
}

fn default_path() -> String {
    "issues-paginated".to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_items_path() -> String {
    "issuesPaginated".to_string()
}

fn default_cursor_field() -> String {
    "id".to_string()
}

fn default_filters() -> Vec<FilterDefinition> {
    ["subsystem", "priority", "status"]
        .into_iter()
        .map(FilterDefinition::new)
        .collect()
}

impl PagerConfig {
    /// Config for `base_url` with every other setting at its default
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path: default_path(),
            page_size: default_page_size(),
            params: QueryParams::default(),
            items_path: default_items_path(),
            cursor_field: default_cursor_field(),
            filters: default_filters(),
            http: HttpSettings::default(),
        }
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            }
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }

    /// Parse from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::missing_field("base_url"));
        }
        url::Url::parse(&self.base_url)?;

        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be at least 1"));
        }
        if self.cursor_field.is_empty() {
            return Err(Error::invalid_value("cursor_field", "must not be empty"));
        }

        let mut seen = std::collections::HashSet::new();
        for filter in &self.filters {
            if filter.name.is_empty() {
                return Err(Error::invalid_value("filters", "filter name must not be empty"));
            }
            if !seen.insert(filter.name.as_str()) {
                return Err(Error::invalid_value(
                    "filters",
                    format!("duplicate filter '{}'", filter.name),
                ));
            }
        }

        Ok(())
    }

    /// Filter set with every declared filter unselected
    pub fn initial_filters(&self) -> FilterSet {
        FilterSet::with_names(self.filters.iter().map(|f| f.name.clone()))
    }

    /// Look up a declared filter
    pub fn filter(&self, name: &str) -> Option<&FilterDefinition> {
        self.filters.iter().find(|f| f.name == name)
    }

    /// Check that `name` is a declared filter and `value` one of its options
    pub fn check_filter(&self, name: &str, value: &str) -> Result<()> {
        let definition = self.filter(name).ok_or_else(|| {
            let known: Vec<_> = self.filters.iter().map(|f| f.name.as_str()).collect();
            Error::invalid_value(
                "filter",
                format!("unknown filter '{name}' (known: {})", known.join(", ")),
            )
        })?;
        if !definition.accepts(value) {
            return Err(Error::invalid_value(
                name,
                format!("'{value}' is not one of: {}", definition.options.join(", ")),
            ));
        }
        Ok(())
    }

    /// HTTP client config derived from these settings
    pub fn to_http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(&self.base_url)
            .timeout(Duration::from_secs(self.http.timeout_secs))
            .max_retries(self.http.max_retries)
            .backoff(
                self.http.backoff,
                Duration::from_millis(self.http.initial_backoff_ms),
                Duration::from_millis(self.http.max_backoff_ms),
            );

        builder = match self.http.requests_per_second {
            Some(rps) => builder.rate_limit(RateLimiterConfig::new(rps, rps)),
            None => builder.no_rate_limit(),
        };

        for (key, value) in &self.http.headers {
            builder = builder.header(key, value);
        }

        builder.build()
    }
}

// ============================================================================
// Query Parameter Names
// ============================================================================

/// Wire names of the fetch arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    /// Page size parameter
    #[serde(default = "default_page_size_param")]
    pub page_size: String,
    /// Start-at cursor parameter
    #[serde(default = "default_start_at_param")]
    pub start_at: String,
    /// Start-after cursor parameter
    #[serde(default = "default_start_after_param")]
    pub start_after: String,
}

fn default_page_size_param() -> String {
    "pageSize".to_string()
}

fn default_start_at_param() -> String {
    "startAtDoc".to_string()
}

fn default_start_after_param() -> String {
    "startAfterDoc".to_string()
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            page_size: default_page_size_param(),
            start_at: default_start_at_param(),
            start_after: default_start_after_param(),
        }
    }
}

// ============================================================================
// Filters
// ============================================================================

/// A filter the view exposes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDefinition {
    /// Name sent on the wire
    pub name: String,

    /// Human-readable title
    #[serde(default)]
    pub title: Option<String>,

    /// Allowed values (empty = free text)
    #[serde(default)]
    pub options: Vec<String>,
}

impl FilterDefinition {
    /// Free-text filter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            options: Vec::new(),
        }
    }

    /// Check if `value` may be selected (empty always may: it clears the filter)
    pub fn accepts(&self, value: &str) -> bool {
        value.is_empty() || self.options.is_empty() || self.options.iter().any(|o| o == value)
    }
}

// ============================================================================
// HTTP Settings
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff strategy
    #[serde(default)]
    pub backoff: BackoffType,

    /// Initial backoff in milliseconds
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Backoff ceiling in milliseconds
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,

    /// Client-side rate limit (none = unlimited)
    #[serde(default)]
    pub requests_per_second: Option<u32>,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: StringMap,
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff() -> u64 {
    100
}

fn default_max_backoff() -> u64 {
    60_000
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            backoff: BackoffType::default(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            requests_per_second: None,
            headers: StringMap::new(),
        }
    }
}
