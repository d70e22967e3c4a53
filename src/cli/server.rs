//! HTTP server mode serving a store over the paginated listing endpoint

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::PagerConfig;
use crate::error::{Error, Result};
use crate::fetch::FetchRequest;
use crate::store::MemoryStore;
use crate::types::{Cursor, FilterSet, JsonValue};

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Endpoint path, parameter names, response key and cursor field
    pub pager: PagerConfig,
}

/// App state shared across handlers
struct AppState {
    store: RwLock<MemoryStore>,
    config: ServerConfig,
}

/// Build the router for `store`
pub fn router(config: ServerConfig, store: MemoryStore) -> Router {
    let route = format!("/{}", config.pager.path.trim_start_matches('/'));
    let state = AppState {
        store: RwLock::new(store),
        config,
    };

    // Build CORS layer - allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route(&route, get(list_items))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server
pub async fn serve(config: ServerConfig, store: MemoryStore, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    serve_on(listener, config, store).await
}

/// Serve on an already bound listener
pub async fn serve_on(listener: TcpListener, config: ServerConfig, store: MemoryStore) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(
        items = store.len(),
        "Starting HTTP server on http://{}/{}",
        addr,
        config.pager.path.trim_start_matches('/')
    );

    axum::serve(listener, router(config, store))
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// One page of items
async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(mut params): Query<HashMap<String, String>>,
) -> Response {
    let pager = &state.config.pager;

    let page_size = match params.remove(&pager.params.page_size) {
        None => pager.page_size,
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(size) => size,
            Err(_) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("invalid {}: '{raw}'", pager.params.page_size),
                )
            }
        },
    };

    let start_at = Cursor::new(params.remove(&pager.params.start_at).unwrap_or_default());
    let start_after = Cursor::new(params.remove(&pager.params.start_after).unwrap_or_default());
    let request = FetchRequest {
        start_at,
        start_after,
        page_size,
        filters: params.into_iter().collect::<FilterSet>(),
    };

    let result = state.store.read().await.query(&request);
    match result {
        Ok(items) => {
            tracing::debug!(
                count = items.len(),
                start_at = %request.start_at,
                start_after = %request.start_after,
                "Served page"
            );
            let items: Vec<JsonValue> = items
                .iter()
                .map(|item| item.to_json(&pager.cursor_field))
                .collect();
            Json(wrap_items(&pager.items_path, items)).into_response()
        }
        Err(Error::Fetch { status, message }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST);
            error_response(status, message)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serve page");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred",
            )
        }
    }
}

/// Nest `items` under the dotted `items_path` (empty = bare array)
fn wrap_items(items_path: &str, items: Vec<JsonValue>) -> JsonValue {
    let path = items_path.strip_prefix("$.").unwrap_or(items_path);
    path.split('.')
        .filter(|segment| !segment.is_empty() && *segment != "$")
        .rev()
        .fold(JsonValue::Array(items), |inner, segment| {
            let mut object = serde_json::Map::new();
            object.insert(segment.to_string(), inner);
            JsonValue::Object(object)
        })
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Item;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_wrap_items() {
        let items = vec![json!({"id": "a"})];
        assert_eq!(
            wrap_items("issuesPaginated", items.clone()),
            json!({"issuesPaginated": [{"id": "a"}]})
        );
        assert_eq!(
            wrap_items("data.items", items.clone()),
            json!({"data": {"items": [{"id": "a"}]}})
        );
        assert_eq!(wrap_items("", items), json!([{"id": "a"}]));
    }

    async fn spawn(store: MemoryStore) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let config = ServerConfig {
            pager: PagerConfig::new(format!("http://{addr}")),
        };
        tokio::spawn(serve_on(listener, config, store));
        format!("http://{addr}")
    }

    fn issues() -> MemoryStore {
        MemoryStore::new(
            (0..5)
                .map(|i| {
                    Item::new(format!("id_{i}"))
                        .with_field("status", if i % 2 == 0 { "Open" } else { "Closed" })
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_health() {
        let base = spawn(MemoryStore::default()).await;
        let body: JsonValue = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_list_items_with_cursor_and_filter() {
        let base = spawn(issues()).await;
        let body: JsonValue = reqwest::get(format!(
            "{base}/issues-paginated?pageSize=2&startAtDoc=&startAfterDoc=id_0&status=Open&priority="
        ))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

        assert_eq!(
            body,
            json!({"issuesPaginated": [
                {"id": "id_2", "status": "Open"},
                {"id": "id_4", "status": "Open"}
            ]})
        );
    }

    #[tokio::test]
    async fn test_list_items_errors() {
        let base = spawn(issues()).await;

        let unknown = reqwest::get(format!("{base}/issues-paginated?startAtDoc=missing"))
            .await
            .unwrap();
        assert_eq!(unknown.status().as_u16(), 404);
        let body: JsonValue = unknown.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("missing"));

        let bad_size = reqwest::get(format!("{base}/issues-paginated?pageSize=many"))
            .await
            .unwrap();
        assert_eq!(bad_size.status().as_u16(), 400);

        let zero = reqwest::get(format!("{base}/issues-paginated?pageSize=0"))
            .await
            .unwrap();
        assert_eq!(zero.status().as_u16(), 400);
    }
}
