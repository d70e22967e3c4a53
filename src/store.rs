//! In-memory cursor store
//!
//! An ordered collection answering the same queries as the remote document
//! store: fixed default ordering, "start at" / "start after" a document id,
//! equality filters, and a page limit. Backs [`MemoryFetcher`](crate::fetch::MemoryFetcher)
//! and the `serve` command.

use crate::error::{Error, Result};
use crate::fetch::FetchRequest;
use crate::types::{Item, JsonValue};
use std::collections::HashMap;
use std::path::Path;

/// Ordered in-memory collection
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Vec<Item>,
    /// Filter name -> item field to match against
    aliases: HashMap<String, String>,
}

impl MemoryStore {
    /// Create a store holding `items` in their given order
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            aliases: HashMap::new(),
        }
    }

    /// Items `{prefix}00`, `{prefix}01`, ... with at least two digits
    pub fn sequential(prefix: &str, count: usize) -> Self {
        let width = count.saturating_sub(1).to_string().len().max(2);
        Self::new(
            (0..count)
                .map(|i| Item::new(format!("{prefix}{i:0width$}")))
                .collect(),
        )
    }

    /// Match filter `name` against item field `field` instead of a field of the same name
    #[must_use]
    pub fn with_alias(mut self, name: impl Into<String>, field: impl Into<String>) -> Self {
        self.aliases.insert(name.into(), field.into());
        self
    }

    /// Load items from a JSON array, reading each cursor from `cursor_field`
    pub fn from_json_str(json: &str, cursor_field: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json)?;
        let JsonValue::Array(values) = value else {
            return Err(Error::decode("store data must be a JSON array of objects"));
        };
        let items = values
            .into_iter()
            .map(|v| Item::from_json(v, cursor_field))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(items))
    }

    /// Load items from a JSON file
    pub fn from_file(path: impl AsRef<Path>, cursor_field: &str) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;
        Self::from_json_str(&contents, cursor_field)
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Insert an item at `index` in the ordering (clamped to the end)
    pub fn insert(&mut self, index: usize, item: Item) {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
    }

    /// Remove the item with `cursor`, returning it
    pub fn remove(&mut self, cursor: &str) -> Option<Item> {
        let index = self.position(cursor)?;
        Some(self.items.remove(index))
    }

    /// Answer a page query
    ///
    /// Cursors position against the full ordering, so a cursor whose item
    /// does not itself match the filters is still a valid bound. When both
    /// cursors are set, `start_at` wins. Unknown cursors fail with 404.
    pub fn query(&self, request: &FetchRequest) -> Result<Vec<Item>> {
        if request.page_size == 0 {
            return Err(Error::fetch(400, "page size must be at least 1"));
        }

        let start = if !request.start_at.is_empty() {
            self.require_position(request.start_at.as_str())?
        } else if !request.start_after.is_empty() {
            self.require_position(request.start_after.as_str())? + 1
        } else {
            0
        };

        Ok(self.items[start..]
            .iter()
            .filter(|item| self.matches(item, request))
            .take(request.page_size as usize)
            .cloned()
            .collect())
    }

    fn position(&self, cursor: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.cursor.as_str() == cursor)
    }

    fn require_position(&self, cursor: &str) -> Result<usize> {
        self.position(cursor)
            .ok_or_else(|| Error::fetch(404, format!("unknown cursor '{cursor}'")))
    }

    fn matches(&self, item: &Item, request: &FetchRequest) -> bool {
        request.filters.active().all(|(name, wanted)| {
            let field = self.aliases.get(name).map_or(name, String::as_str);
            item.field(field).is_some_and(|value| value_matches(value, wanted))
        })
    }
}

/// Scalars compare by string form; arrays match if any element does
fn value_matches(value: &JsonValue, wanted: &str) -> bool {
    match value {
        JsonValue::String(s) => s == wanted,
        JsonValue::Number(n) => n.to_string() == wanted,
        JsonValue::Bool(b) => b.to_string() == wanted,
        JsonValue::Array(values) => values.iter().any(|v| value_matches(v, wanted)),
        JsonValue::Null | JsonValue::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cursor, FilterSet};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn request(start_at: &str, start_after: &str, page_size: u32) -> FetchRequest {
        FetchRequest {
            start_at: Cursor::from(start_at),
            start_after: Cursor::from(start_after),
            page_size,
            filters: FilterSet::new(),
        }
    }

    fn issues() -> MemoryStore {
        MemoryStore::new(vec![
            Item::new("i5")
                .with_field("priority", "High")
                .with_field("subsystems", json!(["Brakes", "Aero"])),
            Item::new("i4").with_field("priority", "Low"),
            Item::new("i3")
                .with_field("priority", "High")
                .with_field("subsystems", json!(["Electrical"])),
            Item::new("i2").with_field("priority", "Low"),
            Item::new("i1")
                .with_field("priority", "High")
                .with_field("subsystems", json!(["Aero"])),
        ])
        .with_alias("subsystem", "subsystems")
    }

    #[test]
    fn test_sequential_naming() {
        let store = MemoryStore::sequential("id_", 40);
        let page = store.query(&request("", "", 3)).unwrap();
        let ids: Vec<_> = page.iter().map(|i| i.cursor.as_str()).collect();
        assert_eq!(ids, vec!["id_00", "id_01", "id_02"]);

        let wide = MemoryStore::sequential("n", 150);
        assert_eq!(wide.query(&request("", "", 1)).unwrap()[0].cursor.as_str(), "n000");
    }

    #[test]
    fn test_first_page_and_limit() {
        let store = MemoryStore::sequential("id_", 5);
        assert_eq!(store.query(&request("", "", 10)).unwrap().len(), 5);
        assert_eq!(store.query(&request("", "", 2)).unwrap().len(), 2);
    }

    #[test]
    fn test_start_at_includes_cursor() {
        let store = MemoryStore::sequential("id_", 10);
        let page = store.query(&request("id_04", "", 2)).unwrap();
        assert_eq!(page[0].cursor.as_str(), "id_04");
        assert_eq!(page[1].cursor.as_str(), "id_05");
    }

    #[test]
    fn test_start_after_excludes_cursor() {
        let store = MemoryStore::sequential("id_", 10);
        let page = store.query(&request("", "id_04", 2)).unwrap();
        assert_eq!(page[0].cursor.as_str(), "id_05");

        let tail = store.query(&request("", "id_09", 5)).unwrap();
        assert!(tail.is_empty());
    }

    #[test]
    fn test_start_at_takes_precedence() {
        let store = MemoryStore::sequential("id_", 10);
        let page = store.query(&request("id_02", "id_07", 1)).unwrap();
        assert_eq!(page[0].cursor.as_str(), "id_02");
    }

    #[test]
    fn test_unknown_cursor_is_404() {
        let store = MemoryStore::sequential("id_", 3);
        let err = store.query(&request("", "nope", 2)).unwrap_err();
        assert!(matches!(err, Error::Fetch { status: 404, .. }));
    }

    #[test]
    fn test_zero_page_size_is_400() {
        let store = MemoryStore::sequential("id_", 3);
        let err = store.query(&request("", "", 0)).unwrap_err();
        assert!(matches!(err, Error::Fetch { status: 400, .. }));
    }

    #[test]
    fn test_equality_filter() {
        let store = issues();
        let mut req = request("", "", 10);
        req.filters = FilterSet::with_names(["priority", "status"]).with("priority", "High");
        let ids: Vec<_> = store
            .query(&req)
            .unwrap()
            .into_iter()
            .map(|i| i.cursor.into_inner())
            .collect();
        assert_eq!(ids, vec!["i5", "i3", "i1"]);
    }

    #[test]
    fn test_array_filter_through_alias() {
        let store = issues();
        let mut req = request("", "", 10);
        req.filters = FilterSet::new().with("subsystem", "Aero");
        let ids: Vec<_> = store
            .query(&req)
            .unwrap()
            .into_iter()
            .map(|i| i.cursor.into_inner())
            .collect();
        assert_eq!(ids, vec!["i5", "i1"]);
    }

    #[test]
    fn test_cursor_outside_filter_still_positions() {
        let store = issues();
        let mut req = request("", "i4", 10);
        req.filters = FilterSet::new().with("priority", "High");
        let ids: Vec<_> = store
            .query(&req)
            .unwrap()
            .into_iter()
            .map(|i| i.cursor.into_inner())
            .collect();
        assert_eq!(ids, vec!["i3", "i1"]);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut store = MemoryStore::sequential("id_", 3);
        store.insert(0, Item::new("new"));
        assert_eq!(store.len(), 4);
        assert_eq!(store.query(&request("", "", 1)).unwrap()[0].cursor.as_str(), "new");

        assert!(store.remove("id_01").is_some());
        assert!(store.remove("id_01").is_none());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_from_json_str() {
        let store = MemoryStore::from_json_str(
            r#"[{"id": "a", "status": "Open"}, {"id": "b", "status": "Closed"}]"#,
            "id",
        )
        .unwrap();
        assert_eq!(store.len(), 2);

        assert!(MemoryStore::from_json_str(r#"{"id": "a"}"#, "id").is_err());
        assert!(MemoryStore::from_json_str(r#"[{"title": "x"}]"#, "id").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        std::fs::write(&path, r#"[{"id": "x"}]"#).unwrap();
        assert_eq!(MemoryStore::from_file(&path, "id").unwrap().len(), 1);

        let missing = MemoryStore::from_file(dir.path().join("missing.json"), "id");
        assert!(matches!(missing, Err(Error::FileNotFound { .. })));
    }
}
