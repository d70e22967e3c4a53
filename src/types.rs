//! Common types used throughout cursor-pager
//!
//! This module contains the data model shared by the pagination engine,
//! the fetchers, and the store: cursors, items, pages and filter sets.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

// ============================================================================
// Cursor
// ============================================================================

/// Opaque token identifying an item's position in the store's ordering
///
/// The engine never parses a cursor; it only stores, compares for equality
/// and forwards it. The empty cursor stands for "no bound".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Create a cursor from any string-like value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The empty cursor ("unconstrained")
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Check if this is the empty cursor
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the raw token
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the raw token
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Cursor {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<Option<&Cursor>> for Cursor {
    fn from(value: Option<&Cursor>) -> Self {
        value.cloned().unwrap_or_default()
    }
}

// ============================================================================
// Item
// ============================================================================

/// One record of the displayed collection
///
/// Only `cursor` matters to the engine. Everything else rides along in
/// `fields` for the view layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Position token of this item
    pub cursor: Cursor,
    /// Remaining attributes
    #[serde(flatten)]
    pub fields: JsonObject,
}

impl Item {
    /// Create an item with no attributes besides its cursor
    pub fn new(cursor: impl Into<Cursor>) -> Self {
        Self {
            cursor: cursor.into(),
            fields: JsonObject::new(),
        }
    }

    /// Add an attribute
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Get an attribute
    pub fn field(&self, key: &str) -> Option<&JsonValue> {
        self.fields.get(key)
    }

    /// Build an item from a JSON object, taking the cursor from `cursor_field`
    ///
    /// String and numeric identifiers are accepted; anything else is a decode error.
    pub fn from_json(value: JsonValue, cursor_field: &str) -> Result<Self> {
        let JsonValue::Object(mut fields) = value else {
            return Err(Error::decode(format!(
                "expected item object, got {}",
                json_kind(&value)
            )));
        };

        let cursor = match fields.remove(cursor_field) {
            Some(JsonValue::String(s)) => Cursor::new(s),
            Some(JsonValue::Number(n)) => Cursor::new(n.to_string()),
            Some(other) => {
                return Err(Error::decode(format!(
                    "cursor field '{cursor_field}' must be a string or number, got {}",
                    json_kind(&other)
                )))
            }
            None => {
                return Err(Error::decode(format!(
                    "item is missing cursor field '{cursor_field}'"
                )))
            }
        };

        Ok(Self { cursor, fields })
    }

    /// Render back to a JSON object with the cursor under `cursor_field`
    pub fn to_json(&self, cursor_field: &str) -> JsonValue {
        let mut object = self.fields.clone();
        object.insert(
            cursor_field.to_string(),
            JsonValue::String(self.cursor.as_str().to_string()),
        );
        JsonValue::Object(object)
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

// ============================================================================
// Page
// ============================================================================

/// Ordered items returned by one fetch (may be empty)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Items in store order
    pub items: Vec<Item>,
}

impl Page {
    /// Create a page from items
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// An empty page
    pub fn empty() -> Self {
        Self::default()
    }

    /// Cursor of the first item
    pub fn first_cursor(&self) -> Option<&Cursor> {
        self.items.first().map(|item| &item.cursor)
    }

    /// Cursor of the last item
    pub fn last_cursor(&self) -> Option<&Cursor> {
        self.items.last().map(|item| &item.cursor)
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the page has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Cursors of every item, in order
    pub fn cursors(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.cursor.as_str()).collect()
    }
}

// ============================================================================
// Filter Set
// ============================================================================

/// Active filter selections, keyed by filter name
///
/// An empty value means "no filter" for that name. Keys are kept sorted so
/// requests are built deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(BTreeMap<String, String>);

impl FilterSet {
    /// Create an empty filter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare filter names with empty selections
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            names
                .into_iter()
                .map(|name| (name.into(), String::new()))
                .collect(),
        )
    }

    /// Set a selection (builder style)
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a selection
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Clear one selection, keeping the name declared
    pub fn unset(&mut self, name: &str) {
        if let Some(value) = self.0.get_mut(name) {
            value.clear();
        }
    }

    /// Clear every selection, keeping the names declared
    pub fn clear_values(&mut self) {
        for value in self.0.values_mut() {
            value.clear();
        }
    }

    /// Get the selection for a name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// All declared names and selections (including empty ones)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Only the selections that actually constrain the query
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(_, v)| !v.is_empty())
    }

    /// Check if no selection constrains the query
    pub fn is_unconstrained(&self) -> bool {
        self.active().next().is_none()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}
