//! Boundary stack
//!
//! LIFO history of the first-item cursors of pages left by stepping forward.

use crate::types::Cursor;
use serde::Serialize;

/// Last-in-first-out history of page boundaries
///
/// The boundary for "two pages back" only becomes reachable after the one
/// for "one page back" has been popped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BoundaryStack {
    entries: Vec<Cursor>,
}

impl BoundaryStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a boundary on top
    pub fn push(&mut self, cursor: Cursor) {
        self.entries.push(cursor);
    }

    /// Remove and return the top boundary, `None` when empty
    pub fn pop(&mut self) -> Option<Cursor> {
        self.entries.pop()
    }

    /// Look at the top boundary without removing it
    pub fn peek(&self) -> Option<&Cursor> {
        self.entries.last()
    }

    /// Drop every boundary
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of boundaries held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the stack holds no boundary
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Boundaries from bottom (oldest) to top (newest)
    pub fn iter(&self) -> impl Iterator<Item = &Cursor> {
        self.entries.iter()
    }
}

impl FromIterator<Cursor> for BoundaryStack {
    fn from_iter<T: IntoIterator<Item = Cursor>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
