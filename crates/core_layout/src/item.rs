//! Item classification and column assignment records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{LayoutError, Position};

/// Raw view type of items the list should not recycle.
pub const VIEW_TYPE_IGNORE: i32 = -1;

/// Raw view type of header and footer items.
pub const VIEW_TYPE_HEADER_OR_FOOTER: i32 = -2;

/// Raw view type of items that span every column.
pub const VIEW_TYPE_COLUMN_SPAN_ALL: i32 = -3;

/// Unit of the span encoding: a raw view type of `n * VIEW_TYPE_COLUMN_SPAN_ONE`
/// spans `n` columns.
pub const VIEW_TYPE_COLUMN_SPAN_ONE: i32 = -100;

/// Layout classification of an item, decoded once from the adapter's view type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "span", rename_all = "snake_case")]
pub enum ItemKind {
    /// A regular item occupying a single column.
    Regular,
    /// Header or footer. Never assigned to a column.
    HeaderFooter,
    /// Spans every column.
    SpanAll,
    /// Spans `n` contiguous columns.
    SpanN(usize),
}

impl ItemKind {
    /// Decode a raw adapter view type.
    pub fn from_view_type(view_type: i32) -> Self {
        match view_type {
            VIEW_TYPE_HEADER_OR_FOOTER => ItemKind::HeaderFooter,
            VIEW_TYPE_COLUMN_SPAN_ALL => ItemKind::SpanAll,
            t if t <= VIEW_TYPE_COLUMN_SPAN_ONE => {
                ItemKind::SpanN((t / VIEW_TYPE_COLUMN_SPAN_ONE) as usize)
            }
            _ => ItemKind::Regular,
        }
    }

    /// Raw view type that decodes to a span of `span` columns.
    pub fn span_n_view_type(span: usize) -> i32 {
        let span = i32::try_from(span.max(1)).unwrap_or(i32::MAX);
        VIEW_TYPE_COLUMN_SPAN_ONE.saturating_mul(span)
    }

    /// Whether this item is a header or footer.
    pub fn is_header_or_footer(&self) -> bool {
        matches!(self, ItemKind::HeaderFooter)
    }

    /// Number of columns this item occupies in a layout of `column_count` columns.
    ///
    /// Never less than 1. Headers and footers report 1 even though they are
    /// never placed into a column.
    pub fn span(&self, column_count: usize) -> usize {
        let span = match self {
            ItemKind::SpanAll => column_count,
            ItemKind::SpanN(n) => *n,
            ItemKind::Regular | ItemKind::HeaderFooter => 1,
        };
        span.max(1)
    }
}

/// Column assignment of a single item. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemState {
    position: Position,
    column_index: usize,
    span: usize,
}

impl ItemState {
    pub fn new(position: Position, column_index: usize, span: usize) -> Self {
        Self {
            position,
            column_index,
            span: span.max(1),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Leftmost column the item occupies.
    pub fn column_index(&self) -> usize {
        self.column_index
    }

    pub fn span(&self) -> usize {
        self.span
    }

    /// Column indices covered by this item, clamped to `column_count`.
    pub fn columns(&self, column_count: usize) -> std::ops::Range<usize> {
        let start = self.column_index.min(column_count);
        let end = (self.column_index + self.span).min(column_count);
        start..end
    }
}

/// Position-indexed store of every [`ItemState`] created so far.
///
/// Each item is stored once; columns only keep the positions they cover.
#[derive(Debug, Clone, Default)]
pub struct ItemRegistry {
    states: BTreeMap<Position, ItemState>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, position: Position) -> Option<&ItemState> {
        self.states.get(&position)
    }

    pub fn contains(&self, position: Position) -> bool {
        self.states.contains_key(&position)
    }

    /// Store a new assignment. Assignments are one-time decisions, so a
    /// second insert for the same position is rejected.
    pub fn insert(&mut self, state: ItemState) -> Result<(), LayoutError> {
        if self.states.contains_key(&state.position) {
            return Err(LayoutError::AlreadyRegistered(state.position));
        }
        self.states.insert(state.position, state);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    /// Iterate assignments in position order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemState> {
        self.states.values()
    }
}
