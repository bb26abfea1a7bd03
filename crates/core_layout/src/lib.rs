//! Waterfall Core Layout Engine
//!
//! Platform-agnostic multi-column ("waterfall") list layout.
//!
//! This crate implements the column bookkeeping of a vertically scrolling list
//! whose items are distributed over a fixed number of independent lanes:
//! - Each new item goes to the lane with the least content so far
//! - Items may span several lanes, headers and footers span the whole width
//! - The host list engine measures, recycles and positions child views; this
//!   crate only answers geometry queries and reacts to lifecycle hooks
//!
//! The host is abstracted by the [`ListHost`] trait. Every query takes the
//! host by reference, every mutation hook takes it by mutable reference.

mod column;
mod config;
mod host;
mod item;
mod layout;

#[cfg(test)]
mod test_host;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use column::{Column, FixedColumn};
pub use config::{ColumnCountConfig, Orientation, DEFAULT_COLUMN_COUNT};
pub use host::ListHost;
pub use item::{
    ItemKind, ItemRegistry, ItemState, VIEW_TYPE_COLUMN_SPAN_ALL, VIEW_TYPE_COLUMN_SPAN_ONE,
    VIEW_TYPE_HEADER_OR_FOOTER, VIEW_TYPE_IGNORE,
};
pub use layout::{ChildWidth, ColumnSnapshot, WaterfallLayout};

/// Adapter position of a list item. Stable identity of the item.
pub type Position = usize;

/// Errors that can occur while configuring the layout or registering items.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Column count must be at least 1 (got {0})")]
    InvalidColumnCount(usize),

    #[error("Item at position {0} is already registered")]
    AlreadyRegistered(Position),

    #[error("Column index {0} is out of bounds (max: {1})")]
    ColumnOutOfBounds(usize, usize),
}

/// A rectangle in list content coordinates (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Check if this rectangle intersects with another.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Move the rectangle vertically by `delta` pixels.
    pub fn offset_vertical(&mut self, delta: i32) {
        self.y += delta;
    }
}

/// Content padding of the list (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Insets {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Insets {
    /// Create insets with the same value on every side.
    pub fn uniform(value: i32) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }

    /// Total horizontal padding.
    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }
}
