//! Interface to the host list engine.

use crate::{ItemKind, Position, Rect};

/// Services the layout consumes from the recycling list engine that owns it.
///
/// Children are the currently realized (on-screen) views, indexed
/// `0..child_count()` in the host's own order.
pub trait ListHost {
    /// Number of realized children.
    fn child_count(&self) -> usize;

    /// Frame of the realized child at `index`.
    fn child_frame(&self, index: usize) -> Rect;

    /// Whether the child at `index` is a fixed, full-width view (header or footer).
    fn is_fixed_child(&self, index: usize) -> bool;

    /// Move the realized child at `index` vertically by `delta` pixels.
    fn offset_child_vertical(&mut self, index: usize, delta: i32);

    /// Classification of the adapter item at `position`.
    fn item_kind(&self, position: Position) -> ItemKind;

    /// Adapter position of the first realized child.
    fn first_visible_position(&self) -> Position;

    /// Top edge the host would give `position` in a single-column list.
    fn default_item_top(&self, position: Position) -> i32;

    /// Bottom edge the host would give `position` in a single-column list.
    fn default_item_bottom(&self, position: Position) -> i32;

    /// Left edge the host would give `position` in a single-column list.
    fn default_item_left(&self, position: Position) -> i32;
}
