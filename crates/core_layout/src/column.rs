//! Vertical lanes of the waterfall layout.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{ItemRegistry, ItemState, ListHost, Position};

/// One vertical lane.
///
/// A column does not store geometry of its content. Its extent is computed
/// from whatever children the host has realized inside its horizontal range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    index: usize,
    /// Width of the column in pixels.
    width: i32,
    /// Left edge of the column in pixels.
    left: i32,
    /// Positions of the items assigned to this column.
    items: BTreeSet<Position>,
    synced_top: i32,
    synced_bottom: i32,
}

impl Column {
    /// Create an empty column. Geometry is set by the first measure pass.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            width: 0,
            left: 0,
            items: BTreeSet::new(),
            synced_top: 0,
            synced_bottom: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    pub(crate) fn set_geometry(&mut self, left: i32, width: i32) {
        self.left = left;
        self.width = width;
    }

    /// Look up the assignment of `position` if it was registered in this column.
    pub fn get<'r>(&self, position: Position, registry: &'r ItemRegistry) -> Option<&'r ItemState> {
        if self.items.contains(&position) {
            registry.get(position)
        } else {
            None
        }
    }

    pub fn contains(&self, position: Position) -> bool {
        self.items.contains(&position)
    }

    /// Record that `state` covers this column.
    pub fn register(&mut self, state: &ItemState) {
        self.items.insert(state.position());
    }

    /// Number of items registered in this column.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Registered positions in ascending order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.items.iter().copied()
    }

    pub(crate) fn forget_items(&mut self) {
        self.items.clear();
    }

    /// Bottom snapshot taken by the last [`Column::save`].
    pub fn synced_bottom(&self) -> i32 {
        self.synced_bottom
    }

    pub fn synced_top(&self) -> i32 {
        self.synced_top
    }

    /// Whether the realized child at `index` belongs to this column.
    ///
    /// Fixed children belong to every column. Other children belong when
    /// their left edge lies in `[left, right)` or their right edge in `(left, right]`.
    fn owns_child<H: ListHost + ?Sized>(&self, host: &H, index: usize) -> bool {
        if host.is_fixed_child(index) {
            return true;
        }
        let frame = host.child_frame(index);
        let (left, right) = (self.left(), self.right());
        (frame.x >= left && frame.x < right) || (frame.right() > left && frame.right() <= right)
    }

    /// Smallest top edge of the realized children in this column, 0 if none.
    pub fn top<H: ListHost + ?Sized>(&self, host: &H) -> i32 {
        (0..host.child_count())
            .filter(|&i| self.owns_child(host, i))
            .map(|i| host.child_frame(i).y)
            .min()
            .unwrap_or(0)
    }

    /// Largest bottom edge of the realized children in this column.
    ///
    /// Falls back to the synced bottom when nothing is realized, so a lane
    /// scrolled fully off-screen keeps its remembered extent during a sync pass.
    pub fn bottom<H: ListHost + ?Sized>(&self, host: &H) -> i32 {
        (0..host.child_count())
            .filter(|&i| self.owns_child(host, i))
            .map(|i| host.child_frame(i).bottom())
            .max()
            .unwrap_or(self.synced_bottom)
    }

    /// Shift every realized child of this column vertically by `delta`.
    pub fn offset_top_and_bottom<H: ListHost + ?Sized>(&self, host: &mut H, delta: i32) {
        if delta == 0 {
            return;
        }
        for i in 0..host.child_count() {
            if self.owns_child(host, i) {
                host.offset_child_vertical(i, delta);
            }
        }
    }

    /// Snapshot the current top as the synced bottom.
    pub fn save<H: ListHost + ?Sized>(&mut self, host: &H) {
        self.synced_top = 0;
        self.synced_bottom = self.top(host);
    }

    /// Drop the synced snapshot.
    pub fn clear(&mut self) {
        self.synced_top = 0;
        self.synced_bottom = 0;
    }
}

/// Smallest top over `columns`. Used as the overall scroll top.
pub(crate) fn min_top<H: ListHost + ?Sized>(columns: &[Column], host: &H) -> i32 {
    columns.iter().map(|c| c.top(host)).min().unwrap_or(0)
}

/// Largest top over `columns`.
pub(crate) fn max_top<H: ListHost + ?Sized>(columns: &[Column], host: &H) -> i32 {
    columns.iter().map(|c| c.top(host)).max().unwrap_or(0)
}

/// Smallest bottom over `columns`.
pub(crate) fn min_bottom<H: ListHost + ?Sized>(columns: &[Column], host: &H) -> i32 {
    columns.iter().map(|c| c.bottom(host)).min().unwrap_or(0)
}

/// Largest bottom over `columns`. Used as the overall scroll bottom.
pub(crate) fn max_bottom<H: ListHost + ?Sized>(columns: &[Column], host: &H) -> i32 {
    columns.iter().map(|c| c.bottom(host)).max().unwrap_or(0)
}

/// Full-width lane of headers and footers.
///
/// Items are never registered here. Its extent is the aggregate of the
/// regular columns: as tall as the tallest one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixedColumn {
    width: i32,
    left: i32,
}

impl FixedColumn {
    /// Sentinel index marking "not a real column".
    pub const INDEX: usize = usize::MAX;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        Self::INDEX
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    pub(crate) fn set_geometry(&mut self, left: i32, width: i32) {
        self.left = left;
        self.width = width;
    }

    /// Smallest top among the regular `columns`.
    pub fn top<H: ListHost + ?Sized>(&self, columns: &[Column], host: &H) -> i32 {
        min_top(columns, host)
    }

    /// Largest bottom among the regular `columns`.
    pub fn bottom<H: ListHost + ?Sized>(&self, columns: &[Column], host: &H) -> i32 {
        max_bottom(columns, host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_host::TestHost;
    use crate::Rect;

    fn column(index: usize, left: i32, width: i32) -> Column {
        let mut c = Column::new(index);
        c.set_geometry(left, width);
        c
    }

    #[test]
    fn test_empty_column_extent() {
        let host = TestHost::new();
        let c = column(0, 0, 50);
        assert_eq!(c.top(&host), 0);
        assert_eq!(c.bottom(&host), 0);
    }

    #[test]
    fn test_extent_scans_owned_children() {
        let mut host = TestHost::new();
        host.push(0, Rect::new(0, 10, 50, 40)); // col 0: 10..50
        host.push(1, Rect::new(50, 0, 50, 80)); // col 1: 0..80
        host.push(2, Rect::new(0, 50, 50, 30)); // col 0: 50..80

        let c0 = column(0, 0, 50);
        let c1 = column(1, 50, 50);

        assert_eq!(c0.top(&host), 10);
        assert_eq!(c0.bottom(&host), 80);
        assert_eq!(c1.top(&host), 0);
        assert_eq!(c1.bottom(&host), 80);
    }

    #[test]
    fn test_ownership_edges() {
        let mut host = TestHost::new();
        // Ends exactly on the column's left edge: not owned.
        host.push(0, Rect::new(0, 0, 50, 100));
        let c1 = column(1, 50, 50);
        assert_eq!(c1.bottom(&host), 0);

        // Starts inside the column.
        host.push(1, Rect::new(60, 0, 40, 30));
        assert_eq!(c1.bottom(&host), 30);

        // Starts left of the column, ends inside it.
        host.push(2, Rect::new(20, 0, 60, 70));
        assert_eq!(c1.bottom(&host), 70);
    }

    #[test]
    fn test_fixed_children_belong_to_every_column() {
        let mut host = TestHost::new();
        host.push_fixed(0, Rect::new(0, 0, 100, 20));
        let c0 = column(0, 0, 50);
        let c1 = column(1, 50, 50);
        assert_eq!(c0.bottom(&host), 20);
        assert_eq!(c1.bottom(&host), 20);

        // Even a zero-width, unmeasured column sees fixed children.
        let unmeasured = Column::new(2);
        assert_eq!(unmeasured.bottom(&host), 20);
    }

    #[test]
    fn test_offset_zero_is_noop() {
        let mut host = TestHost::new();
        host.push(0, Rect::new(0, 10, 50, 40));
        host.push(1, Rect::new(50, 25, 50, 40));
        let before: Vec<Rect> = host.children.iter().map(|c| c.frame).collect();

        column(0, 0, 50).offset_top_and_bottom(&mut host, 0);

        let after: Vec<Rect> = host.children.iter().map(|c| c.frame).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_offset_moves_only_owned_children() {
        let mut host = TestHost::new();
        host.push(0, Rect::new(0, 10, 50, 40));
        host.push(1, Rect::new(50, 25, 50, 40));
        host.push_fixed(2, Rect::new(0, 100, 100, 10));

        column(0, 0, 50).offset_top_and_bottom(&mut host, -10);

        assert_eq!(host.frame_of(0), Some(Rect::new(0, 0, 50, 40)));
        assert_eq!(host.frame_of(1), Some(Rect::new(50, 25, 50, 40)));
        assert_eq!(host.frame_of(2), Some(Rect::new(0, 90, 100, 10)));
    }

    #[test]
    fn test_save_and_clear_roundtrip() {
        let mut host = TestHost::new();
        host.push(0, Rect::new(0, 30, 50, 40));
        let mut c = column(0, 0, 50);

        c.save(&host);
        assert_eq!(c.synced_bottom(), 30);
        assert_eq!(c.synced_top(), 0);
        // Children still realized: live value wins.
        assert_eq!(c.bottom(&host), 70);

        // Children discarded: the snapshot is reported instead of 0.
        host.children.clear();
        assert_eq!(c.bottom(&host), 30);
        assert_eq!(c.top(&host), 0);

        c.clear();
        assert_eq!(c.bottom(&host), 0);
        assert_eq!(c.synced_bottom(), 0);
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ItemRegistry::new();
        let state = ItemState::new(4, 0, 2);
        registry.insert(state).unwrap();

        let mut c0 = column(0, 0, 50);
        let c1 = column(1, 50, 50);
        c0.register(&state);

        assert_eq!(c0.get(4, &registry), Some(&state));
        assert!(c1.get(4, &registry).is_none());
        assert!(c0.get(5, &registry).is_none());
        assert_eq!(c0.item_count(), 1);
        assert_eq!(c0.positions().collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn test_fixed_column_aggregates() {
        let mut host = TestHost::new();
        host.push(0, Rect::new(0, 10, 50, 40)); // col 0: 10..50
        host.push(1, Rect::new(50, 5, 50, 100)); // col 1: 5..105
        let columns = vec![column(0, 0, 50), column(1, 50, 50)];

        let mut fixed = FixedColumn::new();
        fixed.set_geometry(0, 100);
        assert_eq!(fixed.index(), usize::MAX);
        assert_eq!(fixed.top(&columns, &host), 5);
        assert_eq!(fixed.bottom(&columns, &host), 105);
        assert_eq!(fixed.right(), 100);
    }
}
