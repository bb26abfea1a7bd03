//! Simulated recycling list engine.
//!
//! [`ListEngine`] plays the role of the host list view: it owns the adapter
//! items and the realized children, fills the viewport, scrolls, recycles
//! off-screen children and runs sync passes. Every placement decision is
//! delegated to the [`WaterfallLayout`] it owns.

use tracing::{debug, info};
use waterfall_core_layout::{
    ChildWidth, Insets, ItemKind, ListHost, Position, Rect, WaterfallLayout,
};
use waterfall_protocol::{HostCommand, HostResponse, ItemPlacement};

/// One adapter item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemSpec {
    /// Measured height in pixels.
    pub height: i32,
    /// Raw adapter view type.
    pub view_type: i32,
}

impl ItemSpec {
    pub fn new(height: i32, view_type: i32) -> Self {
        Self { height, view_type }
    }

    pub fn kind(&self) -> ItemKind {
        ItemKind::from_view_type(self.view_type)
    }
}

#[derive(Debug, Clone)]
struct Child {
    position: Position,
    frame: Rect,
    fixed: bool,
}

/// Host-side state the layout queries. Children are kept in adapter order.
#[derive(Debug)]
struct HostState {
    items: Vec<ItemSpec>,
    kinds: Vec<ItemKind>,
    children: Vec<Child>,
    padding: Insets,
    width: i32,
    height: i32,
}

impl HostState {
    fn last_position(&self) -> Option<Position> {
        self.children.last().map(|c| c.position)
    }

    fn child(&self, position: Position) -> Option<&Child> {
        self.children
            .binary_search_by_key(&position, |c| c.position)
            .ok()
            .map(|i| &self.children[i])
    }

    fn offset_all(&mut self, delta: i32) {
        for child in &mut self.children {
            child.frame.offset_vertical(delta);
        }
    }
}

impl ListHost for HostState {
    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child_frame(&self, index: usize) -> Rect {
        self.children[index].frame
    }

    fn is_fixed_child(&self, index: usize) -> bool {
        self.children[index].fixed
    }

    fn offset_child_vertical(&mut self, index: usize, delta: i32) {
        self.children[index].frame.offset_vertical(delta);
    }

    fn item_kind(&self, position: Position) -> ItemKind {
        self.kinds.get(position).copied().unwrap_or(ItemKind::Regular)
    }

    fn first_visible_position(&self) -> Position {
        self.children.first().map_or(0, |c| c.position)
    }

    fn default_item_top(&self, _position: Position) -> i32 {
        self.children
            .iter()
            .map(|c| c.frame.bottom())
            .max()
            .unwrap_or(self.padding.top)
    }

    fn default_item_bottom(&self, _position: Position) -> i32 {
        self.children
            .iter()
            .map(|c| c.frame.y)
            .min()
            .unwrap_or(self.height - self.padding.bottom)
    }

    fn default_item_left(&self, _position: Position) -> i32 {
        self.padding.left
    }
}

/// A vertically scrolling list that lays its children out in columns.
#[derive(Debug)]
pub struct ListEngine {
    layout: WaterfallLayout,
    host: HostState,
}

impl ListEngine {
    /// Create an engine over `items`. Nothing is realized until [`ListEngine::measure`].
    pub fn new(layout: WaterfallLayout, items: Vec<ItemSpec>, padding: Insets) -> Self {
        let kinds = items.iter().map(ItemSpec::kind).collect();
        Self {
            layout,
            host: HostState {
                items,
                kinds,
                children: Vec::new(),
                padding,
                width: 0,
                height: 0,
            },
        }
    }

    pub fn layout(&self) -> &WaterfallLayout {
        &self.layout
    }

    pub fn item_count(&self) -> usize {
        self.host.items.len()
    }

    pub fn viewport(&self) -> (i32, i32) {
        (self.host.width, self.host.height)
    }

    /// Adapter position of the first realized child.
    pub fn first_position(&self) -> Position {
        self.host.first_visible_position()
    }

    pub fn child_count(&self) -> usize {
        self.host.children.len()
    }

    /// Frame of the realized child at `position`.
    pub fn frame_of(&self, position: Position) -> Option<Rect> {
        self.host.child(position).map(|c| c.frame)
    }

    /// Top of the scrollable content.
    pub fn scroll_top(&self) -> i32 {
        self.layout.scroll_child_top(&self.host)
    }

    /// Bottom of the scrollable content.
    pub fn scroll_bottom(&self) -> i32 {
        self.layout.scroll_child_bottom(&self.host)
    }

    /// Measure the list at a new size and lay it out again from the first
    /// realized position.
    pub fn measure(&mut self, width: i32, height: i32) {
        self.host.width = width;
        self.host.height = height;
        self.layout.on_measure(width, self.host.padding);

        if self.host.children.is_empty() {
            self.fill_down_from(0);
            self.adjust(true);
        } else {
            let first = self.first_position();
            self.jump_to(first);
        }
        info!(
            "Measured {}x{}: {} children realized",
            width,
            height,
            self.host.children.len()
        );
    }

    /// Realize the item at `position` next to the existing children.
    fn add_child(&mut self, position: Position, flow: bool) {
        self.layout.on_item_added(&self.host, position, flow);

        let kind = self.host.item_kind(position);
        let fixed = kind.is_header_or_footer();
        let width = match self.layout.child_width(position, fixed) {
            ChildWidth::Parent => self.layout.fixed_column().width(),
            ChildWidth::Exactly(width) => width,
        };
        let height = self.host.items[position].height;
        let left = self.layout.item_left(&self.host, position);
        let frame = if flow {
            let top = self.layout.item_top(&self.host, position);
            Rect::new(left, top, width, height)
        } else {
            let bottom = self.layout.item_bottom(&self.host, position);
            Rect::new(left, bottom - height, width, height)
        };

        let child = Child {
            position,
            frame,
            fixed,
        };
        if flow {
            self.host.children.push(child);
        } else {
            self.host.children.insert(0, child);
        }
    }

    fn fill_down_from(&mut self, start: Position) {
        let end = self.host.height - self.host.padding.bottom;
        let mut next = start;
        while next < self.host.items.len() && self.layout.fill_child_bottom(&self.host) < end {
            self.add_child(next, true);
            next += 1;
        }
    }

    fn fill_down(&mut self) {
        if let Some(last) = self.host.last_position() {
            self.fill_down_from(last + 1);
        }
    }

    fn fill_up(&mut self) {
        let start = self.host.padding.top;
        let mut prev = self.first_position();
        while prev > 0
            && !self.host.children.is_empty()
            && self.layout.fill_child_top(&self.host) > start
        {
            prev -= 1;
            self.add_child(prev, false);
        }
    }

    /// Post-fill adjustment: the layout aligns the column tops at the start
    /// of the list, then the content is pinned to the viewport edges.
    fn adjust(&mut self, down: bool) {
        self.layout.on_adjust_child_views(&mut self.host, down);

        // A pin can open a gap at the other edge; refilling it may need one more pin.
        for _ in 0..2 {
            let delta = self.pin_delta();
            if delta == 0 {
                break;
            }
            debug!("Pinning content by {}", delta);
            self.host.offset_all(delta);
            if delta < 0 {
                self.fill_down();
            } else {
                self.fill_up();
            }
        }
    }

    /// Offset that keeps the content from leaving the viewport edges.
    fn pin_delta(&self) -> i32 {
        let Some(last) = self.host.last_position() else {
            return 0;
        };
        let top_edge = self.host.padding.top;
        let bottom_edge = self.host.height - self.host.padding.bottom;
        let top = self.scroll_top();
        let bottom = self.scroll_bottom();
        let at_start = self.first_position() == 0;

        if at_start && top > top_edge {
            return top_edge - top;
        }
        if last + 1 == self.host.items.len() && bottom < bottom_edge {
            let room = bottom_edge - bottom;
            // Content shorter than the viewport stays at the top.
            return if at_start {
                room.min((top_edge - top).max(0))
            } else {
                room
            };
        }
        0
    }

    /// Whether a child other than `except` still covers `column`.
    fn column_keeps_child(&self, column: usize, except: usize) -> bool {
        let column_count = self.layout.column_count();
        self.host.children.iter().enumerate().any(|(i, c)| {
            i != except
                && (c.fixed
                    || self
                        .layout
                        .item_state(c.position)
                        .is_some_and(|s| s.columns(column_count).contains(&column)))
        })
    }

    /// Whether the child at `index` can be dropped without leaving one of
    /// its columns without any realized child.
    fn can_recycle(&self, index: usize) -> bool {
        let child = &self.host.children[index];
        let covered = if child.fixed {
            0..self.layout.column_count()
        } else {
            match self.layout.item_state(child.position) {
                Some(state) => state.columns(self.layout.column_count()),
                None => return true,
            }
        };
        covered.into_iter().all(|column| self.column_keeps_child(column, index))
    }

    /// Drop children that scrolled above the viewport, from the front only
    /// so the realized positions stay contiguous.
    fn recycle_front(&mut self) {
        let top_edge = self.host.padding.top;
        let mut recycled = 0;
        while let Some(first) = self.host.children.first() {
            if first.frame.bottom() > top_edge || !self.can_recycle(0) {
                break;
            }
            self.host.children.remove(0);
            recycled += 1;
        }
        if recycled > 0 {
            debug!("Recycled {} children above the viewport", recycled);
        }
    }

    /// Drop children that scrolled below the viewport, from the back only.
    fn recycle_back(&mut self) {
        let bottom_edge = self.host.height - self.host.padding.bottom;
        let mut recycled = 0;
        while let Some(last) = self.host.children.last() {
            let index = self.host.children.len() - 1;
            if last.frame.y < bottom_edge || !self.can_recycle(index) {
                break;
            }
            self.host.children.pop();
            recycled += 1;
        }
        if recycled > 0 {
            debug!("Recycled {} children below the viewport", recycled);
        }
    }

    /// Scroll the content by `delta` pixels (positive = towards the end).
    ///
    /// Large deltas are applied in steps of at most half the viewport.
    pub fn scroll_by(&mut self, delta: i32) {
        if self.host.children.is_empty() || delta == 0 {
            return;
        }
        let step = (self.host.height / 2).max(1);
        let mut remaining = delta;
        while remaining != 0 {
            let amount = remaining.clamp(-step, step);
            remaining -= amount;

            self.host.offset_all(-amount);
            let down = amount > 0;
            if down {
                self.recycle_front();
                self.fill_down();
            } else {
                self.recycle_back();
                self.fill_up();
            }
            self.adjust(down);
        }
        debug!(
            "Scrolled by {}: first position {}, {} children",
            delta,
            self.first_position(),
            self.host.children.len()
        );
    }

    /// Lay the list out again starting at `position` (a sync pass).
    ///
    /// The columns snapshot their extent before the children are discarded,
    /// so the refill continues each lane where it was.
    pub fn jump_to(&mut self, position: Position) {
        if self.host.items.is_empty() {
            return;
        }
        let position = position.min(self.host.items.len() - 1);

        self.layout.on_layout_sync(&self.host, position);
        self.host.children.clear();
        self.fill_down_from(position);
        self.layout.on_layout_sync_finished(position);

        self.adjust(true);
        self.fill_up();
        self.adjust(false);
        debug!("Synced at position {}", position);
    }

    /// The data set changed: forget every assignment and fill from the top.
    pub fn reset(&mut self) {
        self.host.children.clear();
        self.layout.on_data_set_changed();
        self.fill_down_from(0);
        self.adjust(true);
        info!("Data set reset: {} children realized", self.host.children.len());
    }

    /// Frames of every realized child.
    pub fn placements(&self) -> Vec<ItemPlacement> {
        self.host
            .children
            .iter()
            .map(|c| {
                let state = self.layout.item_state(c.position);
                ItemPlacement {
                    position: c.position,
                    column: state.map(|s| s.column_index()),
                    span: state.map_or(1, |s| s.span()),
                    rect: c.frame,
                }
            })
            .collect()
    }

    /// Apply one replay command.
    pub fn execute(&mut self, command: HostCommand) -> HostResponse {
        match command {
            HostCommand::Measure { width, height } => {
                let columns = i32::try_from(self.layout.column_count()).unwrap_or(i32::MAX);
                let content_width = width.saturating_sub(self.host.padding.horizontal());
                if content_width < columns || height <= 0 {
                    return HostResponse::error(format!(
                        "Invalid viewport {}x{} for {} columns",
                        width, height, columns
                    ));
                }
                self.measure(width, height);
                HostResponse::Ok
            }
            HostCommand::ScrollBy { delta } => {
                self.scroll_by(delta);
                HostResponse::Ok
            }
            HostCommand::JumpTo { position } => {
                if position >= self.host.items.len() {
                    return HostResponse::error(format!(
                        "Position {} out of range ({} items)",
                        position,
                        self.host.items.len()
                    ));
                }
                self.jump_to(position);
                HostResponse::Ok
            }
            HostCommand::Reset => {
                self.reset();
                HostResponse::Ok
            }
            HostCommand::QueryColumns => HostResponse::Columns {
                columns: self.layout.column_snapshots(&self.host),
                scroll_top: self.scroll_top(),
                scroll_bottom: self.scroll_bottom(),
            },
            HostCommand::QueryPlacements => HostResponse::Placements {
                first_position: self.first_position(),
                items: self.placements(),
            },
            HostCommand::QueryItem { position } => {
                let Some(kind) = self.host.kinds.get(position).copied() else {
                    return HostResponse::error(format!("No item at position {}", position));
                };
                let state = self.layout.item_state(position);
                HostResponse::Item {
                    position,
                    kind,
                    column: state.map(|s| s.column_index()),
                    span: state.map_or(1, |s| s.span()),
                    width: self.layout.item_width(position),
                    rect: self.frame_of(position),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waterfall_core_layout::VIEW_TYPE_HEADER_OR_FOOTER;

    fn engine(columns: usize, items: Vec<ItemSpec>) -> ListEngine {
        let layout = WaterfallLayout::new(columns).unwrap();
        ListEngine::new(layout, items, Insets::default())
    }

    fn regular(heights: &[i32]) -> Vec<ItemSpec> {
        heights.iter().map(|&h| ItemSpec::new(h, 0)).collect()
    }

    #[test]
    fn test_initial_fill_two_columns() {
        let mut e = engine(2, regular(&[100, 50, 50, 100, 80, 80]));
        e.measure(200, 150);

        assert_eq!(e.frame_of(0), Some(Rect::new(0, 0, 100, 100)));
        assert_eq!(e.frame_of(1), Some(Rect::new(100, 0, 100, 50)));
        assert_eq!(e.frame_of(2), Some(Rect::new(100, 50, 100, 50)));
        // Both columns now end at 100: tie goes to column 0.
        assert_eq!(e.frame_of(3), Some(Rect::new(0, 100, 100, 100)));
        assert_eq!(e.frame_of(4), Some(Rect::new(100, 100, 100, 80)));
        // Both columns are past the viewport bottom.
        assert_eq!(e.child_count(), 5);
    }

    #[test]
    fn test_header_spans_full_width() {
        let mut items = vec![ItemSpec::new(40, VIEW_TYPE_HEADER_OR_FOOTER)];
        items.extend(regular(&[60, 60, 60]));
        let mut e = engine(2, items);
        e.measure(200, 400);

        assert_eq!(e.frame_of(0), Some(Rect::new(0, 0, 200, 40)));
        assert_eq!(e.frame_of(1), Some(Rect::new(0, 40, 100, 60)));
        assert_eq!(e.frame_of(2), Some(Rect::new(100, 40, 100, 60)));
        assert_eq!(e.frame_of(3), Some(Rect::new(0, 100, 100, 60)));
        let placements = e.placements();
        assert_eq!(placements[0].column, None);
        assert_eq!(placements[2].column, Some(1));
    }

    #[test]
    fn test_scroll_down_recycles_and_fills() {
        let mut e = engine(2, regular(&[100; 40]));
        e.measure(200, 300);
        assert_eq!(e.first_position(), 0);

        e.scroll_by(450);
        assert!(e.first_position() > 0);
        // The viewport stays covered in every column.
        for c in e.layout().column_snapshots(&e.host) {
            assert!(c.bottom >= 300, "column {} ends at {}", c.index, c.bottom);
        }
    }

    #[test]
    fn test_scroll_back_to_start_aligns_columns() {
        let mut e = engine(2, regular(&[100, 40, 70, 90, 30, 120, 60, 80, 50, 110, 90, 70]));
        e.measure(200, 200);
        let initial = e.placements();

        e.scroll_by(300);
        e.scroll_by(-1000);

        assert_eq!(e.first_position(), 0);
        assert_eq!(e.scroll_top(), 0);
        for c in e.layout().column_snapshots(&e.host) {
            assert_eq!(c.top, 0);
        }
        // Placement never changes across recycling.
        for p in initial {
            assert_eq!(e.layout().item_state(p.position).map(|s| s.column_index()), p.column);
        }
    }

    #[test]
    fn test_scroll_past_end_is_pinned() {
        let mut e = engine(2, regular(&[100; 6]));
        e.measure(200, 200);
        e.scroll_by(10_000);
        assert_eq!(e.scroll_bottom(), 200);
    }

    #[test]
    fn test_jump_to_keeps_assignments() {
        let mut e = engine(2, regular(&[100, 50, 70, 90, 30, 120, 60, 80]));
        e.measure(200, 400);
        let before = e.placements();

        e.jump_to(0);
        let after = e.placements();
        assert_eq!(before, after);
    }

    #[test]
    fn test_execute_errors() {
        let mut e = engine(2, regular(&[100; 3]));
        assert!(matches!(
            e.execute(HostCommand::Measure { width: 0, height: 100 }),
            HostResponse::Error { .. }
        ));
        e.execute(HostCommand::Measure {
            width: 200,
            height: 100,
        });
        assert!(matches!(
            e.execute(HostCommand::JumpTo { position: 3 }),
            HostResponse::Error { .. }
        ));
        assert!(matches!(
            e.execute(HostCommand::QueryItem { position: 9 }),
            HostResponse::Error { .. }
        ));
    }

    #[test]
    fn test_measure_rejects_width_below_column_count() {
        let mut e = engine(3, regular(&[100; 50]));
        assert!(matches!(
            e.execute(HostCommand::Measure { width: 2, height: 300 }),
            HostResponse::Error { .. }
        ));
        assert_eq!(e.child_count(), 0);

        // One pixel per column is enough.
        assert_eq!(
            e.execute(HostCommand::Measure { width: 3, height: 300 }),
            HostResponse::Ok
        );
        let columns: Vec<Option<usize>> = e.placements().iter().take(3).map(|p| p.column).collect();
        assert_eq!(columns, vec![Some(0), Some(1), Some(2)]);
        assert_eq!(e.child_count(), 9);
    }

    #[test]
    fn test_query_item() {
        let mut e = engine(2, regular(&[100, 60]));
        e.execute(HostCommand::Measure {
            width: 200,
            height: 400,
        });
        match e.execute(HostCommand::QueryItem { position: 1 }) {
            HostResponse::Item {
                column,
                span,
                width,
                rect,
                ..
            } => {
                assert_eq!(column, Some(1));
                assert_eq!(span, 1);
                assert_eq!(width, 100);
                assert_eq!(rect, Some(Rect::new(100, 0, 100, 60)));
            }
            other => panic!("Expected Item response, got {:?}", other),
        }
    }
}
