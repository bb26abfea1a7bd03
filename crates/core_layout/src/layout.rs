//! The waterfall layout controller.
//!
//! [`WaterfallLayout`] owns the columns and the item registry. It never acts
//! on its own: the host calls the lifecycle hooks (`on_*`) and the geometry
//! queries while it measures, fills and recycles children.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::column::{max_bottom, max_top, min_bottom, min_top};
use crate::{
    Column, ColumnCountConfig, FixedColumn, Insets, ItemRegistry, ItemState, LayoutError,
    ListHost, Orientation, Position,
};

/// Width a child should be measured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildWidth {
    /// Measure with the host's own width spec (headers and footers).
    Parent,
    /// Measure with exactly this many pixels.
    Exactly(i32),
}

/// Reporting view of a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSnapshot {
    pub index: usize,
    pub left: i32,
    pub width: i32,
    pub top: i32,
    pub bottom: i32,
    /// Number of items registered in the column.
    pub items: usize,
}

/// Multi-column list layout.
#[derive(Debug, Clone)]
pub struct WaterfallLayout {
    columns: Vec<Column>,
    fixed: FixedColumn,
    registry: ItemRegistry,
}

impl WaterfallLayout {
    /// Create a layout with `column_count` regular columns.
    pub fn new(column_count: usize) -> Result<Self, LayoutError> {
        if column_count == 0 {
            return Err(LayoutError::InvalidColumnCount(column_count));
        }
        Ok(Self {
            columns: (0..column_count).map(Column::new).collect(),
            fixed: FixedColumn::new(),
            registry: ItemRegistry::new(),
        })
    }

    /// Create a layout with the column count resolved from `config`.
    pub fn from_config(
        config: &ColumnCountConfig,
        orientation: Orientation,
    ) -> Result<Self, LayoutError> {
        Self::new(config.resolve(orientation))
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get a regular column by index.
    pub fn column(&self, index: usize) -> Result<&Column, LayoutError> {
        self.columns.get(index).ok_or(LayoutError::ColumnOutOfBounds(
            index,
            self.columns.len().saturating_sub(1),
        ))
    }

    pub fn fixed_column(&self) -> &FixedColumn {
        &self.fixed
    }

    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    /// Assignment of `position`, if it has been placed.
    pub fn item_state(&self, position: Position) -> Option<&ItemState> {
        self.registry.get(position)
    }

    /// Recompute column geometry for a list measured `measured_width` wide.
    ///
    /// Leftover pixels of the integer division stay unused at the right edge.
    pub fn on_measure(&mut self, measured_width: i32, padding: Insets) {
        let content_width = (measured_width - padding.horizontal()).max(0);
        let width = content_width / self.columns.len() as i32;

        for column in &mut self.columns {
            let left = padding.left + width * column.index() as i32;
            column.set_geometry(left, width);
        }
        self.fixed.set_geometry(padding.left, content_width);

        debug!(
            "Measured {} columns: width={} content_width={}",
            self.columns.len(),
            width,
            content_width
        );
    }

    /// Number of columns the item at `position` occupies.
    pub fn span_at<H: ListHost + ?Sized>(&self, host: &H, position: Position) -> usize {
        host.item_kind(position).span(self.columns.len())
    }

    fn is_header_or_footer<H: ListHost + ?Sized>(&self, host: &H, position: Position) -> bool {
        host.item_kind(position).is_header_or_footer()
    }

    /// The host added the item at `position` to the list.
    ///
    /// `flow` is true while filling downward. Regular items are assigned to a
    /// column on their first addition; later additions keep that assignment.
    /// Returns the assignment, or `None` for headers and footers.
    pub fn on_item_added<H: ListHost + ?Sized>(
        &mut self,
        host: &H,
        position: Position,
        flow: bool,
    ) -> Option<ItemState> {
        if self.is_header_or_footer(host, position) {
            return None;
        }
        let span = self.span_at(host, position);
        let index = self.column_for(host, flow, position, span);
        let state = ItemState::new(position, index, span);

        if let Err(e) = self.registry.insert(state) {
            trace!("{}", e);
            return self.registry.get(position).copied();
        }
        let covered = state.columns(self.columns.len());
        for column in &mut self.columns[covered] {
            column.register(&state);
        }

        debug!(
            "Placed item {} in column {} (span {}, flow {})",
            position,
            index,
            span,
            if flow { "down" } else { "up" }
        );
        Some(state)
    }

    /// Choose the column for `position`.
    ///
    /// An existing assignment always wins. Otherwise the lane with the least
    /// content in the fill direction is chosen: smallest bottom when filling
    /// down, smallest top when filling up. Ties go to the lowest index. A
    /// spanning item that would overflow the right edge goes to column 0.
    pub fn column_for<H: ListHost + ?Sized>(
        &self,
        host: &H,
        flow: bool,
        position: Position,
        span: usize,
    ) -> usize {
        if let Some(state) = self.registry.get(position) {
            return state.column_index();
        }

        let mut min_top_column = 0;
        let mut min_bottom_column = 0;
        let mut min_top = i32::MAX;
        let mut min_bottom = i32::MAX;
        for column in &self.columns {
            let top = column.top(host);
            if top < min_top {
                min_top = top;
                min_top_column = column.index();
            }
            let bottom = column.bottom(host);
            if bottom < min_bottom {
                min_bottom = bottom;
                min_bottom_column = column.index();
            }
        }

        let chosen = if flow { min_bottom_column } else { min_top_column };
        if chosen + span > self.columns.len() {
            trace!(
                "Span {} does not fit from column {}, falling back to column 0",
                span,
                chosen
            );
            return 0;
        }
        chosen
    }

    /// Columns an item placed (or about to be placed) at `index` covers.
    fn spanned(&self, index: usize, span: usize) -> &[Column] {
        let start = index.min(self.columns.len());
        let end = (index + span).min(self.columns.len());
        &self.columns[start..end]
    }

    /// Top edge for the item at `position`: the deepest bottom among the
    /// columns it covers.
    pub fn item_top<H: ListHost + ?Sized>(&self, host: &H, position: Position) -> i32 {
        if self.is_header_or_footer(host, position) {
            return host.default_item_top(position);
        }
        let span = self.span_at(host, position);
        let index = self.column_for(host, true, position, span);
        let top = max_bottom(self.spanned(index, span), host);
        trace!("item_top({}) = {} (column {}, span {})", position, top, index, span);
        top
    }

    /// Bottom edge for the item at `position` when filling upward: the
    /// shallowest top among the columns it covers.
    pub fn item_bottom<H: ListHost + ?Sized>(&self, host: &H, position: Position) -> i32 {
        if self.is_header_or_footer(host, position) {
            return host.default_item_bottom(position);
        }
        let span = self.span_at(host, position);
        let index = self.column_for(host, false, position, span);
        let bottom = min_top(self.spanned(index, span), host);
        trace!("item_bottom({}) = {} (column {}, span {})", position, bottom, index, span);
        bottom
    }

    /// Left edge for the item at `position`.
    pub fn item_left<H: ListHost + ?Sized>(&self, host: &H, position: Position) -> i32 {
        if self.is_header_or_footer(host, position) {
            return host.default_item_left(position);
        }
        let span = self.span_at(host, position);
        let index = self.column_for(host, true, position, span);
        if let Some(column) = self.columns.get(index) {
            return column.left();
        }
        self.columns
            .iter()
            .find(|c| c.contains(position))
            .map_or(0, |c| c.left())
    }

    /// Width of the item at `position`: its column's width times its span,
    /// 0 when it has not been placed yet.
    pub fn item_width(&self, position: Position) -> i32 {
        let Some(column) = self.columns.iter().find(|c| c.contains(position)) else {
            return 0;
        };
        match column.get(position, &self.registry) {
            Some(state) => self
                .columns
                .get(state.column_index())
                .map_or(0, |c| {
                    let span = i32::try_from(state.span()).unwrap_or(i32::MAX);
                    c.width().saturating_mul(span)
                }),
            None => 0,
        }
    }

    /// Width the host should measure a child with.
    pub fn child_width(&self, position: Position, is_fixed_child: bool) -> ChildWidth {
        if is_fixed_child {
            ChildWidth::Parent
        } else {
            ChildWidth::Exactly(self.item_width(position))
        }
    }

    /// Top of the scrollable content: smallest top over the regular columns.
    pub fn scroll_child_top<H: ListHost + ?Sized>(&self, host: &H) -> i32 {
        min_top(&self.columns, host)
    }

    /// Bottom of the scrollable content: largest bottom over the regular columns.
    pub fn scroll_child_bottom<H: ListHost + ?Sized>(&self, host: &H) -> i32 {
        max_bottom(&self.columns, host)
    }

    /// Largest top over the regular columns. The host keeps filling upward
    /// while this is below the viewport top.
    pub fn fill_child_top<H: ListHost + ?Sized>(&self, host: &H) -> i32 {
        max_top(&self.columns, host)
    }

    /// Smallest bottom over the regular columns. The host keeps filling
    /// downward while this is above the viewport bottom.
    pub fn fill_child_bottom<H: ListHost + ?Sized>(&self, host: &H) -> i32 {
        min_bottom(&self.columns, host)
    }

    /// Called before the host adjusts its children after a fill.
    ///
    /// When the list is scrolled back to position 0 (filling up), every
    /// column is aligned to the top of column 0 so no stagger remains at
    /// the start of the list.
    pub fn on_adjust_child_views<H: ListHost + ?Sized>(&self, host: &mut H, down: bool) {
        if down || host.child_count() == 0 || host.first_visible_position() != 0 {
            return;
        }
        let first_column_top = self.columns[0].top(host);
        for column in &self.columns {
            let top = column.top(host);
            column.offset_top_and_bottom(host, first_column_top - top);
        }
        debug!("Aligned column tops to {}", first_column_top);
    }

    /// The host starts a sync pass at `sync_position`.
    pub fn on_layout_sync<H: ListHost + ?Sized>(&mut self, host: &H, sync_position: Position) {
        for column in &mut self.columns {
            column.save(host);
        }
        debug!("Layout sync started at position {}", sync_position);
    }

    /// The sync pass at `sync_position` finished.
    pub fn on_layout_sync_finished(&mut self, sync_position: Position) {
        for column in &mut self.columns {
            column.clear();
        }
        debug!("Layout sync finished at position {}", sync_position);
    }

    /// The adapter's data set changed: every assignment is forgotten.
    pub fn on_data_set_changed(&mut self) {
        let forgotten = self.registry.len();
        self.registry.clear();
        for column in &mut self.columns {
            column.forget_items();
            column.clear();
        }
        debug!("Data set changed, dropped {} item assignments", forgotten);
    }

    /// Geometry and extent of every regular column.
    pub fn column_snapshots<H: ListHost + ?Sized>(&self, host: &H) -> Vec<ColumnSnapshot> {
        self.columns
            .iter()
            .map(|c| ColumnSnapshot {
                index: c.index(),
                left: c.left(),
                width: c.width(),
                top: c.top(host),
                bottom: c.bottom(host),
                items: c.item_count(),
            })
            .collect()
    }
}
