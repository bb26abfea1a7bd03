//! In-memory host used by the unit tests.

use std::collections::HashMap;

use crate::{ItemKind, ListHost, Position, Rect};

#[derive(Debug, Clone)]
pub(crate) struct TestChild {
    pub position: Position,
    pub frame: Rect,
    pub fixed: bool,
}

#[derive(Debug, Default)]
pub(crate) struct TestHost {
    pub children: Vec<TestChild>,
    pub kinds: HashMap<Position, ItemKind>,
}

impl TestHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kind(mut self, position: Position, kind: ItemKind) -> Self {
        self.kinds.insert(position, kind);
        self
    }

    /// Realize a child at the end of the child list.
    pub fn push(&mut self, position: Position, frame: Rect) {
        self.children.push(TestChild {
            position,
            frame,
            fixed: false,
        });
    }

    pub fn push_fixed(&mut self, position: Position, frame: Rect) {
        self.children.push(TestChild {
            position,
            frame,
            fixed: true,
        });
    }

    pub fn frame_of(&self, position: Position) -> Option<Rect> {
        self.children
            .iter()
            .find(|c| c.position == position)
            .map(|c| c.frame)
    }
}

impl ListHost for TestHost {
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
        self.kinds
            .get(&position)
            .copied()
            .unwrap_or(ItemKind::Regular)
    }

    fn first_visible_position(&self) -> Position {
        self.children.iter().map(|c| c.position).min().unwrap_or(0)
    }

    fn default_item_top(&self, _position: Position) -> i32 {
        self.children
            .iter()
            .map(|c| c.frame.bottom())
            .max()
            .unwrap_or(0)
    }

    fn default_item_bottom(&self, _position: Position) -> i32 {
        self.children.iter().map(|c| c.frame.y).min().unwrap_or(0)
    }

    fn default_item_left(&self, _position: Position) -> i32 {
        0
    }
}
