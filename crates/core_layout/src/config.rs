//! Column-count configuration.

use serde::{Deserialize, Serialize};

/// Column count used when no override is configured.
pub const DEFAULT_COLUMN_COUNT: usize = 2;

/// Orientation of the window the list lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Landscape when the frame is strictly wider than it is tall.
    pub fn from_frame(width: i32, height: i32) -> Self {
        if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// Column-count overrides, resolved once when the layout is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnCountConfig {
    /// General override.
    pub column_count: Option<usize>,
    /// Override used only in landscape orientation.
    pub landscape_column_count: Option<usize>,
}

impl ColumnCountConfig {
    /// Resolve the column count: landscape override (in landscape), then the
    /// general override, then [`DEFAULT_COLUMN_COUNT`].
    pub fn resolve(&self, orientation: Orientation) -> usize {
        match (orientation, self.landscape_column_count, self.column_count) {
            (Orientation::Landscape, Some(landscape), _) => landscape,
            (_, _, Some(count)) => count,
            _ => DEFAULT_COLUMN_COUNT,
        }
    }
}
