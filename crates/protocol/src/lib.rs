//! Waterfall Replay Protocol
//!
//! Line-delimited JSON commands for driving a simulated list host, and the
//! responses it writes back. One JSON object per line in both directions.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use waterfall_core_layout::{ColumnSnapshot, ItemKind, Rect};

/// Longest accepted command line, in bytes.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Errors raised while decoding a command line.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Command line is {0} bytes (max: {1})")]
    LineTooLong(usize, usize),

    #[error("Malformed command: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Commands sent to the simulated list host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostCommand {
    /// Measure the list with a new viewport size and refill it.
    Measure { width: i32, height: i32 },
    /// Scroll the content (positive = towards the end of the list).
    ScrollBy { delta: i32 },
    /// Re-layout starting from `position` (a sync pass).
    JumpTo { position: usize },
    /// The data set changed: drop all children and assignments, refill.
    Reset,
    /// Query the geometry of every column.
    QueryColumns,
    /// Query the frames of every realized child.
    QueryPlacements,
    /// Query a single item.
    QueryItem { position: usize },
}

/// Frame of one realized child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPlacement {
    pub position: usize,
    /// Leftmost column, `None` for headers and footers.
    pub column: Option<usize>,
    pub span: usize,
    pub rect: Rect,
}

/// Responses from the simulated list host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HostResponse {
    /// Command executed successfully.
    Ok,
    /// Command failed.
    Error { message: String },
    /// Column geometry.
    Columns {
        columns: Vec<ColumnSnapshot>,
        scroll_top: i32,
        scroll_bottom: i32,
    },
    /// Realized children in adapter order.
    Placements {
        first_position: usize,
        items: Vec<ItemPlacement>,
    },
    /// A single item.
    Item {
        position: usize,
        kind: ItemKind,
        column: Option<usize>,
        span: usize,
        width: i32,
        /// Frame when the item is currently realized.
        rect: Option<Rect>,
    },
}

impl HostResponse {
    /// Create an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Decode one line of a command script.
///
/// Blank lines and lines starting with `#` yield `Ok(None)`.
pub fn parse_command_line(line: &str) -> Result<Option<HostCommand>, ProtocolError> {
    if line.len() > MAX_LINE_LEN {
        return Err(ProtocolError::LineTooLong(line.len(), MAX_LINE_LEN));
    }
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}

/// Encode a response as a single line (without the trailing newline).
pub fn encode_response(response: &HostResponse) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(response)?)
}
