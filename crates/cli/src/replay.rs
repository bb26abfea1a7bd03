//! Replay of line-delimited command scripts against a [`ListEngine`].

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::{debug, warn};
use waterfall_protocol::{encode_response, parse_command_line, HostResponse};

use crate::engine::ListEngine;

/// Outcome of a replay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Commands executed (including ones that answered with an error).
    pub commands: usize,
    /// Lines that answered with an error response.
    pub errors: usize,
}

/// Execute every command of `script`, writing one response line per command.
///
/// Malformed lines answer with an error response and do not stop the run.
/// I/O failures do.
pub fn run_script<R: BufRead, W: Write>(
    engine: &mut ListEngine,
    script: R,
    mut out: W,
) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for (index, line) in script.lines().enumerate() {
        let line_number = index + 1;
        let line = line.with_context(|| format!("Failed to read script line {}", line_number))?;

        let response = match parse_command_line(&line) {
            Ok(None) => continue,
            Ok(Some(command)) => {
                debug!("Line {}: {:?}", line_number, command);
                engine.execute(command)
            }
            Err(e) => {
                warn!("Line {}: {}", line_number, e);
                HostResponse::error(format!("line {}: {}", line_number, e))
            }
        };

        summary.commands += 1;
        if matches!(response, HostResponse::Error { .. }) {
            summary.errors += 1;
        }

        let encoded = encode_response(&response)?;
        writeln!(out, "{}", encoded).context("Failed to write response")?;
    }

    out.flush().context("Failed to flush responses")?;
    Ok(summary)
}
