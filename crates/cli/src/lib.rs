//! Waterfall simulator
//!
//! A simulated recycling list host that drives the waterfall layout engine,
//! plus its configuration and script replay.

pub mod config;
pub mod engine;
pub mod replay;

use anyhow::{Context, Result};
use waterfall_core_layout::WaterfallLayout;

use config::Config;
use engine::ListEngine;

/// Build an engine from `config` and measure it at the configured viewport.
pub fn engine_from_config(config: &Config) -> Result<ListEngine> {
    let orientation = config.viewport.orientation();
    let layout = WaterfallLayout::from_config(&config.layout.column_counts(), orientation)
        .context("Invalid layout configuration")?;

    let mut engine = ListEngine::new(layout, config.dataset.build(), config.layout.insets());
    engine.measure(config.viewport.width, config.viewport.height);
    Ok(engine)
}
