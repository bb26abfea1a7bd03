//! Configuration management for the waterfall simulator.
//!
//! Configuration is loaded from TOML files in the following locations (in order):
//! 1. The path given with `--config`
//! 2. The platform config directory (`<config_dir>/waterfall/config.toml`)
//! 3. `~/.config/waterfall/config.toml` (Unix-style)
//! 4. `./waterfall.toml` (current directory, for development)

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use waterfall_core_layout::{
    ColumnCountConfig, Insets, Orientation, VIEW_TYPE_COLUMN_SPAN_ALL, VIEW_TYPE_HEADER_OR_FOOTER,
};

use crate::engine::ItemSpec;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Layout configuration.
    pub layout: LayoutConfig,
    /// Simulated viewport.
    pub viewport: ViewportConfig,
    /// Items fed to the simulated list.
    pub dataset: DatasetConfig,
    /// Behavior configuration.
    pub behavior: BehaviorConfig,
}

/// Layout-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Number of columns. Defaults to 2 when unset.
    pub column_count: Option<usize>,

    /// Number of columns when the viewport is wider than tall.
    pub landscape_column_count: Option<usize>,

    /// Horizontal padding on each side of the list, in pixels.
    pub padding: i32,
}

impl LayoutConfig {
    /// Column-count overrides for the layout engine.
    pub fn column_counts(&self) -> ColumnCountConfig {
        ColumnCountConfig {
            column_count: self.column_count,
            landscape_column_count: self.landscape_column_count,
        }
    }

    /// List padding. Only the horizontal edges are padded.
    pub fn insets(&self) -> Insets {
        Insets {
            left: self.padding,
            top: 0,
            right: self.padding,
            bottom: 0,
        }
    }
}

/// Size of the simulated list viewport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_width")]
    pub width: i32,

    #[serde(default = "default_viewport_height")]
    pub height: i32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

impl ViewportConfig {
    pub fn orientation(&self) -> Orientation {
        Orientation::from_frame(self.width, self.height)
    }
}

/// Items of the simulated adapter.
///
/// When `items` is empty, a dataset is generated from the remaining fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Number of regular items to generate.
    #[serde(default = "default_item_count")]
    pub item_count: usize,

    /// Number of headers generated before the items.
    #[serde(default = "default_header_count")]
    pub header_count: usize,

    /// Number of footers generated after the items.
    pub footer_count: usize,

    /// Height of generated headers and footers.
    #[serde(default = "default_header_height")]
    pub header_height: i32,

    /// Smallest generated item height.
    #[serde(default = "default_min_item_height")]
    pub min_item_height: i32,

    /// Largest generated item height.
    #[serde(default = "default_max_item_height")]
    pub max_item_height: i32,

    /// Every n-th generated item spans all columns (0 = never).
    pub span_all_every: usize,

    /// Explicit items, overriding generation.
    pub items: Vec<ItemConfig>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            item_count: default_item_count(),
            header_count: default_header_count(),
            footer_count: 0,
            header_height: default_header_height(),
            min_item_height: default_min_item_height(),
            max_item_height: default_max_item_height(),
            span_all_every: 0,
            items: Vec::new(),
        }
    }
}

/// A single explicit item.
///
/// # Example Config
///
/// ```toml
/// [[dataset.items]]
/// height = 160
/// view_type = -2   # header
///
/// [[dataset.items]]
/// height = 240
///
/// [[dataset.items]]
/// height = 120
/// view_type = -200 # spans two columns
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemConfig {
    /// Item height in pixels.
    pub height: i32,

    /// Raw adapter view type. See the `VIEW_TYPE_*` constants of the core crate.
    #[serde(default)]
    pub view_type: i32,
}

impl DatasetConfig {
    /// Build the adapter items.
    ///
    /// Generated heights are deterministic, so repeated runs place items
    /// identically.
    pub fn build(&self) -> Vec<ItemSpec> {
        if !self.items.is_empty() {
            return self
                .items
                .iter()
                .map(|item| ItemSpec::new(item.height, item.view_type))
                .collect();
        }

        let header = ItemSpec::new(self.header_height, VIEW_TYPE_HEADER_OR_FOOTER);
        let range = (self.max_item_height - self.min_item_height).max(0) as usize + 1;

        let mut specs = Vec::with_capacity(self.header_count + self.item_count + self.footer_count);
        specs.extend(std::iter::repeat(header).take(self.header_count));
        for i in 0..self.item_count {
            let height = self.min_item_height + ((i * 7919 + 13) % range) as i32;
            let view_type = if self.span_all_every > 0 && (i + 1) % self.span_all_every == 0 {
                VIEW_TYPE_COLUMN_SPAN_ALL
            } else {
                0
            };
            specs.push(ItemSpec::new(height, view_type));
        }
        specs.extend(std::iter::repeat(header).take(self.footer_count));
        specs
    }
}

/// Behavior-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

// Default value functions for serde
fn default_viewport_width() -> i32 {
    1080
}

fn default_viewport_height() -> i32 {
    1920
}

fn default_item_count() -> usize {
    100
}

fn default_header_count() -> usize {
    1
}

fn default_header_height() -> i32 {
    160
}

fn default_min_item_height() -> i32 {
    120
}

fn default_max_item_height() -> i32 {
    360
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A value that was corrected during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub field: &'static str,
    pub message: String,
}

impl ConfigWarning {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Config {
    /// Load configuration from `explicit` or the standard locations.
    ///
    /// An explicit path must exist. Without one, the first existing file of
    /// [`config_paths`] is used, or the defaults when there is none.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            return Self::load_from_path(path);
        }

        for path in config_paths() {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::load_from_path(&path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Correct values the engine cannot work with.
    ///
    /// Returns one warning per corrected field.
    pub fn validate(&mut self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.layout.column_count == Some(0) {
            self.layout.column_count = None;
            warnings.push(ConfigWarning::new(
                "layout.column_count",
                "must be at least 1, using the default",
            ));
        }
        if self.layout.landscape_column_count == Some(0) {
            self.layout.landscape_column_count = None;
            warnings.push(ConfigWarning::new(
                "layout.landscape_column_count",
                "must be at least 1, ignoring",
            ));
        }
        if self.layout.padding < 0 {
            self.layout.padding = 0;
            warnings.push(ConfigWarning::new("layout.padding", "negative, clamped to 0"));
        }

        if self.viewport.width < 1 {
            self.viewport.width = default_viewport_width();
            warnings.push(ConfigWarning::new(
                "viewport.width",
                format!("must be positive, using {}", self.viewport.width),
            ));
        }
        if self.viewport.height < 1 {
            self.viewport.height = default_viewport_height();
            warnings.push(ConfigWarning::new(
                "viewport.height",
                format!("must be positive, using {}", self.viewport.height),
            ));
        }
        if self.layout.padding.saturating_mul(2) >= self.viewport.width {
            self.layout.padding = 0;
            warnings.push(ConfigWarning::new(
                "layout.padding",
                "leaves no content width, clamped to 0",
            ));
        }

        // Every column needs at least one pixel.
        let columns = self
            .layout
            .column_counts()
            .resolve(self.viewport.orientation());
        let columns = i32::try_from(columns).unwrap_or(i32::MAX);
        let content_width = self.viewport.width - self.layout.padding * 2;
        if content_width < columns {
            self.layout.padding = 0;
            if self.viewport.width < columns {
                self.viewport.width = columns;
            }
            warnings.push(ConfigWarning::new(
                "viewport.width",
                format!(
                    "too narrow for {} columns, using width {} and padding {}",
                    columns, self.viewport.width, self.layout.padding
                ),
            ));
        }

        let dataset = &mut self.dataset;
        if dataset.min_item_height < 1 {
            dataset.min_item_height = 1;
            warnings.push(ConfigWarning::new(
                "dataset.min_item_height",
                "must be positive, clamped to 1",
            ));
        }
        if dataset.max_item_height < dataset.min_item_height {
            dataset.max_item_height = dataset.min_item_height;
            warnings.push(ConfigWarning::new(
                "dataset.max_item_height",
                "below min_item_height, raised to match",
            ));
        }
        if dataset.header_height < 1 {
            dataset.header_height = default_header_height();
            warnings.push(ConfigWarning::new(
                "dataset.header_height",
                format!("must be positive, using {}", dataset.header_height),
            ));
        }
        for item in &mut dataset.items {
            if item.height < 1 {
                item.height = 1;
                warnings.push(ConfigWarning::new(
                    "dataset.items.height",
                    "must be positive, clamped to 1",
                ));
            }
        }

        let level = self.behavior.log_level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            warnings.push(ConfigWarning::new(
                "behavior.log_level",
                format!("unknown level '{}', using info", self.behavior.log_level),
            ));
            self.behavior.log_level = default_log_level();
        }

        warnings
    }
}

/// Get all possible config file paths in priority order.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(proj_dirs) = ProjectDirs::from("", "", "waterfall") {
        paths.push(proj_dirs.config_dir().join("config.toml"));
    }

    if let Some(home) = dirs_home() {
        let unix_style = home.join(".config").join("waterfall").join("config.toml");
        if !paths.contains(&unix_style) {
            paths.push(unix_style);
        }
    }

    paths.push(PathBuf::from("waterfall.toml"));

    paths
}

/// Get the user's home directory.
fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use waterfall_core_layout::{ItemKind, VIEW_TYPE_COLUMN_SPAN_ONE};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.layout.column_count, None);
        assert_eq!(config.layout.padding, 0);
        assert_eq!(config.viewport.width, 1080);
        assert_eq!(config.viewport.height, 1920);
        assert_eq!(config.dataset.item_count, 100);
        assert_eq!(config.behavior.log_level, "info");
        assert_eq!(
            config.layout.column_counts().resolve(config.viewport.orientation()),
            2
        );
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = Config::default();
        config.layout.column_count = Some(3);
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.layout.column_count, Some(3));
        assert_eq!(parsed.viewport.height, config.viewport.height);
    }

    #[test]
    fn test_config_partial_parse() {
        let toml_str = r#"
            [layout]
            column_count = 3
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.layout.column_count, Some(3));
        assert_eq!(config.layout.landscape_column_count, None);
        assert_eq!(config.viewport.width, 1080); // default
        assert_eq!(config.dataset.min_item_height, 120); // default
    }

    #[test]
    fn test_landscape_override() {
        let toml_str = r#"
            [layout]
            column_count = 2
            landscape_column_count = 4

            [viewport]
            width = 1920
            height = 1080
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.viewport.orientation(), Orientation::Landscape);
        assert_eq!(
            config.layout.column_counts().resolve(config.viewport.orientation()),
            4
        );
    }

    #[test]
    fn test_explicit_items_parse() {
        let toml_str = r#"
            [[dataset.items]]
            height = 160
            view_type = -2

            [[dataset.items]]
            height = 240

            [[dataset.items]]
            height = 120
            view_type = -200
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        let items = config.dataset.build();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].kind(), ItemKind::HeaderFooter);
        assert_eq!(items[1].kind(), ItemKind::Regular);
        assert_eq!(items[2].kind(), ItemKind::SpanN(2));
        assert_eq!(items[2].height, 120);
    }

    #[test]
    fn test_generated_dataset() {
        let dataset = DatasetConfig {
            item_count: 10,
            header_count: 1,
            footer_count: 2,
            span_all_every: 4,
            ..Default::default()
        };
        let items = dataset.build();
        assert_eq!(items.len(), 13);
        assert_eq!(items[0].kind(), ItemKind::HeaderFooter);
        assert_eq!(items[12].kind(), ItemKind::HeaderFooter);
        // Items 4 and 8 of the generated run (1-based) span every column.
        assert_eq!(items[4].kind(), ItemKind::SpanAll);
        assert_eq!(items[8].kind(), ItemKind::SpanAll);
        assert_eq!(items[1].kind(), ItemKind::Regular);
        for item in &items[1..11] {
            assert!(item.height >= 120 && item.height <= 360);
        }
        // Deterministic.
        assert_eq!(dataset.build(), items);
    }

    #[test]
    fn test_validate_clamps_bad_values() {
        let mut config = Config::default();
        config.layout.column_count = Some(0);
        config.viewport.width = 0;
        config.dataset.min_item_height = 200;
        config.dataset.max_item_height = 100;
        config.dataset.items.push(ItemConfig {
            height: -5,
            view_type: VIEW_TYPE_COLUMN_SPAN_ONE,
        });
        config.behavior.log_level = "loud".to_string();

        let warnings = config.validate();
        let fields: Vec<&str> = warnings.iter().map(|w| w.field).collect();
        assert!(fields.contains(&"layout.column_count"));
        assert!(fields.contains(&"viewport.width"));
        assert!(fields.contains(&"dataset.max_item_height"));
        assert!(fields.contains(&"dataset.items.height"));
        assert!(fields.contains(&"behavior.log_level"));

        assert_eq!(config.layout.column_count, None);
        assert_eq!(config.viewport.width, 1080);
        assert_eq!(config.dataset.max_item_height, 200);
        assert_eq!(config.dataset.items[0].height, 1);
        assert_eq!(config.behavior.log_level, "info");
    }

    #[test]
    fn test_validate_huge_padding() {
        let mut config: Config = toml::from_str("[layout]\npadding = 2000000000\n").unwrap();
        let warnings = config.validate();
        assert!(warnings.iter().any(|w| w.field == "layout.padding"));
        assert_eq!(config.layout.padding, 0);
    }

    #[test]
    fn test_validate_width_below_column_count() {
        let toml_str = r#"
[layout]
column_count = 4
padding = 1

[viewport]
width = 5
height = 300
"#;
        let mut config: Config = toml::from_str(toml_str).unwrap();
        let warnings = config.validate();
        assert!(warnings.iter().any(|w| w.field == "viewport.width"));
        assert_eq!(config.layout.padding, 0);
        assert_eq!(config.viewport.width, 5);

        config.viewport.width = 2;
        config.validate();
        assert_eq!(config.viewport.width, 4);
    }

    #[test]
    fn test_validate_accepts_defaults() {
        let mut config = Config::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_padding_insets() {
        let toml_str = r#"
            [layout]
            padding = 16
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        let insets = config.layout.insets();
        assert_eq!(insets.left, 16);
        assert_eq!(insets.right, 16);
        assert_eq!(insets.top, 0);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let missing = Path::new("/nonexistent/waterfall/config.toml");
        assert!(Config::load(Some(missing)).is_err());
    }

    #[test]
    fn test_config_paths_not_empty() {
        let paths = config_paths();
        assert!(!paths.is_empty());
        assert_eq!(paths.last(), Some(&PathBuf::from("waterfall.toml")));
    }
}
