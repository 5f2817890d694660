//! Editor configuration loaded from `cartograph.toml`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::abstract_editor::DEFAULT_MAX_UNDO;
use crate::commands::MapHistory;
use crate::document::MapDocument;
use crate::map::limits::{MAX_GRID_DIMENSION, MIN_GRID_DIMENSION};
use crate::map::{GridConfig, GridPreset};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration. Every section and field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub grid: GridSettings,
    pub history: HistorySettings,
    pub editor: EditorSettings,
}

/// Grid used for new documents.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub preset: GridPreset,
    pub cols: i32,
    pub rows: i32,
    pub auto_expand: bool,
    pub expansion_threshold: i32,
    pub expansion_factor: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        let grid = GridConfig::default();
        Self {
            preset: grid.preset,
            cols: grid.cols,
            rows: grid.rows,
            auto_expand: grid.auto_expand_grid,
            expansion_threshold: grid.expansion_threshold,
            expansion_factor: grid.expansion_factor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub max_undo: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_undo: DEFAULT_MAX_UNDO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// `env_logger` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            log_filter: "info".into(),
        }
    }
}

impl EditorConfig {
    /// Parses a TOML document. Call [`validate`](Self::validate) before use.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let dimension = MIN_GRID_DIMENSION..=MAX_GRID_DIMENSION;
        if !dimension.contains(&self.grid.cols) || !dimension.contains(&self.grid.rows) {
            return Err(ConfigError::Invalid(format!(
                "grid size {}x{} outside {MIN_GRID_DIMENSION}..={MAX_GRID_DIMENSION}",
                self.grid.cols, self.grid.rows
            )));
        }
        if self.grid.expansion_threshold < 0 {
            return Err(ConfigError::Invalid(
                "expansion_threshold must not be negative".into(),
            ));
        }
        if self.grid.expansion_factor.is_nan() || self.grid.expansion_factor <= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "expansion_factor {} must be greater than 1",
                self.grid.expansion_factor
            )));
        }
        if self.history.max_undo == 0 {
            return Err(ConfigError::Invalid("max_undo must be at least 1".into()));
        }
        Ok(())
    }

    pub fn grid_config(&self) -> GridConfig {
        let mut grid = GridConfig {
            cols: self.grid.cols,
            rows: self.grid.rows,
            auto_expand_grid: self.grid.auto_expand,
            expansion_threshold: self.grid.expansion_threshold,
            expansion_factor: self.grid.expansion_factor,
            ..GridConfig::default()
        };
        grid.apply_preset(self.grid.preset);
        grid
    }

    /// An empty document laid out on the configured grid.
    pub fn new_document(&self) -> MapDocument {
        MapDocument::new(self.grid_config())
    }

    pub fn new_history(&self) -> MapHistory {
        MapHistory::new(self.history.max_undo)
    }
}

/// Loads a config from a TOML file.
pub fn load_config(path: &Path) -> Result<EditorConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_owned(),
        source,
    })?;
    let config = EditorConfig::from_toml(&content).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads a config, falling back to defaults if the file is missing or broken.
pub fn load_or_default(path: &Path) -> EditorConfig {
    match load_config(path) {
        Ok(config) => {
            log::info!(
                "Loaded config {}: grid {}x{}, max_undo {}",
                path.display(),
                config.grid.cols,
                config.grid.rows,
                config.history.max_undo
            );
            config
        }
        Err(e) => {
            log::warn!("No usable config ({e}), using defaults");
            EditorConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = EditorConfig::from_toml("").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.history.max_undo, 100);
        assert_eq!(config.editor.log_filter, "info");
        config.validate().unwrap();
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = EditorConfig::from_toml(
            r#"
            [grid]
            preset = "rectangle"
            cols = 64

            [history]
            max_undo = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.grid.preset, GridPreset::Rectangle);
        assert_eq!(config.grid.cols, 64);
        assert_eq!(config.grid.rows, 256);
        assert_eq!(config.history.max_undo, 20);

        let doc = config.new_document();
        assert_eq!(doc.grid().tile_width, 32);
        assert_eq!(doc.grid().cols, 64);
        assert_eq!(config.new_history().max_undo(), 20);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let config = EditorConfig::from_toml("[grid]\ncols = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = EditorConfig::from_toml("[grid]\nexpansion_factor = 1.0\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = EditorConfig::from_toml("[history]\nmax_undo = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unknown_preset_fails_to_parse() {
        assert!(EditorConfig::from_toml("[grid]\npreset = \"hex\"\n").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = Path::new("definitely/not/here/cartograph.toml");
        assert!(matches!(load_config(path), Err(ConfigError::Io { .. })));
        assert_eq!(load_or_default(path), EditorConfig::default());
    }
}
