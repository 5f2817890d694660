//! # Cartograph Core
//!
//! Document model and editing engine for Cartograph, a tile-based map editor.
//!
//! - [`map`]: value types: tiles, edges, rooms, markers, palette, grid
//! - [`document`]: [`MapDocument`](document::MapDocument), room detection and snapshots
//! - [`commands`]: undoable map edits and [`MapHistory`](commands::MapHistory)
//! - [`abstract_editor`]: the generic undo/redo framework behind the history
//! - [`jobs`]: background worker for loading, saving and analysis
//! - [`config`]: TOML editor configuration

pub mod abstract_editor;
pub mod commands;
pub mod config;
pub mod document;
pub mod jobs;
pub mod map;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn init() {
    log::info!("Cartograph Core v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
