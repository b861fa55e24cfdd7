//! Editor configuration.
//!
//! Every section and field has a default, so a partial TOML file (or none
//! at all) yields a usable configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    pub canvas: CanvasConfig,
    pub input: InputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of undo entries kept.
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: crate::history::DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub grid_size: f64,
    pub snap_to_grid: bool,
    pub show_grid: bool,
    pub show_rulers: bool,
    pub show_guides: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid_size: 10.0,
            snap_to_grid: false,
            show_grid: false,
            show_rulers: true,
            show_guides: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Minimum spacing between processed pointer-move events.
    pub pointer_throttle_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            pointer_throttle_ms: 16,
        }
    }
}
