//! Configuration to acknowledge developer preferences as well as set defaults.
//!
//! We look for a sectree.toml in the working directory and load drag tuning from it. A missing
//! file means defaults; a malformed one is reported in the log and also falls back to defaults.

use crate::drag_session::{DragConfig, DEFAULT_DRAG_THRESHOLD};
use crate::drop_resolver::DropResolver;
use crate::position::{PositionAlgebra, PositionScheme, DEFAULT_NORMALIZATION_GAP};
use facet::Facet;
use std::fs;
use std::path::Path;

/// File name searched for in the working directory.
pub const CONFIG_FILE: &str = "sectree.toml";

/// Drop band size for terminal rows, which are only a few cells tall.
pub const DEFAULT_EDGE_THRESHOLD: f64 = 0.3;
/// Terminal rows per section.
pub const DEFAULT_ROW_HEIGHT: u16 = 3;

#[derive(Facet, Clone, Debug, PartialEq)]
/// User preferences loaded from sectree.toml or falling back to defaults.
pub struct Config {
    #[facet(default = DEFAULT_EDGE_THRESHOLD)]
    /// Height of the insert-above and insert-below bands as a fraction of a row.
    pub edge_threshold: f64,
    #[facet(default = DEFAULT_DRAG_THRESHOLD)]
    /// Cells a pressed handle must travel before the press becomes a drag.
    pub drag_threshold: f64,
    #[facet(default = DEFAULT_ROW_HEIGHT)]
    /// Terminal rows per section in the tree view.
    pub row_height: u16,
    #[facet(default = false)]
    /// Seed empty sibling groups with the provisional `-1` instead of `5`.
    pub provisional_seed: bool,
    #[facet(default = DEFAULT_NORMALIZATION_GAP)]
    /// Neighbour gap at or below which a sibling group is flagged for renumbering.
    pub normalization_gap: i64,
}

impl Default for Config {
    fn default() -> Self {
        facet_toml::from_str::<Self>("").unwrap_or_else(|e| {
            log::error!("empty config did not deserialize: {e:?}");
            Self {
                edge_threshold: DEFAULT_EDGE_THRESHOLD,
                drag_threshold: DEFAULT_DRAG_THRESHOLD,
                row_height: DEFAULT_ROW_HEIGHT,
                provisional_seed: false,
                normalization_gap: DEFAULT_NORMALIZATION_GAP,
            }
        })
    }
}

impl Config {
    #[must_use]
    /// Load configuration from sectree.toml if present.
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    #[must_use]
    /// Load configuration from `path`, using defaults if it is absent or unreadable.
    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = fs::read_to_string(path) else {
            log::debug!("no config at {}, using defaults", path.display());
            return Self::default();
        };
        match facet_toml::from_str::<Self>(&contents) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("ignoring malformed {}: {e:?}", path.display());
                Self::default()
            }
        }
    }

    #[must_use]
    /// Seeding scheme for empty sibling groups.
    pub fn scheme(&self) -> PositionScheme {
        if self.provisional_seed {
            PositionScheme::Provisional
        } else {
            PositionScheme::Standard
        }
    }

    #[must_use]
    /// Drag tuning derived from these preferences.
    pub fn drag_config(&self) -> DragConfig {
        DragConfig {
            resolver: DropResolver::new(
                self.edge_threshold,
                PositionAlgebra::new(self.scheme(), self.normalization_gap),
            ),
            drag_threshold: self.drag_threshold,
        }
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
