//! Grid build parameters.

use serde::{Deserialize, Serialize};

use crate::{GridError, Result};

/// Which cell backing to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// Dense array of cells, O(1) lookup.
    #[default]
    Dense,
    /// Hash map of touched cells only.
    Hashed,
}

/// Parameters for building a grid from scene geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Total number of cells to aim for. `None` uses one cell per occluder.
    pub target_cell_count: Option<u32>,
    /// Fraction of the scene extent added around the bounding box.
    pub padding_ratio: f64,
    /// Cell storage backing.
    pub storage: StorageKind,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            target_cell_count: None,
            padding_ratio: 0.1,
            storage: StorageKind::Dense,
        }
    }
}

impl GridSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.padding_ratio.is_finite() || self.padding_ratio < 0.0 {
            return Err(GridError::InvalidSettings(format!(
                "padding ratio must be finite and non-negative, got {}",
                self.padding_ratio
            )));
        }
        if self.target_cell_count == Some(0) {
            return Err(GridError::InvalidSettings(
                "target cell count must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Cell count to request for a scene of `occluder_count` polygons.
    pub fn resolve_target_cell_count(&self, occluder_count: usize) -> u32 {
        self.target_cell_count
            .unwrap_or_else(|| u32::try_from(occluder_count).unwrap_or(u32::MAX))
            .max(1)
    }
}
