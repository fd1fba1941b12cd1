//! Reconstruction parameters.

use geobrep_math::{BoundingBox3, Tolerance, DEFAULT_EPSILON_FACTOR};
use serde::{Deserialize, Serialize};

use crate::error::{ReconstructError, Result};

/// Parameters controlling a reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionParams {
    /// Colocation tolerance as a fraction of the smallest bounding-box
    /// diagonal component.
    pub epsilon_factor: f64,
    /// Explicit colocation tolerance, overriding `epsilon_factor`.
    pub epsilon: Option<f64>,
    /// A region's signed volume is degenerate when its magnitude is at most
    /// this ratio times the cube of the region's bounding-box diagonal.
    pub degenerate_volume_ratio: f64,
    /// Promote a corner on border loops that would otherwise have none.
    pub close_cornerless_loops: bool,
}

impl Default for ReconstructionParams {
    fn default() -> Self {
        Self {
            epsilon_factor: DEFAULT_EPSILON_FACTOR,
            epsilon: None,
            degenerate_volume_ratio: 1e-12,
            close_cornerless_loops: true,
        }
    }
}

impl ReconstructionParams {
    /// Set the tolerance factor.
    #[must_use]
    pub fn with_epsilon_factor(mut self, factor: f64) -> Self {
        self.epsilon_factor = factor;
        self
    }

    /// Set an explicit tolerance.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }

    /// Set the degenerate volume ratio.
    #[must_use]
    pub fn with_degenerate_volume_ratio(mut self, ratio: f64) -> Self {
        self.degenerate_volume_ratio = ratio;
        self
    }

    /// Enable or disable corner promotion on cornerless loops.
    #[must_use]
    pub fn with_close_cornerless_loops(mut self, enabled: bool) -> Self {
        self.close_cornerless_loops = enabled;
        self
    }

    /// Validate parameters.
    pub fn validate(&self) -> Result<()> {
        if !self.epsilon_factor.is_finite() || self.epsilon_factor < 0.0 {
            return Err(ReconstructError::InvalidInput(
                "epsilon_factor must be finite and non-negative".into(),
            ));
        }
        if let Some(eps) = self.epsilon {
            if !eps.is_finite() || eps < 0.0 {
                return Err(ReconstructError::InvalidInput(
                    "epsilon must be finite and non-negative".into(),
                ));
            }
        }
        if !self.degenerate_volume_ratio.is_finite() || self.degenerate_volume_ratio < 0.0 {
            return Err(ReconstructError::InvalidInput(
                "degenerate_volume_ratio must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Colocation tolerance for a model spanning `bbox`.
    pub fn tolerance_for(&self, bbox: &BoundingBox3) -> Tolerance {
        match self.epsilon {
            Some(eps) => Tolerance::new(eps),
            None => Tolerance::from_bounding_box(bbox, self.epsilon_factor),
        }
    }
}
