//! Conversion between physical space (metres) and render space

use glam::DVec3;
use serde::{Deserialize, Serialize};

use common::constants::RENDER_SCALE;

/// Fixed factor relating physical metres to render units.
///
/// Plain multiplication both ways: no clamping or rounding, so a round trip
/// is exact up to floating-point precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitScale(f64);

impl UnitScale {
    /// 1 render unit = 1,000 km
    pub const DEFAULT: Self = Self(RENDER_SCALE);

    /// `render_units_per_metre` must be finite and non-zero to stay invertible
    pub const fn new(render_units_per_metre: f64) -> Self {
        Self(render_units_per_metre)
    }

    pub fn factor(self) -> f64 {
        self.0
    }

    pub fn to_render(self, physical: DVec3) -> DVec3 {
        physical * self.0
    }

    pub fn to_render_scalar(self, physical: f64) -> f64 {
        physical * self.0
    }

    pub fn to_physical(self, render: DVec3) -> DVec3 {
        render / self.0
    }

    pub fn to_physical_scalar(self, render: f64) -> f64 {
        render / self.0
    }
}

impl Default for UnitScale {
    fn default() -> Self {
        Self::DEFAULT
    }
}
