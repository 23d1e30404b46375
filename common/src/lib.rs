//! Common utilities for the orbital simulation
//!
//! This crate provides the shared graphics setup, the orbital camera and the
//! physical constants used by the simulation core and its front-end.

pub mod graphics;
pub mod camera;

pub use graphics::*;
pub use camera::*;

/// Physical constants used in simulations
pub mod constants {
    /// Newtonian gravitational constant in m³/(kg·s²)
    pub const G: f64 = 6.674_30e-11;

    /// Render units per metre: 1 render unit = 1,000 km
    pub const RENDER_SCALE: f64 = 1e-6;

    /// Astronomical unit in metres
    pub const AU: f64 = 1.496e11;

    /// Seconds per day, for displaying elapsed simulated time
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
}
