//! Gravitational N-body simulation
//!
//! The crate is split the same way a frame flows through it:
//!
//! - **physics**: point masses, pairwise Newtonian gravity and time integration
//! - **units**: conversion between physical metres and render-space units
//! - **render**: the renderable/backend capabilities and a CPU-side draw list
//! - **entity**: the pairing of one physics body with one renderable
//! - **simulation**: the orchestrator that steps, syncs and submits each frame
//! - **scenario**: ready-made body configurations (Sun/Earth/Moon and friends)
//! - **config**: JSON-backed settings for the interactive front-end

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod config;
pub mod entity;
pub mod error;
pub mod physics;
pub mod render;
pub mod scenario;
pub mod simulation;
pub mod units;

pub use entity::SimEntity;
pub use error::SimError;
pub use physics::{Integrator, PhysicsBody, PhysicsWorld};
pub use render::{BodyInstance, DrawList, RenderBackend, Renderable, Sphere};
pub use simulation::{SimulationWorld, WorldState};
pub use units::UnitScale;

/// Stable identity shared by a body, its renderable and its entity.
///
/// Ids are chosen by the caller and never reassigned, so removing one object
/// leaves every other id untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
