//! Pairing of a physics body with the renderable that shows it

use glam::Mat4;

use crate::physics::PhysicsBody;
use crate::render::Renderable;
use crate::{EntityId, UnitScale};

/// One simulated object: a stable id and the renderable drawn for it.
///
/// The body itself lives in the [`PhysicsWorld`](crate::PhysicsWorld) arena
/// under the same id; the pairing never changes after construction.
#[derive(Debug, Clone)]
pub struct SimEntity<R> {
    id: EntityId,
    renderable: R,
}

impl<R: Renderable> SimEntity<R> {
    pub fn new(id: EntityId, renderable: R) -> Self {
        Self { id, renderable }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn renderable(&self) -> &R {
        &self.renderable
    }

    /// Place the renderable at the body's position, converted to render space.
    ///
    /// The transform becomes a pure translation; calling this again without
    /// a physics step in between produces the same transform.
    pub fn sync_physics_to_render(&mut self, body: &PhysicsBody, scale: UnitScale) {
        let translation = scale.to_render(body.position).as_vec3();
        self.renderable.set_transform(Mat4::from_translation(translation));
    }
}
