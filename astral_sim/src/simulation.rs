//! Per-frame orchestration: integrate, sync transforms, submit to the renderer
//!
//! [`SimulationWorld`] keeps three id-keyed collections in lockstep: the
//! physics bodies, the render backend's draw set and its own entities.

use glam::{DVec3, Vec3};
use std::collections::BTreeMap;

use crate::entity::SimEntity;
use crate::physics::{PhysicsBody, PhysicsWorld};
use crate::render::{RenderBackend, Renderable};
use crate::{EntityId, SimError, UnitScale};
use common::CameraView;

/// Coarse lifecycle state of a world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldState {
    Empty,
    Populated,
}

pub struct SimulationWorld<B: RenderBackend> {
    physics: PhysicsWorld,
    backend: B,
    entities: BTreeMap<EntityId, SimEntity<B::Renderable>>,
    scale: UnitScale,
    substeps: u32,
}

impl<B: RenderBackend> SimulationWorld<B> {
    /// Wrap `physics` and `backend` in an empty world.
    ///
    /// Bodies already in `physics` have no entity or drawable, so they are
    /// dropped; only the world's settings (G, integrator, separation) carry over.
    pub fn new(mut physics: PhysicsWorld, backend: B) -> Self {
        if !physics.is_empty() {
            log::warn!(
                "discarding {} physics bodies that have no entity",
                physics.len()
            );
            physics.clear();
        }
        Self {
            physics,
            backend,
            entities: BTreeMap::new(),
            scale: UnitScale::DEFAULT,
            substeps: 1,
        }
    }

    pub fn with_unit_scale(mut self, scale: UnitScale) -> Self {
        self.scale = scale;
        self
    }

    /// Split every frame's `dt` into `substeps` equal physics steps
    pub fn with_substeps(mut self, substeps: u32) -> Self {
        self.substeps = substeps.max(1);
        self
    }

    /// Register a new entity with physics, the renderer and the entity map.
    ///
    /// All or nothing: if `id` is known to any of the three, nothing changes.
    pub fn add_entity(
        &mut self,
        id: EntityId,
        renderable: B::Renderable,
        body: PhysicsBody,
    ) -> Result<(), SimError> {
        if self.entities.contains_key(&id)
            || self.physics.contains(id)
            || self.backend.has_drawable(id)
        {
            log::warn!("refusing to add entity {id}: id already in use");
            return Err(SimError::DuplicateEntity(id));
        }

        let entity = SimEntity::new(id, renderable);
        self.physics.add(id, body)?;
        self.backend.register_drawable(id, entity.renderable());
        self.entities.insert(id, entity);

        log::debug!("added entity {id} ({} total)", self.entities.len());
        Ok(())
    }

    /// Unregister from the renderer, then physics, then drop the entity.
    /// Returns `false` if there was nothing to remove.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        if !self.entities.contains_key(&id) {
            return false;
        }

        self.backend.unregister_drawable(id);
        self.physics.remove(id);
        self.entities.remove(&id);

        log::debug!("removed entity {id} ({} left)", self.entities.len());
        true
    }

    /// Remove every entity, unregistering only the drawables this world
    /// registered. Other drawables on a lent backend stay put.
    pub fn clear(&mut self) {
        for id in self.entities.keys() {
            self.backend.unregister_drawable(*id);
        }
        self.physics.clear();
        self.entities.clear();
        log::debug!("cleared simulation world");
    }

    /// Run one frame: advance by `dt` seconds, then draw through `camera`.
    ///
    /// `dt == 0` is a valid paused frame.
    pub fn update(&mut self, dt: f64, camera: &impl CameraView) {
        self.advance(dt);
        self.submit_frame(camera);
    }

    /// Step physics and bring every renderable up to date with its body
    pub fn advance(&mut self, dt: f64) {
        let sub_dt = dt / f64::from(self.substeps);
        for _ in 0..self.substeps {
            self.physics.step(sub_dt);
        }

        for (id, entity) in self.entities.iter_mut() {
            if let Some(body) = self.physics.get(*id) {
                entity.sync_physics_to_render(body, self.scale);
            }
        }
    }

    /// Hand the current transforms to the render backend
    pub fn submit_frame(&mut self, camera: &impl CameraView) {
        let drawables: Vec<(EntityId, &B::Renderable)> = self
            .entities
            .iter()
            .map(|(id, entity)| (*id, entity.renderable()))
            .collect();
        self.backend.submit_frame(&camera.view_projection(), &drawables);
    }

    pub fn entity(&self, id: EntityId) -> Option<&SimEntity<B::Renderable>> {
        self.entities.get(&id)
    }

    pub fn body(&self, id: EntityId) -> Option<&PhysicsBody> {
        self.physics.get(id)
    }

    /// Where the body is, in metres. Lets a camera track an entity.
    pub fn physical_position(&self, id: EntityId) -> Option<DVec3> {
        self.body(id).map(|body| body.position)
    }

    /// Where the body is drawn, as of the last sync
    pub fn render_position(&self, id: EntityId) -> Option<Vec3> {
        self.entity(id).map(|entity| entity.renderable().translation())
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn state(&self) -> WorldState {
        if self.entities.is_empty() {
            WorldState::Empty
        } else {
            WorldState::Populated
        }
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn unit_scale(&self) -> UnitScale {
        self.scale
    }

    pub fn substeps(&self) -> u32 {
        self.substeps
    }
}

impl<B: RenderBackend> Drop for SimulationWorld<B> {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawList, Sphere};
    use common::ViewProjection;
    use glam::Mat4;

    fn world() -> SimulationWorld<DrawList> {
        SimulationWorld::new(PhysicsWorld::new(1.0), DrawList::new())
    }

    fn ball() -> Sphere {
        Sphere::new(1.0, [1.0; 4])
    }

    #[test]
    fn add_registers_everywhere() {
        let mut sim = world();
        assert_eq!(sim.state(), WorldState::Empty);

        sim.add_entity(EntityId(5), ball(), PhysicsBody::at_rest(DVec3::ZERO, 1.0)).unwrap();

        assert!(sim.contains(EntityId(5)));
        assert!(sim.physics().contains(EntityId(5)));
        assert!(sim.backend().has_drawable(EntityId(5)));
        assert_eq!(sim.state(), WorldState::Populated);
    }

    #[test]
    fn duplicate_add_changes_nothing() {
        let mut sim = world();
        sim.add_entity(EntityId(1), ball(), PhysicsBody::at_rest(DVec3::ZERO, 1.0)).unwrap();

        let err = sim
            .add_entity(EntityId(1), Sphere::new(9.0, [0.0; 4]), PhysicsBody::at_rest(DVec3::X, 42.0))
            .unwrap_err();

        assert_eq!(err, SimError::DuplicateEntity(EntityId(1)));
        assert_eq!(sim.len(), 1);
        assert_eq!(sim.body(EntityId(1)).unwrap().mass, 1.0);
        assert_eq!(sim.entity(EntityId(1)).unwrap().renderable().radius(), 1.0);
    }

    #[test]
    fn id_taken_by_backend_alone_is_a_conflict() {
        let mut sim = world();
        sim.backend_mut().register_drawable(EntityId(3), &ball());

        assert!(sim.add_entity(EntityId(3), ball(), PhysicsBody::at_rest(DVec3::ZERO, 1.0)).is_err());
        assert!(!sim.physics().contains(EntityId(3)));
        assert!(!sim.contains(EntityId(3)));
    }

    #[test]
    fn update_syncs_before_submitting() {
        let mut sim = world().with_unit_scale(UnitScale::new(0.5));
        sim.add_entity(EntityId(0), ball(), PhysicsBody::new(DVec3::ZERO, DVec3::X * 2.0, 0.0))
            .unwrap();

        let camera = ViewProjection::new(Mat4::from_translation(Vec3::Z), Mat4::IDENTITY);
        sim.update(1.0, &camera);

        assert_eq!(sim.physical_position(EntityId(0)), Some(DVec3::X * 2.0));
        assert_eq!(sim.render_position(EntityId(0)), Some(Vec3::X));
        assert_eq!(sim.backend().staged()[0].1.position, [1.0, 0.0, 0.0]);
        assert_eq!(sim.backend().camera(), Some(&camera));
    }

    #[test]
    fn substeps_split_dt() {
        let mut sim = world().with_substeps(4);
        sim.add_entity(EntityId(0), ball(), PhysicsBody::new(DVec3::ZERO, DVec3::Y, 1.0)).unwrap();
        sim.advance(2.0);
        assert_eq!(sim.physics().elapsed(), 2.0);
        assert_eq!(sim.physical_position(EntityId(0)), Some(DVec3::Y * 2.0));
        assert_eq!(sim.substeps(), 4);
    }

    #[test]
    fn paused_update_keeps_positions() {
        let mut sim = world();
        sim.add_entity(EntityId(0), ball(), PhysicsBody::new(DVec3::X, DVec3::Y, 1.0)).unwrap();
        sim.add_entity(EntityId(1), ball(), PhysicsBody::new(-DVec3::X, -DVec3::Y, 1.0)).unwrap();

        sim.update(0.0, &ViewProjection::default());
        sim.update(0.0, &ViewProjection::default());

        assert_eq!(sim.physical_position(EntityId(0)), Some(DVec3::X));
        assert_eq!(sim.physical_position(EntityId(1)), Some(-DVec3::X));
        assert_eq!(sim.backend().frames_submitted(), 2);
    }

    #[test]
    fn bodies_without_entities_are_not_adopted() {
        let mut physics = PhysicsWorld::new(1.0);
        physics.add(EntityId(9), PhysicsBody::at_rest(DVec3::ZERO, 1.0e6)).unwrap();

        let mut sim = SimulationWorld::new(physics, DrawList::new());
        assert!(sim.physics().is_empty());
        assert_eq!(sim.state(), WorldState::Empty);

        sim.add_entity(EntityId(1), ball(), PhysicsBody::at_rest(DVec3::X * 10.0, 1.0)).unwrap();
        sim.advance(1.0);

        // nothing unseen pulls on the entity
        assert_eq!(sim.physical_position(EntityId(1)), Some(DVec3::X * 10.0));
        assert_eq!(sim.physics().len(), 1);
        assert_eq!(sim.physics().gravitational_constant(), 1.0);
    }

    #[test]
    fn teardown_leaves_foreign_drawables_alone() {
        let mut list = DrawList::new();
        list.register_drawable(EntityId(42), &ball());
        {
            let mut sim = SimulationWorld::new(PhysicsWorld::new(1.0), &mut list);
            sim.add_entity(EntityId(1), ball(), PhysicsBody::at_rest(DVec3::ZERO, 1.0)).unwrap();
            sim.clear();
            assert!(sim.backend().has_drawable(EntityId(42)));

            sim.add_entity(EntityId(1), ball(), PhysicsBody::at_rest(DVec3::ZERO, 1.0)).unwrap();
        }

        assert!(list.has_drawable(EntityId(42)));
        assert!(!list.has_drawable(EntityId(1)));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn clear_returns_to_empty() {
        let mut sim = world();
        sim.clear();
        for n in 0..3 {
            sim.add_entity(EntityId(n), ball(), PhysicsBody::at_rest(DVec3::X * n as f64, 1.0)).unwrap();
        }
        sim.clear();
        assert_eq!(sim.state(), WorldState::Empty);
        assert!(sim.physics().is_empty());
        assert!(sim.backend().is_empty());
    }
}
