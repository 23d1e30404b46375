//! Render-side capabilities consumed by the simulation core
//!
//! The core only needs two things from graphics: something that holds a
//! transform ([`Renderable`]) and a draw set it can register drawables with
//! and hand a frame to ([`RenderBackend`]). [`DrawList`] is the CPU-side
//! backend the front-end uploads to the GPU from.

use glam::{Mat4, Vec3};
use std::collections::BTreeMap;

use crate::{EntityId, UnitScale};
use common::ViewProjection;

/// Something that accepts a model transform
pub trait Renderable {
    fn set_transform(&mut self, transform: Mat4);
    fn transform(&self) -> Mat4;

    /// Translation part of the current transform
    fn translation(&self) -> Vec3 {
        self.transform().w_axis.truncate()
    }
}

/// The draw set the simulation registers its renderables with
pub trait RenderBackend {
    type Renderable: Renderable;

    fn register_drawable(&mut self, id: EntityId, renderable: &Self::Renderable);
    fn unregister_drawable(&mut self, id: EntityId);
    fn clear_drawables(&mut self);
    fn has_drawable(&self, id: EntityId) -> bool;

    /// Draw one frame of the given renderables from the camera's point of view
    fn submit_frame(&mut self, camera: &ViewProjection, drawables: &[(EntityId, &Self::Renderable)]);
}

impl<B: RenderBackend + ?Sized> RenderBackend for &mut B {
    type Renderable = B::Renderable;

    fn register_drawable(&mut self, id: EntityId, renderable: &Self::Renderable) {
        (**self).register_drawable(id, renderable)
    }

    fn unregister_drawable(&mut self, id: EntityId) {
        (**self).unregister_drawable(id)
    }

    fn clear_drawables(&mut self) {
        (**self).clear_drawables()
    }

    fn has_drawable(&self, id: EntityId) -> bool {
        (**self).has_drawable(id)
    }

    fn submit_frame(&mut self, camera: &ViewProjection, drawables: &[(EntityId, &Self::Renderable)]) {
        (**self).submit_frame(camera, drawables)
    }
}

/// A coloured sphere sized in render units
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    radius: f32,
    color: [f32; 4],
    transform: Mat4,
}

impl Sphere {
    pub fn new(radius: f32, color: [f32; 4]) -> Self {
        Self {
            radius,
            color,
            transform: Mat4::IDENTITY,
        }
    }

    /// Size the sphere from a physical radius in metres
    pub fn from_physical_radius(radius: f64, color: [f32; 4], scale: UnitScale) -> Self {
        Self::new(scale.to_render_scalar(radius) as f32, color)
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }
}

impl Renderable for Sphere {
    fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    fn transform(&self) -> Mat4 {
        self.transform
    }
}

/// Per-body instance data, laid out for a GPU vertex buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BodyInstance {
    pub position: [f32; 3],
    pub radius: f32,
    pub color: [f32; 4],
}

/// Appearance captured when a sphere is registered
#[derive(Debug, Clone, Copy)]
struct Slot {
    radius: f32,
    color: [f32; 4],
}

/// CPU-side draw set for [`Sphere`]s.
///
/// Every submitted frame is staged as one [`BodyInstance`] per registered
/// drawable, together with the camera it should be seen through.
#[derive(Debug, Default)]
pub struct DrawList {
    slots: BTreeMap<EntityId, Slot>,
    staged: Vec<(EntityId, BodyInstance)>,
    camera: Option<ViewProjection>,
    frames_submitted: u64,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Instances of the last submitted frame, in id order
    pub fn staged(&self) -> &[(EntityId, BodyInstance)] {
        &self.staged
    }

    pub fn instances(&self) -> impl Iterator<Item = BodyInstance> + '_ {
        self.staged.iter().map(|(_, instance)| *instance)
    }

    /// Camera of the last submitted frame
    pub fn camera(&self) -> Option<&ViewProjection> {
        self.camera.as_ref()
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }
}

impl RenderBackend for DrawList {
    type Renderable = Sphere;

    fn register_drawable(&mut self, id: EntityId, sphere: &Sphere) {
        self.slots.insert(
            id,
            Slot {
                radius: sphere.radius(),
                color: sphere.color(),
            },
        );
    }

    fn unregister_drawable(&mut self, id: EntityId) {
        self.slots.remove(&id);
        self.staged.retain(|(staged_id, _)| *staged_id != id);
    }

    fn clear_drawables(&mut self) {
        self.slots.clear();
        self.staged.clear();
    }

    fn has_drawable(&self, id: EntityId) -> bool {
        self.slots.contains_key(&id)
    }

    fn submit_frame(&mut self, camera: &ViewProjection, drawables: &[(EntityId, &Sphere)]) {
        self.staged.clear();
        for (id, sphere) in drawables {
            let Some(slot) = self.slots.get(id) else {
                log::warn!("drawable {id} submitted without being registered");
                continue;
            };
            self.staged.push((
                *id,
                BodyInstance {
                    position: sphere.translation().to_array(),
                    radius: slot.radius,
                    color: slot.color,
                },
            ));
        }
        self.camera = Some(*camera);
        self.frames_submitted += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere_at(x: f32) -> Sphere {
        let mut sphere = Sphere::new(1.5, [1.0, 0.5, 0.0, 1.0]);
        sphere.set_transform(Mat4::from_translation(Vec3::new(x, 0.0, 0.0)));
        sphere
    }

    #[test]
    fn sphere_sized_from_physical_radius() {
        let sun = Sphere::from_physical_radius(6.957e8, [1.0; 4], UnitScale::DEFAULT);
        assert!((sun.radius() - 695.7).abs() < 1e-3);
        assert_eq!(sun.transform(), Mat4::IDENTITY);
    }

    #[test]
    fn submit_stages_registered_drawables() {
        let mut list = DrawList::new();
        let a = sphere_at(1.0);
        let b = sphere_at(2.0);
        list.register_drawable(EntityId(1), &a);
        list.register_drawable(EntityId(2), &b);

        list.submit_frame(&ViewProjection::default(), &[(EntityId(1), &a), (EntityId(2), &b)]);

        let positions: Vec<[f32; 3]> = list.instances().map(|i| i.position).collect();
        assert_eq!(positions, vec![[1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        assert_eq!(list.frames_submitted(), 1);
        assert!(list.camera().is_some());
    }

    #[test]
    fn unregistered_drawables_are_not_drawn() {
        let mut list = DrawList::new();
        let a = sphere_at(1.0);
        list.submit_frame(&ViewProjection::default(), &[(EntityId(9), &a)]);
        assert!(list.staged().is_empty());

        list.register_drawable(EntityId(9), &a);
        list.submit_frame(&ViewProjection::default(), &[(EntityId(9), &a)]);
        assert_eq!(list.staged().len(), 1);

        list.unregister_drawable(EntityId(9));
        assert!(list.staged().is_empty());
        assert!(!list.has_drawable(EntityId(9)));
    }

    fn register_through<B: RenderBackend<Renderable = Sphere>>(mut backend: B, id: EntityId) -> bool {
        backend.register_drawable(id, &sphere_at(0.0));
        backend.has_drawable(id)
    }

    #[test]
    fn borrowed_backend_forwards_calls() {
        let mut list = DrawList::new();
        assert!(register_through(&mut list, EntityId(3)));
        assert_eq!(list.len(), 1);
        list.clear_drawables();
        assert!(list.is_empty());
    }
}
