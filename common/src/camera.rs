//! Camera capability and the orbital camera used by the front-end

use glam::{Mat4, Vec3};
use std::f32::consts::{FRAC_PI_2, TAU};

/// Elevation stays this far away from the poles so `look_at` never degenerates
const POLE_MARGIN: f32 = 0.01;

/// View and projection matrices for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewProjection {
    pub view: Mat4,
    pub projection: Mat4,
}

impl ViewProjection {
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self { view, projection }
    }

    /// Get the combined view-projection matrix
    pub fn combined(&self) -> Mat4 {
        self.projection * self.view
    }
}

impl Default for ViewProjection {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

/// Anything that can produce a view/projection pair for the current frame.
pub trait CameraView {
    fn view_projection(&self) -> ViewProjection;
}

impl CameraView for ViewProjection {
    fn view_projection(&self) -> ViewProjection {
        *self
    }
}

/// Z-up perspective camera orbiting a target point in render space
#[derive(Debug, Clone)]
pub struct OrbitalCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    // Orbital parameters
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub azimuth: f32,
    pub elevation: f32,
}

impl OrbitalCamera {
    pub fn new(aspect_ratio: f32, distance: f32, min_distance: f32, max_distance: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::Z,
            fov: 60.0f32.to_radians(),
            aspect_ratio,
            near: 0.1,
            distance: distance.clamp(min_distance, max_distance),
            min_distance,
            max_distance,
            azimuth: 0.0,
            elevation: 0.0,
        };
        camera.update_orbital();
        camera
    }

    /// Recompute the eye position from the orbital parameters
    pub fn update_orbital(&mut self) {
        let (sin_el, cos_el) = self.elevation.sin_cos();
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        self.position = self.target
            + Vec3::new(
                self.distance * cos_el * cos_az,
                self.distance * cos_el * sin_az,
                self.distance * sin_el,
            );
    }

    /// Orbit the camera around the target
    pub fn orbit(&mut self, delta_azimuth: f32, delta_elevation: f32) {
        self.azimuth = (self.azimuth + delta_azimuth).rem_euclid(TAU);
        self.elevation = (self.elevation - delta_elevation)
            .clamp(-FRAC_PI_2 + POLE_MARGIN, FRAC_PI_2 - POLE_MARGIN);
        self.update_orbital();
    }

    /// Zoom in/out, keeping the distance inside the configured limits
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta).clamp(self.min_distance, self.max_distance);
        self.update_orbital();
    }

    /// Re-centre the orbit on a (moving) target
    pub fn follow(&mut self, target: Vec3) {
        self.target = target;
        self.update_orbital();
    }

    pub fn reset(&mut self, distance: f32) {
        self.azimuth = 0.0;
        self.elevation = 0.0;
        self.distance = distance.clamp(self.min_distance, self.max_distance);
        self.update_orbital();
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_infinite_rh(self.fov, self.aspect_ratio, self.near)
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }
}

impl CameraView for OrbitalCamera {
    fn view_projection(&self) -> ViewProjection {
        ViewProjection::new(self.view_matrix(), self.projection_matrix())
    }
}

/// Camera uniform data for shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub position: [f32; 4],
}

impl CameraUniform {
    pub fn new(view_projection: &ViewProjection, eye: Vec3) -> Self {
        Self {
            view_proj: view_projection.combined().to_cols_array_2d(),
            view: view_projection.view.to_cols_array_2d(),
            position: [eye.x, eye.y, eye.z, 1.0],
        }
    }
}
