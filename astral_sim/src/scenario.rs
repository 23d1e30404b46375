//! Ready-made initial conditions
//!
//! All values are SI: metres, metres per second, kilograms.

use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::physics::PhysicsBody;
use crate::render::{RenderBackend, Sphere};
use crate::simulation::SimulationWorld;
use crate::{EntityId, SimError, UnitScale};
use common::constants::AU;

pub const SUN_MASS: f64 = 1.989e30;
pub const SUN_RADIUS: f64 = 6.957e8;
pub const EARTH_MASS: f64 = 5.972e24;
pub const EARTH_RADIUS: f64 = 6.371e6;
pub const MOON_MASS: f64 = 7.35e22;
pub const MOON_RADIUS: f64 = 1.7375e6;
pub const EARTH_MOON_DISTANCE: f64 = 3.84e8;

/// Asteroids are numbered from here so they never collide with planets
const FIRST_ASTEROID_ID: u32 = 100;

/// Initial conditions for one body
#[derive(Debug, Clone, PartialEq)]
pub struct BodySpec {
    pub id: EntityId,
    pub name: String,
    pub mass: f64,
    pub radius: f64,
    pub position: DVec3,
    pub velocity: DVec3,
    pub color: [f32; 4],
}

impl BodySpec {
    pub fn new(id: u32, name: &str, mass: f64, radius: f64, color: [f32; 4]) -> Self {
        Self {
            id: EntityId(id),
            name: name.to_string(),
            mass,
            radius,
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            color,
        }
    }

    pub fn at(mut self, position: DVec3, velocity: DVec3) -> Self {
        self.position = position;
        self.velocity = velocity;
        self
    }

    /// Circular orbit of radius `distance` around a mass `central_mass` at the
    /// origin, starting at `angle` in the XY plane, counter-clockwise about +Z
    pub fn circular_orbit(mut self, g: f64, central_mass: f64, distance: f64, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        let speed = (g * central_mass / distance).sqrt();
        self.position = DVec3::new(cos, sin, 0.0) * distance;
        self.velocity = DVec3::new(-sin, cos, 0.0) * speed;
        self
    }

    pub fn body(&self) -> PhysicsBody {
        PhysicsBody::new(self.position, self.velocity, self.mass)
    }

    pub fn sphere(&self, scale: UnitScale) -> Sphere {
        Sphere::from_physical_radius(self.radius, self.color, scale)
    }
}

/// Built-in starting configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    SunEarthMoon,
    InnerPlanets,
    AsteroidBelt { count: u32, seed: u64 },
}

impl Preset {
    pub fn name(&self) -> &'static str {
        match self {
            Preset::SunEarthMoon => "Sun, Earth & Moon",
            Preset::InnerPlanets => "Inner Planets",
            Preset::AsteroidBelt { .. } => "Asteroid Belt",
        }
    }

    /// Bodies for this preset, with orbital speeds derived from `g`
    pub fn bodies(&self, g: f64) -> Vec<BodySpec> {
        match *self {
            Preset::SunEarthMoon => sun_earth_moon(),
            Preset::InnerPlanets => inner_planets(g),
            Preset::AsteroidBelt { count, seed } => asteroid_belt(g, count, seed),
        }
    }
}

fn sun() -> BodySpec {
    BodySpec::new(0, "Sun", SUN_MASS, SUN_RADIUS, [1.0, 1.0, 0.0, 1.0])
}

/// Sun at rest, Earth at 1 AU at 30 km/s, Moon 384,000 km further out
pub fn sun_earth_moon() -> Vec<BodySpec> {
    vec![
        sun(),
        BodySpec::new(1, "Earth", EARTH_MASS, EARTH_RADIUS, [0.0, 0.0, 1.0, 1.0])
            .at(DVec3::new(AU, 0.0, 0.0), DVec3::new(0.0, 3.0e4, 0.0)),
        BodySpec::new(2, "Moon", MOON_MASS, MOON_RADIUS, [1.0, 1.0, 1.0, 1.0]).at(
            DVec3::new(AU + EARTH_MOON_DISTANCE, 0.0, 0.0),
            DVec3::new(0.0, 3.0e4 + 1.022e3, 0.0),
        ),
    ]
}

/// Mercury through Mars on circular orbits, spread around the Sun
pub fn inner_planets(g: f64) -> Vec<BodySpec> {
    let planets = [
        (1, "Mercury", 3.301e23, 2.4397e6, 0.387, [0.6, 0.6, 0.6, 1.0]),
        (2, "Venus", 4.867e24, 6.0518e6, 0.723, [0.9, 0.7, 0.5, 1.0]),
        (3, "Earth", EARTH_MASS, EARTH_RADIUS, 1.0, [0.2, 0.4, 0.8, 1.0]),
        (4, "Mars", 6.417e23, 3.3895e6, 1.524, [0.8, 0.3, 0.2, 1.0]),
    ];

    let spacing = TAU / planets.len() as f64;
    let mut bodies = vec![sun()];
    for (i, (id, name, mass, radius, distance_au, color)) in planets.into_iter().enumerate() {
        let angle = i as f64 * spacing;
        bodies.push(
            BodySpec::new(id, name, mass, radius, color)
                .circular_orbit(g, SUN_MASS, distance_au * AU, angle),
        );
    }
    bodies
}

/// Sun, Earth and `count` small bodies between 2.2 and 3.2 AU
pub fn asteroid_belt(g: f64, count: u32, seed: u64) -> Vec<BodySpec> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bodies = vec![
        sun(),
        BodySpec::new(1, "Earth", EARTH_MASS, EARTH_RADIUS, [0.2, 0.4, 0.8, 1.0])
            .circular_orbit(g, SUN_MASS, AU, 0.0),
    ];

    for n in 0..count {
        let Some(id) = asteroid_id(n) else {
            log::warn!("asteroid belt capped at {n} bodies: ids exhausted");
            break;
        };
        let distance = (2.2 + rng.gen::<f64>()) * AU;
        let angle = rng.gen::<f64>() * TAU;
        let speed_variation = 0.98 + rng.gen::<f64>() * 0.04;
        let mass = 1.0e15 + rng.gen::<f64>() * 1.0e19;
        let radius = 5.0e4 + rng.gen::<f64>() * 4.5e5;
        let grey = 0.45 + rng.gen::<f32>() * 0.3;

        let color = [grey, grey * 0.95, grey * 0.9, 1.0];
        let name = format!("Asteroid {}", n + 1);

        let mut spec = BodySpec::new(id.0, &name, mass, radius, color)
            .circular_orbit(g, SUN_MASS, distance, angle);
        spec.velocity *= speed_variation;
        spec.position.z = (rng.gen::<f64>() - 0.5) * 0.05 * distance;
        bodies.push(spec);
    }
    bodies
}

/// Id of the `n`th asteroid, or `None` once the id space runs out
fn asteroid_id(n: u32) -> Option<EntityId> {
    FIRST_ASTEROID_ID.checked_add(n).map(EntityId)
}

/// Add every spec to `world` as a sphere-rendered entity
pub fn populate<B>(world: &mut SimulationWorld<B>, specs: &[BodySpec]) -> Result<(), SimError>
where
    B: RenderBackend<Renderable = Sphere>,
{
    let scale = world.unit_scale();
    for spec in specs {
        world.add_entity(spec.id, spec.sphere(scale), spec.body())?;
    }
    log::info!("populated world with {} bodies", specs.len());
    Ok(())
}
