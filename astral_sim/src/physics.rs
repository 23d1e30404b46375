//! N-body gravitational physics in physical (SI) units
//!
//! Bodies live in an id-keyed arena owned by [`PhysicsWorld`]. Every step
//! accumulates pairwise Newtonian forces for all bodies before any body is
//! integrated, so the result never depends on iteration order.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{EntityId, SimError};
use common::constants::G;

/// Pairs closer than this (in metres) are treated as coincident and skipped
pub const DEFAULT_MIN_SEPARATION: f64 = 1e-4;

/// Time integration scheme, applied uniformly to every body in a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integrator {
    /// Velocity-Verlet: symplectic, keeps closed orbits closed
    #[default]
    VelocityVerlet,
    /// Forward Euler: one force pass per step, spirals outwards on orbits
    ExplicitEuler,
}

/// A point mass with position, velocity and mass
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsBody {
    pub position: DVec3, // m
    pub velocity: DVec3, // m/s
    pub mass: f64,       // kg
    acceleration: DVec3,
    previous_acceleration: DVec3,
}

impl PhysicsBody {
    pub fn new(position: DVec3, velocity: DVec3, mass: f64) -> Self {
        Self {
            position,
            velocity,
            mass,
            acceleration: DVec3::ZERO,
            previous_acceleration: DVec3::ZERO,
        }
    }

    /// A body sitting still at `position`
    pub fn at_rest(position: DVec3, mass: f64) -> Self {
        Self::new(position, DVec3::ZERO, mass)
    }

    /// Accumulate `force / mass` for the current step.
    ///
    /// Bodies with non-positive mass ignore applied forces, which lets a
    /// massless tracer ride along without producing infinities.
    pub fn apply_force(&mut self, force: DVec3) {
        if self.mass > 0.0 {
            self.acceleration += force / self.mass;
        }
    }

    /// Acceleration accumulated so far in the current step
    pub fn acceleration(&self) -> DVec3 {
        self.acceleration
    }

    pub fn momentum(&self) -> DVec3 {
        self.velocity * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    /// Forward Euler: `x += v dt`, then `v += a dt`, then reset the accumulator
    pub fn integrate_euler(&mut self, dt: f64) {
        self.position += self.velocity * dt;
        self.velocity += self.acceleration * dt;
        self.acceleration = DVec3::ZERO;
    }

    /// First half of a velocity-Verlet step.
    ///
    /// Moves the body to `x + v dt + a dt²/2` and parks `a_n` until
    /// [`verlet_kick`](Self::verlet_kick), leaving the accumulator empty for
    /// the force pass at the new positions.
    pub fn verlet_drift(&mut self, dt: f64) {
        self.position += self.velocity * dt + 0.5 * self.acceleration * dt * dt;
        self.previous_acceleration = self.acceleration;
        self.acceleration = DVec3::ZERO;
    }

    /// Second half of a velocity-Verlet step: `v += (a_n + a_n+1) dt / 2`
    pub fn verlet_kick(&mut self, dt: f64) {
        self.velocity += 0.5 * (self.previous_acceleration + self.acceleration) * dt;
        self.previous_acceleration = DVec3::ZERO;
        self.acceleration = DVec3::ZERO;
    }
}

/// Owns every body and advances them together under mutual gravity
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    bodies: BTreeMap<EntityId, PhysicsBody>,
    gravitational_constant: f64,
    min_separation: f64,
    integrator: Integrator,
    elapsed: f64,
}

impl PhysicsWorld {
    pub fn new(gravitational_constant: f64) -> Self {
        Self {
            bodies: BTreeMap::new(),
            gravitational_constant,
            min_separation: DEFAULT_MIN_SEPARATION,
            integrator: Integrator::default(),
            elapsed: 0.0,
        }
    }

    pub fn with_min_separation(mut self, min_separation: f64) -> Self {
        self.min_separation = min_separation;
        self
    }

    pub fn with_integrator(mut self, integrator: Integrator) -> Self {
        self.integrator = integrator;
        self
    }

    pub fn gravitational_constant(&self) -> f64 {
        self.gravitational_constant
    }

    pub fn min_separation(&self) -> f64 {
        self.min_separation
    }

    pub fn integrator(&self) -> Integrator {
        self.integrator
    }

    /// Simulated seconds advanced since creation
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Register `body` under `id`. Fails without touching the world if `id` is taken.
    pub fn add(&mut self, id: EntityId, body: PhysicsBody) -> Result<(), SimError> {
        if self.bodies.contains_key(&id) {
            return Err(SimError::DuplicateBody(id));
        }
        self.bodies.insert(id, body);
        Ok(())
    }

    /// Drop the body registered under `id`, if any
    pub fn remove(&mut self, id: EntityId) -> Option<PhysicsBody> {
        self.bodies.remove(&id)
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
    }

    pub fn get(&self, id: EntityId) -> Option<&PhysicsBody> {
        self.bodies.get(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.bodies.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn bodies(&self) -> impl Iterator<Item = (EntityId, &PhysicsBody)> {
        self.bodies.iter().map(|(id, body)| (*id, body))
    }

    /// Advance every body by `dt` seconds.
    ///
    /// `dt == 0` is a pause: positions and velocities stay put and the
    /// accumulators are still reset.
    pub fn step(&mut self, dt: f64) {
        self.accumulate_gravity();

        match self.integrator {
            Integrator::ExplicitEuler => {
                for body in self.bodies.values_mut() {
                    body.integrate_euler(dt);
                }
            }
            Integrator::VelocityVerlet => {
                for body in self.bodies.values_mut() {
                    body.verlet_drift(dt);
                }
                self.accumulate_gravity();
                for body in self.bodies.values_mut() {
                    body.verlet_kick(dt);
                }
            }
        }

        self.elapsed += dt;
        log::trace!("stepped {} bodies by {dt}s (t = {}s)", self.bodies.len(), self.elapsed);
    }

    /// Gravitational force exerted on `a` by `b`, or `None` for a coincident pair
    pub fn gravitational_force(&self, a: &PhysicsBody, b: &PhysicsBody) -> Option<DVec3> {
        pair_force(self.gravitational_constant, self.min_separation, a, b)
    }

    /// Sum of `m v` over all bodies
    pub fn total_momentum(&self) -> DVec3 {
        self.bodies.values().map(PhysicsBody::momentum).sum()
    }

    pub fn center_of_mass(&self) -> DVec3 {
        let mut total_mass = 0.0;
        let mut com = DVec3::ZERO;

        for body in self.bodies.values() {
            com += body.position * body.mass;
            total_mass += body.mass;
        }

        if total_mass > 0.0 {
            com / total_mass
        } else {
            DVec3::ZERO
        }
    }

    /// Kinetic plus pairwise potential energy, in joules
    pub fn total_energy(&self) -> f64 {
        let mut kinetic = 0.0;
        let mut potential = 0.0;

        for (i, body_i) in self.bodies.values().enumerate() {
            kinetic += body_i.kinetic_energy();

            for body_j in self.bodies.values().skip(i + 1) {
                let r = body_i.position.distance(body_j.position);
                if r >= self.min_separation {
                    potential -= self.gravitational_constant * (body_i.mass * body_j.mass) / r;
                }
            }
        }

        kinetic + potential
    }

    /// One pass over every unordered pair, applying equal and opposite forces
    fn accumulate_gravity(&mut self) {
        let g = self.gravitational_constant;
        let min_separation = self.min_separation;
        let mut bodies: Vec<(EntityId, &mut PhysicsBody)> =
            self.bodies.iter_mut().map(|(id, body)| (*id, body)).collect();
        let n = bodies.len();

        for i in 0..n {
            for j in (i + 1)..n {
                let (head, tail) = bodies.split_at_mut(j);
                let (id_a, a) = &mut head[i];
                let (id_b, b) = &mut tail[0];

                match pair_force(g, min_separation, a, b) {
                    Some(force) => {
                        a.apply_force(force);
                        b.apply_force(-force);
                    }
                    None => log::trace!("skipping coincident pair {id_a} / {id_b}"),
                }
            }
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(G)
    }
}

/// Force on `a` due to `b`. The product of masses is formed first so swapping
/// the pair yields the exact negation.
fn pair_force(g: f64, min_separation: f64, a: &PhysicsBody, b: &PhysicsBody) -> Option<DVec3> {
    let dir = b.position - a.position;
    let r = dir.length();
    if r < min_separation {
        return None;
    }
    let magnitude = g * (a.mass * b.mass) / (r * r);
    Some(dir / r * magnitude)
}
