use astral_sim::scenario::{self, SUN_MASS, EARTH_MASS};
use astral_sim::{EntityId, Integrator, PhysicsBody, PhysicsWorld};
use common::constants::{AU, G};
use glam::DVec3;

const SIX_HOURS: f64 = 6.0 * 3600.0;

/// Sun at rest at the origin, Earth on a circular orbit at 1 AU
pub fn sun_earth_world(integrator: Integrator) -> PhysicsWorld {
    let mut world = PhysicsWorld::new(G).with_integrator(integrator);
    let speed = (G * SUN_MASS / AU).sqrt();

    world
        .add(EntityId(0), PhysicsBody::at_rest(DVec3::ZERO, SUN_MASS))
        .unwrap();
    world
        .add(
            EntityId(1),
            PhysicsBody::new(DVec3::new(AU, 0.0, 0.0), DVec3::new(0.0, speed, 0.0), EARTH_MASS),
        )
        .unwrap();
    world
}

pub fn separation(world: &PhysicsWorld) -> f64 {
    let sun = world.get(EntityId(0)).unwrap();
    let earth = world.get(EntityId(1)).unwrap();
    sun.position.distance(earth.position)
}

/// Run about two orbits, returning the largest and the final |r/r0 - 1|
pub fn radius_deviation(integrator: Integrator) -> (f64, f64) {
    let mut world = sun_earth_world(integrator);
    let r0 = separation(&world);
    let steps = (2.0 * 365.25 * 86_400.0 / SIX_HOURS) as usize;

    let mut worst: f64 = 0.0;
    for _ in 0..steps {
        world.step(SIX_HOURS);
        worst = worst.max((separation(&world) / r0 - 1.0).abs());
    }
    let last = (separation(&world) / r0 - 1.0).abs();
    (worst, last)
}

// ==================================================================================
// Orbit stability
// ==================================================================================

#[test]
fn verlet_orbit_stays_circular() {
    let (worst, _) = radius_deviation(Integrator::VelocityVerlet);
    assert!(worst < 1e-3, "Verlet radius drifted by {worst}");
}

#[test]
fn euler_orbit_drifts_outwards() {
    let (_, verlet) = radius_deviation(Integrator::VelocityVerlet);
    let (_, euler) = radius_deviation(Integrator::ExplicitEuler);

    assert!(euler > 5e-3, "Euler deviation unexpectedly small: {euler}");
    assert!(
        euler > 10.0 * verlet,
        "Euler ({euler}) should drift far more than Verlet ({verlet})"
    );
}

#[test]
fn verlet_orbit_returns_after_one_period() {
    let mut world = sun_earth_world(Integrator::VelocityVerlet);
    let start = world.get(EntityId(1)).unwrap().position;
    let period = std::f64::consts::TAU * (AU.powi(3) / (G * SUN_MASS)).sqrt();
    let steps = (period / SIX_HOURS).round() as usize;

    for _ in 0..steps {
        world.step(SIX_HOURS);
    }

    let end = world.get(EntityId(1)).unwrap().position;
    // within 1% of the orbit radius of where it started
    assert!(end.distance(start) < 0.01 * AU, "ended {} m away", end.distance(start));
}

// ==================================================================================
// Conservation
// ==================================================================================

pub fn scenario_world() -> PhysicsWorld {
    let mut world = PhysicsWorld::new(G);
    for spec in scenario::sun_earth_moon() {
        world.add(spec.id, spec.body()).unwrap();
    }
    world
}

#[test]
fn default_world_uses_the_shared_constant() {
    assert_eq!(PhysicsWorld::default().gravitational_constant(), G);
    assert_eq!(sun_earth_world(Integrator::VelocityVerlet).gravitational_constant(), G);
}

#[test]
fn momentum_is_conserved() {
    let mut world = scenario_world();
    let p0 = world.total_momentum();
    let scale: f64 = world.bodies().map(|(_, b)| b.momentum().length()).sum();

    for _ in 0..5_000 {
        world.step(3600.0);
    }

    let drift = (world.total_momentum() - p0).length();
    assert!(drift < 1e-9 * scale, "momentum drifted by {drift}");
}

#[test]
fn energy_is_bounded_over_a_year() {
    let mut world = scenario_world();
    let e0 = world.total_energy();

    for _ in 0..(365 * 24) {
        world.step(3600.0);
    }

    let relative = ((world.total_energy() - e0) / e0).abs();
    assert!(relative < 1e-5, "relative energy error {relative}");
}

#[test]
fn moon_stays_bound_to_earth() {
    let mut world = scenario_world();
    for _ in 0..(60 * 24) {
        world.step(3600.0);
    }

    let earth = world.get(EntityId(1)).unwrap().position;
    let moon = world.get(EntityId(2)).unwrap().position;
    let distance = earth.distance(moon);
    assert!(
        (2.0e8..6.0e8).contains(&distance),
        "Moon wandered to {distance} m from Earth"
    );
}

// ==================================================================================
// Degenerate configurations
// ==================================================================================

#[test]
fn coincident_bodies_do_not_blow_up() {
    let mut world = PhysicsWorld::new(G);
    world.add(EntityId(0), PhysicsBody::new(DVec3::ONE, DVec3::X, 1.0e10)).unwrap();
    world.add(EntityId(1), PhysicsBody::new(DVec3::ONE, DVec3::X, 1.0e10)).unwrap();
    world
        .add(EntityId(2), PhysicsBody::at_rest(DVec3::ONE + DVec3::Z * 5e-5, 1.0e10))
        .unwrap();

    world.step(1.0);

    for (id, body) in world.bodies() {
        assert!(body.position.is_finite(), "{id} position is not finite");
        assert!(body.velocity.is_finite(), "{id} velocity is not finite");
    }
    assert_eq!(world.get(EntityId(0)).unwrap().velocity, DVec3::X);
    assert_eq!(world.get(EntityId(2)).unwrap().velocity, DVec3::ZERO);
}

#[test]
fn isolated_bodies_move_in_straight_lines() {
    for integrator in [Integrator::VelocityVerlet, Integrator::ExplicitEuler] {
        let mut world = PhysicsWorld::new(G).with_integrator(integrator);
        world
            .add(EntityId(7), PhysicsBody::new(DVec3::ZERO, DVec3::new(3.0, -4.0, 0.5), 1.0))
            .unwrap();

        for _ in 0..10 {
            world.step(0.5);
        }

        let body = world.get(EntityId(7)).unwrap();
        assert!(body.position.abs_diff_eq(DVec3::new(15.0, -20.0, 2.5), 1e-12));
        assert_eq!(body.velocity, DVec3::new(3.0, -4.0, 0.5));
    }
}
