//! Floating bodies of the headless runner and the integrator that moves
//! them.
//!
//! The water only computes forces. Bodies here are point masses in the
//! manner of a player's physics body: gravity, accumulated force and
//! damping move them, and they keep their spawn orientation. The torque
//! from uneven submersion is left to a full rigid-body engine.

use bevy::math::{Vec2, Vec3};
use bevy::prelude::*;
use bevy_log::{debug, info};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::HashMap;
use tidewater_shared::physics::{BodySettings, BuoyancyBody, BuoyancyStep, Kinematics};
use tidewater_shared::{BodyId, RigidBodyState, SimulationConfig, WaterSimulation, FIXED_TIMESTEP};

/// Constants for spawned bodies
pub mod constants {
    /// Mean submerged fraction at rest. Body mass is derived from it so
    /// the buoyancy multiplier is balanced.
    pub const FLOAT_FRACTION: f32 = 0.6;
    pub const MIN_BODY_SIZE: f32 = 0.3;
    pub const MAX_BODY_SIZE: f32 = 1.5;
    /// Half-width of the square bodies are scattered over
    pub const SPAWN_HALF_EXTENT: f32 = 20.0;
    pub const MIN_DROP_HEIGHT: f32 = 0.5;
    pub const MAX_DROP_HEIGHT: f32 = 4.0;
    pub const MAX_SPAWN_SPEED: f32 = 3.0;
    /// Bodies sinking this far below the base level are removed
    pub const KILL_DEPTH: f32 = 50.0;
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatingBody {
    pub id: BodyId,
}

/// Maps the simulation's body ids to entities.
#[derive(Resource, Debug, Default)]
pub struct BodyDirectory {
    pub entities: HashMap<BodyId, Entity>,
    next_id: u64,
}

impl BodyDirectory {
    pub fn allocate(&mut self) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// How many bodies to scatter at startup, and from which seed.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SpawnSettings {
    pub count: usize,
    pub seed: u64,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct PhysicsBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub dimensions: Vec3,
    pub mass: f32,
    /// Linear damping handed over by the water each tick
    pub damping: f32,
    force: Vec3,
}

impl PhysicsBody {
    /// A box of uniform density.
    pub fn new(position: Vec3, velocity: Vec3, dimensions: Vec3, density: f32) -> Self {
        let mass = (density * dimensions.x * dimensions.y * dimensions.z).max(f32::EPSILON);
        Self {
            position,
            velocity,
            dimensions,
            mass,
            damping: 0.0,
            force: Vec3::ZERO,
        }
    }

    pub fn add_force(&mut self, force: Vec3) {
        self.force += force;
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

pub fn apply_gravity(body: &mut PhysicsBody, gravity: f32, delta: f32) {
    body.velocity.y -= gravity * delta;
}

/// Turns the accumulated force into velocity, then damps it.
pub fn apply_forces(body: &mut PhysicsBody, delta: f32) {
    body.velocity += body.force / body.mass * delta;
    body.velocity *= 1.0 / (1.0 + delta * body.damping);
    body.force = Vec3::ZERO;
}

pub fn apply_velocity(body: &mut PhysicsBody, delta: f32) {
    body.position += body.velocity * delta;
}

impl RigidBodyState for PhysicsBody {
    fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + local
    }

    fn kinematics(&self) -> Kinematics {
        Kinematics {
            center_of_mass: self.position,
            linear_velocity: self.velocity,
        }
    }

    fn apply_buoyancy(&mut self, step: &BuoyancyStep) {
        self.add_force(step.force);
        self.damping = step.linear_damping;
    }
}

/// Bottom corners of a box, where a hull first touches the water.
fn hull_sample_offsets(size: Vec3) -> Vec<Vec3> {
    let half = size * 0.5;
    [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)]
        .into_iter()
        .map(|(sx, sz)| Vec3::new(sx * half.x, -half.y, sz * half.z))
        .collect()
}

pub fn spawn_body(
    commands: &mut Commands,
    directory: &mut BodyDirectory,
    simulation: &mut WaterSimulation,
    config: &SimulationConfig,
    position: Vec3,
    size: Vec3,
    velocity: Vec3,
) -> BodyId {
    let id = directory.allocate();
    let bounds = BodySettings::from_bounds(size);
    let settings = BodySettings {
        volume: bounds.volume,
        radius: bounds.radius,
        ..config.default_body
    };
    let density = config.water_density * settings.force_multiplier * constants::FLOAT_FRACTION;

    let physics = PhysicsBody::new(position, velocity, size, density);
    let body = BuoyancyBody::new(settings).with_sample_offsets(hull_sample_offsets(size));

    let entity = commands.spawn((FloatingBody { id }, body, physics)).id();
    directory.entities.insert(id, entity);
    simulation.register_body(id);
    debug!("Spawned {} at {:?}, size {:?}", id, position, size);
    id
}

pub fn spawn_bodies_system(
    mut commands: Commands,
    mut directory: ResMut<BodyDirectory>,
    mut simulation: ResMut<WaterSimulation>,
    config: Res<SimulationConfig>,
    spawn: Res<SpawnSettings>,
) {
    let mut rng = StdRng::seed_from_u64(spawn.seed);
    let base = config.base_level;
    let range = constants::SPAWN_HALF_EXTENT;

    for _ in 0..spawn.count {
        let xz = Vec2::new(rng.gen_range(-range..range), rng.gen_range(-range..range));
        let drop = rng.gen_range(constants::MIN_DROP_HEIGHT..constants::MAX_DROP_HEIGHT);
        let size = Vec3::new(
            rng.gen_range(constants::MIN_BODY_SIZE..constants::MAX_BODY_SIZE),
            rng.gen_range(constants::MIN_BODY_SIZE..constants::MAX_BODY_SIZE),
            rng.gen_range(constants::MIN_BODY_SIZE..constants::MAX_BODY_SIZE),
        );
        let speed = constants::MAX_SPAWN_SPEED;
        let velocity = Vec3::new(
            rng.gen_range(-speed..speed),
            0.0,
            rng.gen_range(-speed..speed),
        );

        spawn_body(
            &mut commands,
            &mut directory,
            &mut simulation,
            &config,
            Vec3::new(xz.x, base + drop, xz.y),
            size,
            velocity,
        );
    }

    info!("Spawned {} floating bodies (seed {})", spawn.count, spawn.seed);
}

pub fn integrate_bodies_system(
    config: Res<SimulationConfig>,
    mut bodies: Query<&mut PhysicsBody>,
) {
    for mut body in bodies.iter_mut() {
        apply_gravity(&mut body, config.gravity, FIXED_TIMESTEP);
        apply_forces(&mut body, FIXED_TIMESTEP);
        apply_velocity(&mut body, FIXED_TIMESTEP);
    }
}

/// Removes bodies that sank out of reach or blew up numerically.
pub fn body_lifecycle_system(
    mut commands: Commands,
    mut directory: ResMut<BodyDirectory>,
    mut simulation: ResMut<WaterSimulation>,
    config: Res<SimulationConfig>,
    bodies: Query<(Entity, &FloatingBody, &PhysicsBody)>,
) {
    let floor = config.base_level - constants::KILL_DEPTH;

    for (entity, floating, physics) in bodies.iter() {
        if physics.is_finite() && physics.position.y > floor {
            continue;
        }

        info!("Removing {} at {:?}", floating.id, physics.position);
        simulation.unregister_body(floating.id);
        directory.entities.remove(&floating.id);
        commands.entity(entity).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewater_shared::GRAVITY;

    fn step(body: &mut PhysicsBody, gravity: f32, delta: f32) {
        apply_gravity(body, gravity, delta);
        apply_forces(body, delta);
        apply_velocity(body, delta);
    }

    #[test]
    fn test_free_fall() {
        let mut body = PhysicsBody::new(Vec3::ZERO, Vec3::ZERO, Vec3::ONE, 500.0);
        for _ in 0..50 {
            step(&mut body, GRAVITY, 0.02);
        }
        // One second of free fall
        assert!((body.velocity.y + GRAVITY).abs() < 1e-3);
        assert!(body.position.y < -4.5 && body.position.y > -5.2);
    }

    #[test]
    fn test_force_is_consumed() {
        let mut body = PhysicsBody::new(Vec3::ZERO, Vec3::ZERO, Vec3::ONE, 1.0);
        body.add_force(Vec3::new(0.0, GRAVITY, 0.0));
        step(&mut body, GRAVITY, 0.1);
        // Force cancelled gravity for exactly one step
        assert!(body.velocity.length() < 1e-5);

        step(&mut body, GRAVITY, 0.1);
        assert!(body.velocity.y < 0.0);
    }

    #[test]
    fn test_damping_slows_body() {
        let mut damped = PhysicsBody::new(Vec3::ZERO, Vec3::X * 5.0, Vec3::ONE, 1.0);
        let mut free = damped.clone();
        damped.damping = 2.0;

        step(&mut damped, 0.0, 0.1);
        step(&mut free, 0.0, 0.1);
        assert!(damped.velocity.x < free.velocity.x);
        assert!(damped.velocity.x > 0.0);
    }

    #[test]
    fn test_buoyancy_step_sets_force_and_damping() {
        let mut body = PhysicsBody::new(Vec3::ZERO, Vec3::ZERO, Vec3::ONE, 1.0);
        body.apply_buoyancy(&BuoyancyStep {
            force: Vec3::Y * 20.0,
            torque: Vec3::Z,
            linear_damping: 1.25,
            angular_damping: 0.5,
            submerged_fraction: 0.6,
            interaction: None,
        });
        assert_eq!(body.damping, 1.25);

        apply_forces(&mut body, 0.1);
        // 20 N on 1 kg for 0.1 s, damped by 1 / (1 + 0.125)
        assert!((body.velocity.y - 2.0 / 1.125).abs() < 1e-5);
    }

    #[test]
    fn test_transform_point_is_translation() {
        let body = PhysicsBody::new(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::ONE, 1.0);
        assert_eq!(body.transform_point(Vec3::X), Vec3::new(2.0, 2.0, 3.0));
    }

    #[test]
    fn test_hull_offsets_sit_on_bottom_face() {
        let offsets = hull_sample_offsets(Vec3::new(2.0, 1.0, 4.0));
        assert_eq!(offsets.len(), 4);
        assert!(offsets.iter().all(|o| o.y == -0.5));
        assert!(offsets.contains(&Vec3::new(1.0, -0.5, 2.0)));
    }
}
