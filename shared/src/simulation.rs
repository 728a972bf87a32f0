//! The per-tick driver tying waves, floating bodies and splash events
//! together.
//!
//! Bodies are owned elsewhere (an ECS world, a test harness). The
//! simulation only keeps their ids, in registration order, and reaches the
//! bodies through a [`BodyWorld`] each tick.

use bevy::math::{Vec2, Vec3};
use bevy_ecs::resource::Resource;
use bevy_log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::error::WaterError;
use crate::interaction::{EventSnapshot, InteractionEventRing};
use crate::physics::{BuoyancyBody, BuoyancyStep, Kinematics, StepContext, SurfaceSample};
use crate::water::{WaveBatchSampler, WaveDescriptor, WaveDisplacement, WaveField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u64);

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// The rigid body behind a floating body, as seen by the water.
pub trait RigidBodyState {
    /// Map a point from the body's local frame to world space.
    fn transform_point(&self, local: Vec3) -> Vec3;

    fn kinematics(&self) -> Kinematics;

    /// Hand over this step's forces and damping to the integrator.
    fn apply_buoyancy(&mut self, step: &BuoyancyStep);
}

/// Lookup from body id to the body's water state and rigid body.
pub trait BodyWorld {
    type State: RigidBodyState;

    /// `None` when the body no longer exists; it is skipped for this tick.
    fn body_mut(&mut self, id: BodyId) -> Option<(&mut BuoyancyBody, &mut Self::State)>;
}

/// Counters from one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub bodies_stepped: usize,
    pub bodies_missing: usize,
    pub interactions: usize,
    /// Whether the event snapshot should be pushed this tick
    pub events_dirty: bool,
}

#[derive(Resource, Debug)]
pub struct WaterSimulation {
    field: WaveField,
    ring: InteractionEventRing,
    bodies: Vec<BodyId>,
    /// f64 so long runs keep advancing at tick resolution
    time: f64,
    gravity: f32,
    water_density: f32,

    // Scratch buffers reused across bodies
    points: Vec<Vec3>,
    displacements: Vec<WaveDisplacement>,
    samples: Vec<SurfaceSample>,
}

impl WaterSimulation {
    pub fn new(config: &SimulationConfig) -> Self {
        let config = config.clone().sanitized();
        let field = WaveField::from_descriptors(&config.waves)
            .with_origin(config.origin)
            .with_base_level(config.base_level);

        info!(
            "Water simulation: {} wave sets, base level {}, {} event slots",
            field.len(),
            field.base_level(),
            config.interaction.capacity
        );

        Self {
            field,
            ring: InteractionEventRing::new(
                config.interaction.capacity,
                config.interaction.max_lifetime,
                0.0,
            ),
            bodies: Vec::new(),
            time: 0.0,
            gravity: config.gravity,
            water_density: config.water_density,
            points: Vec::new(),
            displacements: Vec::new(),
            samples: Vec::new(),
        }
    }

    /// Seconds of simulated time since start.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Simulation time as the wave field and the renderer consume it.
    pub fn wave_time(&self) -> f32 {
        self.time as f32
    }

    pub fn field(&self) -> &WaveField {
        &self.field
    }

    pub fn ring(&self) -> &InteractionEventRing {
        &self.ring
    }

    /// Replace all wave sets. See [`WaveField::configure`].
    pub fn configure_waves(&mut self, descriptors: &[WaveDescriptor]) -> Result<(), WaterError> {
        self.field.configure(descriptors)
    }

    pub fn set_wave(&mut self, index: usize, descriptor: WaveDescriptor) -> Result<(), WaterError> {
        self.field.set_descriptor(index, descriptor)
    }

    pub fn set_event_lifetime(&mut self, max_lifetime: f32) {
        self.ring.set_max_lifetime(max_lifetime);
    }

    /// Surface displacement at the current simulation time.
    pub fn displacement_at(&self, position: Vec3) -> WaveDisplacement {
        self.field.displacement_at(position, self.wave_time())
    }

    /// Returns false if the body was already registered.
    pub fn register_body(&mut self, id: BodyId) -> bool {
        if self.bodies.contains(&id) {
            return false;
        }
        self.bodies.push(id);
        debug!("Registered {}", id);
        true
    }

    /// Returns false if the body was not registered.
    pub fn unregister_body(&mut self, id: BodyId) -> bool {
        let Some(index) = self.bodies.iter().position(|b| *b == id) else {
            return false;
        };
        self.bodies.remove(index);
        debug!("Unregistered {}", id);
        true
    }

    pub fn bodies(&self) -> &[BodyId] {
        &self.bodies
    }

    /// Record a splash from outside the body loop, e.g. a contact trigger.
    pub fn trigger_interaction(&mut self, position: Vec3, radius: f32) {
        self.ring
            .trigger(Vec2::new(position.x, position.z), radius, self.time);
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Bodies are stepped in registration order, then the event ring is
    /// aged once.
    pub fn tick<W: BodyWorld>(&mut self, dt: f32, world: &mut W) -> TickReport {
        if dt.is_finite() && dt > 0.0 {
            self.time += f64::from(dt);
        }

        let Self {
            field,
            ring,
            bodies,
            time,
            gravity,
            water_density,
            points,
            displacements,
            samples,
        } = self;
        let now = *time;
        let ctx = StepContext {
            gravity: *gravity,
            water_density: *water_density,
            now,
        };
        let sampler = WaveBatchSampler::new(field);
        let mut report = TickReport::default();

        for id in bodies.iter() {
            let Some((body, state)) = world.body_mut(*id) else {
                debug!("{} is registered but missing from the world", id);
                report.bodies_missing += 1;
                continue;
            };

            points.clear();
            points.extend(body.sample_offsets().iter().map(|o| state.transform_point(*o)));
            sampler.sample_batch(points, now as f32, displacements);

            samples.clear();
            samples.extend(points.iter().zip(displacements.iter()).map(|(point, d)| {
                SurfaceSample {
                    point: *point,
                    surface_y: field.base_level() + d.height,
                    skew: d.horizontal,
                }
            }));

            let step = body.apply_step(samples, &state.kinematics(), &ctx);
            state.apply_buoyancy(&step);
            report.bodies_stepped += 1;

            if let Some(request) = step.interaction {
                ring.trigger(
                    Vec2::new(request.position.x, request.position.z),
                    request.radius,
                    now,
                );
                report.interactions += 1;
            }
        }

        report.events_dirty = ring.advance(now);
        report
    }

    pub fn event_snapshot(&self) -> EventSnapshot<'_> {
        self.ring.snapshot()
    }
}

impl Default for WaterSimulation {
    fn default() -> Self {
        Self::new(&SimulationConfig::default())
    }
}
