//! Systems driving the water simulation each fixed tick.
//!
//! ## Pipeline
//! 1. `water_tick_system`: sample waves, compute buoyancy, record splashes
//! 2. `integrate_bodies_system`: move bodies under gravity and buoyancy
//! 3. `body_lifecycle_system`: drop bodies that left the simulation
//! 4. `event_sync_system`: hand the event ring to the render feed, only
//!    when it changed

use bevy::prelude::*;
use bevy_log::{debug, info};
use tidewater_shared::physics::BuoyancyBody;
use tidewater_shared::water::WaveUniform;
use tidewater_shared::{
    BodyId, BodyWorld, TickReport, WaterSimulation, FIXED_TIMESTEP, TICKS_PER_SECOND,
};

use super::bodies::{BodyDirectory, PhysicsBody};

pub type FloatingQuery<'w, 's> =
    Query<'w, 's, (&'static mut BuoyancyBody, &'static mut PhysicsBody)>;

/// ECS-backed view of the floating bodies for one tick.
pub struct EcsBodies<'a, 'w, 's> {
    pub directory: &'a BodyDirectory,
    pub query: &'a mut FloatingQuery<'w, 's>,
}

impl BodyWorld for EcsBodies<'_, '_, '_> {
    type State = PhysicsBody;

    fn body_mut(&mut self, id: BodyId) -> Option<(&mut BuoyancyBody, &mut PhysicsBody)> {
        let entity = *self.directory.entities.get(&id)?;
        let (body, physics) = self.query.get_mut(entity).ok()?;
        Some((body.into_inner(), physics.into_inner()))
    }
}

/// Running totals over the whole run.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct SimulationStats {
    pub ticks: u64,
    pub body_steps: u64,
    pub missing_bodies: u64,
    pub splashes: u64,
}

impl SimulationStats {
    pub fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        self.body_steps += report.bodies_stepped as u64;
        self.missing_bodies += report.bodies_missing as u64;
        self.splashes += report.interactions as u64;
    }
}

/// What the rendering stage last received.
#[derive(Resource, Debug, Default)]
pub struct RenderFeed {
    /// One `[x, z, radius, age]` vector per ring slot
    pub events: Vec<[f32; 4]>,
    pub waves: Vec<WaveUniform>,
    pub time: f32,
    /// Number of times the event data was pushed
    pub pushes: u64,
}

pub fn water_tick_system(
    mut simulation: ResMut<WaterSimulation>,
    mut stats: ResMut<SimulationStats>,
    directory: Res<BodyDirectory>,
    mut bodies: FloatingQuery,
) {
    let mut world = EcsBodies {
        directory: &directory,
        query: &mut bodies,
    };
    let report = simulation.tick(FIXED_TIMESTEP, &mut world);
    if report.interactions > 0 {
        debug!(
            "t={:.2}: {} splash(es), {} active event(s)",
            simulation.time(),
            report.interactions,
            simulation.ring().active_count()
        );
    }
    stats.record(&report);
}

pub fn event_sync_system(simulation: Res<WaterSimulation>, mut feed: ResMut<RenderFeed>) {
    // Time and wave parameters go out every frame, the events only when dirty
    feed.time = simulation.wave_time();
    feed.waves = simulation.field().uniforms();

    let snapshot = simulation.event_snapshot();
    if !snapshot.dirty {
        return;
    }
    feed.events = snapshot.events.iter().map(|e| e.to_array()).collect();
    feed.pushes += 1;
}

pub fn status_system(
    simulation: Res<WaterSimulation>,
    stats: Res<SimulationStats>,
    feed: Res<RenderFeed>,
) {
    if stats.ticks == 0 || stats.ticks % (TICKS_PER_SECOND * 5) != 0 {
        return;
    }
    info!(
        "t={:.1}s bodies={} active_events={} splashes={} event_pushes={}",
        simulation.time(),
        simulation.bodies().len(),
        simulation.ring().active_count(),
        stats.splashes,
        feed.pushes
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::bodies::{spawn_body, FloatingBody};
    use tidewater_shared::water::WavePreset;
    use tidewater_shared::SimulationConfig;

    fn test_app(config: SimulationConfig) -> App {
        let mut app = App::new();
        app.insert_resource(WaterSimulation::new(&config));
        app.insert_resource(config);
        app.insert_resource(BodyDirectory::default());
        app.insert_resource(SimulationStats::default());
        app.insert_resource(RenderFeed::default());
        app.add_systems(Update, (water_tick_system, event_sync_system).chain());
        app
    }

    fn spawn(app: &mut App, position: Vec3, velocity: Vec3) -> BodyId {
        let world = app.world_mut();
        let mut directory = world.remove_resource::<BodyDirectory>().unwrap();
        let mut simulation = world.remove_resource::<WaterSimulation>().unwrap();

        let id = spawn_body(
            &mut world.commands(),
            &mut directory,
            &mut simulation,
            &SimulationConfig::default(),
            position,
            Vec3::ONE,
            velocity,
        );
        world.flush();

        world.insert_resource(directory);
        world.insert_resource(simulation);
        id
    }

    #[test]
    fn test_tick_applies_buoyancy_through_ecs() {
        let mut app = test_app(SimulationConfig::from_preset(WavePreset::Still, 0.0));
        let id = spawn(&mut app, Vec3::ZERO, Vec3::ZERO);

        app.update();

        let entity = app.world().resource::<BodyDirectory>().entities[&id];
        let physics = app.world().get::<PhysicsBody>(entity).unwrap();
        // Hull bottom sits one radius under the surface
        assert!((physics.damping - 2.0).abs() < 1e-5);
        assert_eq!(app.world().resource::<SimulationStats>().body_steps, 1);
    }

    #[test]
    fn test_splash_reaches_render_feed() {
        let mut app = test_app(SimulationConfig::from_preset(WavePreset::Still, 0.0));
        spawn(&mut app, Vec3::new(2.0, -1.0, 5.0), Vec3::new(0.0, -4.0, 0.0));

        app.update();

        let feed = app.world().resource::<RenderFeed>();
        assert_eq!(feed.pushes, 1);
        assert_eq!(feed.events.len(), 2);
        // Slot 0 holds the splash at the body's x/z
        let [x, z, radius, age] = feed.events[0];
        assert!((x - 2.0).abs() < 1.0 && (z - 5.0).abs() < 1.0);
        assert!(radius >= 0.0);
        assert_eq!(age, 0.0);
        assert_eq!(app.world().resource::<SimulationStats>().splashes, 1);
    }

    #[test]
    fn test_quiet_ring_is_not_pushed_again() {
        let mut app = test_app(SimulationConfig::from_preset(WavePreset::Calm, 0.0));
        app.update();
        app.update();
        app.update();

        let feed = app.world().resource::<RenderFeed>();
        // Only the initial cleared state went out
        assert_eq!(feed.pushes, 1);
        assert_eq!(feed.waves.len(), 4);
        assert!(feed.time > 0.0);
    }

    #[test]
    fn test_despawned_body_is_skipped() {
        let mut app = test_app(SimulationConfig::from_preset(WavePreset::Still, 0.0));
        let id = spawn(&mut app, Vec3::ZERO, Vec3::ZERO);
        let entity = app.world().resource::<BodyDirectory>().entities[&id];
        app.world_mut().despawn(entity);

        app.update();

        let stats = app.world().resource::<SimulationStats>();
        assert_eq!(stats.missing_bodies, 1);
        assert_eq!(stats.body_steps, 0);
        let mut floating = app.world_mut().query::<&FloatingBody>();
        assert_eq!(floating.iter(app.world()).count(), 0);
    }
}
