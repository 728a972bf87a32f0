use crate::world::bodies::{
    body_lifecycle_system, integrate_bodies_system, spawn_bodies_system, BodyDirectory,
    SpawnSettings,
};
use crate::world::water_simulation::{
    event_sync_system, status_system, water_tick_system, RenderFeed, SimulationStats,
};
use bevy::prelude::*;
use bevy_app::ScheduleRunnerPlugin;
use bevy_log::{info, LogPlugin};
use std::time::Duration;
use tidewater_shared::{SimulationConfig, WaterSimulation, TICKS_PER_SECOND};

/// How the runner is paced and when it stops.
#[derive(Resource, Debug, Clone, Copy)]
pub struct RunnerConfig {
    /// Stop after this many ticks; run forever when `None`
    pub max_ticks: Option<u64>,
    /// Sleep between ticks to hold `TICKS_PER_SECOND`
    pub realtime: bool,
}

pub fn exit_after_ticks_system(
    runner: Res<RunnerConfig>,
    stats: Res<SimulationStats>,
    simulation: Res<WaterSimulation>,
    feed: Res<RenderFeed>,
    mut exit: EventWriter<AppExit>,
) {
    let Some(max_ticks) = runner.max_ticks else {
        return;
    };
    if stats.ticks < max_ticks {
        return;
    }

    info!(
        "Finished {} ticks ({:.1}s simulated): {} bodies left, {} splashes, {} event pushes, {} body steps",
        stats.ticks,
        simulation.time(),
        simulation.bodies().len(),
        stats.splashes,
        feed.pushes,
        stats.body_steps
    );
    exit.write(AppExit::Success);
}

pub fn register_systems(app: &mut App) {
    app.add_systems(Startup, spawn_bodies_system);

    // Forces are computed before integration so they act within the same tick
    app.add_systems(
        Update,
        (
            water_tick_system,
            integrate_bodies_system,
            body_lifecycle_system,
            event_sync_system,
            status_system,
            exit_after_ticks_system,
        )
            .chain(),
    );
}

pub fn init(config: SimulationConfig, spawn: SpawnSettings, runner: RunnerConfig) {
    let mut app = App::new();
    let wait = if runner.realtime {
        Duration::from_secs_f64(1.0 / TICKS_PER_SECOND as f64)
    } else {
        Duration::ZERO
    };
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(wait)));
    app.add_plugins(LogPlugin::default());

    info!(
        "Starting water simulation: {} bodies, seed {}, {}",
        spawn.count,
        spawn.seed,
        match runner.max_ticks {
            Some(ticks) => format!("{ticks} ticks"),
            None => "until interrupted".to_string(),
        }
    );

    app.insert_resource(WaterSimulation::new(&config));
    app.insert_resource(config);
    app.insert_resource(spawn);
    app.insert_resource(runner);
    app.insert_resource(BodyDirectory::default());
    app.insert_resource(SimulationStats::default());
    app.insert_resource(RenderFeed::default());

    register_systems(&mut app);

    app.run();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewater_shared::water::WavePreset;

    fn headless_app(bodies: usize, max_ticks: u64) -> App {
        let mut app = App::new();
        app.add_event::<AppExit>();
        app.insert_resource(WaterSimulation::new(&SimulationConfig::from_preset(
            WavePreset::Ocean,
            0.0,
        )));
        app.insert_resource(SimulationConfig::from_preset(WavePreset::Ocean, 0.0));
        app.insert_resource(SpawnSettings {
            count: bodies,
            seed: 1234,
        });
        app.insert_resource(RunnerConfig {
            max_ticks: Some(max_ticks),
            realtime: false,
        });
        app.insert_resource(BodyDirectory::default());
        app.insert_resource(SimulationStats::default());
        app.insert_resource(RenderFeed::default());
        register_systems(&mut app);
        app
    }

    #[test]
    fn test_startup_registers_every_body() {
        let mut app = headless_app(12, 100);
        app.update();

        let simulation = app.world().resource::<WaterSimulation>();
        assert_eq!(simulation.bodies().len(), 12);
        assert_eq!(app.world().resource::<BodyDirectory>().entities.len(), 12);
    }

    #[test]
    fn test_dropped_bodies_splash_and_float() {
        let mut app = headless_app(8, 1000);
        for _ in 0..(TICKS_PER_SECOND * 4) {
            app.update();
        }

        let stats = *app.world().resource::<SimulationStats>();
        assert_eq!(stats.ticks, TICKS_PER_SECOND * 4);
        assert!(stats.splashes > 0);
        assert!(app.world().resource::<RenderFeed>().pushes > 0);
        // Nothing sinks out of the world
        assert_eq!(app.world().resource::<WaterSimulation>().bodies().len(), 8);
    }

    #[test]
    fn test_exit_requested_after_max_ticks() {
        let mut app = headless_app(0, 3);
        for _ in 0..3 {
            app.update();
        }

        let exits = app.world().resource::<Events<AppExit>>();
        assert!(!exits.is_empty());
    }
}
