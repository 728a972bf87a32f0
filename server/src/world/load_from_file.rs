use bevy_log::info;
use std::fs;
use std::path::Path;
use tidewater_shared::water::WavePreset;
use tidewater_shared::SimulationConfig;

/// Load the simulation config from `path`, or build one from `preset` when
/// no file is given or the file does not exist yet.
pub fn load_simulation_config(
    path: Option<&Path>,
    preset: WavePreset,
) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        info!("No config file given, using the {:?} preset", preset);
        return Ok(SimulationConfig::from_preset(preset, 0.0));
    };

    if !path.exists() {
        info!(
            "Config file not found: {}. Using the {:?} preset.",
            path.display(),
            preset
        );
        return Ok(SimulationConfig::from_preset(preset, 0.0));
    }

    let contents: String = fs::read_to_string(path)?;
    let config = SimulationConfig::from_ron(&contents)?;

    info!("Found config file on disk: {}", path.display());

    Ok(config)
}
