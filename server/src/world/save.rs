use ron::ser::PrettyConfig;
use std::{fs::File, io::Write, path::Path};
use tidewater_shared::SimulationConfig;

pub fn save_simulation_config(
    config: &SimulationConfig,
    file_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let pretty_config = PrettyConfig::new()
        .with_depth_limit(3)
        .with_separate_tuple_members(true)
        .with_enumerate_arrays(true);

    let serialized = ron::ser::to_string_pretty(config, pretty_config)?;
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(file_path)?;
    file.write_all(serialized.as_bytes())?;
    Ok(())
}
