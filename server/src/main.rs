use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tidewater_server::init::{self, RunnerConfig};
use tidewater_server::world::bodies::SpawnSettings;
use tidewater_server::world::load_from_file::load_simulation_config;
use tidewater_server::world::save::save_simulation_config;
use tidewater_shared::constants::CONFIG_FILE_ERROR;
use tidewater_shared::water::WavePreset;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PresetArg {
    Still,
    Calm,
    Lake,
    Ocean,
    Storm,
}

impl From<PresetArg> for WavePreset {
    fn from(value: PresetArg) -> Self {
        match value {
            PresetArg::Still => WavePreset::Still,
            PresetArg::Calm => WavePreset::Calm,
            PresetArg::Lake => WavePreset::Lake,
            PresetArg::Ocean => WavePreset::Ocean,
            PresetArg::Storm => WavePreset::Storm,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// RON simulation config; falls back to the preset when missing
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = PresetArg::Ocean)]
    preset: PresetArg,

    #[arg(short, long, default_value_t = 16)]
    bodies: usize,

    /// Stop after this many ticks (0 = run until interrupted)
    #[arg(short, long, default_value_t = 0)]
    ticks: u64,

    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Hold the real tick rate instead of running as fast as possible
    #[arg(short, long)]
    realtime: bool,

    /// Write the resolved config to this path before starting
    #[arg(short, long)]
    dump_config: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    if args.bodies > 10_000 {
        eprintln!("Error: bodies must be at most 10000.");
        eprintln!("Got: {}", args.bodies);
        std::process::exit(1);
    }

    let config = match load_simulation_config(args.config.as_deref(), args.preset.into()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}: {err}", CONFIG_FILE_ERROR);
            std::process::exit(1);
        }
    };

    if let Some(path) = &args.dump_config {
        if let Err(err) = save_simulation_config(&config, path) {
            eprintln!("Could not write config to {}: {err}", path.display());
            std::process::exit(1);
        }
    }

    init::init(
        config,
        SpawnSettings {
            count: args.bodies,
            seed: args.seed,
        },
        RunnerConfig {
            max_ticks: (args.ticks > 0).then_some(args.ticks),
            realtime: args.realtime,
        },
    );
}
