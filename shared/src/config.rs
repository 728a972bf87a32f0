//! Runtime configuration of the water simulation.
//!
//! Everything here is plain numbers and can be stored as RON. Degenerate
//! values are repaired by [`SimulationConfig::validated`] with a warning,
//! never rejected.

use bevy::math::Vec2;
use bevy_ecs::resource::Resource;
use bevy_log::warn;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_EVENT_CAPACITY, DEFAULT_EVENT_LIFETIME, GRAVITY, WATER_DENSITY};
use crate::error::WaterError;
use crate::physics::BodySettings;
use crate::water::{WaveDescriptor, WavePreset};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Number of ring slots
    pub capacity: usize,
    /// Seconds before an event expires
    pub max_lifetime: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_EVENT_CAPACITY,
            max_lifetime: DEFAULT_EVENT_LIFETIME,
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Y of the undisturbed surface
    pub base_level: f32,
    /// Point the wave phases are measured from, (x, z)
    pub origin: Vec2,
    /// Wave sets; their count is the field's fixed cardinality
    pub waves: Vec<WaveDescriptor>,
    pub gravity: f32,
    pub water_density: f32,
    pub interaction: InteractionConfig,
    /// Settings for bodies registered without their own
    pub default_body: BodySettings,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::from_preset(WavePreset::default(), 0.0)
    }
}

impl SimulationConfig {
    pub fn from_preset(preset: WavePreset, base_level: f32) -> Self {
        Self {
            base_level,
            origin: Vec2::ZERO,
            waves: preset.descriptors().to_vec(),
            gravity: GRAVITY,
            water_density: WATER_DENSITY,
            interaction: InteractionConfig::default(),
            default_body: BodySettings::default(),
        }
    }

    pub fn from_ron(contents: &str) -> Result<Self, WaterError> {
        let config: SimulationConfig = ron::de::from_str(contents)?;
        Ok(config.validated())
    }

    /// Repair every value the simulation cannot use as-is, without logging.
    pub fn sanitized(self) -> Self {
        let mut out = self;
        out.gravity = if out.gravity.is_finite() {
            out.gravity.abs()
        } else {
            GRAVITY
        };
        if !(out.water_density.is_finite() && out.water_density > 0.0) {
            out.water_density = WATER_DENSITY;
        }
        out.waves = out.waves.into_iter().map(WaveDescriptor::sanitized).collect();
        out.default_body = out.default_body.sanitized();
        out
    }

    /// [`sanitized`](Self::sanitized), with a warning for each repair.
    ///
    /// Runs once, where a configuration is loaded. Everything downstream
    /// repairs silently.
    pub fn validated(self) -> Self {
        if !self.gravity.is_finite() {
            warn!("Gravity {} is not finite, using {}", self.gravity, GRAVITY);
        }
        if !(self.water_density.is_finite() && self.water_density > 0.0) {
            warn!(
                "Water density {} is not positive, using {}",
                self.water_density, WATER_DENSITY
            );
        }

        let mut out = self;
        out.waves = out
            .waves
            .iter()
            .enumerate()
            .map(|(i, w)| w.validated(i))
            .collect();
        out.default_body = out.default_body.validated();
        out.sanitized()
    }
}
