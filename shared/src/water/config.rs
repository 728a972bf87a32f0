//! Wave descriptors and the presets built from them.
//!
//! A descriptor is the raw, user-facing description of one Gerstner wave
//! set. Derived quantities (unit direction, wavenumber) live on the
//! [`WaveField`](super::field::WaveField) and are never stored here.

use bevy::math::Vec2;
use bevy_log::warn;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_WAVE_SETS, MIN_DIRECTION_SQR, MIN_WAVELENGTH};

/// Configuration for a single Gerstner wave set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveDescriptor {
    /// Travel direction on the XZ plane. Any magnitude, normalized on use.
    pub direction: Vec2,
    /// Vertical amplitude in world units
    pub amplitude: f32,
    /// Crest-to-crest distance in world units
    pub wavelength: f32,
    /// Phase speed multiplier applied to time
    pub speed: f32,
    /// Horizontal crest sharpening (0.0 = pure sine, 1.0 = sharpest)
    pub steepness: f32,
}

impl WaveDescriptor {
    /// A descriptor that contributes nothing.
    pub const STILL: Self = Self {
        direction: Vec2::X,
        amplitude: 0.0,
        wavelength: 1.0,
        speed: 0.0,
        steepness: 0.0,
    };

    pub const fn new(
        direction: Vec2,
        amplitude: f32,
        wavelength: f32,
        speed: f32,
        steepness: f32,
    ) -> Self {
        Self {
            direction,
            amplitude,
            wavelength,
            speed,
            steepness,
        }
    }

    /// Clamp amplitude to be non-negative and steepness into `[0, 1]`.
    ///
    /// Wavelength and direction are left alone: a degenerate value there
    /// silences the wave rather than being rewritten. Non-finite amplitude
    /// or speed silences the wave as well, and a non-finite wavelength is
    /// treated as zero.
    pub fn sanitized(self) -> Self {
        let mut out = Self {
            amplitude: self.amplitude.max(0.0),
            steepness: if self.steepness.is_nan() {
                0.0
            } else {
                self.steepness.clamp(0.0, 1.0)
            },
            ..self
        };
        if !out.wavelength.is_finite() {
            out.wavelength = 0.0;
        }
        if !(out.amplitude.is_finite() && out.speed.is_finite()) {
            out.amplitude = 0.0;
            out.speed = 0.0;
        }
        if !out.direction.is_finite() {
            out.direction = Vec2::X;
        }
        out
    }

    /// Like [`sanitized`](Self::sanitized), but reports every adjustment
    /// and every degenerate value through the log.
    ///
    /// Call once where the descriptor enters the simulation.
    pub fn validated(self, index: usize) -> Self {
        if !(self.amplitude.is_finite() && self.speed.is_finite()) {
            warn!(
                "Wave set {}: amplitude {} or speed {} is not finite, wave disabled",
                index, self.amplitude, self.speed
            );
        } else if self.amplitude < 0.0 {
            warn!(
                "Wave set {}: negative amplitude {} clamped to 0",
                index, self.amplitude
            );
        }
        if self.steepness.is_nan() {
            warn!("Wave set {}: steepness is NaN, using 0", index);
        } else if !(0.0..=1.0).contains(&self.steepness) {
            warn!(
                "Wave set {}: steepness {} clamped to [0, 1]",
                index, self.steepness
            );
        }
        if !(self.wavelength.is_finite() && self.wavelength > MIN_WAVELENGTH) {
            warn!(
                "Wave set {}: wavelength {} is unusable, wave disabled",
                index, self.wavelength
            );
        }
        if !self.direction.is_finite() || self.direction.length_squared() <= MIN_DIRECTION_SQR {
            warn!(
                "Wave set {}: direction {:?} is degenerate, using +X",
                index, self.direction
            );
        }
        self.sanitized()
    }

    pub fn is_still(&self) -> bool {
        self.amplitude == 0.0
    }
}

impl Default for WaveDescriptor {
    fn default() -> Self {
        Self::STILL
    }
}

/// Preset wave configurations for different water types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WavePreset {
    /// Completely still water (no waves)
    Still,
    /// A single long, low swell
    Calm,
    /// Two gentle crossing wave sets
    Lake,
    /// Four layered wave sets, from swell to chop
    #[default]
    Ocean,
    /// Large, steep waves
    Storm,
}

impl WavePreset {
    /// Descriptors for this preset, padded with still waves up to
    /// [`DEFAULT_WAVE_SETS`].
    pub fn descriptors(self) -> [WaveDescriptor; DEFAULT_WAVE_SETS] {
        let mut waves = [WaveDescriptor::STILL; DEFAULT_WAVE_SETS];

        match self {
            WavePreset::Still => {}
            WavePreset::Calm => {
                waves[0] = WaveDescriptor::new(Vec2::new(1.0, 0.2), 0.15, 9.0, 0.8, 0.5);
            }
            WavePreset::Lake => {
                waves[0] = WaveDescriptor::new(Vec2::new(1.0, 0.0), 0.25, 6.0, 1.0, 0.6);
                waves[1] = WaveDescriptor::new(Vec2::new(0.3, 1.0), 0.12, 2.5, 1.4, 0.7);
            }
            WavePreset::Ocean => {
                waves[0] = WaveDescriptor::new(Vec2::new(1.0, 0.2), 0.4, 7.0, 1.2, 0.8);
                waves[1] = WaveDescriptor::new(Vec2::new(0.7, 0.7), 0.3, 3.5, 1.5, 0.8);
                waves[2] = WaveDescriptor::new(Vec2::new(1.0, -0.8), 0.08, 1.5, 2.0, 0.9);
                waves[3] = WaveDescriptor::new(Vec2::new(0.3, -0.5), 0.05, 0.9, 2.2, 0.9);
            }
            WavePreset::Storm => {
                waves[0] = WaveDescriptor::new(Vec2::new(1.0, 0.2), 1.2, 14.0, 1.8, 0.9);
                waves[1] = WaveDescriptor::new(Vec2::new(-0.5, 1.0), 0.8, 8.0, 2.2, 0.8);
                waves[2] = WaveDescriptor::new(Vec2::new(0.7, -0.7), 0.35, 4.0, 2.8, 0.9);
                waves[3] = WaveDescriptor::new(Vec2::new(-1.0, -0.3), 0.15, 1.8, 3.4, 1.0);
            }
        }

        waves
    }
}
