//! Gerstner wave field: world position + time → surface displacement.
//!
//! Every consumer of the surface (buoyancy, the renderer's vertex stage,
//! batch samplers) goes through the same per-wave formula:
//!
//! ```text
//! phase      = k · (d · (p − origin)) + t · speed
//! height    += A · sin(phase)
//! horizontal += Q · A · d · cos(phase)
//! ```
//!
//! where `d` is the unit direction and `k = 2π / wavelength`.

use std::f32::consts::TAU;

use bevy::math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::config::WaveDescriptor;
use crate::constants::{DEFAULT_WAVE_SETS, MIN_DIRECTION_SQR, MIN_WAVELENGTH};
use crate::error::WaterError;

/// Surface displacement at one horizontal position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WaveDisplacement {
    /// Vertical offset from the base level
    pub height: f32,
    /// Horizontal skew of the surface point, (x, z)
    pub horizontal: Vec2,
}

/// Per-wave values the renderer needs to reproduce the displacement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveUniform {
    pub amplitude: f32,
    pub wavenumber: f32,
    pub speed: f32,
    pub steepness: f32,
    pub direction: Vec2,
}

/// A descriptor together with the values derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WaveSlot {
    pub descriptor: WaveDescriptor,
    pub direction: Vec2,
    pub wavenumber: f32,
}

impl WaveSlot {
    fn derive(descriptor: WaveDescriptor) -> Self {
        let descriptor = descriptor.sanitized();
        let direction = Some(descriptor.direction)
            .filter(|d| d.length_squared() > MIN_DIRECTION_SQR)
            .and_then(Vec2::try_normalize)
            .unwrap_or(Vec2::X);
        let wavenumber = if descriptor.wavelength > MIN_WAVELENGTH {
            TAU / descriptor.wavelength
        } else {
            0.0
        };

        Self {
            descriptor,
            direction,
            wavenumber,
        }
    }

    /// Zero-amplitude and zero-wavenumber waves contribute exactly nothing.
    #[inline(always)]
    pub fn contributes(&self) -> bool {
        self.descriptor.amplitude != 0.0 && self.wavenumber != 0.0
    }

    #[inline(always)]
    pub fn phase(&self, relative: Vec2, time: f32) -> f32 {
        self.wavenumber * self.direction.dot(relative) + time * self.descriptor.speed
    }
}

/// Fixed-size set of Gerstner waves anchored at an origin.
///
/// The number of wave sets is fixed when the field is built; descriptors
/// can be replaced at any time and their derived values are recomputed in
/// the same call.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveField {
    slots: Vec<WaveSlot>,
    origin: Vec2,
    base_level: f32,
}

impl WaveField {
    /// A still field with `wave_sets` slots.
    pub fn new(wave_sets: usize) -> Self {
        Self {
            slots: vec![WaveSlot::derive(WaveDescriptor::STILL); wave_sets],
            origin: Vec2::ZERO,
            base_level: 0.0,
        }
    }

    /// A field sized to and filled from `descriptors`.
    ///
    /// Degenerate descriptors are repaired without logging; validate them
    /// first where they come from user input.
    pub fn from_descriptors(descriptors: &[WaveDescriptor]) -> Self {
        Self {
            slots: descriptors.iter().copied().map(WaveSlot::derive).collect(),
            origin: Vec2::ZERO,
            base_level: 0.0,
        }
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_base_level(mut self, base_level: f32) -> Self {
        self.base_level = base_level;
        self
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    /// Y coordinate of the undisturbed surface.
    pub fn base_level(&self) -> f32 {
        self.base_level
    }

    pub fn set_base_level(&mut self, base_level: f32) {
        self.base_level = base_level;
    }

    pub fn descriptor(&self, index: usize) -> Result<&WaveDescriptor, WaterError> {
        self.slots
            .get(index)
            .map(|slot| &slot.descriptor)
            .ok_or(WaterError::WaveIndexOutOfRange {
                index,
                len: self.slots.len(),
            })
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &WaveDescriptor> {
        self.slots.iter().map(|slot| &slot.descriptor)
    }

    /// Replace one wave set and re-derive its direction and wavenumber.
    pub fn set_descriptor(
        &mut self,
        index: usize,
        descriptor: WaveDescriptor,
    ) -> Result<(), WaterError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(WaterError::WaveIndexOutOfRange { index, len })?;
        *slot = WaveSlot::derive(descriptor.validated(index));
        Ok(())
    }

    /// Replace every wave set at once.
    ///
    /// Fewer descriptors than slots leaves the remaining slots still; more
    /// than slots is rejected and leaves the field untouched.
    pub fn configure(&mut self, descriptors: &[WaveDescriptor]) -> Result<(), WaterError> {
        if descriptors.len() > self.slots.len() {
            return Err(WaterError::TooManyWaves {
                max: self.slots.len(),
                got: descriptors.len(),
            });
        }

        for (i, slot) in self.slots.iter_mut().enumerate() {
            let descriptor = descriptors
                .get(i)
                .map(|d| d.validated(i))
                .unwrap_or(WaveDescriptor::STILL);
            *slot = WaveSlot::derive(descriptor);
        }
        Ok(())
    }

    pub(crate) fn slots(&self) -> &[WaveSlot] {
        &self.slots
    }

    #[inline]
    fn relative(&self, position: Vec3) -> Vec2 {
        Vec2::new(position.x, position.z) - self.origin
    }

    /// Sum of every wave's displacement at the horizontal part of `position`.
    pub fn displacement_at(&self, position: Vec3, time: f32) -> WaveDisplacement {
        let relative = self.relative(position);
        let mut out = WaveDisplacement::default();

        for slot in self.slots.iter().filter(|s| s.contributes()) {
            let phase = slot.phase(relative, time);
            let (sin, cos) = phase.sin_cos();
            let amplitude = slot.descriptor.amplitude;

            out.height += amplitude * sin;
            out.horizontal += slot.descriptor.steepness * amplitude * slot.direction * cos;
        }

        out
    }

    /// World Y of the displaced surface above `position`.
    pub fn surface_height_at(&self, position: Vec3, time: f32) -> f32 {
        self.base_level + self.displacement_at(position, time).height
    }

    /// Unit surface normal from the analytic derivatives of the wave sum.
    pub fn normal_at(&self, position: Vec3, time: f32) -> Vec3 {
        let relative = self.relative(position);
        let mut normal = Vec3::Y;

        for slot in self.slots.iter().filter(|s| s.contributes()) {
            let phase = slot.phase(relative, time);
            let (sin, cos) = phase.sin_cos();
            let ka = slot.wavenumber * slot.descriptor.amplitude;

            normal.x -= slot.direction.x * ka * cos;
            normal.z -= slot.direction.y * ka * cos;
            normal.y -= slot.descriptor.steepness * ka * sin;
        }

        normal.try_normalize().unwrap_or(Vec3::Y)
    }

    /// Per-wave parameters in slot order, for the rendering stage.
    pub fn uniforms(&self) -> Vec<WaveUniform> {
        self.slots
            .iter()
            .map(|slot| WaveUniform {
                amplitude: slot.descriptor.amplitude,
                wavenumber: slot.wavenumber,
                speed: slot.descriptor.speed,
                steepness: slot.descriptor.steepness,
                direction: slot.direction,
            })
            .collect()
    }
}

impl Default for WaveField {
    fn default() -> Self {
        Self::new(DEFAULT_WAVE_SETS)
    }
}
