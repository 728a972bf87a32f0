//! Batched displacement sampling for bodies with many sample points.
//!
//! Wave data is laid out structure-of-arrays and points are processed four
//! at a time, which lets the compiler vectorize the inner loop. Results
//! match [`WaveField::displacement_at`] point for point.

use bevy::math::{Vec2, Vec3};

use super::field::{WaveDisplacement, WaveField};

/// Number of points processed per batch.
pub const BATCH_WIDTH: usize = 4;

/// Snapshot of a [`WaveField`] prepared for batch queries.
///
/// Cheap to build: take one per tick rather than keeping it in sync with
/// descriptor edits.
pub struct WaveBatchSampler {
    wavenumber: Vec<f32>,
    speed: Vec<f32>,
    amplitude: Vec<f32>,
    /// steepness * amplitude
    skew: Vec<f32>,
    dir_x: Vec<f32>,
    dir_z: Vec<f32>,
    origin: Vec2,
}

impl WaveBatchSampler {
    /// Copies the contributing waves of `field`; silent waves are dropped.
    pub fn new(field: &WaveField) -> Self {
        let active = field.slots().iter().filter(|s| s.contributes());
        let capacity = field.len();
        let mut sampler = Self {
            wavenumber: Vec::with_capacity(capacity),
            speed: Vec::with_capacity(capacity),
            amplitude: Vec::with_capacity(capacity),
            skew: Vec::with_capacity(capacity),
            dir_x: Vec::with_capacity(capacity),
            dir_z: Vec::with_capacity(capacity),
            origin: field.origin(),
        };

        for slot in active {
            sampler.wavenumber.push(slot.wavenumber);
            sampler.speed.push(slot.descriptor.speed);
            sampler.amplitude.push(slot.descriptor.amplitude);
            sampler.skew.push(slot.descriptor.steepness * slot.descriptor.amplitude);
            sampler.dir_x.push(slot.direction.x);
            sampler.dir_z.push(slot.direction.y);
        }

        sampler
    }

    /// Number of waves that actually contribute.
    pub fn active_waves(&self) -> usize {
        self.wavenumber.len()
    }

    /// Displacement at four (x, z) positions.
    #[inline]
    pub fn sample_x4(
        &self,
        x: [f32; BATCH_WIDTH],
        z: [f32; BATCH_WIDTH],
        time: f32,
    ) -> [WaveDisplacement; BATCH_WIDTH] {
        let mut height = [0.0; BATCH_WIDTH];
        let mut skew_x = [0.0; BATCH_WIDTH];
        let mut skew_z = [0.0; BATCH_WIDTH];

        let rx = x.map(|v| v - self.origin.x);
        let rz = z.map(|v| v - self.origin.y);

        for w in 0..self.active_waves() {
            let k = self.wavenumber[w];
            let speed = self.speed[w];
            let amplitude = self.amplitude[w];
            let skew = self.skew[w];
            let dx = self.dir_x[w];
            let dz = self.dir_z[w];

            for i in 0..BATCH_WIDTH {
                let phase = k * (dx * rx[i] + dz * rz[i]) + time * speed;
                let (sin, cos) = phase.sin_cos();
                height[i] += amplitude * sin;
                skew_x[i] += skew * dx * cos;
                skew_z[i] += skew * dz * cos;
            }
        }

        std::array::from_fn(|i| WaveDisplacement {
            height: height[i],
            horizontal: Vec2::new(skew_x[i], skew_z[i]),
        })
    }

    /// Displacement at every point in `points`, written to `out`.
    ///
    /// `out` is cleared first and ends up the same length as `points`.
    pub fn sample_batch(&self, points: &[Vec3], time: f32, out: &mut Vec<WaveDisplacement>) {
        out.clear();
        out.reserve(points.len());

        for chunk in points.chunks(BATCH_WIDTH) {
            // Short trailing chunk: pad with its first point, keep only what we need
            let x = std::array::from_fn(|i| chunk.get(i).unwrap_or(&chunk[0]).x);
            let z = std::array::from_fn(|i| chunk.get(i).unwrap_or(&chunk[0]).z);
            let results = self.sample_x4(x, z, time);
            out.extend_from_slice(&results[..chunk.len()]);
        }
    }
}
