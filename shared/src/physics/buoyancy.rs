//! Per-body submersion, buoyant force and splash triggering.
//!
//! A body is approximated by a volume and a characteristic radius. Each
//! sample point is treated as a sphere of that radius: fully submerged
//! when the surface is at least `radius` above it, dry when it is at least
//! `radius` below.

use bevy::math::{Vec2, Vec3};
use bevy_ecs::component::Component;
use bevy_log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::constants::{
    GRAVITY, MIN_BODY_RADIUS, MIN_BODY_VOLUME, NEVER_INTERACTED, SUBMERGED_EPSILON,
    WATER_DENSITY,
};

/// Constants for floating bodies
pub mod constants {
    /// Linear damping out of the water
    pub const AIR_DRAG: f32 = 0.05;
    /// Angular damping out of the water
    pub const AIR_ANGULAR_DRAG: f32 = 0.05;
    pub const SUBMERGED_DRAG: f32 = 2.0;
    pub const SUBMERGED_ANGULAR_DRAG: f32 = 1.5;
    /// Overall buoyancy strength, tuned against body mass
    pub const FORCE_MULTIPLIER: f32 = 25.0;
    pub const DEFAULT_VOLUME: f32 = 0.1;
    pub const DEFAULT_RADIUS: f32 = 0.1;

    pub const INTERACTION_DEPTH: f32 = 0.15;
    pub const INTERACTION_VERTICAL_SPEED: f32 = 1.2;
    pub const INTERACTION_HORIZONTAL_SPEED: f32 = 1.8;
    pub const INTERACTION_COOLDOWN: f32 = 0.3;
    pub const INTERACTION_RADIUS: f32 = 1.0;
}

/// Tunables of one floating body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodySettings {
    /// Approximate displaced volume when fully submerged (m³)
    pub volume: f32,
    /// Half-height of the submersion transition around each sample point
    pub radius: f32,
    pub force_multiplier: f32,
    pub air_drag: f32,
    pub submerged_drag: f32,
    pub air_angular_drag: f32,
    pub submerged_angular_drag: f32,
    /// Minimum depth below the surface before a splash can fire
    pub interaction_depth: f32,
    pub interaction_vertical_speed: f32,
    pub interaction_horizontal_speed: f32,
    /// Minimum time between two splashes of the same body (s)
    pub interaction_cooldown: f32,
    /// Radius of the ripple a splash produces
    pub interaction_radius: f32,
}

impl Default for BodySettings {
    fn default() -> Self {
        Self {
            volume: constants::DEFAULT_VOLUME,
            radius: constants::DEFAULT_RADIUS,
            force_multiplier: constants::FORCE_MULTIPLIER,
            air_drag: constants::AIR_DRAG,
            submerged_drag: constants::SUBMERGED_DRAG,
            air_angular_drag: constants::AIR_ANGULAR_DRAG,
            submerged_angular_drag: constants::SUBMERGED_ANGULAR_DRAG,
            interaction_depth: constants::INTERACTION_DEPTH,
            interaction_vertical_speed: constants::INTERACTION_VERTICAL_SPEED,
            interaction_horizontal_speed: constants::INTERACTION_HORIZONTAL_SPEED,
            interaction_cooldown: constants::INTERACTION_COOLDOWN,
            interaction_radius: constants::INTERACTION_RADIUS,
        }
    }
}

impl BodySettings {
    /// Volume and radius approximated from an axis-aligned bounding box.
    ///
    /// The radius is the smallest half-extent, which keeps the submersion
    /// estimate conservative for flat objects.
    pub fn from_bounds(size: Vec3) -> Self {
        let size = size.abs();
        Self {
            volume: size.x * size.y * size.z,
            radius: size.min_element() * 0.5,
            ..Default::default()
        }
        .sanitized()
    }

    /// Floors volume and radius, and keeps force, drags and thresholds
    /// non-negative. Never logs.
    pub fn sanitized(self) -> Self {
        Self {
            volume: at_least(self.volume, MIN_BODY_VOLUME),
            radius: at_least(self.radius, MIN_BODY_RADIUS),
            force_multiplier: non_negative(self.force_multiplier),
            air_drag: non_negative(self.air_drag),
            submerged_drag: non_negative(self.submerged_drag),
            air_angular_drag: non_negative(self.air_angular_drag),
            submerged_angular_drag: non_negative(self.submerged_angular_drag),
            interaction_cooldown: non_negative(self.interaction_cooldown),
            interaction_radius: non_negative(self.interaction_radius),
            ..self
        }
    }

    /// [`sanitized`](Self::sanitized), warning about volume, radius and
    /// force multiplier.
    pub fn validated(self) -> Self {
        let out = self.sanitized();
        if out.volume != self.volume {
            warn!("Body volume {} raised to {}", self.volume, out.volume);
        }
        if out.radius != self.radius {
            warn!("Body radius {} raised to {}", self.radius, out.radius);
        }
        if out.force_multiplier != self.force_multiplier {
            warn!(
                "Buoyancy multiplier {} replaced by {}",
                self.force_multiplier, out.force_multiplier
            );
        }
        out
    }

    #[inline]
    fn horizontal_speed_sqr_threshold(&self) -> f32 {
        self.interaction_horizontal_speed * self.interaction_horizontal_speed
    }
}

fn at_least(value: f32, min: f32) -> f32 {
    if value.is_finite() && value >= min {
        value
    } else {
        min
    }
}

fn non_negative(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

/// Fraction of a sample sphere below the surface, in `[0, 1]`.
///
/// `depth` is positive when the point is under the surface.
#[inline]
pub fn submerged_fraction(depth: f32, radius: f32) -> f32 {
    let radius = radius.max(MIN_BODY_RADIUS);
    ((depth + radius) / (2.0 * radius)).clamp(0.0, 1.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Water surface seen from one sample point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    /// Sample point in world space
    pub point: Vec3,
    /// World Y of the displaced surface above the point
    pub surface_y: f32,
    /// Horizontal wave skew at the point, (x, z)
    pub skew: Vec2,
}

impl SurfaceSample {
    pub fn depth(&self) -> f32 {
        self.surface_y - self.point.y
    }
}

/// Body state the force model reads.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Kinematics {
    pub center_of_mass: Vec3,
    pub linear_velocity: Vec3,
}

/// Environment shared by every body in a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepContext {
    pub gravity: f32,
    pub water_density: f32,
    /// Simulation time of this step (s)
    pub now: f64,
}

impl Default for StepContext {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            water_density: WATER_DENSITY,
            now: 0.0,
        }
    }
}

/// A body asking for a splash at a point on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionRequest {
    pub position: Vec3,
    pub radius: f32,
}

/// What one body step produced, for the rigid-body integrator to apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuoyancyStep {
    /// Total buoyant force (world space)
    pub force: Vec3,
    /// Torque about the centre of mass from off-centre sample points
    pub torque: Vec3,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Mean submerged fraction over the sample points
    pub submerged_fraction: f32,
    pub interaction: Option<InteractionRequest>,
}

/// Floating-body state owned by the body's entity.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct BuoyancyBody {
    settings: BodySettings,
    /// Sample points in the body's local frame
    sample_offsets: Vec<Vec3>,
    last_interaction: f64,
}

impl BuoyancyBody {
    pub fn new(settings: BodySettings) -> Self {
        Self {
            settings: settings.sanitized(),
            sample_offsets: vec![Vec3::ZERO],
            last_interaction: NEVER_INTERACTED,
        }
    }

    /// Replace the sample points. An empty list keeps the body origin.
    pub fn with_sample_offsets(mut self, offsets: Vec<Vec3>) -> Self {
        self.sample_offsets = if offsets.is_empty() {
            vec![Vec3::ZERO]
        } else {
            offsets
        };
        self
    }

    pub fn settings(&self) -> &BodySettings {
        &self.settings
    }

    pub fn sample_offsets(&self) -> &[Vec3] {
        &self.sample_offsets
    }

    /// Time of the last splash, or a point far in the past.
    pub fn last_interaction(&self) -> f64 {
        self.last_interaction
    }

    pub fn cooldown_elapsed(&self, now: f64) -> bool {
        now - self.last_interaction > f64::from(self.settings.interaction_cooldown)
    }

    fn should_trigger(&self, sample: &SurfaceSample, velocity: Vec3, now: f64) -> bool {
        let fast_vertical = velocity.y.abs() > self.settings.interaction_vertical_speed;
        let fast_horizontal = velocity.x * velocity.x + velocity.z * velocity.z
            > self.settings.horizontal_speed_sqr_threshold();

        sample.depth() > self.settings.interaction_depth
            && (fast_vertical || fast_horizontal)
            && self.cooldown_elapsed(now)
    }

    /// Forces, damping and an optional splash for one physics step.
    ///
    /// The volume is shared evenly between the samples, each evaluated on
    /// its own. At most one splash fires per step, from the first sample
    /// that qualifies.
    pub fn apply_step(
        &mut self,
        samples: &[SurfaceSample],
        kinematics: &Kinematics,
        ctx: &StepContext,
    ) -> BuoyancyStep {
        let mut step = BuoyancyStep {
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
            linear_damping: self.settings.air_drag,
            angular_damping: self.settings.air_angular_drag,
            submerged_fraction: 0.0,
            interaction: None,
        };
        if samples.is_empty() {
            return step;
        }

        let volume_per_sample = self.settings.volume / samples.len() as f32;
        let mut total_fraction = 0.0;

        for sample in samples {
            let fraction = submerged_fraction(sample.depth(), self.settings.radius);
            total_fraction += fraction;

            if fraction > SUBMERGED_EPSILON {
                let displaced_mass = ctx.water_density * volume_per_sample * fraction;
                let force = Vec3::Y
                    * displaced_mass
                    * ctx.gravity.abs()
                    * self.settings.force_multiplier;
                step.force += force;
                step.torque += (sample.point - kinematics.center_of_mass).cross(force);
            }

            if step.interaction.is_none()
                && self.should_trigger(sample, kinematics.linear_velocity, ctx.now)
            {
                let request = InteractionRequest {
                    position: Vec3::new(
                        sample.point.x + sample.skew.x,
                        sample.surface_y,
                        sample.point.z + sample.skew.y,
                    ),
                    radius: self.settings.interaction_radius,
                };
                trace!("Splash requested at {:?}", request.position);
                self.last_interaction = ctx.now;
                step.interaction = Some(request);
            }
        }

        step.submerged_fraction = total_fraction / samples.len() as f32;
        if step.submerged_fraction > SUBMERGED_EPSILON {
            step.linear_damping = lerp(
                self.settings.air_drag,
                self.settings.submerged_drag,
                step.submerged_fraction,
            );
            step.angular_damping = lerp(
                self.settings.air_angular_drag,
                self.settings.submerged_angular_drag,
                step.submerged_fraction,
            );
        }

        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn sample_at_depth(depth: f32) -> SurfaceSample {
        SurfaceSample {
            point: Vec3::new(0.0, -depth, 0.0),
            surface_y: 0.0,
            skew: Vec2::ZERO,
        }
    }

    fn calm_body() -> BuoyancyBody {
        BuoyancyBody::new(BodySettings {
            volume: 1.0,
            radius: 0.5,
            ..Default::default()
        })
    }

    #[test]
    fn test_submerged_fraction_reference_points() {
        assert_eq!(submerged_fraction(0.5, 0.5), 1.0);
        assert_eq!(submerged_fraction(-0.5, 0.5), 0.0);
        assert!((submerged_fraction(0.0, 0.5) - 0.5).abs() < 1e-6);
        assert_eq!(submerged_fraction(3.0, 0.5), 1.0);
        assert_eq!(submerged_fraction(-3.0, 0.5), 0.0);
    }

    #[test]
    fn test_submerged_fraction_is_monotone() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut depths: Vec<f32> = (0..200).map(|_| rng.gen_range(-2.0..2.0)).collect();
        depths.sort_by(|a, b| a.total_cmp(b));

        let fractions: Vec<f32> = depths.iter().map(|d| submerged_fraction(*d, 0.7)).collect();
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_tiny_radius_is_floored() {
        // Radius 0 behaves like MIN_BODY_RADIUS instead of dividing by zero
        let f = submerged_fraction(0.0, 0.0);
        assert!((f - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_dry_body_gets_air_drag_and_no_force() {
        let mut body = calm_body();
        let step = body.apply_step(
            &[sample_at_depth(-1.0)],
            &Kinematics::default(),
            &StepContext::default(),
        );

        assert_eq!(step.force, Vec3::ZERO);
        assert_eq!(step.torque, Vec3::ZERO);
        assert_eq!(step.linear_damping, constants::AIR_DRAG);
        assert_eq!(step.angular_damping, constants::AIR_ANGULAR_DRAG);
        assert_eq!(step.submerged_fraction, 0.0);
    }

    #[test]
    fn test_buoyant_force_magnitude() {
        let mut body = calm_body();
        let step = body.apply_step(
            &[sample_at_depth(0.0)],
            &Kinematics::default(),
            &StepContext::default(),
        );

        // 1000 kg/m³ * 1 m³ * 0.5 * 9.81 * 25
        let expected = WATER_DENSITY * 0.5 * GRAVITY * constants::FORCE_MULTIPLIER;
        assert!((step.force.y - expected).abs() < 1e-1);
        assert_eq!(step.force.x, 0.0);
        assert_eq!(step.force.z, 0.0);

        let drag = lerp(constants::AIR_DRAG, constants::SUBMERGED_DRAG, 0.5);
        assert!((step.linear_damping - drag).abs() < 1e-6);
    }

    #[test]
    fn test_buoyant_force_never_negative() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut body = calm_body();
        for _ in 0..100 {
            let step = body.apply_step(
                &[sample_at_depth(rng.gen_range(-3.0..3.0))],
                &Kinematics::default(),
                &StepContext::default(),
            );
            assert!(step.force.y >= 0.0);
        }
    }

    #[test]
    fn test_off_centre_sample_produces_torque() {
        let mut body = calm_body();
        let mut sample = sample_at_depth(0.5);
        sample.point.x = 1.0;

        let step = body.apply_step(&[sample], &Kinematics::default(), &StepContext::default());
        // Upward force at +X rolls the body about +Z
        assert!(step.torque.z > 0.0);
        assert_eq!(step.torque.x, 0.0);
    }

    #[test]
    fn test_volume_is_shared_between_samples() {
        let mut single = calm_body();
        let mut double = calm_body();

        let one = single.apply_step(
            &[sample_at_depth(0.5)],
            &Kinematics::default(),
            &StepContext::default(),
        );
        let two = double.apply_step(
            &[sample_at_depth(0.5), sample_at_depth(0.5)],
            &Kinematics::default(),
            &StepContext::default(),
        );
        assert!((one.force.y - two.force.y).abs() < 1e-1);
    }

    #[test]
    fn test_splash_requires_depth_and_speed() {
        let mut body = calm_body();
        let ctx = StepContext::default();

        let slow = Kinematics {
            linear_velocity: Vec3::new(0.5, 0.5, 0.5),
            ..Default::default()
        };
        let step = body.apply_step(&[sample_at_depth(1.0)], &slow, &ctx);
        assert!(step.interaction.is_none());

        let sinking = Kinematics {
            linear_velocity: Vec3::new(0.0, -2.0, 0.0),
            ..Default::default()
        };
        let step = body.apply_step(&[sample_at_depth(0.1)], &sinking, &ctx);
        assert!(step.interaction.is_none(), "too shallow");

        let sliding = Kinematics {
            linear_velocity: Vec3::new(1.5, 0.0, 1.5),
            ..Default::default()
        };
        let step = body.apply_step(&[sample_at_depth(0.3)], &sliding, &ctx);
        assert!(step.interaction.is_some(), "fast enough across the surface");
        assert_eq!(body.last_interaction(), ctx.now);
    }

    #[test]
    fn test_splash_lands_on_skewed_surface() {
        let mut body = calm_body();
        let sample = SurfaceSample {
            point: Vec3::new(2.0, -1.0, 3.0),
            surface_y: 0.25,
            skew: Vec2::new(0.1, -0.2),
        };
        let kin = Kinematics {
            linear_velocity: Vec3::new(0.0, -3.0, 0.0),
            ..Default::default()
        };
        let step = body.apply_step(&[sample], &kin, &StepContext::default());

        let request = step.interaction.unwrap();
        assert!((request.position - Vec3::new(2.1, 0.25, 2.8)).length() < 1e-6);
        assert_eq!(request.radius, constants::INTERACTION_RADIUS);
    }

    #[test]
    fn test_splash_respects_cooldown() {
        let mut body = calm_body();
        let kin = Kinematics {
            linear_velocity: Vec3::new(0.0, -3.0, 0.0),
            ..Default::default()
        };
        let cooldown = f64::from(constants::INTERACTION_COOLDOWN);
        let at = |now| StepContext {
            now,
            ..Default::default()
        };

        assert!(body
            .apply_step(&[sample_at_depth(1.0)], &kin, &at(1.0))
            .interaction
            .is_some());
        assert!(body
            .apply_step(&[sample_at_depth(1.0)], &kin, &at(1.0 + cooldown - 0.01))
            .interaction
            .is_none());
        assert_eq!(body.last_interaction(), 1.0);
        assert!(body
            .apply_step(&[sample_at_depth(1.0)], &kin, &at(1.0 + cooldown + 0.01))
            .interaction
            .is_some());
    }

    #[test]
    fn test_first_contact_ignores_long_cooldown() {
        let kin = Kinematics {
            linear_velocity: Vec3::new(0.0, -3.0, 0.0),
            ..Default::default()
        };
        for now in [0.0, 5.0e5] {
            let mut body = BuoyancyBody::new(BodySettings {
                interaction_cooldown: 500.0,
                ..Default::default()
            });
            assert!(body.cooldown_elapsed(now));

            let ctx = StepContext {
                now,
                ..Default::default()
            };
            let step = body.apply_step(&[sample_at_depth(1.0)], &kin, &ctx);
            assert!(step.interaction.is_some(), "first contact at t={now}");
            assert!(!body.cooldown_elapsed(now + 499.0));
        }
    }

    #[test]
    fn test_non_finite_settings_are_repaired() {
        let settings = BodySettings {
            volume: f32::NAN,
            radius: f32::INFINITY,
            submerged_drag: f32::NAN,
            interaction_cooldown: -1.0,
            ..Default::default()
        }
        .validated();
        assert_eq!(settings.volume, MIN_BODY_VOLUME);
        assert_eq!(settings.radius, MIN_BODY_RADIUS);
        assert_eq!(settings.submerged_drag, 0.0);
        assert_eq!(settings.interaction_cooldown, 0.0);
        assert_eq!(settings, settings.sanitized());
    }

    #[test]
    fn test_one_splash_per_step() {
        let mut body = calm_body();
        let kin = Kinematics {
            linear_velocity: Vec3::new(0.0, -3.0, 0.0),
            ..Default::default()
        };
        let mut far = sample_at_depth(1.0);
        far.point.x = 5.0;

        let step = body.apply_step(&[sample_at_depth(1.0), far], &kin, &StepContext::default());
        assert_eq!(step.interaction.unwrap().position.x, 0.0);
    }

    #[test]
    fn test_settings_from_bounds() {
        let settings = BodySettings::from_bounds(Vec3::new(2.0, 0.5, 1.0));
        assert!((settings.volume - 1.0).abs() < 1e-6);
        assert!((settings.radius - 0.25).abs() < 1e-6);

        let flat = BodySettings::from_bounds(Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(flat.volume, MIN_BODY_VOLUME);
        assert_eq!(flat.radius, MIN_BODY_RADIUS);
    }
}
