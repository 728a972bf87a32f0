pub const TICKS_PER_SECOND: u64 = 50;
pub const FIXED_TIMESTEP: f32 = 1.0 / TICKS_PER_SECOND as f32;

/// Magnitude of gravitational acceleration (m/s²).
pub const GRAVITY: f32 = 9.81;
/// Approximate density of water (kg/m³).
pub const WATER_DENSITY: f32 = 1000.0;

/// Number of wave descriptors a field carries unless configured otherwise.
pub const DEFAULT_WAVE_SETS: usize = 4;
/// Wavelengths at or below this contribute nothing.
pub const MIN_WAVELENGTH: f32 = 0.001;
/// Directions with a squared length at or below this fall back to +X.
pub const MIN_DIRECTION_SQR: f32 = 0.0001;

pub const MIN_BODY_VOLUME: f32 = 0.0001;
pub const MIN_BODY_RADIUS: f32 = 0.01;
/// Submerged fractions at or below this are treated as out of the water.
pub const SUBMERGED_EPSILON: f32 = 0.001;
/// Initial "last interaction" timestamp. Any cooldown has elapsed since.
pub const NEVER_INTERACTED: f64 = f64::NEG_INFINITY;

pub const DEFAULT_EVENT_CAPACITY: usize = 2;
pub const DEFAULT_EVENT_LIFETIME: f32 = 1.5;
pub const INACTIVE_EVENT_RADIUS: f32 = -1.0;
pub const INACTIVE_EVENT_AGE: f32 = 999.0;

pub const CONFIG_FILE_ERROR: &str = "Failed to read simulation config file";
