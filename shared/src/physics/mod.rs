//! Forces the water applies to floating bodies.

pub mod buoyancy;

pub use buoyancy::{
    submerged_fraction, BodySettings, BuoyancyBody, BuoyancyStep, InteractionRequest,
    Kinematics, StepContext, SurfaceSample,
};
