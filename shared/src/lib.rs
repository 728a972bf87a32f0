pub mod config;
pub mod constants;
pub mod error;
pub mod interaction;
pub mod physics;
pub mod simulation;
pub mod water;

pub use config::{InteractionConfig, SimulationConfig};
pub use constants::*;
pub use error::WaterError;
pub use simulation::{BodyId, BodyWorld, RigidBodyState, TickReport, WaterSimulation};
