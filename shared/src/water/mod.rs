//! Procedural water surface shared by physics and rendering.
//!
//! The same wave sum drives buoyancy on the CPU and vertex displacement on
//! the GPU, so both read from one [`WaveField`]:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            WaveField (shared)                │
//! │  - descriptors (dir, A, λ, speed, Q)         │
//! │  - derived k and unit direction              │
//! └───────────────────────┬──────────────────────┘
//!                         │
//!         ┌───────────────┴───────────────┐
//!         ▼                               ▼
//!  ┌──────────────┐               ┌───────────────┐
//!  │  Buoyancy    │               │   Renderer    │
//!  │ displacement │               │  uniforms()   │
//!  │ + batch      │               │  + events     │
//!  └──────────────┘               └───────────────┘
//! ```

pub mod batch;
pub mod config;
pub mod field;

pub use batch::WaveBatchSampler;
pub use config::{WaveDescriptor, WavePreset};
pub use field::{WaveDisplacement, WaveField, WaveUniform};
