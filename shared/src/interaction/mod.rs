//! Short-lived splash events fed back to the rendering stage.

pub mod ring;

pub use ring::{EventSnapshot, InteractionEvent, InteractionEventRing};
