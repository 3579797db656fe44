//! Spring physics engine for Coil.
//!
//! The unit of animation is a *slot*: a set of named `f32` channels that
//! move together (`x`, `scale`, `opacity`, ...). [`Springs`] owns a fixed
//! number of slots, integrates every non-settled channel once per frame,
//! and publishes each slot's current channel map through a reactive
//! [`coil_core::State`] so readers always observe in-flight values.

mod springs;

pub use springs::{channels, Channels, SpringSpec, Springs, UpdateConfig};
