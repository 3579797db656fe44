//! Image carousel demo for the Coil animated-value bindings.
//!
//! The carousel itself is the interesting part: every visual property is
//! driven through [`coil_animated_value`] writers from the slider's move
//! events, never animated directly.

pub mod app;
pub mod slider;
