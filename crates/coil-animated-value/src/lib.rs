//! Current-value-plus-setter bindings over the Coil spring engine.
//!
//! [`Springs`](coil_animation::Springs) animates named channel maps. UI
//! code mostly wants something simpler: "give me the current value, let
//! me set a new one" — where the value is either a bare scalar or a
//! record of named fields. This crate is that adapter:
//!
//! - [`Value`] is the scalar-or-record sum type,
//! - [`AnimatedValues`] binds `count` independently animated values to
//!   one engine instance (reads are live, writes jump immediately),
//! - [`AnimatedValue`] is the single-value convenience wrapper.
//!
//! Writes deliberately bypass the engine's easing: the intended caller
//! drives values from a continuously sampled signal (a drag gesture's
//! instantaneous position), so every write is an immediate jump and
//! rapid writes are last-write-wins. Eased motion stays available by
//! feeding the writer intermediate values at a high sampling rate.

mod binding;
mod value;

pub use binding::{AnimatedValue, AnimatedValues};
pub use coil_animation::Channels;
pub use value::{Value, ValueShape};
