//! Core runtime for Coil.
//!
//! Everything in this crate runs on one thread, cooperatively: the host
//! owns the loop and pumps the runtime by draining frame callbacks with a
//! timestamp, the runtime owns the bookkeeping (who wants the next frame,
//! which tasks are parked on it, which state cells changed). Animation
//! crates sit on top of [`FrameClock`] and [`MutableState`]; hosts sit
//! below [`RuntimeScheduler`].

mod frame_clock;
mod platform;
mod runtime;
mod state;

pub use frame_clock::{FrameCallbackRegistration, FrameClock, NextFrame};
pub use platform::RuntimeScheduler;
pub use runtime::{DefaultScheduler, FrameCallbackId, Runtime, RuntimeHandle, TaskHandle};
pub use state::{MutableState, State, WatchRegistration};
