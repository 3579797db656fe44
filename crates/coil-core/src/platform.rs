//! Platform abstraction for runtime scheduling.
//!
//! The runtime never spins on its own. Whenever it has pending work it
//! tells the host through this trait, and the host decides when to come
//! back and drain (vsync, a timer, an event-loop wakeup, a test pump).

/// Schedules work for the Coil runtime.
///
/// Implementations trigger frame processing on behalf of the runtime.
/// They must be safe to use from multiple threads because wakers for
/// parked tasks may fire anywhere.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host schedule a new frame.
    fn schedule_frame(&self);
}
