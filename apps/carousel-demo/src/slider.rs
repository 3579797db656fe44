//! Looped drag slider for the carousel.
//!
//! Tracks a single position in slide units (slide 1.5 is halfway between
//! the second and third slide, wrapping around the ends). Dragging moves
//! the track with immediate writes; releasing snaps it to the nearest
//! slide through the engine's eased spring path. Every track change
//! recomputes per-slide geometry and invokes the registered move
//! callback, which is where the carousel wires up its bindings.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use coil_animation::{channels, Channels, Springs, UpdateConfig};
use coil_core::{RuntimeHandle, State, WatchRegistration};

const POSITION: &str = "position";

/// Geometry of one slide relative to the viewport, in slide units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlidePosition {
    /// Signed offset from the viewport center, wrapped into
    /// `[-count/2, count/2)`.
    pub distance: f32,
    /// Visible fraction of the slide, `0.0` (off-screen) to `1.0`
    /// (centered).
    pub portion: f32,
}

/// Snapshot of the slider's geometry, recomputed on every move event.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderDetails {
    pub positions: Vec<SlidePosition>,
    /// Looped track progress in `[0, 1)`.
    pub progress_track: f32,
}

type MoveCallback = Box<dyn Fn(&SliderDetails) + 'static>;

struct SliderShared {
    count: usize,
    track: Springs,
    state: State<Channels>,
    on_move: Rc<RefCell<Option<MoveCallback>>>,
    dragging: Cell<bool>,
    _watch: WatchRegistration,
}

#[derive(Clone)]
pub struct Slider {
    shared: Rc<SliderShared>,
}

impl Slider {
    pub fn new(runtime: RuntimeHandle, count: usize, initial: usize) -> Self {
        let track = Springs::new(runtime, 1, |_| channels([(POSITION, initial as f32)]));
        let state = track.values().remove(0);
        let on_move: Rc<RefCell<Option<MoveCallback>>> = Rc::new(RefCell::new(None));

        let watch = state.watch({
            let on_move = Rc::clone(&on_move);
            let state = state.clone();
            move || {
                if let Some(callback) = &*on_move.borrow() {
                    let position = state.get()[POSITION];
                    callback(&compute_details(count, position));
                }
            }
        });

        Self {
            shared: Rc::new(SliderShared {
                count,
                track,
                state,
                on_move,
                dragging: Cell::new(false),
                _watch: watch,
            }),
        }
    }

    pub fn count(&self) -> usize {
        self.shared.count
    }

    /// Current track position in slide units (unwrapped).
    pub fn position(&self) -> f32 {
        self.shared.state.get()[POSITION]
    }

    pub fn is_dragging(&self) -> bool {
        self.shared.dragging.get()
    }

    /// Registers the move callback. It fires on every track change; call
    /// [`Slider::emit`] to apply the current geometry right away.
    pub fn on_move(&self, callback: impl Fn(&SliderDetails) + 'static) {
        *self.shared.on_move.borrow_mut() = Some(Box::new(callback));
    }

    /// Invokes the move callback with the current geometry.
    pub fn emit(&self) {
        if let Some(callback) = &*self.shared.on_move.borrow() {
            callback(&self.details());
        }
    }

    pub fn details(&self) -> SliderDetails {
        compute_details(self.shared.count, self.position())
    }

    /// Grabs the track, freezing any snap animation in flight.
    pub fn drag_start(&self) {
        self.shared.dragging.set(true);
        let position = self.position();
        self.shared
            .track
            .update(|_| channels([(POSITION, position)]), UpdateConfig::immediate());
    }

    /// Moves the track by `delta` slide units, following the pointer.
    pub fn drag_by(&self, delta: f32) {
        if !self.shared.dragging.get() {
            return;
        }
        let position = self.position() + delta;
        self.shared
            .track
            .update(|_| channels([(POSITION, position)]), UpdateConfig::immediate());
    }

    /// Releases the track; it snaps to the nearest slide with an eased
    /// spring.
    pub fn drag_end(&self) {
        self.shared.dragging.set(false);
        let target = self.position().round();
        self.shared
            .track
            .update(|_| channels([(POSITION, target)]), UpdateConfig::default());
    }
}

fn compute_details(count: usize, position: f32) -> SliderDetails {
    if count == 0 {
        return SliderDetails {
            positions: Vec::new(),
            progress_track: 0.0,
        };
    }
    let count_f = count as f32;
    let positions = (0..count)
        .map(|index| {
            let mut distance = (index as f32 - position).rem_euclid(count_f);
            if distance >= count_f / 2.0 {
                distance -= count_f;
            }
            let portion = (1.0 - distance.abs()).clamp(0.0, 1.0);
            SlidePosition { distance, portion }
        })
        .collect();
    SliderDetails {
        positions,
        progress_track: position.rem_euclid(count_f) / count_f,
    }
}

#[cfg(test)]
#[path = "tests/slider_tests.rs"]
mod tests;
