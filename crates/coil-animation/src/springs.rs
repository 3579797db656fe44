use std::cell::RefCell;
use std::rc::Rc;

use indexmap::map::Entry;
use indexmap::IndexMap;
use smallvec::SmallVec;

use coil_core::{FrameCallbackRegistration, MutableState, RuntimeHandle, State};

/// Named `f32` channels of one slot, in insertion order.
pub type Channels = IndexMap<String, f32>;

/// Builds a channel map from `(name, value)` pairs.
pub fn channels<const N: usize>(entries: [(&str, f32); N]) -> Channels {
    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// Spring animation configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringSpec {
    /// Damping ratio. 1.0 = critically damped, < 1.0 = under-damped (bouncy), > 1.0 = over-damped.
    pub damping_ratio: f32,
    /// Stiffness constant. Higher values = faster animation.
    pub stiffness: f32,
    /// Velocity threshold to stop animation.
    pub velocity_threshold: f32,
    /// Position threshold to stop animation.
    pub position_threshold: f32,
}

impl SpringSpec {
    /// Create a critically damped spring with the default stiffness.
    pub fn default_spring() -> Self {
        Self {
            damping_ratio: 1.0,
            stiffness: 1500.0,
            velocity_threshold: 0.01,
            position_threshold: 0.001,
        }
    }

    /// Create a bouncy, under-damped spring.
    pub fn bouncy() -> Self {
        Self {
            damping_ratio: 0.5,
            stiffness: 1500.0,
            velocity_threshold: 0.01,
            position_threshold: 0.001,
        }
    }

    /// Create a stiff spring (fast, no bounce).
    pub fn stiff() -> Self {
        Self {
            damping_ratio: 1.0,
            stiffness: 3000.0,
            velocity_threshold: 0.01,
            position_threshold: 0.001,
        }
    }
}

impl Default for SpringSpec {
    fn default() -> Self {
        Self::default_spring()
    }
}

/// Options for [`Springs::update`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateConfig {
    /// Jump straight to the target instead of easing towards it. The
    /// jump is published synchronously, discarding any interpolation in
    /// progress on the written channels.
    pub immediate: bool,
}

impl UpdateConfig {
    pub fn immediate() -> Self {
        Self { immediate: true }
    }
}

/// Internal integration timestep (~60 FPS) for stability across uneven
/// frame deltas.
const TIMESTEP: f32 = 0.016;

struct Channel {
    current: f32,
    velocity: f32,
    target: f32,
}

impl Channel {
    fn new(value: f32) -> Self {
        Self {
            current: value,
            velocity: 0.0,
            target: value,
        }
    }

    fn snap(&mut self, target: f32) {
        self.current = target;
        self.target = target;
        self.velocity = 0.0;
    }

    /// Semi-implicit Euler integration of a damped harmonic oscillator,
    /// sub-stepped so large frame deltas stay stable.
    fn step(&mut self, spec: &SpringSpec, dt: f32) {
        let stiffness = spec.stiffness;
        let damping = 2.0 * spec.damping_ratio * stiffness.sqrt();

        let mut remaining = dt;
        while remaining > 0.0 {
            let step = TIMESTEP.min(remaining);
            let displacement = self.current - self.target;
            let acceleration = -stiffness * displacement - damping * self.velocity;
            self.velocity += acceleration * step;
            self.current += self.velocity * step;
            remaining -= step;
        }
    }

    fn is_settled(&self, spec: &SpringSpec) -> bool {
        self.velocity.abs() < spec.velocity_threshold
            && (self.current - self.target).abs() < spec.position_threshold
    }
}

struct Slot {
    state: MutableState<Channels>,
    channels: IndexMap<String, Channel>,
}

impl Slot {
    fn snapshot(&self) -> Channels {
        self.channels
            .iter()
            .map(|(name, channel)| (name.clone(), channel.current))
            .collect()
    }

    fn is_settled(&self, spec: &SpringSpec) -> bool {
        self.channels.values().all(|channel| channel.is_settled(spec))
    }
}

struct SpringsInner {
    runtime: RuntimeHandle,
    spec: SpringSpec,
    slots: Vec<Slot>,
    registration: Option<FrameCallbackRegistration>,
    last_frame_nanos: Option<u64>,
}

/// A fixed set of independently animated slots.
///
/// Each slot is created once, from its initializer, and lives as long as
/// the `Springs` value. Reads go through the per-slot [`State`]s returned
/// by [`Springs::values`]; writes go through [`Springs::update`].
pub struct Springs {
    inner: Rc<RefCell<SpringsInner>>,
}

impl Clone for Springs {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl Springs {
    /// Create `count` slots, calling `init` once per slot index for the
    /// starting channels. A `count` of zero is valid and yields an empty
    /// set.
    pub fn new(runtime: RuntimeHandle, count: usize, init: impl FnMut(usize) -> Channels) -> Self {
        Self::with_spec(runtime, count, init, SpringSpec::default())
    }

    pub fn with_spec(
        runtime: RuntimeHandle,
        count: usize,
        mut init: impl FnMut(usize) -> Channels,
        spec: SpringSpec,
    ) -> Self {
        let slots = (0..count)
            .map(|index| {
                let initial = init(index);
                let channels = initial
                    .iter()
                    .map(|(name, value)| (name.clone(), Channel::new(*value)))
                    .collect();
                Slot {
                    state: MutableState::with_runtime(initial, runtime.clone()),
                    channels,
                }
            })
            .collect();

        Self {
            inner: Rc::new(RefCell::new(SpringsInner {
                runtime,
                spec,
                slots,
                registration: None,
                last_frame_nanos: None,
            })),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().slots.is_empty()
    }

    /// Live per-slot channel states, one per slot, in slot order. The
    /// states keep updating as interpolation progresses.
    pub fn values(&self) -> Vec<State<Channels>> {
        self.inner
            .borrow()
            .slots
            .iter()
            .map(|slot| slot.state.as_state())
            .collect()
    }

    /// Retargets every slot. `targets(i)` names the channels to drive;
    /// channels a slot already owns keep their motion state, channels
    /// named for the first time are inserted at the target.
    ///
    /// With `immediate` set, written channels jump to the target and the
    /// new values are published before this call returns. Otherwise the
    /// springs ease towards the targets over subsequent frames.
    pub fn update(&self, mut targets: impl FnMut(usize) -> Channels, config: UpdateConfig) {
        let mut publishes: SmallVec<[(MutableState<Channels>, Channels); 4]> = SmallVec::new();
        let mut needs_frames = false;
        {
            let mut inner = self.inner.borrow_mut();
            let spec = inner.spec;
            for (index, slot) in inner.slots.iter_mut().enumerate() {
                for (name, value) in targets(index) {
                    match slot.channels.entry(name) {
                        Entry::Occupied(mut entry) => {
                            let channel = entry.get_mut();
                            if config.immediate {
                                channel.snap(value);
                            } else {
                                channel.target = value;
                            }
                        }
                        Entry::Vacant(entry) => {
                            entry.insert(Channel::new(value));
                        }
                    }
                }
                if config.immediate {
                    publishes.push((slot.state.clone(), slot.snapshot()));
                }
                if !slot.is_settled(&spec) {
                    needs_frames = true;
                }
            }
            if needs_frames {
                Self::schedule_frame_locked(&self.inner, &mut inner);
            }
        }
        for (state, value) in publishes {
            state.set_value(value);
        }
    }

    fn schedule_frame_locked(this: &Rc<RefCell<SpringsInner>>, inner: &mut SpringsInner) {
        if inner.registration.is_some() {
            return;
        }
        let weak = Rc::downgrade(this);
        let registration = inner.runtime.frame_clock().with_frame_nanos(move |time| {
            if let Some(strong) = weak.upgrade() {
                Self::on_frame(&strong, time);
            }
        });
        inner.registration = Some(registration);
    }

    fn on_frame(this: &Rc<RefCell<SpringsInner>>, frame_time_nanos: u64) {
        let mut publishes: SmallVec<[(MutableState<Channels>, Channels); 4]> = SmallVec::new();
        let mut schedule_next = false;
        {
            let mut inner = this.borrow_mut();
            inner.registration = None;

            let previous = inner.last_frame_nanos.replace(frame_time_nanos);
            let dt = previous
                .map(|prev| frame_time_nanos.saturating_sub(prev) as f32 / 1_000_000_000.0)
                .unwrap_or(0.0);

            if dt <= 0.0 {
                // First frame only records the timestamp.
                schedule_next = true;
            } else {
                let spec = inner.spec;
                for slot in inner.slots.iter_mut() {
                    let mut moved = false;
                    for channel in slot.channels.values_mut() {
                        if channel.is_settled(&spec) {
                            continue;
                        }
                        channel.step(&spec, dt);
                        if channel.is_settled(&spec) {
                            let target = channel.target;
                            channel.snap(target);
                        }
                        moved = true;
                    }
                    if moved {
                        publishes.push((slot.state.clone(), slot.snapshot()));
                    }
                    if !slot.is_settled(&spec) {
                        schedule_next = true;
                    }
                }
            }

            if !schedule_next {
                inner.last_frame_nanos = None;
                log::debug!("springs settled after frame at {frame_time_nanos}ns");
            }
        }

        for (state, value) in publishes {
            state.set_value(value);
        }

        if schedule_next {
            let mut inner = this.borrow_mut();
            Self::schedule_frame_locked(this, &mut inner);
        }
    }
}

#[cfg(test)]
#[path = "tests/springs_tests.rs"]
mod tests;
