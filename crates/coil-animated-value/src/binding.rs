use coil_animation::{Channels, Springs, UpdateConfig};
use coil_core::{RuntimeHandle, State, WatchRegistration};

use crate::value::{Value, ValueShape};

/// `count` independently animated values bound to one engine instance.
///
/// Slots are created once, at construction, from the initializer; they
/// live as long as the binding. Reads unbox the engine's live channel
/// maps back to the shape each slot was initialized with, so a reader
/// observes in-flight interpolation without re-polling the engine.
#[derive(Clone)]
pub struct AnimatedValues {
    springs: Springs,
    states: Vec<State<Channels>>,
    shapes: Vec<ValueShape>,
}

impl AnimatedValues {
    /// Creates `count` slots, invoking `init` once per slot index for
    /// its starting value. A `count` of zero yields an empty binding.
    pub fn new(runtime: RuntimeHandle, count: usize, mut init: impl FnMut(usize) -> Value) -> Self {
        let mut shapes = Vec::with_capacity(count);
        let springs = Springs::new(runtime, count, |index| {
            let value = init(index);
            shapes.push(value.shape());
            value.into_channels()
        });
        let states = springs.values();
        Self {
            springs,
            states,
            shapes,
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Current value of one slot, unboxed to its initial shape.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn get(&self, index: usize) -> Value {
        self.states[index].with(|fields| Value::from_channels(self.shapes[index], fields))
    }

    /// Current values of all slots, in slot order.
    pub fn values(&self) -> Vec<Value> {
        (0..self.len()).map(|index| self.get(index)).collect()
    }

    /// Subscribes to one slot's value changes. The callback fires after
    /// every engine publish until the registration is dropped.
    pub fn watch(&self, index: usize, callback: impl Fn() + 'static) -> WatchRegistration {
        self.states[index].watch(callback)
    }

    /// Writes a new target for every slot. Each target jumps into place
    /// immediately, discarding interpolation in progress; writes before
    /// the next frame are last-write-wins, every call replacing the
    /// outstanding target within the single-threaded event loop.
    ///
    /// Targets are expected to match each slot's initial shape; a
    /// mismatched shape drives whatever channels it names and is
    /// unsupported.
    pub fn set(&self, mut targets: impl FnMut(usize) -> Value) {
        self.springs
            .update(|index| targets(index).into_channels(), UpdateConfig::immediate());
    }
}

/// Single-value convenience wrapper over [`AnimatedValues`].
#[derive(Clone)]
pub struct AnimatedValue {
    values: AnimatedValues,
}

impl AnimatedValue {
    /// Binds one slot starting at `initial`.
    pub fn new(runtime: RuntimeHandle, initial: impl Into<Value>) -> Self {
        let initial = initial.into();
        Self::with_init(runtime, move || initial)
    }

    /// Binds one slot whose starting value comes from `init`, invoked
    /// exactly once.
    pub fn with_init(runtime: RuntimeHandle, init: impl FnOnce() -> Value) -> Self {
        let mut init = Some(init);
        let values = AnimatedValues::new(runtime, 1, move |_| {
            let init = init.take().expect("single-slot initializer runs once");
            init()
        });
        Self { values }
    }

    /// Current value (not an array).
    pub fn get(&self) -> Value {
        self.values.get(0)
    }

    /// Jumps the value to `new_value` immediately.
    pub fn set(&self, new_value: impl Into<Value>) {
        let new_value = new_value.into();
        self.values.set(move |_| new_value.clone());
    }

    pub fn watch(&self, callback: impl Fn() + 'static) -> WatchRegistration {
        self.values.watch(0, callback)
    }
}

#[cfg(test)]
#[path = "tests/binding_tests.rs"]
mod tests;
