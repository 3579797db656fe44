use super::*;

use coil_core::{DefaultScheduler, Runtime};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

fn runtime() -> Runtime {
    Runtime::new(Arc::new(DefaultScheduler))
}

#[test]
fn reader_yields_one_value_per_slot_at_creation() {
    let runtime = runtime();
    let binding = AnimatedValues::new(runtime.handle(), 3, |i| Value::Scalar(i as f32));

    assert_eq!(binding.len(), 3);
    assert_eq!(
        binding.values(),
        vec![Value::Scalar(0.0), Value::Scalar(1.0), Value::Scalar(2.0)]
    );
}

#[test]
fn empty_binding_is_valid() {
    let runtime = runtime();
    let binding = AnimatedValues::new(runtime.handle(), 0, |_| Value::Scalar(0.0));

    assert!(binding.is_empty());
    assert!(binding.values().is_empty());
    binding.set(|_| Value::Scalar(1.0));
}

#[test]
fn writes_jump_immediately_and_are_last_write_wins() {
    let runtime = runtime();
    let binding = AnimatedValues::new(runtime.handle(), 2, |_| Value::Scalar(0.0));

    binding.set(|_| Value::Scalar(1.0));
    binding.set(|i| Value::Scalar(2.0 + i as f32));

    // No transitional blending: the second write is what every slot
    // reads back, synchronously.
    assert_eq!(binding.get(0), Value::Scalar(2.0));
    assert_eq!(binding.get(1), Value::Scalar(3.0));
}

#[test]
fn record_slots_keep_their_fields() {
    let runtime = runtime();
    let binding = AnimatedValues::new(runtime.handle(), 4, |_| {
        Value::record([("x", 0.0), ("scale", 1.0), ("opacity", 1.0)])
    });

    binding.set(|i| Value::record([("x", i as f32 * 50.0), ("scale", 0.7), ("opacity", 0.5)]));

    for i in 0..4 {
        let value = binding.get(i);
        assert_eq!(value.field("x"), Some(i as f32 * 50.0));
        assert_eq!(value.field("scale"), Some(0.7));
        assert_eq!(value.field("opacity"), Some(0.5));
    }
}

#[test]
fn watchers_observe_writes() {
    let runtime = runtime();
    let binding = AnimatedValues::new(runtime.handle(), 1, |_| Value::Scalar(0.0));
    let hits = Rc::new(Cell::new(0));

    let registration = binding.watch(0, {
        let hits = Rc::clone(&hits);
        move || hits.set(hits.get() + 1)
    });

    binding.set(|_| Value::Scalar(1.0));
    assert_eq!(hits.get(), 1);

    drop(registration);
    binding.set(|_| Value::Scalar(2.0));
    assert_eq!(hits.get(), 1);
}

#[test]
fn single_binding_starts_at_the_constant() {
    let runtime = runtime();
    let animated = AnimatedValue::new(runtime.handle(), 0.25f32);
    assert_eq!(animated.get(), Value::Scalar(0.25));
}

#[test]
fn single_binding_initializer_runs_exactly_once() {
    let runtime = runtime();
    let calls = Rc::new(Cell::new(0));

    let animated = AnimatedValue::with_init(runtime.handle(), {
        let calls = Rc::clone(&calls);
        move || {
            calls.set(calls.get() + 1);
            Value::Scalar(9.0)
        }
    });

    assert_eq!(calls.get(), 1);
    assert_eq!(animated.get(), Value::Scalar(9.0));
}

#[test]
fn single_binding_set_replaces_the_value() {
    let runtime = runtime();
    let animated = AnimatedValue::new(runtime.handle(), 0.0f32);

    animated.set(0.5f32);
    assert_eq!(animated.get(), Value::Scalar(0.5));

    animated.set(0.75f32);
    assert_eq!(animated.get(), Value::Scalar(0.75));
}
