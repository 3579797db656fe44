use super::*;

use coil_core::{DefaultScheduler, Runtime};
use std::sync::Arc;

fn runtime() -> Runtime {
    Runtime::new(Arc::new(DefaultScheduler))
}

fn pump(runtime: &Runtime, max_frames: usize) -> usize {
    let handle = runtime.handle();
    let mut frame_time = 0u64;
    for frame in 0..max_frames {
        if !runtime.needs_frame() {
            return frame;
        }
        frame_time += 16_666_667;
        handle.drain_frame_callbacks(frame_time);
        handle.drain_ui();
    }
    max_frames
}

#[test]
fn geometry_at_a_whole_slide() {
    let details = compute_details(4, 1.0);

    let distances: Vec<f32> = details.positions.iter().map(|p| p.distance).collect();
    let portions: Vec<f32> = details.positions.iter().map(|p| p.portion).collect();

    assert_eq!(distances, vec![-1.0, 0.0, 1.0, -2.0]);
    assert_eq!(portions, vec![0.0, 1.0, 0.0, 0.0]);
    assert_eq!(details.progress_track, 0.25);
}

#[test]
fn geometry_wraps_around_the_ends() {
    let details = compute_details(4, 3.75);

    assert_eq!(details.positions[0].distance, 0.25);
    assert_eq!(details.positions[0].portion, 0.75);
    assert_eq!(details.positions[3].distance, -0.75);
    assert_eq!(details.positions[3].portion, 0.25);
    assert!((details.progress_track - 0.9375).abs() < 1e-6);
}

#[test]
fn empty_slider_geometry_is_empty() {
    let details = compute_details(0, 0.0);
    assert!(details.positions.is_empty());
    assert_eq!(details.progress_track, 0.0);
}

#[test]
fn dragging_moves_the_track_immediately() {
    let runtime = runtime();
    let slider = Slider::new(runtime.handle(), 4, 2);

    assert_eq!(slider.position(), 2.0);

    slider.drag_start();
    slider.drag_by(0.5);
    assert_eq!(slider.position(), 2.5);
}

#[test]
fn drag_deltas_are_ignored_while_not_dragging() {
    let runtime = runtime();
    let slider = Slider::new(runtime.handle(), 4, 0);

    slider.drag_by(1.0);
    assert_eq!(slider.position(), 0.0);
}

#[test]
fn releasing_snaps_to_the_nearest_slide() {
    let runtime = runtime();
    let slider = Slider::new(runtime.handle(), 4, 1);

    slider.drag_start();
    slider.drag_by(0.3);
    slider.drag_end();
    assert!(!slider.is_dragging());

    let frames = pump(&runtime, 600);
    assert!(frames < 600, "snap never settled");
    assert_eq!(slider.position(), 1.0);
}

#[test]
fn move_callback_fires_on_every_track_change() {
    let runtime = runtime();
    let slider = Slider::new(runtime.handle(), 4, 0);
    let observed = Rc::new(RefCell::new(Vec::new()));

    slider.on_move({
        let observed = Rc::clone(&observed);
        move |details: &SliderDetails| observed.borrow_mut().push(details.progress_track)
    });

    slider.drag_start();
    slider.drag_by(1.0);
    slider.drag_by(1.0);

    // drag_start freezes the track (one publish), then each delta
    // publishes once.
    assert_eq!(&*observed.borrow(), &[0.0, 0.25, 0.5]);
}

#[test]
fn emit_applies_the_current_geometry() {
    let runtime = runtime();
    let slider = Slider::new(runtime.handle(), 4, 1);
    let observed = Rc::new(RefCell::new(None));

    slider.on_move({
        let observed = Rc::clone(&observed);
        move |details: &SliderDetails| *observed.borrow_mut() = Some(details.clone())
    });

    assert!(observed.borrow().is_none());
    slider.emit();
    assert_eq!(observed.borrow().as_ref().unwrap().progress_track, 0.25);
}
