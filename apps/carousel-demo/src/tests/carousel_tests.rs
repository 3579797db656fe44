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

fn assert_close(actual: f32, expected: f32, what: &str) {
    assert!(
        (actual - expected).abs() < 1e-5,
        "{what}: expected {expected}, got {actual}"
    );
}

#[test]
fn initial_frame_matches_the_initial_slide() {
    let runtime = runtime();
    let app = CarouselApp::new(runtime.handle());

    // Track starts on slide 1, so slide 1 is centered and fully visible.
    let transforms = app.slide_transforms();
    assert_eq!(transforms.len(), IMAGES.len());

    assert_close(transforms[0].translate_x, -50.0, "slide 0 x");
    assert_close(transforms[1].translate_x, 0.0, "slide 1 x");
    assert_close(transforms[2].translate_x, 50.0, "slide 2 x");
    assert_close(transforms[3].translate_x, -100.0, "slide 3 x");

    assert_close(transforms[1].scale, 1.0, "centered slide scale");
    assert_close(transforms[1].opacity, 1.0, "centered slide opacity");
    assert_close(transforms[0].scale, 0.7, "off-screen slide scale");
    assert_close(transforms[0].opacity, 0.0, "off-screen slide opacity");

    assert_close(app.progress(), 0.25, "progress");
}

#[test]
fn dragging_updates_every_binding_synchronously() {
    let runtime = runtime();
    let app = CarouselApp::new(runtime.handle());

    app.slider().drag_start();
    app.slider().drag_by(1.0);

    // Slide 2 is centered now; no frame pumping was needed because the
    // writer jumps immediately.
    let transforms = app.slide_transforms();
    assert_close(transforms[2].translate_x, 0.0, "slide 2 x");
    assert_close(transforms[2].scale, 1.0, "slide 2 scale");
    assert_close(transforms[2].opacity, 1.0, "slide 2 opacity");
    assert_close(transforms[1].translate_x, -50.0, "slide 1 x");
    assert_close(app.progress(), 0.5, "progress");
}

#[test]
fn releasing_snaps_and_settles_on_a_whole_slide() {
    let runtime = runtime();
    let app = CarouselApp::new(runtime.handle());

    app.slider().drag_start();
    app.slider().drag_by(0.6);
    app.slider().drag_end();

    let frames = pump(&runtime, 600);
    assert!(frames < 600, "snap never settled");

    assert_eq!(app.slider().position(), 2.0);
    let transforms = app.slide_transforms();
    assert_close(transforms[2].translate_x, 0.0, "centered slide x");
    assert_close(transforms[2].opacity, 1.0, "centered slide opacity");
    assert_close(app.progress(), 0.5, "progress");
}

#[test]
fn snap_interpolates_through_intermediate_frames() {
    let runtime = runtime();
    let app = CarouselApp::new(runtime.handle());
    let handle = runtime.handle();

    app.slider().drag_start();
    app.slider().drag_by(0.5);
    app.slider().drag_end();

    let mut frame_time = 0u64;
    let mut saw_midpoint = false;
    for _ in 0..600 {
        if !runtime.needs_frame() {
            break;
        }
        frame_time += 16_666_667;
        handle.drain_frame_callbacks(frame_time);
        handle.drain_ui();
        let position = app.slider().position();
        if position > 1.5 && position < 2.0 {
            saw_midpoint = true;
        }
    }

    assert!(saw_midpoint, "snap should report intermediate positions");
    assert_eq!(app.slider().position(), 2.0);
}
