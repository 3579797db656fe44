//! Carousel wiring: slider move events drive the animated bindings.

use coil_animated_value::{AnimatedValue, AnimatedValues, Value};
use coil_core::RuntimeHandle;

use crate::slider::Slider;

pub const IMAGES: [&str; 4] = [
    "https://source.unsplash.com/featured/1600x900/?nature,1",
    "https://source.unsplash.com/featured/1600x900/?nature,2",
    "https://source.unsplash.com/featured/1600x900/?nature,3",
    "https://source.unsplash.com/featured/1600x900/?nature,4",
];

/// Visual state of one slide, read back from its binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideTransform {
    /// Horizontal translation in percent of the slide width.
    pub translate_x: f32,
    pub scale: f32,
    pub opacity: f32,
}

impl SlideTransform {
    /// CSS-style transform string, the way a web renderer would apply it.
    pub fn css(&self) -> String {
        format!(
            "translate3d({:.1}%, 0, 0) scale({:.3})",
            self.translate_x, self.scale
        )
    }
}

pub struct CarouselApp {
    slider: Slider,
    progress: AnimatedValue,
    slides: AnimatedValues,
}

impl CarouselApp {
    pub fn new(runtime: RuntimeHandle) -> Self {
        let progress = AnimatedValue::new(runtime.clone(), 0.0f32);
        let slides = AnimatedValues::new(runtime.clone(), IMAGES.len(), |_| {
            Value::record([("x", 0.0), ("scale", 1.0), ("opacity", 1.0)])
        });
        let slider = Slider::new(runtime, IMAGES.len(), 1);

        slider.on_move({
            let progress = progress.clone();
            let slides = slides.clone();
            move |details| {
                progress.set(details.progress_track);
                slides.set(|index| {
                    let position = &details.positions[index];
                    Value::record([
                        ("x", position.distance * 50.0),
                        ("scale", 0.7 + 0.3 * position.portion),
                        ("opacity", position.portion),
                    ])
                });
            }
        });
        // Apply the initial geometry so the first frame matches the track.
        slider.emit();

        Self {
            slider,
            progress,
            slides,
        }
    }

    pub fn slider(&self) -> &Slider {
        &self.slider
    }

    /// Progress bar fill, `0.0` to `1.0`.
    pub fn progress(&self) -> f32 {
        self.progress
            .get()
            .as_scalar()
            .expect("progress binding holds a scalar")
    }

    pub fn slide_transforms(&self) -> Vec<SlideTransform> {
        self.slides
            .values()
            .iter()
            .map(|value| SlideTransform {
                translate_x: value.field("x").expect("slide record has x"),
                scale: value.field("scale").expect("slide record has scale"),
                opacity: value.field("opacity").expect("slide record has opacity"),
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/carousel_tests.rs"]
mod tests;
