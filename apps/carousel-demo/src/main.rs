use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use carousel_demo::app::CarouselApp;
use coil_core::{DefaultScheduler, Runtime};
use web_time::Instant;

const MAX_FRAMES: usize = 600;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    println!("=== Coil carousel demo ===");
    println!("Four slides driven through animated-value bindings:");
    println!("  - dragging moves every slide with immediate writes");
    println!("  - releasing snaps the track to the nearest slide");
    println!("  - the progress bar mirrors the looped track position");
    println!();

    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let handle = runtime.handle();
    let app = CarouselApp::new(handle.clone());

    // Scripted interaction: drag one and a half slides over ~30 frames,
    // then release and let the track snap.
    {
        let slider = app.slider().clone();
        let clock = runtime.frame_clock();
        handle.spawn_ui(async move {
            slider.drag_start();
            for _ in 0..30 {
                clock.next_frame().await;
                slider.drag_by(0.05);
            }
            slider.drag_end();
            log::info!("released at position {:.2}", slider.position());
        });
    }

    let start = Instant::now();
    let mut frames = 0usize;
    while runtime.needs_frame() && frames < MAX_FRAMES {
        std::thread::sleep(Duration::from_millis(16));
        handle.drain_frame_callbacks(start.elapsed().as_nanos() as u64);
        handle.drain_ui();
        frames += 1;

        if frames % 15 == 0 {
            log::info!(
                "frame {:>3}: position={:.3} progress={:.3}",
                frames,
                app.slider().position(),
                app.progress()
            );
        }
        for (index, transform) in app.slide_transforms().iter().enumerate() {
            log::debug!(
                "  slide {index}: {} opacity={:.3}",
                transform.css(),
                transform.opacity
            );
        }
    }

    println!();
    println!("settled after {frames} frames:");
    println!("  position: {:.3}", app.slider().position());
    println!("  progress: {:.3}", app.progress());
    for (index, transform) in app.slide_transforms().iter().enumerate() {
        println!(
            "  slide {index} <img src=\"{}\"> {} opacity={:.3}",
            carousel_demo::app::IMAGES[index],
            transform.css(),
            transform.opacity
        );
    }

    Ok(())
}
