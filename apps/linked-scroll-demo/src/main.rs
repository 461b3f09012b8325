use anyhow::Context;
use linked_scroll_demo::{LinkedScrollScreen, ScreenConfig};
use linkscroll_core::DefaultScheduler;
use std::sync::Arc;

/// Finger positions per frame: a slow upward drag, a fling-sized flick, then
/// a drag back down.
const DRAG_SCRIPT: &[(f32, usize)] = &[(-12.0, 40), (-90.0, 6), (25.0, 30)];

fn main() -> anyhow::Result<()> {
    #[cfg(feature = "logging")]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let screen = LinkedScrollScreen::new(ScreenConfig::default(), Arc::new(DefaultScheduler))
        .context("building linked scroll screen")?;

    let mut frame = 0usize;
    for &(dy, frames) in DRAG_SCRIPT {
        for _ in 0..frames {
            let result = screen.drag_grid(dy);
            let snapshot = screen.frame();
            frame += 1;
            if frame % 10 == 0 || result.unconsumed.y != 0.0 {
                log::info!(
                    "frame {frame}: drag {dy}, grid {:.1}, list {:.1} (item {}), residual {:.1}",
                    snapshot.grid_offset,
                    snapshot.outer_offset,
                    snapshot.outer_first_visible_item,
                    result.unconsumed.y
                );
            }
        }
    }

    let snapshot = screen.snapshot();
    let stats = screen.forwarding_stats();
    println!(
        "after {frame} frames: grid at {:.1}, list at {:.1}; {} samples intercepted, {} applied, {} coalesced",
        snapshot.grid_offset,
        snapshot.outer_offset,
        stats.intercepted,
        stats.applied,
        stats.coalesced
    );
    Ok(())
}
