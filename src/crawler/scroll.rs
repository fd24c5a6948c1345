//! Convergence-based loading of a virtualized, lazily-rendered card list.
//!
//! The listing page gives no "everything is loaded" signal, so the only
//! workable criterion is stability: keep scrolling the last card into
//! view until the visible count stops growing for enough consecutive
//! reads. The stagnation threshold absorbs render jitter (same-count
//! reads that are not true convergence); the iteration cap bounds
//! worst-case latency when the list keeps growing.

use std::time::Duration;

use serde::Deserialize;

use crate::crawler::page::{JobsPage, PageError};
use crate::job_state::ProgressSink;

#[derive(Debug, Clone, Deserialize)]
pub struct ScrollTuning {
    /// Hard cap on scroll iterations.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Consecutive non-increasing count reads that mean convergence.
    #[serde(default = "default_stagnation_threshold")]
    pub stagnation_threshold: usize,
    /// Wait for the first card to appear.
    #[serde(default = "default_first_card_timeout_ms")]
    pub first_card_timeout_ms: u64,
    /// Settle after the first card shows up.
    #[serde(default = "default_initial_settle_ms")]
    pub initial_settle_ms: u64,
    /// Pause between scroll and re-count, letting lazy render finish.
    #[serde(default = "default_render_pause_ms")]
    pub render_pause_ms: u64,
    /// Pause before retrying when the list is momentarily empty.
    #[serde(default = "default_empty_list_pause_ms")]
    pub empty_list_pause_ms: u64,
    /// Upward nudge after scrolling the last card into view, keeping the
    /// viewport inside the lazy-load trigger zone.
    #[serde(default = "default_nudge_px")]
    pub nudge_px: i64,
}

fn default_max_iterations() -> usize {
    300
}
fn default_stagnation_threshold() -> usize {
    12
}
fn default_first_card_timeout_ms() -> u64 {
    30_000
}
fn default_initial_settle_ms() -> u64 {
    3_000
}
fn default_render_pause_ms() -> u64 {
    2_800
}
fn default_empty_list_pause_ms() -> u64 {
    3_000
}
fn default_nudge_px() -> i64 {
    120
}

impl Default for ScrollTuning {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            stagnation_threshold: default_stagnation_threshold(),
            first_card_timeout_ms: default_first_card_timeout_ms(),
            initial_settle_ms: default_initial_settle_ms(),
            render_pause_ms: default_render_pause_ms(),
            empty_list_pause_ms: default_empty_list_pause_ms(),
            nudge_px: default_nudge_px(),
        }
    }
}

/// Scroll until the visible card count converges, then return it.
///
/// Terminates when the stagnation counter reaches the threshold or the
/// iteration cap is exhausted, whichever comes first. Fails only when
/// no card ever appears or the page itself faults.
pub fn load_all_cards<P: JobsPage + ?Sized>(
    page: &P,
    tuning: &ScrollTuning,
    sink: &dyn ProgressSink,
) -> Result<usize, PageError> {
    sink.log("Scrolling to load all visible jobs...");
    page.wait_for_cards(Duration::from_millis(tuning.first_card_timeout_ms))?;
    std::thread::sleep(Duration::from_millis(tuning.initial_settle_ms));

    let mut stagnant = 0usize;
    for _ in 0..tuning.max_iterations {
        let current = page.card_count()?;
        if current == 0 {
            std::thread::sleep(Duration::from_millis(tuning.empty_list_pause_ms));
            continue;
        }

        page.scroll_last_card_into_view()?;
        page.scroll_by(-tuning.nudge_px)?;
        std::thread::sleep(Duration::from_millis(tuning.render_pause_ms));

        let fresh = page.card_count()?;
        if fresh > current {
            sink.log(&format!("  +{} new jobs, total {}", fresh - current, fresh));
            stagnant = 0;
        } else {
            stagnant += 1;
            sink.log(&format!(
                "  No new jobs ({}/{})",
                stagnant, tuning.stagnation_threshold
            ));
        }

        if stagnant >= tuning.stagnation_threshold {
            sink.log("No more jobs loading, page fully loaded");
            break;
        }
    }

    let final_count = page.card_count()?;
    sink.log(&format!("Page fully loaded, {} jobs visible", final_count));
    Ok(final_count)
}
