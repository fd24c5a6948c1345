//! Advancing the listing to the next page of results.
//!
//! Running out of pages is the expected terminal condition of a crawl,
//! not an error: a missing next-page control and any other fault while
//! advancing both end the page loop, so a crawl always completes with
//! whatever it has extracted.

use std::time::Duration;

use serde::Deserialize;

use crate::crawler::page::{activate_next_button, JobsPage, PageError};
use crate::job_state::ProgressSink;

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationTuning {
    /// Bounded wait for the next-page control to appear.
    #[serde(default = "default_next_button_timeout_ms")]
    pub next_button_timeout_ms: u64,
    /// Pause after scrolling the control into view, before clicking.
    #[serde(default = "default_pre_click_pause_ms")]
    pub pre_click_pause_ms: u64,
    /// Settle after the click while the next page renders.
    #[serde(default = "default_post_click_settle_ms")]
    pub post_click_settle_ms: u64,
    /// Downward scroll after the transition, nudging lazy render awake.
    #[serde(default = "default_post_scroll_px")]
    pub post_scroll_px: i64,
    #[serde(default = "default_post_scroll_pause_ms")]
    pub post_scroll_pause_ms: u64,
}

fn default_next_button_timeout_ms() -> u64 {
    10_000
}
fn default_pre_click_pause_ms() -> u64 {
    1_000
}
fn default_post_click_settle_ms() -> u64 {
    4_000
}
fn default_post_scroll_px() -> i64 {
    500
}
fn default_post_scroll_pause_ms() -> u64 {
    3_000
}

impl Default for PaginationTuning {
    fn default() -> Self {
        Self {
            next_button_timeout_ms: default_next_button_timeout_ms(),
            pre_click_pause_ms: default_pre_click_pause_ms(),
            post_click_settle_ms: default_post_click_settle_ms(),
            post_scroll_px: default_post_scroll_px(),
            post_scroll_pause_ms: default_post_scroll_pause_ms(),
        }
    }
}

/// Try to advance to the next page.
///
/// Returns the new page number on success, or `None` when pagination is
/// exhausted — either because no next-page control appeared within the
/// wait, or because advancing faulted (logged, treated the same).
pub fn go_to_next_page<P: JobsPage + ?Sized>(
    page: &P,
    current_page: u32,
    tuning: &PaginationTuning,
    sink: &dyn ProgressSink,
) -> Option<u32> {
    sink.log(&format!("Attempting to go to page {}...", current_page + 1));
    match advance(page, tuning) {
        Ok(()) => {
            sink.log("Next button clicked");
            Some(current_page + 1)
        }
        Err(PageError::Timeout(_)) => {
            sink.log("No 'Next' button, end of pagination");
            None
        }
        Err(e) => {
            sink.log(&format!("Error clicking next: {}", e));
            None
        }
    }
}

fn advance<P: JobsPage + ?Sized>(page: &P, tuning: &PaginationTuning) -> Result<(), PageError> {
    page.wait_for_next_button(Duration::from_millis(tuning.next_button_timeout_ms))?;
    page.scroll_next_button_into_view()?;
    std::thread::sleep(Duration::from_millis(tuning.pre_click_pause_ms));

    activate_next_button(page)?;

    std::thread::sleep(Duration::from_millis(tuning.post_click_settle_ms));
    page.scroll_by(tuning.post_scroll_px)?;
    std::thread::sleep(Duration::from_millis(tuning.post_scroll_pause_ms));
    Ok(())
}
