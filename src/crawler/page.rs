//! The seam between the crawl algorithms and the live browser.
//!
//! The crawl core only talks to a listing page through [`JobsPage`], so
//! the deterministic tests drive it with an in-memory fake while
//! production uses the Chrome-backed implementation in `crate::browser`.

use std::time::Duration;

use crate::models::Cookie;

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("element not found: {0}")]
    NotFound(String),

    #[error("click intercepted: {0}")]
    ClickIntercepted(String),

    #[error("timed out waiting for {0}")]
    Timeout(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("navigation error: {0}")]
    Navigation(String),

    #[error("cookie rejected: {0}")]
    Cookie(String),
}

/// Operations the crawl needs from a rendered job-listing page.
///
/// Card indices are 0-based positions in the currently visible card
/// list. Selector arguments are CSS selectors scoped inside the card
/// (for `card_*`) or the whole document (for `detail_*`).
pub trait JobsPage {
    fn navigate(&self, url: &str) -> Result<(), PageError>;
    fn reload(&self) -> Result<(), PageError>;
    fn apply_cookie(&self, cookie: &Cookie) -> Result<(), PageError>;

    /// Block until at least one card is rendered.
    fn wait_for_cards(&self, timeout: Duration) -> Result<(), PageError>;
    fn card_count(&self) -> Result<usize, PageError>;
    fn scroll_last_card_into_view(&self) -> Result<(), PageError>;
    /// Positive is down, negative is up.
    fn scroll_by(&self, dy: i64) -> Result<(), PageError>;

    fn card_text(&self, index: usize, selector: &str) -> Result<String, PageError>;
    /// Text and href of the first matching anchor inside the card.
    fn card_link(&self, index: usize, selector: &str) -> Result<(String, String), PageError>;
    fn scroll_card_into_view(&self, index: usize) -> Result<(), PageError>;
    fn click_card(&self, index: usize) -> Result<(), PageError>;
    /// Programmatic click that bypasses hit-testing.
    fn force_click_card(&self, index: usize) -> Result<(), PageError>;

    fn detail_text(&self, selector: &str) -> Result<String, PageError>;
    /// Href of the first anchor under `section_selector` whose href
    /// contains `href_marker`.
    fn detail_link_href(
        &self,
        section_selector: &str,
        href_marker: &str,
    ) -> Result<String, PageError>;

    fn wait_for_next_button(&self, timeout: Duration) -> Result<(), PageError>;
    fn scroll_next_button_into_view(&self) -> Result<(), PageError>;
    fn click_next_button(&self) -> Result<(), PageError>;
    fn force_click_next_button(&self) -> Result<(), PageError>;
}

/// Two-tier card activation: direct click first, programmatic click only
/// when the direct one is intercepted by an overlapping element.
pub fn activate_card<P: JobsPage + ?Sized>(page: &P, index: usize) -> Result<(), PageError> {
    match page.click_card(index) {
        Err(PageError::ClickIntercepted(_)) => page.force_click_card(index),
        other => other,
    }
}

/// Two-tier activation for the next-page control.
pub fn activate_next_button<P: JobsPage + ?Sized>(page: &P) -> Result<(), PageError> {
    match page.click_next_button() {
        Err(PageError::ClickIntercepted(_)) => page.force_click_next_button(),
        other => other,
    }
}

/// Drop the query string (and fragment) from an extracted href.
pub fn strip_query(href: &str) -> String {
    let base = href.split('?').next().unwrap_or(href);
    base.split('#').next().unwrap_or(base).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_query_removes_tracking_params() {
        assert_eq!(
            strip_query("https://example/jobs/view/42?refId=abc&trk=flagship"),
            "https://example/jobs/view/42"
        );
    }

    #[test]
    fn strip_query_keeps_clean_urls() {
        assert_eq!(strip_query("https://example/in/jane"), "https://example/in/jane");
        assert_eq!(strip_query(""), "");
    }
}
