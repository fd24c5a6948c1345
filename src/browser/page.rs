//! Chrome-backed implementation of the crawl's [`JobsPage`] seam.
//!
//! DOM reads go through JavaScript evaluation on the tab; waits are
//! bounded polling loops. The direct click path uses the devtools input
//! events on the resolved element, and the forced variant dispatches a
//! programmatic `.click()` that bypasses hit-testing, which is the
//! fallback when an overlay intercepts the direct click.

use std::sync::Arc;
use std::time::{Duration, Instant};

use headless_chrome::protocol::cdp::Network::{CookieParam, CookieSameSite};
use headless_chrome::Tab;
use serde_json::Value;

use crate::crawler::page::{JobsPage, PageError};
use crate::models::{Cookie, SameSite};

/// One rendered listing summary element.
pub const CARD_SELECTOR: &str = ".job-card-container--clickable";
/// The pagination control at the bottom of the list.
pub const NEXT_BUTTON_SELECTOR: &str = "button.jobs-search-pagination__button--next";

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct ChromeJobsPage {
    tab: Arc<Tab>,
}

impl ChromeJobsPage {
    pub fn new(tab: Arc<Tab>) -> Self {
        Self { tab }
    }

    fn eval(&self, script: &str) -> Result<Option<Value>, PageError> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| PageError::Script(e.to_string()))?;
        Ok(result.value)
    }

    fn eval_string(&self, script: &str, what: &str) -> Result<String, PageError> {
        match self.eval(script)? {
            Some(Value::String(s)) => Ok(s),
            _ => Err(PageError::NotFound(what.to_string())),
        }
    }

    /// Poll until `script` evaluates to true or the timeout elapses.
    fn wait_for_truthy(
        &self,
        script: &str,
        what: &str,
        timeout: Duration,
    ) -> Result<(), PageError> {
        let start = Instant::now();
        loop {
            if let Ok(Some(value)) = self.eval(script) {
                if value.as_bool() == Some(true) {
                    return Ok(());
                }
            }
            if start.elapsed() > timeout {
                return Err(PageError::Timeout(what.to_string()));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    /// Resolve an element and click it with real input events.
    fn native_click(&self, selector: &str, index: usize) -> Result<(), PageError> {
        let elements = self
            .tab
            .find_elements(selector)
            .map_err(|e| PageError::NotFound(format!("{}: {}", selector, e)))?;
        let element = elements
            .get(index)
            .ok_or_else(|| PageError::NotFound(format!("{}[{}]", selector, index)))?;
        // A failed input-event click is most commonly an overlapping
        // element swallowing the hit; report it as interception so the
        // caller can fall back to the programmatic click.
        element
            .click()
            .map(|_| ())
            .map_err(|e| PageError::ClickIntercepted(e.to_string()))
    }

    fn js_click(&self, selector: &str, index: usize) -> Result<(), PageError> {
        let script = format!(
            "(() => {{ const el = document.querySelectorAll({sel})[{index}]; \
             if (!el) return false; el.click(); return true; }})()",
            sel = js_str(selector),
            index = index,
        );
        match self.eval(&script)? {
            Some(Value::Bool(true)) => Ok(()),
            _ => Err(PageError::NotFound(format!("{}[{}]", selector, index))),
        }
    }
}

/// Embed a Rust string into generated JavaScript as a quoted literal.
fn js_str(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| String::from("\"\""))
}

impl JobsPage for ChromeJobsPage {
    fn navigate(&self, url: &str) -> Result<(), PageError> {
        self.tab
            .navigate_to(url)
            .map_err(|e| PageError::Navigation(format!("navigate to {}: {}", url, e)))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| PageError::Navigation(format!("load of {}: {}", url, e)))?;
        Ok(())
    }

    fn reload(&self) -> Result<(), PageError> {
        self.tab
            .reload(false, None)
            .map(|_| ())
            .map_err(|e| PageError::Navigation(format!("reload: {}", e)))
    }

    fn apply_cookie(&self, cookie: &Cookie) -> Result<(), PageError> {
        let same_site = match cookie.same_site {
            SameSite::Strict => CookieSameSite::Strict,
            SameSite::Lax => CookieSameSite::Lax,
            SameSite::None => CookieSameSite::None,
        };
        let param = CookieParam {
            name: cookie.name.clone(),
            value: cookie.value.clone(),
            url: None,
            domain: Some(cookie.domain.clone()),
            path: Some(cookie.path.clone()),
            secure: Some(cookie.secure),
            http_only: Some(cookie.http_only),
            same_site: Some(same_site),
            expires: cookie.expiry.map(|e| e as f64),
            priority: None,
            same_party: None,
            source_scheme: None,
            source_port: None,
            partition_key: None,
        };
        self.tab
            .set_cookies(vec![param])
            .map_err(|e| PageError::Cookie(format!("{}: {}", cookie.name, e)))
    }

    fn wait_for_cards(&self, timeout: Duration) -> Result<(), PageError> {
        let script = format!("document.querySelector({}) !== null", js_str(CARD_SELECTOR));
        self.wait_for_truthy(&script, "job cards", timeout)
    }

    fn card_count(&self) -> Result<usize, PageError> {
        let script = format!(
            "document.querySelectorAll({}).length",
            js_str(CARD_SELECTOR)
        );
        match self.eval(&script)? {
            Some(value) => value
                .as_u64()
                .map(|n| n as usize)
                .ok_or_else(|| PageError::Script("card count was not a number".into())),
            None => Ok(0),
        }
    }

    fn scroll_last_card_into_view(&self) -> Result<(), PageError> {
        let script = format!(
            "(() => {{ const cards = document.querySelectorAll({sel}); \
             if (cards.length) cards[cards.length - 1].scrollIntoView({{block: 'center'}}); }})()",
            sel = js_str(CARD_SELECTOR),
        );
        self.eval(&script).map(|_| ())
    }

    fn scroll_by(&self, dy: i64) -> Result<(), PageError> {
        self.eval(&format!("window.scrollBy(0, {});", dy)).map(|_| ())
    }

    fn card_text(&self, index: usize, selector: &str) -> Result<String, PageError> {
        let script = format!(
            "(() => {{ const card = document.querySelectorAll({cards})[{index}]; \
             if (!card) return null; const el = card.querySelector({sel}); \
             return el ? el.innerText : null; }})()",
            cards = js_str(CARD_SELECTOR),
            index = index,
            sel = js_str(selector),
        );
        self.eval_string(&script, selector)
    }

    fn card_link(&self, index: usize, selector: &str) -> Result<(String, String), PageError> {
        let script = format!(
            "(() => {{ const card = document.querySelectorAll({cards})[{index}]; \
             if (!card) return null; const a = card.querySelector({sel}); \
             return a ? JSON.stringify({{text: a.innerText, href: a.href}}) : null; }})()",
            cards = js_str(CARD_SELECTOR),
            index = index,
            sel = js_str(selector),
        );
        let raw = self.eval_string(&script, selector)?;
        let parsed: Value =
            serde_json::from_str(&raw).map_err(|e| PageError::Script(e.to_string()))?;
        let text = parsed["text"].as_str().unwrap_or_default().to_string();
        let href = parsed["href"].as_str().unwrap_or_default().to_string();
        Ok((text, href))
    }

    fn scroll_card_into_view(&self, index: usize) -> Result<(), PageError> {
        let script = format!(
            "(() => {{ const card = document.querySelectorAll({cards})[{index}]; \
             if (card) card.scrollIntoView({{block: 'center'}}); }})()",
            cards = js_str(CARD_SELECTOR),
            index = index,
        );
        self.eval(&script).map(|_| ())
    }

    fn click_card(&self, index: usize) -> Result<(), PageError> {
        self.native_click(CARD_SELECTOR, index)
    }

    fn force_click_card(&self, index: usize) -> Result<(), PageError> {
        self.js_click(CARD_SELECTOR, index)
    }

    fn detail_text(&self, selector: &str) -> Result<String, PageError> {
        let script = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             return el ? el.innerText : null; }})()",
            sel = js_str(selector),
        );
        self.eval_string(&script, selector)
    }

    fn detail_link_href(
        &self,
        section_selector: &str,
        href_marker: &str,
    ) -> Result<String, PageError> {
        let script = format!(
            "(() => {{ const section = document.querySelector({sel}); \
             if (!section) return null; \
             const a = Array.from(section.querySelectorAll('a')) \
                 .find(a => a.href.includes({marker})); \
             return a ? a.href : null; }})()",
            sel = js_str(section_selector),
            marker = js_str(href_marker),
        );
        self.eval_string(&script, section_selector)
    }

    fn wait_for_next_button(&self, timeout: Duration) -> Result<(), PageError> {
        let script = format!(
            "(() => {{ const b = document.querySelector({sel}); \
             return b !== null && !b.disabled; }})()",
            sel = js_str(NEXT_BUTTON_SELECTOR),
        );
        self.wait_for_truthy(&script, "next page button", timeout)
    }

    fn scroll_next_button_into_view(&self) -> Result<(), PageError> {
        let script = format!(
            "(() => {{ const b = document.querySelector({sel}); \
             if (b) b.scrollIntoView({{block: 'center'}}); }})()",
            sel = js_str(NEXT_BUTTON_SELECTOR),
        );
        self.eval(&script).map(|_| ())
    }

    fn click_next_button(&self) -> Result<(), PageError> {
        self.native_click(NEXT_BUTTON_SELECTOR, 0)
    }

    fn force_click_next_button(&self) -> Result<(), PageError> {
        self.js_click(NEXT_BUTTON_SELECTOR, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_str_quotes_and_escapes() {
        assert_eq!(js_str("a.b"), "\"a.b\"");
        assert_eq!(js_str("a'b\"c"), "\"a'b\\\"c\"");
    }
}
