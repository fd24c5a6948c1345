//! One crawl session: authenticate, then loop scroll, extract and
//! paginate until pagination runs out or the page limit is reached, and
//! finalize the accumulated records into a CSV artifact.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::browser::{BrowserError, BrowserManager, ChromeJobsPage};
use crate::config::Config;
use crate::cookies::{self, CookieTuning};
use crate::crawler::extract::{extract_job, ExtractTuning};
use crate::crawler::page::{JobsPage, PageError};
use crate::crawler::pagination::{go_to_next_page, PaginationTuning};
use crate::crawler::scroll::{load_all_cards, ScrollTuning};
use crate::export::{self, ExportError};
use crate::job_state::{JobHandle, ProgressSink};
use crate::models::{CrawlConfig, CrawlResult, JobRecord};

#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),
    #[error("page error: {0}")]
    Page(#[from] PageError),
    #[error("export error: {0}")]
    Export(#[from] ExportError),
}

/// All timing and iteration knobs of one crawl, grouped so tests can
/// shrink every delay to zero.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlTuning {
    #[serde(default)]
    pub scroll: ScrollTuning,
    #[serde(default)]
    pub pagination: PaginationTuning,
    #[serde(default)]
    pub extract: ExtractTuning,
    #[serde(default)]
    pub cookies: CookieTuning,
    /// Settle after navigating to the search URL.
    #[serde(default = "default_initial_load_ms")]
    pub initial_load_ms: u64,
    /// Delay between pages.
    #[serde(default = "default_between_pages_ms")]
    pub between_pages_ms: u64,
}

fn default_initial_load_ms() -> u64 {
    10_000
}
fn default_between_pages_ms() -> u64 {
    5_000
}

impl Default for CrawlTuning {
    fn default() -> Self {
        Self {
            scroll: ScrollTuning::default(),
            pagination: PaginationTuning::default(),
            extract: ExtractTuning::default(),
            cookies: CookieTuning::default(),
            initial_load_ms: default_initial_load_ms(),
            between_pages_ms: default_between_pages_ms(),
        }
    }
}

/// Drive a full crawl over an already-launched page and return the
/// accumulated records.
///
/// Cookie injection is best-effort: the loop starts regardless of the
/// authentication outcome. A failure to reach the search URL itself, or
/// a page fault during scrolling, is fatal to the run.
pub fn crawl<P: JobsPage + ?Sized>(
    page: &P,
    cfg: &CrawlConfig,
    app: &Config,
    sink: &dyn ProgressSink,
) -> Result<Vec<JobRecord>, CrawlError> {
    let tuning = &app.crawl;

    authenticate(page, cfg, app, sink);

    page.navigate(&cfg.search_url)?;
    std::thread::sleep(Duration::from_millis(tuning.initial_load_ms));

    let mut records: Vec<JobRecord> = Vec::new();
    let mut page_number = 1u32;

    loop {
        sink.log(&format!("=============== PAGE {} ===============", page_number));

        load_all_cards(page, &tuning.scroll, sink)?;
        let count = page.card_count()?;
        sink.log(&format!(
            "Extracting {} jobs from page {}...",
            count, page_number
        ));

        for index in 0..count {
            let reference = records.len() + 1;
            let record = extract_job(page, index, reference, &tuning.extract);
            sink.log(&format!(
                "  {:3}. {} -> {}",
                reference,
                truncate(&record.job_title, 60),
                if record.recruiter_name.is_empty() {
                    "-"
                } else {
                    record.recruiter_name.as_str()
                }
            ));
            records.push(record);
        }

        if page_number >= cfg.max_pages {
            sink.log(&format!("Reached page limit ({}), stopping", cfg.max_pages));
            break;
        }
        match go_to_next_page(page, page_number, &tuning.pagination, sink) {
            Some(next) => {
                page_number = next;
                std::thread::sleep(Duration::from_millis(tuning.between_pages_ms));
            }
            None => {
                sink.log("No more pages, crawl finished");
                break;
            }
        }
    }

    Ok(records)
}

/// Run a crawl to completion over `page` and finalize the artifact.
pub fn run_session<P: JobsPage + ?Sized>(
    page: &P,
    cfg: &CrawlConfig,
    app: &Config,
    sink: &dyn ProgressSink,
) -> Result<CrawlResult, CrawlError> {
    let records = crawl(page, cfg, app, sink)?;
    let filename = export::write_artifact(Path::new(&app.output_dir), &records)?;
    sink.log(&format!(
        "SUCCESS: {} jobs saved to {}",
        records.len(),
        filename
    ));
    Ok(CrawlResult::ok(records.len(), filename))
}

/// Run a crawl with a real headless browser.
///
/// The browser process is owned by this function and torn down on every
/// exit path when the manager drops, success or failure.
pub fn run_with_browser(
    cfg: &CrawlConfig,
    app: &Config,
    sink: &dyn ProgressSink,
) -> Result<CrawlResult, CrawlError> {
    let manager = BrowserManager::new(app.browser.clone())?;
    let tab = manager.new_tab()?;
    tab.set_default_timeout(manager.config().timeout());
    let page = ChromeJobsPage::new(tab);
    run_session(&page, cfg, app, sink)
}

fn authenticate<P: JobsPage + ?Sized>(
    page: &P,
    cfg: &CrawlConfig,
    app: &Config,
    sink: &dyn ProgressSink,
) {
    let text = match cookies::resolve_cookie_text(
        cfg.cookie_text.as_deref(),
        Path::new(&app.cookie_file),
        sink,
    ) {
        Some(text) => text,
        None => return,
    };
    if let Err(e) = cookies::apply_cookies(page, &app.home_url, &text, &app.crawl.cookies, sink) {
        sink.log(&format!("Cookie injection failed, continuing unauthenticated: {}", e));
    }
}

/// Background-task wrapper: run the browser session and always finish
/// the job, converting any error into an error-kind result instead of
/// letting it escape the detached task.
pub fn run_background(handle: JobHandle, cfg: CrawlConfig, app: Config) {
    run_to_completion(&handle, || run_with_browser(&cfg, &app, &handle));
}

/// Run `task` and always finish the job.
///
/// Errors and panics both become error-kind results; nothing may unwind
/// past this point, or the flight slot would stay claimed and every
/// later start would be rejected.
pub fn run_to_completion<F>(handle: &JobHandle, task: F)
where
    F: FnOnce() -> Result<CrawlResult, CrawlError>,
{
    let result = match catch_unwind(AssertUnwindSafe(task)) {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            handle.log(&format!("ERROR: {}", e));
            CrawlResult::error(e.to_string())
        }
        Err(payload) => {
            let detail = panic_detail(payload.as_ref());
            handle.log(&format!("ERROR: {}", detail));
            CrawlResult::error(detail)
        }
    };
    handle.finish(result);
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "crawl task panicked".to_string()
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
