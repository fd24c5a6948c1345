//! Structured extraction of one job record from a listing card and its
//! detail panel.
//!
//! Every field read is independently isolated: a selector that matches
//! nothing leaves that field at its empty default and the record is kept
//! either way. Activating the card to populate the detail panel is
//! likewise best-effort — when it fails the card-level fields still make
//! it into the record.

use std::time::Duration;

use serde::Deserialize;

use crate::crawler::page::{activate_card, strip_query, JobsPage};
use crate::models::JobRecord;

// Card-scoped selectors.
const TITLE_LINK: &str = "a.job-card-list__title--link";
const CARD_COMPANY: &str = ".artdeco-entity-lockup__subtitle span";
const CARD_LOCATION: &str = ".job-card-container__metadata-wrapper li";

// Detail-panel selectors.
const COMPANY_META_LINE: &str = "div.t-14.mt5";
const COMPANY_DESCRIPTION: &str = "p.jobs-company__company-description";
const JOB_DESCRIPTION: &str =
    "#job-details, .jobs-box__html-content, .jobs-description-content__text";
const RECRUITER_SECTION: &str = ".job-details-people-who-can-help__section--two-pane";
const RECRUITER_NAME: &str =
    ".job-details-people-who-can-help__section--two-pane span.jobs-poster__name strong";
const RECRUITER_PRESENTATION: &str =
    ".job-details-people-who-can-help__section--two-pane div.text-body-small.t-black";
const PROFILE_HREF_MARKER: &str = "/in/";

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractTuning {
    /// Pause after scrolling a card into view, before activating it.
    #[serde(default = "default_pre_click_pause_ms")]
    pub pre_click_pause_ms: u64,
    /// Fixed settle while the detail panel renders.
    #[serde(default = "default_panel_settle_ms")]
    pub panel_settle_ms: u64,
}

fn default_pre_click_pause_ms() -> u64 {
    1_000
}
fn default_panel_settle_ms() -> u64 {
    5_000
}

impl Default for ExtractTuning {
    fn default() -> Self {
        Self {
            pre_click_pause_ms: default_pre_click_pause_ms(),
            panel_settle_ms: default_panel_settle_ms(),
        }
    }
}

/// Extract one record from the card at `index`, tagged with the global
/// 1-based `reference`. Never fails; degraded fields stay empty.
pub fn extract_job<P: JobsPage + ?Sized>(
    page: &P,
    index: usize,
    reference: usize,
    tuning: &ExtractTuning,
) -> JobRecord {
    let mut job = JobRecord::empty(reference);

    if let Ok((text, href)) = page.card_link(index, TITLE_LINK) {
        job.job_title = text.trim().to_string();
        job.job_url = strip_query(&href);
    }
    if let Ok(text) = page.card_text(index, CARD_COMPANY) {
        job.company = text.trim().to_string();
    }
    if let Ok(text) = page.card_text(index, CARD_LOCATION) {
        job.location = text.trim().to_string();
    }

    // Populate the detail panel. Activation failures only degrade the
    // panel-sourced fields below.
    let _ = page.scroll_card_into_view(index);
    std::thread::sleep(Duration::from_millis(tuning.pre_click_pause_ms));
    let _ = activate_card(page, index);
    std::thread::sleep(Duration::from_millis(tuning.panel_settle_ms));

    if let Ok(info) = page.detail_text(COMPANY_META_LINE) {
        let segments: Vec<&str> = info.split('·').collect();
        if let Some(first) = segments.first() {
            job.company_industry = first.trim().to_string();
        }
        for segment in &segments {
            if segment.to_lowercase().contains("employee") {
                job.employee_count = segment.trim().to_string();
            }
        }
    }
    if let Ok(text) = page.detail_text(COMPANY_DESCRIPTION) {
        job.company_description = text.trim().to_string();
    }
    if let Ok(text) = page.detail_text(JOB_DESCRIPTION) {
        job.job_description = text.trim().to_string();
    }

    if let Ok(text) = page.detail_text(RECRUITER_NAME) {
        job.recruiter_name = text.trim().to_string();
    }
    if let Ok(href) = page.detail_link_href(RECRUITER_SECTION, PROFILE_HREF_MARKER) {
        job.recruiter_profile_url = strip_query(&href);
    }
    if let Ok(text) = page.detail_text(RECRUITER_PRESENTATION) {
        job.recruiter_presentation = text.trim().to_string();
    }

    job
}
