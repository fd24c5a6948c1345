use serde::{Deserialize, Serialize};

/// SameSite policy carried on an injected cookie.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

/// One cookie parsed from a Netscape-format export line.
///
/// The leading dot of the export's domain column is stripped, and the
/// expiry is absent for session cookies (raw expiry "0" or unparsable).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub expiry: Option<i64>,
}

/// One extracted job posting.
///
/// Field order matches the exported CSV column order. Every field except
/// the reference index defaults to an empty string when its extraction
/// step fails; a record is never dropped because a field is missing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct JobRecord {
    #[serde(rename = "REF")]
    pub reference: usize,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Company industry")]
    pub company_industry: String,
    #[serde(rename = "Number of employee")]
    pub employee_count: String,
    #[serde(rename = "Company description")]
    pub company_description: String,
    #[serde(rename = "Job Title")]
    pub job_title: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Recruiter name")]
    pub recruiter_name: String,
    #[serde(rename = "Recruiter URL profile")]
    pub recruiter_profile_url: String,
    #[serde(rename = "Recruiter presentation")]
    pub recruiter_presentation: String,
    #[serde(rename = "Job description")]
    pub job_description: String,
    #[serde(rename = "Job URL")]
    pub job_url: String,
}

impl JobRecord {
    /// A record with the given global reference index and every other
    /// field at its empty default.
    pub fn empty(reference: usize) -> Self {
        Self {
            reference,
            company: String::new(),
            company_industry: String::new(),
            employee_count: String::new(),
            company_description: String::new(),
            job_title: String::new(),
            location: String::new(),
            recruiter_name: String::new(),
            recruiter_profile_url: String::new(),
            recruiter_presentation: String::new(),
            job_description: String::new(),
            job_url: String::new(),
        }
    }
}

/// JSON body accepted by the scrape endpoints.
#[derive(Debug, Deserialize, Clone)]
pub struct ScrapeRequest {
    pub search_url: String,
    pub max_pages: Option<u32>,
    pub cookie_text: Option<String>,
}

pub const DEFAULT_MAX_PAGES: u32 = 50;

/// Immutable input to one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub search_url: String,
    pub max_pages: u32,
    pub cookie_text: Option<String>,
}

impl From<ScrapeRequest> for CrawlConfig {
    fn from(req: ScrapeRequest) -> Self {
        Self {
            search_url: req.search_url,
            max_pages: req.max_pages.unwrap_or(DEFAULT_MAX_PAGES).max(1),
            cookie_text: req.cookie_text,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStatus {
    Ok,
    Error,
}

/// Terminal outcome of one crawl run.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    pub status: CrawlStatus,
    pub total_jobs: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CrawlResult {
    pub fn ok(total_jobs: usize, file: String) -> Self {
        Self {
            status: CrawlStatus::Ok,
            total_jobs,
            file: Some(file),
            detail: None,
        }
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            status: CrawlStatus::Error,
            total_jobs: 0,
            file: None,
            detail: Some(detail.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crawl_config_defaults_max_pages() {
        let req = ScrapeRequest {
            search_url: "https://example/jobs".into(),
            max_pages: None,
            cookie_text: None,
        };
        let cfg = CrawlConfig::from(req);
        assert_eq!(cfg.max_pages, DEFAULT_MAX_PAGES);
    }

    #[test]
    fn crawl_config_clamps_zero_pages() {
        let req = ScrapeRequest {
            search_url: "https://example/jobs".into(),
            max_pages: Some(0),
            cookie_text: None,
        };
        assert_eq!(CrawlConfig::from(req).max_pages, 1);
    }

    #[test]
    fn result_serializes_status_lowercase() {
        let json = serde_json::to_value(CrawlResult::ok(3, "jobs.csv".into())).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["total_jobs"], 3);
        assert!(json.get("detail").is_none());
    }
}
