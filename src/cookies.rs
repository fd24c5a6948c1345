//! Netscape cookie-export parsing and session injection.
//!
//! The export format is tab-delimited: domain, host-only flag, path,
//! secure flag, expiry, name, value. Comment and blank lines are skipped,
//! as is any line with fewer than seven fields.

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::crawler::page::{JobsPage, PageError};
use crate::job_state::ProgressSink;
use crate::models::{Cookie, SameSite};

/// Parse raw cookie-export text into structured cookies.
///
/// Malformed lines produce no cookie rather than an error. The leading
/// dot on the domain column is stripped, and an expiry of "0" (or one
/// that fails to parse) yields a session cookie with no expiry.
pub fn parse_cookie_export(text: &str) -> Vec<Cookie> {
    let mut cookies = Vec::new();
    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 7 {
            continue;
        }
        let (domain, _host_only, path, secure, expiry, name, value) = (
            parts[0], parts[1], parts[2], parts[3], parts[4], parts[5], parts[6],
        );
        let expiry = match expiry {
            "0" => None,
            raw => raw.parse::<i64>().ok(),
        };
        cookies.push(Cookie {
            name: name.trim().to_string(),
            value: value.trim().to_string(),
            domain: domain.trim_start_matches('.').to_string(),
            path: path.to_string(),
            secure: secure.eq_ignore_ascii_case("true"),
            // The export's flag column is host-only, not HttpOnly; the
            // browser re-derives both on injection.
            http_only: false,
            same_site: SameSite::Lax,
            expiry,
        });
    }
    cookies
}

/// Resolve the cookie text for a run: explicit request text first, then
/// the conventional file in the working directory. `None` means the run
/// proceeds unauthenticated.
pub fn resolve_cookie_text(
    explicit: Option<&str>,
    cookie_file: &Path,
    sink: &dyn ProgressSink,
) -> Option<String> {
    if let Some(text) = explicit {
        return Some(text.to_string());
    }
    match fs::read_to_string(cookie_file) {
        Ok(text) => Some(text),
        Err(_) => {
            sink.log(&format!(
                "Cookie file {} not found, proceeding unauthenticated (log in manually first)",
                cookie_file.display()
            ));
            None
        }
    }
}

/// Settle delays around cookie injection.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CookieTuning {
    #[serde(default = "default_pre_inject_ms")]
    pub pre_inject_ms: u64,
    #[serde(default = "default_post_reload_ms")]
    pub post_reload_ms: u64,
}

fn default_pre_inject_ms() -> u64 {
    3_000
}
fn default_post_reload_ms() -> u64 {
    4_000
}

impl Default for CookieTuning {
    fn default() -> Self {
        Self {
            pre_inject_ms: default_pre_inject_ms(),
            post_reload_ms: default_post_reload_ms(),
        }
    }
}

/// Inject cookies into an already-launched session and reload so the
/// page reflects the authenticated state.
///
/// A cookie rejected by the browser (domain/path mismatch with the
/// current page) is skipped without aborting the batch. Returns how many
/// cookies the session accepted.
pub fn apply_cookies<P: JobsPage + ?Sized>(
    page: &P,
    home_url: &str,
    text: &str,
    tuning: &CookieTuning,
    sink: &dyn ProgressSink,
) -> Result<usize, PageError> {
    page.navigate(home_url)?;
    std::thread::sleep(Duration::from_millis(tuning.pre_inject_ms));

    let cookies = parse_cookie_export(text);
    let mut added = 0usize;
    for cookie in &cookies {
        if page.apply_cookie(cookie).is_ok() {
            added += 1;
        }
    }
    sink.log(&format!(
        "Cookies loaded ({} of {} entries accepted)",
        added,
        cookies.len()
    ));

    page.reload()?;
    std::thread::sleep(Duration::from_millis(tuning.post_reload_ms));
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_LINE: &str =
        ".linkedin.com\tTRUE\t/\tTRUE\t1789999999\tli_at\tAQEDAxxxx";

    #[test]
    fn parses_well_formed_line() {
        let cookies = parse_cookie_export(VALID_LINE);
        assert_eq!(cookies.len(), 1);
        let c = &cookies[0];
        assert_eq!(c.name, "li_at");
        assert_eq!(c.value, "AQEDAxxxx");
        assert_eq!(c.domain, "linkedin.com");
        assert_eq!(c.path, "/");
        assert!(c.secure);
        assert!(!c.http_only);
        assert_eq!(c.same_site, SameSite::Lax);
        assert_eq!(c.expiry, Some(1789999999));
    }

    #[test]
    fn skips_comments_blanks_and_short_lines() {
        let text = format!(
            "# Netscape HTTP Cookie File\n\nbad\tline\n{}\n",
            VALID_LINE
        );
        assert_eq!(parse_cookie_export(&text).len(), 1);
    }

    #[test]
    fn line_with_six_fields_is_skipped() {
        let text = ".linkedin.com\tTRUE\t/\tTRUE\t0\tli_at";
        assert!(parse_cookie_export(text).is_empty());
    }

    #[test]
    fn zero_expiry_means_session_cookie() {
        let text = ".linkedin.com\tTRUE\t/\tFALSE\t0\tbcookie\tv=2";
        let cookies = parse_cookie_export(text);
        assert_eq!(cookies[0].expiry, None);
        assert!(!cookies[0].secure);
    }

    #[test]
    fn unparsable_expiry_means_session_cookie() {
        let text = ".linkedin.com\tTRUE\t/\tTRUE\tnever\tbcookie\tv=2";
        assert_eq!(parse_cookie_export(text)[0].expiry, None);
    }

    #[test]
    fn domain_without_leading_dot_is_kept_verbatim() {
        let text = "www.linkedin.com\tFALSE\t/\tTRUE\t0\tJSESSIONID\tajax:123";
        assert_eq!(parse_cookie_export(text)[0].domain, "www.linkedin.com");
    }

    #[test]
    fn secure_flag_is_case_insensitive() {
        let text = ".linkedin.com\tTRUE\t/\ttrue\t0\tli_at\tv";
        assert!(parse_cookie_export(text)[0].secure);
    }
}
