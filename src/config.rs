use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::browser::BrowserConfig;
use crate::crawler::CrawlTuning;

/// Service configuration, read from `config.toml` in the working
/// directory when present, otherwise all defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory where crawl artifacts are written and served from.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Conventional cookie-export file consulted when a request carries
    /// no cookie text.
    #[serde(default = "default_cookie_file")]
    pub cookie_file: String,

    /// Site origin navigated to before cookie injection.
    #[serde(default = "default_home_url")]
    pub home_url: String,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub crawl: CrawlTuning,
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_cookie_file() -> String {
    "LINKEDIN_COOKIES.txt".to_string()
}

fn default_home_url() -> String {
    "https://www.linkedin.com".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            cookie_file: default_cookie_file(),
            home_url: default_home_url(),
            browser: BrowserConfig::default(),
            crawl: CrawlTuning::default(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let path = Path::new("config.toml");
        if path.exists() {
            if let Ok(content) = fs::read_to_string(path) {
                if let Ok(cfg) = toml::from_str::<Config>(&content) {
                    return cfg;
                }
            }
        }
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_knob() {
        let cfg = Config::default();
        assert_eq!(cfg.cookie_file, "LINKEDIN_COOKIES.txt");
        assert_eq!(cfg.crawl.scroll.stagnation_threshold, 12);
        assert_eq!(cfg.crawl.scroll.max_iterations, 300);
        assert_eq!(cfg.crawl.pagination.next_button_timeout_ms, 10_000);
        assert!(cfg.browser.headless);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: Config = toml::from_str(
            "output_dir = \"artifacts\"\n\n[crawl.scroll]\nstagnation_threshold = 3\n",
        )
        .unwrap();
        assert_eq!(cfg.output_dir, "artifacts");
        assert_eq!(cfg.crawl.scroll.stagnation_threshold, 3);
        assert_eq!(cfg.crawl.scroll.max_iterations, 300);
        assert_eq!(cfg.home_url, "https://www.linkedin.com");
    }
}
