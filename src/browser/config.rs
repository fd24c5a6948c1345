use std::time::Duration;

use serde::Deserialize;

/// Configuration for the headless browser instance.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Browser window width in pixels
    #[serde(default = "default_window_width")]
    pub window_width: u32,

    /// Browser window height in pixels
    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// Custom user agent
    #[serde(default = "default_user_agent")]
    pub user_agent: Option<String>,

    /// Default timeout for navigation and element waits, in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Additional Chrome flags appended to the stealth set
    #[serde(default)]
    pub chrome_flags: Vec<String>,
}

fn default_headless() -> bool {
    true
}
fn default_window_width() -> u32 {
    1920
}
fn default_window_height() -> u32 {
    1080
}
fn default_user_agent() -> Option<String> {
    Some(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36"
            .to_string(),
    )
}
fn default_timeout_seconds() -> u64 {
    30
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout_seconds(),
            chrome_flags: vec![],
        }
    }
}

impl BrowserConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!((config.window_width, config.window_height), (1920, 1080));
        assert!(config.user_agent.is_some());
    }

    #[test]
    fn test_deserializes_with_defaults() {
        let config: BrowserConfig = toml::from_str("headless = false").unwrap();
        assert!(!config.headless);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_timeout_converts_configured_seconds() {
        let config: BrowserConfig = toml::from_str("timeout_seconds = 5").unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }
}
