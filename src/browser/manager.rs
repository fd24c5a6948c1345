use super::config::BrowserConfig;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsString;
use std::sync::Arc;

/// Owns the headless Chrome process and hands out tabs.
///
/// The crawl session holds the manager for its whole lifetime; dropping
/// it tears the browser process down, which is what guarantees cleanup
/// on every exit path of a run.
pub struct BrowserManager {
    browser: Arc<Browser>,
    config: BrowserConfig,
}

impl BrowserManager {
    /// Launch a browser with the given configuration.
    pub fn new(config: BrowserConfig) -> Result<Self, BrowserError> {
        let flags = Self::chrome_flags(&config);
        let args: Vec<&std::ffi::OsStr> = flags.iter().map(OsString::as_os_str).collect();

        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.window_width, config.window_height)))
            .args(args)
            .build()
            .map_err(|e| BrowserError::ConfigurationError(e.to_string()))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| BrowserError::InitializationError(e.to_string()))?;

        Ok(Self {
            browser: Arc::new(browser),
            config,
        })
    }

    /// Flags that keep the automated session from being flagged by the
    /// target site, plus any extras from the configuration.
    fn chrome_flags(config: &BrowserConfig) -> Vec<OsString> {
        let mut flags: Vec<OsString> = vec![
            OsString::from("--disable-blink-features=AutomationControlled"),
            OsString::from("--no-sandbox"),
            OsString::from("--disable-dev-shm-usage"),
        ];
        if let Some(ref ua) = config.user_agent {
            flags.push(OsString::from(format!("--user-agent={}", ua)));
        }
        for flag in &config.chrome_flags {
            flags.push(OsString::from(flag));
        }
        flags
    }

    /// Create a new tab for the crawl
    pub fn new_tab(&self) -> Result<Arc<Tab>, BrowserError> {
        self.browser
            .new_tab()
            .map_err(|e| BrowserError::TabCreationError(e.to_string()))
    }

    /// Get the browser configuration
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }
}

/// Errors that can occur while launching or driving the browser process
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("Browser initialization failed: {0}")]
    InitializationError(String),

    #[error("Browser configuration error: {0}")]
    ConfigurationError(String),

    #[error("Tab creation failed: {0}")]
    TabCreationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stealth_flags_are_always_present() {
        let flags = BrowserManager::chrome_flags(&BrowserConfig::default());
        assert!(flags
            .iter()
            .any(|f| f.to_string_lossy().contains("AutomationControlled")));
        assert!(flags
            .iter()
            .any(|f| f.to_string_lossy().contains("--user-agent=")));
    }

    #[test]
    fn extra_flags_are_appended() {
        let config = BrowserConfig {
            chrome_flags: vec!["--lang=fr-FR".to_string()],
            ..BrowserConfig::default()
        };
        let flags = BrowserManager::chrome_flags(&config);
        assert_eq!(flags.last().unwrap().to_string_lossy(), "--lang=fr-FR");
    }

    #[test]
    #[ignore] // Requires Chrome to be installed
    fn test_browser_manager_creation() {
        let manager = BrowserManager::new(BrowserConfig::default()).unwrap();
        assert!(manager.new_tab().is_ok());
    }
}
