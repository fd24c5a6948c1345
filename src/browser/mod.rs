//! Browser automation over headless Chrome.
//!
//! [`BrowserManager`] owns the Chrome process, [`ChromeJobsPage`] adapts
//! one of its tabs to the crawl's page seam. The manager must outlive
//! every page created from it; the crawl session keeps it on the stack
//! for the whole run so the process is reaped on any exit path.

pub mod config;
pub mod manager;
pub mod page;

pub use config::BrowserConfig;
pub use manager::{BrowserError, BrowserManager};
pub use page::ChromeJobsPage;
