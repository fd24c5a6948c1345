// Library interface for rust_job_scraper
// Lets the integration tests and the binary share the crawl components.

pub mod app_state;
pub mod browser;
pub mod config;
pub mod cookies;
pub mod crawler;
pub mod export;
pub mod job_state;
pub mod models;
