//! The crawl core: page seam, scroll convergence, pagination, per-card
//! extraction and session orchestration.
//!
//! Everything here is written against the [`page::JobsPage`] trait so
//! the algorithms run unchanged over a real Chrome tab or an in-memory
//! fixture page in tests.

pub mod extract;
pub mod page;
pub mod pagination;
pub mod scroll;
pub mod session;

pub use page::{JobsPage, PageError};
pub use session::{CrawlError, CrawlTuning};
