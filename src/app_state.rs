//! Application state shared across the Actix-web handlers.
//!
//! Wrapped in `web::Data`; the job handle is internally synchronized, so
//! handlers and the background crawl task clone and use it freely.

use crate::config::Config;
use crate::job_state::JobHandle;

pub struct AppState {
    /// Single-flight crawl job observed by the status endpoint.
    pub job: JobHandle,
    /// Service configuration loaded at startup.
    pub config: Config,
}
