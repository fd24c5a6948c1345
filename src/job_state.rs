//! Single-flight job state shared between HTTP handlers and the
//! background crawl task.
//!
//! At most one crawl may be running at a time. Starting a run atomically
//! resets the log ring and previous result before any work begins, so a
//! concurrent status poll can never observe stale data from an earlier
//! run mixed with the new one.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use log::info;
use serde::Serialize;

use crate::models::CrawlResult;

/// Most-recent log lines kept for the status endpoint.
pub const LOG_CAPACITY: usize = 200;

#[derive(Debug, Default)]
struct JobState {
    running: bool,
    logs: VecDeque<String>,
    result: Option<CrawlResult>,
}

/// Snapshot returned to status pollers.
#[derive(Debug, Serialize, Clone)]
pub struct JobStatus {
    pub running: bool,
    pub logs: Vec<String>,
    pub result: Option<CrawlResult>,
}

/// Returned when a start is requested while a run is active.
#[derive(Debug, thiserror::Error)]
#[error("a crawl is already running")]
pub struct StartConflict;

/// Progress output seam for the crawl core.
///
/// The crawl modules log through this instead of touching job state
/// directly, so the deterministic tests can run them against any sink.
pub trait ProgressSink {
    fn log(&self, msg: &str);
}

/// Cloneable handle to the process-wide job state.
#[derive(Clone, Default)]
pub struct JobHandle {
    inner: Arc<Mutex<JobState>>,
}

impl JobHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the single flight slot.
    ///
    /// On success the log ring and previous result are cleared and
    /// `running` is set, all inside one critical section. On conflict
    /// nothing is mutated.
    pub fn try_begin(&self) -> Result<(), StartConflict> {
        let mut state = self.inner.lock().unwrap();
        if state.running {
            return Err(StartConflict);
        }
        state.running = true;
        state.logs.clear();
        state.result = None;
        Ok(())
    }

    /// Record the terminal result and release the flight slot.
    pub fn finish(&self, result: CrawlResult) {
        let mut state = self.inner.lock().unwrap();
        state.result = Some(result);
        state.running = false;
    }

    /// Append one line to the bounded log ring.
    pub fn append_log(&self, msg: &str) {
        let mut state = self.inner.lock().unwrap();
        if state.logs.len() >= LOG_CAPACITY {
            state.logs.pop_front();
        }
        state.logs.push_back(msg.to_string());
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().unwrap().running
    }

    /// Consistent snapshot of the current state.
    pub fn status(&self) -> JobStatus {
        let state = self.inner.lock().unwrap();
        JobStatus {
            running: state.running,
            logs: state.logs.iter().cloned().collect(),
            result: state.result.clone(),
        }
    }
}

impl ProgressSink for JobHandle {
    /// Mirror every progress line to the console log and the status ring.
    fn log(&self, msg: &str) {
        info!("{}", msg);
        self.append_log(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CrawlResult;

    #[test]
    fn begin_rejects_while_running() {
        let job = JobHandle::new();
        job.try_begin().unwrap();
        assert!(job.try_begin().is_err());
        assert!(job.is_running());
    }

    #[test]
    fn conflict_leaves_existing_state_untouched() {
        let job = JobHandle::new();
        job.try_begin().unwrap();
        job.append_log("page 1 done");
        assert!(job.try_begin().is_err());

        let status = job.status();
        assert_eq!(status.logs, vec!["page 1 done".to_string()]);
        assert!(status.result.is_none());
        assert!(status.running);
    }

    #[test]
    fn begin_resets_previous_run() {
        let job = JobHandle::new();
        job.try_begin().unwrap();
        job.append_log("old line");
        job.finish(CrawlResult::error("boom"));
        assert!(!job.is_running());

        job.try_begin().unwrap();
        let status = job.status();
        assert!(status.running);
        assert!(status.logs.is_empty());
        assert!(status.result.is_none());
    }

    #[test]
    fn finish_clears_running_and_stores_result() {
        let job = JobHandle::new();
        job.try_begin().unwrap();
        job.finish(CrawlResult::ok(7, "jobs.csv".into()));

        let status = job.status();
        assert!(!status.running);
        assert_eq!(status.result.unwrap().total_jobs, 7);
    }

    #[test]
    fn log_ring_is_bounded() {
        let job = JobHandle::new();
        for i in 0..LOG_CAPACITY + 25 {
            job.append_log(&format!("line {}", i));
        }
        let logs = job.status().logs;
        assert_eq!(logs.len(), LOG_CAPACITY);
        assert_eq!(logs.first().unwrap(), "line 25");
        assert_eq!(logs.last().unwrap(), &format!("line {}", LOG_CAPACITY + 24));
    }

    #[test]
    fn handle_is_shared_across_clones() {
        let job = JobHandle::new();
        let other = job.clone();
        job.try_begin().unwrap();
        assert!(other.is_running());
        assert!(other.try_begin().is_err());
    }
}
