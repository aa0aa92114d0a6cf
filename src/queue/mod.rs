//! In-process job tracking for long-running operations.
//!
//! Jobs run synchronously on the caller's thread; the [`JobQueue`] only
//! records their lifecycle and the progress they report so another thread
//! holding a clone of the queue can observe them.
//!
//! # Flow
//!
//! 1. Caller hands a [`Job`] to [`JobQueue::run`]
//! 2. The queue records it as `Running` and calls [`Job::execute`]
//! 3. The job reports progress through its [`JobContext`]
//! 4. The queue marks the job `Completed` or `Failed`

pub mod jobs;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SiteSearchError};
use crate::search::progress::ProgressSink;

/// Terminal jobs are kept this long after their last update.
const DEFAULT_TTL_SECS: i64 = 300;

// ---------------------------------------------------------------------------
// Job trait
// ---------------------------------------------------------------------------

/// A unit of work the queue can run.
pub trait Job {
    /// Static human-readable label.
    fn description(&self) -> &str;

    fn execute(&self, ctx: &JobContext<'_>) -> Result<()>;
}

/// Handle a running job uses to report progress back to the queue.
#[derive(Debug)]
pub struct JobContext<'a> {
    queue: &'a JobQueue,
    job_id: String,
}

impl JobContext<'_> {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }
}

impl ProgressSink for JobContext<'_> {
    fn set_progress(&self, done: u64, total: u64) {
        self.queue.set_progress(&self.job_id, done, total);
    }
}

// ---------------------------------------------------------------------------
// Job state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Bookkeeping for one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEntry {
    pub id: String,
    pub description: String,
    pub status: JobStatus,
    pub done: u64,
    /// 0 when the job cannot tell how much work remains.
    pub total: u64,
    /// Progress percentage (0 to 100). Stays 0 while `total` is unknown.
    pub progress: u8,
    pub status_message: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// JobQueue
// ---------------------------------------------------------------------------

/// Thread-safe job registry. Methods take the lock briefly and never hold
/// it while a job executes.
#[derive(Debug, Clone, Default)]
pub struct JobQueue {
    inner: Arc<Mutex<JobQueueInner>>,
}

#[derive(Debug, Default)]
struct JobQueueInner {
    next_id: u64,
    jobs: HashMap<String, JobEntry>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `job` to completion on the current thread and return its id.
    ///
    /// A second job with the same description is rejected while one is
    /// still running. The job's own error is returned unchanged after the
    /// entry is marked failed.
    pub fn run(&self, job: &dyn Job) -> Result<String> {
        let job_id = self.start_job(job.description())?;
        let ctx = JobContext {
            queue: self,
            job_id: job_id.clone(),
        };
        match job.execute(&ctx) {
            Ok(()) => {
                self.complete_job(&job_id);
                info!(job_id = %job_id, description = job.description(), "job completed");
                Ok(job_id)
            }
            Err(e) => {
                self.fail_job(&job_id, &e.to_string());
                warn!(job_id = %job_id, description = job.description(), error = %e, "job failed");
                Err(e)
            }
        }
    }

    /// Register a job in `Running` status.
    fn start_job(&self, description: &str) -> Result<String> {
        self.evict_expired();
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner
            .jobs
            .values()
            .any(|j| j.status == JobStatus::Running && j.description == description)
        {
            return Err(SiteSearchError::Job(format!(
                "a \"{description}\" job is already running"
            )));
        }

        let id = format!("job-{}", inner.next_id);
        inner.next_id += 1;
        let now = Utc::now();
        inner.jobs.insert(
            id.clone(),
            JobEntry {
                id: id.clone(),
                description: description.to_string(),
                status: JobStatus::Running,
                done: 0,
                total: 0,
                progress: 0,
                status_message: Some(format!("Starting: {description}")),
                error: None,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    /// Record progress for a running job. Ignored once the job is terminal.
    pub fn set_progress(&self, job_id: &str, done: u64, total: u64) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = inner.jobs.get_mut(job_id) {
            if entry.status == JobStatus::Running {
                entry.done = done;
                entry.total = total;
                entry.progress = percentage(done, total);
                entry.status_message = Some(if total > 0 {
                    format!("{} ({done}/{total})", entry.description)
                } else {
                    format!("{} ({done})", entry.description)
                });
                entry.updated_at = Utc::now();
            }
        }
    }

    fn complete_job(&self, job_id: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = inner.jobs.get_mut(job_id) {
            entry.status = JobStatus::Completed;
            entry.progress = 100;
            entry.status_message = Some("Completed successfully".to_string());
            entry.updated_at = Utc::now();
        }
    }

    fn fail_job(&self, job_id: &str, error: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = inner.jobs.get_mut(job_id) {
            entry.status = JobStatus::Failed;
            entry.status_message = Some(format!("Failed: {error}"));
            entry.error = Some(error.to_string());
            entry.updated_at = Utc::now();
        }
    }

    pub fn get_job(&self, job_id: &str) -> Option<JobEntry> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.jobs.get(job_id).cloned()
    }

    /// All tracked jobs, oldest first.
    pub fn list_jobs(&self) -> Vec<JobEntry> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let mut jobs: Vec<JobEntry> = inner.jobs.values().cloned().collect();
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        jobs
    }

    /// Drop terminal jobs whose last update is older than the TTL.
    /// Running jobs are never evicted.
    pub fn evict_expired(&self) {
        self.evict_older_than(Utc::now() - chrono::Duration::seconds(DEFAULT_TTL_SECS));
    }

    fn evict_older_than(&self, cutoff: DateTime<Utc>) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .jobs
            .retain(|_, entry| !entry.status.is_terminal() || entry.updated_at >= cutoff);
    }
}

fn percentage(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    ((done.min(total) * 100) / total) as u8
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
