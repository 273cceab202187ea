//! Bounded fan-out over independent shard files with per-task error capture.
//!
//! One failing file must not silently abort the batch: every failure is
//! recorded with the path that caused it, the remaining files still run,
//! and the caller decides whether the batch as a whole counts as failed.

use crate::paths::FileJob;
use anyhow::{bail, Result};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::path::PathBuf;

/// Outcome of a batch: which files completed, which failed and why.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub completed: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, anyhow::Error)>,
}

impl BatchReport {
    pub fn all_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fold failures into a single error naming every failed file.
    pub fn into_result(self) -> Result<Vec<PathBuf>> {
        if self.failures.is_empty() {
            return Ok(self.completed);
        }
        for (path, e) in &self.failures {
            tracing::error!(path = %path.display(), error = %e, "shard failed");
        }
        let failed: Vec<String> = self
            .failures
            .iter()
            .map(|(p, e)| format!("{}: {:#}", p.display(), e))
            .collect();
        bail!("{} of {} shards failed:\n{}",
            self.failures.len(),
            self.failures.len() + self.completed.len(),
            failed.join("\n"));
    }
}

/// Run `f` over every job with at most `limit` in flight, capturing each
/// job's error instead of short-circuiting.
pub fn run_jobs_limited<F>(jobs: &[FileJob], limit: usize, f: F) -> BatchReport
where
    F: Sync + Fn(&FileJob) -> Result<()>,
{
    let report = Mutex::new(BatchReport::default());

    let record = |job: &FileJob, res: Result<()>| {
        let mut r = report.lock();
        match res {
            Ok(()) => r.completed.push(job.path.clone()),
            Err(e) => r.failures.push((job.path.clone(), e)),
        }
    };

    if limit <= 1 {
        for job in jobs {
            record(job, f(job));
        }
    } else {
        for chunk in jobs.chunks(limit) {
            chunk.par_iter().for_each(|job| record(job, f(job)));
        }
    }

    report.into_inner()
}
