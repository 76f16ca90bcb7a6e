//! Batch processing across many input files
//!
//! Each file runs its whole pipeline in isolation and writes to its own
//! output path. Files are processed on
//! a rayon thread pool only when the backend reports itself parallel-safe;
//! otherwise they run one after another on the calling thread.

use crate::backend::RenderBackend;
use crate::config::RenderConfig;
use crate::job::{InputKind, JobOutcome, RenderJob};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use shapeviz_core::{Error, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A file that could not be processed
#[derive(Debug, Clone, PartialEq)]
pub struct JobFailure {
    pub input: PathBuf,
    pub error: String,
}

/// Summary of a batch run, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub succeeded: Vec<JobOutcome>,
    pub failed: Vec<JobFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs many [`RenderJob`]s against one config and backend
#[derive(Debug, Clone)]
pub struct BatchRunner {
    config: RenderConfig,
    /// Worker threads for parallel-safe backends (None = rayon default)
    threads: Option<usize>,
}

impl BatchRunner {
    pub fn new(config: RenderConfig) -> Self {
        Self { config, threads: None }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// One job per input file of `kind` found under `dir`. Outputs mirror
    /// the input tree: `dir/a/x.npz` renders to `out_dir/a/x.<format>`.
    pub fn discover(&self, dir: &Path, kind: InputKind, out_dir: &Path) -> Result<Vec<RenderJob>> {
        shapeviz_io::discover_inputs(dir, kind.extension())?
            .into_iter()
            .map(|input| {
                let job_dir = match input.parent().and_then(|p| p.strip_prefix(dir).ok()) {
                    Some(sub) if !sub.as_os_str().is_empty() => out_dir.join(sub),
                    _ => out_dir.to_path_buf(),
                };
                RenderJob::new(input, &job_dir, kind, &self.config.render.format)
            })
            .collect()
    }

    /// Run every job. Per-file failures are logged and reported, never fatal;
    /// only an invalid config, two jobs sharing an output path or thread
    /// pool setup aborts the batch.
    pub fn run(&self, jobs: &[RenderJob], backend: &dyn RenderBackend) -> Result<BatchReport> {
        self.config.validate()?;
        check_distinct_outputs(jobs)?;

        let results: Vec<Result<JobOutcome>> = if backend.parallel_safe() && jobs.len() > 1 {
            let mut builder = ThreadPoolBuilder::new()
                .thread_name(|index| format!("shapeviz-batch-{}", index));
            if let Some(threads) = self.threads {
                builder = builder.num_threads(threads);
            }
            let pool = builder
                .build()
                .map_err(|e| Error::Render(format!("Failed to create thread pool: {}", e)))?;

            log::debug!("running {} jobs on {} threads", jobs.len(), pool.current_num_threads());
            pool.install(|| jobs.par_iter().map(|job| job.run(&self.config, backend)).collect())
        } else {
            log::debug!("running {} jobs sequentially via {}", jobs.len(), backend.name());
            jobs.iter().map(|job| job.run(&self.config, backend)).collect()
        };

        let mut report = BatchReport::default();
        for (job, result) in jobs.iter().zip(results) {
            match result {
                Ok(outcome) => report.succeeded.push(outcome),
                Err(e) => {
                    log::warn!("skipping {}: {}", job.input.display(), e);
                    report.failed.push(JobFailure { input: job.input.clone(), error: e.to_string() });
                }
            }
        }

        log::info!(
            "batch finished: {} of {} succeeded",
            report.succeeded.len(),
            report.total()
        );
        Ok(report)
    }
}

fn check_distinct_outputs(jobs: &[RenderJob]) -> Result<()> {
    let mut seen = HashSet::with_capacity(jobs.len());
    for job in jobs {
        if !seen.insert(&job.output) {
            return Err(Error::InvalidArgument(format!(
                "more than one input renders to {} (latest: {})",
                job.output.display(),
                job.input.display()
            )));
        }
    }
    Ok(())
}
