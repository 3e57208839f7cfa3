// exif-cleaner/src/processors/batch.rs
use crate::core::{ExifCleanerError, ImageFile, ProcessingOutcome, Result, TaskState};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;

/// Fixed-size pool of worker threads, built once per batch.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// `threads == 0` sizes the pool to the available cores.
    pub fn new(threads: usize) -> Result<Self> {
        let size = if threads > 0 {
            threads
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(size)
            .thread_name(|index| format!("exif-worker-{}", index))
            .build()
            .map_err(|e| {
                ExifCleanerError::ProcessingError(format!("Failed to create thread pool: {}", e))
            })?;

        Ok(Self { pool })
    }

    pub fn size(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs `task` once per item and returns results in item order. Returns
    /// only after every item has been processed.
    pub fn run_all<T, R, F>(&self, items: &[T], progress: &ProgressBar, task: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        self.pool.install(|| {
            items
                .par_iter()
                .progress_with(progress.clone())
                .map(|item| task(item))
                .collect()
        })
    }
}

/// Fans one task per file out over the worker pool and collects exactly one
/// outcome per file.
pub struct BatchCoordinator {
    pool: WorkerPool,
}

impl BatchCoordinator {
    pub fn new(threads: usize) -> Result<Self> {
        Ok(Self {
            pool: WorkerPool::new(threads)?,
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.size()
    }

    /// `task` must not panic across the boundary or touch state shared with
    /// other files; each result slot is written once by its own task.
    pub fn execute<F>(&self, files: &[ImageFile], task: F) -> Vec<ProcessingOutcome>
    where
        F: Fn(&ImageFile) -> ProcessingOutcome + Sync + Send,
    {
        if files.is_empty() {
            return Vec::new();
        }

        log::info!(
            "Processing {} images on {} workers",
            files.len(),
            self.workers()
        );

        for file in files {
            log::debug!("{}: {}", file.file_name(), TaskState::Pending);
        }

        let pb = self.create_progress_bar(files.len());
        let outcomes = self.pool.run_all(files, &pb, |file| {
            log::debug!("{}: {}", file.file_name(), TaskState::Running);
            let outcome = task(file);
            log::debug!("{}: {}", file.file_name(), outcome.state());
            outcome
        });

        let failed = outcomes.iter().filter(|o| o.state() == TaskState::Failed).count();
        pb.finish_with_message(format!(
            "{} processed, {} failed",
            outcomes.len() - failed,
            failed
        ));

        debug_assert_eq!(outcomes.len(), files.len());
        debug_assert!(outcomes.iter().all(|o| o.state().is_terminal()));

        outcomes
    }

    fn create_progress_bar(&self, total: usize) -> ProgressBar {
        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }
}
