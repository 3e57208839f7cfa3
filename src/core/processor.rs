// exif-cleaner/src/core/processor.rs
use super::{
    BatchReport, CleanConfig, ExifCleanerError, ExifTags, FileExifData, ImageFile,
    ProcessingOutcome, Result,
};
use crate::processors::{
    orientation_value, BatchCoordinator, FileDiscovery, ImageRewriter, MetadataExtractor,
    Orientation, ReportDestination, ResultAggregator, SourceImage,
};
use crate::utils::{ensure_dir, panic_message};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// What a finished run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub discovered: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Present only when metadata capture was requested.
    pub report: Option<BatchReport>,
    pub report_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub elapsed: Duration,
}

pub struct ExifCleaner {
    config: CleanConfig,
    discovery: FileDiscovery,
    extractor: MetadataExtractor,
    rewriter: ImageRewriter,
}

impl ExifCleaner {
    pub fn new(config: CleanConfig) -> Result<Self> {
        config.validate()?;

        let rewriter =
            ImageRewriter::new(config.jpeg_quality).with_png_optimization(config.optimize_png);

        Ok(Self {
            config,
            discovery: FileDiscovery::new(),
            extractor: MetadataExtractor::new(),
            rewriter,
        })
    }

    pub fn config(&self) -> &CleanConfig {
        &self.config
    }

    /// Discovery, one-time output folder setup, fan-out over the pool, then
    /// the report once every file has an outcome. Only setup and report
    /// persistence errors are returned; per-file problems end up in the
    /// outcomes.
    pub fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();

        let files = self.discovery.discover(&self.config.input_dir)?;
        if files.is_empty() {
            log::warn!("No image files found in {}", self.config.input_dir.display());
        }

        if !self.config.clean_exif && !self.config.create_json {
            log::warn!("Neither EXIF cleaning nor JSON creation requested, nothing to do");
            return Ok(RunSummary {
                discovered: files.len(),
                succeeded: 0,
                failed: 0,
                report: None,
                report_path: None,
                output_dir: None,
                elapsed: started.elapsed(),
            });
        }

        let output_dir = if self.config.clean_exif {
            Some(ensure_dir(&self.config.output_dir)?)
        } else {
            None
        };

        let coordinator = BatchCoordinator::new(self.config.threads)?;
        let outcomes = coordinator.execute(&files, |file| {
            self.process_file(file, output_dir.as_deref())
        });

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        let succeeded = outcomes.len() - failed;

        let (report, report_path) = if self.config.create_json {
            let report = ResultAggregator::build(outcomes);
            let path = ReportDestination::resolve(
                self.config.clean_exif,
                output_dir.as_deref().unwrap_or(self.config.output_dir.as_path()),
                &self.config.default_report_dir,
            );
            ResultAggregator::write(&report, &path)?;
            (Some(report), Some(path))
        } else {
            (None, None)
        };

        let elapsed = started.elapsed();
        log::info!(
            "Done: {} succeeded, {} failed, {:.2?} elapsed",
            succeeded,
            failed,
            elapsed
        );

        Ok(RunSummary {
            discovered: files.len(),
            succeeded,
            failed,
            report,
            report_path,
            output_dir,
            elapsed,
        })
    }

    /// One file task: open, optionally extract, optionally rewrite. Always
    /// yields an outcome; errors and codec panics are contained here.
    pub fn process_file(&self, file: &ImageFile, output_dir: Option<&Path>) -> ProcessingOutcome {
        let mut captured = None;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run_task(file, output_dir, &mut captured)
        }));

        let error = match result {
            Ok(Ok(())) => {
                let data = self
                    .config
                    .create_json
                    .then(|| FileExifData::new(file.file_name(), captured));
                return ProcessingOutcome::Success {
                    file: file.clone(),
                    data,
                };
            }
            Ok(Err(error)) => error,
            Err(payload) => ExifCleanerError::ProcessingError(format!(
                "panic while processing: {}",
                panic_message(payload.as_ref())
            )),
        };

        log::error!(
            "Error when processing image file {}: {}",
            file.path().display(),
            error
        );

        ProcessingOutcome::Failure {
            file: file.clone(),
            exif_tags: captured,
            error,
        }
    }

    fn run_task(
        &self,
        file: &ImageFile,
        output_dir: Option<&Path>,
        captured: &mut Option<ExifTags>,
    ) -> Result<()> {
        let source = SourceImage::open(file)?;
        let exif = self.extractor.read(&source);

        if self.config.create_json {
            *captured = exif
                .as_ref()
                .and_then(|exif| self.extractor.tags(exif, &source.file_name()));
            if captured.is_none() {
                log::info!("Image {} contains no meta-information", source.file_name());
            }
        }

        if let Some(output_dir) = output_dir {
            let orientation = exif
                .as_ref()
                .and_then(orientation_value)
                .map(Orientation::from_exif_value)
                .unwrap_or_default();
            // Base name only: same-named files from different subfolders
            // overwrite each other.
            let destination = output_dir.join(file.file_name());
            self.rewriter.rewrite(&source, orientation, &destination)?;
        }

        Ok(())
    }
}
