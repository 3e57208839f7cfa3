mod cli;
mod core;
mod processors;
mod utils;

pub use cli::Cli;
pub use crate::core::processor::{ExifCleaner, RunSummary};
pub use crate::core::{
    validate_config, BatchReport, CleanConfig, ExifCleanerError, ExifTags, FileExifData,
    ImageFile, ProcessingOutcome, Result, TaskState, REPORT_FILE_NAME, SUPPORTED_EXTENSIONS,
};
pub use processors::{
    copy_pixels, orientation_value, render_value, tag_name, BatchCoordinator, FileDiscovery,
    ImageRewriter, MetadataExtractor, Orientation, ReportDestination, ResultAggregator,
    SourceImage, WorkerPool,
};
pub use utils::{ensure_dir, format_file_size, is_supported_format};

pub mod prelude {
    pub use crate::{
        BatchCoordinator, CleanConfig, ExifCleaner, FileDiscovery, ImageRewriter,
        MetadataExtractor, ResultAggregator,
    };
}

// Re-export commonly used types
pub use image::DynamicImage;
