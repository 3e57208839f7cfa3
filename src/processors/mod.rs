// exif-cleaner/src/processors/mod.rs
mod batch;
mod discovery;
mod loader;
mod metadata;
mod report;
mod rewriter;
mod tags;

pub use batch::{BatchCoordinator, WorkerPool};
pub use discovery::FileDiscovery;
pub use loader::SourceImage;
pub use metadata::{orientation_value, render_value, MetadataExtractor};
pub use report::{ReportDestination, ResultAggregator};
pub use rewriter::{copy_pixels, ImageRewriter, Orientation};
pub use tags::tag_name;

