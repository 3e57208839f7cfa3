// exif-cleaner/src/core/mod.rs
pub mod processor;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions (lowercase, without the dot) picked up by discovery.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "heic"];

pub const REPORT_FILE_NAME: &str = "result.json";

#[derive(Debug, Clone)]
pub struct CleanConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub create_json: bool,
    pub clean_exif: bool,
    /// Worker count, 0 means one worker per available core.
    pub threads: usize,
    pub jpeg_quality: u8,
    pub optimize_png: bool,
    /// Where the report goes when no stripped copies are produced.
    pub default_report_dir: PathBuf,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            create_json: true,
            clean_exif: true,
            threads: 0,
            jpeg_quality: 95,
            optimize_png: false,
            default_report_dir: PathBuf::from("."),
        }
    }
}

impl CleanConfig {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(input_dir: P, output_dir: Q) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(ExifCleanerError::InvalidParameter(
                "Quality must be between 1 and 100".to_string(),
            ));
        }

        if self.clean_exif && self.output_dir.as_os_str().is_empty() {
            return Err(ExifCleanerError::InvalidParameter(
                "Output folder is required when cleaning EXIF".to_string(),
            ));
        }

        // Copies written inside the input folder would be discovered again
        // on the next run.
        if self.clean_exif && is_within(&self.output_dir, &self.input_dir) {
            return Err(ExifCleanerError::InvalidParameter(format!(
                "Output folder {} must not be the input folder or inside it",
                self.output_dir.display()
            )));
        }

        Ok(())
    }
}

fn is_within(path: &Path, root: &Path) -> bool {
    resolve(path).starts_with(resolve(root))
}

/// Canonical form of `path`, resolving the longest existing ancestor so
/// folders that are yet to be created compare correctly.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }

    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            resolve(parent).join(name)
        }
        _ => std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf()),
    }
}

/// A discovered candidate image. Never mutated after discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageFile {
    path: PathBuf,
    extension: String,
}

impl ImageFile {
    /// Returns `None` when the path carries no UTF-8 extension.
    pub fn from_path<P: Into<PathBuf>>(path: P) -> Option<Self> {
        let path = path.into();
        let extension = crate::utils::lowercase_extension(&path)?;
        Some(Self { path, extension })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn file_name(&self) -> String {
        crate::utils::file_name_of(&self.path)
    }
}

/// Tag name to rendered value, kept in the order the tags were read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExifTags(Vec<(String, String)>);

impl ExifTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repeated name keeps its first position and takes the newer value.
    pub fn insert(&mut self, name: String, value: String) {
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl Serialize for ExifTags {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One report entry. `exif_tags` is `None` exactly when the source had no
/// decodable tag table; `error` is only set for failed files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileExifData {
    pub file_name: String,
    pub exif_tags: Option<ExifTags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileExifData {
    pub fn new(file_name: String, exif_tags: Option<ExifTags>) -> Self {
        Self {
            file_name,
            exif_tags,
            error: None,
        }
    }

    pub fn failed(file_name: String, exif_tags: Option<ExifTags>, error: String) -> Self {
        Self {
            file_name,
            exif_tags,
            error: Some(error),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub data: Vec<FileExifData>,
}

impl BatchReport {
    pub fn failures(&self) -> impl Iterator<Item = &FileExifData> {
        self.data.iter().filter(|entry| entry.is_failure())
    }
}

/// Lifecycle of a single file task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Exactly one of these is produced per discovered file.
#[derive(Debug)]
pub enum ProcessingOutcome {
    /// `data` is `None` when metadata capture was not requested.
    Success {
        file: ImageFile,
        data: Option<FileExifData>,
    },
    /// `exif_tags` holds whatever was captured before the failure.
    Failure {
        file: ImageFile,
        exif_tags: Option<ExifTags>,
        error: ExifCleanerError,
    },
}

impl ProcessingOutcome {
    pub fn file(&self) -> &ImageFile {
        match self {
            ProcessingOutcome::Success { file, .. } | ProcessingOutcome::Failure { file, .. } => file,
        }
    }

    pub fn state(&self) -> TaskState {
        match self {
            ProcessingOutcome::Success { .. } => TaskState::Completed,
            ProcessingOutcome::Failure { .. } => TaskState::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProcessingOutcome::Success { .. })
    }

    /// The report entry for this outcome, if it carries one.
    pub fn into_entry(self) -> Option<FileExifData> {
        match self {
            ProcessingOutcome::Success { data, .. } => data,
            ProcessingOutcome::Failure {
                file,
                exif_tags,
                error,
            } => Some(FileExifData::failed(
                file.file_name(),
                exif_tags,
                error.to_string(),
            )),
        }
    }
}

#[derive(Error, Debug)]
pub enum ExifCleanerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Input folder not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Corrupt image {file}: {source}")]
    CorruptImage {
        file: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Unsupported format for {file}: {format}")]
    UnsupportedFormat { file: String, format: String },

    #[error("Malformed EXIF in {file}: {source}")]
    MetadataDecode {
        file: String,
        #[source]
        source: exif::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Processing error: {0}")]
    ProcessingError(String),
}

pub type Result<T> = std::result::Result<T, ExifCleanerError>;

pub fn validate_config(config: &CleanConfig) -> Result<()> {
    config.validate()
}
