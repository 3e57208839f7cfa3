// exif-cleaner/src/processors/report.rs
use crate::core::{BatchReport, ExifCleanerError, ProcessingOutcome, Result, REPORT_FILE_NAME};
use crate::utils::write_atomic;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::{Path, PathBuf};

/// Where the JSON report goes. Stripped copies and the report travel
/// together; without stripped copies the report lands in the default folder.
pub struct ReportDestination;

impl ReportDestination {
    pub fn resolve(clean_exif: bool, output_dir: &Path, default_dir: &Path) -> PathBuf {
        if clean_exif {
            output_dir.join(REPORT_FILE_NAME)
        } else {
            default_dir.join(REPORT_FILE_NAME)
        }
    }
}

pub struct ResultAggregator;

impl ResultAggregator {
    /// Builds the report after the batch barrier. Entries are sorted by file
    /// name (then source path) so completion order never shows up in output.
    /// Outcomes without captured data contribute nothing.
    pub fn build(mut outcomes: Vec<ProcessingOutcome>) -> BatchReport {
        outcomes.sort_by(|a, b| {
            a.file()
                .file_name()
                .cmp(&b.file().file_name())
                .then_with(|| a.file().path().cmp(b.file().path()))
        });

        let data = outcomes
            .into_iter()
            .filter_map(ProcessingOutcome::into_entry)
            .collect();

        BatchReport { data }
    }

    /// Serializes with three-space indentation, non-ASCII left as is, then
    /// replaces `path` atomically.
    pub fn write(report: &BatchReport, path: &Path) -> Result<()> {
        let persistence_error = |source: std::io::Error| ExifCleanerError::Persistence {
            path: path.to_path_buf(),
            source,
        };

        let mut buffer = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"   "));
        report
            .serialize(&mut serializer)
            .map_err(|e| persistence_error(e.into()))?;
        buffer.push(b'\n');

        write_atomic(path, &buffer).map_err(persistence_error)?;

        log::info!("Result file '{}' created", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ExifTags, FileExifData, ImageFile};

    fn success(path: &str, tags: Option<ExifTags>) -> ProcessingOutcome {
        let file = ImageFile::from_path(path).unwrap();
        let data = FileExifData::new(file.file_name(), tags);
        ProcessingOutcome::Success {
            file,
            data: Some(data),
        }
    }

    #[test]
    fn test_destination_policy() {
        let output = Path::new("/out");
        let default = Path::new("/app");

        assert_eq!(
            ReportDestination::resolve(true, output, default),
            PathBuf::from("/out/result.json")
        );
        assert_eq!(
            ReportDestination::resolve(false, output, default),
            PathBuf::from("/app/result.json")
        );
    }

    #[test]
    fn test_build_sorts_regardless_of_completion_order() {
        let outcomes = vec![
            success("/in/c.jpg", None),
            success("/in/sub/a.jpg", None),
            success("/in/b.png", None),
            success("/in/a.jpg", None),
        ];

        let report = ResultAggregator::build(outcomes);
        let names: Vec<&str> = report.data.iter().map(|e| e.file_name.as_str()).collect();

        assert_eq!(names, vec!["a.jpg", "a.jpg", "b.png", "c.jpg"]);
    }

    #[test]
    fn test_build_records_failures() {
        let file = ImageFile::from_path("/in/bad.jpg").unwrap();
        let outcomes = vec![
            success("/in/good.jpg", None),
            ProcessingOutcome::Failure {
                file,
                exif_tags: None,
                error: ExifCleanerError::ProcessingError("cannot decode".to_string()),
            },
        ];

        let report = ResultAggregator::build(outcomes);

        assert_eq!(report.data.len(), 2);
        let failed: Vec<&FileExifData> = report.failures().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].file_name, "bad.jpg");
        assert!(failed[0].exif_tags.is_none());
    }

    #[test]
    fn test_write_uses_three_space_indent() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(REPORT_FILE_NAME);

        let mut tags = ExifTags::new();
        tags.insert("Artist".to_string(), "Zoë".to_string());
        let report = ResultAggregator::build(vec![success("/in/a.jpg", Some(tags))]);

        ResultAggregator::write(&report, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();

        assert!(written.starts_with("{\n   \"data\": [\n      {"));
        assert!(written.contains("\"Artist\": \"Zoë\""));
    }

    #[test]
    fn test_write_to_missing_folder_fails() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("missing").join(REPORT_FILE_NAME);

        let result = ResultAggregator::write(&BatchReport::default(), &path);
        assert!(matches!(result, Err(ExifCleanerError::Persistence { .. })));
    }
}
