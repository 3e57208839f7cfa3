// exif-cleaner/src/processors/metadata.rs
use super::loader::SourceImage;
use super::tags::tag_name;
use crate::core::{ExifCleanerError, ExifTags};
use exif::{Exif, Field, In, Reader, Tag, Value};
use std::fmt::Display;
use std::io::Cursor;

pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Parses the tag table. A malformed table is logged and treated as
    /// missing; metadata never decides whether a file can be rewritten.
    pub fn read(&self, source: &SourceImage) -> Option<Exif> {
        match Reader::new().read_from_container(&mut Cursor::new(source.bytes())) {
            Ok(exif) => {
                log::debug!("Found EXIF data in {}", source.file_name());
                Some(exif)
            }
            Err(exif::Error::NotFound(_)) => {
                log::debug!("No EXIF data found in {}", source.file_name());
                None
            }
            Err(e) => {
                let err = ExifCleanerError::MetadataDecode {
                    file: source.file_name(),
                    source: e,
                };
                log::warn!("{}", err);
                None
            }
        }
    }

    /// Tags of the primary image, in table order. `None` when there are none.
    pub fn tags(&self, exif: &Exif, file_name: &str) -> Option<ExifTags> {
        let mut tags = ExifTags::new();

        for field in exif.fields().filter(|field| field.ifd_num == In::PRIMARY) {
            let name = tag_name(field.tag).into_owned();
            let value = render_value(field);
            log::debug!("{}: {}: {}", file_name, name, value);
            tags.insert(name, value);
        }

        if tags.is_empty() {
            None
        } else {
            Some(tags)
        }
    }

    /// True when the bytes still carry at least one EXIF field.
    pub fn has_metadata(&self, bytes: &[u8]) -> bool {
        match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
            Ok(exif) => exif.fields().next().is_some(),
            Err(_) => false,
        }
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Orientation value of the primary image, if present.
pub fn orientation_value(exif: &Exif) -> Option<u32> {
    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
}

/// Locale-independent text for a raw field value. Single values render
/// bare, multiple values as a parenthesised list.
pub fn render_value(field: &Field) -> String {
    match &field.value {
        Value::Ascii(parts) => parts
            .iter()
            .map(|part| {
                String::from_utf8_lossy(part)
                    .trim_end_matches('\0')
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Byte(values) => join(values),
        Value::Short(values) => join(values),
        Value::Long(values) => join(values),
        Value::SByte(values) => join(values),
        Value::SShort(values) => join(values),
        Value::SLong(values) => join(values),
        Value::Rational(values) => join_strings(
            values
                .iter()
                .map(|r| format_real(r.num as f64 / r.denom as f64)),
        ),
        Value::SRational(values) => join_strings(
            values
                .iter()
                .map(|r| format_real(r.num as f64 / r.denom as f64)),
        ),
        Value::Float(values) => join_strings(values.iter().map(|v| format_real(*v as f64))),
        Value::Double(values) => join_strings(values.iter().map(|v| format_real(*v))),
        _ => field.display_value().to_string(),
    }
}

fn join<T: Display>(values: &[T]) -> String {
    join_strings(values.iter().map(|v| v.to_string()))
}

fn join_strings<I: Iterator<Item = String>>(values: I) -> String {
    let values: Vec<String> = values.collect();
    match values.len() {
        1 => values.into_iter().next().unwrap_or_default(),
        _ => format!("({})", values.join(", ")),
    }
}

fn format_real(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
