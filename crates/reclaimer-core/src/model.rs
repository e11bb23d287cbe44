use crate::fingerprint::Fingerprint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A file as produced by the indexer. The engine only ever reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub path: String,
    pub name: String,
    pub size: u64,
    #[serde(default)]
    pub extension: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub created: i64,
    /// Milliseconds since the Unix epoch.
    pub modified: i64,
}

impl FileRecord {
    /// `extension`, or the file name's suffix when that is empty.
    pub fn effective_extension(&self) -> &str {
        if self.extension.is_empty() {
            self.name
                .rsplit_once('.')
                .map(|(_, ext)| ext)
                .unwrap_or_default()
        } else {
            &self.extension
        }
    }

    pub fn category(&self) -> FileCategory {
        FileCategory::from_extension(self.effective_extension())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Image,
    Video,
    Audio,
    Document,
    Other,
}

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "svg", "ico", "tiff",
];
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mkv", "mov", "flv", "wmv", "webm", "m4v", "mpeg",
];
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "flac", "aac", "ogg", "wma", "aiff", "alac", "m4a",
];
const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "docx", "doc", "xlsx", "xls", "pptx", "ppt", "txt", "rtf", "odt",
];

impl FileCategory {
    /// Classify an extension. Case and a leading dot are ignored.
    pub fn from_extension(extension: &str) -> Self {
        let ext = extension.trim_start_matches('.').to_lowercase();
        let ext = ext.as_str();

        if IMAGE_EXTENSIONS.contains(&ext) {
            FileCategory::Image
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            FileCategory::Video
        } else if AUDIO_EXTENSIONS.contains(&ext) {
            FileCategory::Audio
        } else if DOCUMENT_EXTENSIONS.contains(&ext) {
            FileCategory::Document
        } else {
            FileCategory::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Image => "image",
            FileCategory::Video => "video",
            FileCategory::Audio => "audio",
            FileCategory::Document => "document",
            FileCategory::Other => "other",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strict the grouper's similarity score starts out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    Medium,
    #[default]
    High,
}

impl Sensitivity {
    pub fn base_similarity(&self) -> f64 {
        match self {
            Sensitivity::Low => 0.85,
            Sensitivity::Medium => 0.90,
            Sensitivity::High => 0.95,
        }
    }
}

/// Two or more records sharing one fingerprint, produced by a single grouping run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub id: String,
    pub fingerprint: Fingerprint,
    pub files: Vec<FileRecord>,
    pub total_size: u64,
    #[serde(rename = "type")]
    pub category: FileCategory,
    pub similarity: f64,
}

impl DuplicateGroup {
    /// Bytes freed by deleting every member except the smallest one.
    pub fn recoverable_size(&self) -> u64 {
        let smallest = self.files.iter().map(|f| f.size).min().unwrap_or(0);
        self.total_size.saturating_sub(smallest)
    }
}

/// Sum of member sizes, clamped at `u64::MAX`.
pub fn total_size(files: &[FileRecord]) -> u64 {
    files
        .iter()
        .fold(0u64, |total, file| total.saturating_add(file.size))
}

/// Format a byte count for display, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, extension: &str) -> FileRecord {
        FileRecord {
            path: format!("/data/{}", name),
            name: name.to_string(),
            size: 10,
            extension: extension.to_string(),
            created: 0,
            modified: 0,
        }
    }

    #[test]
    fn test_from_extension_ignores_case_and_dot() {
        assert_eq!(FileCategory::from_extension("JPG"), FileCategory::Image);
        assert_eq!(FileCategory::from_extension(".mkv"), FileCategory::Video);
        assert_eq!(FileCategory::from_extension("flac"), FileCategory::Audio);
        assert_eq!(FileCategory::from_extension("odt"), FileCategory::Document);
        assert_eq!(FileCategory::from_extension("rs"), FileCategory::Other);
        assert_eq!(FileCategory::from_extension(""), FileCategory::Other);
    }

    #[test]
    fn test_category_falls_back_to_name_suffix() {
        assert_eq!(record("song.MP3", "").category(), FileCategory::Audio);
        assert_eq!(record("README", "").category(), FileCategory::Other);
        assert_eq!(record("clip", "mov").category(), FileCategory::Video);
    }

    #[test]
    fn test_effective_extension() {
        assert_eq!(record("a.png", "").effective_extension(), "png");
        assert_eq!(record("a.png", "jpg").effective_extension(), "jpg");
        assert_eq!(record("README", "").effective_extension(), "");
    }

    #[test]
    fn test_recoverable_size_never_underflows() {
        let group = DuplicateGroup {
            id: "group-0".to_string(),
            fingerprint: Fingerprint::new("f"),
            files: vec![record("a.bin", "bin"), record("b.bin", "bin")],
            total_size: 0,
            category: FileCategory::Other,
            similarity: 1.0,
        };
        assert_eq!(group.recoverable_size(), 0);
    }

    #[test]
    fn test_record_deserializes_without_optional_fields() {
        let json = r#"{"path":"/a/b.png","name":"b.png","size":42,"modified":1700000000000}"#;
        let rec: FileRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.extension, "");
        assert_eq!(rec.created, 0);
        assert_eq!(rec.category(), FileCategory::Image);
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
    }

    #[test]
    fn test_sensitivity_defaults_to_high() {
        assert_eq!(Sensitivity::default(), Sensitivity::High);
        let s: Sensitivity = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(s.base_similarity(), 0.90);
    }
}
