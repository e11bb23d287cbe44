use crate::model::{format_file_size, FileCategory, FileRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// Sizes closer than this count as "similar".
const SIMILAR_SIZE_BYTES: u64 = 1000;
/// Share of the first name's characters found in the second name above which the names
/// count as very similar.
const SIMILAR_NAME_RATIO: f64 = 0.7;

/// Display summary of one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePreview {
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub category: FileCategory,
    pub size: u64,
    pub size_formatted: String,
    pub created: i64,
    pub modified: i64,
    pub extension: String,
}

impl From<&FileRecord> for FilePreview {
    fn from(file: &FileRecord) -> Self {
        FilePreview {
            path: file.path.clone(),
            name: file.name.clone(),
            category: file.category(),
            size: file.size,
            size_formatted: format_file_size(file.size),
            created: file.created,
            modified: file.modified,
            extension: file.effective_extension().to_string(),
        }
    }
}

/// Side-by-side comparison of two files with a keep recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub file1: FilePreview,
    pub file2: FilePreview,
    pub similarities: Vec<String>,
    pub differences: Vec<String>,
    pub recommendation: String,
}

pub fn compare_files(first: &FileRecord, second: &FileRecord) -> ComparisonResult {
    debug!("Comparing {} and {}", first.path, second.path);

    ComparisonResult {
        file1: FilePreview::from(first),
        file2: FilePreview::from(second),
        similarities: similarities(first, second),
        differences: differences(first, second),
        recommendation: recommendation(first, second),
    }
}

fn similarities(first: &FileRecord, second: &FileRecord) -> Vec<String> {
    let mut found = Vec::new();

    if first
        .effective_extension()
        .eq_ignore_ascii_case(second.effective_extension())
    {
        found.push("Same file format".to_string());
    }
    if first.size.abs_diff(second.size) < SIMILAR_SIZE_BYTES {
        found.push("Similar file size".to_string());
    }
    if stem(&first.name) == stem(&second.name) {
        found.push("Same filename".to_string());
    }
    if shared_char_ratio(&first.name, &second.name) > SIMILAR_NAME_RATIO {
        found.push("Very similar names".to_string());
    }

    if found.is_empty() {
        found.push("Files appear to be duplicates".to_string());
    }
    found
}

fn differences(first: &FileRecord, second: &FileRecord) -> Vec<String> {
    let mut found = Vec::new();

    if first.size != second.size {
        found.push(format!(
            "Size difference: {}",
            format_file_size(first.size.abs_diff(second.size))
        ));
    }
    if first.modified != second.modified {
        found.push(format!(
            "Modified dates differ: {} vs {}",
            format_date(first.modified),
            format_date(second.modified)
        ));
    }
    if first.name != second.name {
        found.push("Different filenames".to_string());
    }

    if found.is_empty() {
        found.push("Files are identical".to_string());
    }
    found
}

/// Larger file first, then the more recent one.
fn recommendation(first: &FileRecord, second: &FileRecord) -> String {
    let larger = if first.size > second.size {
        Some(first)
    } else if second.size > first.size {
        Some(second)
    } else {
        None
    };
    if let Some(file) = larger {
        return format!(
            "Keep \"{}\" - larger file size (usually better quality)",
            file.name
        );
    }

    let newer = if first.modified > second.modified {
        Some(first)
    } else if second.modified > first.modified {
        Some(second)
    } else {
        None
    };
    match newer {
        Some(file) => format!("Keep \"{}\" - more recent file", file.name),
        None => "Either file can be kept - they appear identical".to_string(),
    }
}

/// Name up to its first dot.
fn stem(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// Characters of `first` (counted per occurrence) that occur in `second`, over the longer
/// name's length.
fn shared_char_ratio(first: &str, second: &str) -> f64 {
    let longest = first.chars().count().max(second.chars().count());
    if longest == 0 {
        return 0.0;
    }
    let shared = first.chars().filter(|c| second.contains(*c)).count();
    shared as f64 / longest as f64
}

fn format_date(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| millis.to_string())
}
