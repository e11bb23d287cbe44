use crate::error::Error;
use crate::model::{DuplicateGroup, FileRecord};
use serde::Serialize;
use tracing::{debug, info};

/// Ceiling of each sub-score; four of them make up the 0–100 retention score.
const SUB_SCORE_MAX: f64 = 25.0;
const INDICATOR_PENALTY: f64 = 10.0;
const DEFAULT_FORMAT_SCORE: f64 = 10.0;

/// Name fragments that usually mark a secondary copy.
const DUPLICATE_INDICATORS: &[&str] = &[
    "copy",
    "duplicate",
    "backup",
    "old",
    "temp",
    "test",
    "v1",
    "v2",
    "v3",
];

const IMAGE_FORMAT_SCORES: &[(&str, f64)] = &[
    ("png", 25.0),
    ("webp", 22.0),
    ("jpg", 20.0),
    ("jpeg", 20.0),
    ("gif", 15.0),
    ("bmp", 10.0),
];

const VIDEO_FORMAT_SCORES: &[(&str, f64)] = &[
    ("mp4", 25.0),
    ("mkv", 24.0),
    ("mov", 23.0),
    ("webm", 20.0),
    ("avi", 15.0),
    ("flv", 10.0),
];

const AUDIO_FORMAT_SCORES: &[(&str, f64)] = &[
    ("flac", 25.0),
    ("wav", 24.0),
    ("aac", 20.0),
    ("mp3", 18.0),
    ("ogg", 15.0),
    ("wma", 12.0),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionScore {
    pub file_index: usize,
    pub file: FileRecord,
    pub score: f64,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResult {
    pub group_id: String,
    pub best_file: RetentionScore,
    pub files_to_delete: Vec<RetentionScore>,
}

/// Per-file breakdown of the retention score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub size: f64,
    pub recency: f64,
    pub name: f64,
    pub format: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        (self.size + self.recency + self.name + self.format).min(4.0 * SUB_SCORE_MAX)
    }
}

/// Recommends which member of a duplicate group to keep. Stateless and deterministic.
#[derive(Debug, Default, Clone, Copy)]
pub struct RetentionAdvisor;

impl RetentionAdvisor {
    pub fn new() -> Self {
        RetentionAdvisor
    }

    /// Retention score of `file` relative to the rest of its group, 0–100.
    pub fn score(&self, file: &FileRecord, all_files: &[FileRecord]) -> f64 {
        self.breakdown(file, all_files).total()
    }

    pub fn breakdown(&self, file: &FileRecord, all_files: &[FileRecord]) -> ScoreBreakdown {
        breakdown_with(file, &GroupStats::of(all_files))
    }

    /// Score every member and split the group into the file to keep and the rest.
    ///
    /// Members are ranked by descending score; equal scores keep their input order.
    pub fn suggest_best_file(&self, group: &DuplicateGroup) -> Result<SuggestionResult, Error> {
        if group.files.len() < 2 {
            return Err(Error::Validation(format!(
                "Group {} has {} file(s), at least 2 are required",
                group.id,
                group.files.len()
            )));
        }

        debug!("Analyzing group {} ({} files)", group.id, group.files.len());

        let stats = GroupStats::of(&group.files);
        let mut ranked: Vec<RetentionScore> = group
            .files
            .iter()
            .enumerate()
            .map(|(file_index, file)| {
                let breakdown = breakdown_with(file, &stats);
                RetentionScore {
                    file_index,
                    file: file.clone(),
                    score: breakdown.total(),
                    reasons: reasons(file, &stats, &breakdown),
                }
            })
            .collect();

        // Stable sort: ties stay in first-seen order.
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut ranked = ranked.into_iter();
        let best_file = ranked
            .next()
            .ok_or_else(|| Error::Other(format!("Group {} produced no scores", group.id)))?;
        let files_to_delete: Vec<RetentionScore> = ranked.collect();

        info!(
            "Best file suggestion for {}: {} (score {:.1}, {})",
            group.id,
            best_file.file.name,
            best_file.score,
            best_file.reasons.join(", ")
        );

        Ok(SuggestionResult {
            group_id: group.id.clone(),
            best_file,
            files_to_delete,
        })
    }
}

struct GroupStats {
    average_size: f64,
    newest_modified: i64,
}

impl GroupStats {
    fn of(files: &[FileRecord]) -> Self {
        let average_size = if files.is_empty() {
            0.0
        } else {
            files.iter().map(|f| f.size as f64).sum::<f64>() / files.len() as f64
        };
        let newest_modified = files.iter().map(|f| f.modified).max().unwrap_or(0);
        GroupStats {
            average_size,
            newest_modified,
        }
    }
}

fn breakdown_with(file: &FileRecord, stats: &GroupStats) -> ScoreBreakdown {
    ScoreBreakdown {
        size: size_score(file, stats),
        recency: recency_score(file, stats),
        name: name_score(&file.name),
        format: format_score(file.effective_extension()),
    }
}

fn size_score(file: &FileRecord, stats: &GroupStats) -> f64 {
    // All sizes zero: every member sits exactly on the average.
    if stats.average_size <= 0.0 {
        return SUB_SCORE_MAX;
    }
    (file.size as f64 / stats.average_size * SUB_SCORE_MAX).min(SUB_SCORE_MAX)
}

fn recency_score(file: &FileRecord, stats: &GroupStats) -> f64 {
    if file.modified == stats.newest_modified {
        return SUB_SCORE_MAX;
    }
    match recency_ratio(file.modified, stats.newest_modified) {
        Ok(ratio) => (ratio * SUB_SCORE_MAX).clamp(0.0, SUB_SCORE_MAX),
        Err(e) => {
            debug!("{}; recency score for {} set to 0", e, file.path);
            0.0
        }
    }
}

fn recency_ratio(modified: i64, newest: i64) -> Result<f64, Error> {
    if newest <= 0 {
        return Err(Error::DegenerateInput(format!(
            "newest modification time is {}",
            newest
        )));
    }
    Ok(modified as f64 / newest as f64)
}

fn indicator_count(name: &str) -> usize {
    let lower = name.to_lowercase();
    DUPLICATE_INDICATORS
        .iter()
        .filter(|indicator| lower.contains(*indicator))
        .count()
}

fn name_score(name: &str) -> f64 {
    (SUB_SCORE_MAX - INDICATOR_PENALTY * indicator_count(name) as f64).max(0.0)
}

fn format_score(extension: &str) -> f64 {
    let ext = extension.trim_start_matches('.').to_lowercase();
    IMAGE_FORMAT_SCORES
        .iter()
        .chain(VIDEO_FORMAT_SCORES)
        .chain(AUDIO_FORMAT_SCORES)
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, score)| *score)
        .unwrap_or(DEFAULT_FORMAT_SCORE)
}

fn reasons(file: &FileRecord, stats: &GroupStats, breakdown: &ScoreBreakdown) -> Vec<String> {
    let mut reasons = Vec::new();

    if file.size as f64 > stats.average_size {
        reasons.push("Larger file size".to_string());
    }
    if file.modified == stats.newest_modified {
        reasons.push("Most recent file".to_string());
    }
    if breakdown.name >= SUB_SCORE_MAX {
        reasons.push("Clean filename".to_string());
    }
    if breakdown.format > DEFAULT_FORMAT_SCORE {
        reasons.push(format!(
            "Preferred format (.{})",
            file.effective_extension().to_lowercase()
        ));
    }

    if reasons.is_empty() {
        reasons.push("Standard quality file".to_string());
    }
    reasons
}
