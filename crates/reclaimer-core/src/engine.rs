use crate::advisor::{RetentionAdvisor, SuggestionResult};
use crate::compare::{self, ComparisonResult};
use crate::config::AppConfig;
use crate::error::Error;
use crate::fingerprint::FingerprintProvider;
use crate::grouper::{FingerprintGrouper, GroupingResult};
use crate::model::{DuplicateGroup, FileCategory, FileRecord, Sensitivity};
use crate::rules::{
    self, MergedResolution, Rule, RuleApplication, RuleCategory, RuleEngine, RuleType, RuleUpdate,
};
use crate::trash::{TrashEntry, TrashLedger, TrashStatus};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, info};

const DEFAULT_TRASH_RETENTION_DAYS: u32 = 30;

/// Result of `analyze`: the grouping plus one retention suggestion per group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub groups: Vec<DuplicateGroup>,
    pub total_duplicates: usize,
    pub total_recoverable_size: u64,
    pub suggestions: Vec<SuggestionResult>,
}

/// Rule-driven resolution: the merged keep/delete partitions and the trash entries created
/// for every file they delete.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResolution {
    pub resolutions: Vec<MergedResolution>,
    pub trash_entries: Vec<TrashEntry>,
}

/// One user's duplicate-resolution context.
///
/// Owns the fingerprint cache, the rule table and the trash ledger. Each table has its own
/// lock, so grouping and scoring never wait on rule or trash mutations.
pub struct DedupeEngine {
    grouper: FingerprintGrouper,
    advisor: RetentionAdvisor,
    rules: Mutex<RuleEngine>,
    trash: Mutex<TrashLedger>,
    trash_retention_days: u32,
}

impl Default for DedupeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DedupeEngine {
    pub fn new() -> Self {
        Self::with_grouper(FingerprintGrouper::default())
    }

    pub fn with_provider(provider: Box<dyn FingerprintProvider>) -> Self {
        Self::with_grouper(FingerprintGrouper::new(provider))
    }

    fn with_grouper(grouper: FingerprintGrouper) -> Self {
        Self {
            grouper,
            advisor: RetentionAdvisor::new(),
            rules: Mutex::new(RuleEngine::new()),
            trash: Mutex::new(TrashLedger::new()),
            trash_retention_days: DEFAULT_TRASH_RETENTION_DAYS,
        }
    }

    /// Replace the (empty) trash ledger, e.g. with one driven by a custom clock.
    pub fn with_trash_ledger(mut self, ledger: TrashLedger) -> Self {
        self.trash = Mutex::new(ledger);
        self
    }

    pub fn with_trash_retention_days(mut self, days: u32) -> Self {
        self.trash_retention_days = days;
        self
    }

    /// Build an engine from configuration, creating every configured rule.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let engine = Self::with_provider(config.fingerprint.provider())
            .with_trash_retention_days(config.trash_retention_days);

        for rule in &config.rules {
            engine.create_rule(
                &rule.name,
                rule.rule_type,
                rule.category,
                rule.delete_pattern.as_deref(),
            )?;
        }

        info!(
            "Engine ready: fingerprint provider {}, {} configured rules",
            engine.grouper.provider_name(),
            config.rules.len()
        );
        Ok(engine)
    }

    pub fn group(&self, files: &[FileRecord], sensitivity: Sensitivity) -> GroupingResult {
        self.grouper.group(files, sensitivity)
    }

    pub fn suggest(&self, group: &DuplicateGroup) -> Result<SuggestionResult, Error> {
        self.advisor.suggest_best_file(group)
    }

    /// Group `files` and attach a retention suggestion to every group.
    pub fn analyze(&self, files: &[FileRecord], sensitivity: Sensitivity) -> Result<Analysis, Error> {
        let start = Instant::now();
        let grouping = self.grouper.group(files, sensitivity);

        let suggestions = grouping
            .groups
            .par_iter()
            .map(|group| self.advisor.suggest_best_file(group))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Analysis of {} files completed in {:.3}s",
            files.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(Analysis {
            groups: grouping.groups,
            total_duplicates: grouping.total_duplicates,
            total_recoverable_size: grouping.total_recoverable_size,
            suggestions,
        })
    }

    pub fn compare_files(first: &FileRecord, second: &FileRecord) -> ComparisonResult {
        compare::compare_files(first, second)
    }

    pub fn file_type(extension: &str) -> FileCategory {
        FileCategory::from_extension(extension)
    }

    pub fn clear_cache(&self) {
        self.grouper.clear_cache();
    }

    pub fn cached_fingerprints(&self) -> usize {
        self.grouper.cached_fingerprints()
    }

    pub fn list_rules(&self) -> Result<Vec<Rule>, Error> {
        Ok(lock(&self.rules, "rules")?.get_all_rules())
    }

    pub fn get_rule(&self, rule_id: &str) -> Result<Rule, Error> {
        lock(&self.rules, "rules")?
            .get_rule(rule_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Rule {}", rule_id)))
    }

    pub fn create_rule(
        &self,
        name: &str,
        rule_type: RuleType,
        category: RuleCategory,
        delete_pattern: Option<&str>,
    ) -> Result<Rule, Error> {
        lock(&self.rules, "rules")?.create_rule(name, rule_type, category, delete_pattern)
    }

    pub fn update_rule(&self, rule_id: &str, update: RuleUpdate) -> Result<Rule, Error> {
        lock(&self.rules, "rules")?.update_rule(rule_id, update)
    }

    pub fn delete_rule(&self, rule_id: &str) -> Result<Rule, Error> {
        lock(&self.rules, "rules")?.delete_rule(rule_id)
    }

    pub fn toggle_rule(&self, rule_id: &str) -> Result<Rule, Error> {
        lock(&self.rules, "rules")?.toggle_rule(rule_id)
    }

    pub fn apply_rules(&self, groups: &[DuplicateGroup]) -> Result<Vec<RuleApplication>, Error> {
        Ok(lock(&self.rules, "rules")?.apply_rules_to_groups(groups))
    }

    /// Apply every enabled rule, merge the per-rule results (see
    /// [`rules::merge_applications`]) and move each resolved delete set into the trash.
    pub fn resolve_with_rules(&self, groups: &[DuplicateGroup]) -> Result<RuleResolution, Error> {
        let applications = self.apply_rules(groups)?;
        let resolutions = rules::merge_applications(groups, &applications);

        let doomed: Vec<FileRecord> = resolutions
            .iter()
            .flat_map(|resolution| resolution.files_to_delete.iter().cloned())
            .collect();
        let trash_entries = lock(&self.trash, "trash")?.move_multiple_to_trash(&doomed);

        info!(
            "Rules resolved {} groups, {} files moved to trash",
            resolutions.len(),
            trash_entries.len()
        );

        Ok(RuleResolution {
            resolutions,
            trash_entries,
        })
    }

    pub fn trash_status(&self) -> Result<TrashStatus, Error> {
        Ok(lock(&self.trash, "trash")?.get_trash_status())
    }

    pub fn move_to_trash(&self, files: &[FileRecord]) -> Result<Vec<TrashEntry>, Error> {
        Ok(lock(&self.trash, "trash")?.move_multiple_to_trash(files))
    }

    pub fn restore_from_trash(&self, trash_id: &str) -> Result<TrashEntry, Error> {
        lock(&self.trash, "trash")?
            .restore_from_trash(trash_id)
            .ok_or_else(|| Error::NotFound(format!("Trash entry {}", trash_id)))
    }

    /// Purge the given ids; unknown ids are dropped rather than reported.
    pub fn permanently_delete<S: AsRef<str>>(&self, trash_ids: &[S]) -> Result<Vec<String>, Error> {
        Ok(lock(&self.trash, "trash")?.permanently_delete(trash_ids))
    }

    pub fn empty_trash(&self) -> Result<usize, Error> {
        Ok(lock(&self.trash, "trash")?.empty_trash())
    }

    pub fn clear_old_entries(&self, days_old: u32) -> Result<usize, Error> {
        Ok(lock(&self.trash, "trash")?.clear_old_entries(days_old))
    }

    /// Purge entries older than the configured retention period.
    pub fn purge_expired(&self) -> Result<usize, Error> {
        self.clear_old_entries(self.trash_retention_days)
    }
}

fn lock<'a, T>(table: &'a Mutex<T>, name: &str) -> Result<MutexGuard<'a, T>, Error> {
    table
        .lock()
        .map_err(|e| Error::Other(format!("Failed to lock {} table: {}", name, e)))
}
