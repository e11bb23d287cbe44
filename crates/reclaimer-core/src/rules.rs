use crate::error::Error;
use crate::model::{DuplicateGroup, FileCategory, FileRecord};
use ahash::AHashSet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    KeepLargest,
    KeepNewest,
    KeepSmallest,
    /// Size stands in for quality: nothing here decodes media.
    KeepBestQuality,
    DeletePattern,
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleType::KeepLargest => "keep_largest",
            RuleType::KeepNewest => "keep_newest",
            RuleType::KeepSmallest => "keep_smallest",
            RuleType::KeepBestQuality => "keep_best_quality",
            RuleType::DeletePattern => "delete_pattern",
        };
        f.write_str(s)
    }
}

/// Which groups a rule applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    Image,
    Video,
    Document,
    Audio,
    #[default]
    All,
}

impl RuleCategory {
    pub fn matches(&self, category: FileCategory) -> bool {
        match self {
            RuleCategory::All => true,
            RuleCategory::Image => category == FileCategory::Image,
            RuleCategory::Video => category == FileCategory::Video,
            RuleCategory::Document => category == FileCategory::Document,
            RuleCategory::Audio => category == FileCategory::Audio,
        }
    }

    fn files_label(&self) -> &'static str {
        match self {
            RuleCategory::All => "files",
            RuleCategory::Image => "image files",
            RuleCategory::Video => "video files",
            RuleCategory::Document => "document files",
            RuleCategory::Audio => "audio files",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    pub category: RuleCategory,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_pattern: Option<String>,
    pub description: String,
}

/// Partial rule fields for `update_rule`. Absent fields keep their stored value; the id
/// cannot be changed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleUpdate {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub rule_type: Option<RuleType>,
    pub category: Option<RuleCategory>,
    pub enabled: Option<bool>,
    pub delete_pattern: Option<String>,
}

/// Keep/delete partition one rule produced for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleApplication {
    pub rule_id: String,
    pub group_id: String,
    pub files_to_keep: Vec<FileRecord>,
    pub files_to_delete: Vec<FileRecord>,
    pub reason: String,
}

/// All applications for one group folded into a single partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedResolution {
    pub group_id: String,
    pub files_to_keep: Vec<FileRecord>,
    pub files_to_delete: Vec<FileRecord>,
    pub rule_ids: Vec<String>,
}

struct StoredRule {
    rule: Rule,
    pattern: Option<Regex>,
}

/// User-authored retention rules, kept in creation order.
#[derive(Default)]
pub struct RuleEngine {
    rules: Vec<StoredRule>,
    next_id: u64,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_rule(
        &mut self,
        name: &str,
        rule_type: RuleType,
        category: RuleCategory,
        delete_pattern: Option<&str>,
    ) -> Result<Rule, Error> {
        validate_name(name)?;
        let pattern = compile_pattern(rule_type, delete_pattern)?;

        let rule = Rule {
            id: format!("rule-{}", self.next_id),
            name: name.to_string(),
            rule_type,
            category,
            enabled: true,
            delete_pattern: delete_pattern.map(str::to_string),
            description: describe(rule_type, category),
        };
        self.next_id += 1;

        info!(
            "Rule created: {} (id {}, type {}, category {:?})",
            rule.name, rule.id, rule.rule_type, rule.category
        );

        self.rules.push(StoredRule {
            rule: rule.clone(),
            pattern,
        });
        Ok(rule)
    }

    pub fn get_rule(&self, rule_id: &str) -> Option<&Rule> {
        self.position(rule_id).map(|i| &self.rules[i].rule)
    }

    pub fn get_all_rules(&self) -> Vec<Rule> {
        self.rules.iter().map(|stored| stored.rule.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Merge `update` into the stored rule. The merged rule is validated as a whole before
    /// anything is written, so a rejected update leaves the rule as it was.
    pub fn update_rule(&mut self, rule_id: &str, update: RuleUpdate) -> Result<Rule, Error> {
        let index = self.require(rule_id)?;
        let current = &self.rules[index].rule;

        let mut merged = current.clone();
        if let Some(name) = update.name {
            validate_name(&name)?;
            merged.name = name;
        }
        if let Some(rule_type) = update.rule_type {
            merged.rule_type = rule_type;
        }
        if let Some(category) = update.category {
            merged.category = category;
        }
        if let Some(enabled) = update.enabled {
            merged.enabled = enabled;
        }
        if let Some(pattern) = update.delete_pattern {
            merged.delete_pattern = Some(pattern);
        }
        let pattern = compile_pattern(merged.rule_type, merged.delete_pattern.as_deref())?;
        merged.description = describe(merged.rule_type, merged.category);

        info!("Rule updated: {} (id {})", merged.name, rule_id);

        self.rules[index] = StoredRule {
            rule: merged.clone(),
            pattern,
        };
        Ok(merged)
    }

    pub fn delete_rule(&mut self, rule_id: &str) -> Result<Rule, Error> {
        let index = self.require(rule_id)?;
        let removed = self.rules.remove(index).rule;
        info!("Rule deleted: {} (id {})", removed.name, rule_id);
        Ok(removed)
    }

    pub fn toggle_rule(&mut self, rule_id: &str) -> Result<Rule, Error> {
        let index = self.require(rule_id)?;
        let rule = &mut self.rules[index].rule;
        rule.enabled = !rule.enabled;
        info!(
            "Rule toggled: {} (id {}, enabled {})",
            rule.name, rule_id, rule.enabled
        );
        Ok(rule.clone())
    }

    /// Resolve every group with every enabled rule whose category matches.
    ///
    /// Groups are visited in input order and rules in creation order. Resolutions with
    /// nothing to delete are dropped. Several rules may resolve the same group; see
    /// [`merge_applications`] for folding them together.
    pub fn apply_rules_to_groups(&self, groups: &[DuplicateGroup]) -> Vec<RuleApplication> {
        let enabled: Vec<&StoredRule> = self.rules.iter().filter(|s| s.rule.enabled).collect();
        let mut applications = Vec::new();

        for group in groups {
            for stored in &enabled {
                if !stored.rule.category.matches(group.category) {
                    continue;
                }

                let Some(application) = apply_rule(stored, group) else {
                    continue;
                };

                if application.files_to_delete.is_empty() {
                    debug!(
                        "Rule {} leaves group {} untouched",
                        stored.rule.id, group.id
                    );
                    continue;
                }

                info!(
                    "Rule applied to group {}: {} ({} files to delete)",
                    group.id,
                    stored.rule.name,
                    application.files_to_delete.len()
                );
                applications.push(application);
            }
        }

        applications
    }

    fn position(&self, rule_id: &str) -> Option<usize> {
        self.rules.iter().position(|stored| stored.rule.id == rule_id)
    }

    fn require(&self, rule_id: &str) -> Result<usize, Error> {
        self.position(rule_id).ok_or_else(|| {
            warn!("Rule not found: {}", rule_id);
            Error::NotFound(format!("Rule {}", rule_id))
        })
    }
}

/// Fold rule applications into one resolution per group.
///
/// Delete sets are unioned by path in application order. A merged resolution never deletes
/// every member: if the union would, the first file kept by the earliest application that
/// kept anything survives, or failing that the group's first member. Groups without any
/// application are omitted; output follows the order of `groups`.
pub fn merge_applications(
    groups: &[DuplicateGroup],
    applications: &[RuleApplication],
) -> Vec<MergedResolution> {
    let mut merged = Vec::new();

    for group in groups {
        let for_group: Vec<&RuleApplication> = applications
            .iter()
            .filter(|app| app.group_id == group.id)
            .collect();
        if for_group.is_empty() {
            continue;
        }

        let mut doomed: AHashSet<&str> = for_group
            .iter()
            .flat_map(|app| app.files_to_delete.iter().map(|f| f.path.as_str()))
            .collect();

        if group.files.iter().all(|f| doomed.contains(f.path.as_str())) {
            let survivor = for_group
                .iter()
                .find_map(|app| app.files_to_keep.first())
                .or_else(|| group.files.first());
            if let Some(survivor) = survivor {
                debug!(
                    "Rules would empty group {}; keeping {}",
                    group.id, survivor.path
                );
                doomed.remove(survivor.path.as_str());
            }
        }

        let (files_to_delete, files_to_keep): (Vec<FileRecord>, Vec<FileRecord>) = group
            .files
            .iter()
            .cloned()
            .partition(|f| doomed.contains(f.path.as_str()));

        let mut rule_ids: Vec<String> = Vec::new();
        for app in &for_group {
            if !rule_ids.contains(&app.rule_id) {
                rule_ids.push(app.rule_id.clone());
            }
        }

        merged.push(MergedResolution {
            group_id: group.id.clone(),
            files_to_keep,
            files_to_delete,
            rule_ids,
        });
    }

    merged
}

fn apply_rule(stored: &StoredRule, group: &DuplicateGroup) -> Option<RuleApplication> {
    let rule = &stored.rule;
    let files = &group.files;

    let (files_to_keep, files_to_delete, reason) = match rule.rule_type {
        RuleType::KeepLargest | RuleType::KeepBestQuality => {
            let kept = select(files, |candidate, best| candidate.size > best.size)?;
            let label = if rule.rule_type == RuleType::KeepLargest {
                "largest"
            } else {
                "best quality"
            };
            let reason = format!("Keep {} file: {}", label, files[kept].name);
            let (keep, delete) = split_at_kept(files, kept);
            (keep, delete, reason)
        }
        RuleType::KeepSmallest => {
            let kept = select(files, |candidate, best| candidate.size < best.size)?;
            let reason = format!("Keep smallest file: {}", files[kept].name);
            let (keep, delete) = split_at_kept(files, kept);
            (keep, delete, reason)
        }
        RuleType::KeepNewest => {
            let kept = select(files, |candidate, best| candidate.modified > best.modified)?;
            let reason = format!("Keep newest file: {}", files[kept].name);
            let (keep, delete) = split_at_kept(files, kept);
            (keep, delete, reason)
        }
        RuleType::DeletePattern => {
            let pattern = stored.pattern.as_ref()?;
            let (delete, keep): (Vec<FileRecord>, Vec<FileRecord>) = files
                .iter()
                .cloned()
                .partition(|f| pattern.is_match(&f.name));
            let reason = format!("Delete files matching pattern: {}", pattern.as_str());
            (keep, delete, reason)
        }
    };

    Some(RuleApplication {
        rule_id: rule.id.clone(),
        group_id: group.id.clone(),
        files_to_keep,
        files_to_delete,
        reason,
    })
}

/// Index of the best file; a later file replaces the current best only when strictly better.
fn select<F>(files: &[FileRecord], better: F) -> Option<usize>
where
    F: Fn(&FileRecord, &FileRecord) -> bool,
{
    let mut best: Option<usize> = None;
    for (i, file) in files.iter().enumerate() {
        match best {
            Some(b) if !better(file, &files[b]) => {}
            _ => best = Some(i),
        }
    }
    best
}

fn split_at_kept(files: &[FileRecord], kept: usize) -> (Vec<FileRecord>, Vec<FileRecord>) {
    let keep = vec![files[kept].clone()];
    let delete = files
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != kept)
        .map(|(_, f)| f.clone())
        .collect();
    (keep, delete)
}

fn validate_name(name: &str) -> Result<(), Error> {
    if name.trim().is_empty() {
        return Err(Error::Validation("Rule name is required".to_string()));
    }
    Ok(())
}

fn compile_pattern(rule_type: RuleType, pattern: Option<&str>) -> Result<Option<Regex>, Error> {
    if rule_type != RuleType::DeletePattern {
        return Ok(None);
    }

    let pattern = pattern.unwrap_or_default();
    if pattern.trim().is_empty() {
        return Err(Error::Validation(
            "delete_pattern rules require a non-empty deletePattern".to_string(),
        ));
    }

    Regex::new(pattern)
        .map(Some)
        .map_err(|e| Error::Validation(format!("Invalid deletePattern '{}': {}", pattern, e)))
}

fn describe(rule_type: RuleType, category: RuleCategory) -> String {
    let files = category.files_label();
    match rule_type {
        RuleType::KeepLargest => format!("Keep the largest {} and delete duplicates", files),
        RuleType::KeepNewest => {
            format!("Keep the newest {} and delete older duplicates", files)
        }
        RuleType::KeepSmallest => {
            format!("Keep the smallest {} and delete larger duplicates", files)
        }
        RuleType::KeepBestQuality => format!(
            "Keep the highest quality {} and delete lower quality duplicates",
            files
        ),
        RuleType::DeletePattern => format!("Delete {} matching a specific pattern", files),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::Fingerprint;

    fn record(name: &str, size: u64, modified: i64) -> FileRecord {
        FileRecord {
            path: format!("/media/{}", name),
            name: name.to_string(),
            size,
            extension: name.rsplit_once('.').map(|(_, e)| e).unwrap_or("").to_string(),
            created: 0,
            modified,
        }
    }

    fn group(id: &str, category: FileCategory, files: Vec<FileRecord>) -> DuplicateGroup {
        DuplicateGroup {
            id: id.to_string(),
            fingerprint: Fingerprint::new(id),
            total_size: files.iter().map(|f| f.size).sum(),
            category,
            similarity: 1.0,
            files,
        }
    }

    fn names(files: &[FileRecord]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_create_assigns_ids_and_description() {
        let mut engine = RuleEngine::new();
        let a = engine
            .create_rule("Newest photos", RuleType::KeepNewest, RuleCategory::Image, None)
            .unwrap();
        let b = engine
            .create_rule("Biggest", RuleType::KeepLargest, RuleCategory::All, None)
            .unwrap();

        assert_eq!(a.id, "rule-0");
        assert_eq!(b.id, "rule-1");
        assert!(a.enabled);
        assert_eq!(
            a.description,
            "Keep the newest image files and delete older duplicates"
        );
        assert_eq!(b.description, "Keep the largest files and delete duplicates");
        assert_eq!(engine.get_rule("rule-0"), Some(&a));
    }

    #[test]
    fn test_delete_pattern_requires_valid_pattern() {
        let mut engine = RuleEngine::new();
        for pattern in [None, Some(""), Some("   "), Some("copy(")] {
            let err = engine
                .create_rule("bad", RuleType::DeletePattern, RuleCategory::All, pattern)
                .unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{:?}", pattern);
        }
        assert!(engine.is_empty());

        let err = engine
            .create_rule("  ", RuleType::KeepLargest, RuleCategory::All, None)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_unknown_ids_are_not_found() {
        let mut engine = RuleEngine::new();
        assert!(matches!(
            engine.toggle_rule("rule-9"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            engine.delete_rule("rule-9"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            engine.update_rule("rule-9", RuleUpdate::default()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_rejected_update_leaves_rule_unchanged() {
        let mut engine = RuleEngine::new();
        let rule = engine
            .create_rule("Largest", RuleType::KeepLargest, RuleCategory::Video, None)
            .unwrap();

        let err = engine
            .update_rule(
                &rule.id,
                RuleUpdate {
                    name: Some("Renamed".to_string()),
                    rule_type: Some(RuleType::DeletePattern),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(engine.get_rule(&rule.id), Some(&rule));
    }

    #[test]
    fn test_update_merges_and_rederives_description() {
        let mut engine = RuleEngine::new();
        let rule = engine
            .create_rule("Largest", RuleType::KeepLargest, RuleCategory::Video, None)
            .unwrap();

        let updated = engine
            .update_rule(
                &rule.id,
                RuleUpdate {
                    rule_type: Some(RuleType::DeletePattern),
                    category: Some(RuleCategory::Audio),
                    delete_pattern: Some("backup".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.id, rule.id);
        assert_eq!(updated.name, "Largest");
        assert_eq!(updated.rule_type, RuleType::DeletePattern);
        assert_eq!(
            updated.description,
            "Delete audio files matching a specific pattern"
        );
    }

    #[test]
    fn test_update_ignores_id_field_in_json() {
        let mut engine = RuleEngine::new();
        let rule = engine
            .create_rule("Largest", RuleType::KeepLargest, RuleCategory::All, None)
            .unwrap();
        let update: RuleUpdate =
            serde_json::from_str(r#"{"id":"rule-99","enabled":false}"#).unwrap();

        let updated = engine.update_rule(&rule.id, update).unwrap();
        assert_eq!(updated.id, "rule-0");
        assert!(!updated.enabled);
    }

    #[test]
    fn test_toggle_twice_restores_enabled() {
        let mut engine = RuleEngine::new();
        let rule = engine
            .create_rule("Newest", RuleType::KeepNewest, RuleCategory::All, None)
            .unwrap();
        assert!(!engine.toggle_rule(&rule.id).unwrap().enabled);
        assert!(engine.toggle_rule(&rule.id).unwrap().enabled);
    }

    #[test]
    fn test_delete_then_get_is_none() {
        let mut engine = RuleEngine::new();
        let rule = engine
            .create_rule("Newest", RuleType::KeepNewest, RuleCategory::All, None)
            .unwrap();
        engine.delete_rule(&rule.id).unwrap();
        assert!(engine.get_rule(&rule.id).is_none());

        // Ids are not recycled after deletion.
        let next = engine
            .create_rule("Again", RuleType::KeepNewest, RuleCategory::All, None)
            .unwrap();
        assert_eq!(next.id, "rule-1");
    }

    #[test]
    fn test_keep_rules_break_ties_by_first_seen() {
        let mut engine = RuleEngine::new();
        engine
            .create_rule("Largest", RuleType::KeepLargest, RuleCategory::All, None)
            .unwrap();
        let g = group(
            "group-0",
            FileCategory::Document,
            vec![record("a.pdf", 10, 1), record("b.pdf", 10, 2), record("c.pdf", 5, 3)],
        );

        let apps = engine.apply_rules_to_groups(&[g]);
        assert_eq!(apps.len(), 1);
        assert_eq!(names(&apps[0].files_to_keep), vec!["a.pdf"]);
        assert_eq!(names(&apps[0].files_to_delete), vec!["b.pdf", "c.pdf"]);
        assert_eq!(apps[0].reason, "Keep largest file: a.pdf");
    }

    #[test]
    fn test_keep_smallest_and_best_quality() {
        let files = vec![record("a.mp4", 30, 1), record("b.mp4", 10, 2), record("c.mp4", 50, 3)];
        let g = group("group-0", FileCategory::Video, files);

        let mut smallest = RuleEngine::new();
        smallest
            .create_rule("Small", RuleType::KeepSmallest, RuleCategory::Video, None)
            .unwrap();
        let apps = smallest.apply_rules_to_groups(std::slice::from_ref(&g));
        assert_eq!(names(&apps[0].files_to_keep), vec!["b.mp4"]);

        let mut quality = RuleEngine::new();
        quality
            .create_rule("Best", RuleType::KeepBestQuality, RuleCategory::Video, None)
            .unwrap();
        let apps = quality.apply_rules_to_groups(std::slice::from_ref(&g));
        assert_eq!(names(&apps[0].files_to_keep), vec!["c.mp4"]);
        assert_eq!(apps[0].reason, "Keep best quality file: c.mp4");
    }

    #[test]
    fn test_category_filter_and_disabled_rules() {
        let mut engine = RuleEngine::new();
        let audio = engine
            .create_rule("Audio", RuleType::KeepNewest, RuleCategory::Audio, None)
            .unwrap();
        let g = group(
            "group-0",
            FileCategory::Image,
            vec![record("a.png", 1, 1), record("b.png", 1, 2)],
        );
        assert!(engine.apply_rules_to_groups(std::slice::from_ref(&g)).is_empty());

        engine
            .update_rule(
                &audio.id,
                RuleUpdate {
                    category: Some(RuleCategory::All),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(engine.apply_rules_to_groups(std::slice::from_ref(&g)).len(), 1);

        engine.toggle_rule(&audio.id).unwrap();
        assert!(engine.apply_rules_to_groups(&[g]).is_empty());
    }

    #[test]
    fn test_delete_pattern_runs_exactly_as_stored() {
        let mut engine = RuleEngine::new();
        let rule = engine
            .create_rule("Spaced", RuleType::DeletePattern, RuleCategory::All, Some(" copy"))
            .unwrap();
        assert_eq!(rule.delete_pattern.as_deref(), Some(" copy"));

        let g = group(
            "group-0",
            FileCategory::Image,
            vec![
                record("acopy.jpg", 1, 1),
                record("a copy.jpg", 1, 2),
                record("a.jpg", 1, 3),
            ],
        );
        let apps = engine.apply_rules_to_groups(&[g]);
        assert_eq!(apps.len(), 1);
        assert_eq!(names(&apps[0].files_to_delete), vec!["a copy.jpg"]);
        assert_eq!(names(&apps[0].files_to_keep), vec!["acopy.jpg", "a.jpg"]);
        assert_eq!(apps[0].reason, "Delete files matching pattern:  copy");
    }

    #[test]
    fn test_delete_pattern_without_matches_is_dropped() {
        let mut engine = RuleEngine::new();
        engine
            .create_rule("Backups", RuleType::DeletePattern, RuleCategory::All, Some("bak$"))
            .unwrap();
        let g = group(
            "group-0",
            FileCategory::Other,
            vec![record("a.txt", 1, 1), record("b.txt", 1, 2)],
        );
        assert!(engine.apply_rules_to_groups(&[g]).is_empty());
    }

    #[test]
    fn test_every_matching_rule_produces_its_own_application() {
        let mut engine = RuleEngine::new();
        engine
            .create_rule("Largest", RuleType::KeepLargest, RuleCategory::All, None)
            .unwrap();
        engine
            .create_rule("Smallest", RuleType::KeepSmallest, RuleCategory::All, None)
            .unwrap();
        let g = group(
            "group-0",
            FileCategory::Other,
            vec![record("a.bin", 1, 1), record("b.bin", 2, 1)],
        );

        let apps = engine.apply_rules_to_groups(std::slice::from_ref(&g));
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].rule_id, "rule-0");
        assert_eq!(apps[1].rule_id, "rule-1");

        // Union would empty the group; the largest-rule's survivor is kept.
        let merged = merge_applications(&[g], &apps);
        assert_eq!(merged.len(), 1);
        assert_eq!(names(&merged[0].files_to_keep), vec!["b.bin"]);
        assert_eq!(names(&merged[0].files_to_delete), vec!["a.bin"]);
        assert_eq!(merged[0].rule_ids, vec!["rule-0", "rule-1"]);
    }

    #[test]
    fn test_merge_unions_delete_sets() {
        let g = group(
            "group-3",
            FileCategory::Image,
            vec![
                record("a.jpg", 5, 3),
                record("a(1).jpg", 5, 2),
                record("a_copy.jpg", 5, 1),
            ],
        );
        let apps = vec![
            RuleApplication {
                rule_id: "rule-0".to_string(),
                group_id: "group-3".to_string(),
                files_to_keep: vec![g.files[0].clone(), g.files[2].clone()],
                files_to_delete: vec![g.files[1].clone()],
                reason: String::new(),
            },
            RuleApplication {
                rule_id: "rule-1".to_string(),
                group_id: "group-3".to_string(),
                files_to_keep: vec![g.files[0].clone(), g.files[1].clone()],
                files_to_delete: vec![g.files[2].clone()],
                reason: String::new(),
            },
        ];

        let merged = merge_applications(&[g], &apps);
        assert_eq!(names(&merged[0].files_to_keep), vec!["a.jpg"]);
        assert_eq!(
            names(&merged[0].files_to_delete),
            vec!["a(1).jpg", "a_copy.jpg"]
        );
    }

    #[test]
    fn test_merge_with_nothing_kept_keeps_first_member() {
        let mut engine = RuleEngine::new();
        engine
            .create_rule("All of it", RuleType::DeletePattern, RuleCategory::All, Some("."))
            .unwrap();
        let g = group(
            "group-0",
            FileCategory::Other,
            vec![record("x.dat", 1, 1), record("y.dat", 1, 1)],
        );

        let apps = engine.apply_rules_to_groups(std::slice::from_ref(&g));
        assert!(apps[0].files_to_keep.is_empty());

        let merged = merge_applications(&[g], &apps);
        assert_eq!(names(&merged[0].files_to_keep), vec!["x.dat"]);
        assert_eq!(names(&merged[0].files_to_delete), vec!["y.dat"]);
    }

    #[test]
    fn test_rule_json_shape() {
        let mut engine = RuleEngine::new();
        let rule = engine
            .create_rule("Copies", RuleType::DeletePattern, RuleCategory::Image, Some("copy"))
            .unwrap();
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["type"], "delete_pattern");
        assert_eq!(json["category"], "image");
        assert_eq!(json["deletePattern"], "copy");
        assert_eq!(json["enabled"], true);
    }
}
