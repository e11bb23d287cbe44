use crate::fingerprint::{ContentDigestFingerprint, FingerprintProvider, NameSizeFingerprint};
use crate::model::Sensitivity;
use crate::rules::{RuleCategory, RuleType};
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TRASH_RETENTION_DAYS: u32 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directories the indexer walks.
    #[serde(default)]
    pub root_paths: Vec<String>,
    /// Glob patterns the indexer skips.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub sensitivity: Sensitivity,
    #[serde(default)]
    pub fingerprint: FingerprintKind,
    #[serde(default = "default_trash_retention_days")]
    pub trash_retention_days: u32,
    /// Rules created in every new engine.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            root_paths: Vec::new(),
            ignore_patterns: Vec::new(),
            sensitivity: Sensitivity::default(),
            fingerprint: FingerprintKind::default(),
            trash_retention_days: DEFAULT_TRASH_RETENTION_DAYS,
            rules: Vec::new(),
        }
    }
}

fn default_trash_retention_days() -> u32 {
    DEFAULT_TRASH_RETENTION_DAYS
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintKind {
    #[default]
    NameSize,
    Content,
}

impl FingerprintKind {
    pub fn provider(&self) -> Box<dyn FingerprintProvider> {
        match self {
            FingerprintKind::NameSize => Box::new(NameSizeFingerprint),
            FingerprintKind::Content => Box::new(ContentDigestFingerprint),
        }
    }
}

/// A rule as written in `Config.toml` under `[[rules]]`.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    #[serde(default)]
    pub category: RuleCategory,
    #[serde(default, alias = "deletePattern")]
    pub delete_pattern: Option<String>,
}

/// Load `Config.toml` from the working directory (optional), then apply
/// `RECLAIMER_*` environment overrides (`__` separates nested keys).
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(
            Environment::with_prefix("RECLAIMER")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Load configuration from an explicit file.
pub fn load_configuration_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::from(path))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Drop directories nested inside another directory of the list, so no tree is indexed twice.
pub fn non_overlapping_directories(dirs: Vec<String>) -> Vec<String> {
    let mut by_depth = dirs;
    by_depth.sort_by_key(|dir| Path::new(dir).components().count());

    let mut result: Vec<String> = Vec::new();
    for dir in by_depth {
        let covered = result
            .iter()
            .any(|kept| Path::new(&dir).starts_with(Path::new(kept)));
        if !covered {
            result.push(dir);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_non_overlapping_no_overlap() {
        let dirs = vec![
            "/home/user/photos".to_string(),
            "/home/user/docs".to_string(),
            "/var/data".to_string(),
        ];
        let result = non_overlapping_directories(dirs);
        assert_eq!(result.len(), 3);
        assert!(result.contains(&"/home/user/photos".to_string()));
        assert!(result.contains(&"/var/data".to_string()));
    }

    #[test]
    fn test_non_overlapping_child_listed_first() {
        let dirs = vec![
            "/home/user/docs".to_string(),
            "/home/user".to_string(),
            "/home/user/docs".to_string(),
            "/home/username".to_string(),
        ];
        let result = non_overlapping_directories(dirs);
        // "/home/username" only shares a string prefix with "/home/user".
        assert_eq!(result, vec!["/home/user".to_string(), "/home/username".to_string()]);
    }

    #[test]
    fn test_load_configuration_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Config.toml");
        fs::write(
            &path,
            r#"
root_paths = ["/srv/photos"]
sensitivity = "medium"
fingerprint = "content"
trash_retention_days = 7

[[rules]]
name = "Drop copies"
type = "delete_pattern"
category = "image"
delete_pattern = "copy"

[[rules]]
name = "Newest wins"
type = "keep_newest"
"#,
        )
        .unwrap();

        let config = load_configuration_from(&path).unwrap();
        assert_eq!(config.root_paths, vec!["/srv/photos".to_string()]);
        assert!(config.ignore_patterns.is_empty());
        assert_eq!(config.sensitivity, Sensitivity::Medium);
        assert_eq!(config.fingerprint, FingerprintKind::Content);
        assert_eq!(config.trash_retention_days, 7);
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].rule_type, RuleType::DeletePattern);
        assert_eq!(config.rules[0].delete_pattern.as_deref(), Some("copy"));
        assert_eq!(config.rules[1].category, RuleCategory::All);
    }

    #[test]
    fn test_defaults_for_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Config.toml");
        fs::write(&path, "").unwrap();

        let config = load_configuration_from(&path).unwrap();
        assert_eq!(config.sensitivity, Sensitivity::High);
        assert_eq!(config.fingerprint, FingerprintKind::NameSize);
        assert_eq!(config.trash_retention_days, 30);
        assert!(config.rules.is_empty());
    }
}
