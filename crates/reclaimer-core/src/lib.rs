pub mod advisor;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod grouper;
pub mod model;
pub mod rules;
pub mod scanner;
pub mod trash;

pub use advisor::{RetentionAdvisor, RetentionScore, SuggestionResult};
pub use compare::{compare_files, ComparisonResult, FilePreview};
pub use config::{AppConfig, FingerprintKind, RuleConfig};
pub use engine::{Analysis, DedupeEngine, RuleResolution};
pub use error::{Error, ErrorKind, ErrorResponse};
pub use fingerprint::{
    ContentDigestFingerprint, Fingerprint, FingerprintProvider, NameSizeFingerprint,
};
pub use grouper::{FingerprintGrouper, GroupingResult};
pub use model::{format_file_size, DuplicateGroup, FileCategory, FileRecord, Sensitivity};
pub use rules::{
    merge_applications, MergedResolution, Rule, RuleApplication, RuleCategory, RuleEngine,
    RuleType, RuleUpdate,
};
pub use trash::{TrashEntry, TrashLedger, TrashStatus};
