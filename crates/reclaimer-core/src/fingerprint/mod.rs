pub mod cache;
pub mod digest;

use crate::model::FileRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;

pub use cache::FingerprintCache;
pub use digest::{ContentDigestFingerprint, NameSizeFingerprint};

/// Opaque value that is equal for true duplicates and differs otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(value: impl Into<String>) -> Self {
        Fingerprint(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes fingerprints for file records.
///
/// Implementations must be stable: the same record must always yield the same fingerprint.
/// The grouper memoizes results per `(path, modified)` so a provider is called at most once
/// per record version.
pub trait FingerprintProvider: Send + Sync {
    /// Short identifier used in logs and configuration.
    fn name(&self) -> &'static str;

    fn fingerprint(&self, record: &FileRecord) -> io::Result<Fingerprint>;
}
