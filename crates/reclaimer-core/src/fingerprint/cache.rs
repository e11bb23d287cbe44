use super::{Fingerprint, FingerprintProvider};
use crate::model::FileRecord;
use dashmap::DashMap;
use std::io;
use tracing::{info, trace};

/// Memoized fingerprints keyed by `(path, modified)`.
///
/// Backed by a sharded concurrent map, so lookups from parallel grouping workers and a
/// concurrent `clear` never observe a torn entry. A clear racing a lookup only costs a
/// recomputation of the same stable value.
#[derive(Debug, Default)]
pub struct FingerprintCache {
    entries: DashMap<(String, i64), Fingerprint>,
}

impl FingerprintCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a record's fingerprint, computing and storing it on a miss.
    pub fn get_or_compute(
        &self,
        record: &FileRecord,
        provider: &dyn FingerprintProvider,
    ) -> io::Result<Fingerprint> {
        let key = (record.path.clone(), record.modified);

        if let Some(hit) = self.entries.get(&key) {
            trace!("Found fingerprint for {} in cache", record.path);
            return Ok(hit.value().clone());
        }

        let fingerprint = provider.fingerprint(record)?;
        trace!("No fingerprint for {} in cache, adding", record.path);
        self.entries.insert(key, fingerprint.clone());
        Ok(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        let released = self.entries.len();
        self.entries.clear();
        info!("Fingerprint cache cleared ({} entries released)", released);
    }
}
