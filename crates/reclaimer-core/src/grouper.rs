use crate::fingerprint::{Fingerprint, FingerprintCache, FingerprintProvider, NameSizeFingerprint};
use crate::model::{self, DuplicateGroup, FileRecord, Sensitivity};
use ahash::AHashMap;
use rayon::prelude::*;
use serde::Serialize;
use std::io;
use std::time::Instant;
use tracing::{debug, error, info};

/// Largest bonus the filename overlap can add on top of the sensitivity base.
const NAME_SIMILARITY_WEIGHT: f64 = 0.1;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingResult {
    pub groups: Vec<DuplicateGroup>,
    pub total_duplicates: usize,
    pub total_recoverable_size: u64,
}

/// Clusters file records into duplicate groups by fingerprint equality.
pub struct FingerprintGrouper {
    provider: Box<dyn FingerprintProvider>,
    cache: FingerprintCache,
}

impl Default for FingerprintGrouper {
    fn default() -> Self {
        Self::new(Box::new(NameSizeFingerprint))
    }
}

impl FingerprintGrouper {
    pub fn new(provider: Box<dyn FingerprintProvider>) -> Self {
        Self {
            provider,
            cache: FingerprintCache::new(),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Fingerprint of a record, memoized per `(path, modified)`.
    pub fn compute_fingerprint(&self, record: &FileRecord) -> io::Result<Fingerprint> {
        self.cache.get_or_compute(record, self.provider.as_ref())
    }

    /// Group records by fingerprint. Only clusters with two or more members become groups;
    /// groups come out in the order their first member appeared in `records`.
    ///
    /// A record whose fingerprint cannot be computed is logged and left out.
    pub fn group(&self, records: &[FileRecord], sensitivity: Sensitivity) -> GroupingResult {
        info!(
            "Starting duplicate detection: {} files, sensitivity {:?}, provider {}",
            records.len(),
            sensitivity,
            self.provider.name()
        );
        let start = Instant::now();

        let fingerprints: Vec<Option<Fingerprint>> = records
            .par_iter()
            .map(|record| match self.compute_fingerprint(record) {
                Ok(fingerprint) => Some(fingerprint),
                Err(e) => {
                    error!("Error fingerprinting '{}': {}", record.path, e);
                    None
                }
            })
            .collect();

        let mut cluster_index: AHashMap<Fingerprint, usize> = AHashMap::new();
        let mut clusters: Vec<(Fingerprint, Vec<&FileRecord>)> = Vec::new();

        for (record, fingerprint) in records.iter().zip(fingerprints) {
            let Some(fingerprint) = fingerprint else {
                continue;
            };
            match cluster_index.get(&fingerprint) {
                Some(&i) => clusters[i].1.push(record),
                None => {
                    cluster_index.insert(fingerprint.clone(), clusters.len());
                    clusters.push((fingerprint, vec![record]));
                }
            }
        }

        let mut result = GroupingResult {
            groups: Vec::new(),
            total_duplicates: 0,
            total_recoverable_size: 0,
        };

        for (fingerprint, members) in clusters {
            if members.len() < 2 {
                continue;
            }

            let files: Vec<FileRecord> = members.into_iter().cloned().collect();
            let total_size = model::total_size(&files);
            let group = DuplicateGroup {
                id: format!("group-{}", result.groups.len()),
                fingerprint,
                category: files[0].category(),
                similarity: similarity(&files, sensitivity),
                total_size,
                files,
            };

            result.total_duplicates += group.files.len() - 1;
            result.total_recoverable_size = result
                .total_recoverable_size
                .saturating_add(group.recoverable_size());
            result.groups.push(group);
        }

        debug!(
            "Duplicate detection completed in {:.3}s",
            start.elapsed().as_secs_f64()
        );
        info!(
            "{} duplicate groups, {} duplicate files, {} bytes recoverable",
            result.groups.len(),
            result.total_duplicates,
            result.total_recoverable_size,
        );

        result
    }

    /// Release every memoized fingerprint. Groups already produced are unaffected.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cached_fingerprints(&self) -> usize {
        self.cache.len()
    }
}

/// Sensitivity base plus up to 0.1 for filename overlap, capped at 1.0.
fn similarity(files: &[FileRecord], sensitivity: Sensitivity) -> f64 {
    if files.len() < 2 {
        return 1.0;
    }

    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    let longest = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);
    let name_score = if longest == 0 {
        0.0
    } else {
        count_common_chars(&names) as f64 / longest as f64
    };

    (sensitivity.base_similarity() + name_score * NAME_SIMILARITY_WEIGHT).min(1.0)
}

/// Characters of the first name, counted per occurrence, that appear in every name.
fn count_common_chars(names: &[&str]) -> usize {
    let Some(first) = names.first() else {
        return 0;
    };

    first
        .chars()
        .filter(|c| names.iter().all(|name| name.contains(*c)))
        .count()
}
