use crate::model::{FileCategory, FileRecord};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

const ID_PREFIX: &str = "trash-";

/// A file marked for deletion that can still be restored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashEntry {
    pub id: String,
    pub original_path: String,
    pub file_name: String,
    pub size: u64,
    pub deleted_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub category: FileCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashStatus {
    pub total_items: usize,
    pub total_size: u64,
    pub items: Vec<TrashEntry>,
}

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Registry of reversible deletions.
///
/// Entries leave the ledger either by restore or by purge, and their ids are never handed
/// out again. Expiry only happens when `clear_old_entries` is called.
pub struct TrashLedger {
    entries: BTreeMap<u64, TrashEntry>,
    next_id: u64,
    clock: Clock,
}

impl Default for TrashLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl TrashLedger {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Ledger that reads "now" from `clock` instead of the system time.
    pub fn with_clock(clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 0,
            clock: Box::new(clock),
        }
    }

    pub fn move_to_trash(&mut self, file: &FileRecord) -> TrashEntry {
        let seq = self.next_id;
        self.next_id += 1;

        let entry = TrashEntry {
            id: format!("{}{}", ID_PREFIX, seq),
            original_path: file.path.clone(),
            file_name: file.name.clone(),
            size: file.size,
            deleted_at: (self.clock)(),
            category: file.category(),
        };

        info!(
            "File moved to trash: {} (id {}, {} bytes)",
            file.path, entry.id, entry.size
        );

        self.entries.insert(seq, entry.clone());
        entry
    }

    /// Trash each file in turn; the result lines up with `files`.
    pub fn move_multiple_to_trash(&mut self, files: &[FileRecord]) -> Vec<TrashEntry> {
        files.iter().map(|file| self.move_to_trash(file)).collect()
    }

    /// Take an entry out of the ledger so its file becomes active again.
    pub fn restore_from_trash(&mut self, trash_id: &str) -> Option<TrashEntry> {
        let restored = parse_id(trash_id).and_then(|seq| self.entries.remove(&seq));
        match &restored {
            Some(entry) => info!(
                "File restored from trash: {} (id {})",
                entry.original_path, trash_id
            ),
            None => warn!("Trash entry not found: {}", trash_id),
        }
        restored
    }

    pub fn get_trash_entry(&self, trash_id: &str) -> Option<&TrashEntry> {
        parse_id(trash_id).and_then(|seq| self.entries.get(&seq))
    }

    /// Purge the given ids. Unknown ids are skipped; the ids actually purged are returned
    /// in request order.
    pub fn permanently_delete<S: AsRef<str>>(&mut self, trash_ids: &[S]) -> Vec<String> {
        let mut deleted = Vec::new();

        for trash_id in trash_ids {
            let trash_id = trash_id.as_ref();
            let Some(entry) = parse_id(trash_id).and_then(|seq| self.entries.remove(&seq)) else {
                continue;
            };
            info!(
                "File permanently deleted: {} (id {})",
                entry.original_path, trash_id
            );
            deleted.push(entry.id);
        }

        deleted
    }

    pub fn empty_trash(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        info!("Trash emptied: {} files deleted", count);
        count
    }

    pub fn get_trash_status(&self) -> TrashStatus {
        let items: Vec<TrashEntry> = self.entries.values().cloned().collect();
        TrashStatus {
            total_items: items.len(),
            total_size: items
                .iter()
                .fold(0u64, |total, item| total.saturating_add(item.size)),
            items,
        }
    }

    /// Purge entries trashed more than `days_old` days ago. An age reaching past the
    /// earliest representable instant purges nothing.
    pub fn clear_old_entries(&mut self, days_old: u32) -> usize {
        let cutoff = Duration::try_days(i64::from(days_old))
            .and_then(|age| (self.clock)().checked_sub_signed(age));
        let purged = match cutoff {
            Some(cutoff) => self.clear_entries_before(cutoff),
            None => 0,
        };
        info!(
            "Old trash entries cleared: {} entries older than {} days",
            purged, days_old
        );
        purged
    }

    /// Purge entries whose `deleted_at` precedes `cutoff`.
    pub fn clear_entries_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        let expired: Vec<String> = self
            .entries
            .values()
            .filter(|entry| entry.deleted_at < cutoff)
            .map(|entry| entry.id.clone())
            .collect();
        self.permanently_delete(&expired).len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sequence number of an id exactly as `move_to_trash` spells it. Aliases such as
/// `trash-00` or `trash-+0` resolve to nothing.
fn parse_id(trash_id: &str) -> Option<u64> {
    let seq: u64 = trash_id.strip_prefix(ID_PREFIX)?.parse().ok()?;
    (format!("{}{}", ID_PREFIX, seq) == trash_id).then_some(seq)
}
