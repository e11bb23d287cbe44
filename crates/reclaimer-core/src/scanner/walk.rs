use crate::model::FileRecord;
use dashmap::DashMap;
use glob::Pattern;
use rayon::prelude::*;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info};

/// Parallel directory traversal producing one record per regular file, sorted by path.
/// Paths matching an ignore glob are pruned; symlinks and 0-byte files are skipped.
pub fn index_paths(root_paths: &[&str], ignore_globs: &[&str]) -> io::Result<Vec<FileRecord>> {
    let found: DashMap<PathBuf, FileRecord> = DashMap::new();

    let ignore_patterns: Vec<Pattern> = ignore_globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect();

    root_paths
        .par_iter()
        .try_for_each(|root_dir| visit_dirs(Path::new(root_dir), &found, &ignore_patterns))?;

    let mut records: Vec<FileRecord> = found.into_iter().map(|(_, record)| record).collect();
    records.sort_by(|a, b| a.path.cmp(&b.path));

    info!("Indexed {} files under {:?}", records.len(), root_paths);
    Ok(records)
}

/// Record for a single regular file.
pub fn record_for(path: &Path) -> io::Result<FileRecord> {
    let metadata = fs::metadata(path).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!("Error getting metadata for {}: {}", path.display(), err),
        )
    })?;
    if !metadata.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a regular file", path.display()),
        ));
    }
    Ok(to_record(path, &metadata))
}

fn visit_dirs(
    dir: &Path,
    found: &DashMap<PathBuf, FileRecord>,
    ignore_patterns: &[Pattern],
) -> io::Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }

    if ignore_patterns
        .iter()
        .any(|pattern| pattern.matches_path(dir))
    {
        debug!("Skipping ignored directory {}", dir.display());
        return Ok(());
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
            error!(
                "Access denied reading directory {}: {}",
                dir.display(),
                err
            );
            return Ok(());
        }
        Err(err) => {
            return Err(io::Error::new(
                err.kind(),
                format!("Error reading directory {}: {}", dir.display(), err),
            ));
        }
    };

    entries.par_bridge().try_for_each(|entry_result| {
        let entry = entry_result.map_err(|err| {
            io::Error::new(
                err.kind(),
                format!(
                    "Error reading entry in directory {}: {}",
                    dir.display(),
                    err
                ),
            )
        })?;

        let path = entry.path();
        let metadata = fs::symlink_metadata(&path).map_err(|err| {
            io::Error::new(
                err.kind(),
                format!("Error getting metadata for {}: {}", path.display(), err),
            )
        })?;

        if metadata.file_type().is_symlink() {
            return Ok(());
        }

        if metadata.is_dir() {
            visit_dirs(&path, found, ignore_patterns)?;
        } else if metadata.len() > 0
            && !ignore_patterns
                .iter()
                .any(|pattern| pattern.matches_path(&path))
        {
            let record = to_record(&path, &metadata);
            found.insert(path, record);
        }
        Ok(())
    })
}

fn to_record(path: &Path, metadata: &Metadata) -> FileRecord {
    let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

    FileRecord {
        path: canonical.to_string_lossy().into_owned(),
        name: path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default(),
        size: metadata.len(),
        extension: path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default(),
        created: metadata.created().map(epoch_millis).unwrap_or(0),
        modified: metadata.modified().map(epoch_millis).unwrap_or(0),
    }
}

fn epoch_millis(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
