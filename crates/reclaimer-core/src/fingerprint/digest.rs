use super::{Fingerprint, FingerprintProvider};
use crate::model::FileRecord;
use std::fs::File;
use std::hash::Hasher as _;
use std::io::{self, Read};
use std::path::Path;
use twox_hash::XxHash64;

const READ_CHUNK_LENGTH: usize = 64 * 1024;

/// Fallback provider: XxHash64 over `name:size`.
///
/// Never reads file contents, so two different files that share a name and a size collide.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameSizeFingerprint;

impl FingerprintProvider for NameSizeFingerprint {
    fn name(&self) -> &'static str {
        "name_size"
    }

    fn fingerprint(&self, record: &FileRecord) -> io::Result<Fingerprint> {
        let key = format!("{}:{}", record.name, record.size);
        Ok(Fingerprint::new(format!("{:016x}", hash_data(key.as_bytes()))))
    }
}

/// BLAKE3 digest of the bytes stored at `record.path`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentDigestFingerprint;

impl FingerprintProvider for ContentDigestFingerprint {
    fn name(&self) -> &'static str {
        "content"
    }

    fn fingerprint(&self, record: &FileRecord) -> io::Result<Fingerprint> {
        let digest = digest_file(Path::new(&record.path))?;
        Ok(Fingerprint::new(digest.to_hex().to_string()))
    }
}

fn digest_file(file: &Path) -> io::Result<blake3::Hash> {
    let mut f = File::open(file)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0; READ_CHUNK_LENGTH];
    loop {
        let bytes_read = f.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(hasher.finalize())
}

pub fn hash_data(data: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(data);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn record(path: &str, name: &str, size: u64) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            name: name.to_string(),
            size,
            extension: String::new(),
            created: 0,
            modified: 0,
        }
    }

    #[test]
    fn test_name_size_ignores_path() {
        let a = NameSizeFingerprint
            .fingerprint(&record("/x/a.jpg", "a.jpg", 10))
            .unwrap();
        let b = NameSizeFingerprint
            .fingerprint(&record("/y/a.jpg", "a.jpg", 10))
            .unwrap();
        let c = NameSizeFingerprint
            .fingerprint(&record("/x/a.jpg", "a.jpg", 11))
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), 16);
    }

    #[test]
    fn test_content_digest_matches_identical_bytes() {
        let dir = tempdir().unwrap();
        let one = dir.path().join("one.bin");
        let two = dir.path().join("renamed.bin");
        let other = dir.path().join("other.bin");
        fs::write(&one, vec![0xAAu8; 100_000]).unwrap();
        fs::write(&two, vec![0xAAu8; 100_000]).unwrap();
        fs::write(&other, vec![0xABu8; 100_000]).unwrap();

        let fp = |p: &Path| {
            ContentDigestFingerprint
                .fingerprint(&record(&p.to_string_lossy(), "ignored", 0))
                .unwrap()
        };

        assert_eq!(fp(&one), fp(&two));
        assert_ne!(fp(&one), fp(&other));
    }

    #[test]
    fn test_content_digest_missing_file_is_io_error() {
        let result = ContentDigestFingerprint.fingerprint(&record("/definitely/not/here", "x", 0));
        assert!(result.is_err());
    }
}
