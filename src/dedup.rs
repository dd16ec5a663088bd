//! Duplicate-file finder.
//!
//! Standalone utility, unconnected to the metadata pipeline: walks directory
//! trees, hashes file contents, and groups identical files so wasted space
//! can be reclaimed. Exposed through the `docmeta-dup` binary.

use log::{info, warn};
use md5::Context;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::Result;

/// Chunk size for streaming file hashing.
const HASH_BLOCK_SIZE: usize = 64 * 1024;

/// A set of files with identical content.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    /// Size of one copy, in bytes.
    pub size: u64,
    /// Every path carrying this content.
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Bytes that would be reclaimed by keeping a single copy.
    pub fn wasted_bytes(&self) -> u64 {
        self.size * (self.paths.len() as u64 - 1)
    }
}

/// MD5 digest of a file's content, hashed in fixed-size chunks.
pub fn hash_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut context = Context::new();
    let mut buffer = [0u8; HASH_BLOCK_SIZE];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        context.consume(&buffer[..read]);
    }
    Ok(format!("{:x}", context.compute()))
}

/// Find groups of identical files under the given roots.
///
/// Unreadable entries are logged and skipped rather than aborting the scan.
/// Groups are sorted by file size, smallest first.
pub fn find_duplicates(roots: &[PathBuf]) -> Result<Vec<DuplicateGroup>> {
    let mut by_digest: HashMap<String, DuplicateGroup> = HashMap::new();

    for root in roots {
        info!("Scanning {}", root.display());
        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Skipping unreadable entry: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let (digest, size) = match hash_file(path).and_then(|digest| {
                let size = entry.metadata().map_err(std::io::Error::from)?.len();
                Ok((digest, size))
            }) {
                Ok(hashed) => hashed,
                Err(err) => {
                    warn!("Skipping {}: {err}", path.display());
                    continue;
                }
            };
            by_digest
                .entry(digest)
                .or_insert_with(|| DuplicateGroup {
                    size,
                    paths: Vec::new(),
                })
                .paths
                .push(path.to_path_buf());
        }
    }

    let mut groups: Vec<DuplicateGroup> = by_digest
        .into_values()
        .filter(|group| group.paths.len() > 1)
        .collect();
    groups.sort_by_key(|group| group.size);
    Ok(groups)
}

/// Total bytes reclaimable across all groups.
pub fn total_wasted_bytes(groups: &[DuplicateGroup]) -> u64 {
    groups.iter().map(DuplicateGroup::wasted_bytes).sum()
}

/// Format a byte count with binary unit suffixes.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];
    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{value:.1}{unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.1}ZiB")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_hash_file_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.bin");
        fs::write(&file, b"same content").unwrap();

        assert_eq!(hash_file(&file).unwrap(), hash_file(&file).unwrap());
    }

    #[test]
    fn test_find_duplicates_groups_identical_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.bin"), b"same content").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/b.bin"), b"same content").unwrap();
        fs::write(dir.path().join("c.bin"), b"different").unwrap();

        let groups = find_duplicates(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].paths.len(), 2);
        assert_eq!(groups[0].size, b"same content".len() as u64);
    }

    #[test]
    fn test_find_duplicates_none() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.bin"), b"one").unwrap();
        fs::write(dir.path().join("b.bin"), b"two").unwrap();

        let groups = find_duplicates(&[dir.path().to_path_buf()]).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn test_wasted_bytes() {
        let group = DuplicateGroup {
            size: 100,
            paths: vec![PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("c")],
        };
        assert_eq!(group.wasted_bytes(), 200);
        assert_eq!(total_wasted_bytes(std::slice::from_ref(&group)), 200);
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512.0B");
        assert_eq!(human_size(2048), "2.0KiB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0MiB");
    }
}
