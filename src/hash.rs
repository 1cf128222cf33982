//! Content fingerprint used as the lookup key for the hash-keyed subtitle API.
//!
//! The digest covers the first and the last 64 KiB of a file, so it is
//! independent of the file name and cheap to compute on multi-gigabyte videos.

use std::fmt;
use std::io::{ErrorKind, SeekFrom};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

use crate::error::{Result, SubgrabError};

/// Size of each boundary window read from the file
pub const CHUNK_SIZE: u64 = 64 * 1024;

/// Lowercase hex MD5 digest of a file's boundary windows
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    /// Wrap an already computed digest, normalized to lowercase
    #[cfg(test)]
    pub(crate) fn from_hex(hex: &str) -> Self {
        Self(hex.to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash the first and last [`CHUNK_SIZE`] bytes of a file.
///
/// The suffix seek is clamped to the start of the file, so files shorter than
/// two windows hash overlapping (or repeated) bytes instead of failing.
pub async fn compute_hash<P: AsRef<Path>>(path: P) -> Result<ContentHash> {
    let path = path.as_ref();
    let mut file = File::open(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => SubgrabError::FileNotFound(path.display().to_string()),
        _ => SubgrabError::Io(e),
    })?;

    let mut data = Vec::with_capacity(2 * CHUNK_SIZE as usize);
    (&mut file).take(CHUNK_SIZE).read_to_end(&mut data).await?;

    let len = file.metadata().await?.len();
    file.seek(SeekFrom::Start(len.saturating_sub(CHUNK_SIZE))).await?;
    (&mut file).take(CHUNK_SIZE).read_to_end(&mut data).await?;

    let hash = ContentHash(format!("{:x}", md5::compute(&data)));
    debug!("Content hash of {} ({} bytes): {}", path.display(), len, hash);
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterned(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    async fn hash_bytes(dir: &Path, name: &str, bytes: &[u8]) -> ContentHash {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        compute_hash(&path).await.unwrap()
    }

    #[tokio::test]
    async fn test_same_content_same_hash_regardless_of_path() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = patterned(200 * 1024);

        let a = hash_bytes(dir.path(), "a.mkv", &bytes).await;
        let b = hash_bytes(dir.path(), "renamed.mp4", &bytes).await;

        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[tokio::test]
    async fn test_middle_bytes_do_not_matter() {
        let dir = tempfile::tempdir().unwrap();
        let original = patterned(300 * 1024);
        let mut shuffled = original.clone();
        let chunk = CHUNK_SIZE as usize;
        shuffled[chunk..original.len() - chunk].reverse();
        assert_ne!(original, shuffled);

        let a = hash_bytes(dir.path(), "a.avi", &original).await;
        let b = hash_bytes(dir.path(), "b.avi", &shuffled).await;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_boundary_bytes_matter() {
        let dir = tempfile::tempdir().unwrap();
        let original = patterned(300 * 1024);
        let mut tail_changed = original.clone();
        let last = tail_changed.len() - 1;
        tail_changed[last] ^= 0xff;

        let a = hash_bytes(dir.path(), "a.avi", &original).await;
        let b = hash_bytes(dir.path(), "b.avi", &tail_changed).await;
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_two_window_file_reads_adjacent_windows() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = patterned(2 * CHUNK_SIZE as usize);

        let hash = hash_bytes(dir.path(), "exact.mkv", &bytes).await;
        assert_eq!(hash.to_string(), format!("{:x}", md5::compute(&bytes)));
    }

    #[tokio::test]
    async fn test_small_file_clamps_suffix_to_start() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = b"tiny video".to_vec();

        let hash = hash_bytes(dir.path(), "tiny.mkv", &bytes).await;
        let doubled = [bytes.as_slice(), bytes.as_slice()].concat();
        assert_eq!(hash.to_string(), format!("{:x}", md5::compute(&doubled)));
    }

    #[tokio::test]
    async fn test_overlapping_windows() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = patterned(100 * 1024);
        let chunk = CHUNK_SIZE as usize;

        let hash = hash_bytes(dir.path(), "mid.mkv", &bytes).await;
        let expected = [&bytes[..chunk], &bytes[bytes.len() - chunk..]].concat();
        assert_eq!(hash.to_string(), format!("{:x}", md5::compute(&expected)));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = compute_hash("/nonexistent/movie.mkv").await.unwrap_err();
        assert!(matches!(err, SubgrabError::FileNotFound(_)));
    }
}
