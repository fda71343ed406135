//! File resolution
//!
//! Maps a requested name onto a regular file below the delivery root.

use super::DeliveryError;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};

/// A regular file below the delivery root
///
/// The length is read from the filesystem when the resource is resolved and
/// is never reused across requests.
#[derive(Debug, Clone)]
pub struct FileResource {
    path: PathBuf,
    length: u64,
}

impl FileResource {
    /// Resolve `name` (a single path segment) under `root`
    ///
    /// Anything that does not end up as a regular file inside `root`,
    /// including traversal attempts and symlinks leaving the root, is
    /// reported as `NotFound`.
    pub async fn resolve(root: &Path, name: &str) -> Result<Self, DeliveryError> {
        if !is_plain_segment(name) {
            tracing::warn!(name, "Rejected file name outside of delivery root");
            return Err(DeliveryError::NotFound);
        }

        let root_canonical = match fs::canonicalize(root).await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(
                    "Delivery root not found or inaccessible '{}': {e}",
                    root.display()
                );
                return Err(DeliveryError::NotFound);
            }
        };

        // Missing files are common, no need to log at warning level
        let Ok(path) = fs::canonicalize(root_canonical.join(name)).await else {
            tracing::debug!(name, "File not found");
            return Err(DeliveryError::NotFound);
        };

        if !path.starts_with(&root_canonical) {
            tracing::warn!(
                "Path traversal attempt blocked: {name} -> {}",
                path.display()
            );
            return Err(DeliveryError::NotFound);
        }

        let metadata = fs::metadata(&path).await.map_err(|_| DeliveryError::NotFound)?;
        if !metadata.is_file() {
            return Err(DeliveryError::NotFound);
        }

        Ok(Self {
            path,
            length: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn length(&self) -> u64 {
        self.length
    }

    /// Open a fresh read handle owned by the caller
    pub async fn open(&self) -> Result<File, DeliveryError> {
        Ok(File::open(&self.path).await?)
    }

    /// Content type guessed from the file extension
    pub fn content_type(&self) -> String {
        mime_guess::from_path(&self.path)
            .first_or_octet_stream()
            .to_string()
    }
}

fn is_plain_segment(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("asset.txt"), b"hello").unwrap();

        let resource = FileResource::resolve(dir.path(), "asset.txt").await.unwrap();
        assert_eq!(resource.length(), 5);
        assert!(resource.path().ends_with("asset.txt"));
        assert_eq!(resource.content_type(), "text/plain");
    }

    #[tokio::test]
    async fn test_length_is_read_per_request() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("grow.bin");
        std::fs::write(&file, b"abc").unwrap();
        let first = FileResource::resolve(dir.path(), "grow.bin").await.unwrap();

        std::fs::write(&file, b"abcdef").unwrap();
        let second = FileResource::resolve(dir.path(), "grow.bin").await.unwrap();

        assert_eq!(first.length(), 3);
        assert_eq!(second.length(), 6);
    }

    #[tokio::test]
    async fn test_missing_and_invalid_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        for name in ["missing.txt", "", ".", "..", "../etc/passwd", "sub", "a/b"] {
            assert!(
                matches!(
                    FileResource::resolve(dir.path(), name).await,
                    Err(DeliveryError::NotFound)
                ),
                "name {name:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nope");
        assert!(matches!(
            FileResource::resolve(&root, "a.txt").await,
            Err(DeliveryError::NotFound)
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_out_of_root_is_hidden() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), b"secret").unwrap();

        let root = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("secret.txt"),
            root.path().join("link.txt"),
        )
        .unwrap();

        assert!(matches!(
            FileResource::resolve(root.path(), "link.txt").await,
            Err(DeliveryError::NotFound)
        ));
    }
}
