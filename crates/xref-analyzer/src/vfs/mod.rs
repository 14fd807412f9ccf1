//! File identity for cached snapshots and the `file://` URIs stored in index shards.

use std::path::{Path, PathBuf};

use url::Url;

/// Snapshot cache key.
///
/// Paths that exist on disk are canonicalized so `./a.cpp` and `/abs/a.cpp` share one entry; paths that do not
/// exist (in-memory fixtures) are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileId(PathBuf);

impl FileId {
    pub fn from_path(path: &Path) -> Self {
        match path.canonicalize() {
            Ok(canonical) => Self(canonical),
            Err(_) => Self(path.to_path_buf()),
        }
    }

    /// Key for an index URI; non-`file` schemes have no snapshot.
    pub fn from_uri(uri: &str) -> Option<Self> {
        uri_to_path(uri).map(|path| Self::from_path(&path))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// `file://` URI for an absolute path; relative paths have none.
pub fn path_to_uri(path: &Path) -> Option<String> {
    Url::from_file_path(path).ok().map(String::from)
}

/// Local path named by a `file://` URI.
pub fn uri_to_path(uri: &str) -> Option<PathBuf> {
    Url::parse(uri).ok().filter(|url| url.scheme() == "file")?.to_file_path().ok()
}

#[cfg(test)]
#[path = "../../tests/src/vfs/vfs_tests.rs"]
mod tests;
