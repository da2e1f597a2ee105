/*!
 * Data model shared by the planner, walker, oracle, engine, and aggregator.
 */

use std::path::PathBuf;

use crate::error::{DistcpError, Result};

/// A normalized, POSIX-style absolute remote path.
///
/// Normalization strips `.` segments, collapses duplicated separators, rejects
/// `..`, and removes any trailing separator except for the root itself. Two
/// `RemotePath`s compare equal iff their normalized strings are byte-equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RemotePath(String);

impl RemotePath {
    pub fn new(raw: impl AsRef<str>) -> Result<Self> {
        let raw = raw.as_ref();
        if !raw.starts_with('/') {
            return Err(DistcpError::InvalidOption(format!(
                "path is not absolute: {raw}"
            )));
        }

        let mut segments: Vec<&str> = Vec::new();
        for seg in raw.split('/') {
            match seg {
                "" | "." => continue,
                ".." => {
                    return Err(DistcpError::InvalidOption(format!(
                        "path contains '..': {raw}"
                    )));
                }
                s => segments.push(s),
            }
        }

        if segments.is_empty() {
            return Ok(Self("/".to_string()));
        }
        Ok(Self(format!("/{}", segments.join("/"))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    pub fn basename(&self) -> &str {
        if self.is_root() {
            return "/";
        }
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn parent(&self) -> Option<RemotePath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(RemotePath("/".to_string())),
            Some(idx) => Some(RemotePath(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Join a single child segment onto this path.
    pub fn join(&self, child: &str) -> RemotePath {
        let child = child.trim_start_matches('/');
        if self.is_root() {
            RemotePath(format!("/{child}"))
        } else {
            RemotePath(format!("{}/{}", self.0, child))
        }
    }

    /// Every ancestor of this path, from `/` down to (but not including) self.
    pub fn ancestors(&self) -> Vec<RemotePath> {
        let mut out = Vec::new();
        let mut cur = self.parent();
        let mut stack = Vec::new();
        while let Some(p) = cur {
            let is_root = p.is_root();
            stack.push(p.clone());
            cur = if is_root { None } else { p.parent() };
        }
        stack.reverse();
        out.extend(stack);
        out
    }

    /// Strip this path's length (+1 for the separator) off the front of `descendant`,
    /// returning the `/`-normalized remainder. Used by the Walk Enumerator (spec 4.C).
    pub fn relative_remainder(&self, descendant: &RemotePath) -> Option<String> {
        let root = self.0.trim_end_matches('/');
        let desc = descendant.as_str();
        if root.is_empty() {
            // root is "/"
            return Some(desc.trim_start_matches('/').to_string());
        }
        if desc == root {
            return Some(String::new());
        }
        let prefix = format!("{root}/");
        desc.strip_prefix(&prefix).map(|s| s.to_string())
    }
}

impl std::fmt::Display for RemotePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&RemotePath> for PathBuf {
    fn from(p: &RemotePath) -> Self {
        PathBuf::from(p.as_str())
    }
}

/// (srcRoot, dstRoot) produced by the Path Planner, consumed by the Walk Enumerator.
#[derive(Debug, Clone)]
pub struct RootMapping {
    pub src_root: RemotePath,
    pub dst_root: RemotePath,
}

/// (srcFile, dstFile) — the unit of work for the Transfer Engine.
#[derive(Debug, Clone)]
pub struct FileTuple {
    pub src_file: RemotePath,
    pub dst_file: RemotePath,
}

/// Remote entry type, as reported by `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

/// Metadata for an existing remote path.
#[derive(Debug, Clone)]
pub struct FileStatus {
    pub entry_type: EntryType,
    pub length: u64,
    pub owner: String,
    pub group: String,
    pub permission: String,
    pub access_time: i64,
    pub modification_time: i64,
    pub replication: u32,
    pub block_size: u64,
}

impl FileStatus {
    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }

    pub fn is_directory(&self) -> bool {
        self.entry_type == EntryType::Directory
    }
}

/// Aggregate size/count under a directory, as reported by `content`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentSummary {
    pub length: u64,
    pub file_count: u64,
}

/// Opaque content digest; two hashes are equal iff both the algorithm and the
/// byte string match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentHash {
    pub algorithm: String,
    pub bytes: Vec<u8>,
}

/// A single directory level as yielded by `walk`: its path, subdirectory names,
/// and file names (basenames only, not full paths).
#[derive(Debug, Clone)]
pub struct WalkEntry {
    pub dir: RemotePath,
    pub subdirs: Vec<String>,
    pub files: Vec<String>,
}

/// Per-call knobs for `Copy`.
#[derive(Debug, Clone)]
pub struct TransferOptions {
    pub overwrite: bool,
    pub checksum: bool,
    pub preserve: bool,
    pub chunk_size: usize,
    pub n_threads: i64,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            checksum: true,
            preserve: false,
            chunk_size: 64 * 1024,
            n_threads: 1,
        }
    }
}

/// Disposition of a single FileTuple once the Transfer Engine has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Copied,
    Skipped,
    Failed,
}

/// The per-tuple result folded by the Outcome Aggregator.
#[derive(Debug, Clone)]
pub struct TransferResult {
    pub src: RemotePath,
    pub dst: RemotePath,
    pub outcome: Outcome,
    pub bytes: u64,
    pub error: Option<String>,
}

/// One (count, bytes) pair in the Summary.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct CountBytes {
    pub count: u64,
    pub bytes: u64,
}

/// Overall disposition of a `Copy` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum SummaryOutcome {
    Successful,
    Failed,
}

/// The aggregated report returned by `Copy`, mirroring `pydistcp`'s summary dict.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Summary {
    pub src_path: String,
    pub dst_path: String,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub duration_secs: f64,
    pub outcome: SummaryOutcome,
    pub expected: CountBytes,
    pub copied: CountBytes,
    pub skipped: CountBytes,
    pub failed: CountBytes,
    pub deleted: CountBytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_dot_and_double_slash() {
        let p = RemotePath::new("/a/./b//c/").unwrap();
        assert_eq!(p.as_str(), "/a/b/c");
    }

    #[test]
    fn rejects_relative() {
        assert!(RemotePath::new("a/b").is_err());
    }

    #[test]
    fn rejects_dotdot() {
        assert!(RemotePath::new("/a/../b").is_err());
    }

    #[test]
    fn root_normalizes_to_slash() {
        let p = RemotePath::new("/").unwrap();
        assert_eq!(p.as_str(), "/");
        assert!(p.is_root());
    }

    #[test]
    fn basename_and_parent() {
        let p = RemotePath::new("/a/b/c.txt").unwrap();
        assert_eq!(p.basename(), "c.txt");
        assert_eq!(p.parent().unwrap().as_str(), "/a/b");
    }

    #[test]
    fn parent_of_top_level_is_root() {
        let p = RemotePath::new("/a").unwrap();
        assert_eq!(p.parent().unwrap().as_str(), "/");
    }

    #[test]
    fn join_appends_child() {
        let p = RemotePath::new("/a/b").unwrap();
        assert_eq!(p.join("c.txt").as_str(), "/a/b/c.txt");
        let root = RemotePath::new("/").unwrap();
        assert_eq!(root.join("c.txt").as_str(), "/c.txt");
    }

    #[test]
    fn relative_remainder_strips_root() {
        let root = RemotePath::new("/a").unwrap();
        let file = RemotePath::new("/a/b/c.txt").unwrap();
        assert_eq!(root.relative_remainder(&file).unwrap(), "b/c.txt");
    }

    #[test]
    fn relative_remainder_of_self_is_empty() {
        let root = RemotePath::new("/a").unwrap();
        assert_eq!(root.relative_remainder(&root).unwrap(), "");
    }

    #[test]
    fn ancestors_walks_from_root() {
        let p = RemotePath::new("/a/b/c").unwrap();
        let anc: Vec<String> = p.ancestors().iter().map(|a| a.as_str().to_string()).collect();
        assert_eq!(anc, vec!["/".to_string(), "/a".to_string(), "/a/b".to_string()]);
    }
}
