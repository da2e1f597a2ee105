/*!
 * The `RemoteFS` and `ProgressSink` contracts (spec 4.A, 6). Both are injected
 * into `Copy`; the core never constructs a concrete implementation itself.
 */

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::model::{ContentHash, ContentSummary, FileStatus, RemotePath, WalkEntry};

/// Options accepted by `write`; both are only meaningful when `preserve` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    pub replication: Option<u32>,
    pub block_size: Option<u64>,
}

/// Typed surface over the remote store. Blocking/synchronous: workers in the
/// Concurrency Harness are OS threads, and every method here is expected to
/// perform (or block on) one HTTP round trip to the WebHDFS-compatible
/// metadata/data service.
pub trait RemoteFS: Send + Sync {
    /// Normalize `p` and reject unreachable roots.
    fn resolve_path(&self, p: &str) -> Result<RemotePath>;

    /// `None` means absent. When `strict` is true, absence is reported by the
    /// caller as `RpcError("File does not exist...")` instead (see
    /// `DistcpError::is_not_found`); this method itself always returns `None`
    /// on absence so callers can choose how to react.
    fn status(&self, p: &RemotePath, strict: bool) -> Result<Option<FileStatus>>;

    /// Expand a glob pattern (`*`, `?`) against the source tree. Ordering must
    /// be deterministic.
    fn glob(&self, pattern: &str) -> Result<Vec<RemotePath>>;

    /// Yield `(dir, subdirs, files)` levels under `root`. Empty for a regular file.
    fn walk(&self, root: &RemotePath) -> Result<Vec<WalkEntry>>;

    fn checksum(&self, p: &RemotePath) -> Result<ContentHash>;

    /// Aggregate length and file count under `p`.
    fn content(&self, p: &RemotePath) -> Result<ContentSummary>;

    /// A finite, forward-only byte stream. Scoped: the caller releases it
    /// before reporting a result, on every exit path.
    fn read(&self, p: &RemotePath) -> Result<Box<dyn Read + Send>>;

    /// Create `p` and return a writer. `p` must not pre-exist; callers use
    /// staging + rename to satisfy this.
    fn write(&self, p: &RemotePath, opts: WriteOptions) -> Result<Box<dyn Write + Send>>;

    /// Idempotent; creates only the leaf segment (the engine walks the chain).
    fn makedirs(&self, p: &RemotePath) -> Result<()>;

    fn delete(&self, p: &RemotePath) -> Result<()>;

    /// Atomic per the underlying store's guarantees.
    fn rename(&self, from: &RemotePath, to: &RemotePath) -> Result<()>;

    fn set_owner(&self, p: &RemotePath, owner: &str, group: &str) -> Result<()>;
    fn set_permission(&self, p: &RemotePath, permission: &str) -> Result<()>;
    fn set_times(&self, p: &RemotePath, access_time: i64, modification_time: i64) -> Result<()>;
    fn set_replication(&self, p: &RemotePath, replication: u32) -> Result<()>;
}

/// `(path, nbytes)`. The first call for a given path marks it "transferring";
/// subsequent positive `nbytes` are cumulative byte counts; `nbytes == -1`
/// marks the path complete. Implementations that are not internally
/// thread-safe rely on the harness's `progressLock` (see `core::harness`),
/// which wraps every call.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, path: &RemotePath, nbytes: i64);
}

/// A `ProgressSink` that does nothing, for callers that don't need progress.
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn on_progress(&self, _path: &RemotePath, _nbytes: i64) {}
}

/// Cooperative cancellation, checked at chunk boundaries in STREAM and between
/// state-machine steps (spec 4.F, 5).
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_token_starts_uncancelled() {
        let tok = CancellationToken::new();
        assert!(!tok.is_cancelled());
    }

    #[test]
    fn cancellation_token_is_shared_across_clones() {
        let tok = CancellationToken::new();
        let clone = tok.clone();
        clone.cancel();
        assert!(tok.is_cancelled());
    }

    #[test]
    fn noop_progress_sink_does_not_panic() {
        let sink = NoopProgressSink;
        let path = RemotePath::new("/a/b.txt").unwrap();
        sink.on_progress(&path, 10);
        sink.on_progress(&path, -1);
    }
}
