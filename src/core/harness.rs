/*!
 * Concurrency Harness (spec 4.F): fans `FileTuple`s out across a worker pool,
 * holding the directory-creation and progress locks that make the sequential
 * Transfer Engine safe to run from many threads at once.
 */

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Mutex;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::core::concurrency::detect_optimal_concurrency;
use crate::core::engine::{self, TransferContext};
use crate::model::{FileTuple, Outcome, RemotePath, RootMapping, TransferOptions, TransferResult};
use crate::remotefs::{CancellationToken, ProgressSink, RemoteFS};

/// `n_threads` follows spec 9: 0 or negative means "one worker per file",
/// capped by `detect_optimal_concurrency` so a million-file tree doesn't spawn
/// a million threads.
fn worker_count(n_threads: i64, n_tuples: usize) -> usize {
    if n_threads > 0 {
        return n_threads as usize;
    }
    n_tuples.max(1).min(detect_optimal_concurrency())
}

/// Run every tuple for one `RootMapping` to completion, never letting a
/// single worker panic escape the pool.
pub fn run(
    fs: &dyn RemoteFS,
    mapping: &RootMapping,
    tuples: &[FileTuple],
    opts: &TransferOptions,
    progress: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Vec<TransferResult> {
    if tuples.is_empty() {
        return Vec::new();
    }

    let workers = worker_count(opts.n_threads, tuples.len());
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .unwrap_or_else(|_| ThreadPoolBuilder::new().num_threads(1).build().unwrap());

    let dir_lock = Mutex::new(());
    let progress_lock = Mutex::new(());

    pool.install(|| {
        use rayon::prelude::*;
        tuples
            .par_iter()
            .map(|tuple| {
                let ctx = TransferContext {
                    fs,
                    mapping,
                    opts,
                    progress,
                    dir_lock: &dir_lock,
                    progress_lock: &progress_lock,
                    cancel,
                };
                run_one_guarded(&ctx, tuple)
            })
            .collect()
    })
}

fn run_one_guarded(ctx: &TransferContext<'_>, tuple: &FileTuple) -> TransferResult {
    match catch_unwind(AssertUnwindSafe(|| engine::transfer_one(ctx, tuple))) {
        Ok(result) => result,
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "worker panicked".to_string());
            tracing::error!(src = %tuple.src_file, dst = %tuple.dst_file, %message, "transfer worker panicked");
            TransferResult {
                src: tuple.src_file.clone(),
                dst: tuple.dst_file.clone(),
                outcome: Outcome::Failed,
                bytes: 0,
                error: Some(message),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remotefs::NoopProgressSink;
    use crate::system::mock::MemFs;

    fn rp(s: &str) -> RemotePath {
        RemotePath::new(s).unwrap()
    }

    #[test]
    fn worker_count_honors_explicit_threads() {
        assert_eq!(worker_count(4, 100), 4);
    }

    #[test]
    fn worker_count_caps_auto_detect_to_tuple_len() {
        assert_eq!(worker_count(0, 2), 2);
    }

    #[test]
    fn runs_every_tuple_to_a_result() {
        let fs = MemFs::new();
        fs.add_dir("/a");
        fs.add_file("/a/one.txt", b"1".to_vec());
        fs.add_file("/a/two.txt", b"22".to_vec());
        fs.add_dir("/b");

        let mapping = RootMapping { src_root: rp("/a"), dst_root: rp("/b") };
        let tuples = vec![
            FileTuple { src_file: rp("/a/one.txt"), dst_file: rp("/b/one.txt") },
            FileTuple { src_file: rp("/a/two.txt"), dst_file: rp("/b/two.txt") },
        ];
        let opts = TransferOptions::default();
        let sink = NoopProgressSink;
        let cancel = CancellationToken::new();

        let results = run(&fs, &mapping, &tuples, &opts, &sink, &cancel);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.outcome == Outcome::Copied));
        assert_eq!(fs.get_data("/b/one.txt").unwrap(), b"1".to_vec());
        assert_eq!(fs.get_data("/b/two.txt").unwrap(), b"22".to_vec());
    }

    #[test]
    fn cancellation_fails_remaining_tuples() {
        let fs = MemFs::new();
        fs.add_dir("/a");
        fs.add_file("/a/one.txt", b"1".to_vec());
        fs.add_dir("/b");

        let mapping = RootMapping { src_root: rp("/a"), dst_root: rp("/b") };
        let tuples = vec![FileTuple { src_file: rp("/a/one.txt"), dst_file: rp("/b/one.txt") }];
        let opts = TransferOptions::default();
        let sink = NoopProgressSink;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let results = run(&fs, &mapping, &tuples, &opts, &sink, &cancel);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].outcome, Outcome::Failed);
    }
}
