/*!
 * Top-level `Copy` entry point: plans, enumerates, transfers, and aggregates
 * a single `distcp` invocation (spec 3, 4).
 */

use chrono::Utc;

use crate::core::{aggregator, harness, planner, walker};
use crate::error::{DistcpError, Result};
use crate::model::{Summary, TransferOptions};
use crate::remotefs::{CancellationToken, NoopProgressSink, ProgressSink, RemoteFS};

/// Copy everything matched by `src_pattern` to `dst_path`.
///
/// `progress` and `cancel` are optional; when omitted a no-op sink and a
/// token that is never cancelled are used.
pub fn copy(
    fs: &dyn RemoteFS,
    src_pattern: &str,
    dst_path: &str,
    opts: &TransferOptions,
    progress: Option<&dyn ProgressSink>,
    cancel: Option<&CancellationToken>,
) -> Result<Summary> {
    if opts.chunk_size == 0 {
        return Err(DistcpError::InvalidOption(
            "chunk_size must be greater than zero".to_string(),
        ));
    }

    let noop_sink = NoopProgressSink;
    let progress = progress.unwrap_or(&noop_sink);
    let owned_cancel = CancellationToken::new();
    let cancel = cancel.unwrap_or(&owned_cancel);

    let start_time = Utc::now();

    let mappings = planner::plan(fs, src_pattern, dst_path, opts.overwrite)?;

    let mut results = Vec::new();
    for mapping in &mappings {
        if cancel.is_cancelled() {
            break;
        }
        let tuples = walker::enumerate(fs, mapping)?;
        results.extend(harness::run(fs, mapping, &tuples, opts, progress, cancel));
    }

    let end_time = Utc::now();
    Ok(aggregator::aggregate(
        fs,
        src_pattern,
        dst_path,
        start_time,
        end_time,
        &results,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SummaryOutcome;
    use crate::system::mock::MemFs;

    #[test]
    fn copies_a_directory_tree() {
        let fs = MemFs::new();
        fs.add_dir("/src");
        fs.add_file("/src/a.txt", b"aaa".to_vec());
        fs.add_dir("/src/sub");
        fs.add_file("/src/sub/b.txt", b"bb".to_vec());
        fs.add_dir("/out");

        let opts = TransferOptions::default();
        let summary = copy(&fs, "/src", "/out/dst", &opts, None, None).unwrap();

        assert_eq!(summary.outcome, SummaryOutcome::Successful);
        assert_eq!(summary.copied.count, 2);
        assert_eq!(fs.get_data("/out/dst/a.txt").unwrap(), b"aaa".to_vec());
        assert_eq!(fs.get_data("/out/dst/sub/b.txt").unwrap(), b"bb".to_vec());
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let fs = MemFs::new();
        fs.add_file("/a/x.bin", b"1".to_vec());
        fs.add_dir("/b");
        let mut opts = TransferOptions::default();
        opts.chunk_size = 0;

        let err = copy(&fs, "/a/x.bin", "/b/y.bin", &opts, None, None).unwrap_err();
        assert!(matches!(err, DistcpError::InvalidOption(_)));
    }

    #[test]
    fn no_source_match_propagates() {
        let fs = MemFs::new();
        fs.add_dir("/out");
        let opts = TransferOptions::default();
        let err = copy(&fs, "/nope/*.bin", "/out", &opts, None, None).unwrap_err();
        assert!(matches!(err, DistcpError::NoSourceMatch(_)));
    }
}
