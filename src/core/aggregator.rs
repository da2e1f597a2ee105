/*!
 * Outcome Aggregator (spec 4.G): folds the Transfer Engine's per-tuple
 * results into the `Summary` returned by `Copy`.
 */

use chrono::{DateTime, Utc};

use crate::model::{CountBytes, Outcome, Summary, SummaryOutcome, TransferResult};
use crate::remotefs::RemoteFS;

pub fn aggregate(
    fs: &dyn RemoteFS,
    src_path: &str,
    dst_path: &str,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    results: &[TransferResult],
) -> Summary {
    let mut expected = CountBytes::default();
    let mut copied = CountBytes::default();
    let mut skipped = CountBytes::default();
    let mut failed = CountBytes::default();

    for result in results {
        // Expected is read from a fresh, authoritative status call rather
        // than trusting `result.bytes`, which is 0 for a failed transfer.
        let expected_bytes = fs
            .status(&result.src, true)
            .ok()
            .flatten()
            .map(|s| s.length)
            .unwrap_or(result.bytes);
        expected.count += 1;
        expected.bytes += expected_bytes;

        match result.outcome {
            Outcome::Copied => {
                copied.count += 1;
                copied.bytes += result.bytes;
            }
            Outcome::Skipped => {
                skipped.count += 1;
                skipped.bytes += result.bytes;
            }
            Outcome::Failed => {
                failed.count += 1;
            }
        }
    }

    let outcome = if failed.count > 0 {
        SummaryOutcome::Failed
    } else {
        SummaryOutcome::Successful
    };

    Summary {
        src_path: src_path.to_string(),
        dst_path: dst_path.to_string(),
        start_time,
        end_time,
        duration_secs: (end_time - start_time).num_milliseconds().max(0) as f64 / 1000.0,
        outcome,
        expected,
        copied,
        skipped,
        failed,
        deleted: CountBytes::default(),
    }
}
