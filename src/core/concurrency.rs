/*!
 * Concurrency detection for sizing the transfer worker pool.
 */

/// Detect a sane default worker count based on available CPU parallelism.
///
/// For I/O-bound operations, more threads than CPUs can help hide latency,
/// so this uses 2x CPU count, capped at 16.
pub fn detect_optimal_concurrency() -> usize {
    let cpu_count = num_cpus::get();
    (cpu_count * 2).min(16)
}

// Shim for num_cpus functionality (fallback to std if needed).
mod num_cpus {
    use std::thread;

    pub fn get() -> usize {
        thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or_else(|e| {
                // Default to single-threaded mode for safety if detection fails,
                // e.g. in restricted containers or cgroup environments.
                eprintln!(
                    "WARN: distcp failed to detect available parallelism: {}. \
                    Defaulting to 1 concurrent operation to prevent resource exhaustion.",
                    e
                );
                1
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_optimal_concurrency() {
        let optimal = detect_optimal_concurrency();
        assert!(optimal > 0);
        assert!(optimal <= 16);
    }

    #[test]
    fn test_shim_behavior_sane() {
        // We can't force an Err in the real shim, but we can verify the result is sane.
        let cpus = num_cpus::get();
        assert!(cpus >= 1, "Must report at least 1 CPU");
    }

    #[test]
    fn test_optimal_concurrency_calculation() {
        // If we hypothetically had 1 CPU (fallback case)
        let cpu_count = 1;
        let optimal = (cpu_count * 2).min(16);
        assert_eq!(optimal, 2, "Should allow 2 threads on 1 core (IO bound)");

        // If we had 4 CPUs (common case)
        let cpu_count = 4;
        let optimal = (cpu_count * 2).min(16);
        assert_eq!(optimal, 8);

        // If we had 32 CPUs (cap case)
        let cpu_count = 32;
        let optimal = (cpu_count * 2).min(16);
        assert_eq!(optimal, 16, "Should cap at 16");
    }
}
