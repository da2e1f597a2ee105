/*!
 * distcp - concurrent copy planner and transfer orchestrator for
 * WebHDFS-compatible remote file systems.
 *
 * - Path Planner, Walk Enumerator, Equivalence Oracle, Transfer Engine,
 *   Concurrency Harness, and Outcome Aggregator (`core`)
 * - A `RemoteFS` contract (`remotefs`) injected into the pipeline, with a
 *   local-filesystem implementation (`system::local`)
 * - Configuration (`config`) and tracing-based logging (`logging`)
 * - A CLI progress renderer (`cli_progress`) on top of `ProgressSink`
 */

pub mod cli_progress;
pub mod config;
pub mod copy;
pub mod core;
pub mod error;
pub mod logging;
pub mod model;
pub mod remotefs;
pub mod system;

pub use config::{ConfigFile, CopyConfig, LogLevel};
pub use copy::copy;
pub use error::{DistcpError, Result};
pub use model::{
    CountBytes, EntryType, FileStatus, FileTuple, RemotePath, RootMapping, Summary,
    SummaryOutcome, TransferOptions, TransferResult,
};
pub use remotefs::{CancellationToken, NoopProgressSink, ProgressSink, RemoteFS};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
