/*!
 * Core copy pipeline: Path Planner -> Walk Enumerator -> Equivalence Oracle ->
 * Transfer Engine -> Concurrency Harness -> Outcome Aggregator (spec 4).
 */

pub mod aggregator;
pub mod checksum;
pub mod concurrency;
pub mod engine;
pub mod harness;
pub mod metadata;
pub mod oracle;
pub mod planner;
pub mod walker;
