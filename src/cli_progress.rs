/*!
 * CLI progress rendering (spec 14), grounded on `pydistcp`'s single-line
 * pending/transferring/complete percentage display. Reuses the teacher's
 * channel-based publisher/subscriber shape, repurposed around `ProgressSink`.
 */

use std::collections::HashMap;
use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};

use crate::model::RemotePath;
use crate::remotefs::ProgressSink;

/// Minimum gap between redraws of the progress line, so a fast stream of
/// small chunks doesn't flood a non-interactive stderr.
const MIN_REDRAW_INTERVAL: Duration = Duration::from_millis(100);

struct ProgressMsg {
    path: RemotePath,
    nbytes: i64,
}

/// A `ProgressSink` that forwards every call onto a bounded channel, so the
/// rendering thread never blocks a transfer worker.
#[derive(Clone)]
pub struct ChannelProgressSink {
    sender: Sender<ProgressMsg>,
}

impl ChannelProgressSink {
    pub fn new(capacity: usize) -> (Self, Receiver<ProgressMsg>) {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        (Self { sender }, receiver)
    }
}

impl ProgressSink for ChannelProgressSink {
    fn on_progress(&self, path: &RemotePath, nbytes: i64) {
        // Best-effort: a full or disconnected channel (renderer already
        // exited) must never stall a transfer.
        let _ = self.sender.try_send(ProgressMsg { path: path.clone(), nbytes });
    }
}

/// Consumes a `ChannelProgressSink`'s receiver and renders a single,
/// continuously-rewritten status line.
pub struct CliProgressRenderer {
    receiver: Receiver<ProgressMsg>,
    total_bytes: u64,
    verbose: bool,
}

impl CliProgressRenderer {
    pub fn new(receiver: Receiver<ProgressMsg>, total_bytes: u64, verbose: bool) -> Self {
        Self { receiver, total_bytes, verbose }
    }

    /// Run on the current thread until the sender side is dropped.
    pub fn run(self) -> io::Result<()> {
        let mut in_flight: HashMap<String, u64> = HashMap::new();
        let mut complete_bytes: u64 = 0;
        let mut last_draw: Option<Instant> = None;
        let mut stderr = io::stderr();

        for msg in self.receiver.iter() {
            if msg.nbytes < 0 {
                if let Some(bytes) = in_flight.remove(msg.path.as_str()) {
                    complete_bytes += bytes;
                }
                if self.verbose {
                    eprintln!("\n  complete: {}", msg.path);
                }
            } else {
                in_flight.insert(msg.path.as_str().to_string(), msg.nbytes as u64);
            }

            let due = match last_draw {
                Some(t) => t.elapsed() >= MIN_REDRAW_INTERVAL,
                None => true,
            };
            if !due {
                continue;
            }
            last_draw = Some(Instant::now());

            let transferring: u64 = in_flight.values().sum();
            let pending = self.total_bytes.saturating_sub(complete_bytes + transferring);
            let pct = if self.total_bytes > 0 {
                (complete_bytes as f64 / self.total_bytes as f64) * 100.0
            } else {
                100.0
            };

            write!(
                stderr,
                "\r{pct:.1}% (pending: {}, transferring: {}, complete: {})",
                format_bytes(pending),
                format_bytes(transferring),
                format_bytes(complete_bytes),
            )?;
            stderr.flush()?;
        }

        eprintln!();
        Ok(())
    }

    /// Spawn the renderer in a background thread.
    pub fn spawn(self) -> thread::JoinHandle<io::Result<()>> {
        thread::spawn(move || self.run())
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{size:.2} {}", UNITS[unit_idx])
    }
}
