/*!
 * Transfer Engine (spec 4.E): copies one FileTuple through
 * stage -> prep_dirs -> stream -> [replace] -> [preserve] -> done.
 */

use std::io::Read;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::oracle;
use crate::error::{DistcpError, Result};
use crate::model::{FileTuple, Outcome, RemotePath, RootMapping, TransferOptions, TransferResult};
use crate::remotefs::{CancellationToken, ProgressSink, RemoteFS, WriteOptions};

/// Collaborators shared by every worker in one `Copy` call: the locks are
/// process-wide for the duration of the call (spec 4.F, 5), never held across
/// a remote call except `dir_lock` during PREP_DIRS.
pub struct TransferContext<'a> {
    pub fs: &'a dyn RemoteFS,
    pub mapping: &'a RootMapping,
    pub opts: &'a TransferOptions,
    pub progress: &'a dyn ProgressSink,
    pub dir_lock: &'a Mutex<()>,
    pub progress_lock: &'a Mutex<()>,
    pub cancel: &'a CancellationToken,
}

impl TransferContext<'_> {
    fn notify(&self, path: &RemotePath, nbytes: i64) {
        let _guard = self.progress_lock.lock().unwrap();
        self.progress.on_progress(path, nbytes);
    }
}

/// Run the Transfer Engine for one tuple. Never panics out to the caller in
/// the happy path; the Concurrency Harness additionally wraps this call in
/// `catch_unwind` to absorb true Rust panics, per the "a worker never throws
/// out of the harness" requirement.
pub fn transfer_one(ctx: &TransferContext<'_>, tuple: &FileTuple) -> TransferResult {
    let src = &tuple.src_file;
    let dst = &tuple.dst_file;
    let mut completed = false;

    let outcome = run(ctx, tuple, &mut completed);

    if !completed {
        ctx.notify(src, -1);
    }

    match outcome {
        Ok((outcome, bytes)) => TransferResult {
            src: src.clone(),
            dst: dst.clone(),
            outcome,
            bytes,
            error: None,
        },
        Err(e) => TransferResult {
            src: src.clone(),
            dst: dst.clone(),
            outcome: Outcome::Failed,
            bytes: 0,
            error: Some(e.to_string()),
        },
    }
}

fn run(ctx: &TransferContext<'_>, tuple: &FileTuple, completed: &mut bool) -> Result<(Outcome, u64)> {
    let src = &tuple.src_file;
    let dst = &tuple.dst_file;

    if ctx.cancel.is_cancelled() {
        return Err(DistcpError::Cancelled);
    }

    let dst_status = ctx.fs.status(dst, false)?;

    let stage = match dst_status {
        None => dst.clone(),
        Some(_) if !ctx.opts.overwrite => {
            return Err(DistcpError::DestinationExists(dst.as_str().into()));
        }
        Some(_) => {
            if ctx.opts.checksum && oracle::should_skip(ctx.fs, src, dst)? {
                let src_len = ctx
                    .fs
                    .status(src, true)?
                    .map(|s| s.length)
                    .unwrap_or(0);
                ctx.notify(src, src_len as i64);
                ctx.notify(src, -1);
                *completed = true;
                return Ok((Outcome::Skipped, src_len));
            }
            temp_stage_path(dst)
        }
    };

    if ctx.cancel.is_cancelled() {
        return Err(DistcpError::Cancelled);
    }

    prep_dirs(ctx, &stage)?;

    let bytes = stream(ctx, src, &stage)?;
    *completed = true;

    if stage != *dst {
        ctx.fs.delete(dst).or_else(|e| if e.is_not_found() { Ok(()) } else { Err(e) })?;
        ctx.fs.rename(&stage, dst)?;
    }

    if ctx.opts.preserve {
        preserve(ctx, src, dst)?;
    }

    Ok((Outcome::Copied, bytes))
}

fn temp_stage_path(dst: &RemotePath) -> RemotePath {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    RemotePath::new(format!(
        "{}.temp-{}-{}",
        dst.as_str(),
        now.as_secs(),
        now.subsec_nanos()
    ))
    .expect("stage path derived from a valid RemotePath stays valid")
}

fn prep_dirs(ctx: &TransferContext<'_>, stage: &RemotePath) -> Result<()> {
    let _guard = ctx.dir_lock.lock().unwrap();

    for ancestor in stage.ancestors() {
        if ancestor.is_root() {
            continue;
        }
        if ctx.fs.status(&ancestor, false)?.is_none() {
            ctx.fs.makedirs(&ancestor)?;
            if ctx.opts.preserve {
                preserve_created_directory(ctx, &ancestor)?;
            }
        }
    }
    Ok(())
}

/// Map a newly created destination directory back through the RootMapping to
/// find its source counterpart, per the safe reading documented in spec 9
/// (never through the stage path).
fn preserve_created_directory(ctx: &TransferContext<'_>, created: &RemotePath) -> Result<()> {
    let Some(remainder) = ctx.mapping.dst_root.relative_remainder(created) else {
        return Ok(());
    };
    let src_dir = if remainder.is_empty() {
        ctx.mapping.src_root.clone()
    } else {
        ctx.mapping.src_root.join(&remainder)
    };

    let Some(status) = ctx.fs.status(&src_dir, false)? else {
        return Ok(());
    };

    ctx.fs.set_owner(created, &status.owner, &status.group)?;
    ctx.fs.set_permission(created, &status.permission)?;
    ctx.fs
        .set_times(created, status.access_time, status.modification_time)?;
    Ok(())
}

fn stream(ctx: &TransferContext<'_>, src: &RemotePath, stage: &RemotePath) -> Result<u64> {
    let src_status = ctx.fs.status(src, true)?;
    let write_opts = if ctx.opts.preserve {
        match &src_status {
            Some(s) if s.is_file() => WriteOptions {
                replication: Some(s.replication),
                block_size: Some(s.block_size),
            },
            _ => WriteOptions::default(),
        }
    } else {
        WriteOptions::default()
    };

    let mut reader = ctx.fs.read(src)?;
    let mut writer = ctx.fs.write(stage, write_opts)?;

    let mut buf = vec![0u8; ctx.opts.chunk_size];
    let mut total: u64 = 0;

    loop {
        if ctx.cancel.is_cancelled() {
            return Err(DistcpError::Cancelled);
        }
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        std::io::Write::write_all(&mut writer, &buf[..n])?;
        total += n as u64;
        ctx.notify(src, total as i64);
    }

    drop(reader);
    std::io::Write::flush(&mut writer)?;
    drop(writer);

    ctx.notify(src, -1);
    Ok(total)
}

fn preserve(ctx: &TransferContext<'_>, src: &RemotePath, dst: &RemotePath) -> Result<()> {
    let Some(status) = ctx.fs.status(src, true)? else {
        return Ok(());
    };
    ctx.fs.set_owner(dst, &status.owner, &status.group)?;
    ctx.fs.set_permission(dst, &status.permission)?;
    ctx.fs
        .set_times(dst, status.access_time, status.modification_time)?;
    if status.is_file() {
        ctx.fs.set_replication(dst, status.replication)?;
    }
    Ok(())
}
