//! Local-filesystem `RemoteFS`: the default backend for standalone
//! (local-to-local) copies, and the backend integration tests run against.
//! Synchronous (`std::fs`), implementing the `RemoteFS` contract in full.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use walkdir::WalkDir;

use crate::core::{checksum, metadata};
use crate::error::{DistcpError, Result};
use crate::model::{ContentHash, ContentSummary, EntryType, FileStatus, RemotePath, WalkEntry};
use crate::remotefs::{RemoteFS, WriteOptions};

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }

    fn local_path(&self, p: &RemotePath) -> PathBuf {
        PathBuf::from(p)
    }

    fn status_of(meta: &fs::Metadata) -> FileStatus {
        #[cfg(unix)]
        {
            FileStatus {
                entry_type: if meta.is_dir() { EntryType::Directory } else { EntryType::File },
                length: meta.len(),
                owner: metadata::owner_name(meta.uid()),
                group: metadata::group_name(meta.gid()),
                permission: metadata::permission_string(meta.mode()),
                access_time: meta.atime(),
                modification_time: meta.mtime(),
                replication: 1,
                block_size: meta.blksize(),
            }
        }
        #[cfg(not(unix))]
        {
            use std::time::UNIX_EPOCH;
            let mtime = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0);
            FileStatus {
                entry_type: if meta.is_dir() { EntryType::Directory } else { EntryType::File },
                length: meta.len(),
                owner: "unknown".to_string(),
                group: "unknown".to_string(),
                permission: if meta.permissions().readonly() { "444".into() } else { "644".into() },
                access_time: mtime,
                modification_time: mtime,
                replication: 1,
                block_size: 4096,
            }
        }
    }
}

impl RemoteFS for LocalFs {
    fn resolve_path(&self, p: &str) -> Result<RemotePath> {
        RemotePath::new(p)
    }

    fn status(&self, p: &RemotePath, _strict: bool) -> Result<Option<FileStatus>> {
        match fs::symlink_metadata(self.local_path(p)) {
            Ok(meta) => Ok(Some(Self::status_of(&meta))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DistcpError::Io(e)),
        }
    }

    fn glob(&self, pattern: &str) -> Result<Vec<RemotePath>> {
        let mut matches: Vec<RemotePath> = glob::glob(pattern)
            .map_err(|e| DistcpError::InvalidOption(format!("bad glob pattern: {e}")))?
            .filter_map(|entry| entry.ok())
            .map(|path| RemotePath::new(path.to_string_lossy().as_ref()))
            .collect::<Result<Vec<_>>>()?;
        matches.sort();
        Ok(matches)
    }

    fn walk(&self, root: &RemotePath) -> Result<Vec<WalkEntry>> {
        let local_root = self.local_path(root);
        let meta = fs::symlink_metadata(&local_root)?;
        if meta.is_file() {
            return Ok(vec![]);
        }

        let mut levels = Vec::new();
        for entry in WalkDir::new(&local_root) {
            let entry = entry.map_err(|e| DistcpError::Io(e.into()))?;
            if !entry.file_type().is_dir() {
                continue;
            }

            let dir_remote = RemotePath::new(entry.path().to_string_lossy().as_ref())?;
            let mut files = Vec::new();
            let mut subdirs = Vec::new();

            for child in fs::read_dir(entry.path())? {
                let child = child?;
                let name = child.file_name().to_string_lossy().to_string();
                if child.file_type()?.is_dir() {
                    subdirs.push(name);
                } else {
                    files.push(name);
                }
            }
            files.sort();
            subdirs.sort();
            levels.push(WalkEntry { dir: dir_remote, subdirs, files });
        }
        Ok(levels)
    }

    fn checksum(&self, p: &RemotePath) -> Result<ContentHash> {
        checksum::calculate_checksum(&self.local_path(p))
    }

    fn content(&self, p: &RemotePath) -> Result<ContentSummary> {
        let local = self.local_path(p);
        let meta = fs::symlink_metadata(&local)?;
        if meta.is_file() {
            return Ok(ContentSummary { length: meta.len(), file_count: 1 });
        }

        let mut summary = ContentSummary::default();
        for entry in WalkDir::new(&local) {
            let entry = entry.map_err(|e| DistcpError::Io(e.into()))?;
            if entry.file_type().is_file() {
                summary.length += entry.metadata().map_err(|e| DistcpError::Io(e.into()))?.len();
                summary.file_count += 1;
            }
        }
        Ok(summary)
    }

    fn read(&self, p: &RemotePath) -> Result<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(self.local_path(p))?))
    }

    fn write(&self, p: &RemotePath, _opts: WriteOptions) -> Result<Box<dyn Write + Send>> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.local_path(p))?;
        Ok(Box::new(file))
    }

    fn makedirs(&self, p: &RemotePath) -> Result<()> {
        match fs::create_dir(self.local_path(p)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(DistcpError::Io(e)),
        }
    }

    fn delete(&self, p: &RemotePath) -> Result<()> {
        let local = self.local_path(p);
        let meta = fs::symlink_metadata(&local)?;
        if meta.is_dir() {
            fs::remove_dir_all(&local)?;
        } else {
            fs::remove_file(&local)?;
        }
        Ok(())
    }

    fn rename(&self, from: &RemotePath, to: &RemotePath) -> Result<()> {
        fs::rename(self.local_path(from), self.local_path(to))?;
        Ok(())
    }

    fn set_owner(&self, p: &RemotePath, owner: &str, group: &str) -> Result<()> {
        metadata::chown(&self.local_path(p), owner, group)
    }

    fn set_permission(&self, p: &RemotePath, permission: &str) -> Result<()> {
        metadata::set_permission(&self.local_path(p), permission)
    }

    fn set_times(&self, p: &RemotePath, access_time: i64, modification_time: i64) -> Result<()> {
        metadata::set_times(&self.local_path(p), access_time, modification_time)
    }

    fn set_replication(&self, _p: &RemotePath, _replication: u32) -> Result<()> {
        // Local filesystems have no replication factor; nothing to set.
        Ok(())
    }
}
