/*!
 * In-memory `RemoteFS` test double, synchronous, implementing the
 * `RemoteFS` contract in full.
 */

use std::collections::{BTreeSet, HashMap};
use std::io::{Cursor, Read, Write};
use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};

use crate::error::{DistcpError, Result};
use crate::model::{ContentHash, ContentSummary, EntryType, FileStatus, RemotePath, WalkEntry};
use crate::remotefs::{RemoteFS, WriteOptions};

#[derive(Debug, Clone)]
struct Attrs {
    owner: String,
    group: String,
    permission: String,
    access_time: i64,
    modification_time: i64,
}

impl Attrs {
    fn file_defaults() -> Self {
        Self {
            owner: "nobody".into(),
            group: "nobody".into(),
            permission: "644".into(),
            access_time: 0,
            modification_time: 0,
        }
    }

    fn dir_defaults() -> Self {
        Self {
            permission: "755".into(),
            ..Self::file_defaults()
        }
    }
}

#[derive(Debug, Clone)]
enum Payload {
    File {
        data: Vec<u8>,
        checksum_algorithm: String,
        replication: u32,
        block_size: u64,
    },
    Dir,
}

#[derive(Debug, Clone)]
struct Entry {
    attrs: Attrs,
    payload: Payload,
}

/// A flat in-memory store keyed by normalized path string.
#[derive(Default)]
pub struct MemFs {
    inner: Arc<Mutex<HashMap<String, Entry>>>,
}

fn not_found(p: &str) -> DistcpError {
    DistcpError::Rpc(format!("File does not exist: {p}"))
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: &str, data: Vec<u8>) {
        let mut store = self.inner.lock().unwrap();
        store.insert(
            path.to_string(),
            Entry {
                attrs: Attrs::file_defaults(),
                payload: Payload::File {
                    data,
                    checksum_algorithm: "sha256".into(),
                    replication: 1,
                    block_size: 128 * 1024 * 1024,
                },
            },
        );
    }

    pub fn add_dir(&self, path: &str) {
        let mut store = self.inner.lock().unwrap();
        store.entry(path.to_string()).or_insert(Entry {
            attrs: Attrs::dir_defaults(),
            payload: Payload::Dir,
        });
    }

    pub fn get_data(&self, path: &str) -> Option<Vec<u8>> {
        let store = self.inner.lock().unwrap();
        match store.get(path) {
            Some(Entry { payload: Payload::File { data, .. }, .. }) => Some(data.clone()),
            _ => None,
        }
    }

    pub fn has_temp_artifacts(&self) -> bool {
        let store = self.inner.lock().unwrap();
        store.keys().any(|k| k.contains(".temp-"))
    }

    pub fn set_checksum_algorithm(&self, path: &str, algorithm: &str) {
        let mut store = self.inner.lock().unwrap();
        if let Some(Entry { payload: Payload::File { checksum_algorithm, .. }, .. }) =
            store.get_mut(path)
        {
            *checksum_algorithm = algorithm.to_string();
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_attrs(
        &self,
        path: &str,
        owner: &str,
        group: &str,
        permission: &str,
        access_time: i64,
        modification_time: i64,
        replication: u32,
        block_size: u64,
    ) {
        let mut store = self.inner.lock().unwrap();
        if let Some(entry) = store.get_mut(path) {
            entry.attrs.owner = owner.to_string();
            entry.attrs.group = group.to_string();
            entry.attrs.permission = permission.to_string();
            entry.attrs.access_time = access_time;
            entry.attrs.modification_time = modification_time;
            if let Payload::File { replication: r, block_size: b, .. } = &mut entry.payload {
                *r = replication;
                *b = block_size;
            }
        }
    }

    fn status_of(entry: &Entry) -> FileStatus {
        match &entry.payload {
            Payload::File { data, replication, block_size, .. } => FileStatus {
                entry_type: EntryType::File,
                length: data.len() as u64,
                owner: entry.attrs.owner.clone(),
                group: entry.attrs.group.clone(),
                permission: entry.attrs.permission.clone(),
                access_time: entry.attrs.access_time,
                modification_time: entry.attrs.modification_time,
                replication: *replication,
                block_size: *block_size,
            },
            Payload::Dir => FileStatus {
                entry_type: EntryType::Directory,
                length: 0,
                owner: entry.attrs.owner.clone(),
                group: entry.attrs.group.clone(),
                permission: entry.attrs.permission.clone(),
                access_time: entry.attrs.access_time,
                modification_time: entry.attrs.modification_time,
                replication: 0,
                block_size: 0,
            },
        }
    }
}

struct MemWriter {
    store: Arc<Mutex<HashMap<String, Entry>>>,
    path: String,
    buffer: Vec<u8>,
    opts: WriteOptions,
}

impl Write for MemWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut store = self.store.lock().unwrap();
        store.insert(
            self.path.clone(),
            Entry {
                attrs: Attrs::file_defaults(),
                payload: Payload::File {
                    data: self.buffer.clone(),
                    checksum_algorithm: "sha256".into(),
                    replication: self.opts.replication.unwrap_or(1),
                    block_size: self.opts.block_size.unwrap_or(128 * 1024 * 1024),
                },
            },
        );
        Ok(())
    }
}

impl RemoteFS for MemFs {
    fn resolve_path(&self, p: &str) -> Result<RemotePath> {
        RemotePath::new(p)
    }

    fn status(&self, p: &RemotePath, _strict: bool) -> Result<Option<FileStatus>> {
        // `strict` only governs how a *caller* reacts to absence (see the
        // trait doc comment); this mock never raises on a missing path.
        let store = self.inner.lock().unwrap();
        Ok(store.get(p.as_str()).map(Self::status_of))
    }

    fn glob(&self, pattern: &str) -> Result<Vec<RemotePath>> {
        let glob_pattern = glob::Pattern::new(pattern)
            .map_err(|e| DistcpError::InvalidOption(format!("bad glob pattern: {e}")))?;
        let opts = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        let store = self.inner.lock().unwrap();
        let mut matches: Vec<String> = store
            .keys()
            .filter(|k| glob_pattern.matches_with(k, opts))
            .cloned()
            .collect();
        matches.sort();
        matches
            .into_iter()
            .map(RemotePath::new)
            .collect::<Result<Vec<_>>>()
    }

    fn walk(&self, root: &RemotePath) -> Result<Vec<WalkEntry>> {
        let store = self.inner.lock().unwrap();

        if let Some(Entry { payload: Payload::File { .. }, .. }) = store.get(root.as_str()) {
            return Ok(vec![]);
        }

        let mut dirs: BTreeSet<String> = BTreeSet::new();
        dirs.insert(root.as_str().to_string());

        for (path, entry) in store.iter() {
            let Ok(p) = RemotePath::new(path.clone()) else {
                continue;
            };
            if root.relative_remainder(&p).is_none() {
                continue;
            }
            match entry.payload {
                Payload::Dir => {
                    dirs.insert(path.clone());
                }
                Payload::File { .. } => {
                    if let Some(parent) = p.parent() {
                        if root.relative_remainder(&parent).is_some() {
                            dirs.insert(parent.as_str().to_string());
                        }
                    }
                }
            }
        }

        let mut levels = Vec::new();
        for dir in &dirs {
            let mut files = Vec::new();
            let mut subdirs = Vec::new();
            for (path, entry) in store.iter() {
                if path == dir {
                    continue;
                }
                let Ok(p) = RemotePath::new(path.clone()) else {
                    continue;
                };
                if let Some(parent) = p.parent() {
                    if parent.as_str() == dir.as_str() {
                        match entry.payload {
                            Payload::File { .. } => files.push(p.basename().to_string()),
                            Payload::Dir => subdirs.push(p.basename().to_string()),
                        }
                    }
                }
            }
            files.sort();
            subdirs.sort();
            levels.push(WalkEntry {
                dir: RemotePath::new(dir.clone())?,
                subdirs,
                files,
            });
        }
        Ok(levels)
    }

    fn checksum(&self, p: &RemotePath) -> Result<ContentHash> {
        let store = self.inner.lock().unwrap();
        match store.get(p.as_str()) {
            Some(Entry { payload: Payload::File { data, checksum_algorithm, .. }, .. }) => {
                let bytes = if checksum_algorithm == "sha256" {
                    Sha256::digest(data).to_vec()
                } else {
                    data.clone()
                };
                Ok(ContentHash {
                    algorithm: checksum_algorithm.clone(),
                    bytes,
                })
            }
            Some(Entry { payload: Payload::Dir, .. }) => {
                Err(DistcpError::Rpc(format!("is a directory: {p}")))
            }
            None => Err(not_found(p.as_str())),
        }
    }

    fn content(&self, p: &RemotePath) -> Result<ContentSummary> {
        let store = self.inner.lock().unwrap();
        match store.get(p.as_str()) {
            Some(Entry { payload: Payload::File { data, .. }, .. }) => Ok(ContentSummary {
                length: data.len() as u64,
                file_count: 1,
            }),
            Some(Entry { payload: Payload::Dir, .. }) => {
                let mut summary = ContentSummary::default();
                for (path, entry) in store.iter() {
                    let Ok(candidate) = RemotePath::new(path.clone()) else {
                        continue;
                    };
                    if p.relative_remainder(&candidate).is_none() || candidate == *p {
                        continue;
                    }
                    if let Payload::File { data, .. } = &entry.payload {
                        summary.length += data.len() as u64;
                        summary.file_count += 1;
                    }
                }
                Ok(summary)
            }
            None => Err(not_found(p.as_str())),
        }
    }

    fn read(&self, p: &RemotePath) -> Result<Box<dyn Read + Send>> {
        let store = self.inner.lock().unwrap();
        match store.get(p.as_str()) {
            Some(Entry { payload: Payload::File { data, .. }, .. }) => {
                Ok(Box::new(Cursor::new(data.clone())))
            }
            Some(Entry { payload: Payload::Dir, .. }) => {
                Err(DistcpError::Rpc(format!("is a directory: {p}")))
            }
            None => Err(not_found(p.as_str())),
        }
    }

    fn write(&self, p: &RemotePath, opts: WriteOptions) -> Result<Box<dyn Write + Send>> {
        Ok(Box::new(MemWriter {
            store: self.inner.clone(),
            path: p.as_str().to_string(),
            buffer: Vec::new(),
            opts,
        }))
    }

    fn makedirs(&self, p: &RemotePath) -> Result<()> {
        let mut store = self.inner.lock().unwrap();
        store.entry(p.as_str().to_string()).or_insert(Entry {
            attrs: Attrs::dir_defaults(),
            payload: Payload::Dir,
        });
        Ok(())
    }

    fn delete(&self, p: &RemotePath) -> Result<()> {
        let mut store = self.inner.lock().unwrap();
        store
            .remove(p.as_str())
            .map(|_| ())
            .ok_or_else(|| not_found(p.as_str()))
    }

    fn rename(&self, from: &RemotePath, to: &RemotePath) -> Result<()> {
        let mut store = self.inner.lock().unwrap();
        let entry = store
            .remove(from.as_str())
            .ok_or_else(|| not_found(from.as_str()))?;
        store.insert(to.as_str().to_string(), entry);
        Ok(())
    }

    fn set_owner(&self, p: &RemotePath, owner: &str, group: &str) -> Result<()> {
        let mut store = self.inner.lock().unwrap();
        let entry = store
            .get_mut(p.as_str())
            .ok_or_else(|| not_found(p.as_str()))?;
        entry.attrs.owner = owner.to_string();
        entry.attrs.group = group.to_string();
        Ok(())
    }

    fn set_permission(&self, p: &RemotePath, permission: &str) -> Result<()> {
        let mut store = self.inner.lock().unwrap();
        let entry = store
            .get_mut(p.as_str())
            .ok_or_else(|| not_found(p.as_str()))?;
        entry.attrs.permission = permission.to_string();
        Ok(())
    }

    fn set_times(&self, p: &RemotePath, access_time: i64, modification_time: i64) -> Result<()> {
        let mut store = self.inner.lock().unwrap();
        let entry = store
            .get_mut(p.as_str())
            .ok_or_else(|| not_found(p.as_str()))?;
        entry.attrs.access_time = access_time;
        entry.attrs.modification_time = modification_time;
        Ok(())
    }

    fn set_replication(&self, p: &RemotePath, replication: u32) -> Result<()> {
        let mut store = self.inner.lock().unwrap();
        let entry = store
            .get_mut(p.as_str())
            .ok_or_else(|| not_found(p.as_str()))?;
        if let Payload::File { replication: r, .. } = &mut entry.payload {
            *r = replication;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rp(s: &str) -> RemotePath {
        RemotePath::new(s).unwrap()
    }

    #[test]
    fn status_reports_absent_as_none_regardless_of_strict() {
        let fs = MemFs::new();
        assert!(fs.status(&rp("/missing"), false).unwrap().is_none());
        assert!(fs.status(&rp("/missing"), true).unwrap().is_none());
    }

    #[test]
    fn write_then_read_round_trips() {
        let fs = MemFs::new();
        let mut w = fs.write(&rp("/a/out.bin"), WriteOptions::default()).unwrap();
        w.write_all(b"hello").unwrap();
        w.flush().unwrap();
        drop(w);

        let mut r = fs.read(&rp("/a/out.bin")).unwrap();
        let mut buf = Vec::new();
        r.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"hello");
    }

    #[test]
    fn rename_moves_entry() {
        let fs = MemFs::new();
        fs.add_file("/a/tmp.bin", b"x".to_vec());
        fs.rename(&rp("/a/tmp.bin"), &rp("/a/final.bin")).unwrap();
        assert!(fs.status(&rp("/a/tmp.bin"), false).unwrap().is_none());
        assert_eq!(fs.get_data("/a/final.bin").unwrap(), b"x".to_vec());
    }

    #[test]
    fn glob_matches_single_segment_wildcard() {
        let fs = MemFs::new();
        fs.add_file("/root/p/file.bin", b"1".to_vec());
        fs.add_file("/root/q/file.bin", b"2".to_vec());
        fs.add_file("/root/p/other.bin", b"3".to_vec());

        let matches = fs.glob("/root/*/file.bin").unwrap();
        assert_eq!(matches.len(), 2);
    }
}
