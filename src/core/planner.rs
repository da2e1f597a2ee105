/*!
 * Path Planner (spec 4.B): expands the source glob, resolves each matched
 * source against the destination, and detects collisions before any bytes move.
 */

use std::collections::HashMap;

use crate::error::{DistcpError, Result};
use crate::model::RootMapping;
use crate::remotefs::RemoteFS;

pub fn plan(fs: &dyn RemoteFS, src_pattern: &str, dst_path: &str, overwrite: bool) -> Result<Vec<RootMapping>> {
    let dst_path = fs.resolve_path(dst_path)?;

    let src_roots = fs.glob(src_pattern)?;
    if src_roots.is_empty() {
        return Err(DistcpError::NoSourceMatch(src_pattern.to_string()));
    }

    let dst_status = fs.status(&dst_path, false)?;

    let mut mappings = Vec::with_capacity(src_roots.len());

    match dst_status {
        None => {
            let parent = dst_path
                .parent()
                .ok_or_else(|| DistcpError::MissingDestinationParent(dst_path.as_str().into()))?;
            if fs.status(&parent, true)?.is_none() {
                return Err(DistcpError::MissingDestinationParent(dst_path.as_str().into()));
            }
            if src_roots.len() > 1 {
                return Err(DistcpError::Collision {
                    dst: dst_path.as_str().into(),
                    sources: src_roots.iter().map(|p| p.as_str().into()).collect(),
                });
            }
            mappings.push(RootMapping {
                src_root: src_roots[0].clone(),
                dst_root: dst_path,
            });
        }
        Some(status) if status.is_file() => {
            if !overwrite {
                return Err(DistcpError::DestinationExists(dst_path.as_str().into()));
            }
            if src_roots.len() > 1 {
                return Err(DistcpError::Collision {
                    dst: dst_path.as_str().into(),
                    sources: src_roots.iter().map(|p| p.as_str().into()).collect(),
                });
            }
            mappings.push(RootMapping {
                src_root: src_roots[0].clone(),
                dst_root: dst_path,
            });
        }
        Some(_directory) => {
            for src_root in &src_roots {
                let dst_root = dst_path.join(src_root.basename());
                if !overwrite && fs.status(&dst_root, false)?.is_some() {
                    return Err(DistcpError::DestinationExists(dst_root.as_str().into()));
                }
                mappings.push(RootMapping {
                    src_root: src_root.clone(),
                    dst_root,
                });
            }
        }
    }

    detect_collisions(&mappings)?;
    Ok(mappings)
}

fn detect_collisions(mappings: &[RootMapping]) -> Result<()> {
    let mut seen: HashMap<&str, Vec<&str>> = HashMap::new();
    for m in mappings {
        seen.entry(m.dst_root.as_str())
            .or_default()
            .push(m.src_root.as_str());
    }
    for (dst, sources) in seen {
        if sources.len() > 1 {
            return Err(DistcpError::Collision {
                dst: dst.into(),
                sources: sources.iter().map(|s| (*s).into()).collect(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RemotePath;
    use crate::system::mock::MemFs;

    fn rp(s: &str) -> RemotePath {
        RemotePath::new(s).unwrap()
    }

    #[test]
    fn single_file_to_nonexistent_destination() {
        let fs = MemFs::new();
        fs.add_file("/a/x.bin", b"0123456789".to_vec());
        fs.add_dir("/b");

        let mappings = plan(&fs, "/a/x.bin", "/b/y.bin", false).unwrap();
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].dst_root, rp("/b/y.bin"));
    }

    #[test]
    fn missing_destination_parent_fails() {
        let fs = MemFs::new();
        fs.add_file("/a/x.bin", b"hi".to_vec());

        let err = plan(&fs, "/a/x.bin", "/nope/y.bin", false).unwrap_err();
        assert!(matches!(err, DistcpError::MissingDestinationParent(_)));
    }

    #[test]
    fn single_file_to_existing_directory() {
        let fs = MemFs::new();
        fs.add_file("/a/x.bin", b"hi".to_vec());
        fs.add_dir("/b");

        let mappings = plan(&fs, "/a/x.bin", "/b", false).unwrap();
        assert_eq!(mappings[0].dst_root, rp("/b/x.bin"));
    }

    #[test]
    fn existing_destination_without_overwrite_fails() {
        let fs = MemFs::new();
        fs.add_dir("/a");
        fs.add_file("/a/f.bin", b"hi".to_vec());
        fs.add_dir("/b");
        fs.add_dir("/b/a");

        let err = plan(&fs, "/a", "/b", false).unwrap_err();
        assert!(matches!(err, DistcpError::DestinationExists(_)));
    }

    #[test]
    fn glob_collision_is_detected() {
        let fs = MemFs::new();
        fs.add_file("/root/p/file.bin", b"1".to_vec());
        fs.add_file("/root/q/file.bin", b"2".to_vec());
        fs.add_dir("/out");

        let err = plan(&fs, "/root/*/file.bin", "/out/file.bin", false).unwrap_err();
        assert!(matches!(err, DistcpError::Collision { .. }));
    }

    #[test]
    fn no_source_match_fails() {
        let fs = MemFs::new();
        fs.add_dir("/b");
        let err = plan(&fs, "/nothing/*.bin", "/b", false).unwrap_err();
        assert!(matches!(err, DistcpError::NoSourceMatch(_)));
    }

    #[test]
    fn overwrite_permits_existing_file_destination() {
        let fs = MemFs::new();
        fs.add_file("/a/x.bin", b"new".to_vec());
        fs.add_file("/b/y.bin", b"old".to_vec());

        let mappings = plan(&fs, "/a/x.bin", "/b/y.bin", true).unwrap();
        assert_eq!(mappings[0].dst_root, rp("/b/y.bin"));
    }
}
