/*!
 * Equivalence Oracle (spec 4.D): decides whether an existing destination file
 * is already identical to its source, letting the Transfer Engine skip it.
 */

use crate::error::Result;
use crate::model::RemotePath;
use crate::remotefs::RemoteFS;

/// Only called when the destination already exists and `overwrite && checksum`
/// both hold; the caller is responsible for that gating.
pub fn should_skip(fs: &dyn RemoteFS, src: &RemotePath, dst: &RemotePath) -> Result<bool> {
    let src_hash = fs.checksum(src)?;
    let dst_hash = fs.checksum(dst)?;

    if src_hash.algorithm != dst_hash.algorithm {
        tracing::debug!(
            src = %src,
            dst = %dst,
            src_algo = %src_hash.algorithm,
            dst_algo = %dst_hash.algorithm,
            "checksum algorithms differ, not skipping"
        );
        return Ok(false);
    }

    Ok(src_hash.bytes == dst_hash.bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::mock::MemFs;

    fn rp(s: &str) -> RemotePath {
        RemotePath::new(s).unwrap()
    }

    #[test]
    fn identical_content_skips() {
        let fs = MemFs::new();
        fs.add_file("/a/x.bin", b"same bytes".to_vec());
        fs.add_file("/b/x.bin", b"same bytes".to_vec());

        assert!(should_skip(&fs, &rp("/a/x.bin"), &rp("/b/x.bin")).unwrap());
    }

    #[test]
    fn different_content_does_not_skip() {
        let fs = MemFs::new();
        fs.add_file("/a/x.bin", b"one".to_vec());
        fs.add_file("/b/x.bin", b"two".to_vec());

        assert!(!should_skip(&fs, &rp("/a/x.bin"), &rp("/b/x.bin")).unwrap());
    }

    #[test]
    fn differing_algorithm_does_not_skip() {
        let fs = MemFs::new();
        fs.add_file("/a/x.bin", b"same bytes".to_vec());
        fs.add_file("/b/x.bin", b"same bytes".to_vec());
        fs.set_checksum_algorithm("/b/x.bin", "crc32");

        assert!(!should_skip(&fs, &rp("/a/x.bin"), &rp("/b/x.bin")).unwrap());
    }
}
