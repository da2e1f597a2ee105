/*!
 * Walk Enumerator (spec 4.C): expands each planned RootMapping into leaf
 * FileTuples.
 */

use crate::error::Result;
use crate::model::{FileTuple, RootMapping};
use crate::remotefs::RemoteFS;

pub fn enumerate(fs: &dyn RemoteFS, mapping: &RootMapping) -> Result<Vec<FileTuple>> {
    let levels = fs.walk(&mapping.src_root)?;

    if levels.is_empty() {
        return Ok(vec![FileTuple {
            src_file: mapping.src_root.clone(),
            dst_file: mapping.dst_root.clone(),
        }]);
    }

    let mut tuples = Vec::new();
    for level in levels {
        for name in &level.files {
            let src_file = level.dir.join(name);
            let remainder = mapping
                .src_root
                .relative_remainder(&src_file)
                .unwrap_or_else(|| name.clone());
            let dst_file = mapping.dst_root.join(&remainder);
            tuples.push(FileTuple { src_file, dst_file });
        }
    }
    Ok(tuples)
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
    fn single_file_root_yields_one_tuple() {
        let fs = MemFs::new();
        fs.add_file("/a/x.bin", b"data".to_vec());

        let mapping = RootMapping {
            src_root: rp("/a/x.bin"),
            dst_root: rp("/b/y.bin"),
        };
        let tuples = enumerate(&fs, &mapping).unwrap();
        assert_eq!(tuples.len(), 1);
        assert_eq!(tuples[0].src_file, rp("/a/x.bin"));
        assert_eq!(tuples[0].dst_file, rp("/b/y.bin"));
    }

    #[test]
    fn directory_root_flattens_nested_files() {
        let fs = MemFs::new();
        fs.add_dir("/a");
        fs.add_file("/a/one.txt", b"1".to_vec());
        fs.add_dir("/a/sub");
        fs.add_file("/a/sub/two.txt", b"22".to_vec());

        let mapping = RootMapping {
            src_root: rp("/a"),
            dst_root: rp("/b/a"),
        };
        let mut tuples = enumerate(&fs, &mapping).unwrap();
        tuples.sort_by(|a, b| a.dst_file.as_str().cmp(b.dst_file.as_str()));

        assert_eq!(tuples.len(), 2);
        assert_eq!(tuples[0].dst_file, rp("/b/a/one.txt"));
        assert_eq!(tuples[1].dst_file, rp("/b/a/sub/two.txt"));
        assert_eq!(tuples[1].src_file, rp("/a/sub/two.txt"));
    }

    #[test]
    fn empty_directory_contributes_no_tuples() {
        let fs = MemFs::new();
        fs.add_dir("/a");
        fs.add_dir("/a/empty");
        fs.add_file("/a/keep.txt", b"x".to_vec());

        let mapping = RootMapping {
            src_root: rp("/a"),
            dst_root: rp("/b/a"),
        };
        let tuples = enumerate(&fs, &mapping).unwrap();
        assert_eq!(tuples.len(), 1);
        assert_eq!(tuples[0].dst_file, rp("/b/a/keep.txt"));
    }
}
