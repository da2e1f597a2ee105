/*!
 * Streaming checksum calculation, shared by `LocalFs::checksum` (spec 4.A)
 * and the Equivalence Oracle (spec 4.D).
 */

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::model::ContentHash;

/// Streaming hasher that calculates checksum incrementally
pub struct StreamingHasher {
    hasher: Sha256,
}

impl StreamingHasher {
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    pub fn finalize(self) -> ContentHash {
        ContentHash {
            algorithm: "sha256".to_string(),
            bytes: self.hasher.finalize().to_vec(),
        }
    }
}

impl Default for StreamingHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a local file's content, 64KB at a time.
pub fn calculate_checksum(path: &Path) -> Result<ContentHash> {
    let mut file = BufReader::new(File::open(path)?);
    let mut hasher = StreamingHasher::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_streaming_hasher() {
        let mut hasher = StreamingHasher::new();
        hasher.update(b"hello ");
        hasher.update(b"world");

        let result = hasher.finalize();
        assert_eq!(result.algorithm, "sha256");
        assert_eq!(hex::encode(&result.bytes).len(), 64);
    }

    #[test]
    fn test_calculate_checksum() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"test data").unwrap();
        temp.flush().unwrap();

        let checksum = calculate_checksum(temp.path()).unwrap();
        assert_eq!(checksum.algorithm, "sha256");
        assert_eq!(checksum.bytes.len(), 32);
    }
}
