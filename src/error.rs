/*!
 * Error types for the copy engine
 */

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, DistcpError>;

/// Every failure mode the planner, oracle, engine, and harness can produce.
#[derive(Debug, thiserror::Error)]
pub enum DistcpError {
    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("no source matched pattern: {0}")]
    NoSourceMatch(String),

    #[error("destination parent does not exist: {0}")]
    MissingDestinationParent(PathBuf),

    #[error("destination already exists: {0}")]
    DestinationExists(PathBuf),

    #[error("planned sources collide on destination {dst}: {sources:?}")]
    Collision { dst: PathBuf, sources: Vec<PathBuf> },

    #[error("remote operation failed: {0}")]
    Rpc(String),

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("copy cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DistcpError {
    /// Whether an RpcError message names a missing path, per the RemoteFS contract's
    /// requirement that "File does not exist" be recognizable in `status(strict=true)`.
    pub fn is_not_found(&self) -> bool {
        match self {
            DistcpError::Rpc(msg) => msg.contains("File does not exist"),
            DistcpError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_not_found_is_recognized() {
        let err = DistcpError::Rpc("File does not exist: /a/b".to_string());
        assert!(err.is_not_found());
    }

    #[test]
    fn other_rpc_is_not_not_found() {
        let err = DistcpError::Rpc("connection reset".to_string());
        assert!(!err.is_not_found());
    }

    #[test]
    fn io_not_found_is_recognized() {
        let err = DistcpError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.is_not_found());
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            DistcpError::InvalidOption("chunkSize must be > 0".into()).to_string(),
            "invalid option: chunkSize must be > 0"
        );
        assert_eq!(
            DistcpError::DestinationExists(PathBuf::from("/b/x.bin")).to_string(),
            "destination already exists: /b/x.bin"
        );
    }
}
