//! Error types for rendercrate

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for rendercrate operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// An operation was called in a state or mode that does not support it,
    /// e.g. reading the depth buffer of an interactive window.
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("No points loaded from {}", path.display())]
    NoPointsLoaded { path: PathBuf },

    /// A mesh was given where a point cloud is required, or the other way round.
    #[error("Geometry mismatch: {0}")]
    GeometryMismatch(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Visualization error: {0}")]
    Visualization(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for rendercrate operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(feature = "gpu")]
impl From<wgpu::BufferAsyncError> for Error {
    fn from(e: wgpu::BufferAsyncError) -> Self {
        Error::Gpu(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_points_message_carries_path() {
        let err = Error::NoPointsLoaded { path: PathBuf::from("/data/empty.ply") };
        assert_eq!(err.to_string(), "No points loaded from /data/empty.ply");
    }
}
