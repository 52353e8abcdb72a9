use std::path::PathBuf;
use thiserror::Error;

/// Result type for STL output
pub type Result<T> = std::result::Result<T, StlError>;

/// Errors raised while serializing or writing meshes
#[derive(Error, Debug)]
pub enum StlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Filename pattern '{pattern}' must contain both {{i}} and {{j}}")]
    MissingPlaceholder { pattern: String },

    #[error("Failed to move finished file into place at {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Mesh has {0} triangles, binary STL holds at most u32::MAX")]
    TooManyTriangles(usize),
}
