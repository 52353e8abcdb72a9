//! STL Grid Output
//!
//! Serializes cell meshes as binary or ASCII STL and writes one file per
//! mesh into an output directory, named from `{i}`/`{j}` filename patterns.

pub mod error;
pub mod output;
pub mod pattern;
pub mod writer;

pub use error::{Result, StlError};
pub use output::{CellPaths, OutputLayout};
pub use pattern::FilenamePattern;
pub use writer::{write_ascii, write_binary, write_mesh, StlFormat};
