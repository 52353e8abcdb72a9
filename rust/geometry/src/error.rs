use crate::grid::CellIndex;
use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while laying out and triangulating a grid
///
/// Every variant is a deterministic function of the input values, so none of
/// them is worth retrying.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid orientation: {0}")]
    InvalidOrientation(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid hole size: {0}")]
    InvalidHoleSize(String),

    #[error(
        "Hole {hole_u} x {hole_v} exceeds cell {cell} of size {cell_u} x {cell_v}"
    )]
    HoleExceedsCell {
        cell: CellIndex,
        hole_u: f64,
        hole_v: f64,
        cell_u: f64,
        cell_v: f64,
    },

    #[error("Degenerate cell{}: {width} x {height} after border gap", at_cell(.cell))]
    DegenerateCell {
        cell: Option<CellIndex>,
        width: f64,
        height: f64,
    },

    #[error("Triangulation failed{}: {reason}", at_cell(.cell))]
    TriangulationFailed {
        cell: Option<CellIndex>,
        reason: String,
    },

    #[error("Cell {cell} is outside the {nx} x {ny} grid")]
    CellOutOfRange { cell: CellIndex, nx: usize, ny: usize },
}

fn at_cell(cell: &Option<CellIndex>) -> String {
    match cell {
        Some(cell) => format!(" at cell {}", cell),
        None => String::new(),
    }
}

impl Error {
    /// Triangulation failure not yet tied to a cell
    pub fn triangulation(reason: impl Into<String>) -> Self {
        Error::TriangulationFailed {
            cell: None,
            reason: reason.into(),
        }
    }

    /// Attach a cell index to errors that were raised without one
    pub fn at(self, index: CellIndex) -> Self {
        match self {
            Error::TriangulationFailed { cell: None, reason } => Error::TriangulationFailed {
                cell: Some(index),
                reason,
            },
            Error::DegenerateCell {
                cell: None,
                width,
                height,
            } => Error::DegenerateCell {
                cell: Some(index),
                width,
                height,
            },
            other => other,
        }
    }

    /// Cell the error refers to, if it is a per-cell error
    pub fn cell(&self) -> Option<CellIndex> {
        match self {
            Error::HoleExceedsCell { cell, .. } | Error::CellOutOfRange { cell, .. } => Some(*cell),
            Error::DegenerateCell { cell, .. } | Error::TriangulationFailed { cell, .. } => *cell,
            _ => None,
        }
    }
}
