//! STL Grid Geometry
//!
//! Planar grid layout for flat STL templates. Every cell of an `nx x ny`
//! grid yields two meshes: the solid cell rectangle and the same rectangle
//! with a concentric rectangular hole cut out. Rings are triangulated with
//! earcutr, placement uses nalgebra, and cells are computed in parallel
//! with rayon.

pub mod error;
pub mod frame;
pub mod generator;
pub mod grid;
pub mod hole;
pub mod mesh;
pub mod polygon;
pub mod profile;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use error::{Error, Result};
pub use frame::{Frame, NormalSign, Orientation};
pub use generator::{CellInfo, FailurePolicy, GridGenerator, GridOutput, GridParams};
pub use grid::{CellBounds, CellIndex, GridSpec};
pub use hole::{size_hole, CellGeometry, HoleSizeMode, HoleSpec};
pub use mesh::{map_to_world, CellMeshes, Mesh, MeshKind, Triangle};
pub use polygon::{outer_triangulation, ring_triangulation};
pub use profile::{Profile2D, Triangulation};
pub use triangulation::{EarcutTriangulator, StripTriangulator, Triangulator};
