// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grid generator
//!
//! Ties the pipeline together: frame and grid are built once, then every
//! cell is sized, triangulated and mapped to world space independently.

use crate::error::{Error, Result};
use crate::frame::{Frame, NormalSign, Orientation};
use crate::grid::{CellBounds, CellIndex, GridSpec};
use crate::hole::{size_hole, CellGeometry, HoleSpec};
use crate::mesh::{map_to_world, CellMeshes};
use crate::polygon::{outer_triangulation, ring_triangulation};
use crate::triangulation::{EarcutTriangulator, Triangulator};
use nalgebra::{Point2, Point3, Vector2, Vector3};
use std::sync::Arc;

/// Everything needed to lay out one grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridParams {
    pub nx: usize,
    pub ny: usize,
    pub width: f64,
    pub height: f64,
    pub border_gap: f64,
    pub orientation: Orientation,
    pub normal_sign: NormalSign,
    pub rotate_deg: f64,
    pub hole: HoleSpec,
    pub origin: Point3<f64>,
}

impl GridParams {
    /// Grid of `nx x ny` cells over `width x height` with default placement
    pub fn new(nx: usize, ny: usize, width: f64, height: f64) -> Self {
        Self {
            nx,
            ny,
            width,
            height,
            border_gap: 0.0,
            orientation: Orientation::default(),
            normal_sign: NormalSign::default(),
            rotate_deg: 0.0,
            hole: HoleSpec::default(),
            origin: Point3::origin(),
        }
    }
}

/// What to do when a single cell fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Fail the whole run on the first bad cell, producing nothing
    #[default]
    Abort,
    /// Keep the good cells and report the bad ones
    Continue,
}

/// Read-only summary of one cell
#[derive(Debug, Clone, PartialEq)]
pub struct CellInfo {
    pub index: CellIndex,
    pub local_bounds: CellBounds,
    pub local_center: Point2<f64>,
    pub world_center: Point3<f64>,
    pub outer_size: Vector2<f64>,
    pub inner_size: Vector2<f64>,
    pub orientation: Orientation,
    pub normal: Vector3<f64>,
}

/// Result of a batch run
#[derive(Debug, Default)]
pub struct GridOutput {
    /// Successful cells in grid order
    pub cells: Vec<CellMeshes>,
    /// Failed cells in grid order (only with [`FailurePolicy::Continue`])
    pub failures: Vec<(CellIndex, Error)>,
}

impl GridOutput {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of mesh files the successful cells produce
    pub fn file_count(&self) -> usize {
        self.cells.len() * 2
    }
}

/// Grid generator
///
/// Holds the immutable per-run inputs. All cell operations take `&self` and
/// are independent of each other.
#[derive(Clone)]
pub struct GridGenerator {
    grid: GridSpec,
    frame: Frame,
    hole: HoleSpec,
    origin: Point3<f64>,
    triangulator: Arc<dyn Triangulator>,
}

impl GridGenerator {
    /// Validate the configuration and build the shared frame and grid
    pub fn new(params: &GridParams) -> Result<Self> {
        let frame = Frame::new(params.orientation, params.normal_sign, params.rotate_deg)?;
        params.hole.validate()?;
        let grid = GridSpec::new(
            params.nx,
            params.ny,
            params.width,
            params.height,
            params.border_gap,
        )?;

        if !params.origin.iter().all(|c| c.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "origin must be finite, got {:?}",
                params.origin
            )));
        }

        Ok(Self {
            grid,
            frame,
            hole: params.hole,
            origin: params.origin,
            triangulator: Arc::new(EarcutTriangulator),
        })
    }

    /// Replace the ring triangulation backend
    pub fn with_triangulator(mut self, triangulator: Arc<dyn Triangulator>) -> Self {
        self.triangulator = triangulator;
        self
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn hole(&self) -> &HoleSpec {
        &self.hole
    }

    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    /// One outer and one ring file per cell
    pub fn file_count(&self) -> usize {
        2 * self.grid.cell_count()
    }

    pub fn cell_geometry(&self, cell: CellIndex) -> Result<CellGeometry> {
        let bounds = self.grid.cell_bounds(cell)?;
        size_hole(cell, &bounds, &self.hole)
    }

    /// Cell summary without triangulating
    pub fn cell_info(&self, cell: CellIndex) -> Result<CellInfo> {
        let geometry = self.cell_geometry(cell)?;
        let center = geometry.center;

        Ok(CellInfo {
            index: cell,
            local_bounds: geometry.bounds,
            local_center: center,
            world_center: self.frame.local_to_world(&self.origin, center.x, center.y),
            outer_size: geometry.outer_size(),
            inner_size: geometry.inner_size(),
            orientation: self.frame.orientation(),
            normal: self.frame.normal(),
        })
    }

    /// Run the full pipeline for one cell
    pub fn cell_meshes(&self, cell: CellIndex) -> Result<CellMeshes> {
        let geometry = self.cell_geometry(cell)?;

        let outer = outer_triangulation(&geometry);
        let ring = ring_triangulation(&geometry, self.triangulator.as_ref())?;

        Ok(CellMeshes {
            index: cell,
            outer: map_to_world(&self.frame, &self.origin, &outer),
            ring: map_to_world(&self.frame, &self.origin, &ring),
        })
    }

    /// Compute every cell
    ///
    /// Nothing is written here; callers persist the output only once the
    /// batch is known. With [`FailurePolicy::Abort`] the error of the first
    /// failing cell in grid order is returned.
    pub fn generate(&self, policy: FailurePolicy) -> Result<GridOutput> {
        #[cfg(not(target_arch = "wasm32"))]
        use rayon::prelude::*;

        let cells: Vec<CellIndex> = self.grid.cells().collect();

        tracing::debug!(
            cells = cells.len(),
            triangulator = self.triangulator.name(),
            "Generating grid"
        );

        // On native: one task per cell. On WASM: no threads available.
        #[cfg(not(target_arch = "wasm32"))]
        let results: Vec<(CellIndex, Result<CellMeshes>)> = cells
            .par_iter()
            .map(|&cell| (cell, self.cell_meshes(cell)))
            .collect();

        #[cfg(target_arch = "wasm32")]
        let results: Vec<(CellIndex, Result<CellMeshes>)> = cells
            .iter()
            .map(|&cell| (cell, self.cell_meshes(cell)))
            .collect();

        let mut output = GridOutput::default();
        for (cell, result) in results {
            match result {
                Ok(meshes) => output.cells.push(meshes),
                Err(err) => {
                    tracing::warn!(cell = %cell, error = %err, "Cell failed");
                    if policy == FailurePolicy::Abort {
                        return Err(err);
                    }
                    output.failures.push((cell, err));
                }
            }
        }

        tracing::debug!(
            succeeded = output.cells.len(),
            failed = output.failures.len(),
            "Grid generated"
        );

        Ok(output)
    }
}

impl std::fmt::Debug for GridGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridGenerator")
            .field("grid", &self.grid)
            .field("frame", &self.frame)
            .field("hole", &self.hole)
            .field("origin", &self.origin)
            .field("triangulator", &self.triangulator.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hole::HoleSizeMode;
    use crate::profile::{Profile2D, Triangulation};
    use approx::assert_relative_eq;

    fn scenario() -> GridParams {
        let mut params = GridParams::new(3, 2, 6.0, 4.0);
        params.hole = HoleSpec::relative(0.5, 0.5);
        params
    }

    struct AlwaysFails;

    impl Triangulator for AlwaysFails {
        fn triangulate(&self, _profile: &Profile2D) -> Result<Triangulation> {
            Err(Error::triangulation("self-intersecting ring"))
        }

        fn name(&self) -> &'static str {
            "always-fails"
        }
    }

    #[test]
    fn test_cell_info() {
        let generator = GridGenerator::new(&scenario()).unwrap();
        let info = generator.cell_info(CellIndex::new(0, 0)).unwrap();
        assert_eq!(info.local_center, Point2::new(-2.0, -1.0));
        assert_eq!(info.world_center, Point3::new(-2.0, -1.0, 0.0));
        assert_eq!(info.outer_size, Vector2::new(2.0, 2.0));
        assert_eq!(info.inner_size, Vector2::new(1.0, 1.0));
        assert_eq!(info.orientation, Orientation::Z);
        assert_eq!(info.normal, Vector3::z());
    }

    #[test]
    fn test_configuration_errors_before_generation() {
        let mut params = scenario();
        params.hole = HoleSpec::relative(1.2, 0.5);
        assert!(matches!(GridGenerator::new(&params), Err(Error::InvalidHoleSize(_))));

        let mut params = scenario();
        params.border_gap = 1.0;
        assert!(matches!(
            GridGenerator::new(&params),
            Err(Error::DegenerateCell { cell: None, .. })
        ));

        let mut params = scenario();
        params.origin = Point3::new(0.0, f64::NAN, 0.0);
        assert!(matches!(GridGenerator::new(&params), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_generate_all_cells() {
        let generator = GridGenerator::new(&scenario()).unwrap();
        let output = generator.generate(FailurePolicy::Abort).unwrap();
        assert!(output.is_complete());
        assert_eq!(output.file_count(), generator.file_count());
        assert_eq!(output.file_count(), 12);
        let order: Vec<_> = output.cells.iter().map(|c| c.index).collect();
        let expected: Vec<_> = generator.grid().cells().collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_abort_returns_first_failure() {
        let generator = GridGenerator::new(&scenario())
            .unwrap()
            .with_triangulator(Arc::new(AlwaysFails));
        let err = generator.generate(FailurePolicy::Abort).unwrap_err();
        assert_eq!(err.cell(), Some(CellIndex::new(0, 0)));
    }

    #[test]
    fn test_continue_collects_failures() {
        let mut params = scenario();
        params.hole = HoleSpec::new(2.5, 1.0, HoleSizeMode::Absolute);
        let generator = GridGenerator::new(&params).unwrap();
        let output = generator.generate(FailurePolicy::Continue).unwrap();
        assert!(output.cells.is_empty());
        assert_eq!(output.failures.len(), 6);
        assert!(output
            .failures
            .iter()
            .all(|(cell, err)| matches!(err, Error::HoleExceedsCell { .. }) && err.cell() == Some(*cell)));
    }

    #[test]
    fn test_cell_meshes_areas() {
        let generator = GridGenerator::new(&scenario()).unwrap();
        let meshes = generator.cell_meshes(CellIndex::new(1, 1)).unwrap();
        assert_eq!(meshes.outer.triangle_count(), 2);
        assert_relative_eq!(meshes.outer.area(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(meshes.ring.area(), 3.0, epsilon = 1e-9);
    }
}
