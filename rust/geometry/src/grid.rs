// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grid layout
//!
//! Subdivides the `W x H` rectangle centred on the local origin into
//! `nx x ny` cells and shrinks each cell by the border gap.

use crate::error::{Error, Result};
use nalgebra::{Point2, Vector2};
use std::fmt;

/// Position of a cell in the grid (`i` along u, `j` along v)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellIndex {
    pub i: usize,
    pub j: usize,
}

impl CellIndex {
    pub const fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.i, self.j)
    }
}

/// Cell rectangle in local coordinates, after the border gap is applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBounds {
    pub u0: f64,
    pub u1: f64,
    pub v0: f64,
    pub v1: f64,
}

impl CellBounds {
    #[inline]
    pub fn width(&self) -> f64 {
        self.u1 - self.u0
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.v1 - self.v0
    }

    #[inline]
    pub fn center(&self) -> Point2<f64> {
        Point2::new((self.u0 + self.u1) / 2.0, (self.v0 + self.v1) / 2.0)
    }

    #[inline]
    pub fn half_extents(&self) -> Vector2<f64> {
        Vector2::new(self.width() / 2.0, self.height() / 2.0)
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }
}

/// Grid subdivision parameters
///
/// Validated on construction: a grid that exists always yields
/// non-degenerate cells.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSpec {
    nx: usize,
    ny: usize,
    width: f64,
    height: f64,
    border_gap: f64,
}

impl GridSpec {
    pub fn new(nx: usize, ny: usize, width: f64, height: f64, border_gap: f64) -> Result<Self> {
        if nx < 1 || ny < 1 {
            return Err(Error::InvalidParameter(format!(
                "nx and ny must be >= 1, got {} x {}",
                nx, ny
            )));
        }
        if !(width.is_finite() && width > 0.0) || !(height.is_finite() && height > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "W and H must be finite and > 0, got {} x {}",
                width, height
            )));
        }
        if !(border_gap.is_finite() && border_gap >= 0.0) {
            return Err(Error::InvalidParameter(format!(
                "border_gap must be finite and >= 0, got {}",
                border_gap
            )));
        }

        let spec = Self {
            nx,
            ny,
            width,
            height,
            border_gap,
        };

        // All cells share the same pitch, so a gap that is too wide fails
        // every cell and is reported once, without an index.
        let (du, dv) = spec.cell_pitch();
        let inner_u = du - 2.0 * border_gap;
        let inner_v = dv - 2.0 * border_gap;
        if inner_u <= 0.0 || inner_v <= 0.0 {
            return Err(Error::DegenerateCell {
                cell: None,
                width: inner_u,
                height: inner_v,
            });
        }

        Ok(spec)
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn border_gap(&self) -> f64 {
        self.border_gap
    }

    /// Cell size before the border gap
    #[inline]
    pub fn cell_pitch(&self) -> (f64, f64) {
        (self.width / self.nx as f64, self.height / self.ny as f64)
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.nx * self.ny
    }

    #[inline]
    pub fn contains(&self, cell: CellIndex) -> bool {
        cell.i < self.nx && cell.j < self.ny
    }

    /// All cell indices, `i` outer and `j` inner
    pub fn cells(&self) -> impl Iterator<Item = CellIndex> {
        let ny = self.ny;
        (0..self.nx).flat_map(move |i| (0..ny).map(move |j| CellIndex::new(i, j)))
    }

    /// Bounds of one cell after the border gap
    pub fn cell_bounds(&self, cell: CellIndex) -> Result<CellBounds> {
        if !self.contains(cell) {
            return Err(Error::CellOutOfRange {
                cell,
                nx: self.nx,
                ny: self.ny,
            });
        }

        let (du, dv) = self.cell_pitch();
        let u0 = -self.width / 2.0 + cell.i as f64 * du;
        let v0 = -self.height / 2.0 + cell.j as f64 * dv;

        let bounds = CellBounds {
            u0: u0 + self.border_gap,
            u1: u0 + du - self.border_gap,
            v0: v0 + self.border_gap,
            v1: v0 + dv - self.border_gap,
        };

        if bounds.u1 <= bounds.u0 || bounds.v1 <= bounds.v0 {
            return Err(Error::DegenerateCell {
                cell: Some(cell),
                width: bounds.width(),
                height: bounds.height(),
            });
        }

        Ok(bounds)
    }
}
