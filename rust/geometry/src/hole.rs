// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hole sizing
//!
//! Derives the inner (hole) rectangle of a cell from its outer bounds and the
//! sizing parameters.

use crate::error::{Error, Result};
use crate::grid::{CellBounds, CellIndex};
use nalgebra::{Point2, Vector2};
use std::fmt;
use std::str::FromStr;

/// Relative slack when comparing an absolute hole against its cell.
/// Cell extents come out of a division and may miss the exact value by an ulp.
const SIZE_TOLERANCE: f64 = 1e-9;

/// How `sx`/`sy` are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum HoleSizeMode {
    /// Fraction of the outer cell size, in `(0, 1]`
    #[default]
    Relative,
    /// Hole size in model units
    Absolute,
}

impl HoleSizeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoleSizeMode::Relative => "relative",
            HoleSizeMode::Absolute => "absolute",
        }
    }
}

impl FromStr for HoleSizeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relative" => Ok(HoleSizeMode::Relative),
            "absolute" => Ok(HoleSizeMode::Absolute),
            _ => Err(Error::InvalidHoleSize(format!(
                "inner size mode must be 'relative' or 'absolute', got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for HoleSizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hole sizing parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoleSpec {
    pub sx: f64,
    pub sy: f64,
    pub mode: HoleSizeMode,
}

impl HoleSpec {
    pub fn new(sx: f64, sy: f64, mode: HoleSizeMode) -> Self {
        Self { sx, sy, mode }
    }

    pub fn relative(sx: f64, sy: f64) -> Self {
        Self::new(sx, sy, HoleSizeMode::Relative)
    }

    pub fn absolute(sx: f64, sy: f64) -> Self {
        Self::new(sx, sy, HoleSizeMode::Absolute)
    }

    /// Configuration-level check, independent of any cell
    ///
    /// A non-positive size is rejected here as [`Error::InvalidHoleSize`] in
    /// both modes, before any cell is sized. [`Error::HoleExceedsCell`] is
    /// kept for absolute holes that are positive but larger than their cell.
    pub fn validate(&self) -> Result<()> {
        if !(self.sx.is_finite() && self.sx > 0.0) || !(self.sy.is_finite() && self.sy > 0.0) {
            return Err(Error::InvalidHoleSize(format!(
                "sx and sy must be finite and > 0 in {} mode (checked before sizing any cell), got {} x {}",
                self.mode, self.sx, self.sy
            )));
        }
        if self.mode == HoleSizeMode::Relative && (self.sx > 1.0 || self.sy > 1.0) {
            return Err(Error::InvalidHoleSize(format!(
                "relative sx and sy must be <= 1, got {} x {}",
                self.sx, self.sy
            )));
        }
        Ok(())
    }
}

impl Default for HoleSpec {
    fn default() -> Self {
        Self::relative(0.5, 0.5)
    }
}

/// Derived geometry of one cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellGeometry {
    pub index: CellIndex,
    pub bounds: CellBounds,
    pub center: Point2<f64>,
    /// Outer half-extents `(hu, hv)`
    pub half_extents: Vector2<f64>,
    /// Hole half-extents `(hiu, hiv)`, `0 < hiu <= hu`, `0 < hiv <= hv`
    pub hole_half_extents: Vector2<f64>,
}

impl CellGeometry {
    pub fn outer_size(&self) -> Vector2<f64> {
        self.half_extents * 2.0
    }

    pub fn inner_size(&self) -> Vector2<f64> {
        self.hole_half_extents * 2.0
    }

    pub fn outer_area(&self) -> f64 {
        4.0 * self.half_extents.x * self.half_extents.y
    }

    pub fn hole_area(&self) -> f64 {
        4.0 * self.hole_half_extents.x * self.hole_half_extents.y
    }

    pub fn ring_area(&self) -> f64 {
        self.outer_area() - self.hole_area()
    }
}

/// Compute the hole of a cell
///
/// Relative mode scales the outer half-extents; absolute mode takes `sx`, `sy`
/// as full hole sizes, which must fit inside the cell.
pub fn size_hole(index: CellIndex, bounds: &CellBounds, hole: &HoleSpec) -> Result<CellGeometry> {
    hole.validate()?;

    let half = bounds.half_extents();

    let hole_half = match hole.mode {
        HoleSizeMode::Relative => Vector2::new(half.x * hole.sx, half.y * hole.sy),
        HoleSizeMode::Absolute => {
            let requested = Vector2::new(hole.sx / 2.0, hole.sy / 2.0);
            let fits = |want: f64, have: f64| want <= have * (1.0 + SIZE_TOLERANCE);
            if !fits(requested.x, half.x) || !fits(requested.y, half.y) {
                return Err(Error::HoleExceedsCell {
                    cell: index,
                    hole_u: hole.sx,
                    hole_v: hole.sy,
                    cell_u: bounds.width(),
                    cell_v: bounds.height(),
                });
            }
            // Absorb the tolerance so the invariant holds exactly
            Vector2::new(requested.x.min(half.x), requested.y.min(half.y))
        }
    };

    if !(hole_half.x > 0.0 && hole_half.y > 0.0) {
        return Err(Error::InvalidHoleSize(format!(
            "hole of cell {} has zero size {} x {}",
            index,
            hole_half.x * 2.0,
            hole_half.y * 2.0
        )));
    }

    Ok(CellGeometry {
        index,
        bounds: *bounds,
        center: bounds.center(),
        half_extents: half,
        hole_half_extents: hole_half,
    })
}
