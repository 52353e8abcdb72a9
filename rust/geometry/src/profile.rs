// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Profile definitions

use crate::error::{Error, Result};
use nalgebra::{Point2, Vector2};
use smallvec::SmallVec;

/// Closed vertex loop without a repeated closing vertex
pub type Contour = SmallVec<[Point2<f64>; 4]>;

/// Loop orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    /// Counter-clockwise, used for outer boundaries
    Ccw,
    /// Clockwise, used for holes
    Cw,
}

/// Twice the signed area of a loop (positive for CCW)
///
/// Edges are taken relative to the first vertex, so a small loop far from
/// the origin keeps its precision.
#[inline]
fn doubled_signed_area(points: &[Point2<f64>]) -> f64 {
    let Some(p0) = points.first() else {
        return 0.0;
    };
    points
        .windows(2)
        .skip(1)
        .map(|w| {
            let a = w[0] - p0;
            let b = w[1] - p0;
            a.x * b.y - b.x * a.y
        })
        .sum()
}

/// Signed area of a loop (shoelace formula, positive for CCW)
#[inline]
pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    doubled_signed_area(points) / 2.0
}

/// Orientation of a loop, `None` for degenerate (zero-area) loops
pub fn winding_of(points: &[Point2<f64>]) -> Option<Winding> {
    let area = doubled_signed_area(points);
    if area > 0.0 {
        Some(Winding::Ccw)
    } else if area < 0.0 {
        Some(Winding::Cw)
    } else {
        None
    }
}

/// Axis-aligned rectangle loop
///
/// The counter-clockwise loop starts at `(uc - hu, vc - hv)`; the clockwise
/// loop is the same sequence reversed.
pub fn rectangle_loop(center: Point2<f64>, half: Vector2<f64>, winding: Winding) -> Contour {
    let (uc, vc) = (center.x, center.y);
    let mut points: Contour = SmallVec::from_buf([
        Point2::new(uc - half.x, vc - half.y),
        Point2::new(uc + half.x, vc - half.y),
        Point2::new(uc + half.x, vc + half.y),
        Point2::new(uc - half.x, vc + half.y),
    ]);
    if winding == Winding::Cw {
        points.reverse();
    }
    points
}

/// 2D Profile with optional holes
#[derive(Debug, Clone)]
pub struct Profile2D {
    /// Outer boundary (counter-clockwise)
    pub outer: Contour,
    /// Holes (clockwise)
    pub holes: SmallVec<[Contour; 1]>,
}

impl Profile2D {
    /// Create a new profile
    pub fn new(outer: Contour) -> Self {
        Self {
            outer,
            holes: SmallVec::new(),
        }
    }

    /// Add a hole to the profile
    pub fn add_hole(&mut self, hole: Contour) {
        self.holes.push(hole);
    }

    pub fn vertex_count(&self) -> usize {
        self.outer.len() + self.holes.iter().map(|h| h.len()).sum::<usize>()
    }

    /// All vertices, outer boundary first, then each hole in order
    pub fn points(&self) -> Vec<Point2<f64>> {
        let mut points = Vec::with_capacity(self.vertex_count());
        points.extend_from_slice(&self.outer);
        for hole in &self.holes {
            points.extend_from_slice(hole);
        }
        points
    }

    /// Enclosed area (outer minus holes)
    pub fn area(&self) -> f64 {
        signed_area(&self.outer).abs() - self.holes.iter().map(|h| signed_area(h).abs()).sum::<f64>()
    }

    /// Check the input contract of the triangulators
    ///
    /// Every loop needs at least 3 vertices and a non-zero area; the outer
    /// loop must be CCW and holes CW.
    pub fn validate(&self) -> Result<()> {
        if self.outer.len() < 3 {
            return Err(Error::triangulation(
                "Need at least 3 points in outer boundary",
            ));
        }
        match winding_of(&self.outer) {
            Some(Winding::Ccw) => {}
            Some(Winding::Cw) => return Err(Error::triangulation("Outer boundary must be counter-clockwise")),
            None => return Err(Error::triangulation("Outer boundary is collinear")),
        }

        for (k, hole) in self.holes.iter().enumerate() {
            if hole.len() < 3 {
                return Err(Error::triangulation(format!(
                    "Hole {} needs at least 3 points",
                    k
                )));
            }
            match winding_of(hole) {
                Some(Winding::Cw) => {}
                Some(Winding::Ccw) => {
                    return Err(Error::triangulation(format!("Hole {} must be clockwise", k)))
                }
                None => return Err(Error::triangulation(format!("Hole {} is collinear", k))),
            }
        }

        Ok(())
    }
}

/// Triangulated profile result
#[derive(Debug, Clone, Default)]
pub struct Triangulation {
    /// All vertices (outer + holes)
    pub points: Vec<Point2<f64>>,
    /// Triangle indices
    pub indices: Vec<usize>,
}

impl Triangulation {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Triangles as vertex triples
    pub fn triangles(&self) -> impl Iterator<Item = [Point2<f64>; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(move |t| [self.points[t[0]], self.points[t[1]], self.points[t[2]]])
    }

    /// Sum of the unsigned triangle areas
    pub fn area(&self) -> f64 {
        self.triangles().map(|t| signed_area(&t).abs()).sum()
    }

    /// Append another triangulation, offsetting its indices
    pub fn append(&mut self, other: &Triangulation) {
        let offset = self.points.len();
        self.points.extend_from_slice(&other.points);
        self.indices.extend(other.indices.iter().map(|&i| i + offset));
    }
}
