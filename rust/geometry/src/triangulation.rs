// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! The [`Triangulator`] trait is the seam between the ring builder and the
//! triangulation backend: one CCW outer loop plus CW hole loops in, index
//! triples into the combined vertex list (outer first, then holes) out.

use crate::error::{Error, Result};
use crate::profile::{Contour, Profile2D, Triangulation};
use crate::Point2;

/// Polygon-with-holes triangulation backend
pub trait Triangulator: Send + Sync {
    /// Triangulate the area of `profile.outer` minus its holes
    fn triangulate(&self, profile: &Profile2D) -> Result<Triangulation>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Ear-clipping backend built on earcutr
#[derive(Debug, Clone, Copy, Default)]
pub struct EarcutTriangulator;

impl Triangulator for EarcutTriangulator {
    fn triangulate(&self, profile: &Profile2D) -> Result<Triangulation> {
        profile.validate()?;

        let indices = if profile.holes.is_empty() {
            triangulate_polygon(&profile.outer)?
        } else {
            triangulate_polygon_with_holes(&profile.outer, &profile.holes)?
        };

        Ok(Triangulation {
            points: profile.points(),
            indices,
        })
    }

    fn name(&self) -> &'static str {
        "earcut"
    }
}

/// Fixed decomposition of a quad with one quad hole into four strips
///
/// Expects the loop layout produced by
/// [`rectangle_loop`](crate::profile::rectangle_loop): outer corners
/// `BL, BR, TR, TL`, hole corners `TL, TR, BR, BL`. Only valid when the hole
/// lies strictly inside the outer quad.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripTriangulator;

impl Triangulator for StripTriangulator {
    fn triangulate(&self, profile: &Profile2D) -> Result<Triangulation> {
        profile.validate()?;

        if profile.outer.len() != 4 || profile.holes.len() != 1 || profile.holes[0].len() != 4 {
            return Err(Error::triangulation(
                "Strip triangulation needs a quad with exactly one quad hole",
            ));
        }

        // Outer: 0=BL, 1=BR, 2=TR, 3=TL (CCW)
        // Hole:  4=TL, 5=TR, 6=BR, 7=BL (CW)
        #[rustfmt::skip]
        let indices = vec![
            0, 1, 7,  1, 6, 7, // bottom
            1, 2, 6,  2, 5, 6, // right
            2, 3, 5,  3, 4, 5, // top
            3, 0, 4,  0, 7, 4, // left
        ];

        Ok(Triangulation {
            points: profile.points(),
            indices,
        })
    }

    fn name(&self) -> &'static str {
        "strip"
    }
}

/// Check if a polygon is convex (all cross products have same sign)
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        // Cross product of edges
        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);

        if cross.abs() > 1e-10 {
            let current_sign = if cross > 0.0 { 1i8 } else { -1i8 };
            if sign == 0 {
                sign = current_sign;
            } else if sign != current_sign {
                return false; // Sign changed - not convex
            }
        }
    }

    true
}

/// Simple fan triangulation for convex polygons
#[inline]
fn fan_triangulate(n: usize) -> Vec<usize> {
    let mut indices = Vec::with_capacity((n - 2) * 3);
    for i in 1..n - 1 {
        indices.push(0);
        indices.push(i);
        indices.push(i + 1);
    }
    indices
}

/// Triangulate a simple polygon (no holes)
/// Returns triangle indices into the input points
#[inline]
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();

    if n < 3 {
        return Err(Error::triangulation("Need at least 3 points to triangulate"));
    }

    // FAST PATH: Triangle - no triangulation needed
    if n == 3 {
        return Ok(vec![0, 1, 2]);
    }

    // FAST PATH: Convex polygon - use fan triangulation
    if n <= 8 && is_convex(points) {
        return Ok(fan_triangulate(n));
    }

    // Flatten points for earcutr
    let mut vertices = Vec::with_capacity(n * 2);
    for p in points {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    earcutr::earcut(&vertices, &[], 2).map_err(|e| Error::triangulation(format!("{:?}", e)))
}

/// Triangulate a polygon with holes
/// Returns triangle indices into the combined vertex array (outer + all holes)
#[inline]
pub fn triangulate_polygon_with_holes(outer: &[Point2<f64>], holes: &[Contour]) -> Result<Vec<usize>> {
    if outer.len() < 3 {
        return Err(Error::triangulation("Need at least 3 points in outer boundary"));
    }

    // Degenerate holes would shift the earcutr hole offsets, reject them here
    if let Some(k) = holes.iter().position(|h| h.len() < 3) {
        return Err(Error::triangulation(format!(
            "Hole {} needs at least 3 points",
            k
        )));
    }

    if holes.is_empty() {
        return triangulate_polygon(outer);
    }

    // Flatten vertices for earcutr
    let total_points: usize = outer.len() + holes.iter().map(|h| h.len()).sum::<usize>();
    let mut vertices = Vec::with_capacity(total_points * 2);

    // Add outer boundary
    for p in outer {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    // Add holes and track their start indices
    let mut hole_indices = Vec::with_capacity(holes.len());
    for hole in holes {
        hole_indices.push(vertices.len() / 2);
        for p in hole {
            vertices.push(p.x);
            vertices.push(p.y);
        }
    }

    let indices = earcutr::earcut(&vertices, &hole_indices, 2)
        .map_err(|e| Error::triangulation(format!("{:?}", e)))?;

    if indices.is_empty() {
        return Err(Error::triangulation("earcut produced no triangles"));
    }

    Ok(indices)
}
