// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cell polygon builder
//!
//! Produces the local `(u, v)` triangulations of a cell: the solid outer
//! rectangle, and the rectangle with its hole removed. Every returned
//! triangle is counter-clockwise and has non-zero area.

use crate::error::{Error, Result};
use crate::hole::CellGeometry;
use crate::profile::{rectangle_loop, signed_area, Profile2D, Triangulation, Winding};
use crate::triangulation::Triangulator;
use nalgebra::{Point2, Vector2};

/// Relative tolerance for "hole touches the outer boundary"
const TOUCH_TOLERANCE: f64 = 1e-9;

/// Relative tolerance on the triangulated ring area
const AREA_TOLERANCE: f64 = 1e-9;

/// A triangle is degenerate when its area is this small relative to the
/// square of its longest edge
const DEGENERATE_TOLERANCE: f64 = 1e-12;

/// Fixed two-triangle fan over a rectangle
fn quad(center: Point2<f64>, half: Vector2<f64>) -> Triangulation {
    Triangulation {
        points: rectangle_loop(center, half, Winding::Ccw).to_vec(),
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

/// Solid outer rectangle: `(P0, P1, P2)` and `(P0, P2, P3)`
pub fn outer_triangulation(geometry: &CellGeometry) -> Triangulation {
    quad(geometry.center, geometry.half_extents)
}

/// Outer rectangle minus the hole
///
/// A hole that spans the cell along one axis splits the ring into two
/// disjoint strips, which are emitted directly. A hole spanning both axes
/// leaves nothing and is rejected.
pub fn ring_triangulation(geometry: &CellGeometry, triangulator: &dyn Triangulator) -> Result<Triangulation> {
    let c = geometry.center;
    let half = geometry.half_extents;
    let hole = geometry.hole_half_extents;

    let touches = |inner: f64, outer: f64| inner >= outer * (1.0 - TOUCH_TOLERANCE);
    let spans_u = touches(hole.x, half.x);
    let spans_v = touches(hole.y, half.y);

    let triangulation = match (spans_u, spans_v) {
        (true, true) => {
            return Err(Error::TriangulationFailed {
                cell: Some(geometry.index),
                reason: "hole covers the whole cell, ring has zero area".to_string(),
            })
        }
        (true, false) => {
            // Bottom and top strips over the full width
            let strip = (half.y - hole.y) / 2.0;
            let offset = hole.y + strip;
            let mut t = quad(Point2::new(c.x, c.y - offset), Vector2::new(half.x, strip));
            t.append(&quad(Point2::new(c.x, c.y + offset), Vector2::new(half.x, strip)));
            t
        }
        (false, true) => {
            // Left and right strips over the full height
            let strip = (half.x - hole.x) / 2.0;
            let offset = hole.x + strip;
            let mut t = quad(Point2::new(c.x - offset, c.y), Vector2::new(strip, half.y));
            t.append(&quad(Point2::new(c.x + offset, c.y), Vector2::new(strip, half.y)));
            t
        }
        (false, false) => {
            let mut profile = Profile2D::new(rectangle_loop(c, half, Winding::Ccw));
            profile.add_hole(rectangle_loop(c, hole, Winding::Cw));

            let raw = triangulator
                .triangulate(&profile)
                .map_err(|e| e.at(geometry.index))?;
            normalize(raw, geometry.ring_area()).map_err(|e| e.at(geometry.index))?
        }
    };

    Ok(triangulation)
}

/// Enforce the triangulator output contract
///
/// Indices must be in range, zero-area triangles are dropped, clockwise
/// triangles are re-wound, and the covered area must match the ring.
fn normalize(mut t: Triangulation, expected_area: f64) -> Result<Triangulation> {
    if t.indices.len() % 3 != 0 {
        return Err(Error::triangulation(format!(
            "index count {} is not a multiple of 3",
            t.indices.len()
        )));
    }
    if let Some(&bad) = t.indices.iter().find(|&&i| i >= t.points.len()) {
        return Err(Error::triangulation(format!(
            "index {} out of range for {} points",
            bad,
            t.points.len()
        )));
    }

    let mut indices = Vec::with_capacity(t.indices.len());
    for tri in t.indices.chunks_exact(3) {
        let [a, b, c] = [t.points[tri[0]], t.points[tri[1]], t.points[tri[2]]];
        let area = signed_area(&[a, b, c]);
        let longest = (b - a)
            .norm_squared()
            .max((c - b).norm_squared())
            .max((a - c).norm_squared());
        if area.abs() <= longest * DEGENERATE_TOLERANCE {
            continue;
        }
        if area > 0.0 {
            indices.extend_from_slice(tri);
        } else {
            indices.extend_from_slice(&[tri[0], tri[2], tri[1]]);
        }
    }
    t.indices = indices;

    if t.is_empty() {
        return Err(Error::triangulation("no non-degenerate triangles"));
    }

    let area = t.area();
    if (area - expected_area).abs() > expected_area * AREA_TOLERANCE {
        return Err(Error::triangulation(format!(
            "covered area {} does not match ring area {}",
            area, expected_area
        )));
    }

    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellBounds, CellIndex};
    use crate::hole::{size_hole, HoleSpec};
    use crate::triangulation::{EarcutTriangulator, StripTriangulator};
    use approx::assert_relative_eq;

    fn geometry(hole: HoleSpec) -> CellGeometry {
        let bounds = CellBounds {
            u0: -3.0,
            u1: -1.0,
            v0: -2.0,
            v1: 0.0,
        };
        size_hole(CellIndex::new(0, 0), &bounds, &hole).unwrap()
    }

    fn assert_ccw(t: &Triangulation) {
        for tri in t.triangles() {
            assert!(signed_area(&tri) > 0.0, "triangle {:?} is not CCW", tri);
        }
    }

    /// Backend that returns a fixed answer
    struct Canned(Vec<usize>);

    impl Triangulator for Canned {
        fn triangulate(&self, profile: &Profile2D) -> Result<Triangulation> {
            Ok(Triangulation {
                points: profile.points(),
                indices: self.0.clone(),
            })
        }

        fn name(&self) -> &'static str {
            "canned"
        }
    }

    #[test]
    fn test_outer_two_triangles() {
        let t = outer_triangulation(&geometry(HoleSpec::relative(0.5, 0.5)));
        assert_eq!(t.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(t.points[0], Point2::new(-3.0, -2.0));
        assert_relative_eq!(t.area(), 4.0);
        assert_ccw(&t);
    }

    #[test]
    fn test_ring_area_earcut() {
        let g = geometry(HoleSpec::relative(0.5, 0.5));
        let t = ring_triangulation(&g, &EarcutTriangulator).unwrap();
        assert_relative_eq!(t.area(), 3.0, epsilon = 1e-9);
        assert_ccw(&t);
    }

    #[test]
    fn test_ring_area_strip() {
        let g = geometry(HoleSpec::absolute(0.4, 1.2));
        let t = ring_triangulation(&g, &StripTriangulator).unwrap();
        assert_relative_eq!(t.area(), 4.0 - 0.48, epsilon = 1e-12);
        assert_eq!(t.triangle_count(), 8);
        assert_ccw(&t);
    }

    #[test]
    fn test_full_hole_is_rejected() {
        let g = geometry(HoleSpec::relative(1.0, 1.0));
        let err = ring_triangulation(&g, &EarcutTriangulator).unwrap_err();
        assert!(matches!(
            err,
            Error::TriangulationFailed {
                cell: Some(CellIndex { i: 0, j: 0 }),
                ..
            }
        ));
    }

    #[test]
    fn test_hole_spanning_u_leaves_two_strips() {
        let g = geometry(HoleSpec::relative(1.0, 0.5));
        let t = ring_triangulation(&g, &Canned(vec![])).unwrap();
        assert_eq!(t.triangle_count(), 4);
        assert_relative_eq!(t.area(), 2.0, epsilon = 1e-12);
        assert_ccw(&t);
        // Bottom strip spans v in [-2, -1.5]
        assert_eq!(t.points[0], Point2::new(-3.0, -2.0));
        assert_eq!(t.points[2], Point2::new(-1.0, -1.5));
    }

    #[test]
    fn test_hole_spanning_v_leaves_two_strips() {
        let g = geometry(HoleSpec::absolute(1.0, 2.0));
        let t = ring_triangulation(&g, &Canned(vec![])).unwrap();
        assert_eq!(t.triangle_count(), 4);
        assert_relative_eq!(t.area(), 2.0, epsilon = 1e-12);
        assert_ccw(&t);
    }

    #[test]
    fn test_clockwise_output_is_rewound() {
        // Strip layout with every triangle reversed
        let reversed = vec![
            0, 7, 1, 1, 7, 6, 1, 6, 2, 2, 6, 5, 2, 5, 3, 3, 5, 4, 3, 4, 0, 0, 4, 7,
        ];
        let g = geometry(HoleSpec::relative(0.5, 0.5));
        let t = ring_triangulation(&g, &Canned(reversed)).unwrap();
        assert_ccw(&t);
        assert_relative_eq!(t.area(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_incomplete_cover_is_rejected() {
        let g = geometry(HoleSpec::relative(0.5, 0.5));
        let err = ring_triangulation(&g, &Canned(vec![0, 1, 7, 1, 6, 7])).unwrap_err();
        assert!(matches!(err, Error::TriangulationFailed { cell: Some(_), .. }));
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let g = geometry(HoleSpec::relative(0.5, 0.5));
        assert!(ring_triangulation(&g, &Canned(vec![0, 1, 8])).is_err());
    }

    #[test]
    fn test_tiny_relative_hole() {
        // Cell (0, 0) of the 3 x 2 grid over 6 x 4
        let g = geometry(HoleSpec::relative(1e-8, 1e-8));
        assert_eq!(g.hole_half_extents, Vector2::new(1e-8, 1e-8));

        let t = ring_triangulation(&g, &EarcutTriangulator).unwrap();
        assert_eq!(t.triangle_count(), 8);
        assert_relative_eq!(t.area(), 4.0, epsilon = 1e-9);
        assert_ccw(&t);
    }

    #[test]
    fn test_degenerate_triangles_are_dropped() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
        ];
        let t = Triangulation {
            points,
            indices: vec![0, 1, 2, 0, 2, 3],
        };
        let t = normalize(t, 0.5).unwrap();
        assert_eq!(t.indices, vec![0, 1, 2]);
    }
}
