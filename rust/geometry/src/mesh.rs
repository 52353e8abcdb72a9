// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures
//!
//! Meshes are plain triangle soups: every triangle owns its three vertices
//! and no welding is performed.

use crate::frame::Frame;
use crate::grid::CellIndex;
use crate::profile::Triangulation;
use nalgebra::{Point3, Vector3};
use std::fmt;

/// Below this squared cross-product length a triangle has no usable normal
const DEGENERATE_EPSILON: f64 = 1e-20;

/// Triangle in world space, counter-clockwise seen from its normal side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f64>; 3],
}

impl Triangle {
    #[inline]
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self { vertices: [a, b, c] }
    }

    #[inline]
    fn cross(&self) -> Vector3<f64> {
        let [a, b, c] = &self.vertices;
        (b - a).cross(&(c - a))
    }

    /// Unit normal following the vertex order, zero for degenerate triangles
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        let n = self.cross();
        let len_sq = n.norm_squared();
        if len_sq > DEGENERATE_EPSILON {
            n / len_sq.sqrt()
        } else {
            Vector3::zeros()
        }
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.cross().norm() / 2.0
    }

    /// Same triangle with the opposite winding
    #[inline]
    pub fn flipped(&self) -> Self {
        let [a, b, c] = self.vertices;
        Self::new(a, c, b)
    }
}

/// Triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(triangle_count: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    #[inline]
    pub fn push(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triangle> {
        self.triangles.iter()
    }

    /// Total surface area
    pub fn area(&self) -> f64 {
        self.triangles.iter().map(Triangle::area).sum()
    }

    /// Calculate bounds (min, max)
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);

        for p in self.triangles.iter().flat_map(|t| t.vertices.iter()) {
            min = min.inf(p);
            max = max.sup(p);
        }

        (min, max)
    }
}

/// Which of the two per-cell meshes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    /// Solid cell rectangle
    Outer,
    /// Cell rectangle with the hole cut out
    Ring,
}

impl MeshKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeshKind::Outer => "outer",
            MeshKind::Ring => "ring",
        }
    }
}

impl fmt::Display for MeshKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Both meshes of one cell
#[derive(Debug, Clone)]
pub struct CellMeshes {
    pub index: CellIndex,
    pub outer: Mesh,
    pub ring: Mesh,
}

impl CellMeshes {
    pub fn mesh(&self, kind: MeshKind) -> &Mesh {
        match kind {
            MeshKind::Outer => &self.outer,
            MeshKind::Ring => &self.ring,
        }
    }
}

/// Map a local triangulation into world space
///
/// Local triangles are expected counter-clockwise in `(u, v)`. When the frame
/// normal points against `u x v` the winding is reversed so every triangle
/// faces the frame normal.
pub fn map_to_world(frame: &Frame, origin: &Point3<f64>, local: &Triangulation) -> Mesh {
    let flip = frame.flips_winding();
    let mut mesh = Mesh::with_capacity(local.triangle_count());

    for [a, b, c] in local.triangles() {
        let triangle = Triangle::new(
            frame.local_to_world(origin, a.x, a.y),
            frame.local_to_world(origin, b.x, b.y),
            frame.local_to_world(origin, c.x, c.y),
        );
        mesh.push(if flip { triangle.flipped() } else { triangle });
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{NormalSign, Orientation};
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    fn unit_square() -> Triangulation {
        Triangulation {
            points: vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    #[test]
    fn test_ccw_triangle_normal() {
        let t = Triangle::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(t.normal(), Vector3::z());
        assert_relative_eq!(t.flipped().normal(), -Vector3::z());
        assert_relative_eq!(t.area(), 0.5);
    }

    #[test]
    fn test_degenerate_triangle_normal() {
        let t = Triangle::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0), Point3::new(2.0, 2.0, 2.0));
        assert_eq!(t.normal(), Vector3::zeros());
        assert_eq!(t.area(), 0.0);
    }

    #[test]
    fn test_mesh_bounds() {
        let mut mesh = Mesh::new();
        assert_eq!(mesh.bounds(), (Point3::origin(), Point3::origin()));
        mesh.push(Triangle::new(
            Point3::new(-1.0, 2.0, 0.0),
            Point3::new(3.0, -4.0, 1.0),
            Point3::new(0.0, 0.0, -2.0),
        ));
        let (min, max) = mesh.bounds();
        assert_eq!(min, Point3::new(-1.0, -4.0, -2.0));
        assert_eq!(max, Point3::new(3.0, 2.0, 1.0));
    }

    #[test]
    fn test_map_to_world_faces_normal() {
        let origin = Point3::new(0.0, 0.0, 5.0);
        for orientation in [Orientation::X, Orientation::Y, Orientation::Z] {
            for sign in [NormalSign::Positive, NormalSign::Negative] {
                let frame = Frame::new(orientation, sign, 15.0).unwrap();
                let mesh = map_to_world(&frame, &origin, &unit_square());
                assert_eq!(mesh.triangle_count(), 2);
                assert_relative_eq!(mesh.area(), 1.0, epsilon = 1e-12);
                for t in mesh.iter() {
                    assert_relative_eq!(t.normal(), frame.normal(), epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_map_to_world_positions() {
        let frame = Frame::new(Orientation::Z, NormalSign::Positive, 0.0).unwrap();
        let mesh = map_to_world(&frame, &Point3::new(10.0, 20.0, 30.0), &unit_square());
        assert_eq!(mesh.triangles[0].vertices[1], Point3::new(11.0, 20.0, 30.0));
    }
}
