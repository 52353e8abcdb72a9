// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-plane coordinate frame
//!
//! Builds the orthonormal basis `(u, v, w)` of the generated plane from an
//! axis orientation, a normal sign and an in-plane rotation, and maps local
//! `(u, v)` coordinates to world space and back.

use crate::error::{Error, Result};
use nalgebra::{Point2, Point3, Vector3};
use std::fmt;
use std::str::FromStr;

/// Rotations smaller than this (in degrees) leave the base axes untouched
const ROTATION_EPSILON: f64 = 1e-10;

/// World axis the plane normal is aligned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Orientation {
    X,
    Y,
    #[default]
    Z,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::X => "x",
            Orientation::Y => "y",
            Orientation::Z => "z",
        }
    }

    /// Unrotated in-plane axes and the unsigned normal axis
    #[inline]
    fn base_axes(self) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
        match self {
            Orientation::Z => (Vector3::x(), Vector3::y(), Vector3::z()),
            Orientation::X => (Vector3::y(), Vector3::z(), Vector3::x()),
            Orientation::Y => (Vector3::x(), Vector3::z(), Vector3::y()),
        }
    }
}

impl FromStr for Orientation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Orientation::X),
            "y" => Ok(Orientation::Y),
            "z" => Ok(Orientation::Z),
            _ => Err(Error::InvalidOrientation(format!(
                "orientation must be 'x', 'y' or 'z', got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of the plane normal along its axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i32", into = "i32"))]
pub enum NormalSign {
    #[default]
    Positive,
    Negative,
}

impl NormalSign {
    #[inline]
    pub fn value(self) -> f64 {
        match self {
            NormalSign::Positive => 1.0,
            NormalSign::Negative => -1.0,
        }
    }
}

impl TryFrom<i32> for NormalSign {
    type Error = Error;

    fn try_from(sign: i32) -> Result<Self> {
        match sign {
            1 => Ok(NormalSign::Positive),
            -1 => Ok(NormalSign::Negative),
            other => Err(Error::InvalidOrientation(format!(
                "normal sign must be +1 or -1, got {}",
                other
            ))),
        }
    }
}

impl From<NormalSign> for i32 {
    fn from(sign: NormalSign) -> i32 {
        match sign {
            NormalSign::Positive => 1,
            NormalSign::Negative => -1,
        }
    }
}

impl fmt::Display for NormalSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalSign::Positive => f.write_str("+1"),
            NormalSign::Negative => f.write_str("-1"),
        }
    }
}

/// Orthonormal basis of the generated plane
///
/// `u` and `v` span the plane, `w` is the signed normal taken from the
/// orientation axis. Because the sign of `w` is chosen independently of the
/// in-plane axes, `w` equals `u x v` only up to sign; see [`Frame::flips_winding`].
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    u: Vector3<f64>,
    v: Vector3<f64>,
    w: Vector3<f64>,
    orientation: Orientation,
    normal_sign: NormalSign,
    rotate_deg: f64,
}

impl Frame {
    /// Build the frame for an orientation, normal sign and in-plane rotation
    pub fn new(orientation: Orientation, normal_sign: NormalSign, rotate_deg: f64) -> Result<Self> {
        if !rotate_deg.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "rotate_deg must be finite, got {}",
                rotate_deg
            )));
        }

        let (u_base, v_base, axis) = orientation.base_axes();
        let w = axis * normal_sign.value();

        let (u, v) = if rotate_deg.abs() > ROTATION_EPSILON {
            let (sin, cos) = rotate_deg.to_radians().sin_cos();
            (cos * u_base + sin * v_base, -sin * u_base + cos * v_base)
        } else {
            (u_base, v_base)
        };

        Ok(Self {
            u,
            v,
            w,
            orientation,
            normal_sign,
            rotate_deg,
        })
    }

    /// Build the frame from untyped values (`"x"|"y"|"z"`, `+1|-1`)
    pub fn from_raw(orientation: &str, normal_sign: i32, rotate_deg: f64) -> Result<Self> {
        Self::new(orientation.parse()?, NormalSign::try_from(normal_sign)?, rotate_deg)
    }

    #[inline]
    pub fn u_axis(&self) -> Vector3<f64> {
        self.u
    }

    #[inline]
    pub fn v_axis(&self) -> Vector3<f64> {
        self.v
    }

    /// Surface normal `w`
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.w
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn normal_sign(&self) -> NormalSign {
        self.normal_sign
    }

    pub fn rotate_deg(&self) -> f64 {
        self.rotate_deg
    }

    /// True when `u x v` points away from the normal
    ///
    /// Counter-clockwise loops in `(u, v)` then map to clockwise loops as seen
    /// from the normal side, and triangle winding has to be reversed.
    #[inline]
    pub fn flips_winding(&self) -> bool {
        self.u.cross(&self.v).dot(&self.w) < 0.0
    }

    /// Map local `(u, v)` to `origin + u * u_axis + v * v_axis`
    #[inline]
    pub fn local_to_world(&self, origin: &Point3<f64>, u: f64, v: f64) -> Point3<f64> {
        origin + self.u * u + self.v * v
    }

    /// Project a world point back onto the plane axes
    #[inline]
    pub fn world_to_local(&self, origin: &Point3<f64>, point: &Point3<f64>) -> Point2<f64> {
        let d = point - origin;
        Point2::new(d.dot(&self.u), d.dot(&self.v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_vec(actual: Vector3<f64>, expected: [f64; 3]) {
        assert_relative_eq!(actual, Vector3::from(expected), epsilon = 1e-12);
    }

    #[test]
    fn test_z_orientation_default() {
        let frame = Frame::new(Orientation::Z, NormalSign::Positive, 0.0).unwrap();
        assert_vec(frame.u_axis(), [1.0, 0.0, 0.0]);
        assert_vec(frame.v_axis(), [0.0, 1.0, 0.0]);
        assert_vec(frame.normal(), [0.0, 0.0, 1.0]);
        assert!(!frame.flips_winding());
    }

    #[test]
    fn test_x_orientation() {
        let frame = Frame::from_raw("x", 1, 0.0).unwrap();
        assert_vec(frame.u_axis(), [0.0, 1.0, 0.0]);
        assert_vec(frame.v_axis(), [0.0, 0.0, 1.0]);
        assert_vec(frame.normal(), [1.0, 0.0, 0.0]);
        assert!(!frame.flips_winding());
    }

    #[test]
    fn test_y_orientation() {
        let frame = Frame::from_raw("Y", 1, 0.0).unwrap();
        assert_vec(frame.u_axis(), [1.0, 0.0, 0.0]);
        assert_vec(frame.v_axis(), [0.0, 0.0, 1.0]);
        assert_vec(frame.normal(), [0.0, 1.0, 0.0]);
        // x cross z = -y
        assert!(frame.flips_winding());
    }

    #[test]
    fn test_negative_normal() {
        let frame = Frame::from_raw("z", -1, 0.0).unwrap();
        assert_vec(frame.normal(), [0.0, 0.0, -1.0]);
        assert!(frame.flips_winding());
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let frame = Frame::new(Orientation::Z, NormalSign::Positive, 90.0).unwrap();
        assert_vec(frame.u_axis(), [0.0, 1.0, 0.0]);
        assert_vec(frame.v_axis(), [-1.0, 0.0, 0.0]);
        assert_vec(frame.normal(), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_orthonormal_for_any_rotation() {
        for orientation in [Orientation::X, Orientation::Y, Orientation::Z] {
            for sign in [NormalSign::Positive, NormalSign::Negative] {
                for step in -8..=8 {
                    let angle = step as f64 * 37.5;
                    let frame = Frame::new(orientation, sign, angle).unwrap();
                    let (u, v, w) = (frame.u_axis(), frame.v_axis(), frame.normal());

                    assert_relative_eq!(u.norm(), 1.0, epsilon = 1e-12);
                    assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-12);
                    assert_relative_eq!(w.norm(), 1.0, epsilon = 1e-12);
                    assert!(u.dot(&v).abs() < 1e-12);
                    assert!(u.dot(&w).abs() < 1e-12);
                    assert!(v.dot(&w).abs() < 1e-12);

                    // w is u x v up to the sign reported by flips_winding
                    let cross = u.cross(&v);
                    let expected = if frame.flips_winding() { -cross } else { cross };
                    assert_relative_eq!(w, expected, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_local_to_world() {
        let frame = Frame::from_raw("x", -1, 0.0).unwrap();
        let origin = Point3::new(1.0, 2.0, 3.0);
        let p = frame.local_to_world(&origin, -2.0, -1.0);
        assert_relative_eq!(p, Point3::new(1.0, 0.0, 2.0), epsilon = 1e-12);
    }

    #[test]
    fn test_world_round_trip() {
        let origin = Point3::new(-4.0, 0.5, 10.0);
        for orientation in [Orientation::X, Orientation::Y, Orientation::Z] {
            let frame = Frame::new(orientation, NormalSign::Negative, 33.0).unwrap();
            let world = frame.local_to_world(&origin, 1.25, -7.5);
            let local = frame.world_to_local(&origin, &world);
            assert_relative_eq!(local, Point2::new(1.25, -7.5), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_invalid_orientation() {
        assert!(matches!(
            "w".parse::<Orientation>(),
            Err(Error::InvalidOrientation(_))
        ));
        assert!(matches!(
            Frame::from_raw("xy", 1, 0.0),
            Err(Error::InvalidOrientation(_))
        ));
    }

    #[test]
    fn test_invalid_normal_sign() {
        assert!(matches!(NormalSign::try_from(0), Err(Error::InvalidOrientation(_))));
        assert!(matches!(Frame::from_raw("z", 2, 0.0), Err(Error::InvalidOrientation(_))));
        assert_eq!(i32::from(NormalSign::Negative), -1);
    }

    #[test]
    fn test_non_finite_rotation() {
        assert!(matches!(
            Frame::new(Orientation::Z, NormalSign::Positive, f64::NAN),
            Err(Error::InvalidParameter(_))
        ));
    }
}
