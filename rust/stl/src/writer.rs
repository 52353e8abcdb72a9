// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STL serialization
//!
//! Binary layout:
//!
//! ```text
//! UINT8[80]    header, space padded
//! UINT32       triangle count
//! foreach triangle
//!     REAL32[3] normal
//!     REAL32[3] vertex 1
//!     REAL32[3] vertex 2
//!     REAL32[3] vertex 3
//!     UINT16    attribute byte count (0)
//! end
//! ```

use crate::error::{Result, StlError};
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use stl_grid_geometry::{Mesh, Point3, Vector3};

/// Binary header size in bytes
pub const HEADER_SIZE: usize = 80;

/// Size of one triangle record in binary STL
pub const TRIANGLE_SIZE: usize = 50;

const HEADER_PREFIX: &str = "STL generated by stl-grid-gen";

/// On-disk STL flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StlFormat {
    #[default]
    Binary,
    Ascii,
}

impl StlFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            StlFormat::Binary => "binary",
            StlFormat::Ascii => "ascii",
        }
    }

    /// Exact file size for a mesh, `None` for ASCII
    pub fn binary_size(&self, triangle_count: usize) -> Option<usize> {
        match self {
            StlFormat::Binary => Some(HEADER_SIZE + 4 + TRIANGLE_SIZE * triangle_count),
            StlFormat::Ascii => None,
        }
    }
}

impl FromStr for StlFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" => Ok(StlFormat::Binary),
            "ascii" => Ok(StlFormat::Ascii),
            other => Err(format!("unknown STL format '{}'", other)),
        }
    }
}

impl fmt::Display for StlFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialize `mesh` in the given format
pub fn write_mesh<W: Write>(writer: W, format: StlFormat, name: &str, mesh: &Mesh) -> Result<()> {
    match format {
        StlFormat::Binary => write_binary(writer, name, mesh),
        StlFormat::Ascii => write_ascii(writer, name, mesh),
    }
}

/// 80-byte header naming the solid, padded with spaces or truncated
fn binary_header(name: &str) -> [u8; HEADER_SIZE] {
    let mut header = [b' '; HEADER_SIZE];
    let text = format!("{} {}", HEADER_PREFIX, name);
    let len = text.len().min(HEADER_SIZE);
    header[..len].copy_from_slice(&text.as_bytes()[..len]);
    header
}

fn write_vector<W: Write>(writer: &mut W, x: f64, y: f64, z: f64) -> Result<()> {
    // STL stores single precision
    writer.write_all(&(x as f32).to_le_bytes())?;
    writer.write_all(&(y as f32).to_le_bytes())?;
    writer.write_all(&(z as f32).to_le_bytes())?;
    Ok(())
}

/// Write a binary STL
///
/// Normals are recomputed from the vertex order, degenerate triangles get a
/// zero normal.
pub fn write_binary<W: Write>(mut writer: W, name: &str, mesh: &Mesh) -> Result<()> {
    let count = u32::try_from(mesh.triangle_count())
        .map_err(|_| StlError::TooManyTriangles(mesh.triangle_count()))?;

    writer.write_all(&binary_header(name))?;
    writer.write_all(&count.to_le_bytes())?;

    for triangle in mesh.iter() {
        let n: Vector3<f64> = triangle.normal();
        write_vector(&mut writer, n.x, n.y, n.z)?;
        for p in &triangle.vertices {
            write_vector(&mut writer, p.x, p.y, p.z)?;
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }

    writer.flush()?;
    Ok(())
}

fn write_vertex_ascii<W: Write>(writer: &mut W, p: &Point3<f64>) -> Result<()> {
    writeln!(writer, "      vertex {:.6e} {:.6e} {:.6e}", p.x, p.y, p.z)?;
    Ok(())
}

/// Write an ASCII STL named `name`
pub fn write_ascii<W: Write>(mut writer: W, name: &str, mesh: &Mesh) -> Result<()> {
    writeln!(writer, "solid {}", name)?;

    for triangle in mesh.iter() {
        let n = triangle.normal();
        writeln!(writer, "  facet normal {:.6e} {:.6e} {:.6e}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for p in &triangle.vertices {
            write_vertex_ascii(&mut writer, p)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }

    writeln!(writer, "endsolid {}", name)?;
    writer.flush()?;
    Ok(())
}
