// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output directory layout
//!
//! Every mesh goes to a temporary file next to its destination and is
//! renamed into place once fully written, so an interrupted run leaves no
//! truncated STL behind.

use crate::error::{Result, StlError};
use crate::pattern::FilenamePattern;
use crate::writer::{write_mesh, StlFormat};
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use stl_grid_geometry::{CellIndex, CellMeshes, Mesh, MeshKind};
use tempfile::NamedTempFile;

/// Destination files of one cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellPaths {
    pub outer: PathBuf,
    pub ring: PathBuf,
}

/// Where and how cell meshes are written
#[derive(Debug, Clone)]
pub struct OutputLayout {
    out_dir: PathBuf,
    outer_pattern: FilenamePattern,
    ring_pattern: FilenamePattern,
    format: StlFormat,
}

impl OutputLayout {
    /// Default patterns, binary STL
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            outer_pattern: FilenamePattern::outer(),
            ring_pattern: FilenamePattern::ring(),
            format: StlFormat::default(),
        }
    }

    pub fn with_patterns(mut self, outer: FilenamePattern, ring: FilenamePattern) -> Self {
        self.outer_pattern = outer;
        self.ring_pattern = ring;
        self
    }

    pub fn with_format(mut self, format: StlFormat) -> Self {
        self.format = format;
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn format(&self) -> StlFormat {
        self.format
    }

    pub fn pattern(&self, kind: MeshKind) -> &FilenamePattern {
        match kind {
            MeshKind::Outer => &self.outer_pattern,
            MeshKind::Ring => &self.ring_pattern,
        }
    }

    pub fn path(&self, cell: CellIndex, kind: MeshKind) -> PathBuf {
        self.out_dir.join(self.pattern(kind).expand(cell))
    }

    pub fn paths(&self, cell: CellIndex) -> CellPaths {
        CellPaths {
            outer: self.path(cell, MeshKind::Outer),
            ring: self.path(cell, MeshKind::Ring),
        }
    }

    /// Create the output directory and any missing parents
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        Ok(())
    }

    /// Serialize `mesh` into a temporary file next to `path`
    ///
    /// The temporary file is removed again if it is dropped without
    /// [`commit`](Self::commit).
    fn stage(&self, path: &Path, mesh: &Mesh) -> Result<NamedTempFile> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        // Patterns may contain subdirectories
        fs::create_dir_all(dir)?;

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut tmp = NamedTempFile::new_in(dir)?;
        write_mesh(BufWriter::new(&mut tmp), self.format, &name, mesh)?;
        Ok(tmp)
    }

    /// Rename a staged file into place
    fn commit(&self, tmp: NamedTempFile, path: &Path, triangles: usize) -> Result<()> {
        tmp.persist(path).map_err(|e| StlError::Persist {
            path: path.to_path_buf(),
            source: e.error,
        })?;

        tracing::debug!(
            path = %path.display(),
            triangles,
            format = %self.format,
            "Wrote STL"
        );
        Ok(())
    }

    /// Atomically write one mesh to `path`, named after the file stem
    pub fn write_file(&self, path: &Path, mesh: &Mesh) -> Result<()> {
        let tmp = self.stage(path, mesh)?;
        self.commit(tmp, path, mesh.triangle_count())
    }

    /// Write both meshes of a cell
    ///
    /// Both files are fully serialized before either is moved into place,
    /// so a failing ring never leaves its outer file behind.
    pub fn write_cell(&self, cell: &CellMeshes) -> Result<CellPaths> {
        let paths = self.paths(cell.index);
        let outer = cell.mesh(MeshKind::Outer);
        let ring = cell.mesh(MeshKind::Ring);

        let outer_tmp = self.stage(&paths.outer, outer)?;
        let ring_tmp = self.stage(&paths.ring, ring)?;

        self.commit(outer_tmp, &paths.outer, outer.triangle_count())?;
        self.commit(ring_tmp, &paths.ring, ring.triangle_count())?;
        Ok(paths)
    }

    /// Create the directory and write every cell, in order
    pub fn write_all(&self, cells: &[CellMeshes]) -> Result<Vec<CellPaths>> {
        self.prepare()?;
        let written = cells
            .iter()
            .map(|cell| self.write_cell(cell))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            files = written.len() * 2,
            dir = %self.out_dir.display(),
            "Wrote cell meshes"
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_use_patterns() {
        let layout = OutputLayout::new("out").with_patterns(
            FilenamePattern::parse("a_{i}_{j}.stl").unwrap(),
            FilenamePattern::parse("b_{i}_{j}.stl").unwrap(),
        );
        let paths = layout.paths(CellIndex::new(1, 2));
        assert_eq!(paths.outer, Path::new("out").join("a_1_2.stl"));
        assert_eq!(paths.ring, Path::new("out").join("b_1_2.stl"));
    }

    #[test]
    fn test_default_layout() {
        let layout = OutputLayout::new("stl_output");
        assert_eq!(layout.format(), StlFormat::Binary);
        assert_eq!(
            layout.path(CellIndex::new(0, 0), MeshKind::Ring),
            Path::new("stl_output").join("cell_ring_x0_y0.stl")
        );
    }
}
