// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Human readable configuration summary for `--info-only` and `--verbose`.

use crate::config::RunConfig;
use std::fmt::Write;
use stl_grid_geometry::{CellIndex, GridGenerator, Point2, Point3, Vector2, Vector3};

fn p2(p: &Point2<f64>) -> String {
    format!("({}, {})", p.x, p.y)
}

fn p3(p: &Point3<f64>) -> String {
    format!("({}, {}, {})", p.x, p.y, p.z)
}

fn v2(v: &Vector2<f64>) -> String {
    format!("{} x {}", v.x, v.y)
}

fn v3(v: &Vector3<f64>) -> String {
    format!("({}, {}, {})", v.x, v.y, v.z)
}

/// Render the summary; the sample cell is included when `verbose` is set.
pub fn render(config: &RunConfig, generator: &GridGenerator) -> Result<String, std::fmt::Error> {
    let params = &config.params;
    let mut out = String::new();

    writeln!(out, "STL Grid Generator Configuration:")?;
    writeln!(out, "{}", "=".repeat(40))?;
    writeln!(out, "Grid dimensions:    {} x {}", params.nx, params.ny)?;
    writeln!(out, "Rectangle size:     {} x {}", params.width, params.height)?;
    writeln!(
        out,
        "Orientation:        {} (normal sign: {})",
        params.orientation, params.normal_sign
    )?;
    writeln!(out, "Rotation:           {} deg", params.rotate_deg)?;
    writeln!(out, "Origin:             {}", p3(&params.origin))?;
    writeln!(
        out,
        "Inner size:         {} x {} ({})",
        params.hole.sx, params.hole.sy, params.hole.mode
    )?;
    if params.border_gap > 0.0 {
        writeln!(out, "Border gap:         {}", params.border_gap)?;
    }
    writeln!(out, "Output directory:   {}", config.out_dir.display())?;
    writeln!(out, "STL format:         {}", config.format)?;
    writeln!(out, "Files to generate:  {}", generator.file_count())?;

    if config.verbose {
        // Sizing of the first cell can still fail, e.g. an absolute hole
        // wider than the cell; report it instead of aborting the summary.
        writeln!(out)?;
        writeln!(out, "Sample cell information (0, 0):")?;
        writeln!(out, "{}", "-".repeat(30))?;
        match generator.cell_info(CellIndex::new(0, 0)) {
            Ok(info) => {
                let b = &info.local_bounds;
                writeln!(out, "Local bounds:       u [{}, {}], v [{}, {}]", b.u0, b.u1, b.v0, b.v1)?;
                writeln!(out, "Local center:       {}", p2(&info.local_center))?;
                writeln!(out, "World center:       {}", p3(&info.world_center))?;
                writeln!(out, "Outer size:         {}", v2(&info.outer_size))?;
                writeln!(out, "Inner size:         {}", v2(&info.inner_size))?;
                writeln!(out, "Normal vector:      {}", v3(&info.normal))?;
            }
            Err(err) => writeln!(out, "Unavailable:        {}", err)?,
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileConfig, RunConfig};

    fn run_config(verbose: bool) -> RunConfig {
        let mut file = FileConfig::default();
        file.grid.nx = Some(3);
        file.grid.ny = Some(2);
        file.grid.width = Some(6.0);
        file.grid.height = Some(4.0);
        file.options.verbose = Some(verbose);
        RunConfig::try_from(file).unwrap()
    }

    #[test]
    fn test_summary_lists_file_count() {
        let config = run_config(false);
        let generator = GridGenerator::new(&config.params).unwrap();
        let text = render(&config, &generator).unwrap();
        assert!(text.contains("Grid dimensions:    3 x 2"));
        assert!(text.contains("Orientation:        z (normal sign: +1)"));
        assert!(text.contains("STL format:         binary"));
        assert!(text.contains("Files to generate:  12"));
        assert!(!text.contains("Border gap"));
        assert!(!text.contains("Sample cell"));
    }

    #[test]
    fn test_verbose_summary_shows_first_cell() {
        let config = run_config(true);
        let generator = GridGenerator::new(&config.params).unwrap();
        let text = render(&config, &generator).unwrap();
        assert!(text.contains("Local center:       (-2, -1)"));
        assert!(text.contains("World center:       (-2, -1, 0)"));
        assert!(text.contains("Inner size:         1 x 1"));
        assert!(text.contains("Normal vector:      (0, 0, 1)"));
    }
}
