// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fs;
use stl_grid_geometry::{FailurePolicy, GridGenerator, GridParams, HoleSpec};
use stl_grid_stl::{FilenamePattern, OutputLayout, StlFormat};

fn reference_cells() -> Vec<stl_grid_geometry::CellMeshes> {
    let mut params = GridParams::new(3, 2, 6.0, 4.0);
    params.hole = HoleSpec::relative(0.5, 0.5);
    GridGenerator::new(&params)
        .unwrap()
        .generate(FailurePolicy::Abort)
        .unwrap()
        .cells
}

#[test]
fn test_writes_two_files_per_cell() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("nested").join("stl_output");
    let layout = OutputLayout::new(&out_dir);

    let cells = reference_cells();
    let written = layout.write_all(&cells).unwrap();
    assert_eq!(written.len(), 6);

    let mut names: Vec<String> = fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names.len(), 12);
    assert!(names.contains(&"cell_inner_x2_y1.stl".to_string()));
    assert!(names.contains(&"cell_ring_x0_y0.stl".to_string()));

    for (cell, paths) in cells.iter().zip(&written) {
        let outer = fs::read(&paths.outer).unwrap();
        assert_eq!(outer.len(), 84 + 50 * cell.outer.triangle_count());
        let ring = fs::read(&paths.ring).unwrap();
        assert_eq!(ring.len(), 84 + 50 * cell.ring.triangle_count());

        let count = u32::from_le_bytes([ring[80], ring[81], ring[82], ring[83]]);
        assert_eq!(count as usize, cell.ring.triangle_count());
    }
}

#[test]
fn test_ascii_solid_named_after_file() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path())
        .with_format(StlFormat::Ascii)
        .with_patterns(
            FilenamePattern::parse("solid_{i}_{j}.stl").unwrap(),
            FilenamePattern::parse("frame_{i}_{j}.stl").unwrap(),
        );

    let cells = reference_cells();
    let paths = layout.write_cell(&cells[0]).unwrap();

    let text = fs::read_to_string(&paths.outer).unwrap();
    assert!(text.starts_with("solid solid_0_0\n"));
    assert!(text.trim_end().ends_with("endsolid solid_0_0"));
    assert_eq!(text.matches("facet normal").count(), 2);

    let text = fs::read_to_string(&paths.ring).unwrap();
    assert!(text.starts_with("solid frame_0_0\n"));
    assert_eq!(text.matches("endfacet").count(), cells[0].ring.triangle_count());
}

#[test]
fn test_existing_file_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    let cells = reference_cells();
    let paths = layout.paths(cells[0].index);

    fs::write(&paths.outer, b"stale").unwrap();
    layout.write_cell(&cells[0]).unwrap();
    assert_eq!(fs::read(&paths.outer).unwrap().len(), 84 + 100);

    // No temporary files are left next to the output
    let count = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(count, 2);
}

#[test]
fn test_pattern_subdirectories_are_created() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path()).with_patterns(
        FilenamePattern::parse("outer/{i}_{j}.stl").unwrap(),
        FilenamePattern::parse("ring/{i}_{j}.stl").unwrap(),
    );
    let cells = reference_cells();
    layout.write_all(&cells).unwrap();
    assert!(dir.path().join("outer").join("1_1.stl").is_file());
    assert!(dir.path().join("ring").join("2_0.stl").is_file());
}

#[test]
fn test_failed_ring_leaves_no_outer_file() {
    let dir = tempfile::tempdir().unwrap();
    // A plain file where the ring subdirectory should go
    fs::write(dir.path().join("blocked"), b"").unwrap();

    let layout = OutputLayout::new(dir.path()).with_patterns(
        FilenamePattern::outer(),
        FilenamePattern::parse("blocked/{i}_{j}.stl").unwrap(),
    );
    let cells = reference_cells();
    assert!(layout.write_cell(&cells[0]).is_err());

    assert!(!layout.paths(cells[0].index).outer.exists());
    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["blocked".to_string()]);
}
