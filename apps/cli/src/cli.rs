// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command line arguments.

use crate::config::{
    FileConfig, GridSection, InnerRectangleSection, OptionsSection, OrientationSection,
    OutputSection, PlacementSection,
};
use crate::error::ConfigError;
use clap::Parser;
use std::path::PathBuf;
use stl_grid_geometry::{HoleSizeMode, NormalSign, Orientation};

const AFTER_HELP: &str = "\
Getting started:
  stl-grid-gen --generate-config grid.yaml
  stl-grid-gen --config grid.yaml

Examples:
  stl-grid-gen --nx 3 --ny 2 --W 15 --H 10 --sx 0.7 --sy 0.7
  stl-grid-gen --nx 2 --ny 2 --W 5 --H 5 --orientation x --sx 1 --sy 1 --inner-size-mode absolute
  stl-grid-gen --config grid.yaml --out-dir custom_output --stl-ascii";

#[derive(Parser, Debug)]
#[command(name = "stl-grid-gen", version)]
#[command(about = "Generate rectangular STL grids with optional holes", long_about = None)]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    /// Configuration file (.yaml, .yml or .toml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write an example configuration file and exit; the extension picks YAML or TOML
    #[arg(long, value_name = "PATH")]
    pub generate_config: Option<PathBuf>,

    /// Number of cells along u (>= 1)
    #[arg(long)]
    pub nx: Option<usize>,

    /// Number of cells along v (>= 1)
    #[arg(long)]
    pub ny: Option<usize>,

    /// Total width along u (> 0)
    #[arg(long = "W", visible_alias = "width", value_name = "W")]
    pub width: Option<f64>,

    /// Total height along v (> 0)
    #[arg(long = "H", visible_alias = "height", value_name = "H")]
    pub height: Option<f64>,

    /// Axis of the plane normal [default: z]
    #[arg(long, value_name = "x|y|z")]
    pub orientation: Option<Orientation>,

    /// Direction of the normal along its axis [default: 1]
    #[arg(long, value_name = "1|-1", allow_negative_numbers = true, value_parser = parse_normal_sign)]
    pub normal_sign: Option<NormalSign>,

    /// In-plane rotation in degrees [default: 0]
    #[arg(long, value_name = "DEG", allow_negative_numbers = true)]
    pub rotate_deg: Option<f64>,

    /// Hole size along u [default: 0.5]
    #[arg(long)]
    pub sx: Option<f64>,

    /// Hole size along v [default: 0.5]
    #[arg(long)]
    pub sy: Option<f64>,

    /// Hole sizes as fraction of the cell or in model units [default: relative]
    #[arg(long, value_name = "relative|absolute")]
    pub inner_size_mode: Option<HoleSizeMode>,

    /// World position of the grid centre [default: 0 0 0]
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    pub origin: Option<Vec<f64>>,

    /// Margin removed from each side of every cell [default: 0]
    #[arg(long)]
    pub border_gap: Option<f64>,

    /// Output directory [default: output]
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Filename pattern of the solid cells [default: cell_inner_x{i}_y{j}.stl]
    #[arg(long, value_name = "PATTERN")]
    pub inner_pattern: Option<String>,

    /// Filename pattern of the cells with holes [default: cell_ring_x{i}_y{j}.stl]
    #[arg(long, value_name = "PATTERN")]
    pub ring_pattern: Option<String>,

    /// Write ASCII instead of binary STL
    #[arg(long)]
    pub stl_ascii: bool,

    /// Print the configuration summary without writing files
    #[arg(long)]
    pub info_only: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Write the valid cells even when some cells fail
    #[arg(long)]
    pub keep_going: bool,
}

fn parse_normal_sign(s: &str) -> Result<NormalSign, String> {
    let value: i32 = s.trim_start_matches('+').parse().map_err(|_| format!("'{}' is not an integer", s))?;
    NormalSign::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    /// Command line layer of the configuration. Flags that are off leave
    /// the lower layers untouched.
    pub fn overrides(&self) -> Result<FileConfig, ConfigError> {
        let origin = match &self.origin {
            Some(coords) => {
                let xyz: [f64; 3] = coords
                    .as_slice()
                    .try_into()
                    .map_err(|_| ConfigError::OriginArity(coords.len()))?;
                Some(xyz)
            }
            None => None,
        };

        Ok(FileConfig {
            grid: GridSection {
                nx: self.nx,
                ny: self.ny,
                width: self.width,
                height: self.height,
            },
            orientation: OrientationSection {
                orientation: self.orientation,
                normal_sign: self.normal_sign,
                rotate_deg: self.rotate_deg,
            },
            inner_rectangle: InnerRectangleSection {
                sx: self.sx,
                sy: self.sy,
                inner_size_mode: self.inner_size_mode,
            },
            placement: PlacementSection {
                origin,
                border_gap: self.border_gap,
            },
            output: OutputSection {
                out_dir: self.out_dir.clone(),
                cell_filename_inner: self.inner_pattern.clone(),
                cell_filename_ring: self.ring_pattern.clone(),
                stl_ascii: self.stl_ascii.then_some(true),
            },
            options: OptionsSection {
                verbose: self.verbose.then_some(true),
                info_only: self.info_only.then_some(true),
                keep_going: self.keep_going.then_some(true),
            },
        })
    }
}
