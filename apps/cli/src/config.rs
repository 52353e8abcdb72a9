// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Run configuration.
//!
//! Values come from three layers, each overriding the previous one:
//! built-in defaults, the config file, and command line flags. The two upper
//! layers share the [`FileConfig`] shape where every value is optional.
//!
//! Config files are YAML (`.yaml`, `.yml`) or TOML (`.toml`), picked by
//! extension. Both use the same section and key names.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use stl_grid_geometry::{GridParams, HoleSizeMode, HoleSpec, NormalSign, Orientation, Point3};
use stl_grid_stl::{FilenamePattern, StlFormat};

/// Default output directory.
pub const DEFAULT_OUT_DIR: &str = "output";

/// Serialization format of a config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Format implied by the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
        match ext.as_deref() {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            _ => Err(ConfigError::UnknownFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// `[grid]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nx: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ny: Option<usize>,
    #[serde(rename = "W", default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(rename = "H", default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// `[orientation]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrientationSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_sign: Option<NormalSign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate_deg: Option<f64>,
}

/// `[inner_rectangle]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InnerRectangleSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sx: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_size_mode: Option<HoleSizeMode>,
}

/// `[placement]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlacementSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_gap: Option<f64>,
}

/// `[output]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_filename_inner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_filename_ring: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stl_ascii: Option<bool>,
}

/// `[options]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionsSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_going: Option<bool>,
}

/// One configuration layer, as found in a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub grid: GridSection,
    #[serde(default)]
    pub orientation: OrientationSection,
    #[serde(default)]
    pub inner_rectangle: InnerRectangleSection,
    #[serde(default)]
    pub placement: PlacementSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub options: OptionsSection,
}

impl FileConfig {
    /// Parse a config file, YAML or TOML depending on its extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path)?;
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, format, path)
    }

    /// Parse `text`; `path` is only used in error messages.
    pub fn parse(text: &str, format: ConfigFormat, path: &Path) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Yaml => {
                serde_yaml::from_str(text).map_err(|source| ConfigError::ParseYaml {
                    path: path.to_path_buf(),
                    source,
                })
            }
            ConfigFormat::Toml => toml::from_str(text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Fully populated example, written by `--generate-config`.
    pub fn example() -> Self {
        Self {
            grid: GridSection {
                nx: Some(3),
                ny: Some(2),
                width: Some(10.0),
                height: Some(8.0),
            },
            orientation: OrientationSection {
                orientation: Some(Orientation::Z),
                normal_sign: Some(NormalSign::Positive),
                rotate_deg: Some(0.0),
            },
            inner_rectangle: InnerRectangleSection {
                sx: Some(0.7),
                sy: Some(0.7),
                inner_size_mode: Some(HoleSizeMode::Relative),
            },
            placement: PlacementSection {
                origin: Some([0.0, 0.0, 0.0]),
                border_gap: Some(0.0),
            },
            output: OutputSection {
                out_dir: Some(PathBuf::from(DEFAULT_OUT_DIR)),
                cell_filename_inner: Some(FilenamePattern::OUTER.to_string()),
                cell_filename_ring: Some(FilenamePattern::RING.to_string()),
                stl_ascii: Some(false),
            },
            options: OptionsSection {
                verbose: Some(false),
                info_only: Some(false),
                keep_going: Some(false),
            },
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn render(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        match format {
            ConfigFormat::Yaml => self.to_yaml(),
            ConfigFormat::Toml => self.to_toml(),
        }
    }

    /// Write the example config to `path`, in the format its extension names.
    pub fn write_example(path: &Path) -> Result<(), ConfigError> {
        let text = Self::example().render(ConfigFormat::from_path(path)?)?;
        fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Layer `upper` on top of `self`; values set in `upper` win.
    pub fn merge(self, upper: FileConfig) -> FileConfig {
        FileConfig {
            grid: GridSection {
                nx: upper.grid.nx.or(self.grid.nx),
                ny: upper.grid.ny.or(self.grid.ny),
                width: upper.grid.width.or(self.grid.width),
                height: upper.grid.height.or(self.grid.height),
            },
            orientation: OrientationSection {
                orientation: upper.orientation.orientation.or(self.orientation.orientation),
                normal_sign: upper.orientation.normal_sign.or(self.orientation.normal_sign),
                rotate_deg: upper.orientation.rotate_deg.or(self.orientation.rotate_deg),
            },
            inner_rectangle: InnerRectangleSection {
                sx: upper.inner_rectangle.sx.or(self.inner_rectangle.sx),
                sy: upper.inner_rectangle.sy.or(self.inner_rectangle.sy),
                inner_size_mode: upper
                    .inner_rectangle
                    .inner_size_mode
                    .or(self.inner_rectangle.inner_size_mode),
            },
            placement: PlacementSection {
                origin: upper.placement.origin.or(self.placement.origin),
                border_gap: upper.placement.border_gap.or(self.placement.border_gap),
            },
            output: OutputSection {
                out_dir: upper.output.out_dir.or(self.output.out_dir),
                cell_filename_inner: upper
                    .output
                    .cell_filename_inner
                    .or(self.output.cell_filename_inner),
                cell_filename_ring: upper
                    .output
                    .cell_filename_ring
                    .or(self.output.cell_filename_ring),
                stl_ascii: upper.output.stl_ascii.or(self.output.stl_ascii),
            },
            options: OptionsSection {
                verbose: upper.options.verbose.or(self.options.verbose),
                info_only: upper.options.info_only.or(self.options.info_only),
                keep_going: upper.options.keep_going.or(self.options.keep_going),
            },
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub params: GridParams,
    pub out_dir: PathBuf,
    pub inner_pattern: FilenamePattern,
    pub ring_pattern: FilenamePattern,
    pub format: StlFormat,
    pub verbose: bool,
    pub info_only: bool,
    pub keep_going: bool,
}

impl TryFrom<FileConfig> for RunConfig {
    type Error = ConfigError;

    /// Apply defaults and check that the required values are present.
    ///
    /// Range checks on the numbers are left to the generator.
    fn try_from(config: FileConfig) -> Result<Self, Self::Error> {
        let grid = &config.grid;
        let missing: Vec<&'static str> = [
            ("nx", grid.nx.is_none()),
            ("ny", grid.ny.is_none()),
            ("W", grid.width.is_none()),
            ("H", grid.height.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        let (Some(nx), Some(ny), Some(width), Some(height)) =
            (grid.nx, grid.ny, grid.width, grid.height)
        else {
            return Err(ConfigError::MissingRequired(missing));
        };

        let defaults = HoleSpec::default();
        let inner = &config.inner_rectangle;
        let hole = HoleSpec::new(
            inner.sx.unwrap_or(defaults.sx),
            inner.sy.unwrap_or(defaults.sy),
            inner.inner_size_mode.unwrap_or(defaults.mode),
        );

        let [x, y, z] = config.placement.origin.unwrap_or([0.0; 3]);

        let mut params = GridParams::new(nx, ny, width, height);
        params.orientation = config.orientation.orientation.unwrap_or_default();
        params.normal_sign = config.orientation.normal_sign.unwrap_or_default();
        params.rotate_deg = config.orientation.rotate_deg.unwrap_or(0.0);
        params.hole = hole;
        params.origin = Point3::new(x, y, z);
        params.border_gap = config.placement.border_gap.unwrap_or(0.0);

        let output = config.output;
        let inner_pattern = match output.cell_filename_inner {
            Some(p) => FilenamePattern::parse(&p)?,
            None => FilenamePattern::outer(),
        };
        let ring_pattern = match output.cell_filename_ring {
            Some(p) => FilenamePattern::parse(&p)?,
            None => FilenamePattern::ring(),
        };
        let format = if output.stl_ascii.unwrap_or(false) {
            StlFormat::Ascii
        } else {
            StlFormat::Binary
        };

        Ok(Self {
            params,
            out_dir: output.out_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR)),
            inner_pattern,
            ring_pattern,
            format,
            verbose: config.options.verbose.unwrap_or(false),
            info_only: config.options.info_only.unwrap_or(false),
            keep_going: config.options.keep_going.unwrap_or(false),
        })
    }
}
