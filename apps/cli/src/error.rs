// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, merging or writing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Unsupported config file {}: expected a .yaml, .yml or .toml extension",
        .path.display()
    )]
    UnknownFormat { path: PathBuf },

    #[error("Invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config file {}: {source}", .path.display())]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeYaml(#[from] serde_yaml::Error),

    #[error("Failed to write config file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required parameter(s): {}", .0.join(", "))]
    MissingRequired(Vec<&'static str>),

    #[error("origin needs exactly 3 coordinates, got {0}")]
    OriginArity(usize),

    #[error(transparent)]
    Pattern(#[from] stl_grid_stl::StlError),
}
