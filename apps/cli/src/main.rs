// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! stl-grid-gen - planar STL grid generator.
//!
//! Lays out an `nx x ny` grid of cells on an axis-aligned plane and writes
//! two STL files per cell: the solid cell rectangle and the same rectangle
//! with a concentric rectangular hole.
//!
//! Settings are read from an optional YAML or TOML file and overridden by
//! flags:
//!
//! ```text
//! stl-grid-gen --generate-config grid.yaml
//! stl-grid-gen --config grid.yaml --out-dir custom_output
//! stl-grid-gen --nx 3 --ny 2 --W 15 --H 10 --sx 0.7 --sy 0.7
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use stl_grid_geometry::{FailurePolicy, GridGenerator};
use stl_grid_stl::OutputLayout;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod error;
mod summary;

use cli::Cli;
use config::{FileConfig, RunConfig};

fn init_logging(verbose: bool) {
    let default = if verbose {
        "info,stl_grid_gen=debug,stl_grid_geometry=debug,stl_grid_stl=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    if let Some(path) = &cli.generate_config {
        init_logging(cli.verbose);
        FileConfig::write_example(path)?;
        tracing::info!(path = %path.display(), "Example configuration written");
        println!("Example usage:\n  stl-grid-gen --config {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let merged = file.merge(cli.overrides()?);

    init_logging(merged.options.verbose.unwrap_or(false));
    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "Loaded configuration");
    }

    // PHASE 1: validate everything before touching the filesystem
    let config = RunConfig::try_from(merged).context("Invalid configuration")?;
    let generator = GridGenerator::new(&config.params).context("Invalid configuration")?;
    tracing::debug!(?generator, "Generator ready");

    if config.info_only || config.verbose {
        print!("{}", summary::render(&config, &generator)?);
    }
    if config.info_only {
        return Ok(ExitCode::SUCCESS);
    }

    // PHASE 2: compute all meshes
    let policy = if config.keep_going {
        FailurePolicy::Continue
    } else {
        FailurePolicy::Abort
    };
    let output = generator
        .generate(policy)
        .context("Failed to generate cell meshes")?;

    // PHASE 3: write files
    let layout = OutputLayout::new(&config.out_dir)
        .with_patterns(config.inner_pattern.clone(), config.ring_pattern.clone())
        .with_format(config.format);
    layout.write_all(&output.cells).with_context(|| {
        format!("Failed to write STL files to {}", config.out_dir.display())
    })?;

    if output.is_complete() {
        tracing::info!(
            files = output.file_count(),
            dir = %config.out_dir.display(),
            "Generated grid"
        );
        Ok(ExitCode::SUCCESS)
    } else {
        for (cell, err) in &output.failures {
            tracing::error!(cell = %cell, "{}", err);
        }
        tracing::error!(
            failed = output.failures.len(),
            written = output.file_count(),
            "Some cells could not be generated"
        );
        Ok(ExitCode::FAILURE)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
