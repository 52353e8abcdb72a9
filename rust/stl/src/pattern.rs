// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-cell filename patterns

use crate::error::{Result, StlError};
use std::fmt;
use std::str::FromStr;
use stl_grid_geometry::CellIndex;

const I_PLACEHOLDER: &str = "{i}";
const J_PLACEHOLDER: &str = "{j}";

/// Filename template with `{i}` and `{j}` placeholders
///
/// Both placeholders are required so that every cell gets a distinct file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenamePattern(String);

impl FilenamePattern {
    /// Default name of the solid outer rectangle
    pub const OUTER: &'static str = "cell_inner_x{i}_y{j}.stl";
    /// Default name of the rectangle with the hole
    pub const RING: &'static str = "cell_ring_x{i}_y{j}.stl";

    pub fn parse(pattern: &str) -> Result<Self> {
        if !pattern.contains(I_PLACEHOLDER) || !pattern.contains(J_PLACEHOLDER) {
            return Err(StlError::MissingPlaceholder {
                pattern: pattern.to_string(),
            });
        }
        Ok(Self(pattern.to_string()))
    }

    pub fn outer() -> Self {
        Self(Self::OUTER.to_string())
    }

    pub fn ring() -> Self {
        Self(Self::RING.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn expand(&self, cell: CellIndex) -> String {
        self.0
            .replace(I_PLACEHOLDER, &cell.i.to_string())
            .replace(J_PLACEHOLDER, &cell.j.to_string())
    }
}

impl FromStr for FilenamePattern {
    type Err = StlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FilenamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_expand() {
        let cell = CellIndex::new(2, 11);
        assert_eq!(FilenamePattern::outer().expand(cell), "cell_inner_x2_y11.stl");
        assert_eq!(FilenamePattern::ring().expand(cell), "cell_ring_x2_y11.stl");
    }

    #[test]
    fn test_repeated_placeholders() {
        let pattern: FilenamePattern = "{i}-{j}/{i}_{j}.stl".parse().unwrap();
        assert_eq!(pattern.expand(CellIndex::new(0, 3)), "0-3/0_3.stl");
    }

    #[test]
    fn test_missing_placeholder() {
        for bad in ["cell_{i}.stl", "cell_{j}.stl", "cell.stl"] {
            assert!(matches!(
                FilenamePattern::parse(bad),
                Err(StlError::MissingPlaceholder { .. })
            ));
        }
    }
}
