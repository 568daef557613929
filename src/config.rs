// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! Generation configuration document

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::GenerationError;

/// Flat parameter record consumed by the generation core.
///
/// All lengths are in meters (SI), angles in degrees. The document is
/// stored as JSON so external front ends can produce it directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    /// Base output directory; each run creates a timestamped folder below it
    pub path: PathBuf,
    /// Number of export iterations
    pub num_export: usize,
    /// Apply the shared anode-family overhang
    pub overhang: bool,
    /// Export the housing mesh
    pub case: bool,
    /// Cut the housing across the ZY mid-plane for inspection
    pub cut_zy: bool,
    /// Cut the housing across the ZX mid-plane for inspection
    pub cut_zx: bool,
    /// Bend plate edges
    pub bending: bool,
    /// Std-dev of lateral x jitter
    pub dev_x: f64,
    /// Std-dev of lateral y jitter
    pub dev_y: f64,
    /// Anode count; cathode count is derived as one less
    pub num_anodes: usize,
    /// Nominal plate length
    pub size_x: f64,
    /// Nominal plate width
    pub size_y: f64,
    /// Nominal plate height
    pub size_z: f64,
    pub min_overhang: f64,
    pub max_overhang: f64,
    /// Separator gap inserted between electrode/coating groups
    pub separator: f64,
    pub max_angle: f64,
    pub min_angle: f64,
    /// Seed for the per-session random source; omit for entropy seeding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            num_export: 1,
            overhang: true,
            case: true,
            cut_zy: true,
            cut_zx: true,
            bending: true,
            dev_x: 1e-3,
            dev_y: 1e-3,
            num_anodes: 10,
            size_x: 0.1015,
            size_y: 0.050,
            size_z: 0.001,
            min_overhang: 0.0023,
            max_overhang: 0.0068,
            separator: 0.001,
            max_angle: 15.0,
            min_angle: -15.0,
            seed: None,
        }
    }
}

impl Configuration {
    /// Load a configuration document from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Configuration = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Save the configuration document to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Validate field ranges before a run starts
    pub fn validate(&self) -> Result<(), GenerationError> {
        let fail = |msg: String| Err(GenerationError::Configuration(msg));

        if self.num_export == 0 {
            return fail("num_export must be at least 1".into());
        }
        if self.num_anodes < 2 {
            return fail(format!(
                "num_anodes must be at least 2, got {}",
                self.num_anodes
            ));
        }
        for (name, value) in [
            ("size_x", self.size_x),
            ("size_y", self.size_y),
            ("size_z", self.size_z),
        ] {
            if value <= 0.0 {
                return fail(format!("{name} must be positive, got {value}"));
            }
        }
        for (name, value) in [
            ("dev_x", self.dev_x),
            ("dev_y", self.dev_y),
            ("separator", self.separator),
            ("min_overhang", self.min_overhang),
            ("max_overhang", self.max_overhang),
        ] {
            if value < 0.0 {
                return fail(format!("{name} must not be negative, got {value}"));
            }
        }
        if self.min_overhang > self.max_overhang {
            return fail(format!(
                "min_overhang {} exceeds max_overhang {}",
                self.min_overhang, self.max_overhang
            ));
        }
        if self.min_angle > self.max_angle {
            return fail(format!(
                "min_angle {} exceeds max_angle {}",
                self.min_angle, self.max_angle
            ));
        }
        Ok(())
    }
}
