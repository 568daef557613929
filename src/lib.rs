// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! Cellforge
//!
//! Synthesizes labeled 3D solid-geometry models of multilayer battery
//! cells with randomized manufacturing deviations, for use as synthetic
//! training and validation data in CT-based defect detection.

pub mod bend;
pub mod builder;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod io;
pub mod labels;
pub mod model;
pub mod sampling;

pub use config::Configuration;
pub use error::{GenerationError, GeometryError};
pub use export::{ExportOrchestrator, ExportSession, RunReport};
pub use geometry::{GeometryEngine, MeshScene};
pub use labels::LabelRecord;
pub use model::{HousingSpec, LayerRegistry, LayerType, StackLayout};

/// Run a full export session against a fresh mesh scene.
pub fn generate(config: &Configuration) -> Result<RunReport, GenerationError> {
    let mut scene = MeshScene::new();
    ExportOrchestrator::new(config.clone(), &mut scene)?.run()
}
