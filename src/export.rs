// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! Export session and orchestrator
//!
//! One session runs `num_export` iterations against a fresh scene each
//! time. Every iteration writes its artifacts into a private staging
//! directory and renames them into the session directory only after the
//! iteration finished, so a failed iteration leaves no partial files.

use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::builder::{build_housing, build_layer_stack, cut_housing_zx, cut_housing_zy};
use crate::config::Configuration;
use crate::error::GenerationError;
use crate::geometry::{GeometryEngine, MeshHandle};
use crate::labels::LabelRecord;
use crate::model::{HousingSpec, LayerRegistry, LayerType, StackLayout, WALL_THICKNESS};
use crate::sampling::DeviationSampler;

/// Immutable identity of one export run
#[derive(Debug, Clone)]
pub struct ExportSession {
    pub timestamp: String,
    pub output_dir: PathBuf,
}

impl ExportSession {
    pub fn start(config: &Configuration) -> Self {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let output_dir = config.path.join(format!("Model_{timestamp}"));
        Self {
            timestamp,
            output_dir,
        }
    }

    /// Artifact filename, keyed by iteration index and session timestamp
    pub fn artifact_name(&self, iteration: usize, name: &str, extension: &str) -> String {
        format!("{}_{}_{}.{}", iteration + 1, self.timestamp, name, extension)
    }
}

/// One failed iteration with its cause
#[derive(Debug)]
pub struct IterationFailure {
    pub index: usize,
    pub error: GenerationError,
}

/// Outcome of a run: which iterations completed, which failed and why
#[derive(Debug)]
pub struct RunReport {
    pub completed: Vec<usize>,
    pub failures: Vec<IterationFailure>,
    pub cancelled: bool,
    pub output_dir: PathBuf,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

/// Drives all export iterations of one session
pub struct ExportOrchestrator<'e> {
    engine: &'e mut dyn GeometryEngine,
    config: Configuration,
    session: ExportSession,
    registry: LayerRegistry,
    layout: StackLayout,
    housing: HousingSpec,
    sampler: DeviationSampler,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'e> ExportOrchestrator<'e> {
    /// Validate the configuration and precompute the per-run state.
    pub fn new(
        config: Configuration,
        engine: &'e mut dyn GeometryEngine,
    ) -> Result<Self, GenerationError> {
        let registry = LayerRegistry::from_config(&config)?;
        let layout = StackLayout::solve(&registry, config.separator, WALL_THICKNESS);
        let housing = HousingSpec::derive(&registry, config.separator, config.dev_x, config.dev_y);
        let sampler = DeviationSampler::new(
            config.dev_x,
            config.dev_y,
            config.min_angle,
            config.max_angle,
            config.seed,
        );
        let session = ExportSession::start(&config);

        Ok(Self {
            engine,
            config,
            session,
            registry,
            layout,
            housing,
            sampler,
            cancel: None,
        })
    }

    pub fn session(&self) -> &ExportSession {
        &self.session
    }

    pub fn iterations(&self) -> usize {
        self.config.num_export
    }

    /// Token checked between iterations; mid-iteration cancellation is
    /// deliberately not supported to avoid partial exports.
    pub fn set_cancel_token(&mut self, token: Arc<AtomicBool>) {
        self.cancel = Some(token);
    }

    pub fn run(self) -> Result<RunReport, GenerationError> {
        self.run_with(|_, _| {})
    }

    /// Run all iterations, reporting each outcome to `observer`.
    ///
    /// `Geometry` and `Io` failures abort only their iteration; the
    /// invariant-violation errors abort the whole run.
    pub fn run_with(
        mut self,
        mut observer: impl FnMut(usize, Option<&GenerationError>),
    ) -> Result<RunReport, GenerationError> {
        std::fs::create_dir_all(&self.session.output_dir)?;

        let mut report = RunReport {
            completed: Vec::new(),
            failures: Vec::new(),
            cancelled: false,
            output_dir: self.session.output_dir.clone(),
        };

        for j in 0..self.config.num_export {
            if let Some(ref cancel) = self.cancel {
                if cancel.load(Ordering::Relaxed) {
                    report.cancelled = true;
                    break;
                }
            }

            let stage = self
                .session
                .output_dir
                .join(format!(".stage_{}", j + 1));
            let result = self.run_iteration(j, &stage);

            match result {
                Ok(()) => {
                    report.completed.push(j);
                    observer(j, None);
                }
                Err(error) => {
                    let _ = std::fs::remove_dir_all(&stage);
                    if error.is_iteration_local() {
                        observer(j, Some(&error));
                        report.failures.push(IterationFailure { index: j, error });
                    } else {
                        return Err(error);
                    }
                }
            }
        }

        Ok(report)
    }

    /// Build, label, export and commit one iteration.
    fn run_iteration(&mut self, j: usize, stage: &Path) -> Result<(), GenerationError> {
        std::fs::create_dir_all(stage)?;

        self.engine.clear();
        let mut labels = LabelRecord::new();

        // One overhang draw shared by the whole anode family
        let overhang = if self.config.overhang {
            self.registry
                .spec(LayerType::Anode)
                .overhang
                .map(|range| self.sampler.sample_overhang(range))
        } else {
            None
        };

        let mut stacks: Vec<(LayerType, Vec<MeshHandle>)> = Vec::new();
        for layer in LayerType::STACK_ORDER {
            let instances = build_layer_stack(
                &mut *self.engine,
                &mut self.sampler,
                &mut labels,
                &self.registry,
                &self.layout,
                layer,
                overhang,
                self.config.bending,
            )?;
            stacks.push((layer, instances.into_iter().map(|i| i.handle).collect()));
        }

        let shell = build_housing(&mut *self.engine, &mut labels, &self.housing)?;

        labels.verify(&self.registry)?;

        for (layer, handles) in &stacks {
            let path = stage.join(self.session.artifact_name(j, layer.name(), "stl"));
            self.engine.export_mesh(handles, &path)?;
        }
        if self.config.case {
            let path = stage.join(self.session.artifact_name(j, "housing", "stl"));
            self.engine.export_mesh(&[shell], &path)?;
        }

        let labels_path = stage.join(self.session.artifact_name(j, "labeling", "json"));
        labels.write(&labels_path)?;

        // Inspection cuts run last; the intact housing is already exported
        let mut cut_shell = shell;
        let mut cut_applied = false;
        if self.config.cut_zy {
            cut_shell = cut_housing_zy(&mut *self.engine, cut_shell, &self.housing)?;
            cut_applied = true;
        }
        if self.config.cut_zx {
            cut_shell = cut_housing_zx(&mut *self.engine, cut_shell, &self.housing)?;
            cut_applied = true;
        }
        if cut_applied {
            let path = stage.join(self.session.artifact_name(j, "housing_cut", "stl"));
            self.engine.export_mesh(&[cut_shell], &path)?;
        }

        self.commit(stage)
    }

    /// Move staged artifacts into the session directory.
    fn commit(&self, stage: &Path) -> Result<(), GenerationError> {
        for entry in std::fs::read_dir(stage)? {
            let entry = entry?;
            std::fs::rename(
                entry.path(),
                self.session.output_dir.join(entry.file_name()),
            )?;
        }
        std::fs::remove_dir(stage)?;
        Ok(())
    }
}
