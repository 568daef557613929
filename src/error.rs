// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! Error taxonomy for cell generation

use thiserror::Error;

/// Failure inside the mesh engine
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("unknown mesh handle {0}")]
    UnknownHandle(usize),

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("mesh export failed: {0}")]
    Export(#[from] std::io::Error),
}

/// Top-level generation failure
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Invalid or missing configuration field; aborts the run before any
    /// iteration starts.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A coating was built before its parent electrode. Invariant
    /// violation; never recovered by defaulting positions.
    #[error("sequencing violation: {0}")]
    Sequencing(String),

    /// A mesh engine call failed; aborts the current iteration only.
    #[error("geometry engine: {0}")]
    Geometry(#[from] GeometryError),

    /// Label arrays disagree with the instance counts at flush time.
    #[error("label consistency: {0}")]
    LabelConsistency(String),

    /// Export path or label file could not be written; aborts the
    /// current iteration only.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl GenerationError {
    /// Whether the orchestrator may continue with the next iteration
    /// after this failure.
    pub fn is_iteration_local(&self) -> bool {
        matches!(self, Self::Geometry(_) | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_local_classification() {
        let geo = GenerationError::Geometry(GeometryError::UnknownHandle(3));
        assert!(geo.is_iteration_local());

        let seq = GenerationError::Sequencing("coating before electrode".into());
        assert!(!seq.is_iteration_local());

        let cfg = GenerationError::Configuration("num_anodes must be >= 2".into());
        assert!(!cfg.is_iteration_local());
    }
}
