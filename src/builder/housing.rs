// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! Housing builder
//!
//! The shell is the boolean difference of two edge-rounded boxes sharing
//! one center. Inspection cuts subtract half-space boxes across the ZY
//! and ZX mid-planes of the already-built shell.

use nalgebra::{Point3, Vector3};

use crate::error::GenerationError;
use crate::geometry::{GeometryEngine, MeshHandle};
use crate::labels::LabelRecord;
use crate::model::{HousingSpec, BEVEL_SEGMENTS};

/// Build the housing shell and record its label entry.
pub fn build_housing(
    engine: &mut dyn GeometryEngine,
    labels: &mut LabelRecord,
    housing: &HousingSpec,
) -> Result<MeshHandle, GenerationError> {
    let center = Point3::new(0.0, 0.0, housing.center_z());

    let outer = engine.create_box(
        Vector3::new(
            housing.outer_length,
            housing.outer_width,
            housing.outer_height,
        ),
        center,
    )?;
    engine.bevel(outer, housing.bevel_radius, BEVEL_SEGMENTS)?;

    let inner = engine.create_box(
        Vector3::new(
            housing.inner_length(),
            housing.inner_width(),
            housing.inner_height(),
        ),
        center,
    )?;
    engine.bevel(inner, housing.bevel_radius, BEVEL_SEGMENTS)?;

    let shell = engine.boolean_subtract(outer, inner)?;

    labels.append_housing(housing, center);
    Ok(shell)
}

/// Remove the x > 0 half of the shell, exposing the ZY section.
pub fn cut_housing_zy(
    engine: &mut dyn GeometryEngine,
    shell: MeshHandle,
    housing: &HousingSpec,
) -> Result<MeshHandle, GenerationError> {
    let cutter = engine.create_box(
        cut_block_size(housing),
        Point3::new(housing.outer_length / 2.0, 0.0, housing.center_z()),
    )?;
    Ok(engine.boolean_subtract(shell, cutter)?)
}

/// Remove the y > 0 half of the shell, exposing the ZX section.
pub fn cut_housing_zx(
    engine: &mut dyn GeometryEngine,
    shell: MeshHandle,
    housing: &HousingSpec,
) -> Result<MeshHandle, GenerationError> {
    let cutter = engine.create_box(
        cut_block_size(housing),
        Point3::new(0.0, housing.outer_width / 2.0, housing.center_z()),
    )?;
    Ok(engine.boolean_subtract(shell, cutter)?)
}

fn cut_block_size(housing: &HousingSpec) -> Vector3<f64> {
    // Slightly oversized so cutter faces never sit exactly on shell faces
    Vector3::new(
        housing.outer_length * 1.01,
        housing.outer_width * 1.01,
        housing.outer_height * 1.01,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::geometry::MeshScene;
    use crate::model::{LayerRegistry, LayerType};
    use approx::assert_relative_eq;

    fn housing_fixture() -> HousingSpec {
        let config = Configuration::default();
        let registry = LayerRegistry::from_config(&config).unwrap();
        HousingSpec::derive(&registry, config.separator, config.dev_x, config.dev_y)
    }

    #[test]
    fn test_build_housing_records_label_and_shell() {
        let mut scene = MeshScene::new();
        let mut labels = LabelRecord::new();
        let housing = housing_fixture();

        let shell = build_housing(&mut scene, &mut labels, &housing).unwrap();

        assert_eq!(labels.count(LayerType::Housing), 1);
        let center = labels.housing_center().unwrap();
        assert_eq!(center.z, housing.outer_height / 2.0);

        // Shell spans the full outer dimensions; the inner block is consumed
        let bbox = scene.mesh(shell).unwrap().bounding_box();
        assert_relative_eq!(bbox.size().x, housing.outer_length, epsilon = 1e-9);
        assert_relative_eq!(bbox.size().y, housing.outer_width, epsilon = 1e-9);
        assert_relative_eq!(bbox.size().z, housing.outer_height, epsilon = 1e-9);
        assert_eq!(scene.object_count(), 1);
    }

    #[test]
    fn test_zy_cut_removes_positive_x_half() {
        let mut scene = MeshScene::new();
        let mut labels = LabelRecord::new();
        let housing = housing_fixture();

        let shell = build_housing(&mut scene, &mut labels, &housing).unwrap();
        let cut = cut_housing_zy(&mut scene, shell, &housing).unwrap();

        let bbox = scene.mesh(cut).unwrap().bounding_box();
        assert!(bbox.max.x < housing.outer_length / 4.0);
        assert_relative_eq!(bbox.min.x, -housing.outer_length / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zx_cut_removes_positive_y_half() {
        let mut scene = MeshScene::new();
        let mut labels = LabelRecord::new();
        let housing = housing_fixture();

        let shell = build_housing(&mut scene, &mut labels, &housing).unwrap();
        let cut = cut_housing_zx(&mut scene, shell, &housing).unwrap();

        let bbox = scene.mesh(cut).unwrap().bounding_box();
        assert!(bbox.max.y < housing.outer_width / 4.0);
    }
}
