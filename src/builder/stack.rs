// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! Layer stack builder
//!
//! Builds all instances of one layer type: sample deviations, resolve
//! dimensions and position, create the plate mesh, record its label, and
//! bend the edges when enabled. Coating types copy the lateral position
//! and bend angles of the co-indexed electrode instance from the label
//! record, so electrode stacks must be built first.

use nalgebra::{Point3, Vector3};

use crate::bend::{BendPlan, BEND_DECIMATE_RATIO, BEND_SUBDIVISION_CUTS};
use crate::error::GenerationError;
use crate::geometry::{GeometryEngine, MeshHandle};
use crate::labels::LabelRecord;
use crate::model::{LayerRegistry, LayerType, StackLayout};
use crate::sampling::{resolve_dimensions, Deviation, DeviationSampler, Dimensions};

/// One created plate instance
#[derive(Debug, Clone, Copy)]
pub struct LayerInstance {
    pub index: usize,
    pub dimensions: Dimensions,
    pub position: Point3<f64>,
    pub deviation: Deviation,
    pub handle: MeshHandle,
}

/// Build every instance of `layer`, appending labels as instances are
/// created.
///
/// `overhang` is the per-iteration shared draw; it only applies to
/// anode-family types. Returns the created instances in index order.
#[allow(clippy::too_many_arguments)]
pub fn build_layer_stack(
    engine: &mut dyn GeometryEngine,
    sampler: &mut DeviationSampler,
    labels: &mut LabelRecord,
    registry: &LayerRegistry,
    layout: &StackLayout,
    layer: LayerType,
    overhang: Option<f64>,
    bending: bool,
) -> Result<Vec<LayerInstance>, GenerationError> {
    let spec = registry.spec(layer);
    let overhang = overhang.filter(|_| layer.is_anode_family());
    let mut instances = Vec::with_capacity(spec.amount);

    for i in 0..spec.amount {
        let deviation = sampler.sample(spec);

        let (x, y) = match layer.parent_electrode() {
            Some(parent) => labels.lateral_of(parent, i).ok_or_else(|| {
                GenerationError::Sequencing(format!(
                    "{} instance {} built before {} positions were recorded",
                    layer.name(),
                    i,
                    parent.name()
                ))
            })?,
            None => (deviation.x_position, deviation.y_position),
        };
        let z = layout.instance_z(layer, i);
        let position = Point3::new(x, y, z);

        let dimensions = resolve_dimensions(spec, &deviation, overhang);

        let handle = engine.create_box(
            Vector3::new(dimensions.length, dimensions.width, dimensions.height),
            position,
        )?;

        labels.append_instance(layer, position, &dimensions, &deviation);

        if bending {
            bend_instance(engine, labels, layer, i, handle, &dimensions, x)?;
        }

        engine.set_color(handle, spec.color)?;

        instances.push(LayerInstance {
            index: i,
            dimensions,
            position,
            deviation,
            handle,
        });
    }

    Ok(instances)
}

/// Fold both plate edges with the owning electrode's angle pair.
fn bend_instance(
    engine: &mut dyn GeometryEngine,
    labels: &LabelRecord,
    layer: LayerType,
    i: usize,
    handle: MeshHandle,
    dimensions: &Dimensions,
    center_x: f64,
) -> Result<(), GenerationError> {
    let owner = layer.parent_electrode().unwrap_or(layer);
    let missing = || {
        GenerationError::Sequencing(format!(
            "bend of {} instance {} requires the recorded {} entry",
            layer.name(),
            i,
            owner.name()
        ))
    };
    let angles = labels.bend_of(owner, i).ok_or_else(missing)?;
    let electrode_z = labels.z_of(owner, i).ok_or_else(missing)?;

    engine.subdivide(handle, BEND_SUBDIVISION_CUTS)?;
    for plan in BendPlan::edge_bends(dimensions, center_x, electrode_z, &angles) {
        engine.apply_bend(handle, plan.zone, plan.origin, plan.angle_rad)?;
    }
    engine.decimate(handle, BEND_DECIMATE_RATIO)?;
    Ok(())
}
