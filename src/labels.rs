// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! Ground-truth label recorder
//!
//! Accumulates one entry per created instance, in creation order. Array
//! index i refers to the same instance across the position, dimension,
//! deviation and bending arrays of a type; `verify` checks that every
//! array matches its type's configured amount before the document is
//! written.

use nalgebra::Point3;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::path::Path;

use crate::error::GenerationError;
use crate::model::{HousingSpec, LayerRegistry, LayerType};
use crate::sampling::{BendAngles, Deviation, Dimensions};

const CENTER_COMMENT: &str = "All dimensions and deviations refer to the center point of the \
                              object.\nThe characteristic values for each element (1 to n) can \
                              be found below.";

#[derive(Debug, Clone, Default, Serialize)]
struct AxisSeries {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
struct DimensionSeries {
    length: Vec<f64>,
    width: Vec<f64>,
    height: Vec<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
struct DeviationSeries {
    length: Vec<f64>,
    width: Vec<f64>,
    height: Vec<f64>,
    x_position: Vec<f64>,
    y_position: Vec<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
struct BendSeries {
    #[serde(rename = "x+")]
    x_pos: Vec<f64>,
    #[serde(rename = "x-")]
    x_neg: Vec<f64>,
}

#[derive(Debug, Clone, Default)]
struct LayerSeries {
    position: AxisSeries,
    dimensions: DimensionSeries,
    deviations: DeviationSeries,
    /// Electrodes only; coatings inherit their parent's angles
    bending: Option<BendSeries>,
}

#[derive(Debug, Clone, Default, Serialize)]
struct HousingDimensionSeries {
    outer_length: Vec<f64>,
    outer_width: Vec<f64>,
    outer_height: Vec<f64>,
    inner_length: Vec<f64>,
    inner_width: Vec<f64>,
    inner_height: Vec<f64>,
}

/// Per-iteration label accumulator
#[derive(Debug, Clone, Default)]
pub struct LabelRecord {
    anode: LayerSeries,
    cathode: LayerSeries,
    lower_anode_coating: LayerSeries,
    upper_anode_coating: LayerSeries,
    lower_cathode_coating: LayerSeries,
    upper_cathode_coating: LayerSeries,
    housing_position: AxisSeries,
    housing_dimensions: HousingDimensionSeries,
}

impl LabelRecord {
    pub fn new() -> Self {
        Self::default()
    }

    fn series(&self, layer: LayerType) -> &LayerSeries {
        match layer {
            LayerType::Anode => &self.anode,
            LayerType::Cathode => &self.cathode,
            LayerType::LowerAnodeCoating => &self.lower_anode_coating,
            LayerType::UpperAnodeCoating => &self.upper_anode_coating,
            LayerType::LowerCathodeCoating => &self.lower_cathode_coating,
            LayerType::UpperCathodeCoating => &self.upper_cathode_coating,
            LayerType::Housing => panic!("housing labels use the housing accessors"),
        }
    }

    fn series_mut(&mut self, layer: LayerType) -> &mut LayerSeries {
        match layer {
            LayerType::Anode => &mut self.anode,
            LayerType::Cathode => &mut self.cathode,
            LayerType::LowerAnodeCoating => &mut self.lower_anode_coating,
            LayerType::UpperAnodeCoating => &mut self.upper_anode_coating,
            LayerType::LowerCathodeCoating => &mut self.lower_cathode_coating,
            LayerType::UpperCathodeCoating => &mut self.upper_cathode_coating,
            LayerType::Housing => panic!("housing labels use the housing accessors"),
        }
    }

    /// Record one created plate instance
    pub fn append_instance(
        &mut self,
        layer: LayerType,
        position: Point3<f64>,
        dimensions: &Dimensions,
        deviation: &Deviation,
    ) {
        let record_bend = layer.is_electrode();
        let series = self.series_mut(layer);

        series.position.x.push(position.x);
        series.position.y.push(position.y);
        series.position.z.push(position.z);

        series.dimensions.length.push(dimensions.length);
        series.dimensions.width.push(dimensions.width);
        series.dimensions.height.push(dimensions.height);

        series.deviations.length.push(deviation.length);
        series.deviations.width.push(deviation.width);
        series.deviations.height.push(deviation.height);
        series.deviations.x_position.push(deviation.x_position);
        series.deviations.y_position.push(deviation.y_position);

        if record_bend {
            let bending = series.bending.get_or_insert_with(BendSeries::default);
            bending.x_pos.push(deviation.bend.x_pos);
            bending.x_neg.push(deviation.bend.x_neg);
        }
    }

    /// Record the housing entry
    pub fn append_housing(&mut self, spec: &HousingSpec, position: Point3<f64>) {
        self.housing_position.x.push(position.x);
        self.housing_position.y.push(position.y);
        self.housing_position.z.push(position.z);

        self.housing_dimensions.outer_length.push(spec.outer_length);
        self.housing_dimensions.outer_width.push(spec.outer_width);
        self.housing_dimensions.outer_height.push(spec.outer_height);
        self.housing_dimensions
            .inner_length
            .push(spec.inner_length());
        self.housing_dimensions.inner_width.push(spec.inner_width());
        self.housing_dimensions
            .inner_height
            .push(spec.inner_height());
    }

    /// Recorded instance count of a layer type
    pub fn count(&self, layer: LayerType) -> usize {
        if layer == LayerType::Housing {
            return self.housing_position.z.len();
        }
        self.series(layer).position.x.len()
    }

    /// Lateral position of a recorded instance
    pub fn lateral_of(&self, layer: LayerType, i: usize) -> Option<(f64, f64)> {
        let position = &self.series(layer).position;
        Some((*position.x.get(i)?, *position.y.get(i)?))
    }

    /// Center height of a recorded instance
    pub fn z_of(&self, layer: LayerType, i: usize) -> Option<f64> {
        self.series(layer).position.z.get(i).copied()
    }

    /// Bend pair of a recorded electrode instance
    pub fn bend_of(&self, layer: LayerType, i: usize) -> Option<BendAngles> {
        let bending = self.series(layer).bending.as_ref()?;
        Some(BendAngles {
            x_pos: *bending.x_pos.get(i)?,
            x_neg: *bending.x_neg.get(i)?,
        })
    }

    /// Recorded housing center, if any
    pub fn housing_center(&self) -> Option<Point3<f64>> {
        Some(Point3::new(
            *self.housing_position.x.first()?,
            *self.housing_position.y.first()?,
            *self.housing_position.z.first()?,
        ))
    }

    /// Check every array length against the registry amounts.
    pub fn verify(&self, registry: &LayerRegistry) -> Result<(), GenerationError> {
        for layer in LayerType::STACK_ORDER {
            let amount = registry.spec(layer).amount;
            let series = self.series(layer);

            let lengths = [
                series.position.x.len(),
                series.position.y.len(),
                series.position.z.len(),
                series.dimensions.length.len(),
                series.dimensions.width.len(),
                series.dimensions.height.len(),
                series.deviations.length.len(),
                series.deviations.x_position.len(),
                series.deviations.y_position.len(),
            ];
            if lengths.iter().any(|&len| len != amount) {
                return Err(GenerationError::LabelConsistency(format!(
                    "{} arrays {:?} do not all match amount {}",
                    layer.name(),
                    lengths,
                    amount
                )));
            }

            if layer.is_electrode() {
                let bend_len = series.bending.as_ref().map_or(0, |b| b.x_pos.len());
                if bend_len != amount {
                    return Err(GenerationError::LabelConsistency(format!(
                        "{} bending arrays hold {} entries, expected {}",
                        layer.name(),
                        bend_len,
                        amount
                    )));
                }
            }
        }

        if self.housing_position.z.len() != 1 {
            return Err(GenerationError::LabelConsistency(format!(
                "expected exactly one housing entry, got {}",
                self.housing_position.z.len()
            )));
        }
        Ok(())
    }

    /// Serialize to the label document layout
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();

        for layer in LayerType::STACK_ORDER {
            let name = layer.name();
            let series = self.series(layer);

            let mut entry = Map::new();
            entry.insert(format!("{name}_position"), json!(series.position));
            entry.insert(format!("{name}_dimensions"), json!(series.dimensions));
            entry.insert(format!("{name}_deviations"), json!(series.deviations));
            if let Some(ref bending) = series.bending {
                entry.insert(format!("{name}_bending"), json!(bending));
            }
            root.insert(name.to_string(), Value::Object(entry));
        }

        let mut housing = Map::new();
        housing.insert("housing_position".into(), json!(self.housing_position));
        housing.insert("housing_dimensions".into(), json!(self.housing_dimensions));
        root.insert("housing".into(), Value::Object(housing));

        root.insert("Comment:".into(), Value::String(CENTER_COMMENT.into()));
        Value::Object(root)
    }

    /// Write the label document
    pub fn write(&self, path: &Path) -> Result<(), GenerationError> {
        let content = serde_json::to_string_pretty(&self.to_json())
            .expect("label document serialization is infallible");
        std::fs::write(path, content)?;
        Ok(())
    }
}
