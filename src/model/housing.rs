// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! Housing dimension derivation

use super::{LayerRegistry, LayerType};

/// Fixed lateral clearance between plate stack and housing wall
pub const LATERAL_CLEARANCE: f64 = 0.008;
/// Housing wall thickness
pub const WALL_THICKNESS: f64 = 0.001;
/// Edge rounding radius applied to both housing blocks
pub const BEVEL_RADIUS: f64 = 0.01;
/// Segment count of the edge rounding
pub const BEVEL_SEGMENTS: u32 = 4;

/// Derived housing geometry
#[derive(Debug, Clone, Copy)]
pub struct HousingSpec {
    pub outer_length: f64,
    pub outer_width: f64,
    pub outer_height: f64,
    pub wall_thickness: f64,
    pub bevel_radius: f64,
}

impl HousingSpec {
    /// Derive the housing from the plate registry.
    ///
    /// The outer height sums every plate type's stack contribution plus
    /// two separators per anode/cathode pairing plus the wall thickness;
    /// it must equal the height the stack solver distributes the plates
    /// over, otherwise plates protrude from the shell.
    pub fn derive(
        registry: &LayerRegistry,
        separator: f64,
        x_variation: f64,
        y_variation: f64,
    ) -> Self {
        let anode = registry.spec(LayerType::Anode);
        let max_overhang = anode.overhang.map(|range| range.max).unwrap_or(0.0);

        let stack_height: f64 = LayerType::STACK_ORDER
            .iter()
            .map(|&layer| {
                let spec = registry.spec(layer);
                spec.amount as f64 * spec.height
            })
            .sum();

        Self {
            outer_length: anode.length + max_overhang + x_variation * 2.0 + LATERAL_CLEARANCE,
            outer_width: anode.width + y_variation * 2.0 + LATERAL_CLEARANCE,
            outer_height: stack_height + 2.0 * anode.amount as f64 * separator + WALL_THICKNESS,
            wall_thickness: WALL_THICKNESS,
            bevel_radius: BEVEL_RADIUS,
        }
    }

    pub fn inner_length(&self) -> f64 {
        self.outer_length - self.wall_thickness
    }

    pub fn inner_width(&self) -> f64 {
        self.outer_width - self.wall_thickness
    }

    pub fn inner_height(&self) -> f64 {
        self.outer_height - self.wall_thickness
    }

    /// Center of the shell; the stack grows upward from z = 0
    pub fn center_z(&self) -> f64 {
        self.outer_height / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::model::StackLayout;
    use approx::assert_relative_eq;

    #[test]
    fn test_outer_dimensions() {
        let config = Configuration::default();
        let registry = LayerRegistry::from_config(&config).unwrap();
        let housing = HousingSpec::derive(&registry, config.separator, config.dev_x, config.dev_y);

        assert_relative_eq!(housing.outer_length, 0.1015 + 0.0068 + 0.002 + 0.008);
        assert_relative_eq!(housing.outer_width, 0.050 + 0.002 + 0.008);
        assert_relative_eq!(housing.inner_length(), housing.outer_length - 0.001);
    }

    #[test]
    fn test_stack_fits_inside_outer_height() {
        // The top of the last upper anode coating plus the trailing
        // separator and half a wall must land exactly on the derived
        // outer height.
        let config = Configuration::default();
        let registry = LayerRegistry::from_config(&config).unwrap();
        let layout = StackLayout::solve(&registry, config.separator, WALL_THICKNESS);
        let housing = HousingSpec::derive(&registry, config.separator, config.dev_x, config.dev_y);

        let top_layer = LayerType::UpperAnodeCoating;
        let spec = registry.spec(top_layer);
        let top = layout.instance_z(top_layer, spec.amount - 1) + spec.height / 2.0;

        assert_relative_eq!(
            top + config.separator + WALL_THICKNESS / 2.0,
            housing.outer_height,
            epsilon = 1e-12
        );
    }
}
