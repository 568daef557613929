// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! Stack position solver
//!
//! Derives each layer type's first z-position and the shared z-pitch from
//! the physical stacking order: lower anode coating, anode, upper anode
//! coating, separator, lower cathode coating, cathode, upper cathode
//! coating, separator, repeat. Term order in the sums below matches the
//! stacking order; reordering them breaks physical non-overlap.

use super::{LayerRegistry, LayerType};

/// First-instance center height and pitch for one layer type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackPosition {
    pub z_position: f64,
    pub z_distance: f64,
}

/// Solved z placement for all six plate types of one parameter set
#[derive(Debug, Clone)]
pub struct StackLayout {
    anode: StackPosition,
    cathode: StackPosition,
    lower_anode_coating: StackPosition,
    upper_anode_coating: StackPosition,
    lower_cathode_coating: StackPosition,
    upper_cathode_coating: StackPosition,
}

impl StackLayout {
    /// Solve the closed-form placement once per parameter set.
    pub fn solve(registry: &LayerRegistry, separator: f64, wall_thickness: f64) -> Self {
        let anode = registry.spec(LayerType::Anode);
        let cathode = registry.spec(LayerType::Cathode);
        let lower_anode = registry.spec(LayerType::LowerAnodeCoating);
        let upper_anode = registry.spec(LayerType::UpperAnodeCoating);
        let lower_cathode = registry.spec(LayerType::LowerCathodeCoating);
        let upper_cathode = registry.spec(LayerType::UpperCathodeCoating);

        // The full anode/cathode/coating/separator pattern repeats with
        // one period for every type.
        let z_distance = anode.height
            + cathode.height
            + 2.0 * separator
            + upper_anode.height
            + lower_anode.height
            + upper_cathode.height
            + lower_cathode.height;

        let anode_z = anode.height / 2.0 + lower_anode.height + separator + wall_thickness / 2.0;
        let cathode_z = anode_z
            + (anode.height + cathode.height) / 2.0
            + upper_anode.height
            + lower_cathode.height
            + separator;

        let at = |z_position: f64| StackPosition {
            z_position,
            z_distance,
        };

        Self {
            anode: at(anode_z),
            lower_anode_coating: at(anode_z - (anode.height + lower_anode.height) / 2.0),
            upper_anode_coating: at(anode_z + (anode.height + upper_anode.height) / 2.0),
            cathode: at(cathode_z),
            lower_cathode_coating: at(cathode_z - (cathode.height + lower_cathode.height) / 2.0),
            // Mirrors the reference placement, which offsets the upper
            // cathode coating by the lower coating height.
            upper_cathode_coating: at(cathode_z + (cathode.height + lower_cathode.height) / 2.0),
        }
    }

    pub fn position(&self, layer: LayerType) -> StackPosition {
        match layer {
            LayerType::Anode => self.anode,
            LayerType::Cathode => self.cathode,
            LayerType::LowerAnodeCoating => self.lower_anode_coating,
            LayerType::UpperAnodeCoating => self.upper_anode_coating,
            LayerType::LowerCathodeCoating => self.lower_cathode_coating,
            LayerType::UpperCathodeCoating => self.upper_cathode_coating,
            LayerType::Housing => panic!("housing is not part of the plate stack"),
        }
    }

    /// Shared stack pitch
    pub fn z_distance(&self) -> f64 {
        self.anode.z_distance
    }

    /// Absolute center height of instance `i` of a layer type
    pub fn instance_z(&self, layer: LayerType, i: usize) -> f64 {
        let position = self.position(layer);
        position.z_position + i as f64 * position.z_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use approx::assert_relative_eq;

    fn default_layout() -> (LayerRegistry, StackLayout) {
        let config = Configuration::default();
        let registry = LayerRegistry::from_config(&config).unwrap();
        let layout = StackLayout::solve(&registry, config.separator, 0.001);
        (registry, layout)
    }

    #[test]
    fn test_shared_z_distance() {
        let (_, layout) = default_layout();
        let expected = layout.z_distance();

        for layer in LayerType::STACK_ORDER {
            assert_relative_eq!(layout.position(layer).z_distance, expected);
        }
        // 6 plate heights of 0.001 plus two separators of 0.001
        assert_relative_eq!(expected, 0.008);
    }

    #[test]
    fn test_instance_spacing_is_constant() {
        let (registry, layout) = default_layout();

        for layer in LayerType::STACK_ORDER {
            let amount = registry.spec(layer).amount;
            for i in 0..amount - 1 {
                let step = layout.instance_z(layer, i + 1) - layout.instance_z(layer, i);
                assert_relative_eq!(step, layout.z_distance(), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_coatings_bracket_their_electrode() {
        let (_, layout) = default_layout();

        let anode = layout.position(LayerType::Anode).z_position;
        assert!(layout.position(LayerType::LowerAnodeCoating).z_position < anode);
        assert!(layout.position(LayerType::UpperAnodeCoating).z_position > anode);

        let cathode = layout.position(LayerType::Cathode).z_position;
        assert!(layout.position(LayerType::LowerCathodeCoating).z_position < cathode);
        assert!(layout.position(LayerType::UpperCathodeCoating).z_position > cathode);
        assert!(cathode > anode);
    }
}
