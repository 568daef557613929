// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! Layer types and per-type geometry specs

use serde::{Deserialize, Serialize};

use crate::config::Configuration;
use crate::error::GenerationError;

/// Display color as RGBA
pub type Rgba = [f32; 4];

const RED: Rgba = [1.0, 0.0, 0.0, 1.0];
const GREEN: Rgba = [0.0, 1.0, 0.0, 1.0];
const BLUE: Rgba = [0.0, 0.0, 1.0, 1.0];
const BLACK: Rgba = [0.0, 0.0, 0.0, 1.0];

/// All object types of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerType {
    Anode,
    Cathode,
    LowerAnodeCoating,
    UpperAnodeCoating,
    LowerCathodeCoating,
    UpperCathodeCoating,
    Housing,
}

impl LayerType {
    /// Build order for one iteration: electrodes strictly before their
    /// coatings, anode group before cathode group.
    pub const STACK_ORDER: [LayerType; 6] = [
        LayerType::Anode,
        LayerType::LowerAnodeCoating,
        LayerType::UpperAnodeCoating,
        LayerType::Cathode,
        LayerType::LowerCathodeCoating,
        LayerType::UpperCathodeCoating,
    ];

    /// Snake-case label used in filenames and the label document
    pub fn name(&self) -> &'static str {
        match self {
            LayerType::Anode => "anode",
            LayerType::Cathode => "cathode",
            LayerType::LowerAnodeCoating => "lower_anode_coating",
            LayerType::UpperAnodeCoating => "upper_anode_coating",
            LayerType::LowerCathodeCoating => "lower_cathode_coating",
            LayerType::UpperCathodeCoating => "upper_cathode_coating",
            LayerType::Housing => "housing",
        }
    }

    /// Anode family shares the per-iteration overhang draw
    pub fn is_anode_family(&self) -> bool {
        matches!(
            self,
            LayerType::Anode | LayerType::LowerAnodeCoating | LayerType::UpperAnodeCoating
        )
    }

    pub fn is_electrode(&self) -> bool {
        matches!(self, LayerType::Anode | LayerType::Cathode)
    }

    /// Parent electrode for coating types; `None` for electrodes and housing
    pub fn parent_electrode(&self) -> Option<LayerType> {
        match self {
            LayerType::LowerAnodeCoating | LayerType::UpperAnodeCoating => Some(LayerType::Anode),
            LayerType::LowerCathodeCoating | LayerType::UpperCathodeCoating => {
                Some(LayerType::Cathode)
            }
            _ => None,
        }
    }
}

/// Overhang bounds for anode-family plates
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OverhangRange {
    pub min: f64,
    pub max: f64,
}

/// Nominal geometry and tolerances of one layer type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSpec {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    /// Std-dev of the normal length deviation; 0 disables the draw
    pub length_tol: f64,
    pub width_tol: f64,
    pub height_tol: f64,
    /// Present for the anode family only
    pub overhang: Option<OverhangRange>,
    pub amount: usize,
    pub color: Rgba,
}

/// Read-only registry of all six plate specs, derived once per run
#[derive(Debug, Clone)]
pub struct LayerRegistry {
    anode: LayerSpec,
    cathode: LayerSpec,
    lower_anode_coating: LayerSpec,
    upper_anode_coating: LayerSpec,
    lower_cathode_coating: LayerSpec,
    upper_cathode_coating: LayerSpec,
}

impl LayerRegistry {
    /// Derive all specs from the configuration document.
    ///
    /// The reference parameter set uses one nominal plate size for every
    /// type and couples the counts: coatings match their electrode,
    /// cathode-family counts are one below the anode count.
    pub fn from_config(config: &Configuration) -> Result<Self, GenerationError> {
        config.validate()?;

        let overhang = OverhangRange {
            min: config.min_overhang,
            max: config.max_overhang,
        };

        let plate = |amount: usize, overhang: Option<OverhangRange>, color: Rgba| LayerSpec {
            length: config.size_x,
            width: config.size_y,
            height: config.size_z,
            length_tol: 0.0,
            width_tol: 0.0,
            height_tol: 0.0,
            overhang,
            amount,
            color,
        };

        let anodes = config.num_anodes;
        Self::from_specs(
            plate(anodes, Some(overhang), RED),
            plate(anodes - 1, None, GREEN),
            plate(anodes, Some(overhang), BLACK),
            plate(anodes, Some(overhang), BLACK),
            plate(anodes - 1, None, BLUE),
            plate(anodes - 1, None, BLUE),
        )
    }

    /// Build a registry from explicit specs, checking the count coupling
    /// the stack formulas rely on.
    pub fn from_specs(
        anode: LayerSpec,
        cathode: LayerSpec,
        lower_anode_coating: LayerSpec,
        upper_anode_coating: LayerSpec,
        lower_cathode_coating: LayerSpec,
        upper_cathode_coating: LayerSpec,
    ) -> Result<Self, GenerationError> {
        if anode.amount < 2 {
            return Err(GenerationError::Configuration(format!(
                "anode amount must be at least 2, got {}",
                anode.amount
            )));
        }
        if cathode.amount != anode.amount - 1 {
            return Err(GenerationError::Configuration(format!(
                "cathode amount {} must be one below anode amount {}",
                cathode.amount, anode.amount
            )));
        }
        for (name, amount, expected) in [
            (
                "lower_anode_coating",
                lower_anode_coating.amount,
                anode.amount,
            ),
            (
                "upper_anode_coating",
                upper_anode_coating.amount,
                anode.amount,
            ),
            (
                "lower_cathode_coating",
                lower_cathode_coating.amount,
                cathode.amount,
            ),
            (
                "upper_cathode_coating",
                upper_cathode_coating.amount,
                cathode.amount,
            ),
        ] {
            if amount != expected {
                return Err(GenerationError::Configuration(format!(
                    "{name} amount {amount} must match its electrode amount {expected}"
                )));
            }
        }

        Ok(Self {
            anode,
            cathode,
            lower_anode_coating,
            upper_anode_coating,
            lower_cathode_coating,
            upper_cathode_coating,
        })
    }

    pub fn spec(&self, layer: LayerType) -> &LayerSpec {
        match layer {
            LayerType::Anode => &self.anode,
            LayerType::Cathode => &self.cathode,
            LayerType::LowerAnodeCoating => &self.lower_anode_coating,
            LayerType::UpperAnodeCoating => &self.upper_anode_coating,
            LayerType::LowerCathodeCoating => &self.lower_cathode_coating,
            LayerType::UpperCathodeCoating => &self.upper_cathode_coating,
            LayerType::Housing => panic!("housing has no layer spec"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_coupling() {
        let registry = LayerRegistry::from_config(&Configuration::default()).unwrap();

        let anodes = registry.spec(LayerType::Anode).amount;
        assert_eq!(anodes, 10);
        assert_eq!(registry.spec(LayerType::Cathode).amount, anodes - 1);
        assert_eq!(registry.spec(LayerType::LowerAnodeCoating).amount, anodes);
        assert_eq!(registry.spec(LayerType::UpperAnodeCoating).amount, anodes);
        assert_eq!(
            registry.spec(LayerType::LowerCathodeCoating).amount,
            anodes - 1
        );
        assert_eq!(
            registry.spec(LayerType::UpperCathodeCoating).amount,
            anodes - 1
        );
    }

    #[test]
    fn test_from_specs_rejects_decoupled_counts() {
        let registry = LayerRegistry::from_config(&Configuration::default()).unwrap();
        let mut cathode = registry.spec(LayerType::Cathode).clone();
        cathode.amount = 10;

        let result = LayerRegistry::from_specs(
            registry.spec(LayerType::Anode).clone(),
            cathode,
            registry.spec(LayerType::LowerAnodeCoating).clone(),
            registry.spec(LayerType::UpperAnodeCoating).clone(),
            registry.spec(LayerType::LowerCathodeCoating).clone(),
            registry.spec(LayerType::UpperCathodeCoating).clone(),
        );
        assert!(matches!(result, Err(GenerationError::Configuration(_))));
    }

    #[test]
    fn test_overhang_restricted_to_anode_family() {
        let registry = LayerRegistry::from_config(&Configuration::default()).unwrap();

        for layer in LayerType::STACK_ORDER {
            let has_overhang = registry.spec(layer).overhang.is_some();
            assert_eq!(has_overhang, layer.is_anode_family(), "{}", layer.name());
        }
    }

    #[test]
    fn test_parent_electrode() {
        assert_eq!(
            LayerType::UpperAnodeCoating.parent_electrode(),
            Some(LayerType::Anode)
        );
        assert_eq!(
            LayerType::LowerCathodeCoating.parent_electrode(),
            Some(LayerType::Cathode)
        );
        assert_eq!(LayerType::Anode.parent_electrode(), None);
        assert_eq!(LayerType::Housing.parent_electrode(), None);
    }

    #[test]
    fn test_electrodes_precede_coatings_in_stack_order() {
        let index_of = |layer: LayerType| {
            LayerType::STACK_ORDER
                .iter()
                .position(|&l| l == layer)
                .unwrap()
        };

        for layer in LayerType::STACK_ORDER {
            if let Some(parent) = layer.parent_electrode() {
                assert!(index_of(parent) < index_of(layer), "{}", layer.name());
            }
        }
    }
}
