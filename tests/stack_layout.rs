// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! Stack placement verification against hand-computed scenarios

use anyhow::Result;
use approx::assert_relative_eq;
use cellforge::model::{
    HousingSpec, LayerRegistry, LayerSpec, LayerType, OverhangRange, StackLayout, WALL_THICKNESS,
};
use cellforge::Configuration;

/// Registry matching the reference scenario: 10 anodes, 1 mm plates,
/// 50 mm thick lower anode coating.
fn scenario_registry() -> Result<LayerRegistry> {
    let overhang = OverhangRange {
        min: 0.0023,
        max: 0.0068,
    };
    let plate = |height: f64, amount: usize, overhang: Option<OverhangRange>| LayerSpec {
        length: 0.1015,
        width: 0.050,
        height,
        length_tol: 0.0,
        width_tol: 0.0,
        height_tol: 0.0,
        overhang,
        amount,
        color: [1.0, 1.0, 1.0, 1.0],
    };

    Ok(LayerRegistry::from_specs(
        plate(0.001, 10, Some(overhang)),
        plate(0.001, 9, None),
        plate(0.05, 10, Some(overhang)),
        plate(0.05, 10, Some(overhang)),
        plate(0.001, 9, None),
        plate(0.001, 9, None),
    )?)
}

#[test]
fn test_anode_first_position_scenario() -> Result<()> {
    // anode.z = h/2 + lower_coating + separator + wall/2
    //         = 0.0005 + 0.05 + 0.001 + 0.0005 = 0.052
    let registry = scenario_registry()?;
    let layout = StackLayout::solve(&registry, 0.001, 0.001);

    let anode = layout.position(LayerType::Anode);
    println!("anode z_position = {}", anode.z_position);
    assert_relative_eq!(anode.z_position, 0.052, epsilon = 1e-12);
    Ok(())
}

#[test]
fn test_z_distance_covers_full_period() -> Result<()> {
    let registry = scenario_registry()?;
    let layout = StackLayout::solve(&registry, 0.001, 0.001);

    // anode + cathode + 2 separators + all four coating heights
    let expected = 0.001 + 0.001 + 0.002 + 0.05 + 0.05 + 0.001 + 0.001;
    assert_relative_eq!(layout.z_distance(), expected, epsilon = 1e-12);

    for layer in LayerType::STACK_ORDER {
        assert_relative_eq!(
            layout.position(layer).z_distance,
            expected,
            epsilon = 1e-12
        );
    }
    Ok(())
}

#[test]
fn test_z_strictly_increasing_per_type() -> Result<()> {
    let registry = scenario_registry()?;
    let layout = StackLayout::solve(&registry, 0.001, 0.001);

    for layer in LayerType::STACK_ORDER {
        let amount = 9;
        for i in 0..amount - 1 {
            let step = layout.instance_z(layer, i + 1) - layout.instance_z(layer, i);
            assert!(step > 0.0);
            assert_relative_eq!(step, layout.z_distance(), epsilon = 1e-12);
        }
    }
    Ok(())
}

#[test]
fn test_housing_height_closes_over_stack() -> Result<()> {
    // Holds for non-uniform coating heights as well: the top of the last
    // upper anode coating plus the trailing separator plus half a wall
    // equals the housing outer height.
    let registry = scenario_registry()?;
    let separator = 0.001;
    let layout = StackLayout::solve(&registry, separator, WALL_THICKNESS);
    let housing = HousingSpec::derive(&registry, separator, 1e-3, 1e-3);

    let top_layer = LayerType::UpperAnodeCoating;
    let spec_height = 0.05;
    let top = layout.instance_z(top_layer, 9) + spec_height / 2.0;

    println!(
        "stack top = {}, housing outer height = {}",
        top, housing.outer_height
    );
    assert_relative_eq!(
        top + separator + WALL_THICKNESS / 2.0,
        housing.outer_height,
        epsilon = 1e-12
    );
    Ok(())
}

#[test]
fn test_default_config_layout_is_physical() -> Result<()> {
    let config = Configuration::default();
    let registry = LayerRegistry::from_config(&config)?;
    let layout = StackLayout::solve(&registry, config.separator, WALL_THICKNESS);
    let housing = HousingSpec::derive(&registry, config.separator, config.dev_x, config.dev_y);

    // Every plate center of every instance stays inside the housing
    for layer in LayerType::STACK_ORDER {
        let spec = registry.spec(layer);
        for i in 0..spec.amount {
            let z = layout.instance_z(layer, i);
            assert!(z > 0.0, "{} {} below housing floor", layer.name(), i);
            assert!(
                z + spec.height / 2.0 < housing.outer_height,
                "{} {} protrudes the shell",
                layer.name(),
                i
            );
        }
    }
    Ok(())
}
