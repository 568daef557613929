// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! Builders - turn specs and samples into scene objects and labels

mod housing;
mod stack;

pub use housing::{build_housing, cut_housing_zx, cut_housing_zy};
pub use stack::{build_layer_stack, LayerInstance};
