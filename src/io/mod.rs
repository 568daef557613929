// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! I/O module - mesh export

mod exporter;

pub use exporter::export_stl;
