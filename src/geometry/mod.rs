// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! Geometry module - mesh representation and the engine seam
//!
//! Builders never touch meshes directly; they talk to a [`GeometryEngine`]
//! through handles, so the concrete kernel can be swapped for a test
//! double.

mod bbox;
pub(crate) mod csg;
mod mesh;
pub(crate) mod primitives;
mod scene;

pub use bbox::BoundingBox;
pub use mesh::{Mesh, Triangle, Vertex};
pub use scene::MeshScene;

use nalgebra::{Point3, Vector3};
use std::path::Path;

use crate::error::GeometryError;
use crate::model::Rgba;

/// Opaque reference to one scene object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub(crate) usize);

/// Capability surface of the mesh kernel.
///
/// The scene is stateful and non-reentrant: one mutable document,
/// strictly sequential calls.
pub trait GeometryEngine {
    /// Drop every object; called at the start of each export iteration
    fn clear(&mut self);

    /// Create a centered box at `position`
    fn create_box(
        &mut self,
        dimensions: Vector3<f64>,
        position: Point3<f64>,
    ) -> Result<MeshHandle, GeometryError>;

    /// Uniformly refine an object before deformation
    fn subdivide(&mut self, handle: MeshHandle, cuts: u32) -> Result<(), GeometryError>;

    /// Fold the fractional length-axis `zone` of an object about a
    /// Y-parallel axis through `origin`
    fn apply_bend(
        &mut self,
        handle: MeshHandle,
        zone: (f64, f64),
        origin: Point3<f64>,
        angle_rad: f64,
    ) -> Result<(), GeometryError>;

    /// Subtract `b` from `a`; `b` is consumed, the result replaces `a`
    fn boolean_subtract(
        &mut self,
        a: MeshHandle,
        b: MeshHandle,
    ) -> Result<MeshHandle, GeometryError>;

    /// Round the edges of a box-like object
    fn bevel(&mut self, handle: MeshHandle, radius: f64, segments: u32)
        -> Result<(), GeometryError>;

    /// Reduce triangle count to roughly `ratio` of the current count
    fn decimate(&mut self, handle: MeshHandle, ratio: f64) -> Result<(), GeometryError>;

    /// Assign a display color
    fn set_color(&mut self, handle: MeshHandle, color: Rgba) -> Result<(), GeometryError>;

    /// Write the given objects into one mesh file
    fn export_mesh(&mut self, handles: &[MeshHandle], path: &Path) -> Result<(), GeometryError>;
}
