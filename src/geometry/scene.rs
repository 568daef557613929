// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! Concrete mesh scene backing the engine trait

use nalgebra::{Point3, Vector3};
use std::collections::HashMap;
use std::path::Path;

use super::{csg, primitives, GeometryEngine, Mesh, MeshHandle};
use crate::error::GeometryError;
use crate::io::export_stl;
use crate::model::Rgba;

struct SceneObject {
    mesh: Mesh,
    color: Rgba,
}

/// Stateful scene document; one per session, cleared between iterations
#[derive(Default)]
pub struct MeshScene {
    objects: Vec<Option<SceneObject>>,
}

impl MeshScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_count(&self) -> usize {
        self.objects.iter().flatten().count()
    }

    pub fn mesh(&self, handle: MeshHandle) -> Result<&Mesh, GeometryError> {
        self.object(handle).map(|object| &object.mesh)
    }

    pub fn color(&self, handle: MeshHandle) -> Result<Rgba, GeometryError> {
        self.object(handle).map(|object| object.color)
    }

    fn object(&self, handle: MeshHandle) -> Result<&SceneObject, GeometryError> {
        self.objects
            .get(handle.0)
            .and_then(Option::as_ref)
            .ok_or(GeometryError::UnknownHandle(handle.0))
    }

    fn object_mut(&mut self, handle: MeshHandle) -> Result<&mut SceneObject, GeometryError> {
        self.objects
            .get_mut(handle.0)
            .and_then(Option::as_mut)
            .ok_or(GeometryError::UnknownHandle(handle.0))
    }

    fn insert(&mut self, mesh: Mesh) -> MeshHandle {
        let handle = MeshHandle(self.objects.len());
        self.objects.push(Some(SceneObject {
            mesh,
            color: [1.0, 1.0, 1.0, 1.0],
        }));
        handle
    }

    fn take(&mut self, handle: MeshHandle) -> Result<SceneObject, GeometryError> {
        self.objects
            .get_mut(handle.0)
            .and_then(Option::take)
            .ok_or(GeometryError::UnknownHandle(handle.0))
    }
}

impl GeometryEngine for MeshScene {
    fn clear(&mut self) {
        self.objects.clear();
    }

    fn create_box(
        &mut self,
        dimensions: Vector3<f64>,
        position: Point3<f64>,
    ) -> Result<MeshHandle, GeometryError> {
        if dimensions.min() <= 0.0 {
            return Err(GeometryError::Degenerate(format!(
                "box dimensions must be positive, got {:?}",
                dimensions
            )));
        }
        let mut mesh = primitives::box_mesh(dimensions);
        mesh.translate(position.coords);
        Ok(self.insert(mesh))
    }

    fn subdivide(&mut self, handle: MeshHandle, cuts: u32) -> Result<(), GeometryError> {
        let object = self.object_mut(handle)?;
        object.mesh = primitives::subdivide(&object.mesh, cuts);
        Ok(())
    }

    fn apply_bend(
        &mut self,
        handle: MeshHandle,
        zone: (f64, f64),
        origin: Point3<f64>,
        angle_rad: f64,
    ) -> Result<(), GeometryError> {
        if zone.0 > zone.1 {
            return Err(GeometryError::Unsupported(format!(
                "inverted bend zone {:?}",
                zone
            )));
        }
        let object = self.object_mut(handle)?;
        let bbox = object.mesh.bounding_box();

        let (sin, cos) = angle_rad.sin_cos();
        for vertex in &mut object.mesh.vertices {
            let relative_x = bbox.relative_x(vertex.position.x);
            if relative_x < zone.0 || relative_x > zone.1 {
                continue;
            }
            // Rotate about the Y-parallel axis through origin
            let dx = vertex.position.x - origin.x;
            let dz = vertex.position.z - origin.z;
            vertex.position.x = origin.x + dx * cos + dz * sin;
            vertex.position.z = origin.z - dx * sin + dz * cos;
        }
        object.mesh.recompute_normals();
        Ok(())
    }

    fn boolean_subtract(
        &mut self,
        a: MeshHandle,
        b: MeshHandle,
    ) -> Result<MeshHandle, GeometryError> {
        let subtrahend = self.take(b)?;
        let object = self.object_mut(a)?;

        let mut result = csg::difference(&object.mesh, &subtrahend.mesh);
        if result.triangle_count() == 0 {
            return Err(GeometryError::Degenerate(
                "boolean subtraction produced an empty mesh".into(),
            ));
        }
        result.compact();
        object.mesh = result;
        Ok(a)
    }

    fn bevel(
        &mut self,
        handle: MeshHandle,
        radius: f64,
        segments: u32,
    ) -> Result<(), GeometryError> {
        if radius < 0.0 {
            return Err(GeometryError::Unsupported(format!(
                "negative bevel radius {radius}"
            )));
        }
        let object = self.object_mut(handle)?;
        object.mesh = primitives::round_edges(&object.mesh, radius, segments);
        Ok(())
    }

    fn decimate(&mut self, handle: MeshHandle, ratio: f64) -> Result<(), GeometryError> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(GeometryError::Unsupported(format!(
                "decimate ratio {ratio} outside [0, 1]"
            )));
        }
        let object = self.object_mut(handle)?;
        if ratio >= 1.0 || object.mesh.vertex_count() < 16 {
            return Ok(());
        }
        object.mesh = cluster_decimate(&object.mesh, ratio);
        Ok(())
    }

    fn set_color(&mut self, handle: MeshHandle, color: Rgba) -> Result<(), GeometryError> {
        self.object_mut(handle)?.color = color;
        Ok(())
    }

    fn export_mesh(&mut self, handles: &[MeshHandle], path: &Path) -> Result<(), GeometryError> {
        let mut combined = Mesh::new();
        for &handle in handles {
            combined.merge(self.mesh(handle)?);
        }
        export_stl(&combined, path)?;
        Ok(())
    }
}

/// Vertex-clustering decimation on a uniform grid.
///
/// Cell size is chosen so the clustered vertex count lands near
/// `ratio * vertex_count` for a surface mesh. Vertices only merge within
/// the same dominant-normal bucket, so opposite faces of thin plates and
/// walls never collapse onto each other.
fn cluster_decimate(mesh: &Mesh, ratio: f64) -> Mesh {
    let bbox = mesh.bounding_box();

    let area: f64 = mesh
        .triangles
        .iter()
        .map(|t| {
            let v0 = mesh.vertices[t.indices[0]].position;
            let v1 = mesh.vertices[t.indices[1]].position;
            let v2 = mesh.vertices[t.indices[2]].position;
            (v1 - v0).cross(&(v2 - v0)).norm() / 2.0
        })
        .sum();

    let target_vertices = (mesh.vertex_count() as f64 * ratio).max(8.0);
    let cell = (area / target_vertices).sqrt().max(1e-12);

    let normal_bucket = |n: &nalgebra::Vector3<f64>| -> i8 {
        let (ax, ay, az) = (n.x.abs(), n.y.abs(), n.z.abs());
        if ax >= ay && ax >= az {
            if n.x >= 0.0 {
                0
            } else {
                1
            }
        } else if ay >= az {
            if n.y >= 0.0 {
                2
            } else {
                3
            }
        } else if n.z >= 0.0 {
            4
        } else {
            5
        }
    };

    let cell_index = |p: &Point3<f64>| -> (i64, i64, i64) {
        (
            ((p.x - bbox.min.x) / cell).floor() as i64,
            ((p.y - bbox.min.y) / cell).floor() as i64,
            ((p.z - bbox.min.z) / cell).floor() as i64,
        )
    };

    let mut clusters: HashMap<(i64, i64, i64, i8), usize> = HashMap::new();
    let mut remap = vec![0usize; mesh.vertex_count()];
    let mut result = Mesh::new();

    for (i, vertex) in mesh.vertices.iter().enumerate() {
        let (cx, cy, cz) = cell_index(&vertex.position);
        let key = (cx, cy, cz, normal_bucket(&vertex.normal));
        let index = *clusters
            .entry(key)
            .or_insert_with(|| result.add_vertex(*vertex));
        remap[i] = index;
    }

    for triangle in &mesh.triangles {
        result.add_triangle(super::Triangle::new([
            remap[triangle.indices[0]],
            remap[triangle.indices[1]],
            remap[triangle.indices[2]],
        ]));
    }

    result.compact();
    result.recompute_normals();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn boxed(scene: &mut MeshScene, size: [f64; 3], at: [f64; 3]) -> MeshHandle {
        scene
            .create_box(
                Vector3::new(size[0], size[1], size[2]),
                Point3::new(at[0], at[1], at[2]),
            )
            .unwrap()
    }

    #[test]
    fn test_create_box_places_center() {
        let mut scene = MeshScene::new();
        let handle = boxed(&mut scene, [0.1, 0.05, 0.001], [0.01, -0.02, 0.052]);

        let bbox = scene.mesh(handle).unwrap().bounding_box();
        assert_relative_eq!(bbox.center().x, 0.01, epsilon = 1e-12);
        assert_relative_eq!(bbox.center().y, -0.02, epsilon = 1e-12);
        assert_relative_eq!(bbox.center().z, 0.052, epsilon = 1e-12);
    }

    #[test]
    fn test_create_box_rejects_zero_dimension() {
        let mut scene = MeshScene::new();
        let result = scene.create_box(Vector3::new(0.0, 1.0, 1.0), Point3::origin());
        assert!(matches!(result, Err(GeometryError::Degenerate(_))));
    }

    #[test]
    fn test_clear_invalidates_handles() {
        let mut scene = MeshScene::new();
        let handle = boxed(&mut scene, [1.0, 1.0, 1.0], [0.0, 0.0, 0.0]);

        scene.clear();
        assert!(matches!(
            scene.mesh(handle),
            Err(GeometryError::UnknownHandle(_))
        ));
        assert_eq!(scene.object_count(), 0);
    }

    #[test]
    fn test_bend_moves_only_zone_vertices() {
        let mut scene = MeshScene::new();
        let handle = boxed(&mut scene, [0.1, 0.05, 0.001], [0.0, 0.0, 0.0]);
        scene.subdivide(handle, 50).unwrap();

        let before = scene.mesh(handle).unwrap().clone();
        scene
            .apply_bend(
                handle,
                (0.97, 1.0),
                Point3::new(0.047, 0.0, 0.0),
                0.5_f64,
            )
            .unwrap();
        let after = scene.mesh(handle).unwrap();

        let mut moved = 0;
        let mut stayed = 0;
        for (a, b) in before.vertices.iter().zip(after.vertices.iter()) {
            if (a.position - b.position).norm() > 1e-12 {
                moved += 1;
                assert!(a.position.x > 0.046, "vertex outside zone moved");
            } else {
                stayed += 1;
            }
        }
        assert!(moved > 0, "no vertex bent");
        assert!(stayed > moved, "bend zone covered most of the plate");
    }

    #[test]
    fn test_subtract_consumes_subtrahend() {
        let mut scene = MeshScene::new();
        let outer = boxed(&mut scene, [0.1, 0.06, 0.08], [0.0, 0.0, 0.04]);
        let inner = boxed(&mut scene, [0.099, 0.059, 0.079], [0.0, 0.0, 0.04]);

        let shell = scene.boolean_subtract(outer, inner).unwrap();
        assert_eq!(shell, outer);
        assert!(matches!(
            scene.mesh(inner),
            Err(GeometryError::UnknownHandle(_))
        ));

        let bbox = scene.mesh(shell).unwrap().bounding_box();
        assert_relative_eq!(bbox.size().z, 0.08, epsilon = 1e-9);
    }

    #[test]
    fn test_decimate_reduces_triangles() {
        let mut scene = MeshScene::new();
        let handle = boxed(&mut scene, [0.1, 0.05, 0.001], [0.0, 0.0, 0.0]);
        scene.subdivide(handle, 50).unwrap();

        let before = scene.mesh(handle).unwrap().triangle_count();
        scene.decimate(handle, 0.1).unwrap();
        let after = scene.mesh(handle).unwrap().triangle_count();

        assert!(after < before / 2, "{after} not well below {before}");
        assert!(after > 0);
    }

    #[test]
    fn test_export_mesh_writes_file() {
        let mut scene = MeshScene::new();
        let a = boxed(&mut scene, [1.0, 1.0, 1.0], [0.0, 0.0, 0.0]);
        let b = boxed(&mut scene, [1.0, 1.0, 1.0], [2.0, 0.0, 0.0]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pair.stl");
        scene.export_mesh(&[a, b], &path).unwrap();

        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
