// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! Mesh representation and utilities

use super::BoundingBox;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Vertex with position and normal
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Vertex {
    pub fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { position, normal }
    }
}

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }
}

/// Triangular mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a triangle
    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Translate all vertices
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for vertex in &mut self.vertices {
            vertex.position += offset;
        }
    }

    /// Compute bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_vertices(&self.vertices)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Merge with another mesh (simple concatenation without CSG)
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);

        for triangle in &other.triangles {
            self.triangles.push(Triangle::new([
                triangle.indices[0] + offset,
                triangle.indices[1] + offset,
                triangle.indices[2] + offset,
            ]));
        }
    }

    /// Drop triangles with repeated indices and vertices no triangle
    /// references, remapping indices.
    pub fn compact(&mut self) {
        self.triangles.retain(|t| {
            let [a, b, c] = t.indices;
            a != b && b != c && a != c
        });

        let mut used = vec![false; self.vertices.len()];
        for triangle in &self.triangles {
            for &i in &triangle.indices {
                used[i] = true;
            }
        }

        let mut remap = vec![0usize; self.vertices.len()];
        let mut kept = Vec::with_capacity(self.vertices.len());
        for (i, vertex) in self.vertices.iter().enumerate() {
            if used[i] {
                remap[i] = kept.len();
                kept.push(*vertex);
            }
        }
        for triangle in &mut self.triangles {
            for index in &mut triangle.indices {
                *index = remap[*index];
            }
        }
        self.vertices = kept;
    }

    /// Recompute vertex normals from triangle geometry, area-weighted and
    /// averaged at shared vertices.
    pub fn recompute_normals(&mut self) {
        if self.vertices.is_empty() || self.triangles.is_empty() {
            return;
        }

        let mut normal_sums: Vec<Vector3<f64>> = vec![Vector3::zeros(); self.vertices.len()];

        for triangle in &self.triangles {
            let v0 = &self.vertices[triangle.indices[0]];
            let v1 = &self.vertices[triangle.indices[1]];
            let v2 = &self.vertices[triangle.indices[2]];

            let face_normal = (v1.position - v0.position).cross(&(v2.position - v0.position));
            if face_normal.norm() > 1e-12 {
                for &idx in &triangle.indices {
                    normal_sums[idx] += face_normal;
                }
            }
        }

        for (i, vertex) in self.vertices.iter_mut().enumerate() {
            vertex.normal = if normal_sums[i].norm() > 1e-12 {
                normal_sums[i].normalize()
            } else {
                Vector3::new(0.0, 0.0, 1.0)
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives::box_mesh;

    #[test]
    fn test_translate_moves_bounding_box() {
        let mut mesh = box_mesh(Vector3::new(1.0, 1.0, 1.0));
        mesh.translate(Vector3::new(5.0, 0.0, 0.0));

        let bbox = mesh.bounding_box();
        assert!((bbox.min.x - 4.5).abs() < 1e-12);
        assert!((bbox.max.x - 5.5).abs() < 1e-12);
    }

    #[test]
    fn test_merge_offsets_indices() {
        let mut a = box_mesh(Vector3::new(1.0, 1.0, 1.0));
        let b = box_mesh(Vector3::new(1.0, 1.0, 1.0));
        let vertices_a = a.vertex_count();

        a.merge(&b);
        assert_eq!(a.vertex_count(), 2 * vertices_a);
        assert!(a
            .triangles
            .iter()
            .all(|t| t.indices.iter().all(|&i| i < a.vertex_count())));
    }

    #[test]
    fn test_compact_drops_degenerate_triangles() {
        let mut mesh = box_mesh(Vector3::new(1.0, 1.0, 1.0));
        let triangles = mesh.triangle_count();
        mesh.add_triangle(Triangle::new([0, 0, 1]));

        mesh.compact();
        assert_eq!(mesh.triangle_count(), triangles);
    }

    #[test]
    fn test_recompute_normals_unit_length() {
        let mut mesh = box_mesh(Vector3::new(2.0, 1.0, 0.5));
        mesh.recompute_normals();
        assert!(mesh
            .vertices
            .iter()
            .all(|v| (v.normal.norm() - 1.0).abs() < 1e-9));
    }
}
