// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! Box primitive generation and refinement
//!
//! Plates and housing blocks are all boxes; bending and edge rounding
//! need refined meshes, so the generators here also provide uniform
//! triangle-grid subdivision and rounded-edge projection.

use super::{Mesh, Triangle, Vertex};
use nalgebra::{Point3, Vector3};

/// Generate a centered axis-aligned box
pub fn box_mesh(size: Vector3<f64>) -> Mesh {
    let mut mesh = Mesh::with_capacity(36, 12);

    let (min_x, max_x) = (-size.x / 2.0, size.x / 2.0);
    let (min_y, max_y) = (-size.y / 2.0, size.y / 2.0);
    let (min_z, max_z) = (-size.z / 2.0, size.z / 2.0);

    // 8 corners
    let positions = [
        Point3::new(min_x, min_y, min_z),
        Point3::new(max_x, min_y, min_z),
        Point3::new(max_x, max_y, min_z),
        Point3::new(min_x, max_y, min_z),
        Point3::new(min_x, min_y, max_z),
        Point3::new(max_x, min_y, max_z),
        Point3::new(max_x, max_y, max_z),
        Point3::new(min_x, max_y, max_z),
    ];

    // 6 faces, two triangles each, with outward normals
    let faces = [
        // Top (z+)
        ([4, 5, 6], Vector3::new(0.0, 0.0, 1.0)),
        ([4, 6, 7], Vector3::new(0.0, 0.0, 1.0)),
        // Bottom (z-)
        ([1, 0, 3], Vector3::new(0.0, 0.0, -1.0)),
        ([1, 3, 2], Vector3::new(0.0, 0.0, -1.0)),
        // Right (x+)
        ([5, 1, 2], Vector3::new(1.0, 0.0, 0.0)),
        ([5, 2, 6], Vector3::new(1.0, 0.0, 0.0)),
        // Left (x-)
        ([0, 4, 7], Vector3::new(-1.0, 0.0, 0.0)),
        ([0, 7, 3], Vector3::new(-1.0, 0.0, 0.0)),
        // Back (y+)
        ([7, 6, 2], Vector3::new(0.0, 1.0, 0.0)),
        ([7, 2, 3], Vector3::new(0.0, 1.0, 0.0)),
        // Front (y-)
        ([0, 1, 5], Vector3::new(0.0, -1.0, 0.0)),
        ([0, 5, 4], Vector3::new(0.0, -1.0, 0.0)),
    ];

    for (indices, normal) in faces {
        let v0 = mesh.add_vertex(Vertex::new(positions[indices[0]], normal));
        let v1 = mesh.add_vertex(Vertex::new(positions[indices[1]], normal));
        let v2 = mesh.add_vertex(Vertex::new(positions[indices[2]], normal));
        mesh.add_triangle(Triangle::new([v0, v1, v2]));
    }

    mesh
}

/// Uniformly subdivide every triangle into a barycentric grid.
///
/// `cuts` is the number of interior cuts per edge; each triangle becomes
/// `(cuts + 1)^2` triangles.
pub fn subdivide(mesh: &Mesh, cuts: u32) -> Mesh {
    if cuts == 0 {
        return mesh.clone();
    }
    let k = (cuts + 1) as usize;

    let mut result = Mesh::with_capacity(
        mesh.triangle_count() * (k + 1) * (k + 2) / 2,
        mesh.triangle_count() * k * k,
    );

    for triangle in &mesh.triangles {
        let v0 = mesh.vertices[triangle.indices[0]];
        let v1 = mesh.vertices[triangle.indices[1]];
        let v2 = mesh.vertices[triangle.indices[2]];

        // Grid points P(i, j) = v0 + i/k (v1 - v0) + j/k (v2 - v0), i + j <= k,
        // laid out row by row.
        let mut rows: Vec<Vec<usize>> = Vec::with_capacity(k + 1);
        for j in 0..=k {
            let mut row = Vec::with_capacity(k + 1 - j);
            for i in 0..=(k - j) {
                let a = i as f64 / k as f64;
                let b = j as f64 / k as f64;
                let position = v0.position + (v1.position - v0.position) * a
                    + (v2.position - v0.position) * b;
                let normal = (v0.normal * (1.0 - a - b) + v1.normal * a + v2.normal * b)
                    .try_normalize(1e-12)
                    .unwrap_or(v0.normal);
                row.push(result.add_vertex(Vertex::new(position, normal)));
            }
            rows.push(row);
        }

        for j in 0..k {
            for i in 0..(k - j) {
                result.add_triangle(Triangle::new([
                    rows[j][i],
                    rows[j][i + 1],
                    rows[j + 1][i],
                ]));
                if i + 1 <= k - j - 1 {
                    result.add_triangle(Triangle::new([
                        rows[j][i + 1],
                        rows[j + 1][i + 1],
                        rows[j + 1][i],
                    ]));
                }
            }
        }
    }

    result
}

/// Round the edges of a box-like mesh by projecting vertices onto the
/// rounded-surface offset of its bounding box.
///
/// Face interiors are unchanged; vertices within `radius` of an edge or
/// corner move onto the rounding arc. The mesh is subdivided first so the
/// arcs have `segments` worth of resolution.
pub fn round_edges(mesh: &Mesh, radius: f64, segments: u32) -> Mesh {
    let bbox = mesh.bounding_box();
    let size = bbox.size();
    // Radius cannot exceed half the smallest extent
    let radius = radius.min(size.min() / 2.0);
    if radius <= 0.0 {
        return mesh.clone();
    }

    let mut result = subdivide(mesh, segments * 2);

    let inner_min = bbox.min + Vector3::new(radius, radius, radius);
    let inner_max = bbox.max - Vector3::new(radius, radius, radius);

    for vertex in &mut result.vertices {
        let p = vertex.position;
        let q = Point3::new(
            p.x.clamp(inner_min.x, inner_max.x),
            p.y.clamp(inner_min.y, inner_max.y),
            p.z.clamp(inner_min.z, inner_max.z),
        );
        let offset = p - q;
        if let Some(direction) = offset.try_normalize(1e-12) {
            vertex.position = q + direction * radius;
        }
    }

    result.recompute_normals();
    result
}
