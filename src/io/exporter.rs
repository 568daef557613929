// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Cellforge Team.

//! STL mesh writer

use crate::geometry::Mesh;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Export a mesh to STL; binary for `.stl`, ASCII otherwise
pub fn export_stl(mesh: &Mesh, path: &Path) -> io::Result<()> {
    if path.extension().map_or(false, |ext| ext == "stl") {
        export_stl_binary(mesh, path)
    } else {
        export_stl_ascii(mesh, path)
    }
}

fn export_stl_binary(mesh: &Mesh, path: &Path) -> io::Result<()> {
    use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

    let triangles: Vec<StlTriangle> = mesh
        .triangles
        .iter()
        .map(|tri| {
            let v0 = &mesh.vertices[tri.indices[0]];
            let v1 = &mesh.vertices[tri.indices[1]];
            let v2 = &mesh.vertices[tri.indices[2]];

            let normal = (v0.normal + v1.normal + v2.normal) / 3.0;

            StlTriangle {
                normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: [
                    StlVertex::new([
                        v0.position.x as f32,
                        v0.position.y as f32,
                        v0.position.z as f32,
                    ]),
                    StlVertex::new([
                        v1.position.x as f32,
                        v1.position.y as f32,
                        v1.position.z as f32,
                    ]),
                    StlVertex::new([
                        v2.position.x as f32,
                        v2.position.y as f32,
                        v2.position.z as f32,
                    ]),
                ],
            }
        })
        .collect();

    let mut file = BufWriter::new(File::create(path)?);
    stl_io::write_stl(&mut file, triangles.iter())?;
    Ok(())
}

fn export_stl_ascii(mesh: &Mesh, path: &Path) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "solid mesh")?;

    for tri in &mesh.triangles {
        let v0 = &mesh.vertices[tri.indices[0]];
        let v1 = &mesh.vertices[tri.indices[1]];
        let v2 = &mesh.vertices[tri.indices[2]];

        let normal = (v0.normal + v1.normal + v2.normal) / 3.0;

        writeln!(file, "  facet normal {} {} {}", normal.x, normal.y, normal.z)?;
        writeln!(file, "    outer loop")?;
        for v in [v0, v1, v2] {
            writeln!(
                file,
                "      vertex {} {} {}",
                v.position.x, v.position.y, v.position.z
            )?;
        }
        writeln!(file, "    endloop")?;
        writeln!(file, "  endfacet")?;
    }

    writeln!(file, "endsolid mesh")?;
    Ok(())
}
