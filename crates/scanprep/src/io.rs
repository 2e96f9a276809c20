//! Mesh file I/O: STL, OBJ, and PLY.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};
use tracing::{debug, info};

use crate::error::{MeshError, MeshResult};
use crate::types::{Mesh, Vertex};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Stl,
    Obj,
    Ply,
}

impl MeshFormat {
    /// Detect format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> MeshResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "stl" => Ok(MeshFormat::Stl),
            "obj" => Ok(MeshFormat::Obj),
            "ply" => Ok(MeshFormat::Ply),
            _ => Err(MeshError::unsupported_format(extension)),
        }
    }
}

/// Load a mesh, detecting the format from the file extension.
pub fn load_mesh(path: &Path) -> MeshResult<Mesh> {
    let format = MeshFormat::from_path(path)?;
    let mesh = match format {
        MeshFormat::Stl => load_stl(path)?,
        MeshFormat::Obj => load_obj(path)?,
        MeshFormat::Ply => load_ply(path)?,
    };

    if mesh.is_empty() {
        return Err(MeshError::empty_mesh(format!(
            "{} contains no triangles",
            path.display()
        )));
    }

    let vertex_count = mesh.vertex_count() as u32;
    for &[a, b, c] in &mesh.faces {
        if a >= vertex_count || b >= vertex_count || c >= vertex_count {
            return Err(MeshError::parse_error(
                path,
                format!("face references vertex beyond the {vertex_count} defined"),
            ));
        }
    }

    info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "mesh loaded"
    );
    Ok(mesh)
}

/// Save a mesh, detecting the format from the file extension.
pub fn save_mesh(mesh: &Mesh, path: &Path) -> MeshResult<()> {
    let format = MeshFormat::from_path(path)?;
    match format {
        MeshFormat::Stl => save_stl(mesh, path)?,
        MeshFormat::Obj => save_obj(mesh, path)?,
        MeshFormat::Ply => save_ply(mesh, path)?,
    }

    info!(
        path = %path.display(),
        faces = mesh.face_count(),
        "mesh saved"
    );
    Ok(())
}

fn load_stl(path: &Path) -> MeshResult<Mesh> {
    let file = File::open(path).map_err(|e| MeshError::io_read(path, e))?;
    let mut reader = BufReader::new(file);

    let indexed = stl_io::read_stl(&mut reader)
        .map_err(|e| MeshError::parse_error(path, e.to_string()))?;

    let mut mesh = Mesh::with_capacity(indexed.vertices.len(), indexed.faces.len());
    for v in &indexed.vertices {
        mesh.vertices.push(Vertex::from_coords(
            v[0] as f64,
            v[1] as f64,
            v[2] as f64,
        ));
    }
    for face in &indexed.faces {
        let [a, b, c] = face.vertices;
        // stl_io can emit index triples with repeats for degenerate
        // facets; skip them at load time.
        if a != b && b != c && a != c {
            mesh.faces.push([a as u32, b as u32, c as u32]);
        }
    }

    debug!(path = %path.display(), "parsed STL");
    Ok(mesh)
}

fn save_stl(mesh: &Mesh, path: &Path) -> MeshResult<()> {
    let file = File::create(path).map_err(|e| MeshError::io_write(path, e))?;
    let mut writer = BufWriter::new(file);

    let triangles: Vec<stl_io::Triangle> = mesh
        .triangles()
        .map(|tri| {
            let normal = tri
                .normal()
                .map(|n| [n.x as f32, n.y as f32, n.z as f32])
                .unwrap_or([0.0; 3]);
            stl_io::Triangle {
                normal: stl_io::Normal::new(normal),
                vertices: [
                    stl_io::Vertex::new([tri.v0.x as f32, tri.v0.y as f32, tri.v0.z as f32]),
                    stl_io::Vertex::new([tri.v1.x as f32, tri.v1.y as f32, tri.v1.z as f32]),
                    stl_io::Vertex::new([tri.v2.x as f32, tri.v2.y as f32, tri.v2.z as f32]),
                ],
            }
        })
        .collect();

    stl_io::write_stl(&mut writer, triangles.iter())
        .map_err(|e| MeshError::io_write(path, e))?;
    writer.flush().map_err(|e| MeshError::io_write(path, e))?;
    Ok(())
}

fn load_obj(path: &Path) -> MeshResult<Mesh> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| MeshError::parse_error(path, e.to_string()))?;

    let mut mesh = Mesh::new();
    for model in &models {
        let base = mesh.vertices.len() as u32;
        for chunk in model.mesh.positions.chunks_exact(3) {
            mesh.vertices.push(Vertex::from_coords(
                chunk[0] as f64,
                chunk[1] as f64,
                chunk[2] as f64,
            ));
        }
        for idx in model.mesh.indices.chunks_exact(3) {
            mesh.faces
                .push([base + idx[0], base + idx[1], base + idx[2]]);
        }
    }

    debug!(path = %path.display(), models = models.len(), "parsed OBJ");
    Ok(mesh)
}

fn save_obj(mesh: &Mesh, path: &Path) -> MeshResult<()> {
    let file = File::create(path).map_err(|e| MeshError::io_write(path, e))?;
    let mut writer = BufWriter::new(file);

    let write = |w: &mut BufWriter<File>, line: String| -> MeshResult<()> {
        writeln!(w, "{line}").map_err(|e| MeshError::io_write(path, e))
    };

    for v in &mesh.vertices {
        let p = v.position;
        write(&mut writer, format!("v {} {} {}", p.x, p.y, p.z))?;
    }
    for &[a, b, c] in &mesh.faces {
        // OBJ indices are 1-based.
        write(&mut writer, format!("f {} {} {}", a + 1, b + 1, c + 1))?;
    }
    writer.flush().map_err(|e| MeshError::io_write(path, e))?;
    Ok(())
}

fn load_ply(path: &Path) -> MeshResult<Mesh> {
    let file = File::open(path).map_err(|e| MeshError::io_read(path, e))?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| MeshError::parse_error(path, e.to_string()))?;

    let mut mesh = Mesh::new();

    if let Some(vertices) = ply.payload.get("vertex") {
        for element in vertices {
            let x = ply_coord(element, "x");
            let y = ply_coord(element, "y");
            let z = ply_coord(element, "z");
            match (x, y, z) {
                (Some(x), Some(y), Some(z)) => {
                    mesh.vertices.push(Vertex::from_coords(x, y, z));
                }
                _ => {
                    return Err(MeshError::parse_error(
                        path,
                        "vertex element missing x/y/z properties",
                    ))
                }
            }
        }
    }

    if let Some(faces) = ply.payload.get("face") {
        for element in faces {
            let indices = element
                .get("vertex_indices")
                .or_else(|| element.get("vertex_index"))
                .and_then(ply_index_list)
                .ok_or_else(|| {
                    MeshError::parse_error(path, "face element missing vertex index list")
                })?;

            // Fan-triangulate polygons with more than three vertices.
            for i in 1..indices.len().saturating_sub(1) {
                mesh.faces.push([indices[0], indices[i], indices[i + 1]]);
            }
        }
    }

    debug!(path = %path.display(), "parsed PLY");
    Ok(mesh)
}

fn ply_coord(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        _ => None,
    }
}

fn ply_index_list(property: &Property) -> Option<Vec<u32>> {
    match property {
        Property::ListInt(list) => Some(list.iter().map(|&i| i as u32).collect()),
        Property::ListUInt(list) => Some(list.clone()),
        Property::ListUShort(list) => Some(list.iter().map(|&i| i as u32).collect()),
        _ => None,
    }
}

fn save_ply(mesh: &Mesh, path: &Path) -> MeshResult<()> {
    let file = File::create(path).map_err(|e| MeshError::io_write(path, e))?;
    let mut writer = BufWriter::new(file);

    let io_err = |e: std::io::Error| MeshError::io_write(path, e);

    writeln!(writer, "ply").map_err(io_err)?;
    writeln!(writer, "format ascii 1.0").map_err(io_err)?;
    writeln!(writer, "element vertex {}", mesh.vertex_count()).map_err(io_err)?;
    writeln!(writer, "property double x").map_err(io_err)?;
    writeln!(writer, "property double y").map_err(io_err)?;
    writeln!(writer, "property double z").map_err(io_err)?;
    writeln!(writer, "element face {}", mesh.face_count()).map_err(io_err)?;
    writeln!(writer, "property list uchar uint vertex_indices").map_err(io_err)?;
    writeln!(writer, "end_header").map_err(io_err)?;

    for v in &mesh.vertices {
        let p = v.position;
        writeln!(writer, "{} {} {}", p.x, p.y, p.z).map_err(io_err)?;
    }
    for &[a, b, c] in &mesh.faces {
        writeln!(writer, "3 {a} {b} {c}").map_err(io_err)?;
    }
    writer.flush().map_err(io_err)?;
    Ok(())
}
