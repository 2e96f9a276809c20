//! Laplacian smoothing.

use nalgebra::Point3;
use tracing::{debug, info};

use crate::adjacency::MeshAdjacency;
use crate::error::{MeshError, MeshResult};
use crate::types::Mesh;

/// Blend factor per iteration: 0 leaves vertices in place, 1 moves them
/// all the way to the neighborhood average.
const LAMBDA: f64 = 0.5;

/// Apply `iterations` rounds of Laplacian smoothing.
///
/// Each interior vertex moves toward the mean of its edge-connected
/// neighbors. Boundary vertices are pinned so open edges do not shrink
/// away from the scanned outline.
pub fn smooth_mesh(mut mesh: Mesh, iterations: u32) -> MeshResult<Mesh> {
    if mesh.is_empty() {
        return Err(MeshError::empty_mesh("cannot smooth a mesh with no faces"));
    }
    if iterations == 0 {
        return Ok(mesh);
    }

    let adjacency = MeshAdjacency::build(&mesh.faces);
    let neighbors = adjacency.vertex_neighbors();
    let pinned = adjacency.boundary_vertices();

    for round in 0..iterations {
        let positions: Vec<Point3<f64>> =
            mesh.vertices.iter().map(|v| v.position).collect();

        for (idx, vertex) in mesh.vertices.iter_mut().enumerate() {
            let idx = idx as u32;
            if pinned.contains(&idx) {
                continue;
            }
            let Some(ring) = neighbors.get(&idx) else {
                continue;
            };
            if ring.is_empty() {
                continue;
            }

            let mut sum = nalgebra::Vector3::zeros();
            for &n in ring {
                sum += positions[n as usize].coords;
            }
            let average = sum / ring.len() as f64;
            let current = vertex.position.coords;
            vertex.position = Point3::from(current + LAMBDA * (average - current));
        }

        debug!(round = round + 1, "smoothing iteration applied");
    }

    info!(
        iterations,
        pinned = pinned.len(),
        "laplacian smoothing complete"
    );
    Ok(mesh)
}
