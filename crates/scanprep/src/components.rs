//! Connected-component (shell) enumeration and splitting.

use hashbrown::HashMap;
use tracing::debug;

use crate::adjacency::MeshAdjacency;
use crate::types::{Mesh, Vertex};

/// Find edge-connected components of the face graph.
///
/// Two faces are connected when they share an edge. Returns face-index
/// lists sorted largest component first; within a component the face
/// indices are ascending. Components are only ever reported or split,
/// never merged.
pub fn find_connected_components(
    faces: &[[u32; 3]],
    adjacency: &MeshAdjacency,
) -> Vec<Vec<u32>> {
    let face_count = faces.len();
    let mut visited = vec![false; face_count];
    let mut components: Vec<Vec<u32>> = Vec::new();

    for start in 0..face_count {
        if visited[start] {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![start as u32];
        visited[start] = true;

        while let Some(face_idx) = stack.pop() {
            component.push(face_idx);

            let [a, b, c] = faces[face_idx as usize];
            for (u, v) in [(a, b), (b, c), (c, a)] {
                let edge = crate::adjacency::canonical_edge(u, v);
                if let Some(neighbors) = adjacency.edge_to_faces.get(&edge) {
                    for &other in neighbors {
                        if !visited[other as usize] {
                            visited[other as usize] = true;
                            stack.push(other);
                        }
                    }
                }
            }
        }

        component.sort_unstable();
        components.push(component);
    }

    components.sort_by_key(|c| std::cmp::Reverse(c.len()));
    debug!(count = components.len(), "connected components found");
    components
}

/// Split a mesh into one mesh per connected component, largest first.
/// Vertices are remapped so each output mesh is self-contained.
pub fn split_into_components(mesh: &Mesh) -> Vec<Mesh> {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let components = find_connected_components(&mesh.faces, &adjacency);

    components
        .iter()
        .map(|face_indices| {
            let mut out = Mesh::new();
            let mut old_to_new: HashMap<u32, u32> = HashMap::new();

            for &face_idx in face_indices {
                let face = mesh.faces[face_idx as usize];
                let mut new_face = [0u32; 3];
                for (slot, &old_idx) in new_face.iter_mut().zip(face.iter()) {
                    let new_idx = *old_to_new.entry(old_idx).or_insert_with(|| {
                        let idx = out.vertices.len() as u32;
                        out.vertices
                            .push(Vertex::new(mesh.vertices[old_idx as usize].position));
                        idx
                    });
                    *slot = new_idx;
                }
                out.faces.push(new_face);
            }

            out
        })
        .collect()
}
