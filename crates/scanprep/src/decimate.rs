//! Face-count reduction by shortest-edge collapse.

use hashbrown::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::adjacency::MeshAdjacency;
use crate::error::{MeshError, MeshResult};
use crate::types::{Mesh, Vertex};

/// Reduce the mesh toward `target_faces` by collapsing short edges.
///
/// Greedy passes: edges are sorted by length and the shortest
/// non-conflicting ones are collapsed to their midpoint, shortest first,
/// until the target is met or no further collapse is possible. Boundary
/// edges are never collapsed, so open outlines keep their shape.
///
/// Returns the mesh unchanged when it already has `target_faces` or fewer.
pub fn decimate_mesh(mesh: Mesh, target_faces: usize) -> MeshResult<Mesh> {
    if mesh.is_empty() {
        return Err(MeshError::empty_mesh("cannot decimate a mesh with no faces"));
    }
    if mesh.face_count() <= target_faces {
        return Ok(mesh);
    }

    let start_faces = mesh.face_count();
    let mut mesh = mesh;

    loop {
        let before = mesh.face_count();
        if before <= target_faces {
            break;
        }

        mesh = collapse_pass(mesh, target_faces);

        if mesh.face_count() == before {
            warn!(
                faces = mesh.face_count(),
                target = target_faces,
                "decimation stalled before reaching target"
            );
            break;
        }
    }

    let mesh = compact_vertices(mesh);
    info!(
        from = start_faces,
        to = mesh.face_count(),
        target = target_faces,
        "decimation complete"
    );
    Ok(mesh)
}

/// One greedy pass: collapse the shortest edges whose endpoints have not
/// been touched yet this pass.
fn collapse_pass(mut mesh: Mesh, target_faces: usize) -> Mesh {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let boundary = adjacency.boundary_vertices();

    let mut edges: Vec<((u32, u32), f64)> = adjacency
        .edge_to_faces
        .keys()
        .map(|&(a, b)| {
            let len =
                (mesh.vertices[a as usize].position - mesh.vertices[b as usize].position).norm();
            ((a, b), len)
        })
        .collect();
    edges.sort_by(|a, b| a.1.total_cmp(&b.1));

    // Each collapse of an interior edge removes two faces.
    let mut remaining = (mesh.face_count().saturating_sub(target_faces) + 1) / 2;
    let mut touched: HashSet<u32> = HashSet::new();
    let mut remap: HashMap<u32, u32> = HashMap::new();
    let mut collapsed = 0usize;

    for ((a, b), _) in edges {
        if remaining == 0 {
            break;
        }
        if touched.contains(&a) || touched.contains(&b) {
            continue;
        }
        if boundary.contains(&a) || boundary.contains(&b) {
            continue;
        }

        let midpoint = nalgebra::center(
            &mesh.vertices[a as usize].position,
            &mesh.vertices[b as usize].position,
        );
        mesh.vertices[a as usize].position = midpoint;
        remap.insert(b, a);
        touched.insert(a);
        touched.insert(b);
        remaining -= 1;
        collapsed += 1;
    }

    if collapsed == 0 {
        return mesh;
    }

    let resolve = |idx: u32| remap.get(&idx).copied().unwrap_or(idx);
    let mut seen: HashSet<[u32; 3]> = HashSet::new();
    mesh.faces.retain_mut(|face| {
        for idx in face.iter_mut() {
            *idx = resolve(*idx);
        }
        let [a, b, c] = *face;
        if a == b || b == c || a == c {
            return false;
        }
        // Canonical rotation so duplicate faces created by a collapse
        // are dropped regardless of starting vertex.
        let key = canonical_face(*face);
        seen.insert(key)
    });

    debug!(collapsed, faces = mesh.face_count(), "collapse pass");
    mesh
}

fn canonical_face([a, b, c]: [u32; 3]) -> [u32; 3] {
    let mut key = [a, b, c];
    key.sort_unstable();
    key
}

/// Drop vertices no face references and remap indices.
fn compact_vertices(mesh: Mesh) -> Mesh {
    let mut used: Vec<bool> = vec![false; mesh.vertex_count()];
    for &[a, b, c] in &mesh.faces {
        used[a as usize] = true;
        used[b as usize] = true;
        used[c as usize] = true;
    }

    let mut remap: Vec<u32> = vec![0; mesh.vertex_count()];
    let mut out = Mesh::with_capacity(mesh.vertex_count(), mesh.face_count());
    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        if used[idx] {
            remap[idx] = out.vertices.len() as u32;
            out.vertices.push(Vertex::new(vertex.position));
        }
    }
    for &[a, b, c] in &mesh.faces {
        out.faces
            .push([remap[a as usize], remap[b as usize], remap[c as usize]]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::unit_cube;

    /// Subdivided cube: each face split into four, 48 faces total.
    fn subdivided_cube() -> Mesh {
        let cube = unit_cube();
        let mut out = Mesh::new();
        for tri in cube.triangles() {
            let m01 = nalgebra::center(&tri.v0, &tri.v1);
            let m12 = nalgebra::center(&tri.v1, &tri.v2);
            let m20 = nalgebra::center(&tri.v2, &tri.v0);
            let base = out.vertices.len() as u32;
            for p in [tri.v0, tri.v1, tri.v2, m01, m12, m20] {
                out.vertices.push(Vertex::new(p));
            }
            out.faces.push([base, base + 3, base + 5]);
            out.faces.push([base + 3, base + 1, base + 4]);
            out.faces.push([base + 5, base + 4, base + 2]);
            out.faces.push([base + 3, base + 4, base + 5]);
        }
        // Re-weld the duplicated corner and midpoint vertices.
        let mut summary = crate::repair::RepairSummary::default();
        crate::repair::weld_vertices(out, 1e-6, &mut summary)
    }

    #[test]
    fn test_decimate_empty_fails() {
        let err = decimate_mesh(Mesh::new(), 10).unwrap_err();
        assert!(matches!(err, MeshError::EmptyMesh { .. }));
    }

    #[test]
    fn test_decimate_noop_when_at_or_below_target() {
        let mesh = unit_cube();
        let out = decimate_mesh(mesh, 12).unwrap();
        assert_eq!(out.face_count(), 12);

        let mesh = unit_cube();
        let out = decimate_mesh(mesh, 100).unwrap();
        assert_eq!(out.face_count(), 12);
    }

    #[test]
    fn test_decimate_reduces_face_count() {
        let mesh = subdivided_cube();
        assert_eq!(mesh.face_count(), 48);
        let out = decimate_mesh(mesh, 24).unwrap();
        assert!(out.face_count() < 48);
    }

    #[test]
    fn test_decimated_mesh_has_valid_indices() {
        let mesh = subdivided_cube();
        let out = decimate_mesh(mesh, 20).unwrap();
        for &[a, b, c] in &out.faces {
            assert!((a as usize) < out.vertex_count());
            assert!((b as usize) < out.vertex_count());
            assert!((c as usize) < out.vertex_count());
            assert!(a != b && b != c && a != c);
        }
    }

    #[test]
    fn test_decimate_stalls_gracefully() {
        // A tetrahedron cannot go below 4 faces; asking for 1 must stop
        // without looping forever.
        let mesh = crate::test_fixtures::tetrahedron();
        let out = decimate_mesh(mesh, 1).unwrap();
        assert!(out.face_count() >= 1);
    }
}
