//! Mesh repair: vertex welding, degenerate-face removal, hole filling.

use hashbrown::HashMap;
use tracing::{debug, info, warn};

use crate::adjacency::MeshAdjacency;
use crate::error::{MeshError, MeshResult};
use crate::types::{Mesh, Triangle, Vertex};

/// Default welding tolerance in mesh units (millimeters).
pub const DEFAULT_WELD_TOLERANCE: f64 = 1e-6;

/// Minimum triangle area below which a face counts as degenerate.
const DEGENERATE_AREA_EPSILON: f64 = 1e-12;

/// What a repair pass changed.
#[derive(Debug, Clone, Default)]
pub struct RepairSummary {
    pub vertices_welded: usize,
    pub degenerate_faces_removed: usize,
    pub holes_filled: usize,
    pub holes_skipped: usize,
}

impl RepairSummary {
    pub fn changed_anything(&self) -> bool {
        self.vertices_welded > 0 || self.degenerate_faces_removed > 0 || self.holes_filled > 0
    }
}

/// Run the full repair pass: weld coincident vertices, drop degenerate
/// faces, then fan-fill boundary loops.
///
/// Best effort, not a guarantee of watertightness: loops that cannot be
/// traced unambiguously (non-manifold boundaries) are left open and
/// counted in `holes_skipped`.
pub fn repair_mesh(mesh: Mesh) -> MeshResult<(Mesh, RepairSummary)> {
    if mesh.is_empty() {
        return Err(MeshError::empty_mesh("cannot repair a mesh with no faces"));
    }

    let mut summary = RepairSummary::default();

    let mesh = weld_vertices(mesh, DEFAULT_WELD_TOLERANCE, &mut summary);
    let mesh = remove_degenerate_faces(mesh, &mut summary);
    let mesh = fill_holes(mesh, &mut summary);

    if mesh.faces.is_empty() {
        return Err(MeshError::empty_mesh(
            "no faces survived repair; the input was entirely degenerate",
        ));
    }

    info!(
        welded = summary.vertices_welded,
        degenerate = summary.degenerate_faces_removed,
        holes_filled = summary.holes_filled,
        holes_skipped = summary.holes_skipped,
        "repair pass complete"
    );
    Ok((mesh, summary))
}

/// Merge vertices closer than `tolerance` using a quantized spatial grid.
pub fn weld_vertices(mesh: Mesh, tolerance: f64, summary: &mut RepairSummary) -> Mesh {
    let inv = 1.0 / tolerance;
    let mut grid: HashMap<(i64, i64, i64), u32> = HashMap::with_capacity(mesh.vertex_count());
    let mut remap: Vec<u32> = Vec::with_capacity(mesh.vertex_count());
    let mut out = Mesh::with_capacity(mesh.vertex_count(), mesh.face_count());

    for vertex in &mesh.vertices {
        let p = vertex.position;
        let key = (
            (p.x * inv).round() as i64,
            (p.y * inv).round() as i64,
            (p.z * inv).round() as i64,
        );
        let idx = *grid.entry(key).or_insert_with(|| {
            let idx = out.vertices.len() as u32;
            out.vertices.push(Vertex::new(p));
            idx
        });
        remap.push(idx);
    }

    summary.vertices_welded = mesh.vertex_count() - out.vertex_count();

    for &[a, b, c] in &mesh.faces {
        let face = [
            remap[a as usize],
            remap[b as usize],
            remap[c as usize],
        ];
        // Welding can collapse a sliver triangle onto itself.
        if face[0] != face[1] && face[1] != face[2] && face[0] != face[2] {
            out.faces.push(face);
        } else {
            summary.degenerate_faces_removed += 1;
        }
    }

    if summary.vertices_welded > 0 {
        debug!(welded = summary.vertices_welded, "welded coincident vertices");
    }
    out
}

/// Drop faces with repeated indices or near-zero area.
pub fn remove_degenerate_faces(mut mesh: Mesh, summary: &mut RepairSummary) -> Mesh {
    let vertices = std::mem::take(&mut mesh.vertices);
    let before = mesh.faces.len();

    mesh.faces.retain(|&[a, b, c]| {
        if a == b || b == c || a == c {
            return false;
        }
        let tri = Triangle::new(
            vertices[a as usize].position,
            vertices[b as usize].position,
            vertices[c as usize].position,
        );
        !tri.is_degenerate(DEGENERATE_AREA_EPSILON)
    });

    summary.degenerate_faces_removed += before - mesh.faces.len();
    mesh.vertices = vertices;
    mesh
}

/// Fill boundary loops with triangle fans anchored at the first loop vertex.
///
/// Winding of the new triangles follows the hole loop, so a consistently
/// wound input stays consistent.
pub fn fill_holes(mut mesh: Mesh, summary: &mut RepairSummary) -> Mesh {
    let loops = trace_boundary_loops(&mesh.faces);

    for hole in &loops {
        if hole.len() < 3 {
            summary.holes_skipped += 1;
            continue;
        }
        let anchor = hole[0];
        for window in hole[1..].windows(2) {
            mesh.faces.push([anchor, window[0], window[1]]);
        }
        summary.holes_filled += 1;
        debug!(loop_len = hole.len(), "filled boundary loop");
    }

    mesh
}

/// Trace closed boundary loops from directed boundary edges.
///
/// A boundary edge traversed u -> v by its single face is walked v -> u by
/// the hole loop, which keeps fill-triangle winding consistent with the
/// surrounding surface. Vertices with more than one outgoing boundary edge
/// make the walk ambiguous; their loops are dropped.
fn trace_boundary_loops(faces: &[[u32; 3]]) -> Vec<Vec<u32>> {
    let adjacency = MeshAdjacency::build(faces);

    // Directed boundary edges, reversed relative to face traversal.
    let mut next: HashMap<u32, u32> = HashMap::new();
    let mut ambiguous = false;
    for &[a, b, c] in faces {
        for (u, v) in [(a, b), (b, c), (c, a)] {
            let edge = crate::adjacency::canonical_edge(u, v);
            if adjacency.edge_to_faces[&edge].len() == 1 && next.insert(v, u).is_some() {
                ambiguous = true;
            }
        }
    }
    if ambiguous {
        warn!("non-manifold boundary; leaving ambiguous loops open");
        return Vec::new();
    }

    let mut loops = Vec::new();
    let mut visited: HashMap<u32, bool> = next.keys().map(|&k| (k, false)).collect();

    for &start in next.keys() {
        if visited[&start] {
            continue;
        }
        let mut loop_verts = vec![start];
        visited.insert(start, true);
        let mut current = start;
        let mut closed = false;

        while let Some(&succ) = next.get(&current) {
            if succ == start {
                closed = true;
                break;
            }
            if visited.get(&succ).copied().unwrap_or(true) {
                break;
            }
            visited.insert(succ, true);
            loop_verts.push(succ);
            current = succ;
        }

        if closed {
            loops.push(loop_verts);
        }
    }

    loops
}
