//! Edge and vertex adjacency maps built from a face list.
//!
//! Built once per query or transformation pass and discarded; never stored
//! on the mesh itself, so stale adjacency can't outlive an edit.

use hashbrown::{HashMap, HashSet};

/// Canonical undirected edge: vertex indices in ascending order.
#[inline]
pub fn canonical_edge(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Adjacency information for a triangle mesh.
#[derive(Debug)]
pub struct MeshAdjacency {
    /// Map from canonical edge to the faces that contain it.
    pub edge_to_faces: HashMap<(u32, u32), Vec<u32>>,

    /// Map from vertex index to the faces that contain it.
    pub vertex_to_faces: HashMap<u32, Vec<u32>>,
}

impl MeshAdjacency {
    /// Build adjacency maps from a face list.
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edge_to_faces: HashMap<(u32, u32), Vec<u32>> =
            HashMap::with_capacity(faces.len() * 3 / 2);
        let mut vertex_to_faces: HashMap<u32, Vec<u32>> = HashMap::new();

        for (face_idx, &[a, b, c]) in faces.iter().enumerate() {
            let face_idx = face_idx as u32;

            for (u, v) in [(a, b), (b, c), (c, a)] {
                edge_to_faces
                    .entry(canonical_edge(u, v))
                    .or_default()
                    .push(face_idx);
            }
            for v in [a, b, c] {
                vertex_to_faces.entry(v).or_default().push(face_idx);
            }
        }

        Self {
            edge_to_faces,
            vertex_to_faces,
        }
    }

    /// Number of unique undirected edges.
    #[inline]
    pub fn unique_edge_count(&self) -> usize {
        self.edge_to_faces.len()
    }

    /// Edges that belong to exactly one face (open surface boundary).
    pub fn boundary_edges(&self) -> Vec<(u32, u32)> {
        self.edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(&edge, _)| edge)
            .collect()
    }

    /// Edges that belong to more than two faces (non-manifold).
    pub fn non_manifold_edges(&self) -> Vec<(u32, u32)> {
        self.edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() > 2)
            .map(|(&edge, _)| edge)
            .collect()
    }

    /// True when every edge is shared by exactly two faces.
    pub fn is_watertight(&self) -> bool {
        self.edge_to_faces.values().all(|faces| faces.len() == 2)
    }

    /// Vertex indices on at least one boundary edge.
    pub fn boundary_vertices(&self) -> HashSet<u32> {
        let mut out = HashSet::new();
        for (edge, faces) in &self.edge_to_faces {
            if faces.len() == 1 {
                out.insert(edge.0);
                out.insert(edge.1);
            }
        }
        out
    }

    /// Map from vertex index to its edge-connected neighbor vertices.
    pub fn vertex_neighbors(&self) -> HashMap<u32, Vec<u32>> {
        let mut neighbors: HashMap<u32, Vec<u32>> = HashMap::new();
        for &(a, b) in self.edge_to_faces.keys() {
            neighbors.entry(a).or_default().push(b);
            neighbors.entry(b).or_default().push(a);
        }
        neighbors
    }
}
