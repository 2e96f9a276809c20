//! Mesh diagnostics: structural statistics and printability heuristics.
//!
//! Everything here is read-only. A report is derived from one mesh snapshot
//! and a later edit to the mesh does not update it.

use hashbrown::{HashMap, HashSet};
use serde::Serialize;
use tracing::{debug, warn};

use crate::adjacency::{canonical_edge, MeshAdjacency};
use crate::error::{MeshError, MeshResult};
use crate::kernel::GeometryKernel;
use crate::types::Mesh;

/// Outlier threshold in population standard deviations above the mean.
/// Edges and faces beyond this are flagged as probable scan artifacts.
const OUTLIER_SIGMA: f64 = 3.0;

/// Statistics over a set of scalar measurements (population variance).
#[derive(Debug, Clone, Serialize)]
pub struct ScalarStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
}

impl ScalarStats {
    fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: 0.0,
                min: 0.0,
                max: 0.0,
                std_dev: 0.0,
            };
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Self {
            mean,
            min,
            max,
            std_dev: variance.sqrt(),
        }
    }

    /// Threshold above which a value counts as an outlier.
    #[inline]
    pub fn outlier_threshold(&self) -> f64 {
        self.mean + OUTLIER_SIGMA * self.std_dev
    }
}

/// Structural analysis of a triangle mesh.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub vertex_count: usize,
    pub face_count: usize,
    pub unique_edge_count: usize,

    pub edge_length: ScalarStats,
    pub face_area: ScalarStats,

    /// True when every edge is shared by exactly two faces.
    pub is_watertight: bool,

    /// True when every shared edge is traversed in opposite directions
    /// by its two faces.
    pub winding_consistent: bool,

    /// Edges longer than mean + 3 sigma, as canonical vertex pairs.
    pub long_edges: Vec<(u32, u32)>,

    /// Number of faces with area above mean + 3 sigma.
    pub large_face_count: usize,

    /// Edges outside the face-adjacency set (no adjacent face pair), as
    /// canonical vertex pairs. Computed independently of `is_watertight`;
    /// the two signals can disagree on non-manifold meshes and both are
    /// reported as-is.
    pub boundary_edges: Vec<(u32, u32)>,

    /// Face counts per connected component, largest first.
    pub component_face_counts: Vec<usize>,

    pub bounds_min: [f64; 3],
    pub bounds_max: [f64; 3],
    pub surface_area: f64,
}

impl AnalysisReport {
    #[inline]
    pub fn component_count(&self) -> usize {
        self.component_face_counts.len()
    }

    #[inline]
    pub fn boundary_edge_count(&self) -> usize {
        self.boundary_edges.len()
    }

    #[inline]
    pub fn long_edge_count(&self) -> usize {
        self.long_edges.len()
    }

    /// True when the mesh looks ready to print: watertight, one shell,
    /// no boundary edges.
    pub fn is_print_ready(&self) -> bool {
        self.is_watertight && self.boundary_edges.is_empty() && self.component_count() <= 1
    }
}

impl std::fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Mesh Analysis")?;
        writeln!(f, "  Vertices:       {}", self.vertex_count)?;
        writeln!(f, "  Faces:          {}", self.face_count)?;
        writeln!(f, "  Unique edges:   {}", self.unique_edge_count)?;
        writeln!(
            f,
            "  Watertight:     {}",
            if self.is_watertight { "yes" } else { "no" }
        )?;
        writeln!(
            f,
            "  Winding:        {}",
            if self.winding_consistent {
                "consistent"
            } else {
                "inconsistent"
            }
        )?;
        writeln!(f, "  Boundary edges: {}", self.boundary_edge_count())?;
        writeln!(
            f,
            "  Edge length:    mean {:.4} / max {:.4} ({} outliers)",
            self.edge_length.mean,
            self.edge_length.max,
            self.long_edge_count()
        )?;
        writeln!(
            f,
            "  Face area:      mean {:.6} / max {:.6} ({} outliers)",
            self.face_area.mean, self.face_area.max, self.large_face_count
        )?;
        write!(f, "  Components:     {}", self.component_count())?;
        if self.component_count() > 1 {
            write!(f, " (faces per shell: {:?})", self.component_face_counts)?;
        }
        Ok(())
    }
}

/// Analyze a mesh with the built-in kernel.
///
/// Convenience wrapper over [`analyze_with`].
pub fn analyze(mesh: &Mesh) -> MeshResult<AnalysisReport> {
    analyze_with(mesh, &crate::kernel::BuiltinKernel)
}

/// Analyze a mesh and produce a diagnostic report.
///
/// Shell enumeration goes through the kernel, so a swapped-in kernel's
/// component splitter drives the diagnostics too. Fails with
/// [`MeshError::EmptyMesh`] when the mesh has no faces; every statistic
/// below assumes at least one triangle exists.
pub fn analyze_with<K: GeometryKernel>(mesh: &Mesh, kernel: &K) -> MeshResult<AnalysisReport> {
    if mesh.faces.is_empty() {
        return Err(MeshError::empty_mesh("mesh has no faces to analyze"));
    }

    let adjacency = MeshAdjacency::build(&mesh.faces);

    // Edge lengths over all unique undirected edges.
    let edge_lengths: Vec<f64> = adjacency
        .edge_to_faces
        .keys()
        .map(|&(a, b)| {
            (mesh.vertices[a as usize].position - mesh.vertices[b as usize].position).norm()
        })
        .collect();
    let edge_length = ScalarStats::from_values(&edge_lengths);

    let edge_threshold = edge_length.outlier_threshold();
    let mut long_edges: Vec<(u32, u32)> = adjacency
        .edge_to_faces
        .keys()
        .zip(edge_lengths.iter())
        .filter(|(_, &len)| len > edge_threshold)
        .map(|(&edge, _)| edge)
        .collect();
    long_edges.sort_unstable();

    // Face areas.
    let face_areas: Vec<f64> = mesh.triangles().map(|tri| tri.area()).collect();
    let face_area = ScalarStats::from_values(&face_areas);
    let area_threshold = face_area.outlier_threshold();
    let large_face_count = face_areas.iter().filter(|&&a| a > area_threshold).count();

    // Boundary edges as a set difference: all unique edges minus the
    // face-adjacency set. Any edge with at least one adjacent face pair
    // is interior, so a non-manifold edge (three or more faces) is not a
    // boundary; only the watertight flag catches it.
    let all_edges: HashSet<(u32, u32)> = mesh
        .faces
        .iter()
        .flat_map(|&[a, b, c]| [canonical_edge(a, b), canonical_edge(b, c), canonical_edge(c, a)])
        .collect();
    let shared_edges: HashSet<(u32, u32)> = adjacency
        .edge_to_faces
        .iter()
        .filter(|(_, faces)| faces.len() >= 2)
        .map(|(&edge, _)| edge)
        .collect();
    let mut boundary_edges: Vec<(u32, u32)> =
        all_edges.difference(&shared_edges).cloned().collect();
    boundary_edges.sort_unstable();

    let is_watertight = adjacency.is_watertight();
    let winding_consistent = check_winding(&mesh.faces);

    let components = kernel.split_components(mesh)?;
    let component_face_counts: Vec<usize> =
        components.iter().map(|c| c.face_count()).collect();

    let (bounds_min, bounds_max) = match mesh.bounds() {
        Some((min, max)) => ([min.x, min.y, min.z], [max.x, max.y, max.z]),
        None => ([0.0; 3], [0.0; 3]),
    };

    let report = AnalysisReport {
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        unique_edge_count: adjacency.unique_edge_count(),
        edge_length,
        face_area,
        is_watertight,
        winding_consistent,
        long_edges,
        large_face_count,
        boundary_edges,
        component_face_counts,
        bounds_min,
        bounds_max,
        surface_area: mesh.surface_area(),
    };

    debug!(
        vertices = report.vertex_count,
        faces = report.face_count,
        edges = report.unique_edge_count,
        watertight = report.is_watertight,
        "mesh analyzed"
    );
    if !report.is_watertight {
        warn!(
            boundary_edges = report.boundary_edge_count(),
            "mesh is not watertight"
        );
    }
    if report.component_count() > 1 {
        warn!(
            components = report.component_count(),
            "mesh has multiple disconnected shells"
        );
    }

    Ok(report)
}

/// Check winding consistency: every edge shared by two faces must be
/// traversed in opposite directions by those faces.
fn check_winding(faces: &[[u32; 3]]) -> bool {
    let mut directed: HashMap<(u32, u32), usize> = HashMap::with_capacity(faces.len() * 3);
    for &[a, b, c] in faces {
        for (u, v) in [(a, b), (b, c), (c, a)] {
            *directed.entry((u, v)).or_insert(0) += 1;
        }
    }
    // A directed edge appearing twice means two faces traverse it the
    // same way, so their windings disagree.
    directed.values().all(|&count| count <= 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{single_triangle, unit_cube};
    use crate::types::Vertex;

    #[test]
    fn test_analyze_empty_mesh_fails() {
        let mesh = Mesh::new();
        let err = analyze(&mesh).unwrap_err();
        assert!(matches!(err, MeshError::EmptyMesh { .. }));
    }

    #[test]
    fn test_unit_cube_is_watertight() {
        let report = analyze(&unit_cube()).unwrap();
        assert_eq!(report.vertex_count, 8);
        assert_eq!(report.face_count, 12);
        assert_eq!(report.unique_edge_count, 18);
        assert!(report.is_watertight);
        assert!(report.winding_consistent);
        assert!(report.boundary_edges.is_empty());
        assert_eq!(report.component_count(), 1);
        assert!(report.is_print_ready());
    }

    #[test]
    fn test_cube_with_missing_face_has_three_boundary_edges() {
        let mut mesh = unit_cube();
        mesh.faces.pop();
        let report = analyze(&mesh).unwrap();
        assert!(!report.is_watertight);
        assert_eq!(report.boundary_edge_count(), 3);
        assert!(!report.is_print_ready());
    }

    #[test]
    fn test_single_triangle_boundary() {
        let report = analyze(&single_triangle()).unwrap();
        assert_eq!(report.boundary_edge_count(), 3);
        assert!(!report.is_watertight);
    }

    #[test]
    fn test_non_manifold_edge_is_not_boundary() {
        // Three triangles sharing edge (0,1): the shared edge has adjacent
        // face pairs, so it is interior despite being non-manifold. Only
        // the six single-face edges are boundary.
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.5, 1.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.5, 0.0, 1.0));
        mesh.vertices.push(Vertex::from_coords(0.5, -1.0, 0.0));
        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([1, 0, 3]);
        mesh.faces.push([0, 1, 4]);

        let report = analyze(&mesh).unwrap();
        assert!(!report.boundary_edges.contains(&(0, 1)));
        assert_eq!(report.boundary_edge_count(), 6);
        // The watertight flag still catches the defect.
        assert!(!report.is_watertight);
    }

    #[test]
    fn test_component_counts_come_from_the_kernel() {
        // A kernel that reports every face as its own shell; the report
        // must reflect its answer, not a fixed flood fill.
        struct FragmentingKernel;

        impl GeometryKernel for FragmentingKernel {
            fn load(&self, path: &std::path::Path) -> MeshResult<Mesh> {
                crate::kernel::BuiltinKernel.load(path)
            }
            fn repair(
                &self,
                mesh: Mesh,
            ) -> MeshResult<(Mesh, crate::repair::RepairSummary)> {
                crate::kernel::BuiltinKernel.repair(mesh)
            }
            fn smooth(&self, mesh: Mesh, iterations: u32) -> MeshResult<Mesh> {
                crate::kernel::BuiltinKernel.smooth(mesh, iterations)
            }
            fn decimate(&self, mesh: Mesh, target_faces: usize) -> MeshResult<Mesh> {
                crate::kernel::BuiltinKernel.decimate(mesh, target_faces)
            }
            fn split_components(&self, mesh: &Mesh) -> MeshResult<Vec<Mesh>> {
                Ok(mesh
                    .faces
                    .iter()
                    .map(|&[a, b, c]| {
                        let mut part = Mesh::new();
                        for idx in [a, b, c] {
                            part.vertices
                                .push(mesh.vertices[idx as usize].clone());
                        }
                        part.faces.push([0, 1, 2]);
                        part
                    })
                    .collect())
            }
            fn export(&self, mesh: &Mesh, path: &std::path::Path) -> MeshResult<()> {
                crate::kernel::BuiltinKernel.export(mesh, path)
            }
        }

        let report = analyze_with(&unit_cube(), &FragmentingKernel).unwrap();
        assert_eq!(report.component_count(), 12);
        assert_eq!(report.component_face_counts, vec![1; 12]);

        let report = analyze_with(&unit_cube(), &crate::kernel::BuiltinKernel).unwrap();
        assert_eq!(report.component_count(), 1);
    }

    #[test]
    fn test_inconsistent_winding_detected() {
        let mut mesh = unit_cube();
        mesh.faces[0].swap(1, 2);
        let report = analyze(&mesh).unwrap();
        assert!(!report.winding_consistent);
    }

    #[test]
    fn test_two_shells_reported() {
        let mut mesh = unit_cube();
        let offset = mesh.vertex_count() as u32;
        let other = unit_cube();
        for v in other.vertices {
            let mut v = v;
            v.position.x += 10.0;
            mesh.vertices.push(v);
        }
        for [a, b, c] in other.faces {
            mesh.faces.push([a + offset, b + offset, c + offset]);
        }
        let report = analyze(&mesh).unwrap();
        assert_eq!(report.component_count(), 2);
        assert_eq!(report.component_face_counts, vec![12, 12]);
        assert!(!report.is_print_ready());
    }

    #[test]
    fn test_uniform_edges_have_no_outliers() {
        // Cube edges come in two lengths (1 and sqrt(2)) but none exceed
        // mean + 3 sigma.
        let report = analyze(&unit_cube()).unwrap();
        assert_eq!(report.long_edge_count(), 0);
        assert_eq!(report.large_face_count, 0);
    }

    #[test]
    fn test_long_edge_outlier_flagged() {
        // Many tiny triangles plus one triangle with a very long edge.
        let mut mesh = Mesh::new();
        let mut next = 0u32;
        for i in 0..30 {
            let x = i as f64 * 0.01;
            mesh.vertices
                .push(crate::types::Vertex::from_coords(x, 0.0, 0.0));
            mesh.vertices
                .push(crate::types::Vertex::from_coords(x + 0.005, 0.01, 0.0));
            mesh.vertices
                .push(crate::types::Vertex::from_coords(x + 0.01, 0.0, 0.0));
            mesh.faces.push([next, next + 1, next + 2]);
            next += 3;
        }
        mesh.vertices
            .push(crate::types::Vertex::from_coords(0.0, 5.0, 0.0));
        mesh.vertices
            .push(crate::types::Vertex::from_coords(100.0, 5.0, 0.0));
        mesh.vertices
            .push(crate::types::Vertex::from_coords(0.0, 5.01, 0.0));
        mesh.faces.push([next, next + 1, next + 2]);

        let report = analyze(&mesh).unwrap();
        assert!(report.long_edge_count() >= 1);
        assert!(report.large_face_count >= 1);
    }
}
