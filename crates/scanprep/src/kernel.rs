//! Geometry kernel capability contract.
//!
//! The pipeline and batch runner only speak this trait; heavy geometry
//! work is swappable without touching orchestration code. The built-in
//! kernel keeps the crate usable stand-alone.

use std::path::Path;

use crate::components::split_into_components;
use crate::decimate::decimate_mesh;
use crate::error::MeshResult;
use crate::io::{load_mesh, save_mesh};
use crate::repair::{repair_mesh, RepairSummary};
use crate::smooth::smooth_mesh;
use crate::types::Mesh;

/// Geometry operations the pipeline delegates.
///
/// Implementations own all mesh-level algorithms and serialization; the
/// caller owns ordering, error policy, and reporting.
pub trait GeometryKernel {
    /// Load a mesh from disk, format detected from the extension.
    fn load(&self, path: &Path) -> MeshResult<Mesh>;

    /// Repair the mesh: weld, drop degenerates, fill holes. Returns the
    /// repaired mesh and what changed.
    fn repair(&self, mesh: Mesh) -> MeshResult<(Mesh, RepairSummary)>;

    /// Smooth the mesh for the given number of iterations.
    fn smooth(&self, mesh: Mesh, iterations: u32) -> MeshResult<Mesh>;

    /// Reduce the mesh toward a target face count. Must return the mesh
    /// unchanged when it is already at or below the target.
    fn decimate(&self, mesh: Mesh, target_faces: usize) -> MeshResult<Mesh>;

    /// Split into connected shells, largest first.
    fn split_components(&self, mesh: &Mesh) -> MeshResult<Vec<Mesh>>;

    /// Serialize the mesh to disk, format detected from the extension.
    fn export(&self, mesh: &Mesh, path: &Path) -> MeshResult<()>;
}

/// The default pure-Rust kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinKernel;

impl BuiltinKernel {
    pub fn new() -> Self {
        Self
    }
}

impl GeometryKernel for BuiltinKernel {
    fn load(&self, path: &Path) -> MeshResult<Mesh> {
        load_mesh(path)
    }

    fn repair(&self, mesh: Mesh) -> MeshResult<(Mesh, RepairSummary)> {
        repair_mesh(mesh)
    }

    fn smooth(&self, mesh: Mesh, iterations: u32) -> MeshResult<Mesh> {
        smooth_mesh(mesh, iterations)
    }

    fn decimate(&self, mesh: Mesh, target_faces: usize) -> MeshResult<Mesh> {
        decimate_mesh(mesh, target_faces)
    }

    fn split_components(&self, mesh: &Mesh) -> MeshResult<Vec<Mesh>> {
        Ok(split_into_components(mesh))
    }

    fn export(&self, mesh: &Mesh, path: &Path) -> MeshResult<()> {
        save_mesh(mesh, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::unit_cube;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_kernel_round_trip() {
        let kernel = BuiltinKernel::new();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cube.stl");

        kernel.export(&unit_cube(), &path).unwrap();
        let loaded = kernel.load(&path).unwrap();
        assert_eq!(loaded.face_count(), 12);
    }

    #[test]
    fn test_builtin_kernel_repair_fills_hole() {
        let kernel = BuiltinKernel::new();
        let mut mesh = unit_cube();
        mesh.faces.pop();
        let (repaired, summary) = kernel.repair(mesh).unwrap();
        assert_eq!(summary.holes_filled, 1);
        assert_eq!(repaired.face_count(), 12);
    }

    #[test]
    fn test_builtin_kernel_split() {
        let kernel = BuiltinKernel::new();
        let parts = kernel.split_components(&unit_cube()).unwrap();
        assert_eq!(parts.len(), 1);
    }
}
