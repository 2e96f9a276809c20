//! scanprep: prepare 3D-scanned surface meshes for printing.
//!
//! Scanned meshes arrive with holes, sliver triangles, duplicate
//! vertices, and stray shells. This crate diagnoses those defects,
//! repairs and simplifies the geometry, normalizes scale, and places the
//! result on the print bed, for one file or a whole directory.
//!
//! The high-level flow:
//!
//! - [`analyze::analyze`] produces a read-only [`analyze::AnalysisReport`].
//! - [`pipeline::run_pipeline`] applies the configured steps in a fixed
//!   order: repair, smooth, reduce, scale, center-on-bed.
//! - [`batch::run_batch`] maps one [`pipeline::PipelineConfig`] over a
//!   directory with per-file failure isolation.
//! - [`kernel::GeometryKernel`] is the seam between orchestration and
//!   geometry; [`kernel::BuiltinKernel`] is the default implementation.

pub mod adjacency;
pub mod analyze;
pub mod batch;
pub mod components;
pub mod decimate;
pub mod error;
pub mod export;
pub mod io;
pub mod kernel;
pub mod pipeline;
pub mod repair;
pub mod smooth;
pub mod types;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use analyze::{analyze, analyze_with, AnalysisReport};
pub use batch::{run_batch, BatchReport, CancelToken, FileOutcome};
pub use error::{ErrorCode, MeshError, MeshResult};
pub use export::{batch_output_path, bed_ready_output_path, sized_output_path};
pub use kernel::{BuiltinKernel, GeometryKernel};
pub use pipeline::{
    center_on_bed, run_pipeline, scale_to_size, Axis, PipelineConfig, PipelineOutcome,
    StepKind, StepRecord,
};
pub use types::{Mesh, Triangle, Vertex};

use std::path::Path;

impl Mesh {
    /// Load a mesh from disk, format detected from the extension.
    pub fn load(path: impl AsRef<Path>) -> MeshResult<Self> {
        io::load_mesh(path.as_ref())
    }

    /// Save the mesh to disk, format detected from the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> MeshResult<()> {
        io::save_mesh(self, path.as_ref())
    }

    /// Produce a diagnostic report for this mesh.
    pub fn analyze(&self) -> MeshResult<AnalysisReport> {
        analyze::analyze(self)
    }

    /// Split into connected shells, largest first.
    pub fn split_components(&self) -> Vec<Mesh> {
        components::split_into_components(self)
    }
}
