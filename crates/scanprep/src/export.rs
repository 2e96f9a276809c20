//! Export stage: output naming conventions and final serialization.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::MeshResult;
use crate::kernel::GeometryKernel;
use crate::types::Mesh;

/// Suffix appended by the bed-preparation workflow.
const BED_READY_SUFFIX: &str = "_4x4_ready";

/// Give a path the default `.stl` extension when it has none.
pub fn with_default_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("stl")
    }
}

/// Output name for the size-to-target workflow: `<stem>_<size>mm.stl`
/// next to the input file.
pub fn sized_output_path(input: &Path, size_mm: f64) -> PathBuf {
    let stem = file_stem(input);
    input.with_file_name(format!("{stem}_{}mm.stl", format_size(size_mm)))
}

/// Output name for the bed-preparation workflow: `<stem>_4x4_ready.stl`
/// next to the input file.
pub fn bed_ready_output_path(input: &Path) -> PathBuf {
    let stem = file_stem(input);
    input.with_file_name(format!("{stem}{BED_READY_SUFFIX}.stl"))
}

/// Output name for the batch workflow: the input's filename under the
/// output directory.
pub fn batch_output_path(output_dir: &Path, input: &Path) -> PathBuf {
    match input.file_name() {
        Some(name) => output_dir.join(name),
        None => output_dir.join("output.stl"),
    }
}

/// Render a size for a filename: whole millimeters lose the decimal
/// point, fractional ones keep it.
fn format_size(size_mm: f64) -> String {
    if size_mm.fract() == 0.0 {
        format!("{}", size_mm as i64)
    } else {
        format!("{size_mm}")
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Serialize the mesh through the kernel.
///
/// On failure any partially written file is removed, so downstream
/// tooling never sees a truncated mesh.
pub fn export_mesh<K: GeometryKernel>(kernel: &K, mesh: &Mesh, path: &Path) -> MeshResult<()> {
    debug!(path = %path.display(), "exporting mesh");
    match kernel.export(mesh, path) {
        Ok(()) => Ok(()),
        Err(err) => {
            if path.exists() {
                if let Err(rm) = std::fs::remove_file(path) {
                    warn!(
                        path = %path.display(),
                        error = %rm,
                        "failed to remove incomplete output"
                    );
                }
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extension() {
        assert_eq!(
            with_default_extension(Path::new("/out/scan")),
            PathBuf::from("/out/scan.stl")
        );
        assert_eq!(
            with_default_extension(Path::new("/out/scan.obj")),
            PathBuf::from("/out/scan.obj")
        );
    }

    #[test]
    fn test_sized_output_path() {
        assert_eq!(
            sized_output_path(Path::new("/scans/skull.stl"), 100.0),
            PathBuf::from("/scans/skull_100mm.stl")
        );
        assert_eq!(
            sized_output_path(Path::new("/scans/skull.ply"), 50.5),
            PathBuf::from("/scans/skull_50.5mm.stl")
        );
    }

    #[test]
    fn test_bed_ready_output_path() {
        assert_eq!(
            bed_ready_output_path(Path::new("/scans/skull.stl")),
            PathBuf::from("/scans/skull_4x4_ready.stl")
        );
    }

    #[test]
    fn test_batch_output_path() {
        assert_eq!(
            batch_output_path(Path::new("/out"), Path::new("/in/scan.stl")),
            PathBuf::from("/out/scan.stl")
        );
    }
}
