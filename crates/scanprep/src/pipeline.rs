//! The print-preparation pipeline.
//!
//! Steps always run in one fixed order: repair, smooth, reduce, scale,
//! center-on-bed. Repairing first keeps the later geometric steps honest;
//! scaling before centering means bed placement is done in final units.
//! The order is part of the type's contract, not a configuration knob.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{MeshError, MeshResult};
use crate::kernel::GeometryKernel;
use crate::types::Mesh;

/// Scaling axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
    /// Pick the axis with the largest extent; ties resolve X, then Y,
    /// then Z.
    #[default]
    Auto,
}

impl Axis {
    /// Resolve to a concrete axis index given the mesh extents.
    pub fn resolve(&self, extents: &[f64; 3]) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
            Axis::Auto => {
                let mut best = 0;
                for i in 1..3 {
                    // Strict comparison keeps the lowest index on ties.
                    if extents[i] > extents[best] {
                        best = i;
                    }
                }
                best
            }
        }
    }

    pub fn name(index: usize) -> &'static str {
        match index {
            0 => "X",
            1 => "Y",
            _ => "Z",
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
            Axis::Auto => "auto",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            "auto" => Ok(Axis::Auto),
            other => Err(format!("unknown axis '{other}', expected x, y, z, or auto")),
        }
    }
}

/// What to run, with what parameters. Construct with the builder methods;
/// the config is immutable once handed to [`run_pipeline`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Weld, drop degenerates, fill holes.
    pub repair: bool,

    /// Laplacian smoothing iterations; `None` skips the step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smooth_iterations: Option<u32>,

    /// Decimation target; `None` skips the step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_faces: Option<usize>,

    /// Scale so the chosen axis spans this many millimeters; `None`
    /// skips the step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_size: Option<f64>,

    /// Axis for the scale step.
    pub axis: Axis,

    /// Center X/Y on the origin and rest the mesh on Z = 0.
    pub center_on_bed: bool,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repair(mut self, repair: bool) -> Self {
        self.repair = repair;
        self
    }

    pub fn with_smoothing(mut self, iterations: u32) -> Self {
        self.smooth_iterations = Some(iterations);
        self
    }

    pub fn with_target_faces(mut self, target: usize) -> Self {
        self.target_faces = Some(target);
        self
    }

    pub fn with_target_size(mut self, size: f64, axis: Axis) -> Self {
        self.target_size = Some(size);
        self.axis = axis;
        self
    }

    pub fn with_centering(mut self, center: bool) -> Self {
        self.center_on_bed = center;
        self
    }

    /// True when no step is enabled.
    pub fn is_empty(&self) -> bool {
        !self.repair
            && self.smooth_iterations.is_none()
            && self.target_faces.is_none()
            && self.target_size.is_none()
            && !self.center_on_bed
    }
}

/// Pipeline step identifiers, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Repair,
    Smooth,
    Reduce,
    Scale,
    Center,
}

/// One step's outcome in the pipeline log.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: StepKind,
    pub applied: bool,
    pub detail: String,
}

impl StepRecord {
    fn applied(step: StepKind, detail: impl Into<String>) -> Self {
        Self {
            step,
            applied: true,
            detail: detail.into(),
        }
    }

    fn skipped(step: StepKind, detail: impl Into<String>) -> Self {
        Self {
            step,
            applied: false,
            detail: detail.into(),
        }
    }
}

/// Result of a full pipeline run.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub mesh: Mesh,
    pub steps: Vec<StepRecord>,
}

/// Run the configured steps over the mesh in the fixed order.
///
/// The first failing step aborts the run; the mesh state from earlier
/// steps is discarded with it.
pub fn run_pipeline<K: GeometryKernel>(
    mesh: Mesh,
    config: &PipelineConfig,
    kernel: &K,
) -> MeshResult<PipelineOutcome> {
    if mesh.is_empty() {
        return Err(MeshError::empty_mesh("pipeline input has no faces"));
    }

    let mut mesh = mesh;
    let mut steps = Vec::new();

    if config.repair {
        let (repaired, summary) = kernel.repair(mesh).map_err(wrap_kernel("repair"))?;
        mesh = repaired;
        steps.push(StepRecord::applied(
            StepKind::Repair,
            format!(
                "welded {}, removed {} degenerate, filled {} holes",
                summary.vertices_welded,
                summary.degenerate_faces_removed,
                summary.holes_filled
            ),
        ));
    }

    if let Some(iterations) = config.smooth_iterations {
        if iterations == 0 {
            steps.push(StepRecord::skipped(
                StepKind::Smooth,
                "0 iterations requested",
            ));
        } else {
            mesh = kernel
                .smooth(mesh, iterations)
                .map_err(wrap_kernel("smooth"))?;
            steps.push(StepRecord::applied(
                StepKind::Smooth,
                format!("{iterations} iterations"),
            ));
        }
    }

    if let Some(target) = config.target_faces {
        let current = mesh.face_count();
        if current <= target {
            // Reducing is only ever a simplification; at or under target
            // the step reports itself skipped rather than failing.
            debug!(current, target, "reduce skipped, already at or below target");
            steps.push(StepRecord::skipped(
                StepKind::Reduce,
                format!("{current} faces already at or below target {target}"),
            ));
        } else {
            mesh = kernel
                .decimate(mesh, target)
                .map_err(wrap_kernel("decimate"))?;
            steps.push(StepRecord::applied(
                StepKind::Reduce,
                format!("{} -> {} faces (target {})", current, mesh.face_count(), target),
            ));
        }
    }

    if let Some(target_size) = config.target_size {
        let (scaled, axis_index, factor) = scale_to_size(mesh, target_size, config.axis)?;
        mesh = scaled;
        steps.push(StepRecord::applied(
            StepKind::Scale,
            format!(
                "{} axis to {target_size} mm (factor {factor:.4})",
                Axis::name(axis_index)
            ),
        ));
    }

    if config.center_on_bed {
        mesh = center_on_bed(mesh);
        steps.push(StepRecord::applied(
            StepKind::Center,
            "centered on bed at Z = 0",
        ));
    }

    info!(steps = steps.len(), faces = mesh.face_count(), "pipeline complete");
    Ok(PipelineOutcome { mesh, steps })
}

fn wrap_kernel(operation: &'static str) -> impl Fn(MeshError) -> MeshError {
    move |err| match err {
        // Kernel failures keep their own codes when they are already
        // specific; only generic failures get wrapped.
        e @ MeshError::EmptyMesh { .. } => e,
        e => MeshError::kernel_failure(operation, e.to_string()),
    }
}

/// Scale the mesh uniformly so the chosen axis spans `target_size`.
///
/// Returns the scaled mesh, the resolved axis index, and the factor used.
/// Fails with [`MeshError::DegenerateExtent`] before touching any vertex
/// when the chosen axis has zero extent, so output can never be NaN.
pub fn scale_to_size(
    mut mesh: Mesh,
    target_size: f64,
    axis: Axis,
) -> MeshResult<(Mesh, usize, f64)> {
    let extents = mesh.extents();
    let axis_index = axis.resolve(&extents);
    let extent = extents[axis_index];

    if extent <= 0.0 {
        return Err(MeshError::DegenerateExtent {
            axis: Axis::name(axis_index),
        });
    }

    let factor = target_size / extent;
    mesh.scale(factor);

    debug!(
        axis = Axis::name(axis_index),
        extent,
        target = target_size,
        factor,
        "scaled mesh"
    );
    Ok((mesh, axis_index, factor))
}

/// Center the mesh over the origin in X/Y and rest it on the Z = 0 plane.
/// Applying it twice is the same as applying it once.
pub fn center_on_bed(mut mesh: Mesh) -> Mesh {
    let Some((min, max)) = mesh.bounds() else {
        return mesh;
    };

    let offset = nalgebra::Vector3::new(
        -(min.x + max.x) / 2.0,
        -(min.y + max.y) / 2.0,
        -min.z,
    );
    mesh.translate(offset);
    mesh
}
