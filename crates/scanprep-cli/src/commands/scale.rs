//! `scanprep scale` - size a mesh to an exact dimension.

use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use scanprep::export::{export_mesh, sized_output_path};
use scanprep::{run_pipeline, Axis, BuiltinKernel, GeometryKernel, PipelineConfig};
use serde::Serialize;

use crate::output::{emit, OutputFormat};
use crate::Cli;

#[derive(Debug, Serialize)]
struct ScaleResult {
    input: PathBuf,
    output: PathBuf,
    target_mm: f64,
    axis: String,
    repaired: bool,
    extents_mm: [f64; 3],
}

pub fn run(input: &Path, size: f64, axis: Axis, smooth: Option<u32>, cli: &Cli) -> Result<()> {
    if size <= 0.0 {
        anyhow::bail!("target size must be positive, got {size}");
    }

    let kernel = BuiltinKernel::new();
    let mesh = kernel.load(input)?;
    let report = mesh.analyze()?;
    let needs_repair = !report.is_watertight;

    let mut config = PipelineConfig::new()
        .with_repair(needs_repair)
        .with_target_size(size, axis)
        .with_centering(true);
    if let Some(iterations) = smooth {
        config = config.with_smoothing(iterations);
    }

    let outcome = run_pipeline(mesh, &config, &kernel)?;

    let output = sized_output_path(input, size);
    export_mesh(&kernel, &outcome.mesh, &output)?;

    let result = ScaleResult {
        input: input.to_path_buf(),
        output: output.clone(),
        target_mm: size,
        axis: axis.to_string(),
        repaired: needs_repair,
        extents_mm: outcome.mesh.extents(),
    };

    let text = match cli.format() {
        OutputFormat::Json => String::new(),
        OutputFormat::Text => {
            let [x, y, z] = result.extents_mm;
            format!(
                "{} {} to {} mm ({} axis)\n  repaired: {}\n  extents: {x:.1} x {y:.1} x {z:.1} mm\n  wrote {}",
                "scaled".green().bold(),
                input.display(),
                size,
                result.axis,
                if result.repaired { "yes" } else { "not needed" },
                output.display()
            )
        }
    };

    emit(cli.format(), &text, &result)
}
