//! `scanprep bed` - prepare a mesh for a 4x4x4 inch print bed.

use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use scanprep::export::{bed_ready_output_path, export_mesh};
use scanprep::{run_pipeline, Axis, BuiltinKernel, GeometryKernel, PipelineConfig};
use serde::Serialize;

use crate::output::{emit, OutputFormat};
use crate::Cli;

/// Largest extent allowed on the bed, in millimeters. 100 mm leaves
/// margin inside the 101.6 mm (4 inch) working volume.
const BED_TARGET_MM: f64 = 100.0;

#[derive(Debug, Serialize)]
struct BedResult {
    input: PathBuf,
    output: PathBuf,
    repaired: bool,
    scaled: bool,
    extents_mm: [f64; 3],
}

pub fn run(input: &Path, smooth: Option<u32>, cli: &Cli) -> Result<()> {
    let kernel = BuiltinKernel::new();
    let mesh = kernel.load(input)?;
    let report = mesh.analyze()?;

    // Only fit-to-bed when the mesh is actually too big; a small scan
    // is never upscaled.
    let largest = mesh.extents().iter().cloned().fold(0.0, f64::max);
    let needs_scaling = largest > BED_TARGET_MM;
    let needs_repair = !report.is_watertight;

    let mut config = PipelineConfig::new()
        .with_repair(needs_repair)
        .with_centering(true);
    if let Some(iterations) = smooth {
        config = config.with_smoothing(iterations);
    }
    if needs_scaling {
        config = config.with_target_size(BED_TARGET_MM, Axis::Auto);
    }

    let outcome = run_pipeline(mesh, &config, &kernel)?;

    let output = bed_ready_output_path(input);
    export_mesh(&kernel, &outcome.mesh, &output)?;

    let result = BedResult {
        input: input.to_path_buf(),
        output: output.clone(),
        repaired: needs_repair,
        scaled: needs_scaling,
        extents_mm: outcome.mesh.extents(),
    };

    let text = match cli.format() {
        OutputFormat::Json => String::new(),
        OutputFormat::Text => {
            let [x, y, z] = result.extents_mm;
            format!(
                "{} {}\n  repaired: {}\n  scaled: {}\n  extents: {x:.1} x {y:.1} x {z:.1} mm\n  wrote {}",
                "bed-ready".green().bold(),
                input.display(),
                if result.repaired { "yes" } else { "not needed" },
                if result.scaled { "yes" } else { "already fits" },
                output.display()
            )
        }
    };

    emit(cli.format(), &text, &result)
}
