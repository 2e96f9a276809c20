//! `scanprep process` - run the pipeline over a single mesh.

use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use scanprep::export::with_default_extension;
use scanprep::{run_pipeline, BuiltinKernel, GeometryKernel, StepRecord};
use serde::Serialize;

use crate::output::{emit, OutputFormat};
use crate::{Cli, PipelineArgs};

#[derive(Debug, Serialize)]
struct ProcessResult {
    input: PathBuf,
    output: Option<PathBuf>,
    faces_before: usize,
    faces_after: usize,
    steps: Vec<StepRecord>,
}

pub fn run(
    input: &Path,
    output: Option<&Path>,
    pipeline: &PipelineArgs,
    cli: &Cli,
) -> Result<()> {
    let kernel = BuiltinKernel::new();
    let mesh = kernel.load(input)?;
    let faces_before = mesh.face_count();

    let config = pipeline.to_config();

    // With no steps requested, fall back to a plain analysis report.
    if config.is_empty() {
        let report = mesh.analyze()?;
        let text = match cli.format() {
            OutputFormat::Json => String::new(),
            OutputFormat::Text => format!(
                "no pipeline steps requested; analysis only\n{report}"
            ),
        };
        return emit(cli.format(), &text, &report);
    }

    let outcome = run_pipeline(mesh, &config, &kernel)?;

    let output_path = match output {
        Some(path) => with_default_extension(path),
        None => default_output_path(input),
    };
    scanprep::export::export_mesh(&kernel, &outcome.mesh, &output_path)?;

    let result = ProcessResult {
        input: input.to_path_buf(),
        output: Some(output_path.clone()),
        faces_before,
        faces_after: outcome.mesh.face_count(),
        steps: outcome.steps,
    };

    let text = match cli.format() {
        OutputFormat::Json => String::new(),
        OutputFormat::Text => {
            let mut lines = vec![format!(
                "{} {} ({} -> {} faces)",
                "processed".green().bold(),
                input.display(),
                result.faces_before,
                result.faces_after
            )];
            for step in &result.steps {
                let status = if step.applied { "applied" } else { "skipped" };
                lines.push(format!("  {:?}: {status} ({})", step.step, step.detail));
            }
            lines.push(format!("  wrote {}", output_path.display()));
            lines.join("\n")
        }
    };

    emit(cli.format(), &text, &result)
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    input.with_file_name(format!("{stem}_processed.stl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/scans/skull.stl")),
            PathBuf::from("/scans/skull_processed.stl")
        );
    }
}
