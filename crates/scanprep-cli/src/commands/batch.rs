//! `scanprep batch` - run the pipeline over a directory of meshes.

use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use scanprep::{run_batch, BuiltinKernel, CancelToken, FileOutcome};
use serde::Serialize;

use crate::output::{emit, OutputFormat};
use crate::{Cli, PipelineArgs};

#[derive(Debug, Serialize)]
struct BatchResult {
    input_dir: PathBuf,
    output_dir: PathBuf,
    pattern: String,
    succeeded: usize,
    failed: usize,
    cancelled: bool,
    files: Vec<FileResult>,
}

#[derive(Debug, Serialize)]
struct FileResult {
    input: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<String>,
}

pub fn run(
    input_dir: &Path,
    output_dir: &Path,
    pattern: &str,
    pipeline: &PipelineArgs,
    cli: &Cli,
) -> Result<()> {
    let config = pipeline.to_config();
    let kernel = BuiltinKernel::new();
    let cancel = CancelToken::new();

    // Fatal configuration errors (missing dir, no matches) propagate;
    // per-file failures are already inside the report.
    let report = run_batch(input_dir, output_dir, pattern, &config, &kernel, &cancel)?;

    let files: Vec<FileResult> = report
        .outcomes
        .iter()
        .map(|outcome| match outcome {
            FileOutcome::Success { input, output } => FileResult {
                input: input.clone(),
                output: Some(output.clone()),
                error: None,
                error_code: None,
            },
            FileOutcome::Failure { input, error } => FileResult {
                input: input.clone(),
                output: None,
                error: Some(error.to_string()),
                error_code: Some(error.error_code().as_str().to_string()),
            },
        })
        .collect();

    let result = BatchResult {
        input_dir: input_dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        pattern: pattern.to_string(),
        succeeded: report.success_count(),
        failed: report.failure_count(),
        cancelled: report.cancelled,
        files,
    };

    let text = match cli.format() {
        OutputFormat::Json => String::new(),
        OutputFormat::Text => {
            let mut lines = Vec::new();
            for file in &result.files {
                match (&file.output, &file.error) {
                    (Some(output), _) => lines.push(format!(
                        "  {} {} -> {}",
                        "ok".green(),
                        file.input.display(),
                        output.display()
                    )),
                    (None, Some(error)) => lines.push(format!(
                        "  {} {}: {}",
                        "failed".red(),
                        file.input.display(),
                        error
                    )),
                    (None, None) => {}
                }
            }
            let summary = format!(
                "{}: {} succeeded, {} failed",
                "batch complete".bold(),
                result.succeeded,
                result.failed
            );
            lines.push(summary);
            lines.join("\n")
        }
    };

    emit(cli.format(), &text, &result)
}
