//! Batch processing: run one pipeline configuration over a directory.
//!
//! One bad scan must never sink the rest of the batch, so per-file errors
//! are recorded and processing moves on. Only configuration problems
//! (missing directory, nothing to do) abort before the first file.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::{MeshError, MeshResult};
use crate::export::{batch_output_path, export_mesh};
use crate::kernel::GeometryKernel;
use crate::pipeline::{run_pipeline, PipelineConfig};

/// Cooperative cancellation flag, checked between files.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The file currently in flight finishes;
    /// no further file is started.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Outcome for one input file.
#[derive(Debug)]
pub enum FileOutcome {
    Success { input: PathBuf, output: PathBuf },
    Failure { input: PathBuf, error: MeshError },
}

impl FileOutcome {
    pub fn input(&self) -> &Path {
        match self {
            FileOutcome::Success { input, .. } => input,
            FileOutcome::Failure { input, .. } => input,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Success { .. })
    }
}

/// Accumulated results of a batch run, in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,

    /// True when the run stopped early because of cancellation.
    pub cancelled: bool,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

/// Match a filename against a glob-style pattern with `*` and `?`.
/// Matching is case-insensitive, since scanner software is inconsistent
/// about extension casing.
pub fn matches_pattern(name: &str, pattern: &str) -> bool {
    let name: Vec<char> = name.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    glob_match(&name, &pattern)
}

fn glob_match(name: &[char], pattern: &[char]) -> bool {
    match pattern.split_first() {
        None => name.is_empty(),
        Some(('*', rest)) => {
            (0..=name.len()).any(|skip| glob_match(&name[skip..], rest))
        }
        Some(('?', rest)) => match name.split_first() {
            Some((_, name_rest)) => glob_match(name_rest, rest),
            None => false,
        },
        Some((&c, rest)) => match name.split_first() {
            Some((&n, name_rest)) if n == c => glob_match(name_rest, rest),
            _ => false,
        },
    }
}

/// Find files under `input_dir` matching `pattern`, sorted by filename
/// so runs are reproducible regardless of filesystem order.
pub fn discover_files(input_dir: &Path, pattern: &str) -> MeshResult<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Err(MeshError::InputDirNotFound {
            path: input_dir.to_path_buf(),
        });
    }

    let entries =
        std::fs::read_dir(input_dir).map_err(|e| MeshError::io_read(input_dir, e))?;

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| MeshError::io_read(input_dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if matches_pattern(name, pattern) {
            files.push(path);
        }
    }

    files.sort();

    if files.is_empty() {
        return Err(MeshError::NoMatchingFiles {
            path: input_dir.to_path_buf(),
            pattern: pattern.to_string(),
        });
    }

    Ok(files)
}

/// Run the pipeline over every matching file in `input_dir`, writing
/// results under `output_dir` with unchanged filenames.
///
/// Per-file failures are recorded in the report and never abort the run.
/// The cancel token is checked between files.
pub fn run_batch<K: GeometryKernel>(
    input_dir: &Path,
    output_dir: &Path,
    pattern: &str,
    config: &PipelineConfig,
    kernel: &K,
    cancel: &CancelToken,
) -> MeshResult<BatchReport> {
    let files = discover_files(input_dir, pattern)?;

    std::fs::create_dir_all(output_dir).map_err(|e| MeshError::io_write(output_dir, e))?;

    info!(
        count = files.len(),
        input = %input_dir.display(),
        output = %output_dir.display(),
        "starting batch"
    );

    let mut report = BatchReport::default();

    for input in files {
        if cancel.is_cancelled() {
            warn!(
                processed = report.total(),
                "batch cancelled before next file"
            );
            report.cancelled = true;
            break;
        }

        match process_one(&input, output_dir, config, kernel) {
            Ok(output) => {
                info!(input = %input.display(), output = %output.display(), "file done");
                report.outcomes.push(FileOutcome::Success { input, output });
            }
            Err(err) => {
                error!(input = %input.display(), error = %err, "file failed");
                report.outcomes.push(FileOutcome::Failure { input, error: err });
            }
        }
    }

    info!(
        succeeded = report.success_count(),
        failed = report.failure_count(),
        "batch complete"
    );
    Ok(report)
}

fn process_one<K: GeometryKernel>(
    input: &Path,
    output_dir: &Path,
    config: &PipelineConfig,
    kernel: &K,
) -> MeshResult<PathBuf> {
    let mesh = kernel.load(input)?;
    let outcome = run_pipeline(mesh, config, kernel)?;
    let output = batch_output_path(output_dir, input);
    export_mesh(kernel, &outcome.mesh, &output)?;
    Ok(output)
}
