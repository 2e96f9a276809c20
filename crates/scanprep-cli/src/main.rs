//! scanprep command-line interface.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use scanprep::{Axis, MeshError, PipelineConfig};
use tracing_subscriber::EnvFilter;

use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "scanprep",
    version,
    about = "Prepare 3D-scanned meshes for printing",
    long_about = "Diagnose, repair, simplify, scale, and place scanned triangle \
                  meshes, one file at a time or across a directory."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for command results.
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Suppress all log output.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// Pipeline step flags shared by process and batch.
#[derive(Debug, Args)]
pub struct PipelineArgs {
    /// Weld vertices, drop degenerate faces, fill holes.
    #[arg(long)]
    repair: bool,

    /// Laplacian smoothing iterations.
    #[arg(long, value_name = "N")]
    smooth: Option<u32>,

    /// Reduce to at most this many faces.
    #[arg(long, value_name = "FACES")]
    reduce: Option<usize>,

    /// Scale so the chosen axis spans this many millimeters.
    #[arg(long, value_name = "MM")]
    scale: Option<f64>,

    /// Axis for --scale: x, y, z, or auto (largest extent).
    #[arg(long, default_value = "auto")]
    axis: Axis,

    /// Center on the bed: X/Y around the origin, resting on Z = 0.
    #[arg(long)]
    center: bool,
}

impl PipelineArgs {
    pub fn to_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::new()
            .with_repair(self.repair)
            .with_centering(self.center);
        if let Some(iterations) = self.smooth {
            config = config.with_smoothing(iterations);
        }
        if let Some(target) = self.reduce {
            config = config.with_target_faces(target);
        }
        if let Some(size) = self.scale {
            config = config.with_target_size(size, self.axis);
        }
        config
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze a mesh and report structural diagnostics.
    Inspect {
        /// Input mesh file (STL, OBJ, or PLY).
        input: PathBuf,
    },

    /// Process a single mesh through the preparation pipeline.
    Process {
        /// Input mesh file.
        input: PathBuf,

        /// Output path; defaults to `<stem>_processed.stl` next to the
        /// input. A missing extension defaults to .stl.
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Process every matching mesh in a directory.
    Batch {
        /// Directory of input meshes.
        input_dir: PathBuf,

        /// Directory for outputs; created if missing.
        output_dir: PathBuf,

        /// Filename pattern (glob-style, * and ?).
        #[arg(long, default_value = "*.stl")]
        pattern: String,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Prepare a mesh for a 4x4x4 inch print bed: repair if needed,
    /// cap the largest axis at 100 mm, center. Writes
    /// `<stem>_4x4_ready.stl`.
    Bed {
        /// Input mesh file.
        input: PathBuf,

        /// Optional smoothing iterations before scaling.
        #[arg(long, value_name = "N")]
        smooth: Option<u32>,
    },

    /// Scale a mesh so one axis spans an exact size, then center it.
    /// Writes `<stem>_<size>mm.stl`.
    Scale {
        /// Input mesh file.
        input: PathBuf,

        /// Target size in millimeters.
        #[arg(long, value_name = "MM")]
        size: f64,

        /// Axis to size: x, y, z, or auto (largest extent).
        #[arg(long, default_value = "auto")]
        axis: Axis,

        /// Optional smoothing iterations before scaling.
        #[arg(long, value_name = "N")]
        smooth: Option<u32>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(err) = run(&cli) {
        report_error(err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Inspect { input } => commands::inspect::run(input, cli),
        Commands::Process {
            input,
            output,
            pipeline,
        } => commands::process::run(input, output.as_deref(), pipeline, cli),
        Commands::Batch {
            input_dir,
            output_dir,
            pattern,
            pipeline,
        } => commands::batch::run(input_dir, output_dir, pattern, pipeline, cli),
        Commands::Bed { input, smooth } => commands::bed::run(input, *smooth, cli),
        Commands::Scale {
            input,
            size,
            axis,
            smooth,
        } => commands::scale::run(input, *size, *axis, *smooth, cli),
    }
}

fn report_error(err: anyhow::Error) {
    match err.downcast::<MeshError>() {
        Ok(mesh_err) => eprintln!("{:?}", miette::Report::new(mesh_err)),
        Err(other) => eprintln!("{} {other:#}", "error:".red().bold()),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
