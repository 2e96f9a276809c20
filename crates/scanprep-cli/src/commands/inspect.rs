//! `scanprep inspect` - diagnostic report for one mesh.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use scanprep::Mesh;

use crate::output::{emit, OutputFormat};
use crate::Cli;

pub fn run(input: &Path, cli: &Cli) -> Result<()> {
    let mesh = Mesh::load(input)?;
    let report = mesh.analyze()?;

    let text = match cli.format() {
        OutputFormat::Json => String::new(),
        OutputFormat::Text => {
            let verdict = if report.is_print_ready() {
                "print-ready".green().bold().to_string()
            } else {
                "needs repair".yellow().bold().to_string()
            };
            format!("{}\n{report}\n  Verdict:        {verdict}", input.display())
        }
    };

    emit(cli.format(), &text, &report)
}
