//! Output format handling for command results.

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

/// How command results are rendered on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Print a result in the selected format: the pre-rendered text for
/// humans, or the serialized value for tooling.
pub fn emit<T: Serialize>(format: OutputFormat, text: &str, value: &T) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{text}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
