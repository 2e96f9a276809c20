//! CLI subcommand implementations.

pub mod batch;
pub mod bed;
pub mod inspect;
pub mod process;
pub mod scale;
