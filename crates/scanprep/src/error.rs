//! Error types for mesh preparation operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Machine-readable error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    IoRead,
    IoWrite,
    ParseError,
    UnsupportedFormat,
    EmptyMesh,
    DegenerateExtent,
    KernelFailure,
    InputDirNotFound,
    NoMatchingFiles,
}

impl ErrorCode {
    /// Stable string form of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::IoRead => "PREP-0001",
            ErrorCode::IoWrite => "PREP-0002",
            ErrorCode::ParseError => "PREP-0003",
            ErrorCode::UnsupportedFormat => "PREP-0004",
            ErrorCode::EmptyMesh => "PREP-0005",
            ErrorCode::DegenerateExtent => "PREP-0006",
            ErrorCode::KernelFailure => "PREP-0007",
            ErrorCode::InputDirNotFound => "PREP-0008",
            ErrorCode::NoMatchingFiles => "PREP-0009",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during mesh loading, analysis, transformation,
/// and export.
#[derive(Debug, Error, Diagnostic)]
pub enum MeshError {
    /// Failed to read a mesh file. Covers both missing files and
    /// permission/hardware read failures.
    #[error("failed to read mesh file: {path}")]
    #[diagnostic(
        code(scanprep::io_read),
        help("check that the file exists and is readable")
    )]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a mesh file.
    #[error("failed to write mesh file: {path}")]
    #[diagnostic(
        code(scanprep::io_write),
        help("check that the output directory exists and is writable")
    )]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but its contents could not be parsed as a mesh.
    #[error("failed to parse mesh file: {path}")]
    #[diagnostic(
        code(scanprep::parse_error),
        help("the file may be corrupted or in an unexpected format variant")
    )]
    ParseError { path: PathBuf, details: String },

    /// The file extension does not map to a supported mesh format.
    #[error("unsupported mesh format: .{extension}")]
    #[diagnostic(
        code(scanprep::unsupported_format),
        help("supported formats are STL, OBJ, and PLY")
    )]
    UnsupportedFormat { extension: String },

    /// The mesh has no usable geometry.
    #[error("mesh is empty: {details}")]
    #[diagnostic(
        code(scanprep::empty_mesh),
        help("the input file contains no triangles; re-export it from the scanner software")
    )]
    EmptyMesh { details: String },

    /// Scaling was requested along an axis with zero extent.
    #[error("cannot scale along {axis} axis: extent is zero")]
    #[diagnostic(
        code(scanprep::degenerate_extent),
        help("the mesh is flat along this axis; pick a different axis or use auto")
    )]
    DegenerateExtent { axis: &'static str },

    /// A geometry-kernel operation failed.
    #[error("geometry kernel failed during {operation}: {details}")]
    #[diagnostic(code(scanprep::kernel_failure))]
    KernelFailure { operation: String, details: String },

    /// The batch input directory does not exist or is not a directory.
    #[error("input directory not found: {path}")]
    #[diagnostic(
        code(scanprep::input_dir_not_found),
        help("check the directory path; it must exist before the batch starts")
    )]
    InputDirNotFound { path: PathBuf },

    /// No files in the batch input directory matched the pattern.
    #[error("no files matching '{pattern}' in {path}")]
    #[diagnostic(
        code(scanprep::no_matching_files),
        help("check the glob pattern; the default is '*.stl'")
    )]
    NoMatchingFiles { path: PathBuf, pattern: String },
}

impl MeshError {
    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            MeshError::IoRead { .. } => ErrorCode::IoRead,
            MeshError::IoWrite { .. } => ErrorCode::IoWrite,
            MeshError::ParseError { .. } => ErrorCode::ParseError,
            MeshError::UnsupportedFormat { .. } => ErrorCode::UnsupportedFormat,
            MeshError::EmptyMesh { .. } => ErrorCode::EmptyMesh,
            MeshError::DegenerateExtent { .. } => ErrorCode::DegenerateExtent,
            MeshError::KernelFailure { .. } => ErrorCode::KernelFailure,
            MeshError::InputDirNotFound { .. } => ErrorCode::InputDirNotFound,
            MeshError::NoMatchingFiles { .. } => ErrorCode::NoMatchingFiles,
        }
    }

    pub fn io_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MeshError::IoRead {
            path: path.into(),
            source,
        }
    }

    pub fn io_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MeshError::IoWrite {
            path: path.into(),
            source,
        }
    }

    pub fn parse_error(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        MeshError::ParseError {
            path: path.into(),
            details: details.into(),
        }
    }

    pub fn unsupported_format(extension: impl Into<String>) -> Self {
        MeshError::UnsupportedFormat {
            extension: extension.into(),
        }
    }

    pub fn empty_mesh(details: impl Into<String>) -> Self {
        MeshError::EmptyMesh {
            details: details.into(),
        }
    }

    pub fn kernel_failure(operation: impl Into<String>, details: impl Into<String>) -> Self {
        MeshError::KernelFailure {
            operation: operation.into(),
            details: details.into(),
        }
    }
}
