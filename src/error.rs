//! Error types for height grid construction, meshing, export and display.

use std::path::PathBuf;
use thiserror::Error;

/// Result type using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The height data does not describe a non-empty 2D grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("invalid height grid shape {shape:?}: input must be a non-empty 2D array")]
    InvalidShape { shape: Vec<usize> },

    #[error("height data has {got} values but shape needs {expected}")]
    DataLength { expected: usize, got: usize },

    #[error("height row {row} has {got} values but the first row has {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        got: usize,
    },
}

/// Building the native mesh from vertices and faces failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        face: usize,
        index: usize,
        vertex_count: usize,
    },

    #[error("vertex {index} has non-finite coordinates {position:?}")]
    NonFiniteVertex { index: usize, position: [f64; 3] },

    #[error(
        "mesh is not watertight: {boundary_edges} boundary edges, {non_manifold_edges} non-manifold edges"
    )]
    NotWatertight {
        boundary_edges: usize,
        non_manifold_edges: usize,
    },
}

/// Writing the mesh to disk failed.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unsupported mesh format: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("mesh conversion failed: {0}")]
    Conversion(#[from] ConversionError),
}

/// Rendering a view of the solid failed.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("cannot display: stdout is not a terminal")]
    NotATerminal,

    #[error("cannot display: mesh has no faces")]
    EmptyMesh,

    #[error("display output failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("mesh conversion failed: {0}")]
    Conversion(#[from] ConversionError),
}

/// Loading a height map image failed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image {path} has no pixels")]
    Empty { path: PathBuf },

    #[error("normalization scale must be positive and finite, got {scale}")]
    InvalidScale { scale: f64 },
}

/// Any error produced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Display(#[from] DisplayError),

    #[error(transparent)]
    Load(#[from] LoadError),
}
