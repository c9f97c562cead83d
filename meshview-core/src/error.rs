//! Error types for loading, device access and startup.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while parsing a DirectX `.x` file.
#[derive(Debug, Error)]
pub enum XFileError {
    #[error("not a DirectX file (missing `xof ` header)")]
    BadHeader,
    #[error("unsupported .x format `{0}`; only text files are supported")]
    UnsupportedFormat(String),
    #[error("lexing failed near byte {offset}")]
    Lex { offset: usize },
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("malformed mesh `{mesh}`: {reason}")]
    MalformedMesh { mesh: String, reason: String },
    #[error("file contains no Mesh object")]
    NoMesh,
}

/// Failure while parsing an STL file.
#[derive(Debug, Error)]
pub enum StlError {
    #[error("file too small to be a valid STL")]
    TooSmall,
    #[error("unexpected end of file after {0} triangles")]
    Truncated(usize),
    #[error("failed to parse ASCII STL: {0}")]
    Ascii(String),
}

/// Failure while locating or decoding a model file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not find {name} (searched {searched:?})")]
    NotFound { name: String, searched: Vec<PathBuf> },
    #[error("unsupported model extension for {0}")]
    UnsupportedExtension(String),
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    XFile {
        path: PathBuf,
        #[source]
        source: XFileError,
    },
    #[error("failed to parse {path:?}: {source}")]
    Stl {
        path: PathBuf,
        #[source]
        source: StlError,
    },
}

/// Failure reported by a render device outside of a scene.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Per-frame failure of `begin_scene`; the frame is dropped, never propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("render surface is unavailable")]
    SurfaceUnavailable,
    #[error("device lost")]
    DeviceLost,
}

/// Top-level error for startup and the message loop.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Device(#[from] DeviceError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
