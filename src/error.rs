//! Error types for bindery conversions.

use thiserror::Error;

/// Errors surfaced across the conversion boundary.
///
/// Markdown itself never fails to parse (malformed syntax degrades to
/// literal text), so the only failure classes are metadata validation and
/// package assembly. Library-level errors (I/O, ZIP) are folded into
/// [`Error::Assembly`] as plain messages and never cross the boundary as
/// typed variants.
#[derive(Error, Debug)]
pub enum Error {
    #[error("missing required metadata field: {0}")]
    MissingMetadata(&'static str),

    #[error("package assembly failed: {0}")]
    Assembly(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Assembly(e.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::Assembly(e.to_string())
    }
}
