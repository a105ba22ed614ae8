//! Error types for the collaborator boundaries (files, archives, config).
//!
//! Rendering, justification and navigation are total functions and never
//! produce an error; everything here belongs to I/O at the edges.

use thiserror::Error;

/// Errors that can occur while opening books or persisting state.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid EPUB: {0}")]
    InvalidEpub(String),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("progress store error: {0}")]
    Store(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
