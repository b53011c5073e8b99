//! Error types for epubsift operations.

use thiserror::Error;

/// Errors that can occur while opening an EPUB or running the extraction pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid EPUB: {0}")]
    InvalidEpub(String),

    /// A single document's markup could not be interpreted as a page.
    /// Recorded per document by the pipeline; never aborts the run.
    #[error("Malformed markup in {0}")]
    MalformedMarkup(String),

    /// The rule set failed to load or is structurally invalid.
    /// Fatal at startup, before any document is processed.
    #[error("Invalid rule set: {0}")]
    InvalidRules(String),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;
