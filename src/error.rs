use std::path::PathBuf;

use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// Errors surfaced while reading or writing OPML documents.
///
/// Structural gaps (no `opml` root, no `head`, no `body`, unparseable dates) are
/// never errors; only input that is not well-formed XML, or I/O failures, reach
/// the caller.
#[derive(Debug, Error)]
pub enum OpmlError {
    /// XML syntax error reported by the reader or writer.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An attribute could not be tokenized (missing quotes, missing `=`).
    #[error("Malformed XML attribute: {0}")]
    Attribute(#[from] AttrError),

    /// SEC-003: Element nesting exceeds the configured limit.
    #[error("XML nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    /// Input ended while an element was still open.
    #[error("Unclosed element <{0}> at end of input")]
    UnclosedElement(String),

    /// Source bytes are not UTF-8 and the declared encoding cannot be decoded.
    #[error("Cannot decode OPML source declared as {0:?}")]
    Encoding(String),

    /// Reading an OPML file failed.
    #[error("Failed to read OPML file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing an OPML file failed.
    #[error("Failed to write OPML file '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic I/O error from the XML writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OpmlError>;
