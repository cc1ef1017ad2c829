//! Minimal owned XML tree on top of `quick-xml`.
//!
//! - the reader turns text into an [`XmlDocument`]
//! - the writer turns an [`XmlDocument`] or [`XmlElement`] back into text
//! - [`decode_source`] and [`encode_output`] convert between file bytes in the
//!   declared encoding and UTF-8 text
//!
//! The OPML model only ever talks to this module, never to `quick-xml` events.

mod charset;
mod dom;
mod reader;
mod writer;

pub use charset::{decode_source, encode_output};
pub use dom::{XmlDeclaration, XmlDocument, XmlElement, XmlNode};
pub use reader::{parse_str, parse_str_with_limit, DEFAULT_MAX_DEPTH};
pub use writer::{element_to_string, write_document, XmlFormat};
