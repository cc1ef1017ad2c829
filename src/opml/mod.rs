//! OPML document model.
//!
//! [`Opml`] owns a [`Head`] of metadata and a [`Body`] holding a tree of
//! [`Outline`] nodes. Decoding is lenient: missing structure falls back to
//! defaults, unknown attributes and head elements are carried through, and
//! unparseable dates are dropped. Encoding writes fields in a fixed order and
//! omits empty values.

mod body;
mod document;
mod head;
mod outline;

pub use body::Body;
pub use document::{Opml, DEFAULT_ENCODING, DEFAULT_VERSION};
pub use head::Head;
pub use outline::Outline;
