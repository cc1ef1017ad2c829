//! Read, build, and write OPML documents and walk their outline trees.
//!
//! - [`opml`] - the document model: [`Opml`], [`Head`], [`Body`], [`Outline`]
//! - [`traverse`] - depth-first and breadth-first walks with per-node context
//! - [`xml`] - the owned XML tree and its `quick-xml` reader/writer
//! - [`config`] - optional TOML settings
//!
//! # Example
//!
//! ```
//! use opml_core::{Opml, Outline, TraversalOptions, Traverser};
//!
//! let mut opml = Opml::new();
//! opml.head.title = Some("Subscriptions".into());
//! opml.body.outlines.push(
//!     Outline::new("Tech").with_child(Outline::new("CNET News.com")),
//! );
//!
//! let xml = opml.to_xml_string()?;
//! let parsed: Opml = xml.parse()?;
//! assert_eq!(parsed.body, opml.body);
//! assert_eq!(parsed.version.as_deref(), Some("2.0"));
//!
//! let result = Traverser::new(TraversalOptions::default()).visit_document(&parsed, |_| {});
//! assert_eq!(result.node_count, 2);
//! # Ok::<(), opml_core::OpmlError>(())
//! ```

pub mod config;
pub mod error;
pub mod opml;
pub mod traverse;
pub mod util;
pub mod xml;

pub use config::{Config, ConfigError};
pub use error::{OpmlError, Result};
pub use opml::{Body, Head, Opml, Outline};
pub use traverse::{
    FilterFailed, TraversalEvent, TraversalOptions, TraversalResult, TraversalStrategy,
    Traverser,
};
