//! Shared helpers for the OPML model.
//!
//! - **Dates**: locale-invariant parsing and RFC 1123 rendering
//! - **Lists**: comma-separated attribute values (`category`, `expansionState`)

mod date;
mod list;

pub use date::{format_date, parse_date};
pub use list::{join_list, split_list};
