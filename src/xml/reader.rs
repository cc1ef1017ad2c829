use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::dom::{XmlDeclaration, XmlDocument, XmlElement};
use crate::error::{OpmlError, Result};

/// SEC-003: Default maximum element nesting depth accepted by the reader.
/// Deep enough for any hand-written outline, shallow enough that the recursive
/// model decode cannot exhaust the stack.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Parses XML text into an owned [`XmlDocument`] using [`DEFAULT_MAX_DEPTH`].
pub fn parse_str(content: &str) -> Result<XmlDocument> {
    parse_str_with_limit(content, DEFAULT_MAX_DEPTH)
}

/// Parses XML text into an owned [`XmlDocument`].
///
/// The first top-level element becomes the root; any later top-level elements,
/// comments, processing instructions and doctype declarations are dropped.
///
/// # Errors
///
/// Returns an error if:
/// - The text is not well-formed XML (mismatched tags, bad attribute syntax)
/// - An attribute or text node references an entity other than the 5 XML builtins
/// - Element nesting exceeds `max_depth`
/// - Input ends with an element still open
pub fn parse_str_with_limit(content: &str, max_depth: usize) -> Result<XmlDocument> {
    // SEC-002: XXE protection: quick-xml (0.37) never parses <!ENTITY> declarations from
    // DOCTYPE. Only the 5 XML builtins are resolved; anything else fails to unescape.
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = Reader::from_str(content);

    let mut document = XmlDocument::default();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Decl(decl) => {
                let version = match decl.version() {
                    Ok(version) => String::from_utf8_lossy(&version).into_owned(),
                    Err(e) => {
                        tracing::warn!(error = %e, "Unreadable XML declaration version");
                        "1.0".to_string()
                    }
                };
                let encoding = match decl.encoding() {
                    Some(Ok(encoding)) => Some(String::from_utf8_lossy(&encoding).into_owned()),
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Unreadable XML declaration encoding");
                        None
                    }
                    None => None,
                };
                let standalone = match decl.standalone() {
                    Some(Ok(standalone)) => {
                        Some(String::from_utf8_lossy(&standalone).into_owned())
                    }
                    _ => None,
                };
                document.declaration = Some(XmlDeclaration {
                    version,
                    encoding,
                    standalone,
                });
            }
            Event::Start(start) => {
                // SEC-003: Reject excessively nested documents
                if stack.len() >= max_depth {
                    return Err(OpmlError::MaxDepthExceeded(max_depth));
                }
                stack.push(element_from_start(&start, &reader)?);
            }
            Event::Empty(start) => {
                if stack.len() >= max_depth {
                    return Err(OpmlError::MaxDepthExceeded(max_depth));
                }
                let element = element_from_start(&start, &reader)?;
                attach(&mut stack, &mut document, element);
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut document, element);
                }
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    parent.push_text(text.unescape()?.into_owned());
                }
            }
            Event::CData(cdata) => {
                if let Some(parent) = stack.last_mut() {
                    parent.push_text(String::from_utf8_lossy(&cdata).into_owned());
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(OpmlError::UnclosedElement(open.name.clone()));
    }

    Ok(document)
}

fn element_from_start(start: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
    let decoder = reader.decoder();

    // Duplicate attributes are tolerated; the model keeps the first one.
    let mut attributes = start.attributes();
    attributes.with_checks(false);
    for attr in attributes {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.decode_and_unescape_value(decoder)?.into_owned();
        element.push_attribute(key, value);
    }
    Ok(element)
}

fn attach(stack: &mut [XmlElement], document: &mut XmlDocument, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.push_element(element),
        None if document.root.is_none() => document.root = Some(element),
        None => {
            tracing::debug!(name = %element.name, "Ignoring extra top-level element");
        }
    }
}
