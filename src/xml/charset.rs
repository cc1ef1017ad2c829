use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OpmlError, Result};

/// Decodes raw file bytes into text.
///
/// A byte-order mark decides the encoding when present; otherwise the
/// encoding named in the XML declaration is used, and UTF-8 when there is no
/// declaration. The BOM is not part of the returned text.
///
/// # Errors
///
/// Returns [`OpmlError::Encoding`] if the bytes are not valid in the chosen
/// encoding, or if the declared label is unknown and the bytes are not UTF-8.
pub fn decode_source(bytes: &[u8]) -> Result<String> {
    let encoding = match Encoding::for_bom(bytes) {
        Some((encoding, _)) => encoding,
        None => match declared_label(bytes) {
            Some(label) => match Encoding::for_label(label.as_bytes()) {
                // The declaration was readable as ASCII, so a BOM-less UTF-16
                // label is really UTF-8.
                Some(encoding) => encoding.output_encoding(),
                None => {
                    tracing::warn!(encoding = %label, "Unknown declared encoding, expecting UTF-8");
                    return String::from_utf8(bytes.to_vec())
                        .map_err(|_| OpmlError::Encoding(label));
                }
            },
            None => UTF_8,
        },
    };

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(OpmlError::Encoding(used.name().to_string()));
    }
    if used != UTF_8 {
        tracing::debug!(encoding = used.name(), "Transcoded OPML source to UTF-8");
    }
    Ok(text.into_owned())
}

/// Encodes serialized text for a file whose declaration names `label`.
///
/// Characters the target encoding cannot represent become numeric character
/// references. Unknown labels and UTF-16 are written as UTF-8.
pub fn encode_output<'t>(text: &'t str, label: &str) -> Cow<'t, [u8]> {
    let encoding = Encoding::for_label(label.as_bytes()).unwrap_or(UTF_8);
    let (bytes, used, unmappable) = encoding.encode(text);
    if unmappable {
        tracing::debug!(
            encoding = used.name(),
            "Wrote unmappable characters as character references"
        );
    }
    bytes
}

/// Encoding label from the `<?xml ... ?>` prolog, read with quick-xml.
fn declared_label(bytes: &[u8]) -> Option<String> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    match reader.read_event_into(&mut buf) {
        Ok(Event::Decl(decl)) => match decl.encoding()? {
            Ok(label) => Some(String::from_utf8_lossy(&label).into_owned()),
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable XML declaration encoding");
                None
            }
        },
        _ => None,
    }
}
