use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Deserialize;

use super::dom::{XmlDocument, XmlElement, XmlNode};
use crate::error::Result;

/// Output layout for serialized XML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XmlFormat {
    /// Everything on one line, no insignificant whitespace.
    #[default]
    Compact,
    /// One element per line, indented by two spaces per level.
    Indented,
}

/// Serializes a whole document, declaration first.
///
/// Elements without children are written self-closing; everything else is
/// written in open/close form.
pub fn write_document(document: &XmlDocument, format: XmlFormat) -> Result<String> {
    let mut writer = new_writer(format);

    if let Some(ref decl) = document.declaration {
        writer.write_event(Event::Decl(BytesDecl::new(
            decl.version.as_str(),
            decl.encoding.as_deref(),
            decl.standalone.as_deref(),
        )))?;
    }
    if let Some(ref root) = document.root {
        write_element(&mut writer, root)?;
    }

    finish(writer)
}

/// Serializes a single element and its subtree, without a declaration.
pub fn element_to_string(element: &XmlElement, format: XmlFormat) -> Result<String> {
    let mut writer = new_writer(format);
    write_element(&mut writer, element)?;
    finish(writer)
}

fn new_writer(format: XmlFormat) -> Writer<Cursor<Vec<u8>>> {
    match format {
        XmlFormat::Compact => Writer::new(Cursor::new(Vec::new())),
        XmlFormat::Indented => Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2),
    }
}

fn finish(writer: Writer<Cursor<Vec<u8>>>) -> Result<String> {
    let bytes = writer.into_inner().into_inner();
    // The writer only ever receives `&str` input, so the output is valid UTF-8.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_element(writer: &mut Writer<Cursor<Vec<u8>>>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            XmlNode::Element(child) => write_element(writer, child)?,
            XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
