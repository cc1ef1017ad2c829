//! Owned XML tree used as the exchange format between the OPML model and the
//! `quick-xml` reader/writer.

/// The `<?xml ... ?>` prolog of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl XmlDeclaration {
    pub fn new(version: impl Into<String>, encoding: Option<String>) -> Self {
        Self {
            version: version.into(),
            encoding,
            standalone: None,
        }
    }
}

/// A parsed or programmatically built XML document.
///
/// `root` is `None` when the source contained no element at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlDocument {
    pub declaration: Option<XmlDeclaration>,
    pub root: Option<XmlElement>,
}

impl XmlDocument {
    pub fn new(declaration: Option<XmlDeclaration>, root: XmlElement) -> Self {
        Self {
            declaration,
            root: Some(root),
        }
    }

    /// Encoding named in the declaration, if any.
    pub fn declared_encoding(&self) -> Option<&str> {
        self.declaration.as_ref()?.encoding.as_deref()
    }
}

/// Child content of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An element with its attributes in document order.
///
/// Attributes are kept as a plain list so that duplicates in lenient input
/// survive until the model decides which occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Name without any namespace prefix (`dc:title` -> `title`).
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Value of the first attribute with the given qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn push_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.push((name.into(), value.into()));
    }

    pub fn push_element(&mut self, element: XmlElement) {
        self.children.push(XmlNode::Element(element));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(XmlNode::Text(text.into()));
    }

    /// Builds `<name>text</name>`.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.push_text(text);
        element
    }

    /// Direct child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// Direct child elements whose qualified name is exactly `name`.
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |element| element.name == name)
    }

    /// Concatenated text of this element and all of its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(element) => element.collect_text(out),
            }
        }
    }
}

fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name_strips_prefix() {
        assert_eq!(XmlElement::new("dc:title").local_name(), "title");
        assert_eq!(XmlElement::new("title").local_name(), "title");
    }

    #[test]
    fn test_text_concatenates_descendants() {
        let mut inner = XmlElement::new("b");
        inner.push_text("bold");
        let mut outer = XmlElement::new("p");
        outer.push_text("a ");
        outer.push_element(inner);
        outer.push_text(" c");

        assert_eq!(outer.text(), "a bold c");
    }

    #[test]
    fn test_attribute_returns_first_occurrence() {
        let mut element = XmlElement::new("outline");
        element.push_attribute("text", "first");
        element.push_attribute("text", "second");

        assert_eq!(element.attribute("text"), Some("first"));
        assert_eq!(element.attribute("missing"), None);
    }

    #[test]
    fn test_elements_named_skips_text_and_other_names() {
        let mut body = XmlElement::new("body");
        body.push_element(XmlElement::new("outline"));
        body.push_text("\n");
        body.push_element(XmlElement::new("comment"));
        body.push_element(XmlElement::new("outline"));

        assert_eq!(body.elements().count(), 3);
        assert_eq!(body.elements_named("outline").count(), 2);
    }
}
