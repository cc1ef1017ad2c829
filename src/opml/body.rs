use crate::error::Result;
use crate::xml::{element_to_string, XmlElement, XmlFormat};

use super::outline::{Outline, OUTLINE_TAG};

pub(crate) const BODY_TAG: &str = "body";

/// Top-level outlines from `<body>`, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body {
    pub outlines: Vec<Outline>,
}

impl Body {
    pub fn new(outlines: Vec<Outline>) -> Self {
        Self { outlines }
    }

    /// Decodes the `outline` children of a `<body>` element. Any other
    /// element yields an empty `Body`.
    pub fn from_element(element: &XmlElement) -> Self {
        if element.local_name() != BODY_TAG {
            return Body::default();
        }
        Body {
            outlines: element
                .elements_named(OUTLINE_TAG)
                .map(Outline::from_element)
                .collect(),
        }
    }

    pub fn to_element(&self) -> XmlElement {
        let mut element = XmlElement::new(BODY_TAG);
        for outline in &self.outlines {
            element.push_element(outline.to_element());
        }
        element
    }

    /// Serializes the `<body>` element on its own.
    pub fn to_xml_string(&self, format: XmlFormat) -> Result<String> {
        element_to_string(&self.to_element(), format)
    }

    /// Total number of outlines at every depth.
    pub fn node_count(&self) -> usize {
        self.outlines.iter().map(Outline::node_count).sum()
    }

    /// Levels in the deepest top-level outline; 0 for an empty body.
    pub fn depth(&self) -> usize {
        self.outlines.iter().map(Outline::depth).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    #[test]
    fn test_decode_outline_children_only() {
        let doc = parse_str(
            r#"<body><outline text="A"/><separator/><outline text="B"><outline text="C"/></outline></body>"#,
        )
        .unwrap();
        let body = Body::from_element(doc.root.as_ref().unwrap());

        assert_eq!(body.outlines.len(), 2);
        assert_eq!(body.outlines[1].outlines[0].text.as_deref(), Some("C"));
        assert_eq!(body.node_count(), 3);
        assert_eq!(body.depth(), 2);
        assert_eq!(Body::default().depth(), 0);
    }

    #[test]
    fn test_decode_wrong_element_is_empty() {
        let doc = parse_str(r#"<head><outline text="A"/></head>"#).unwrap();
        assert_eq!(Body::from_element(doc.root.as_ref().unwrap()), Body::default());
    }

    #[test]
    fn test_encode() {
        let body = Body::new(vec![Outline::new("A"), Outline::new("B")]);
        assert_eq!(
            body.to_xml_string(XmlFormat::Compact).unwrap(),
            r#"<body><outline text="A"/><outline text="B"/></body>"#
        );
        assert_eq!(
            Body::default().to_xml_string(XmlFormat::Compact).unwrap(),
            "<body/>"
        );
    }
}
