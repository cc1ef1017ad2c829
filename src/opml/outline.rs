use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::error::Result;
use crate::util::{format_date, join_list, parse_date, split_list};
use crate::xml::{element_to_string, XmlElement, XmlFormat};

/// Element name for outline nodes; also the only child element name that is
/// decoded recursively.
pub(crate) const OUTLINE_TAG: &str = "outline";

/// Attribute names with a dedicated field; never written from the open map.
const KNOWN_ATTRIBUTES: &[&str] = &[
    "text",
    "isComment",
    "isBreakpoint",
    "created",
    "category",
    "description",
    "htmlUrl",
    "language",
    "title",
    "type",
    "version",
    "xmlUrl",
    "_note",
];

/// One `<outline>` entry with its metadata and nested outlines.
///
/// Every attribute except `text` is optional. Attributes this model does not
/// know about are kept in [`other_attributes`](Self::other_attributes) so a
/// parse/serialize cycle loses nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    /// Display label; also the path segment during traversal.
    pub text: Option<String>,
    /// `"true"` / `"false"`, kept as written.
    pub is_comment: Option<String>,
    /// `"true"` / `"false"`, kept as written.
    pub is_breakpoint: Option<String>,
    pub created: Option<DateTime<Utc>>,
    /// Comma-separated on the wire.
    pub category: Vec<String>,
    pub description: Option<String>,
    pub html_url: Option<String>,
    pub language: Option<String>,
    pub title: Option<String>,
    /// Feed type (`rss`, `atom`, `link`, ...).
    pub r#type: Option<String>,
    /// Feed format version (`RSS2`, `RSS1`, ...).
    pub version: Option<String>,
    pub xml_url: Option<String>,
    /// Dynalist-style note, `_note` on the wire.
    pub note: Option<String>,
    /// Unrecognized attributes in first-seen order.
    pub other_attributes: IndexMap<String, String>,
    /// Child outlines in document order.
    pub outlines: Vec<Outline>,
}

impl Outline {
    /// Creates an empty outline with just a display label.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Appends a child and returns `self`, for building trees inline.
    pub fn with_child(mut self, child: Outline) -> Self {
        self.outlines.push(child);
        self
    }

    /// Label used for paths; absent text is an empty segment.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Decodes an element and, recursively, its `outline` children.
    ///
    /// The element's own name is not checked. Child elements with any other
    /// name are skipped. An unparseable `created` value is dropped.
    pub fn from_element(element: &XmlElement) -> Self {
        let mut outline = Outline::default();

        for (name, value) in &element.attributes {
            match name.as_str() {
                "text" => outline.text = Some(value.clone()),
                "isComment" => outline.is_comment = Some(value.clone()),
                "isBreakpoint" => outline.is_breakpoint = Some(value.clone()),
                "created" => outline.created = parse_date(value),
                "category" => outline.category = split_list(value),
                "description" => outline.description = Some(value.clone()),
                "htmlUrl" => outline.html_url = Some(value.clone()),
                "language" => outline.language = Some(value.clone()),
                "title" => outline.title = Some(value.clone()),
                "type" => outline.r#type = Some(value.clone()),
                "version" => outline.version = Some(value.clone()),
                "xmlUrl" => outline.xml_url = Some(value.clone()),
                "_note" => outline.note = Some(value.clone()),
                _ => {
                    if !outline.other_attributes.contains_key(name) {
                        outline
                            .other_attributes
                            .insert(name.clone(), value.clone());
                    }
                }
            }
        }

        outline.outlines = element
            .elements_named(OUTLINE_TAG)
            .map(Outline::from_element)
            .collect();

        outline
    }

    /// Encodes this outline and its children as an `outline` element.
    ///
    /// Attributes are written in a fixed order, followed by the unrecognized
    /// ones in stored order. Empty values are omitted, as are open entries
    /// named like a recognized attribute.
    pub fn to_element(&self) -> XmlElement {
        let mut element = XmlElement::new(OUTLINE_TAG);

        push_optional(&mut element, "text", self.text.as_deref());
        push_optional(&mut element, "isComment", self.is_comment.as_deref());
        push_optional(&mut element, "isBreakpoint", self.is_breakpoint.as_deref());
        push_optional(
            &mut element,
            "created",
            self.created.as_ref().map(format_date).as_deref(),
        );
        push_optional(&mut element, "category", join_list(&self.category).as_deref());
        push_optional(&mut element, "description", self.description.as_deref());
        push_optional(&mut element, "htmlUrl", self.html_url.as_deref());
        push_optional(&mut element, "language", self.language.as_deref());
        push_optional(&mut element, "title", self.title.as_deref());
        push_optional(&mut element, "type", self.r#type.as_deref());
        push_optional(&mut element, "version", self.version.as_deref());
        push_optional(&mut element, "xmlUrl", self.xml_url.as_deref());
        push_optional(&mut element, "_note", self.note.as_deref());
        for (name, value) in &self.other_attributes {
            if KNOWN_ATTRIBUTES.contains(&name.as_str()) {
                tracing::debug!(name = %name, "Skipping open attribute that shadows a field");
                continue;
            }
            push_optional(&mut element, name, Some(value.as_str()));
        }

        for child in &self.outlines {
            element.push_element(child.to_element());
        }

        element
    }

    /// Serializes this outline subtree on its own, without a declaration.
    pub fn to_xml_string(&self, format: XmlFormat) -> Result<String> {
        element_to_string(&self.to_element(), format)
    }

    /// Number of outlines in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.outlines.iter().map(Outline::node_count).sum::<usize>()
    }

    /// Levels in this subtree: 1 for a leaf. Computed without recursion.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((outline, level)) = pending.pop() {
            deepest = deepest.max(level);
            pending.extend(outline.outlines.iter().map(|child| (child, level + 1)));
        }
        deepest
    }
}

fn push_optional(element: &mut XmlElement, name: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        element.push_attribute(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;
    use pretty_assertions::assert_eq;

    fn decode(xml: &str) -> Outline {
        let doc = parse_str(xml).expect("Failed to parse outline XML");
        Outline::from_element(doc.root.as_ref().expect("missing root"))
    }

    fn encode(outline: &Outline) -> String {
        outline
            .to_xml_string(XmlFormat::Compact)
            .expect("Failed to serialize outline")
    }

    #[test]
    fn test_decode_all_recognized_attributes() {
        let outline = decode(
            r#"<outline text="CNET News.com" isComment="true" isBreakpoint="false"
                created="Tue, 02 Aug 2005 21:42:48 GMT" category="/Harvard/Berkman,/Politics"
                description="Tech news" htmlUrl="http://news.com.com/" language="unknown"
                title="CNET" type="rss" version="RSS2" xmlUrl="http://news.com.com/rss.xml"
                _note="remember"/>"#,
        );

        assert_eq!(outline.text.as_deref(), Some("CNET News.com"));
        assert_eq!(outline.is_comment.as_deref(), Some("true"));
        assert_eq!(outline.is_breakpoint.as_deref(), Some("false"));
        assert_eq!(
            outline.created.map(|d| format_date(&d)).as_deref(),
            Some("Tue, 02 Aug 2005 21:42:48 GMT")
        );
        assert_eq!(outline.category, vec!["/Harvard/Berkman", "/Politics"]);
        assert_eq!(outline.description.as_deref(), Some("Tech news"));
        assert_eq!(outline.html_url.as_deref(), Some("http://news.com.com/"));
        assert_eq!(outline.language.as_deref(), Some("unknown"));
        assert_eq!(outline.title.as_deref(), Some("CNET"));
        assert_eq!(outline.r#type.as_deref(), Some("rss"));
        assert_eq!(outline.version.as_deref(), Some("RSS2"));
        assert_eq!(outline.xml_url.as_deref(), Some("http://news.com.com/rss.xml"));
        assert_eq!(outline.note.as_deref(), Some("remember"));
        assert!(outline.other_attributes.is_empty());
        assert!(outline.outlines.is_empty());
    }

    #[test]
    fn test_decode_only_outline_children() {
        let outline = decode(
            r#"<outline text="IT"><outline text="A"/><note>skip me</note><outline text="B"><outline text="C"/></outline></outline>"#,
        );

        let texts: Vec<&str> = outline.outlines.iter().map(|o| o.text_or_empty()).collect();
        assert_eq!(texts, ["A", "B"]);
        assert_eq!(outline.outlines[1].outlines[0].text.as_deref(), Some("C"));
        assert_eq!(outline.node_count(), 4);
    }

    #[test]
    fn test_decode_ignores_root_name() {
        let outline = decode(r#"<item text="x"><outline text="y"/></item>"#);
        assert_eq!(outline.text.as_deref(), Some("x"));
        assert_eq!(outline.outlines.len(), 1);
    }

    #[test]
    fn test_decode_missing_text_is_not_an_error() {
        let outline = decode(r#"<outline title="untitled"/>"#);
        assert_eq!(outline.text, None);
        assert_eq!(outline.text_or_empty(), "");
    }

    #[test]
    fn test_decode_bad_created_is_dropped() {
        let outline = decode(r#"<outline text="x" created="yesterday-ish"/>"#);
        assert_eq!(outline.created, None);
    }

    #[test]
    fn test_decode_unknown_attributes_first_wins() {
        let outline = decode(r#"<outline zeta="1" text="x" alpha="2" zeta="3"/>"#);

        let entries: Vec<(&str, &str)> = outline
            .other_attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(entries, [("zeta", "1"), ("alpha", "2")]);
    }

    #[test]
    fn test_encode_text_only_is_self_closing() {
        assert_eq!(encode(&Outline::new("X")), r#"<outline text="X"/>"#);
    }

    #[test]
    fn test_encode_omits_empty_values() {
        let outline = Outline {
            text: Some("X".into()),
            description: Some(String::new()),
            title: Some(String::new()),
            ..Outline::default()
        };
        assert_eq!(encode(&outline), r#"<outline text="X"/>"#);
    }

    #[test]
    fn test_encode_fixed_attribute_order() {
        let mut outline = Outline::new("CNET News.com");
        outline.xml_url = Some("http://news.com.com/2547-1_3-0-5.xml".into());
        outline.r#type = Some("rss".into());
        outline.is_comment = Some("true".into());
        outline.category = vec!["/Harvard/Berkman".into(), "/Politics".into()];
        outline.created = parse_date("Tue, 02 Aug 2005 21:42:48 GMT");
        outline.note = Some("n".into());
        outline
            .other_attributes
            .insert("custom".into(), "value".into());

        assert_eq!(
            encode(&outline),
            concat!(
                r#"<outline text="CNET News.com" isComment="true" "#,
                r#"created="Tue, 02 Aug 2005 21:42:48 GMT" "#,
                r#"category="/Harvard/Berkman,/Politics" type="rss" "#,
                r#"xmlUrl="http://news.com.com/2547-1_3-0-5.xml" _note="n" custom="value"/>"#
            )
        );
    }

    #[test]
    fn test_encode_skips_open_entries_shadowing_fields() {
        let mut outline = Outline::new("X");
        outline.other_attributes.insert("text".into(), "dup".into());
        outline.other_attributes.insert("xmlUrl".into(), "dup".into());
        outline.other_attributes.insert("custom".into(), "v".into());

        let xml = encode(&outline);
        assert_eq!(xml, r#"<outline text="X" custom="v"/>"#);
        assert!(parse_str(&xml).is_ok());
    }

    #[test]
    fn test_depth() {
        assert_eq!(Outline::new("leaf").depth(), 1);
        let tree = Outline::new("a")
            .with_child(Outline::new("b"))
            .with_child(Outline::new("c").with_child(Outline::new("d")));
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn test_encode_children_open_close() {
        let outline = Outline::new("IT").with_child(Outline::new("CNET"));
        assert_eq!(
            encode(&outline),
            r#"<outline text="IT"><outline text="CNET"/></outline>"#
        );
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let mut outline = Outline::new("Root");
        outline.category = vec!["/Harvard/Berkman".into(), "/Politics".into()];
        outline.created = parse_date("Sat, 18 Jun 2005 12:11:52 GMT");
        outline.html_url = Some("https://example.com/?a=1&b=2".into());
        outline.note = Some("a \"quoted\" <note>".into());
        outline
            .other_attributes
            .insert("extension".into(), "kept".into());
        let outline = outline.with_child(Outline::new("Child").with_child(Outline::new("Leaf")));

        let decoded = decode(&encode(&outline));
        assert_eq!(decoded, outline);
    }

    #[test]
    fn test_round_trip_empty_collapses_to_absent() {
        let outline = Outline {
            text: Some("x".into()),
            language: Some(String::new()),
            ..Outline::default()
        };
        let decoded = decode(&encode(&outline));
        assert_eq!(decoded.language, None);
    }
}
