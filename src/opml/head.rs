use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::error::Result;
use crate::util::{format_date, join_list, parse_date, split_list};
use crate::xml::{element_to_string, XmlElement, XmlFormat};

pub(crate) const HEAD_TAG: &str = "head";

/// Document metadata from `<head>`.
///
/// Child elements are dispatched by local name. Unknown elements land in
/// [`other_elements`](Self::other_elements); when a name repeats, the first
/// occurrence is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Head {
    pub title: Option<String>,
    pub date_created: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub owner_id: Option<String>,
    pub docs: Option<String>,
    /// Line numbers of expanded outlines, comma-separated on the wire.
    pub expansion_state: Vec<String>,
    pub vert_scroll_state: Option<String>,
    pub window_top: Option<String>,
    pub window_left: Option<String>,
    pub window_bottom: Option<String>,
    pub window_right: Option<String>,
    pub flavor: Option<String>,
    pub source: Option<String>,
    pub other_elements: IndexMap<String, String>,
}

impl Head {
    /// Decodes a `<head>` element. Any other element yields an empty `Head`.
    pub fn from_element(element: &XmlElement) -> Self {
        let mut head = Head::default();
        if element.local_name() != HEAD_TAG {
            return head;
        }

        for child in element.elements() {
            let value = child.text();
            match child.local_name() {
                "title" => head.title = Some(value),
                "dateCreated" => head.date_created = parse_date(&value),
                "dateModified" => head.date_modified = parse_date(&value),
                "ownerName" => head.owner_name = Some(value),
                "ownerEmail" => head.owner_email = Some(value),
                "ownerId" => head.owner_id = Some(value),
                "docs" => head.docs = Some(value),
                "expansionState" => head.expansion_state = split_list(&value),
                "vertScrollState" => head.vert_scroll_state = Some(value),
                "windowTop" => head.window_top = Some(value),
                "windowLeft" => head.window_left = Some(value),
                "windowBottom" => head.window_bottom = Some(value),
                "windowRight" => head.window_right = Some(value),
                "flavor" => head.flavor = Some(value),
                "source" => head.source = Some(value),
                _ => {
                    head.other_elements.entry(child.name.clone()).or_insert(value);
                }
            }
        }

        head
    }

    /// Encodes the metadata as a `<head>` element, one child per non-empty
    /// field in a fixed order, then the unknown elements in stored order.
    pub fn to_element(&self) -> XmlElement {
        let mut element = XmlElement::new(HEAD_TAG);

        let dates = [
            ("dateCreated", self.date_created.as_ref().map(format_date)),
            ("dateModified", self.date_modified.as_ref().map(format_date)),
        ];
        let expansion_state = join_list(&self.expansion_state);

        push_field(&mut element, "title", self.title.as_deref());
        for (name, value) in &dates {
            push_field(&mut element, name, value.as_deref());
        }
        push_field(&mut element, "ownerName", self.owner_name.as_deref());
        push_field(&mut element, "ownerEmail", self.owner_email.as_deref());
        push_field(&mut element, "ownerId", self.owner_id.as_deref());
        push_field(&mut element, "docs", self.docs.as_deref());
        push_field(&mut element, "expansionState", expansion_state.as_deref());
        push_field(&mut element, "vertScrollState", self.vert_scroll_state.as_deref());
        push_field(&mut element, "windowTop", self.window_top.as_deref());
        push_field(&mut element, "windowLeft", self.window_left.as_deref());
        push_field(&mut element, "windowBottom", self.window_bottom.as_deref());
        push_field(&mut element, "windowRight", self.window_right.as_deref());
        push_field(&mut element, "flavor", self.flavor.as_deref());
        push_field(&mut element, "source", self.source.as_deref());
        for (name, value) in &self.other_elements {
            push_field(&mut element, name, Some(value.as_str()));
        }

        element
    }

    /// Serializes the `<head>` element on its own.
    pub fn to_xml_string(&self, format: XmlFormat) -> Result<String> {
        element_to_string(&self.to_element(), format)
    }
}

fn push_field(element: &mut XmlElement, name: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        element.push_element(XmlElement::with_text(name, value));
    }
}
