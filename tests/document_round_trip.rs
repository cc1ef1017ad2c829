//! Property tests for OPML serialization.
//!
//! These tests use proptest to verify:
//! 1. Serialization is stable: serialize -> parse -> serialize yields the same text
//! 2. Documents with explicit version/encoding and non-empty fields parse back unchanged

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use opml_core::{Body, Head, Opml, Outline};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// Text made of characters that exercise escaping but survive XML unchanged.
fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 &<>\"'.:/?=_-]{1,20}"
}

fn arb_optional_text() -> impl Strategy<Value = Option<String>> {
    prop::option::of(arb_text())
}

fn arb_list() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z0-9/]{1,10}", 0..4)
}

/// Whole-second timestamps, since the wire format has no sub-second part.
fn arb_date() -> impl Strategy<Value = Option<DateTime<Utc>>> {
    prop::option::of((0i64..4_000_000_000).prop_map(|secs| {
        DateTime::from_timestamp(secs, 0).unwrap_or_default()
    }))
}

/// Open map entries with names no recognized field uses.
fn arb_extensions() -> impl Strategy<Value = IndexMap<String, String>> {
    prop::collection::vec(("ext[a-z]{1,6}", arb_text()), 0..3).prop_map(|entries| {
        let mut map = IndexMap::new();
        for (key, value) in entries {
            map.entry(key).or_insert(value);
        }
        map
    })
}

fn arb_outline_fields() -> impl Strategy<Value = Outline> {
    (
        (
            arb_optional_text(),
            prop::option::of(prop_oneof![Just("true".to_string()), Just("false".to_string())]),
            arb_date(),
            arb_list(),
            arb_optional_text(),
            arb_optional_text(),
        ),
        (
            arb_optional_text(),
            arb_optional_text(),
            arb_optional_text(),
            arb_optional_text(),
            arb_extensions(),
        ),
    )
        .prop_map(
            |(
                (text, is_comment, created, category, description, html_url),
                (title, r#type, xml_url, note, other_attributes),
            )| Outline {
                text,
                is_comment,
                created,
                category,
                description,
                html_url,
                title,
                r#type,
                xml_url,
                note,
                other_attributes,
                ..Outline::default()
            },
        )
}

fn arb_outline() -> impl Strategy<Value = Outline> {
    arb_outline_fields().prop_recursive(3, 24, 4, |inner| {
        (arb_outline_fields(), prop::collection::vec(inner, 0..4)).prop_map(
            |(mut outline, children)| {
                outline.outlines = children;
                outline
            },
        )
    })
}

fn arb_head() -> impl Strategy<Value = Head> {
    (
        (arb_optional_text(), arb_date(), arb_date(), arb_optional_text()),
        (
            arb_optional_text(),
            prop::collection::vec("[0-9]{1,3}", 0..5),
            arb_optional_text(),
            arb_extensions(),
        ),
    )
        .prop_map(
            |(
                (title, date_created, date_modified, owner_name),
                (docs, expansion_state, flavor, other_elements),
            )| Head {
                title,
                date_created,
                date_modified,
                owner_name,
                docs,
                expansion_state,
                flavor,
                other_elements,
                ..Head::default()
            },
        )
}

fn arb_opml() -> impl Strategy<Value = Opml> {
    (
        arb_head(),
        prop::collection::vec(arb_outline(), 0..4),
        arb_extensions(),
    )
        .prop_map(|(head, outlines, other_attributes)| Opml {
            version: Some("2.0".to_string()),
            encoding: Some("UTF-8".to_string()),
            head,
            body: Body::new(outlines),
            other_attributes,
        })
}

proptest! {
    #[test]
    fn test_serialization_is_stable(opml in arb_opml()) {
        let first = opml.to_xml_string().unwrap();
        let second = Opml::parse(&first).unwrap().to_xml_string().unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_parse_restores_model(opml in arb_opml()) {
        let parsed = Opml::parse(&opml.to_xml_string().unwrap()).unwrap();
        prop_assert_eq!(parsed, opml);
    }

    #[test]
    fn test_node_count_survives(outline in arb_outline()) {
        let opml = Opml {
            body: Body::new(vec![outline.clone()]),
            ..Opml::default()
        };
        let parsed = Opml::parse(&opml.to_xml_string().unwrap()).unwrap();
        prop_assert_eq!(parsed.body.outlines[0].node_count(), outline.node_count());
    }
}

// ============================================================================
// Fixed documents
// ============================================================================

#[test]
fn test_empty_document_round_trip() {
    let xml = Opml::new().to_xml_string().unwrap();
    assert_eq!(
        xml,
        r#"<?xml version="1.0" encoding="UTF-8"?><opml version="2.0"><head/><body/></opml>"#
    );
    assert_eq!(Opml::parse(&xml).unwrap().to_xml_string().unwrap(), xml);
}

#[test]
fn test_indented_output_parses_to_same_model() -> anyhow::Result<()> {
    let mut opml = Opml::new();
    opml.head.title = Some("Feeds".into());
    opml.body.outlines.push(
        Outline::new("Tech")
            .with_child(Outline::new("CNET News.com"))
            .with_child(Outline::new("Hacker News")),
    );

    let indented = opml.to_xml_string_with(opml_core::xml::XmlFormat::Indented)?;
    assert!(indented.contains('\n'));

    let parsed = Opml::parse(&indented)?;
    assert_eq!(parsed.head.title, opml.head.title);
    assert_eq!(parsed.body, opml.body);
    Ok(())
}
