use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::config::Config;
use crate::error::{OpmlError, Result};
use crate::xml::{
    decode_source, encode_output, parse_str_with_limit, write_document, XmlDeclaration,
    XmlDocument, XmlElement, XmlFormat, DEFAULT_MAX_DEPTH,
};

use super::body::{Body, BODY_TAG};
use super::head::{Head, HEAD_TAG};

const OPML_TAG: &str = "opml";
const XML_VERSION: &str = "1.0";

/// Version written when [`Opml::version`] is unset.
pub const DEFAULT_VERSION: &str = "2.0";

/// Encoding written when [`Opml::encoding`] is unset.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// An OPML document: declaration encoding, `<opml>` attributes, head and body.
///
/// Reading is lenient. A missing `opml` root, `head` or `body` leaves the
/// corresponding part at its default instead of failing; only input that is
/// not well-formed XML is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Opml {
    /// `version` attribute of `<opml>`; [`DEFAULT_VERSION`] on output if unset.
    pub version: Option<String>,
    /// Declared encoding; [`DEFAULT_ENCODING`] on output if unset.
    pub encoding: Option<String>,
    pub head: Head,
    pub body: Body,
    /// Attributes of `<opml>` other than `version`, first occurrence kept.
    pub other_attributes: IndexMap<String, String>,
}

impl Opml {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the model from an already parsed XML tree.
    ///
    /// An `iso-8859-1` declaration is reported as `UTF-8`, since the text has
    /// already been decoded; every other declared encoding passes through.
    /// Repeated `<head>` or `<body>` elements replace earlier ones.
    pub fn from_document(document: &XmlDocument) -> Self {
        let mut opml = Opml::new();

        if let Some(encoding) = document.declared_encoding().filter(|e| !e.is_empty()) {
            opml.encoding = Some(normalize_encoding(encoding));
        }

        let root = match document.root {
            Some(ref root) if root.name == OPML_TAG => root,
            _ => {
                tracing::debug!("No <opml> root element, using empty document");
                return opml;
            }
        };

        for (name, value) in &root.attributes {
            if name == "version" {
                opml.version = Some(value.clone());
            } else if !opml.other_attributes.contains_key(name) {
                opml.other_attributes.insert(name.clone(), value.clone());
            }
        }

        for child in root.elements() {
            match child.local_name() {
                HEAD_TAG => opml.head = Head::from_element(child),
                BODY_TAG => opml.body = Body::from_element(child),
                _ => {}
            }
        }

        opml
    }

    /// Parses OPML text with the default nesting limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not well-formed XML.
    pub fn parse(content: &str) -> Result<Self> {
        Self::parse_with_limit(content, DEFAULT_MAX_DEPTH)
    }

    /// Parses OPML text using the nesting limit from `config`.
    pub fn parse_with(content: &str, config: &Config) -> Result<Self> {
        Self::parse_with_limit(content, config.max_depth)
    }

    fn parse_with_limit(content: &str, max_depth: usize) -> Result<Self> {
        let document = parse_str_with_limit(content, max_depth)?;
        Ok(Self::from_document(&document))
    }

    /// Reads and parses an OPML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The bytes are not valid in the encoding named by the BOM or declaration
    /// - The content is not well-formed XML
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_path_with(path, &Config::default())
    }

    /// Reads and parses an OPML file using the nesting limit from `config`.
    pub fn from_path_with(path: impl AsRef<Path>, config: &Config) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| OpmlError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Loading OPML file");
        Self::parse_with(&decode_source(&bytes)?, config)
    }

    /// Async variant of [`from_path`](Self::from_path).
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| OpmlError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Loading OPML file");
        Self::parse(&decode_source(&bytes)?)
    }

    /// `version`, falling back to [`DEFAULT_VERSION`] when unset or empty.
    pub fn version_or_default(&self) -> &str {
        self.version
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_VERSION)
    }

    /// `encoding`, falling back to [`DEFAULT_ENCODING`] when unset or empty.
    pub fn encoding_or_default(&self) -> &str {
        self.encoding
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_ENCODING)
    }

    /// Element nesting the serialized document needs: `<opml>`, `<head>` or
    /// `<body>`, then the deepest outline chain or a head field.
    pub fn nesting_depth(&self) -> usize {
        let head_fields = usize::from(!self.head.to_element().children.is_empty());
        2 + self.body.depth().max(head_fields)
    }

    /// Builds the XML tree: declaration, `<opml>` with `version` and the
    /// remaining attributes, then head and body.
    ///
    /// A `version` entry in `other_attributes` is skipped; the field wins.
    /// No nesting limit is applied here.
    pub fn to_document(&self) -> XmlDocument {
        let declaration =
            XmlDeclaration::new(XML_VERSION, Some(self.encoding_or_default().to_string()));

        let mut root = XmlElement::new(OPML_TAG);
        root.push_attribute("version", self.version_or_default());
        for (name, value) in &self.other_attributes {
            if name == "version" {
                tracing::debug!("Skipping open attribute that shadows `version`");
                continue;
            }
            root.push_attribute(name.as_str(), value.as_str());
        }
        root.push_element(self.head.to_element());
        root.push_element(self.body.to_element());

        XmlDocument::new(Some(declaration), root)
    }

    /// Serializes to compact XML text.
    ///
    /// # Errors
    ///
    /// Returns [`OpmlError::MaxDepthExceeded`] if [`nesting_depth`](Self::nesting_depth)
    /// is above [`DEFAULT_MAX_DEPTH`], since [`parse`](Self::parse) would reject
    /// the output.
    pub fn to_xml_string(&self) -> Result<String> {
        self.to_xml_string_with(XmlFormat::Compact)
    }

    /// Serializes in the given layout, under the same nesting limit as
    /// [`to_xml_string`](Self::to_xml_string).
    pub fn to_xml_string_with(&self, format: XmlFormat) -> Result<String> {
        self.serialize(format, DEFAULT_MAX_DEPTH)
    }

    fn serialize(&self, format: XmlFormat, max_depth: usize) -> Result<String> {
        // SEC-003: Never write what the reader would refuse to load
        let depth = self.nesting_depth();
        if depth > max_depth {
            tracing::debug!(depth, max_depth, "Document too deep to serialize");
            return Err(OpmlError::MaxDepthExceeded(max_depth));
        }
        write_document(&self.to_document(), format)
    }

    /// Writes the document to `path` as compact XML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save_with(path, &Config::default())
    }

    /// Writes the document to `path` atomically, in the layout and under the
    /// nesting limit from `config`.
    ///
    /// The text is encoded in the declared encoding; characters it cannot
    /// represent are written as character references. The content goes to a temporary file in the same directory, is synced to
    /// disk, and is then renamed over the destination, so the destination is
    /// never left half written.
    pub fn save_with(&self, path: impl AsRef<Path>, config: &Config) -> Result<()> {
        use std::time::{SystemTime, UNIX_EPOCH};

        let path = path.as_ref();
        let content = self.serialize(config.format, config.max_depth)?;
        let bytes = encode_output(&content, self.encoding_or_default());

        // SEC-009: Randomized temp filename to prevent TOCTOU race conditions
        let random_suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let temp_path = path.with_extension(format!("tmp.{:016x}", random_suffix));

        let write_err = |source: std::io::Error| OpmlError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .map_err(write_err)?;

        let written = std::io::Write::write_all(&mut file, &bytes)
            .and_then(|()| file.sync_all());
        drop(file);
        if let Err(e) = written {
            let _ = std::fs::remove_file(&temp_path);
            return Err(write_err(e));
        }

        // On Windows, rename fails if destination exists, so remove it first
        #[cfg(windows)]
        if path.exists() {
            if let Err(e) = std::fs::remove_file(path) {
                let _ = std::fs::remove_file(&temp_path);
                return Err(write_err(e));
            }
        }

        if let Err(e) = std::fs::rename(&temp_path, path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(write_err(e));
        }

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Saved OPML file");
        Ok(())
    }
}

impl FromStr for Opml {
    type Err = OpmlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Maps a declared `iso-8859-1` encoding to `UTF-8`; everything else is kept.
fn normalize_encoding(encoding: &str) -> String {
    if encoding.eq_ignore_ascii_case("iso-8859-1") {
        tracing::debug!(declared = %encoding, "Normalizing declared encoding to UTF-8");
        DEFAULT_ENCODING.to_string()
    } else {
        encoding.to_string()
    }
}
