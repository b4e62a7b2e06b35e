//! Owned XML element tree on top of `quick-xml` events.
//!
//! Only the handful of DOM operations the style engine needs are provided:
//! parse, deep clone, query by local tag name, remove/insert children, and
//! serialize. Text nodes keep their original escaped form so content the
//! editor never touches is written back unchanged.

use anyhow::{Context, Result};
use quick_xml::escape::{partial_escape, unescape};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

/// XML declaration (`<?xml version=... ?>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclaration {
    /// `version` pseudo-attribute
    pub version: String,
    /// `encoding` pseudo-attribute
    pub encoding: Option<String>,
    /// `standalone` pseudo-attribute
    pub standalone: Option<String>,
}

/// A node in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Element with attributes and children
    Element(XmlElement),
    /// Character data, stored escaped exactly as read
    Text(String),
    /// `<![CDATA[...]]>` section content
    CData(String),
    /// Comment content
    Comment(String),
    /// Processing instruction content
    ProcessingInstruction(String),
    /// Doctype content
    DocType(String),
}

impl XmlNode {
    /// Builds a text node from unescaped content.
    #[must_use]
    pub fn text(content: &str) -> Self {
        Self::Text(partial_escape(content).into_owned())
    }

    /// Returns the element if this node is one.
    #[must_use]
    pub const fn as_element(&self) -> Option<&XmlElement> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    fn is_whitespace(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }
}

impl From<XmlElement> for XmlNode {
    fn from(element: XmlElement) -> Self {
        Self::Element(element)
    }
}

/// An element: qualified name, attributes (unescaped), and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Qualified tag name as written, e.g. `Style` or `kml:Style`
    pub name: String,
    /// Attributes in document order, values unescaped
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Creates an empty element.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Adds an attribute (builder form). The value is escaped on write.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Appends a child element (builder form).
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Appends escaped text (builder form).
    #[must_use]
    pub fn with_text(mut self, content: &str) -> Self {
        self.children.push(XmlNode::text(content));
        self
    }

    /// Tag name without namespace prefix.
    #[must_use]
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// True if the local name matches.
    #[must_use]
    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
    }

    /// Value of an attribute.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }

    /// Child elements in order.
    pub fn elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// First direct child element with this local name.
    #[must_use]
    pub fn child(&self, local: &str) -> Option<&Self> {
        self.elements().find(|element| element.is(local))
    }

    /// Trimmed text of a direct child, `None` when missing or blank.
    #[must_use]
    pub fn child_text(&self, local: &str) -> Option<String> {
        self.child(local)
            .map(Self::text)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    }

    /// Every descendant with this local name, in document order
    /// (like `getElementsByTagName`, excluding `self`).
    #[must_use]
    pub fn descendants(&self, local: &str) -> Vec<&Self> {
        self.descendants_outside(local, &[])
    }

    /// Like [`Self::descendants`], but does not look inside elements whose
    /// local name is in `skip`.
    #[must_use]
    pub fn descendants_outside(&self, local: &str, skip: &[&str]) -> Vec<&Self> {
        let mut found = Vec::new();
        self.collect_descendants(local, skip, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, local: &str, skip: &[&str], found: &mut Vec<&'a Self>) {
        for element in self.elements() {
            if element.is(local) {
                found.push(element);
            }
            if !skip.contains(&element.local_name()) {
                element.collect_descendants(local, skip, found);
            }
        }
    }

    /// First descendant with this local name.
    #[must_use]
    pub fn first_descendant(&self, local: &str) -> Option<&Self> {
        self.elements().find_map(|element| {
            if element.is(local) {
                Some(element)
            } else {
                element.first_descendant(local)
            }
        })
    }

    /// Mutable access to the first element with this local name, `self`
    /// included.
    pub fn find_mut(&mut self, local: &str) -> Option<&mut Self> {
        if self.is(local) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|node| match node {
            XmlNode::Element(element) => element.find_mut(local),
            _ => None,
        })
    }

    /// Concatenated, unescaped character data of the subtree.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(raw) => match unescape(raw) {
                    Ok(text) => out.push_str(&text),
                    Err(_) => out.push_str(raw),
                },
                XmlNode::CData(data) => out.push_str(data),
                XmlNode::Element(element) => element.collect_text(out),
                _ => {}
            }
        }
    }

    /// Removes every descendant element matching `remove`, along with the
    /// whitespace-only text node right before each of them. Elements whose
    /// local name is in `skip` are kept whole and not searched.
    /// Returns the number of removed elements.
    pub fn remove_descendants_where<F>(&mut self, skip: &[&str], remove: &F) -> usize
    where
        F: Fn(&Self) -> bool,
    {
        let mut removed = 0;
        let mut kept: Vec<XmlNode> = Vec::with_capacity(self.children.len());

        for node in std::mem::take(&mut self.children) {
            match node {
                XmlNode::Element(element) if remove(&element) => {
                    if kept.last().is_some_and(XmlNode::is_whitespace) {
                        kept.pop();
                    }
                    removed += 1;
                }
                XmlNode::Element(mut element) if !skip.contains(&element.local_name()) => {
                    removed += element.remove_descendants_where(skip, remove);
                    kept.push(XmlNode::Element(element));
                }
                other => kept.push(other),
            }
        }

        self.children = kept;
        removed
    }

    /// Inserts nodes so that the first one lands at `index`.
    pub fn insert_children(&mut self, index: usize, nodes: Vec<XmlNode>) {
        let index = index.min(self.children.len());
        self.children.splice(index..index, nodes);
    }
}

/// A parsed document: optional declaration plus top-level nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// XML declaration, if present
    pub declaration: Option<XmlDeclaration>,
    /// Top-level nodes; exactly one of them is the root element
    pub nodes: Vec<XmlNode>,
}

impl XmlDocument {
    /// Parses XML text.
    ///
    /// # Errors
    ///
    /// Returns errors for malformed markup, mismatched or unclosed tags, and
    /// documents without a root element.
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);
        let mut declaration = None;
        let mut nodes: Vec<XmlNode> = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();

        loop {
            let position = reader.buffer_position();
            let event = reader
                .read_event()
                .with_context(|| format!("Malformed XML near byte {position}"))?;

            let node = match event {
                Event::Decl(decl) => {
                    declaration = Some(read_declaration(&decl)?);
                    continue;
                }
                Event::Start(start) => {
                    stack.push(read_element(&start)?);
                    continue;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .context("Closing tag without a matching opening tag")?;
                    XmlNode::Element(element)
                }
                Event::Empty(start) => XmlNode::Element(read_element(&start)?),
                Event::Text(text) => XmlNode::Text(utf8(&text)?),
                Event::CData(data) => XmlNode::CData(utf8(&data)?),
                Event::Comment(comment) => XmlNode::Comment(utf8(&comment)?),
                Event::PI(pi) => XmlNode::ProcessingInstruction(utf8(&pi)?),
                Event::DocType(doctype) => XmlNode::DocType(utf8(&doctype)?),
                Event::Eof => break,
            };

            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => nodes.push(node),
            }
        }

        if let Some(open) = stack.last() {
            anyhow::bail!("Unclosed element <{}> at end of document", open.name);
        }

        let document = Self { declaration, nodes };
        if document.root().is_none() {
            anyhow::bail!("Document has no root element");
        }
        Ok(document)
    }

    /// The root element.
    #[must_use]
    pub fn root(&self) -> Option<&XmlElement> {
        self.nodes.iter().find_map(XmlNode::as_element)
    }

    /// Mutable root element.
    pub fn root_mut(&mut self) -> Option<&mut XmlElement> {
        self.nodes.iter_mut().find_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Serializes the document back to text.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        if let Some(decl) = &self.declaration {
            writer
                .write_event(Event::Decl(BytesDecl::new(
                    &decl.version,
                    decl.encoding.as_deref(),
                    decl.standalone.as_deref(),
                )))
                .context("Failed to write XML declaration")?;
        }

        for node in &self.nodes {
            write_node(&mut writer, node)?;
        }

        String::from_utf8(writer.into_inner().into_inner())
            .context("Serialized XML is not valid UTF-8")
    }
}

/// Strips a namespace prefix from a qualified name.
#[must_use]
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .context("XML content is not valid UTF-8")
}

fn read_element(start: &BytesStart<'_>) -> Result<XmlElement> {
    let name = utf8(start.name().as_ref())?;
    let mut element = XmlElement::new(name);

    for attribute in start.attributes() {
        let attribute =
            attribute.with_context(|| format!("Malformed attribute on <{}>", element.name))?;
        let key = utf8(attribute.key.as_ref())?;
        let value = attribute
            .unescape_value()
            .with_context(|| format!("Malformed value of attribute '{key}'"))?
            .into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}

fn read_declaration(decl: &BytesDecl<'_>) -> Result<XmlDeclaration> {
    let version = utf8(&decl.version().context("Malformed XML declaration")?)?;
    let encoding = decl
        .encoding()
        .transpose()
        .context("Malformed XML declaration encoding")?
        .map(|value| utf8(&value))
        .transpose()?;
    let standalone = decl
        .standalone()
        .transpose()
        .context("Malformed XML declaration standalone flag")?
        .map(|value| utf8(&value))
        .transpose()?;

    Ok(XmlDeclaration {
        version,
        encoding,
        standalone,
    })
}

fn write_node(writer: &mut Writer<Cursor<Vec<u8>>>, node: &XmlNode) -> Result<()> {
    let event = match node {
        XmlNode::Element(element) => return write_element(writer, element),
        XmlNode::Text(raw) => Event::Text(BytesText::from_escaped(raw.as_str())),
        XmlNode::CData(data) => Event::CData(BytesCData::new(data.as_str())),
        XmlNode::Comment(comment) => Event::Comment(BytesText::from_escaped(comment.as_str())),
        XmlNode::ProcessingInstruction(pi) => Event::PI(BytesText::from_escaped(pi.as_str())),
        XmlNode::DocType(doctype) => Event::DocType(BytesText::from_escaped(doctype.as_str())),
    };
    writer.write_event(event).context("Failed to write XML node")
}

fn write_element(writer: &mut Writer<Cursor<Vec<u8>>>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .with_context(|| format!("Failed to write <{}/>", element.name));
    }

    writer
        .write_event(Event::Start(start))
        .with_context(|| format!("Failed to write <{}>", element.name))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .with_context(|| format!("Failed to write </{}>", element.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- exported by hand -->
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>Tom &amp; Jerry's</name>
    <Style id="a"><LineStyle><width>2</width></LineStyle></Style>
    <Folder><Style id="b"/><name><![CDATA[<b>bold</b>]]></name></Folder>
  </Document>
</kml>"#;

    #[test]
    fn test_parse_structure() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let decl = doc.declaration.as_ref().unwrap();
        assert_eq!(decl.version, "1.0");
        assert_eq!(decl.encoding.as_deref(), Some("UTF-8"));

        let root = doc.root().unwrap();
        assert!(root.is("kml"));
        assert_eq!(
            root.attribute("xmlns"),
            Some("http://www.opengis.net/kml/2.2")
        );

        let styles = root.descendants("Style");
        assert_eq!(styles.len(), 2);
        assert_eq!(styles[0].attribute("id"), Some("a"));
        assert_eq!(styles[1].attribute("id"), Some("b"));
    }

    #[test]
    fn test_text_is_unescaped_on_read_and_kept_on_write() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let document = doc.root().unwrap().child("Document").unwrap();
        assert_eq!(document.child_text("name").as_deref(), Some("Tom & Jerry's"));

        let folder = document.child("Folder").unwrap();
        assert_eq!(folder.child_text("name").as_deref(), Some("<b>bold</b>"));

        let written = doc.to_xml_string().unwrap();
        assert!(written.contains("<name>Tom &amp; Jerry's</name>"));
        assert!(written.contains("<![CDATA[<b>bold</b>]]>"));
        assert!(written.contains("<!-- exported by hand -->"));
    }

    #[test]
    fn test_round_trip_is_stable() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let written = doc.to_xml_string().unwrap();
        let reparsed = XmlDocument::parse(&written).unwrap();
        assert_eq!(doc, reparsed);
    }

    #[test]
    fn test_remove_descendants_drops_leading_whitespace() {
        let mut doc = XmlDocument::parse(SAMPLE).unwrap();
        let root = doc.root_mut().unwrap();
        assert_eq!(root.remove_descendants_where(&[], &|e| e.is("Style")), 2);
        assert!(root.descendants("Style").is_empty());

        let written = doc.to_xml_string().unwrap();
        assert!(written.contains("</name>\n    <Folder>"));
    }

    #[test]
    fn test_skipped_subtrees_are_not_searched() {
        let mut doc = XmlDocument::parse(SAMPLE).unwrap();
        let root = doc.root_mut().unwrap();

        let outside: Vec<_> = root
            .descendants_outside("Style", &["Folder"])
            .into_iter()
            .filter_map(|e| e.attribute("id"))
            .collect();
        assert_eq!(outside, vec!["a"]);

        assert_eq!(root.remove_descendants_where(&["Folder"], &|e| e.is("Style")), 1);
        let left: Vec<_> = root
            .descendants("Style")
            .into_iter()
            .filter_map(|e| e.attribute("id"))
            .collect();
        assert_eq!(left, vec!["b"]);
    }

    #[test]
    fn test_prefixed_names_match_local_name() {
        let doc = XmlDocument::parse(
            r#"<kml:kml xmlns:kml="http://www.opengis.net/kml/2.2"><kml:Style id="x"/></kml:kml>"#,
        )
        .unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.local_name(), "kml");
        assert!(root.child("Style").is_some());
    }

    #[test]
    fn test_builder_escapes_content() {
        let element = XmlElement::new("Style")
            .with_attribute("id", "a\"<&")
            .with_child(XmlElement::new("href").with_text("x?a=1&b=<2>"));
        let doc = XmlDocument {
            declaration: None,
            nodes: vec![element.into()],
        };
        let written = doc.to_xml_string().unwrap();
        assert!(!written.contains("a\"<&"));

        let reparsed = XmlDocument::parse(&written).unwrap();
        let root = reparsed.root().unwrap();
        assert_eq!(root.attribute("id"), Some("a\"<&"));
        assert_eq!(root.child_text("href").as_deref(), Some("x?a=1&b=<2>"));
    }

    #[test]
    fn test_malformed_documents_fail() {
        assert!(XmlDocument::parse("<kml><Document></kml>").is_err());
        assert!(XmlDocument::parse("<kml><Document>").is_err());
        assert!(XmlDocument::parse("   ").is_err());
        assert!(XmlDocument::parse("<!-- only a comment -->").is_err());
    }

    #[test]
    fn test_insert_children_clamps_index() {
        let mut element = XmlElement::new("Document").with_child(XmlElement::new("name"));
        element.insert_children(0, vec![XmlElement::new("Style").into()]);
        element.insert_children(99, vec![XmlElement::new("Placemark").into()]);
        let names: Vec<_> = element.elements().map(XmlElement::local_name).collect();
        assert_eq!(names, vec!["Style", "name", "Placemark"]);
    }
}
