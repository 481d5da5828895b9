//! Minimal element tree serialized through `quick-xml`.

use armlink_domain::{ArmLinkError, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// An XML element with attributes and either text or child elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Leaf element carrying `text`.
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self { name: name.into(), text: Some(text.into()), ..Self::default() }
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: Self) {
        self.children.push(child);
    }

    /// First direct child with the given name.
    pub fn find(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given name.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn write<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.text.is_none() && self.children.is_empty() {
            return emit(writer, Event::Empty(start));
        }

        emit(writer, Event::Start(start))?;
        if let Some(text) = &self.text {
            emit(writer, Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        emit(writer, Event::End(BytesEnd::new(self.name.as_str())))
    }
}

fn emit<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| ArmLinkError::Internal(format!("failed to write XML: {e}")))
}

/// Serializes `root` as a UTF-8 document with declaration and two-space
/// indentation. Text and attribute values are escaped.
pub fn to_document(root: &XmlElement) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    root.write(&mut writer)?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| ArmLinkError::Internal(format!("generated XML is not UTF-8: {e}")))
}
