//! Minimal XML element tree.
//!
//! Just enough structure for request bodies: element name, attributes,
//! text content, children. Parsed with quick-xml's pull reader; names are
//! kept verbatim (namespace prefixes included).

use quick_xml::events::attributes::AttrError;
use quick_xml::events::Event;
use quick_xml::Reader;

/// A parsed XML element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Depth-first search through all descendants.
    pub fn descendant(&self, name: &str) -> Option<&Element> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.descendant(name) {
                return Some(found);
            }
        }
        None
    }

    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// XML parse error
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("xml syntax error: {0}")]
    Syntax(#[from] quick_xml::Error),

    #[error("xml attribute error: {0}")]
    Attribute(#[from] AttrError),

    #[error("no root element")]
    NoRoot,

    #[error("unbalanced closing tag")]
    Unbalanced,

    #[error("content after the root element")]
    TrailingContent,
}

/// Parse a complete document, returning its root element.
pub fn parse(input: &str) -> Result<Element, XmlError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                attach(element_from_start(&start)?, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(cdata) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                }
            }
            Event::End(_) => {
                // tag-name mismatches are already rejected by the reader
                let element = stack.pop().ok_or(XmlError::Unbalanced)?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::Eof => break,
            // declarations, comments, processing instructions
            _ => {}
        }
    }

    root.ok_or(XmlError::NoRoot)
}

fn element_from_start(start: &quick_xml::events::BytesStart<'_>) -> Result<Element, XmlError> {
    let mut element = Element {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        ..Default::default()
    };
    for attribute in start.attributes() {
        let attribute = attribute?;
        element.attributes.push((
            String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
            attribute.unescape_value()?.into_owned(),
        ));
    }
    Ok(element)
}

/// A document has exactly one top level element; a second one is an error.
fn attach(
    element: Element,
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    } else {
        return Err(XmlError::TrailingContent);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements() {
        let doc = parse("<order><item sku=\"a1\">widget</item><qty>3</qty></order>").unwrap();
        assert_eq!(doc.name, "order");
        assert_eq!(doc.children.len(), 2);
        assert_eq!(doc.child("item").unwrap().text, "widget");
        assert_eq!(doc.child("item").unwrap().attr("sku"), Some("a1"));
        assert_eq!(doc.child("qty").unwrap().text, "3");
    }

    #[test]
    fn parses_empty_elements() {
        let doc = parse("<ping><pong/></ping>").unwrap();
        assert!(doc.child("pong").is_some());
        assert_eq!(doc.child("pong").unwrap().text, "");
    }

    #[test]
    fn descendant_search() {
        let doc = parse("<a><b><c>deep</c></b></a>").unwrap();
        assert_eq!(doc.descendant("c").unwrap().text, "deep");
        assert!(doc.descendant("missing").is_none());
    }

    #[test]
    fn unescapes_entities() {
        let doc = parse("<m>fish &amp; chips</m>").unwrap();
        assert_eq!(doc.text, "fish & chips");
    }

    #[test]
    fn rejects_mismatched_tags() {
        assert!(parse("<a><b></a></b>").is_err());
    }

    #[test]
    fn rejects_second_root_element() {
        assert!(matches!(parse("<a/><b/>"), Err(XmlError::TrailingContent)));
        assert!(matches!(
            parse("<a>x</a><b>y</b>"),
            Err(XmlError::TrailingContent)
        ));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(parse(""), Err(XmlError::NoRoot)));
    }

    #[test]
    fn skips_declaration_and_comments() {
        let doc = parse("<?xml version=\"1.0\"?><!-- hi --><root>x</root>").unwrap();
        assert_eq!(doc.name, "root");
        assert_eq!(doc.text, "x");
    }
}
