//! DistributionConfig XML encoding
//!
//! Leaves become text elements, mappings become nested elements and a
//! sequence under key `K` becomes repeated `<K>` siblings. The reader
//! reverses this: repeated siblings are read back as a sequence and an
//! element without children as a string, with its text kept verbatim.
//! Text between child elements is indentation and is dropped.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::config::{Mapping, Value};

/// Root element of the document
pub const ROOT_ELEMENT: &str = "DistributionConfig";

/// CloudFront API namespace
pub const XML_NAMESPACE: &str = "http://cloudfront.amazonaws.com/doc/2020-05-31/";

/// XML encoding errors
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("Invalid element name '{0}'")]
    InvalidElementName(String),

    #[error("Nested sequence under element '{0}' cannot be encoded")]
    NestedSequence(String),

    #[error("Unexpected root element '{0}', expected DistributionConfig")]
    UnexpectedRoot(String),

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Document is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serialize a tree as a `<DistributionConfig>` document
pub fn to_xml(tree: &Mapping) -> Result<String, XmlError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new(ROOT_ELEMENT).with_attributes([("xmlns", XML_NAMESPACE)]),
    ))?;
    write_mapping(&mut writer, tree)?;
    writer.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;

    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_mapping(writer: &mut Writer<Vec<u8>>, mapping: &Mapping) -> Result<(), XmlError> {
    for (name, value) in mapping.iter() {
        match value {
            Value::Sequence(items) => {
                for item in items {
                    if let Value::Sequence(_) = item {
                        return Err(XmlError::NestedSequence(name.to_string()));
                    }
                    write_element(writer, name, item)?;
                }
            }
            _ => write_element(writer, name, value)?,
        }
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<(), XmlError> {
    if !is_valid_name(name) {
        return Err(XmlError::InvalidElementName(name.to_string()));
    }

    writer.write_event(Event::Start(BytesStart::new(name)))?;
    match value {
        Value::String(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        Value::Mapping(children) => write_mapping(writer, children)?,
        Value::Sequence(_) => return Err(XmlError::NestedSequence(name.to_string())),
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// XML names without namespaces: a letter or underscore followed by
/// letters, digits, `-`, `_` or `.`
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    !name.to_ascii_lowercase().starts_with("xml")
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// An element being read
struct OpenElement {
    name: String,
    children: Mapping,
    text: String,
}

/// Parse a `<DistributionConfig>` document back into a tree
pub fn from_xml(xml: &str) -> Result<Mapping, XmlError> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<Mapping> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                if stack.is_empty() {
                    if root.is_some() {
                        return Err(XmlError::Malformed("multiple root elements".to_string()));
                    }
                    if name != ROOT_ELEMENT {
                        return Err(XmlError::UnexpectedRoot(name));
                    }
                }
                stack.push(OpenElement {
                    name,
                    children: Mapping::new(),
                    text: String::new(),
                });
            }
            Event::Empty(empty) => {
                let name = String::from_utf8_lossy(empty.name().as_ref()).into_owned();
                match stack.last_mut() {
                    Some(parent) => {
                        add_child(&mut parent.children, name, Value::String(String::new()))
                    }
                    None if name == ROOT_ELEMENT => root = Some(Mapping::new()),
                    None => return Err(XmlError::UnexpectedRoot(name)),
                }
            }
            Event::Text(text) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let open = stack
                    .pop()
                    .ok_or_else(|| XmlError::Malformed("unbalanced end tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => {
                        let value = if open.children.is_empty() {
                            Value::String(open.text)
                        } else {
                            Value::Mapping(open.children)
                        };
                        add_child(&mut parent.children, open.name, value);
                    }
                    None => root = Some(open.children),
                }
            }
            Event::Eof => break,
            // declaration, comments, processing instructions, doctype
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(XmlError::Malformed("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| XmlError::Malformed("missing root element".to_string()))
}

/// Repeated siblings collect into a sequence
fn add_child(children: &mut Mapping, name: String, value: Value) {
    let merged = match children.get(&name) {
        None => value,
        Some(Value::Sequence(items)) => {
            let mut items = items.clone();
            items.push(value);
            Value::Sequence(items)
        }
        Some(existing) => Value::Sequence(vec![existing.clone(), value]),
    };
    children.insert(name, merged);
}
