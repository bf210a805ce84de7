//! Record serialization to XML and JSON text.

use crate::config::{OutputConfig, OutputFormat};
use crate::element::{Body, Element};
use crate::values::Atom;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;

/// Error type for record serialization.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("Failed to write XML: {0}")]
    Xml(#[from] std::io::Error),

    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serialized record is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serialize a record with the format and layout options of `output`.
pub fn serialize(element: &Element, output: &OutputConfig) -> Result<String, SerializeError> {
    match output.format {
        OutputFormat::Xml => to_xml(element, output.indent_width(), output.xml_declaration),
        OutputFormat::Json => to_json(element, output.indent_width()),
    }
}

// ============================================================================
// XML
// ============================================================================

/// Serialize a record as an XML document.
pub fn to_xml(
    element: &Element,
    indent: Option<usize>,
    declaration: bool,
) -> Result<String, SerializeError> {
    let mut writer = match indent {
        Some(width) => Writer::new_with_indent(Vec::new(), b' ', width),
        None => Writer::new(Vec::new()),
    };

    if declaration {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    }
    write_element(&mut writer, element)?;

    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), SerializeError> {
    let start = start_tag(element);
    match &element.body {
        Body::Value(value) => write_leaf(writer, start, value),
        Body::Values(values) => {
            for value in values {
                write_leaf(writer, start.clone(), value)?;
            }
            Ok(())
        }
        Body::Children(children) | Body::List(children) => {
            if children.is_empty() {
                writer.write_event(Event::Empty(start))?;
                return Ok(());
            }
            writer.write_event(Event::Start(start))?;
            for child in children {
                write_element(writer, child)?;
            }
            writer.write_event(Event::End(BytesEnd::new(element.tag.as_str())))?;
            Ok(())
        }
    }
}

fn start_tag(element: &Element) -> BytesStart<'_> {
    let mut start = BytesStart::new(element.tag.as_str());
    for (name, value) in &element.attributes {
        start.push_attribute((name.as_str(), value.to_text().as_str()));
    }
    start
}

fn write_leaf<W: Write>(
    writer: &mut Writer<W>,
    start: BytesStart<'_>,
    value: &Atom,
) -> Result<(), SerializeError> {
    if value.is_null() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    let end = start.to_end().into_owned();
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(&value.to_text())))?;
    writer.write_event(Event::End(end))?;
    Ok(())
}

// ============================================================================
// JSON
// ============================================================================

/// Convert a record into a JSON object keyed by its root tag.
pub fn to_json_value(element: &Element) -> Value {
    let mut map = Map::new();
    map.insert(element.tag.clone(), body_to_json(&element.body));
    Value::Object(map)
}

fn body_to_json(body: &Body) -> Value {
    match body {
        Body::Value(value) => value.to_json(),
        Body::Values(values) => Value::Array(values.iter().map(Atom::to_json).collect()),
        Body::Children(children) => Value::Object(
            children
                .iter()
                .map(|child| (child.tag.clone(), body_to_json(&child.body)))
                .collect(),
        ),
        Body::List(items) => Value::Array(items.iter().map(to_json_value).collect()),
    }
}

/// Serialize a record as a JSON document.
pub fn to_json(element: &Element, indent: Option<usize>) -> Result<String, SerializeError> {
    let value = to_json_value(element);
    let Some(width) = indent else {
        return Ok(serde_json::to_string(&value)?);
    };

    let indent = vec![b' '; width];
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8(buffer)?)
}
