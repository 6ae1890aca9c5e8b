//! Multistatus document for single-resource PROPFIND responses.

use crate::error::{FileDavError, FileDavResult};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fmt::Display;

/// Properties reported for one resource.
#[derive(Debug, Clone)]
pub struct PropEntry<'a> {
    /// Request path as the client sent it.
    pub href: &'a str,
    /// Last path segment.
    pub display_name: &'a str,
    /// Inferred MIME type (files only).
    pub content_type: Option<&'a str>,
    /// Size in bytes (files only).
    pub content_length: Option<u64>,
    /// Whether the resource is a directory.
    pub is_collection: bool,
}

fn xml_err(e: impl Display) -> FileDavError {
    FileDavError::Xml(e.to_string())
}

/// Render a depth-0 multistatus document for `entry`.
///
/// All text content goes through the writer's escaping, so names containing
/// `<`, `&` or quotes still produce a well-formed document.
pub fn render_multistatus(entry: &PropEntry<'_>) -> FileDavResult<String> {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_err)?;

    let mut root = BytesStart::new("D:multistatus");
    root.push_attribute(("xmlns:D", "DAV:"));
    writer.write_event(Event::Start(root)).map_err(xml_err)?;
    start(&mut writer, "D:response")?;

    text_element(&mut writer, "D:href", entry.href)?;

    start(&mut writer, "D:propstat")?;
    start(&mut writer, "D:prop")?;
    text_element(&mut writer, "D:displayname", entry.display_name)?;
    if let Some(content_type) = entry.content_type {
        text_element(&mut writer, "D:getcontenttype", content_type)?;
    }
    if let Some(len) = entry.content_length {
        text_element(&mut writer, "D:getcontentlength", &len.to_string())?;
    }
    if entry.is_collection {
        start(&mut writer, "D:resourcetype")?;
        writer
            .write_event(Event::Empty(BytesStart::new("D:collection")))
            .map_err(xml_err)?;
        end(&mut writer, "D:resourcetype")?;
    } else {
        writer
            .write_event(Event::Empty(BytesStart::new("D:resourcetype")))
            .map_err(xml_err)?;
    }
    end(&mut writer, "D:prop")?;
    text_element(&mut writer, "D:status", "HTTP/1.1 200 OK")?;
    end(&mut writer, "D:propstat")?;

    end(&mut writer, "D:response")?;
    end(&mut writer, "D:multistatus")?;

    String::from_utf8(writer.into_inner()).map_err(xml_err)
}

fn start(writer: &mut Writer<Vec<u8>>, name: &str) -> FileDavResult<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_err)
}

fn end(writer: &mut Writer<Vec<u8>>, name: &str) -> FileDavResult<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_err)
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> FileDavResult<()> {
    start(writer, name)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_err)?;
    end(writer, name)
}
