//! XML input: `<record type="..">` or `<records>` holding `<record>` children.
//!
//! Record fields are child elements whose text is the value. Children of
//! `<records>` that are not `<record>` are ignored.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use snafu::ResultExt as _;
use tracing::debug;

use super::{
    Decoded, Fields, FormatError, InvalidFormatSnafu, LOG_TARGET, ParseResult, ReadSnafu,
    ShapeSnafu, Utf8Snafu, XmlSnafu, build_record, shape_error,
};
use crate::record::{Record, RecordResult};

/// Minimal element tree, enough for the flat record layout.
#[derive(Debug, Default)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let mut attrs = vec![];
        for attr in start.attributes() {
            let attr = attr?;
            attrs.push((
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                attr.unescape_value()?.into_owned(),
            ));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attrs,
            ..Default::default()
        })
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl Fields for Element {
    fn field(&self, name: &str) -> Option<&str> {
        self.children
            .iter()
            .find(|child| child.name == name)
            .map(|child| child.text.as_str())
    }
}

pub fn decode(bytes: &[u8]) -> ParseResult<Decoded> {
    let src = std::str::from_utf8(bytes)
        .context(Utf8Snafu)
        .context(InvalidFormatSnafu)?;
    let root = read_tree(src).context(InvalidFormatSnafu)?;
    let Some(root) = root else {
        return Err(shape_error("document has no root element"));
    };

    match root.name.as_str() {
        "records" => {
            let records: Vec<_> = root
                .children
                .iter()
                .filter(|child| child.name == "record")
                .collect();
            debug!(target: LOG_TARGET, count = records.len(), "Decoding XML record collection");
            Ok(records.into_iter().map(decode_element).collect())
        }
        "record" => {
            debug!(target: LOG_TARGET, "Decoding single XML record");
            Ok(std::iter::once(decode_element(&root)).collect())
        }
        other => Err(shape_error(format!(
            "expected <records> or <record> root element, found <{other}>"
        ))),
    }
}

pub fn decode_file(path: impl AsRef<Path>) -> ParseResult<Decoded> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).context(ReadSnafu {
        path: path.to_owned(),
    })?;
    decode(&bytes)
}

fn decode_element(element: &Element) -> RecordResult<Record> {
    build_record(element.attr("type"), element)
}

fn read_tree(src: &str) -> Result<Option<Element>, FormatError> {
    let mut reader = Reader::from_str(src);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = vec![];
    let mut root = None;

    loop {
        let element = match reader.read_event().context(XmlSnafu)? {
            Event::Start(start) => {
                stack.push(Element::from_start(&start).context(XmlSnafu)?);
                continue;
            }
            Event::Empty(start) => Element::from_start(&start).context(XmlSnafu)?,
            Event::End(_) => match stack.pop() {
                Some(element) => element,
                None => continue,
            },
            Event::Text(text) => {
                let text = text.unescape().context(XmlSnafu)?;
                match stack.last_mut() {
                    Some(current) => current.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return ShapeSnafu { reason: "text outside the root element" }.fail(),
                }
                continue;
            }
            Event::CData(cdata) => {
                match stack.last_mut() {
                    Some(current) => current
                        .text
                        .push_str(&String::from_utf8_lossy(&cdata.into_inner())),
                    None => return ShapeSnafu { reason: "text outside the root element" }.fail(),
                }
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_none() => root = Some(element),
            None => return ShapeSnafu { reason: "multiple root elements" }.fail(),
        }
    }

    if let Some(open) = stack.last() {
        return Err(quick_xml::Error::IllFormed(
            quick_xml::errors::IllFormedError::MissingEndTag(open.name.clone()),
        ))
        .context(XmlSnafu);
    }

    Ok(root)
}
