//! Data structures and parser for Burp Suite proxy history exports.
//!
//! An export looks like this (most per-item elements elided):
//!
//! ```xml
//! <items burpVersion="2023.1" exportTime="...">
//!   <item>
//!     <url><![CDATA[https://example.com/]]></url>
//!     <method><![CDATA[GET]]></method>
//!     <request base64="true"><![CDATA[R0VUIC8gSFRUUC8xLjE=]]></request>
//!     <response base64="true"><![CDATA[...]]></response>
//!     <comment></comment>
//!   </item>
//! </items>
//! ```
//!
//! The whole document is read into memory and parsed into a
//! [`HistoryDocument`] before any output is produced.

use crate::error::{ConvertError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::fs;
use std::path::Path;

const ROOT_ELEMENT: &[u8] = b"items";
const ITEM_ELEMENT: &[u8] = b"item";
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// One captured HTTP exchange.
///
/// # Fields
/// * `comment` - User comment attached in the proxy, empty when unset
/// * `url` - Full request URL
/// * `method` - HTTP verb
/// * `request` - Base64 encoded raw request, `None` when the element is absent
/// * `response` - Base64 encoded raw response, `None` when the element is absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryRecord {
    pub comment: String,
    pub url: String,
    pub method: String,
    pub request: Option<String>,
    pub response: Option<String>,
}

/// All records of an export, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryDocument {
    pub records: Vec<HistoryRecord>,
}

impl HistoryDocument {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryRecord> {
        self.records.iter()
    }
}

/// Item child elements that end up in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Comment,
    Url,
    Method,
    Request,
    Response,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"comment" => Some(Field::Comment),
            b"url" => Some(Field::Url),
            b"method" => Some(Field::Method),
            b"request" => Some(Field::Request),
            b"response" => Some(Field::Response),
            _ => None,
        }
    }

    fn store(self, record: &mut HistoryRecord, text: String) {
        match self {
            Field::Comment => record.comment = text,
            Field::Url => record.url = text,
            Field::Method => record.method = text,
            Field::Request => record.request = Some(text),
            Field::Response => record.response = Some(text),
        }
    }
}

/// Reads and parses a history export from disk.
///
/// The file must be UTF-8; a leading byte-order mark is skipped.
pub fn load_history(path: &Path) -> Result<HistoryDocument> {
    let bytes = fs::read(path).map_err(|e| ConvertError::io(path, e))?;
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
    let xml = std::str::from_utf8(bytes).map_err(|e| {
        ConvertError::Parse(format!("{} is not valid UTF-8: {e}", path.display()))
    })?;
    parse_history(xml)
}

/// Parses a history export held in memory.
///
/// Item children other than `comment`, `url`, `method`, `request` and
/// `response` are skipped, as are all attributes. Missing children leave
/// the corresponding field empty (or `None` for the payloads).
///
/// # Errors
/// [`ConvertError::Parse`] when the XML is malformed or truncated, or when
/// the root element is not `items`.
pub fn parse_history(xml: &str) -> Result<HistoryDocument> {
    let mut reader = Reader::from_str(xml);
    let mut document = HistoryDocument::default();

    let mut depth = 0usize;
    let mut seen_root = false;
    let mut record: Option<HistoryRecord> = None;
    let mut field: Option<(Field, String)> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            ConvertError::Parse(format!(
                "malformed XML near byte {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(start) => {
                if depth == 0 {
                    check_root(&start, seen_root)?;
                    seen_root = true;
                } else {
                    open_element(&start, depth, &mut record, &mut field);
                }
                depth += 1;
            }
            Event::Empty(start) => {
                if depth == 0 {
                    check_root(&start, seen_root)?;
                    seen_root = true;
                } else {
                    open_element(&start, depth, &mut record, &mut field);
                    close_element(depth + 1, &mut document, &mut record, &mut field);
                }
            }
            Event::End(_) => {
                close_element(depth, &mut document, &mut record, &mut field);
                depth = depth.saturating_sub(1);
            }
            Event::Text(text) if depth == 3 => {
                if let Some((_, buf)) = field.as_mut() {
                    let text = text.unescape().map_err(|e| {
                        ConvertError::Parse(format!(
                            "bad character reference near byte {}: {e}",
                            reader.buffer_position()
                        ))
                    })?;
                    buf.push_str(&text);
                }
            }
            Event::CData(cdata) if depth == 3 => {
                if let Some((_, buf)) = field.as_mut() {
                    let raw = cdata.into_inner();
                    let text = std::str::from_utf8(&raw).map_err(|e| {
                        ConvertError::Parse(format!("CDATA section is not valid UTF-8: {e}"))
                    })?;
                    buf.push_str(text);
                }
            }
            Event::Text(text) if depth == 0 && !text.iter().all(u8::is_ascii_whitespace) => {
                return Err(ConvertError::Parse(format!(
                    "text outside the root element near byte {}",
                    reader.buffer_position()
                )));
            }
            Event::CData(_) if depth == 0 => {
                return Err(ConvertError::Parse(format!(
                    "CDATA outside the root element near byte {}",
                    reader.buffer_position()
                )));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(ConvertError::Parse("document has no root element".into()));
    }
    if depth != 0 {
        return Err(ConvertError::Parse(
            "unexpected end of document inside an open element".into(),
        ));
    }

    tracing::debug!(records = document.len(), "parsed proxy history");
    Ok(document)
}

fn check_root(start: &BytesStart<'_>, seen_root: bool) -> Result<()> {
    if seen_root {
        return Err(ConvertError::Parse(
            "document has more than one root element".into(),
        ));
    }
    let name = start.local_name();
    if name.as_ref() != ROOT_ELEMENT {
        return Err(ConvertError::Parse(format!(
            "expected root element <items>, found <{}>",
            String::from_utf8_lossy(name.as_ref())
        )));
    }
    Ok(())
}

/// Handles an element opening at `depth` (root is depth 0).
fn open_element(
    start: &BytesStart<'_>,
    depth: usize,
    record: &mut Option<HistoryRecord>,
    field: &mut Option<(Field, String)>,
) {
    let name = start.local_name();
    match depth {
        1 if name.as_ref() == ITEM_ELEMENT => *record = Some(HistoryRecord::default()),
        2 if record.is_some() => {
            *field = Field::from_name(name.as_ref()).map(|f| (f, String::new()));
        }
        _ => {}
    }
}

/// Handles an element closing while the reader is at `depth`
/// (the closing element itself sits at `depth - 1`).
fn close_element(
    depth: usize,
    document: &mut HistoryDocument,
    record: &mut Option<HistoryRecord>,
    field: &mut Option<(Field, String)>,
) {
    match depth {
        3 => {
            if let (Some((f, text)), Some(current)) = (field.take(), record.as_mut()) {
                f.store(current, text.trim().to_string());
            }
        }
        2 => {
            if let Some(done) = record.take() {
                document.records.push(done);
            }
        }
        _ => {}
    }
}
