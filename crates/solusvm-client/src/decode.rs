//! Decoding of SolusVM client API responses.
//!
//! The panel answers with a sequence of sibling elements and no document root, e.g.
//! `<status>success</status><statusmsg></statusmsg><hostname>vps1</hostname>`. The body is
//! wrapped in a synthetic `<vminfo>` envelope before parsing so that it is well-formed XML.

use crate::models::{HardwareUsage, RawStatusResponse};
use crate::Result;
use quick_xml::events::Event;
use quick_xml::Reader;
use solusvm_core::Error;
use tracing::debug;

const ENVELOPE: &str = "vminfo";

/// Decode a raw response body into a [`RawStatusResponse`].
///
/// Only the top-level elements of the body are read; unknown elements and their children are
/// ignored and absent fields decode as empty strings. A body consisting of a single wrapping
/// root (e.g. `<vminfo>...</vminfo>`) is read one level down instead. Field text is kept as
/// sent, joined across comments and CDATA sections, and trimmed once at the closing tag.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the body is not UTF-8 or not well-formed XML.
pub fn decode_response(body: &[u8]) -> Result<RawStatusResponse> {
    let text = std::str::from_utf8(body)
        .map_err(|err| Error::Decode(format!("response is not valid UTF-8: {err}")))?;
    let wrapped = format!("<{ENVELOPE}>{}</{ENVELOPE}>", strip_prolog(text));

    let mut reader = Reader::from_str(&wrapped);
    let mut fields = FieldCollector::default();

    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                fields.open(String::from_utf8_lossy(element.local_name().as_ref()).into_owned());
            }
            Event::Empty(element) => {
                fields.open(String::from_utf8_lossy(element.local_name().as_ref()).into_owned());
                fields.close();
            }
            Event::End(_) => fields.close(),
            Event::Text(content) => {
                let text = content
                    .unescape()
                    .map_err(|err| Error::Decode(err.to_string()))?;
                fields.append(&text);
            }
            Event::CData(content) => fields.append(&String::from_utf8_lossy(&content)),
            Event::Eof => break,
            _ => {}
        }
    }

    let response = fields.finish()?;
    debug!(
        status = %response.status,
        vm_state = %response.vm_state,
        "decoded SolusVM response"
    );
    Ok(response)
}

/// Collects field text while walking the enveloped body.
///
/// Depth 1 is the envelope, depth 2 the top-level elements of the body. Fields found at depth 3
/// are kept aside and used only when the body turns out to be a single non-field root.
#[derive(Default)]
struct FieldCollector {
    open: Vec<String>,
    top: RawStatusResponse,
    nested: RawStatusResponse,
    roots: usize,
    root_is_field: bool,
}

impl FieldCollector {
    fn slot(&mut self) -> Option<&mut String> {
        let name = self.open.last()?;
        match self.open.len() {
            2 => self.top.slot_mut(name),
            3 if self.roots == 1 => self.nested.slot_mut(name),
            _ => None,
        }
    }

    fn open(&mut self, name: String) {
        if self.open.len() == 1 {
            self.roots += 1;
            if self.roots == 1 {
                self.root_is_field = self.top.slot_mut(&name).is_some();
            }
        }
        self.open.push(name);
        if let Some(slot) = self.slot() {
            slot.clear();
        }
    }

    fn append(&mut self, text: &str) {
        if let Some(slot) = self.slot() {
            slot.push_str(text);
        }
    }

    fn close(&mut self) {
        if let Some(slot) = self.slot() {
            *slot = slot.trim().to_string();
        }
        self.open.pop();
    }

    fn finish(self) -> Result<RawStatusResponse> {
        if !self.open.is_empty() {
            return Err(Error::Decode(format!(
                "unexpected end of response inside <{}>",
                self.open.join("><")
            )));
        }

        if self.roots == 1 && !self.root_is_field {
            Ok(self.nested)
        } else {
            Ok(self.top)
        }
    }
}

/// Drop a byte-order mark and a leading `<?xml ...?>` declaration, which may not appear inside
/// the envelope.
fn strip_prolog(text: &str) -> &str {
    let text = text.trim_start_matches('\u{feff}').trim();
    if text.starts_with("<?xml") {
        if let Some(end) = text.find("?>") {
            return text[end + 2..].trim_start();
        }
    }
    text
}

/// Parse a `total,used,free,percent` usage quadruple.
///
/// Tokens are trimmed and parsed as base-10 integers; tokens beyond the fourth are ignored.
/// `field` names the response element (`hdd`, `mem`, `bw`) for error reporting.
///
/// # Errors
///
/// Returns [`Error::MalformedUsage`] if there are fewer than four tokens or a token is not an
/// integer.
pub fn parse_usage(field: &str, raw: &str) -> Result<HardwareUsage> {
    let tokens: Vec<&str> = raw.trim().split(',').map(str::trim).collect();
    if tokens.len() < 4 {
        return Err(Error::malformed_usage(
            field,
            raw,
            format!("expected 4 comma-separated fields, found {}", tokens.len()),
        ));
    }

    let number = |index: usize, label: &str| -> Result<i64> {
        tokens[index].parse::<i64>().map_err(|err| {
            Error::malformed_usage(
                field,
                raw,
                format!("{label} `{}` is not an integer: {err}", tokens[index]),
            )
        })
    };

    Ok(HardwareUsage {
        total: number(0, "total")?,
        used: number(1, "used")?,
        free: number(2, "free")?,
        percent_used: number(3, "percent")?,
    })
}

/// Split the comma-joined `ipaddr` list; an empty string yields no addresses.
#[must_use]
pub fn split_addresses(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}
