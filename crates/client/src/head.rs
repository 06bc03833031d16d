//! Splitting and parsing of captured responses.
//!
//! With header capture enabled the engine hands back every received response head
//! followed by the body:
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/plain\r\n
//! \r\n
//! body
//! ```
//!
//! The engine also reports the total size of the heads, which is where the raw bytes
//! are split. Parsing is lenient: lines without a colon (status lines, blank lines)
//! are skipped, and of repeated headers the last one wins.

use bytes::Bytes;
use micro_http_message::message::Headers;
use micro_http_message::protocol::DEFAULT_VERSION;

/// Offset of the version in a `HTTP/x.y ...` status line
const VERSION_OFFSET: usize = "HTTP/".len();

/// Bytes trimmed from both ends of the head and the body
const TRIMMED: &[u8] = b" \t\n\r\0\x0B";

/// Splits `raw` at `header_size` into the head and the body, both trimmed of spaces,
/// tabs, line breaks, nul and vertical tab bytes.
pub fn split_raw(raw: &Bytes, header_size: usize) -> (Bytes, Bytes) {
    let split = header_size.min(raw.len());
    let head = raw.slice(..split);
    let body = raw.slice(split..);
    (trim(&head), trim(&body))
}

fn trim(bytes: &Bytes) -> Bytes {
    let start = bytes.iter().position(|b| !TRIMMED.contains(b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !TRIMMED.contains(b)).map_or(start, |last| last + 1);
    bytes.slice(start..end)
}

/// Returns the protocol version of the first status line, `1.1` when there is none.
pub fn parse_protocol_version(head: &str) -> &str {
    head.find(' ')
        .and_then(|space| head.get(VERSION_OFFSET..space))
        .filter(|version| !version.is_empty())
        .unwrap_or(DEFAULT_VERSION)
}

/// Parses the header lines of `head`.
pub fn parse_headers(head: &str) -> Headers {
    let mut lines: Vec<(&str, &str)> = Vec::new();
    for line in head.split('\n') {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        match lines.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => lines.push((name, value)),
        }
    }

    let mut headers = Headers::new();
    for (name, value) in lines {
        headers.set(name, value);
    }
    headers
}
