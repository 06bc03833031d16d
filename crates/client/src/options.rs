//! Transfer configuration.
//!
//! [`TransferOptions`] holds the tunables a caller may choose: timeouts, redirects,
//! TLS verification and proxying. It is configured on the client, and may be
//! overridden per request by storing its json form in the request body metadata
//! under [`CURL_OPTIONS_KEY`]:
//!
//! ```
//! use micro_http_client::options::{TransferOptions, CURL_OPTIONS_KEY};
//! use micro_http_message::stream::StreamMetadata;
//!
//! let options = TransferOptions { max_redirects: 0, ..Default::default() };
//! let metadata = StreamMetadata::default().with_entry(CURL_OPTIONS_KEY, serde_json::to_value(&options).unwrap());
//! # let _ = metadata;
//! ```
//!
//! [`RequestOptions`] is the complete option set of one transfer: the tunables plus
//! everything derived from the request itself.

use bytes::Bytes;
use http::Version;
use serde::{Deserialize, Serialize};

/// Body metadata key holding per-request [`TransferOptions`].
pub const CURL_OPTIONS_KEY: &str = "curl-options";

/// Response body metadata key holding the [`TransferInfo`](crate::transport::TransferInfo).
pub const TRANSFER_INFO_KEY: &str = "curl";

const DEFAULT_CONNECT_TIMEOUT: u64 = 30;
const DEFAULT_MAX_REDIRECTS: u32 = 5;

/// Caller tunables of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferOptions {
    /// Seconds allowed for connecting, 30 by default
    pub connect_timeout: u64,
    /// Seconds allowed for the whole transfer, unlimited by default
    pub timeout: Option<u64>,
    pub max_redirects: u32,
    pub follow_location: bool,
    /// Capture the response head in front of the body
    pub include_headers: bool,
    pub verify_peer: bool,
    pub verify_host: bool,
    pub proxy: Option<String>,
    pub user_agent: Option<String>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            timeout: None,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            follow_location: true,
            include_headers: true,
            verify_peer: true,
            verify_host: true,
            proxy: None,
            user_agent: None,
        }
    }
}

/// The protocol version asked from the engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HttpVersionOption {
    Http10,
    Http11,
    Http2,
    /// Let the engine pick
    Negotiate,
}

impl HttpVersionOption {
    /// Maps a bare protocol version such as `"1.1"` or `"2.0"`.
    pub fn from_protocol(version: &str) -> Self {
        match micro_http_message::protocol::parse_version(version) {
            Some(v) if v == Version::HTTP_10 => HttpVersionOption::Http10,
            Some(v) if v == Version::HTTP_11 => HttpVersionOption::Http11,
            Some(v) if v == Version::HTTP_2 => HttpVersionOption::Http2,
            _ => HttpVersionOption::Negotiate,
        }
    }
}

/// The complete option set of one transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub transfer: TransferOptions,
    pub url: String,
    pub method: String,
    /// `Name: value` lines
    pub headers: Vec<String>,
    pub body: Option<Bytes>,
    pub http_version: HttpVersionOption,
    /// Whether the response is captured, false when no response body is expected
    pub return_transfer: bool,
}

impl RequestOptions {
    pub fn new<U: Into<String>, M: Into<String>>(url: U, method: M, transfer: TransferOptions) -> Self {
        Self {
            transfer,
            url: url.into(),
            method: method.into(),
            headers: Vec::new(),
            body: None,
            http_version: HttpVersionOption::Negotiate,
            return_transfer: true,
        }
    }
}
