//! The seam between the client and the native transfer engine.
//!
//! [`Transport`] mirrors the lifecycle of a libcurl easy handle: open it once, then
//! configure, perform and inspect one transfer at a time, and close it when done.
//! [`CurlTransport`] is the libcurl implementation, tests drive the client through
//! a mock.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::RequestOptions;

pub mod codes;

mod curl_transport;
pub use curl_transport::CurlTransport;

/// A failure reported by the transfer engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (code {code})")]
pub struct NativeError {
    /// The libcurl error code
    pub code: i32,
    pub message: String,
}

impl NativeError {
    pub fn new<S: ToString>(code: i32, message: S) -> Self {
        Self { code, message: message.to_string() }
    }

    pub fn no_handle() -> Self {
        Self::new(codes::FAILED_INIT, "no cURL handle, open the transport first")
    }
}

/// The outcome of a successful transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutput {
    /// The raw response, head and body, as received
    Captured(Bytes),
    /// The transfer completed without capturing the response
    Completed,
}

/// Facts the engine reports about the last transfer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferInfo {
    /// The last effective url
    pub url: String,
    pub http_code: u16,
    /// Number of bytes of all received response heads
    pub header_size: usize,
    pub content_type: Option<String>,
    pub redirect_count: u32,
    /// Seconds
    pub total_time: f64,
    pub namelookup_time: f64,
    pub connect_time: f64,
    pub primary_ip: Option<String>,
    pub primary_port: Option<u16>,
}

/// A native transfer engine handle.
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// Acquires the native handle, reusing the current one if there is one.
    fn open(&mut self) -> Result<(), NativeError>;

    /// Replaces every option of the handle with `options`.
    fn configure(&mut self, options: &RequestOptions) -> Result<(), NativeError>;

    /// Executes one transfer with the configured options.
    fn perform(&mut self) -> Result<TransferOutput, NativeError>;

    /// Returns the info of the last transfer.
    fn info(&mut self) -> TransferInfo;

    /// Releases the native handle. Closing a closed transport does nothing.
    fn close(&mut self);
}
