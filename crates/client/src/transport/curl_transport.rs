use std::time::Duration;

use bytes::Bytes;
use curl::easy::{Easy, HttpVersion, List};
use tracing::trace;

use super::{NativeError, Transport, TransferInfo, TransferOutput};
use crate::options::{HttpVersionOption, RequestOptions};

impl From<curl::Error> for NativeError {
    fn from(e: curl::Error) -> Self {
        let message = e.extra_description().unwrap_or_else(|| e.description());
        NativeError::new(e.code() as i32, message)
    }
}

/// A [`Transport`] over a libcurl easy handle.
///
/// The handle is created by the first [`Transport::open`] and reused by every later
/// transfer until [`Transport::close`].
#[derive(Debug, Default)]
pub struct CurlTransport {
    handle: Option<Easy>,
    capture: bool,
    count_headers: bool,
    header_size: usize,
}

impl CurlTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> Result<&mut Easy, NativeError> {
        self.handle.as_mut().ok_or_else(NativeError::no_handle)
    }
}

impl Transport for CurlTransport {
    // libcurl's handle allocation can not be observed failing through the `curl` crate,
    // `Easy::new` panics instead, so this implementation never returns an error.
    fn open(&mut self) -> Result<(), NativeError> {
        if self.handle.is_none() {
            trace!("creating cURL handle");
            self.handle = Some(Easy::new());
        }
        Ok(())
    }

    fn configure(&mut self, options: &RequestOptions) -> Result<(), NativeError> {
        let easy = self.handle()?;
        easy.reset();

        easy.url(&options.url)?;
        easy.custom_request(&options.method)?;

        let mut headers = List::new();
        for line in &options.headers {
            headers.append(line)?;
        }
        easy.http_headers(headers)?;

        if let Some(body) = &options.body {
            easy.post_fields_copy(body)?;
        }

        easy.http_version(match options.http_version {
            HttpVersionOption::Http10 => HttpVersion::V10,
            HttpVersionOption::Http11 => HttpVersion::V11,
            HttpVersionOption::Http2 => HttpVersion::V2,
            HttpVersionOption::Negotiate => HttpVersion::Any,
        })?;

        let transfer = &options.transfer;
        easy.connect_timeout(Duration::from_secs(transfer.connect_timeout))?;
        if let Some(timeout) = transfer.timeout {
            easy.timeout(Duration::from_secs(timeout))?;
        }
        easy.follow_location(transfer.follow_location)?;
        easy.max_redirections(transfer.max_redirects)?;
        easy.show_header(transfer.include_headers)?;
        easy.ssl_verify_peer(transfer.verify_peer)?;
        easy.ssl_verify_host(transfer.verify_host)?;
        if let Some(proxy) = &transfer.proxy {
            easy.proxy(proxy)?;
        }
        if let Some(user_agent) = &transfer.user_agent {
            easy.useragent(user_agent)?;
        }
        easy.nobody(!options.return_transfer)?;

        self.capture = options.return_transfer;
        self.count_headers = transfer.include_headers;
        Ok(())
    }

    fn perform(&mut self) -> Result<TransferOutput, NativeError> {
        let capture = self.capture;
        let count_headers = self.count_headers;
        let easy = self.handle()?;

        let mut data = Vec::new();
        let mut header_size = 0;
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|chunk| {
                if capture {
                    data.extend_from_slice(chunk);
                }
                Ok(chunk.len())
            })?;
            transfer.header_function(|header| {
                if count_headers {
                    header_size += header.len();
                }
                true
            })?;
            transfer.perform()?;
        }

        self.header_size = header_size;
        trace!(received = data.len(), header_size, "cURL transfer finished");
        Ok(if capture { TransferOutput::Captured(Bytes::from(data)) } else { TransferOutput::Completed })
    }

    fn info(&mut self) -> TransferInfo {
        let header_size = self.header_size;
        let Some(easy) = self.handle.as_mut() else {
            return TransferInfo::default();
        };

        TransferInfo {
            url: easy.effective_url().ok().flatten().unwrap_or_default().to_owned(),
            http_code: easy.response_code().ok().and_then(|code| u16::try_from(code).ok()).unwrap_or_default(),
            header_size,
            content_type: easy.content_type().ok().flatten().map(str::to_owned),
            redirect_count: easy.redirect_count().unwrap_or_default(),
            total_time: easy.total_time().map(|time| time.as_secs_f64()).unwrap_or_default(),
            namelookup_time: easy.namelookup_time().map(|time| time.as_secs_f64()).unwrap_or_default(),
            connect_time: easy.connect_time().map(|time| time.as_secs_f64()).unwrap_or_default(),
            primary_ip: easy.primary_ip().ok().flatten().map(str::to_owned),
            primary_port: easy.primary_port().ok(),
        }
    }

    fn close(&mut self) {
        if self.handle.take().is_some() {
            trace!("cURL handle released");
        }
        self.header_size = 0;
    }
}
