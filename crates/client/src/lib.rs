//! A blocking HTTP client backed by libcurl
//!
//! The client sends [`Request`](micro_http_message::message::Request) values built with
//! `micro-http-message` and turns every transfer into a
//! [`Response`](micro_http_message::message::Response). One libcurl easy handle is kept
//! per client and reused across requests.
//!
//! # Example
//!
//! ```no_run
//! use micro_http_client::CurlClient;
//! use micro_http_message::factory::{DefaultStreamFactory, StreamFactory};
//! use micro_http_message::message::{Message, Request};
//! use micro_http_message::stream::StreamMetadata;
//! use micro_http_message::uri::UriFactory;
//!
//! let uri = UriFactory.create_uri("https://example.com/").unwrap();
//! let body = DefaultStreamFactory.create_stream(bytes::Bytes::new(), StreamMetadata::default());
//! let request = Request::new(http::Method::GET, uri, body).with_header("Accept", "text/html");
//!
//! let mut client = CurlClient::new();
//! match client.send_request(&request) {
//!     Ok(response) => println!("{}", response.status_code()),
//!     Err(e) if e.is_network() => eprintln!("network failure: {e}"),
//!     Err(e) => eprintln!("request failure: {e}"),
//! }
//! ```
//!
//! # Transfer options
//!
//! [`options::TransferOptions`] holds the engine settings: timeouts, redirects, TLS
//! verification, proxy and user agent. A request can carry its own set as the
//! `curl-options` metadata entry of its body stream, which takes precedence over the
//! client wide options.
//!
//! # Error Handling
//!
//! [`ClientError`] separates failures worth retrying elsewhere
//! ([`ClientError::Network`]: resolution, connection, timeouts and TLS) from requests
//! that can not succeed as built ([`ClientError::Request`]).

pub mod error;
pub mod head;
pub mod options;
pub mod transport;

mod client;

pub use client::{Client, CurlClient, CurlClientBuilder};
pub use error::ClientError;
