use std::collections::BTreeMap;
use std::mem;

use http::Method;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::request::parse_method;
use super::{DefaultStreamFactory, UploadedFileFactory};
use crate::message::{
    Headers, MessageError, MessageParts, RequestParts, ServerRequest, ServerRequestParts, UploadErrorCode, UploadedFile,
    UploadedFileTree,
};
use crate::protocol::DEFAULT_VERSION;
use crate::stream::{OpenMode, StreamMetadata};
use crate::uri::{Uri, UriFactory};

/// A single upload as described by the server environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadSpec {
    /// Temporary location of the received file
    pub tmp_name: String,
    pub size: Option<u64>,
    #[serde(default)]
    pub error: u8,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
}

/// Uploads nested the way the form fields were.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FileSpec {
    Upload(UploadSpec),
    Nested(BTreeMap<String, FileSpec>),
}

/// Creates [`ServerRequest`]s from CGI style server parameters.
#[derive(Debug, Default, Clone)]
pub struct ServerRequestFactory {
    streams: DefaultStreamFactory,
    uploads: UploadedFileFactory,
}

impl ServerRequestFactory {
    pub fn new(uploads: UploadedFileFactory) -> Self {
        Self { streams: DefaultStreamFactory, uploads }
    }

    /// Creates a server request.
    ///
    /// - the protocol version is taken from `SERVER_PROTOCOL`, `1.1` when absent
    /// - `HTTP_*` and `CONTENT_*` parameters become headers
    /// - cookies are read from `HTTP_COOKIE`
    /// - query params are decoded from the uri query, see [`ServerRequestParts::query_params`]
    /// - the body is the standard input, opened on first read
    pub fn create_server_request(
        &self,
        method: &str,
        uri: Uri,
        server_params: BTreeMap<String, String>,
        attributes: BTreeMap<String, Value>,
    ) -> Result<ServerRequest, MessageError> {
        let method = parse_method(method)?;
        let query_params = decode_query(uri.query());
        let cookie_params = server_params.get("HTTP_COOKIE").map(|cookies| parse_cookies(cookies)).unwrap_or_default();

        let message = MessageParts {
            protocol_version: protocol_version(server_params.get("SERVER_PROTOCOL").map(String::as_str)),
            headers: headers_from_params(&server_params),
            body: self.streams.create_request_body_stream(),
        };

        debug!(%method, %uri, "creating server request");
        Ok(ServerRequest::from_parts(ServerRequestParts {
            request: RequestParts { message, method, uri, request_target: None },
            attributes,
            cookie_params,
            parsed_body: None,
            query_params,
            server_params,
            uploaded_files: BTreeMap::new(),
        }))
    }

    /// Creates a server request from the process environment, the way a CGI program
    /// receives it.
    pub fn create_server_request_from_env(&self) -> Result<ServerRequest, MessageError> {
        let server_params: BTreeMap<String, String> = std::env::vars().collect();
        let method = server_params.get("REQUEST_METHOD").map_or(Method::GET.as_str(), String::as_str).to_owned();
        let uri = UriFactory.create_uri_from_server_params(&server_params)?;
        self.create_server_request(&method, uri, server_params, BTreeMap::new())
    }

    /// Turns upload descriptions into uploaded files over their temporary files.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidFiles`] for an unknown upload error code.
    pub fn normalize_files(&self, files: BTreeMap<String, FileSpec>) -> Result<BTreeMap<String, UploadedFileTree>, MessageError> {
        files
            .into_iter()
            .map(|(key, spec)| {
                let tree = match spec {
                    FileSpec::Upload(upload) => UploadedFileTree::File(self.create_uploaded_file(upload)?),
                    FileSpec::Nested(children) => UploadedFileTree::Nested(self.normalize_files(children)?),
                };
                Ok((key, tree))
            })
            .collect()
    }

    fn create_uploaded_file(&self, spec: UploadSpec) -> Result<UploadedFile, MessageError> {
        let error = UploadErrorCode::from_code(spec.error)
            .ok_or_else(|| MessageError::invalid_files(format!("unknown upload error code {} for {}", spec.error, spec.tmp_name)))?;
        let stream = self
            .streams
            .create_stream_from_file(&spec.tmp_name, OpenMode::READ_EXISTING, StreamMetadata::default())
            .map_err(|e| MessageError::invalid_files(e.to_string()))?;
        Ok(self.uploads.create_uploaded_file(stream, spec.size, error, spec.name, spec.media_type))
    }
}

fn protocol_version(server_protocol: Option<&str>) -> String {
    match server_protocol.filter(|protocol| !protocol.is_empty()) {
        Some(protocol) => protocol.replace("HTTP/", ""),
        None => DEFAULT_VERSION.to_owned(),
    }
}

/// `HTTP_ACCEPT_LANGUAGE` -> `Accept-Language`
fn header_name(param: &str) -> String {
    param
        .split('_')
        .map(|word| {
            let word = word.to_ascii_lowercase();
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

fn headers_from_params(params: &BTreeMap<String, String>) -> Headers {
    let mut headers = Headers::new();
    for (name, value) in params {
        let header = match name.strip_prefix("HTTP_") {
            Some(header) => header,
            None if name.starts_with("CONTENT_") => name.as_str(),
            None => continue,
        };
        headers.set(&header_name(header), value);
    }
    headers
}

/// Decodes a query string the way form field names nest: `a=1` is a plain value,
/// `a[]=1` appends to a list and `a[b]=1` sets a key of a map. Of repeated keys the
/// last one wins.
fn decode_query(encoded: &str) -> BTreeMap<String, Value> {
    let mut query = BTreeMap::new();
    for (key, value) in serde_urlencoded::from_str::<Vec<(String, String)>>(encoded).unwrap_or_default() {
        let (name, path) = split_key(&key);
        if name.is_empty() {
            continue;
        }
        let slot = query.entry(name.to_owned()).or_insert(Value::Null);
        insert_at(slot, &path, Value::String(value));
    }
    query
}

/// `a[b][]` -> `("a", ["b", ""])`, a key without complete brackets is a plain name
fn split_key(key: &str) -> (&str, Vec<&str>) {
    let Some(open) = key.find('[') else {
        return (key, Vec::new());
    };
    let (name, mut rest) = key.split_at(open);
    let mut path = Vec::new();
    while let Some(segment) = rest.strip_prefix('[') {
        let Some(close) = segment.find(']') else {
            break;
        };
        path.push(&segment[..close]);
        rest = &segment[close + 1..];
    }
    if path.is_empty() { (key, path) } else { (name, path) }
}

fn insert_at(slot: &mut Value, path: &[&str], value: Value) {
    let Some((segment, rest)) = path.split_first() else {
        *slot = value;
        return;
    };

    if segment.is_empty() {
        if !slot.is_array() && !slot.is_object() {
            *slot = Value::Array(Vec::new());
        }
        match slot {
            Value::Array(items) => {
                items.push(Value::Null);
                if let Some(last) = items.last_mut() {
                    insert_at(last, rest, value);
                }
            }
            Value::Object(map) => {
                let index = map.len().to_string();
                insert_at(map.entry(index).or_insert(Value::Null), rest, value);
            }
            _ => {}
        }
        return;
    }

    // a named key turns a list into a map indexed by position
    if let Value::Array(items) = &mut *slot {
        let items = mem::take(items);
        *slot = Value::Object(items.into_iter().enumerate().map(|(index, item)| (index.to_string(), item)).collect());
    }
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(map) = slot {
        insert_at(map.entry((*segment).to_owned()).or_insert(Value::Null), rest, value);
    }
}

fn parse_cookies(cookies: &str) -> BTreeMap<String, String> {
    cookies
        .split(';')
        .map(str::trim)
        .filter(|cookie| cookie.contains('='))
        .flat_map(|cookie| serde_urlencoded::from_str::<Vec<(String, String)>>(cookie).unwrap_or_default())
        .collect()
}
