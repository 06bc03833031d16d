use std::collections::BTreeMap;

use http::Method;
use serde_json::Value;
use triomphe::Arc;

use super::{Body, Message, MessageParts, RequestMessage, RequestParts, UploadedFileTree};
use crate::copy_on_write;
use crate::uri::Uri;

/// The parts of a server side request.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerRequestParts {
    pub request: RequestParts,
    /// Values attached while handling the request
    pub attributes: BTreeMap<String, Value>,
    pub cookie_params: BTreeMap<String, String>,
    pub parsed_body: Option<Value>,
    /// Decoded query string, bracketed keys (`a[]`, `a[b]`) build nested values
    pub query_params: BTreeMap<String, Value>,
    /// Raw facts about the transport and environment, CGI style
    pub server_params: BTreeMap<String, String>,
    pub uploaded_files: BTreeMap<String, UploadedFileTree>,
}

impl ServerRequestParts {
    pub fn new(method: Method, uri: Uri, body: Body) -> Self {
        Self {
            request: RequestParts::new(method, uri, body),
            attributes: BTreeMap::new(),
            cookie_params: BTreeMap::new(),
            parsed_body: None,
            query_params: BTreeMap::new(),
            server_params: BTreeMap::new(),
            uploaded_files: BTreeMap::new(),
        }
    }
}

/// An immutable incoming request together with its server side context.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerRequest {
    inner: Arc<ServerRequestParts>,
}

impl ServerRequest {
    pub fn new(method: Method, uri: Uri, body: Body) -> Self {
        Self::from_parts(ServerRequestParts::new(method, uri, body))
    }

    pub fn from_parts(parts: ServerRequestParts) -> Self {
        Self { inner: Arc::new(parts) }
    }

    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.inner, &other.inner)
    }

    pub fn server_params(&self) -> &BTreeMap<String, String> {
        &self.inner.server_params
    }

    pub fn cookie_params(&self) -> &BTreeMap<String, String> {
        &self.inner.cookie_params
    }

    pub fn with_cookie_params(&self, cookies: BTreeMap<String, String>) -> Self {
        self.update(|parts| parts.cookie_params = cookies)
    }

    pub fn query_params(&self) -> &BTreeMap<String, Value> {
        &self.inner.query_params
    }

    pub fn with_query_params(&self, query: BTreeMap<String, Value>) -> Self {
        self.update(|parts| parts.query_params = query)
    }

    pub fn uploaded_files(&self) -> &BTreeMap<String, UploadedFileTree> {
        &self.inner.uploaded_files
    }

    pub fn with_uploaded_files(&self, files: BTreeMap<String, UploadedFileTree>) -> Self {
        self.update(|parts| parts.uploaded_files = files)
    }

    pub fn parsed_body(&self) -> Option<&Value> {
        self.inner.parsed_body.as_ref()
    }

    pub fn with_parsed_body(&self, data: Option<Value>) -> Self {
        self.update(|parts| parts.parsed_body = data)
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.inner.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.inner.attributes.get(name)
    }

    pub fn with_attribute<V: Into<Value>>(&self, name: &str, value: V) -> Self {
        self.update(|parts| {
            parts.attributes.insert(name.to_owned(), value.into());
        })
    }

    pub fn without_attribute(&self, name: &str) -> Self {
        if !self.inner.attributes.contains_key(name) {
            return self.clone();
        }
        self.update(|parts| {
            parts.attributes.remove(name);
        })
    }

    fn update<F: FnOnce(&mut ServerRequestParts)>(&self, f: F) -> Self {
        Self { inner: copy_on_write(&self.inner, f) }
    }
}

impl Message for ServerRequest {
    fn message_parts(&self) -> &MessageParts {
        &self.inner.request.message
    }

    fn map_message_parts<F: FnOnce(&mut MessageParts)>(&self, f: F) -> Self {
        self.update(|parts| f(&mut parts.request.message))
    }
}

impl RequestMessage for ServerRequest {
    fn request_parts(&self) -> &RequestParts {
        &self.inner.request
    }

    fn map_request_parts<F: FnOnce(&mut RequestParts)>(&self, f: F) -> Self {
        self.update(|parts| f(&mut parts.request))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn server_request() -> ServerRequest {
        ServerRequest::new(Method::POST, "http://localhost/form".parse().unwrap(), Body::empty())
    }

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
    }

    #[test]
    fn attributes() {
        let request = server_request().with_attribute("user", json!({"id": 7}));

        assert_eq!(request.attribute("user"), Some(&json!({"id": 7})));
        assert_eq!(request.attribute("missing"), None);

        let removed = request.without_attribute("user");
        assert!(removed.attributes().is_empty());
        assert!(request.attribute("user").is_some());
    }

    #[test]
    fn identity_is_preserved_for_equal_values() {
        let request = server_request()
            .with_attribute("n", 1)
            .with_cookie_params(params(&[("session", "abc")]))
            .with_query_params([("q".to_owned(), json!("rust"))].into())
            .with_parsed_body(Some(json!(["a"])));

        assert!(ServerRequest::ptr_eq(&request, &request.with_attribute("n", 1)));
        assert!(ServerRequest::ptr_eq(&request, &request.without_attribute("other")));
        assert!(ServerRequest::ptr_eq(&request, &request.with_cookie_params(params(&[("session", "abc")]))));
        assert!(ServerRequest::ptr_eq(&request, &request.with_query_params([("q".to_owned(), json!("rust"))].into())));
        assert!(ServerRequest::ptr_eq(&request, &request.with_parsed_body(Some(json!(["a"])))));
        assert!(ServerRequest::ptr_eq(&request, &request.with_uploaded_files(BTreeMap::new())));
        assert!(ServerRequest::ptr_eq(&request, &request.with_method(Method::POST)));

        assert!(!ServerRequest::ptr_eq(&request, &request.with_attribute("n", 2)));
        assert!(!ServerRequest::ptr_eq(&request, &request.with_parsed_body(None)));
        assert!(!ServerRequest::ptr_eq(&request, &request.with_query_params(BTreeMap::new())));
    }

    #[test]
    fn message_operations_apply() {
        let request = server_request().with_header("Content-Type", "text/plain").with_attribute("a", true);

        assert_eq!(request.header_line("content-type"), "text/plain");
        assert_eq!(request.attribute("a"), Some(&Value::Bool(true)));
        assert_eq!(request.request_target(), "/form");
    }
}
