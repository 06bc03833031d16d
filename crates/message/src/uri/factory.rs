use std::collections::BTreeMap;

use super::{parse_url, Uri, UriError};

/// Creates [`Uri`] values from strings and from CGI style server parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct UriFactory;

impl UriFactory {
    /// Parses a full uri string.
    ///
    /// # Errors
    ///
    /// Returns [`UriError::Malformed`] if the authority has no host or the port is invalid.
    pub fn create_uri(&self, uri: &str) -> Result<Uri, UriError> {
        uri.parse()
    }

    /// Builds the uri a server request was sent to from its server parameters.
    ///
    /// | component | source                                                           |
    /// |-----------|------------------------------------------------------------------|
    /// | scheme    | `REQUEST_SCHEME`, else `https` when `HTTPS` is set and not `off` |
    /// | host      | `HTTP_HOST`, else `SERVER_NAME`, else `SERVER_ADDR`, else `localhost` |
    /// | port      | `HTTP_HOST`, else `SERVER_PORT`                                  |
    /// | path      | `REQUEST_URI` with repeated slashes collapsed                     |
    /// | query     | `QUERY_STRING` when `REQUEST_URI` has no query of its own        |
    ///
    /// # Errors
    ///
    /// Returns [`UriError::Malformed`] if the assembled uri can not be parsed.
    pub fn create_uri_from_server_params(&self, params: &BTreeMap<String, String>) -> Result<Uri, UriError> {
        let param = |name: &str| params.get(name).map(String::as_str).filter(|value| !value.is_empty());

        let scheme = match param("REQUEST_SCHEME") {
            Some(scheme) => scheme,
            None => match param("HTTPS") {
                Some(https) if !https.eq_ignore_ascii_case("off") => "https",
                _ => "http",
            },
        };

        let http_host = param("HTTP_HOST").map(|host| format!("{scheme}://{host}")).unwrap_or_default();
        let http_host = parse_url(&http_host).unwrap_or_default();

        let host = http_host
            .host
            .or_else(|| param("SERVER_NAME"))
            .or_else(|| param("SERVER_ADDR"))
            .unwrap_or("localhost");

        let port = http_host.port.or_else(|| param("SERVER_PORT").and_then(|port| port.parse().ok()));

        let path = collapse_slashes(param("REQUEST_URI").unwrap_or_default());
        let path = path.trim_matches('/');

        let mut uri = format!("{scheme}://{host}");
        if let Some(port) = port {
            uri.push(':');
            uri.push_str(&port.to_string());
        }
        uri.push('/');
        uri.push_str(path);
        if let Some(query) = param("QUERY_STRING").filter(|_| !path.contains('?')) {
            uri.push('?');
            uri.push_str(query);
        }

        self.create_uri(&uri)
    }
}

fn collapse_slashes(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && collapsed.ends_with('/') {
            continue;
        }
        collapsed.push(c);
    }
    collapsed
}
