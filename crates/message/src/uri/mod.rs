//! The immutable [`Uri`] value type.
//!
//! A [`Uri`] holds the seven components of RFC 3986 (with the user info split into
//! user and password). Each component is normalized on its own: the proposed value
//! is spliced into a minimal synthetic uri, parsed, and the single component is read
//! back. Scheme and host are lowercased.
//!
//! Every `with_*` operation returns a new value, unless the normalized component is
//! equal to the current one, in which case the same instance is returned:
//!
//! ```
//! use micro_http_message::uri::Uri;
//!
//! let uri: Uri = "http://example.com/docs".parse().unwrap();
//! assert!(Uri::ptr_eq(&uri, &uri.with_scheme("HTTP")));
//! assert!(!Uri::ptr_eq(&uri, &uri.with_scheme("https")));
//! ```

use std::fmt;
use std::str::FromStr;

use triomphe::Arc;

use crate::copy_on_write;

mod error;
pub use error::UriError;

mod factory;
pub use factory::UriFactory;

mod parse;
pub(crate) use parse::parse_url;

const SCHEME_SUFFIX: &str = ":";
const HOST_PREFIX: &str = "//";
const PASS_PREFIX: &str = ":";
const USER_INFO_SUFFIX: &str = "@";
const PORT_PREFIX: &str = ":";
const QUERY_PREFIX: &str = "?";
const FRAGMENT_PREFIX: &str = "#";

/// Raw uri components, used to build a [`Uri`].
///
/// The fields are normalized by [`Uri::from_parts`], so they may contain
/// separators (`"?q=1"` for a query, `"HTTP:"` for a scheme) or uppercase hosts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UriParts {
    pub scheme: String,
    pub user: String,
    pub pass: String,
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
    pub query: String,
    pub fragment: String,
}

/// An immutable uri value.
///
/// Cloning is cheap, clones share the same components. Two uris compare equal when
/// their components are equal; [`Uri::ptr_eq`] tells whether they are the same
/// instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uri {
    inner: Arc<UriParts>,
}

impl Uri {
    /// Builds a uri, normalizing every component.
    pub fn from_parts(parts: UriParts) -> Self {
        let (user, pass) = normalize_user_info(&parts.user, Some(&parts.pass));
        Self {
            inner: Arc::new(UriParts {
                scheme: normalize_scheme(&parts.scheme),
                user,
                pass,
                host: normalize_host(&parts.host),
                port: parts.port,
                path: normalize_path(&parts.path),
                query: normalize_query(&parts.query),
                fragment: normalize_fragment(&parts.fragment),
            }),
        }
    }

    /// Returns true if both values are the same instance.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.inner, &other.inner)
    }

    pub fn scheme(&self) -> &str {
        &self.inner.scheme
    }

    /// Returns `[user-info "@"] host [":" port]`.
    pub fn authority(&self) -> String {
        let mut authority = String::new();
        let user_info = self.user_info();
        if !user_info.is_empty() {
            authority.push_str(&user_info);
            authority.push_str(USER_INFO_SUFFIX);
        }
        authority.push_str(&self.inner.host);
        if let Some(port) = self.inner.port {
            authority.push_str(PORT_PREFIX);
            authority.push_str(&port.to_string());
        }
        authority
    }

    /// Returns `user [":" pass]`, the password part only when it is not empty.
    pub fn user_info(&self) -> String {
        if self.inner.pass.is_empty() {
            self.inner.user.clone()
        } else {
            format!("{}{PASS_PREFIX}{}", self.inner.user, self.inner.pass)
        }
    }

    pub fn user(&self) -> &str {
        &self.inner.user
    }

    pub fn pass(&self) -> &str {
        &self.inner.pass
    }

    pub fn host(&self) -> &str {
        &self.inner.host
    }

    pub fn port(&self) -> Option<u16> {
        self.inner.port
    }

    pub fn path(&self) -> &str {
        &self.inner.path
    }

    pub fn query(&self) -> &str {
        &self.inner.query
    }

    pub fn fragment(&self) -> &str {
        &self.inner.fragment
    }

    /// Returns the components of this uri.
    pub fn parts(&self) -> &UriParts {
        &self.inner
    }

    pub fn with_scheme(&self, scheme: &str) -> Self {
        let scheme = normalize_scheme(scheme);
        self.update(|parts| parts.scheme = scheme)
    }

    pub fn with_user_info(&self, user: &str, password: Option<&str>) -> Self {
        let (user, pass) = normalize_user_info(user, password);
        self.update(|parts| {
            parts.user = user;
            parts.pass = pass;
        })
    }

    pub fn with_host(&self, host: &str) -> Self {
        let host = normalize_host(host);
        self.update(|parts| parts.host = host)
    }

    /// Replaces the port, `None` removes it.
    ///
    /// # Errors
    ///
    /// Returns [`UriError::InvalidPort`] if `port` does not fit into `0..=65535`.
    pub fn with_port(&self, port: Option<u32>) -> Result<Self, UriError> {
        let port = port.map(|port| u16::try_from(port).or(Err(UriError::InvalidPort(port)))).transpose()?;
        Ok(self.update(|parts| parts.port = port))
    }

    pub fn with_path(&self, path: &str) -> Self {
        let path = normalize_path(path);
        self.update(|parts| parts.path = path)
    }

    pub fn with_query(&self, query: &str) -> Self {
        let query = normalize_query(query);
        self.update(|parts| parts.query = query)
    }

    pub fn with_fragment(&self, fragment: &str) -> Self {
        let fragment = normalize_fragment(fragment);
        self.update(|parts| parts.fragment = fragment)
    }

    fn update<F: FnOnce(&mut UriParts)>(&self, f: F) -> Self {
        Self { inner: copy_on_write(&self.inner, f) }
    }
}

impl Default for Uri {
    fn default() -> Self {
        Self::from_parts(UriParts::default())
    }
}

impl FromStr for Uri {
    type Err = UriError;

    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        let components = parse_url(uri).ok_or_else(|| UriError::malformed(uri))?;
        Ok(Self::from_parts(UriParts {
            scheme: components.scheme.unwrap_or_default().to_owned(),
            user: components.user.unwrap_or_default().to_owned(),
            pass: components.pass.unwrap_or_default().to_owned(),
            host: components.host.unwrap_or_default().to_owned(),
            port: components.port,
            path: components.path.unwrap_or_default().to_owned(),
            query: components.query.unwrap_or_default().to_owned(),
            fragment: components.fragment.unwrap_or_default().to_owned(),
        }))
    }
}

/// Recomposes the uri.
///
/// The scheme and authority are only written when a host is present, the path is
/// written without trailing slashes. A uri without any component renders as its
/// path, `/`.
impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = &*self.inner;
        let mut uri = String::new();

        let path = parts.path.trim_matches('/');
        if !path.is_empty() {
            uri.push('/');
            uri.push_str(path);
        }
        if !parts.query.is_empty() {
            uri.push_str(QUERY_PREFIX);
            uri.push_str(&parts.query);
        }
        if !parts.fragment.is_empty() {
            uri.push_str(FRAGMENT_PREFIX);
            uri.push_str(&parts.fragment);
        }

        if !parts.host.is_empty() {
            if !parts.scheme.is_empty() {
                f.write_str(&parts.scheme)?;
                f.write_str(SCHEME_SUFFIX)?;
            }
            f.write_str(HOST_PREFIX)?;
            f.write_str(&self.authority())?;
        } else if uri.is_empty() {
            return f.write_str(&parts.path);
        }

        f.write_str(&uri)
    }
}

fn normalize_scheme(scheme: &str) -> String {
    let url = format!("{}://host", scheme.trim_end_matches(':'));
    parse_url(&url).and_then(|c| c.scheme).unwrap_or_default().to_ascii_lowercase()
}

fn normalize_user_info(user: &str, password: Option<&str>) -> (String, String) {
    let url = format!("scheme://{user}:{}@host", password.unwrap_or_default());
    let components = parse_url(&url).unwrap_or_default();
    (components.user.unwrap_or_default().to_owned(), components.pass.unwrap_or_default().to_owned())
}

fn normalize_host(host: &str) -> String {
    let url = format!("scheme://{host}");
    parse_url(&url).and_then(|c| c.host).unwrap_or_default().to_ascii_lowercase()
}

fn normalize_path(path: &str) -> String {
    let url = format!("scheme://host/{}", path.trim_start_matches('/'));
    parse_url(&url).and_then(|c| c.path).unwrap_or_default().to_owned()
}

fn normalize_query(query: &str) -> String {
    let url = format!("scheme://host?{}", query.trim_start_matches('?'));
    parse_url(&url).and_then(|c| c.query).unwrap_or_default().to_owned()
}

fn normalize_fragment(fragment: &str) -> String {
    let url = format!("scheme://host#{}", fragment.trim_start_matches('#'));
    parse_url(&url).and_then(|c| c.fragment).unwrap_or_default().to_owned()
}
