use http::Method;

/// Whether a message sent with a given method carries a body.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BodyPolicy {
    /// The body is part of the method's semantics
    Always,
    /// The body must not be sent
    Never,
    /// A body may be sent but has no defined semantics
    Optional,
}

impl BodyPolicy {
    /// Returns true unless the policy is [`BodyPolicy::Never`]
    #[inline]
    pub fn allows_body(self) -> bool {
        !matches!(self, BodyPolicy::Never)
    }
}

/// Returns the request side body policy of `method`.
///
/// Extension methods are treated as [`BodyPolicy::Never`].
pub fn request_body_policy(method: &Method) -> BodyPolicy {
    match *method {
        Method::GET | Method::OPTIONS => BodyPolicy::Optional,
        Method::HEAD | Method::DELETE | Method::TRACE => BodyPolicy::Never,
        Method::POST | Method::PUT | Method::CONNECT | Method::PATCH => BodyPolicy::Always,
        _ => BodyPolicy::Never,
    }
}

/// Returns true if a response to `method` is expected to carry a body.
pub fn response_has_body(method: &Method) -> bool {
    *method != Method::HEAD
}
