use std::error::Error;

use micro_http_message::message::Request;
use thiserror::Error;

use crate::transport::codes;

/// A failed [`Client::send_request`](crate::Client::send_request).
///
/// Both variants carry the request that failed and the engine error code, `0` when the
/// failure did not come from the engine.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request could not be sent as built
    #[error("{message}")]
    Request {
        request: Request,
        message: String,
        code: i32,
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },

    /// The network or the TLS layer failed, sending the same request again elsewhere may
    /// succeed
    #[error("{message}")]
    Network { request: Request, message: String, code: i32 },
}

impl ClientError {
    pub fn request_error<S: ToString>(request: &Request, message: S, code: i32) -> Self {
        Self::Request { request: request.clone(), message: message.to_string(), code, source: None }
    }

    pub fn network<S: ToString>(request: &Request, message: S, code: i32) -> Self {
        Self::Network { request: request.clone(), message: message.to_string(), code }
    }

    /// Wraps a failure that did not come from the engine.
    pub fn wrap<E: Into<Box<dyn Error + Send + Sync>>>(request: &Request, e: E) -> Self {
        Self::Request {
            request: request.clone(),
            message: "error while creating cURL request".to_owned(),
            code: 0,
            source: Some(e.into()),
        }
    }

    /// Classifies an engine error code into a network or a request error.
    pub fn from_code<S: ToString>(request: &Request, message: S, code: i32) -> Self {
        if codes::is_network_error(code) {
            Self::network(request, message, code)
        } else {
            Self::request_error(request, message, code)
        }
    }

    pub fn request(&self) -> &Request {
        match self {
            ClientError::Request { request, .. } | ClientError::Network { request, .. } => request,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            ClientError::Request { code, .. } | ClientError::Network { code, .. } => *code,
        }
    }

    #[inline]
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network { .. })
    }
}
