use std::error::Error;
use std::fmt;

use thiserror::Error;

use crate::protocol::reason_phrase;
use crate::uri::UriError;

#[derive(Error, Debug)]
pub enum MessageError {
    #[error("invalid http method: {0:?}")]
    InvalidMethod(String),

    #[error("invalid uri: {source}")]
    Uri {
        #[from]
        source: UriError,
    },

    #[error("unable to serialize json body: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("invalid uploaded files: {reason}")]
    InvalidFiles { reason: String },
}

impl MessageError {
    pub fn invalid_method<S: ToString>(method: S) -> Self {
        Self::InvalidMethod(method.to_string())
    }

    pub fn invalid_files<S: ToString>(str: S) -> Self {
        Self::InvalidFiles { reason: str.to_string() }
    }
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("file must be uploaded via HTTP POST: {0}")]
    NotUploaded(String),

    #[error("error during the move operation: {source}")]
    Move {
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

/// A request the server refuses with a client error status.
///
/// Each variant carries an optional message. Without one, the error displays the
/// reason phrase of its status code:
///
/// ```
/// use micro_http_message::message::ServerRequestError;
///
/// assert_eq!(ServerRequestError::MethodNotAllowed(None).to_string(), "Method Not Allowed");
/// assert_eq!(ServerRequestError::unauthorized("token expired").to_string(), "token expired");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServerRequestError {
    BadRequest(Option<String>),
    Unauthorized(Option<String>),
    PaymentRequired(Option<String>),
    MethodNotAllowed(Option<String>),
    ImATeapot(Option<String>),
}

impl ServerRequestError {
    pub fn bad_request<S: ToString>(message: S) -> Self {
        Self::BadRequest(Some(message.to_string()))
    }

    pub fn unauthorized<S: ToString>(message: S) -> Self {
        Self::Unauthorized(Some(message.to_string()))
    }

    pub fn payment_required<S: ToString>(message: S) -> Self {
        Self::PaymentRequired(Some(message.to_string()))
    }

    pub fn method_not_allowed<S: ToString>(message: S) -> Self {
        Self::MethodNotAllowed(Some(message.to_string()))
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ServerRequestError::BadRequest(_) => 400,
            ServerRequestError::Unauthorized(_) => 401,
            ServerRequestError::PaymentRequired(_) => 402,
            ServerRequestError::MethodNotAllowed(_) => 405,
            ServerRequestError::ImATeapot(_) => 418,
        }
    }

    /// Returns the explicit message, or the reason phrase when it is absent or empty.
    pub fn message(&self) -> &str {
        let message = match self {
            ServerRequestError::BadRequest(message)
            | ServerRequestError::Unauthorized(message)
            | ServerRequestError::PaymentRequired(message)
            | ServerRequestError::MethodNotAllowed(message)
            | ServerRequestError::ImATeapot(message) => message.as_deref(),
        };
        match message.filter(|message| !message.is_empty()) {
            Some(message) => message,
            None => reason_phrase(self.status_code()).unwrap_or("Bad Request"),
        }
    }
}

impl fmt::Display for ServerRequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
