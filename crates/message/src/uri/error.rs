use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UriError {
    #[error("invalid port {0}, must be between 0 and 65535")]
    InvalidPort(u32),

    #[error("malformed uri: {0}")]
    Malformed(String),
}

impl UriError {
    pub fn malformed<S: ToString>(uri: S) -> Self {
        Self::Malformed(uri.to_string())
    }
}
