//! Fixed protocol tables shared by messages and clients.
//!
//! - [`BodyPolicy`]: whether a request or response for a method carries a body
//! - [`reason_phrase`]: the canonical reason phrase of a status code
//! - [`parse_version`]: textual protocol versions to [`http::Version`]
//!
//! All tables are compile time constants, there is nothing to initialize or tear down.

mod body_policy;
pub use body_policy::BodyPolicy;
pub use body_policy::request_body_policy;
pub use body_policy::response_has_body;

mod status;
pub use status::reason_phrase;

mod version;
pub use version::parse_version;
pub use version::DEFAULT_VERSION;
