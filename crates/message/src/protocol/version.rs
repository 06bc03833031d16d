use http::Version;

/// Protocol version used when a message does not name one.
pub const DEFAULT_VERSION: &str = "1.1";

/// Maps a bare textual protocol version (`"1.1"`, `"2"`, ...) to [`Version`].
///
/// Returns `None` for versions that should be left to negotiation.
pub fn parse_version(version: &str) -> Option<Version> {
    match version {
        "1.0" | "1" => Some(Version::HTTP_10),
        "1.1" => Some(Version::HTTP_11),
        "2" | "2.0" => Some(Version::HTTP_2),
        _ => None,
    }
}
