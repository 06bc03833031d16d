//! Numeric libcurl error codes the client tells apart.

pub const OK: i32 = 0;
pub const UNSUPPORTED_PROTOCOL: i32 = 1;
pub const FAILED_INIT: i32 = 2;
pub const URL_MALFORMAT: i32 = 3;
pub const COULDNT_RESOLVE_PROXY: i32 = 5;
pub const COULDNT_RESOLVE_HOST: i32 = 6;
pub const COULDNT_CONNECT: i32 = 7;
pub const OPERATION_TIMEDOUT: i32 = 28;
pub const SSL_CONNECT_ERROR: i32 = 35;
/// Retired by libcurl 7.62 in favour of [`PEER_FAILED_VERIFICATION`], older builds still report it
pub const SSL_PEER_CERTIFICATE: i32 = 51;
pub const SSL_ENGINE_NOTFOUND: i32 = 53;
pub const SSL_ENGINE_SETFAILED: i32 = 54;
pub const SEND_ERROR: i32 = 55;
pub const RECV_ERROR: i32 = 56;
pub const SSL_CERTPROBLEM: i32 = 58;
pub const SSL_CIPHER: i32 = 59;
/// Also known as `SSL_CACERT`
pub const PEER_FAILED_VERIFICATION: i32 = 60;
pub const SSL_CACERT_BADFILE: i32 = 77;
pub const SSH: i32 = 79;
pub const SSL_PINNEDPUBKEYNOTMATCH: i32 = 90;

/// Returns true for the codes caused by the network or the TLS layer rather than by
/// the shape of the request.
pub fn is_network_error(code: i32) -> bool {
    matches!(
        code,
        SEND_ERROR
            | RECV_ERROR
            | COULDNT_CONNECT
            | COULDNT_RESOLVE_HOST
            | COULDNT_RESOLVE_PROXY
            | OPERATION_TIMEDOUT
            | SSH
            | SSL_CONNECT_ERROR
            | SSL_PEER_CERTIFICATE
            | PEER_FAILED_VERIFICATION
            | SSL_ENGINE_NOTFOUND
            | SSL_ENGINE_SETFAILED
            | SSL_CERTPROBLEM
            | SSL_CIPHER
            | SSL_PINNEDPUBKEYNOTMATCH
            | SSL_CACERT_BADFILE
    )
}
