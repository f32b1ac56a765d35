use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Encode a username/secret pair for an `Authorization: Basic` header.
///
/// No validation happens here; empty parts still produce a token.
pub fn basic_token(username: &str, secret: &str) -> String {
    STANDARD.encode(format!("{username}:{secret}"))
}
