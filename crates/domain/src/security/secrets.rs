use base64::{engine::general_purpose, Engine};
use rand_core::{OsRng, RngCore};

pub const SESSION_TOKEN_BYTES: usize = 32;

/// Opaque bearer token for an admin session.
pub fn generate_session_token() -> String {
    let mut raw = [0u8; SESSION_TOKEN_BYTES];
    OsRng.fill_bytes(&mut raw);
    general_purpose::URL_SAFE_NO_PAD.encode(raw)
}
