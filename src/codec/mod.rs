//! Codec adapter
//!
//! Session values and session IDs leave the server only as tokens produced
//! by a [`Codec`]. Several codecs can be configured at once to support secret
//! rotation: the first codec that succeeds is used for encoding, and decoding
//! tries every codec in order until one verifies the token.

mod signed;

pub use signed::SignedCodec;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::error::CodecError;

/// A signing and/or encryption scheme producing tamper-evident tokens.
///
/// Tokens are bound to a name (the cookie or session name), so a token minted
/// for one name never decodes under another.
pub trait Codec: Send + Sync + 'static {
    /// Encode `payload` into an opaque, transport-safe token
    fn encode(&self, name: &str, payload: &[u8]) -> Result<String, CodecError>;

    /// Verify `token` and return the payload it carries
    fn decode(&self, name: &str, token: &str) -> Result<Vec<u8>, CodecError>;
}

/// Serialize `value` and encode it with the first codec that accepts it.
///
/// An empty codec list stores the serialized value as unsigned base64.
pub fn encode_multi<T>(name: &str, value: &T, codecs: &[Arc<dyn Codec>]) -> Result<String, CodecError>
where
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_vec(value)?;

    if codecs.is_empty() {
        return Ok(URL_SAFE_NO_PAD.encode(payload));
    }

    let mut last_err = None;
    for codec in codecs {
        match codec.encode(name, &payload) {
            Ok(token) => return Ok(token),
            Err(err) => last_err = Some(err),
        }
    }

    Err(last_err.unwrap_or_else(|| CodecError::Encode("no codec accepted the payload".to_string())))
}

/// Decode `token` with the first codec that verifies it, then deserialize.
///
/// When every codec rejects the token a single [`CodecError::Unverified`] is
/// returned, whichever codec came closest.
pub fn decode_multi<T>(name: &str, token: &str, codecs: &[Arc<dyn Codec>]) -> Result<T, CodecError>
where
    T: DeserializeOwned,
{
    let payload = if codecs.is_empty() {
        URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| CodecError::Unverified)?
    } else {
        codecs
            .iter()
            .find_map(|codec| codec.decode(name, token).ok())
            .ok_or(CodecError::Unverified)?
    };

    Ok(serde_json::from_slice(&payload)?)
}
