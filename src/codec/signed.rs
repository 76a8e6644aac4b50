//! HMAC-SHA256 signed tokens
//!
//! Token format: `base64url(payload)` + `.` + `base64url(hmac_sha256(name | base64url(payload)))`,
//! both without padding. The name is folded into the MAC input so a token
//! minted for one cookie cannot be replayed under another.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;

use super::Codec;
use crate::error::CodecError;

type HmacSha256 = Hmac<Sha256>;

/// Codec that signs payloads with a secret key.
///
/// The payload is only signed, not encrypted: it is readable by anyone who
/// holds the token.
#[derive(Clone)]
pub struct SignedCodec {
    key: Vec<u8>,
}

impl SignedCodec {
    /// Create a codec signing with `secret`
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: secret.as_ref().to_vec(),
        }
    }

    /// Build an ordered codec list from secrets, newest first.
    ///
    /// The first secret signs new tokens; all of them verify.
    pub fn from_secrets<I, S>(secrets: I) -> Vec<Arc<dyn Codec>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        secrets
            .into_iter()
            .map(|secret| Arc::new(Self::new(secret)) as Arc<dyn Codec>)
            .collect()
    }

    fn mac(&self, name: &str, value: &str) -> Result<HmacSha256, CodecError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).map_err(|e| CodecError::Encode(e.to_string()))?;
        mac.update(name.as_bytes());
        mac.update(b"|");
        mac.update(value.as_bytes());
        Ok(mac)
    }
}

impl fmt::Debug for SignedCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedCodec").finish_non_exhaustive()
    }
}

impl Codec for SignedCodec {
    fn encode(&self, name: &str, payload: &[u8]) -> Result<String, CodecError> {
        let value = URL_SAFE_NO_PAD.encode(payload);
        let signature = URL_SAFE_NO_PAD.encode(self.mac(name, &value)?.finalize().into_bytes());
        Ok(format!("{}.{}", value, signature))
    }

    fn decode(&self, name: &str, token: &str) -> Result<Vec<u8>, CodecError> {
        // Base64url never contains '.', so the last one separates the signature
        let (value, provided) = token.rsplit_once('.').ok_or(CodecError::Unverified)?;

        let provided = URL_SAFE_NO_PAD
            .decode(provided)
            .map_err(|_| CodecError::Unverified)?;
        self.mac(name, value)?
            .verify_slice(&provided)
            .map_err(|_| CodecError::Unverified)?;

        URL_SAFE_NO_PAD
            .decode(value)
            .map_err(|_| CodecError::Unverified)
    }
}
