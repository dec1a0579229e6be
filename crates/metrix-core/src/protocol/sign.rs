//! HMAC-SHA256 payload signatures (hex encoded).

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{MetrixError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Shared secret prepared once and cloned per signature.
#[derive(Clone)]
pub struct SigningKey {
    mac: HmacSha256,
}

impl SigningKey {
    pub fn new(secret: &[u8]) -> Result<Self> {
        if secret.is_empty() {
            return Err(MetrixError::InvalidConfig("signing key must not be empty".into()));
        }
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| MetrixError::InvalidConfig(format!("signing key: {e}")))?;
        Ok(Self { mac })
    }

    /// `None` for an empty key, which means signing is disabled.
    pub fn from_config(secret: &str) -> Result<Option<Self>> {
        if secret.is_empty() {
            return Ok(None);
        }
        Self::new(secret.as_bytes()).map(Some)
    }

    /// Hex digest of `body`.
    pub fn sign(&self, body: &[u8]) -> String {
        let mut mac = self.mac.clone();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Constant-time comparison against a hex digest.
    pub fn verify(&self, body: &[u8], digest: &str) -> Result<()> {
        let code = hex::decode(digest.trim()).map_err(|_| MetrixError::SignatureMismatch)?;
        let mut mac = self.mac.clone();
        mac.update(body);
        mac.verify_slice(&code).map_err(|_| MetrixError::SignatureMismatch)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(..)")
    }
}

pub fn sign(body: &[u8], key: &[u8]) -> Result<String> {
    Ok(SigningKey::new(key)?.sign(body))
}

pub fn verify_signature(body: &[u8], key: &[u8], digest: &str) -> Result<()> {
    SigningKey::new(key)?.verify(body, digest)
}
