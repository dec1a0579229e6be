//! Payload framing: gzip compression and signatures around encoded JSON.
//!
//! The signature always covers the uncompressed JSON. Senders sign, then
//! compress; receivers inflate, then verify.

use std::io::{Read, Write};

use bytes::Bytes;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{MetrixError, Result};

use super::sign::SigningKey;

/// Header carrying the hex HMAC-SHA256 digest.
pub const SIGNATURE_HEADER: &str = "HashSHA256";

/// `Content-Encoding` value for gzip bodies.
pub const GZIP_ENCODING: &str = "gzip";

/// Upper bound on inflated payloads.
pub const MAX_DECOMPRESSED_BYTES: u64 = 16 * 1024 * 1024;

pub fn compress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut enc = GzEncoder::new(Vec::with_capacity(bytes.len() / 2), Compression::default());
    enc.write_all(bytes)
        .map_err(|e| MetrixError::Internal(format!("gzip write: {e}")))?;
    enc.finish()
        .map_err(|e| MetrixError::Internal(format!("gzip finish: {e}")))
}

pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(bytes)
        .take(MAX_DECOMPRESSED_BYTES + 1)
        .read_to_end(&mut out)
        .map_err(|e| MetrixError::MalformedPayload(format!("invalid gzip body: {e}")))?;
    if out.len() as u64 > MAX_DECOMPRESSED_BYTES {
        return Err(MetrixError::MalformedPayload("decompressed body too large".into()));
    }
    Ok(out)
}

/// Outbound body with the header values that must accompany it.
#[derive(Debug, Clone)]
pub struct SealedPayload {
    pub body: Bytes,
    /// Set `Content-Encoding: gzip`.
    pub gzip: bool,
    /// Value for [`SIGNATURE_HEADER`].
    pub signature: Option<String>,
}

/// Sign (optional) then compress (optional) an encoded JSON payload.
pub fn seal(json: Vec<u8>, gzip: bool, key: Option<&SigningKey>) -> Result<SealedPayload> {
    let signature = key.map(|k| k.sign(&json));
    let body = if gzip { compress(&json)? } else { json };
    Ok(SealedPayload {
        body: Bytes::from(body),
        gzip,
        signature,
    })
}

/// Inflate (per `content_encoding`) then verify an inbound body.
///
/// An absent signature is accepted; a present one must match when a key is
/// configured.
pub fn open(
    body: &[u8],
    content_encoding: Option<&str>,
    signature: Option<&str>,
    key: Option<&SigningKey>,
) -> Result<Vec<u8>> {
    let encoding = content_encoding.map(|s| s.trim().to_ascii_lowercase());
    let plain = match encoding.as_deref() {
        None | Some("") | Some("identity") => body.to_vec(),
        Some(GZIP_ENCODING) => decompress(body)?,
        Some(other) => {
            return Err(MetrixError::MalformedPayload(format!(
                "unsupported content encoding: {other}"
            )))
        }
    };

    if let (Some(key), Some(digest)) = (key, signature) {
        key.verify(&plain, digest)?;
    }

    Ok(plain)
}
