//! Protocol modules (wire DTO, JSON codec, framing, signatures).
//!
//! - `wire`: typed metric DTO and its permissive serde mirror
//! - `codec`: single/batch JSON encode and decode
//! - `frame`: gzip + signature around an encoded payload
//! - `sign`: HMAC-SHA256 over uncompressed JSON
//!
//! All decoders are panic-free: malformed input is reported as `MetrixError`
//! and never reaches the store.

pub mod codec;
pub mod frame;
pub mod sign;
pub mod wire;

pub use codec::{
    decode, decode_batch, decode_query, decode_single, encode_batch, encode_single, Decoded,
};
pub use frame::{open, seal, SealedPayload, GZIP_ENCODING, SIGNATURE_HEADER};
pub use sign::SigningKey;
pub use wire::{MetricKind, MetricQuery, MetricValue, RawMetric, WireMetric};
