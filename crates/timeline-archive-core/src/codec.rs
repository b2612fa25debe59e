//! Wire encodings for timeline payloads.
//!
//! Two encodings are supported:
//!
//! - **Structured**: Protocol Buffers records, framed by a 4-byte
//!   [`STRUCTURED_MAGIC`] header. The header guarantees that legacy text
//!   payloads are never mistaken for structured ones, so the fallback in
//!   [`commit::decode_commit_metadata`] is reliable.
//! - **Text**: the legacy JSON layout (camelCase field names). Only read
//!   paths fall back to it; writes always target the structured encoding
//!   except through [`commit::encode_structured_to_text`].
//!
//! ```text
//! +------+----------------------------+
//! | TLPB | protobuf-encoded record    |
//! +------+----------------------------+
//! ```
pub mod commit;
pub mod era;

pub use commit::{
    CommitMetadataError, decode_commit_metadata, decode_text_commit_metadata,
    encode_commit_metadata, encode_structured_to_text, from_structured, to_structured,
};
pub use era::{CommitMetadataSerDe, CommitMetadataSerDeV1, CommitMetadataSerDeV2, serde_for};

use prost::Message;
use serde::{Serialize, de::DeserializeOwned};
use snafu::{Backtrace, prelude::*};

/// Header prefixed to every structured payload.
pub const STRUCTURED_MAGIC: [u8; 4] = *b"TLPB";

/// Errors raised by a single encoding attempt.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CodecError {
    /// The payload does not start with [`STRUCTURED_MAGIC`].
    #[snafu(display("Payload of {len} bytes is missing the structured encoding header"))]
    MissingMagic {
        /// Length of the rejected payload.
        len: usize,
        /// Backtrace for debugging.
        backtrace: Backtrace,
    },

    /// The framed protobuf body is malformed.
    #[snafu(display("Malformed structured payload: {source}"))]
    Structured {
        /// Underlying protobuf error.
        source: prost::DecodeError,
        /// Backtrace for debugging.
        backtrace: Backtrace,
    },

    /// JSON encoding or decoding failed.
    #[snafu(display("Malformed text payload: {source}"))]
    Text {
        /// Underlying JSON error.
        source: serde_json::Error,
        /// Backtrace for debugging.
        backtrace: Backtrace,
    },
}

/// Encode `record` in the framed structured encoding.
pub fn encode_structured<M: Message>(record: &M) -> Vec<u8> {
    let mut buf = Vec::with_capacity(STRUCTURED_MAGIC.len() + record.encoded_len());
    buf.extend_from_slice(&STRUCTURED_MAGIC);
    buf.extend(record.encode_to_vec());
    buf
}

/// Decode a framed structured payload.
pub fn decode_structured<M: Message + Default>(bytes: &[u8]) -> Result<M, CodecError> {
    let body = bytes
        .strip_prefix(&STRUCTURED_MAGIC[..])
        .context(MissingMagicSnafu { len: bytes.len() })?;
    M::decode(body).context(StructuredSnafu)
}

/// Like [`decode_structured`], but a zero-length payload is the default record.
pub fn decode_structured_or_default<M: Message + Default>(bytes: &[u8]) -> Result<M, CodecError> {
    if bytes.is_empty() {
        return Ok(M::default());
    }
    decode_structured(bytes)
}

/// Encode `value` as pretty-printed JSON text.
pub fn encode_text<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec_pretty(value).context(TextSnafu)
}

/// Decode JSON text.
pub fn decode_text<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(bytes).context(TextSnafu)
}
