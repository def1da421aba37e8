//! The encode/decode contract bound to a content type.
//!
//! A [`Codec`] converts between wire bytes and the `serde_json::Value`
//! interchange form used throughout the framework. Concrete codecs and the
//! registry that maps content-type strings to them live in
//! `terrace-negotiate`; this crate only defines the contract so the request
//! model can carry negotiated codecs without a dependency cycle.

use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;

/// Errors produced by codec operations.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The body bytes could not be decoded.
    #[error("Unable to decode body: {0}")]
    Decode(String),

    /// The resource value could not be encoded.
    #[error("Unable to encode resource: {0}")]
    Encode(String),
}

/// An encode/decode strategy bound to a content-type string.
///
/// Codecs operate on the `serde_json::Value` interchange form: handlers and
/// the mapping layer serialize resources to a `Value`, and the negotiated
/// codec turns that tree into wire bytes (and back).
pub trait Codec: Send + Sync + 'static {
    /// The content-type string this codec is registered under.
    fn content_type(&self) -> &'static str;

    /// Encodes a resource value into wire bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if the value cannot be represented in
    /// this codec's wire format.
    fn encode(&self, value: &Value) -> Result<Bytes, CodecError>;

    /// Decodes wire bytes into a resource value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] if the bytes are not valid for this
    /// codec's wire format.
    fn decode(&self, body: &[u8]) -> Result<Value, CodecError>;
}
