//! Codec trait and implementations for serializing/deserializing bodies.
//!
//! The session layer doesn't care HOW bodies are serialized. It needs
//! something that implements [`Codec`]. The auth API speaks JSON, so
//! [`JsonCodec`] is the only implementation today.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust values to request bodies and decodes response bodies.
///
/// `Send + Sync + 'static` because the codec lives inside the session
/// manager, which is shared across Tokio tasks.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Decodes a body that may not be valid at all.
    ///
    /// Error responses from proxies and crashed backends are often HTML or
    /// empty. This never fails: anything unparsable becomes an empty JSON
    /// object.
    fn decode_lenient(&self, data: &[u8]) -> serde_json::Value {
        self.decode::<serde_json::Value>(data)
            .ok()
            .filter(serde_json::Value::is_object)
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()))
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use quill_protocol::{Codec, JsonCodec, LoginRequest};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&LoginRequest::new("ada", "pw")).unwrap();
/// let value: serde_json::Value = codec.decode(&bytes).unwrap();
/// assert_eq!(value["username"], "ada");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
