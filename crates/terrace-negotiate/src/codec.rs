//! The codec registry and the built-in JSON codec.
//!
//! The registry is process-wide, read-only configuration: it is populated at
//! startup and only consulted afterwards. Codecs are shared behind `Arc` so
//! a negotiated codec can be bound onto the per-request state cheaply.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;

use terrace_core::{Codec, CodecError};

/// JSON codec backed by `serde_json`.
///
/// Registered by default under `application/json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode(&self, value: &Value) -> Result<Bytes, CodecError> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(&self, body: &[u8]) -> Result<Value, CodecError> {
        serde_json::from_slice(body).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

/// Maps content-type strings to codecs.
///
/// # Example
///
/// ```rust
/// use terrace_negotiate::CodecRegistry;
///
/// let registry = CodecRegistry::with_json();
/// assert!(registry.get("application/json").is_some());
/// assert!(registry.get("text/csv").is_none());
/// ```
#[derive(Clone, Default)]
pub struct CodecRegistry {
    codecs: HashMap<String, Arc<dyn Codec>>,
}

impl CodecRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the JSON codec registered.
    #[must_use]
    pub fn with_json() -> Self {
        let mut registry = Self::new();
        registry.register(JsonCodec);
        registry
    }

    /// Registers a codec under its content type.
    pub fn register<C: Codec>(&mut self, codec: C) {
        self.codecs
            .insert(codec.content_type().to_string(), Arc::new(codec));
    }

    /// Returns the codec registered for a content type.
    #[must_use]
    pub fn get(&self, content_type: &str) -> Option<Arc<dyn Codec>> {
        self.codecs.get(content_type).cloned()
    }

    /// Returns the number of registered codecs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    /// Returns true if no codecs are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("content_types", &self.codecs.keys().collect::<Vec<_>>())
            .finish()
    }
}
