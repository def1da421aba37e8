//! Handler outcomes.
//!
//! Handlers return a tagged [`Outcome`] rather than raising through layers:
//! a resource body, a resource with an explicit status, no content, or a
//! fully prebuilt response that bypasses encoding. The response translator
//! pattern-matches the outcome in one place; nothing else inspects it.

use bytes::Bytes;
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use terrace_core::{ApiError, ApiResult};

/// The response type produced by the dispatch layer.
pub type HttpResponse = http::Response<Bytes>;

/// The result of a successful handler invocation.
#[derive(Debug)]
pub enum Outcome {
    /// A resource body, answered with status 200.
    Resource(Value),

    /// A resource body with an explicit status code (e.g. 201 on create).
    WithStatus(Value, StatusCode),

    /// No body at all, answered with a bodyless 204 and no forced
    /// content-type header.
    NoContent,

    /// A fully prebuilt response passed through unchanged.
    ///
    /// The escape valve for handlers needing full control over status, body
    /// and headers.
    Response(HttpResponse),
}

impl Outcome {
    /// Wraps a serializable resource as a 200 outcome.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the resource cannot be serialized.
    pub fn resource<T: Serialize>(resource: &T) -> ApiResult<Self> {
        let value = serde_json::to_value(resource)
            .map_err(|e| ApiError::internal_with_source("failed to serialize resource", e))?;
        Ok(Self::Resource(value))
    }

    /// Wraps a serializable resource with an explicit status code.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the resource cannot be serialized.
    pub fn with_status<T: Serialize>(resource: &T, status: StatusCode) -> ApiResult<Self> {
        let value = serde_json::to_value(resource)
            .map_err(|e| ApiError::internal_with_source("failed to serialize resource", e))?;
        Ok(Self::WithStatus(value, status))
    }
}
