//! Core types for the Terrace resource API framework.
//!
//! This crate provides the shared vocabulary used by every other Terrace
//! crate:
//!
//! - [`ApiError`] - the error taxonomy translated into wire responses
//! - [`ErrorBody`] and [`Listing`] - the canonical wire resources
//! - [`Codec`] - the encode/decode contract bound to a content type
//! - [`ApiRequest`] - the framework-neutral request model
//! - [`RequestContext`] - per-request identity and timing
//! - [`ApiConfig`] - endpoint configuration
//!
//! Higher layers (routing, negotiation, dispatch, mapping) build on these
//! types without depending on each other.

mod codec;
mod config;
mod context;
mod error;
mod request;
mod resources;

pub use codec::{Codec, CodecError};
pub use config::{ApiConfig, ApiConfigBuilder, DEFAULT_CONTENT_TYPE};
pub use context::{RequestContext, RequestId};
pub use error::{codes, ApiError, ApiResult, FieldErrors};
pub use request::{ApiRequest, ApiRequestBuilder};
pub use resources::{ErrorBody, Listing};
