//! # Terrace
//!
//! **A resource-oriented REST dispatch layer**
//!
//! Terrace exposes schema-validated resource objects as HTTP endpoints:
//!
//! - **Declarative routes** - handlers declare routing metadata once; the
//!   route set is compiled into an immutable dispatch table at startup
//! - **Content negotiation** - independent resolver chains pick the request
//!   and response codecs, with a marked fallback default
//! - **Uniform error translation** - one error taxonomy, one translator,
//!   one canonical error body on the wire
//! - **Record mapping** - resource schemas derived from storage record
//!   fields, with forward/reverse conversions and diff-based lazy updates
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use terrace::prelude::*;
//!
//! let mapping = SchemaBuilder::for_record::<Widget>().build();
//! let api = StoreApi::builder(store, mapping).with_all().build();
//! let endpoint = Endpoint::new(api);
//!
//! let response = endpoint.dispatch(request).await?;
//! ```

#![forbid(unsafe_code)]

// Re-export core types
pub use terrace_core as core;

// Re-export routing types
pub use terrace_routes as routes;

// Re-export negotiation types
pub use terrace_negotiate as negotiate;

// Re-export dispatch types
pub use terrace_dispatch as dispatch;

// Re-export mapping types
pub use terrace_mapping as mapping;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use terrace::prelude::*;
/// ```
pub mod prelude {
    pub use terrace_core::{
        codes, ApiConfig, ApiError, ApiRequest, ApiResult, ErrorBody, FieldErrors, Listing,
        RequestContext, RequestId,
    };

    pub use terrace_routes::{
        IdPattern, MethodMap, PathParams, PathShape, Route, RouteKey, RouteSet, RouteTable,
    };

    pub use terrace_negotiate::{resolvers, CodecRegistry, JsonCodec, Negotiated, NegotiatorChain};

    pub use terrace_dispatch::{
        decode_body, resource_from_body, ApiCollection, Endpoint, HandlerFuture, HttpResponse,
        Outcome, ResourceApi, VersionedApi,
    };

    pub use terrace_mapping::{
        FieldKind, FieldSpec, MappedResource, MappedSchema, MemoryStore, Record, RecordField,
        RecordStore, RecordType, ResourceSchema, SchemaBuilder, StoreApi, StoreError,
        SupportsCreate, SupportsDelete, SupportsList, SupportsRetrieve, SupportsUpdate,
    };
}
