//! Resource API dispatcher and response translation for Terrace.
//!
//! This crate ties the other Terrace layers together:
//!
//! - [`ResourceApi`] is the trait a resource API implements: a name, a route
//!   set, handler resolution by name, and optional authorization and
//!   pre/post dispatch hooks.
//! - [`Endpoint`] compiles an API's routes once at construction and then
//!   dispatches incoming requests: content negotiation, path matching,
//!   method resolution, hook invocation, and handler execution.
//! - [`Outcome`] is the tagged result handlers return; together with the
//!   [`ApiError`](terrace_core::ApiError) taxonomy it is converted into a
//!   wire response in exactly one place, the response translator.
//! - [`ApiCollection`] and [`VersionedApi`] group endpoints under shared
//!   URL prefixes and versions.
//!
//! # Dispatch walkthrough
//!
//! ```text
//! request ──negotiate codecs──▶ match path ──▶ method lookup ──▶ authorize
//!     ──▶ pre_dispatch ──▶ handler ──▶ post_dispatch ──▶ translate ──▶ response
//! ```
//!
//! Any step may fail with an [`ApiError`](terrace_core::ApiError); the
//! translator maps each error kind onto its fixed status code and the
//! canonical error body. The one exception is negotiation failure, which is
//! answered with a plain 406 because no codec exists to encode a body.

mod api;
mod body;
mod collection;
mod endpoint;
mod outcome;
mod response;

pub use api::{HandlerFuture, ResourceApi};
pub use body::{decode_body, resource_from_body, resources_from_body};
pub use collection::{ApiCollection, VersionedApi};
pub use endpoint::{Endpoint, EndpointBuilder};
pub use outcome::{HttpResponse, Outcome};
pub use response::plain_response;
