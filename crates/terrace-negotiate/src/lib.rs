//! Content negotiation and the codec registry for Terrace.
//!
//! Negotiation answers two independent questions per request: how to decode
//! the request body and how to encode the response body. Each question has
//! its own ordered [`NegotiatorChain`] of resolver functions; the first
//! resolver that identifies a content type wins. A resolver may mark its
//! answer as a *default* (a silently assumed type rather than an explicit
//! client choice), which downstream error handling uses to decide whether an
//! unhandled failure may propagate in debug mode.
//!
//! The [`CodecRegistry`] then maps the negotiated content-type string to a
//! concrete [`Codec`](terrace_core::Codec). When no codec is registered for
//! either negotiated type, dispatch answers a plain 406.
//!
//! # Example
//!
//! ```rust
//! use terrace_negotiate::{CodecRegistry, NegotiatorChain};
//! use terrace_core::ApiRequest;
//!
//! let chain = NegotiatorChain::response_default("application/json");
//! let req = ApiRequest::builder().build();
//!
//! let negotiated = chain.resolve(&req).unwrap();
//! assert_eq!(negotiated.content_type(), "application/json");
//! assert!(negotiated.is_default());
//!
//! let registry = CodecRegistry::with_json();
//! assert!(registry.get(negotiated.content_type()).is_some());
//! ```

mod codec;
mod resolve;

pub use codec::{CodecRegistry, JsonCodec};
pub use resolve::{resolvers, Negotiated, NegotiatorChain, Resolver};
