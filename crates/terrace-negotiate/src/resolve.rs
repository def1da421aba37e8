//! Content-type resolution.
//!
//! A resolver inspects a request and either identifies a content type or
//! declines. Chains hold resolvers in priority order; the response chain
//! conventionally prefers the `Accept` header while the request chain
//! prefers `Content-Type`, both falling back to a marked default.

use std::sync::Arc;

use terrace_core::ApiRequest;

/// A resolved content type.
///
/// `is_default` distinguishes a type the client asked for explicitly from
/// one a fallback resolver silently assumed. The response translator only
/// lets an unhandled failure propagate (in debug mode) when the type was
/// assumed, never when the client chose it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiated {
    content_type: String,
    is_default: bool,
}

impl Negotiated {
    /// A content type the client chose explicitly.
    #[must_use]
    pub fn explicit(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            is_default: false,
        }
    }

    /// A content type assumed by a fallback resolver.
    #[must_use]
    pub fn default_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            is_default: true,
        }
    }

    /// Returns the content-type string.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Returns whether this type was silently assumed.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.is_default
    }
}

/// A content-type resolution strategy.
pub type Resolver = Arc<dyn Fn(&ApiRequest) -> Option<Negotiated> + Send + Sync>;

/// An ordered chain of content-type resolvers.
///
/// `resolve` consults each resolver in order and returns the first answer,
/// or `None` if every resolver declines.
#[derive(Clone)]
pub struct NegotiatorChain {
    resolvers: Vec<Resolver>,
}

impl NegotiatorChain {
    /// Creates a chain from an explicit resolver list.
    #[must_use]
    pub fn new(resolvers: Vec<Resolver>) -> Self {
        Self { resolvers }
    }

    /// The conventional request-body chain: `Content-Type` first, then
    /// `Accept`, then the configured default.
    #[must_use]
    pub fn request_default(default_content_type: &str) -> Self {
        Self::new(vec![
            resolvers::content_type_header(),
            resolvers::accept_header(),
            resolvers::default_type(default_content_type),
        ])
    }

    /// The conventional response-body chain: `Accept` first, then
    /// `Content-Type`, then the configured default.
    #[must_use]
    pub fn response_default(default_content_type: &str) -> Self {
        Self::new(vec![
            resolvers::accept_header(),
            resolvers::content_type_header(),
            resolvers::default_type(default_content_type),
        ])
    }

    /// Resolves a content type for the request.
    #[must_use]
    pub fn resolve(&self, request: &ApiRequest) -> Option<Negotiated> {
        self.resolvers
            .iter()
            .find_map(|resolver| resolver(request))
    }
}

impl std::fmt::Debug for NegotiatorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NegotiatorChain")
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}

/// The standard resolver constructors.
pub mod resolvers {
    use super::{Negotiated, Resolver};
    use std::sync::Arc;

    /// Strips parameters and whitespace from a media-range token.
    fn media_type(token: &str) -> Option<String> {
        let media = token.split(';').next()?.trim();
        if media.is_empty() || media.contains('*') {
            None
        } else {
            Some(media.to_ascii_lowercase())
        }
    }

    /// Resolves from the `Accept` header.
    ///
    /// Only the first media range is considered; wildcard ranges decline so
    /// a later resolver can answer.
    #[must_use]
    pub fn accept_header() -> Resolver {
        Arc::new(|request| {
            let header = request.header("accept")?;
            let first = header.split(',').next()?;
            media_type(first).map(Negotiated::explicit)
        })
    }

    /// Resolves from the `Content-Type` header.
    #[must_use]
    pub fn content_type_header() -> Resolver {
        Arc::new(|request| {
            let header = request.header("content-type")?;
            media_type(header).map(Negotiated::explicit)
        })
    }

    /// Always resolves to the given type, marked as a default.
    #[must_use]
    pub fn default_type(content_type: &str) -> Resolver {
        let content_type = content_type.to_string();
        Arc::new(move |_| Some(Negotiated::default_type(content_type.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(header: &'static str, value: &str) -> ApiRequest {
        ApiRequest::builder().header(header, value).build()
    }

    #[test]
    fn test_accept_header_absent() {
        let resolver = resolvers::accept_header();
        assert_eq!(resolver(&ApiRequest::builder().build()), None);
    }

    #[test]
    fn test_accept_header_json() {
        let resolver = resolvers::accept_header();
        let resolved = resolver(&request_with("accept", "application/json")).unwrap();
        assert_eq!(resolved.content_type(), "application/json");
        assert!(!resolved.is_default());
    }

    #[test]
    fn test_accept_header_strips_parameters() {
        let resolver = resolvers::accept_header();
        let resolved =
            resolver(&request_with("accept", "application/json; charset=utf-8, text/html")).unwrap();
        assert_eq!(resolved.content_type(), "application/json");
    }

    #[test]
    fn test_accept_header_wildcard_declines() {
        let resolver = resolvers::accept_header();
        assert_eq!(resolver(&request_with("accept", "*/*")), None);
    }

    #[test]
    fn test_content_type_header() {
        let resolver = resolvers::content_type_header();
        let resolved =
            resolver(&request_with("content-type", "application/x-msgpack")).unwrap();
        assert_eq!(resolved.content_type(), "application/x-msgpack");
    }

    #[test]
    fn test_default_resolver_is_marked() {
        let resolver = resolvers::default_type("application/json");
        let resolved = resolver(&ApiRequest::builder().build()).unwrap();
        assert!(resolved.is_default());
    }

    #[test]
    fn test_chain_first_match_wins() {
        let chain = NegotiatorChain::response_default("application/json");
        let resolved = chain
            .resolve(&request_with("accept", "application/x-msgpack"))
            .unwrap();
        assert_eq!(resolved.content_type(), "application/x-msgpack");
        assert!(!resolved.is_default());
    }

    #[test]
    fn test_chain_falls_back_to_default() {
        let chain = NegotiatorChain::response_default("application/json");
        let resolved = chain.resolve(&ApiRequest::builder().build()).unwrap();
        assert_eq!(resolved.content_type(), "application/json");
        assert!(resolved.is_default());
    }

    #[test]
    fn test_request_chain_prefers_content_type() {
        let chain = NegotiatorChain::request_default("application/json");
        let req = ApiRequest::builder()
            .header("accept", "application/x-msgpack")
            .header("content-type", "application/json")
            .build();
        let resolved = chain.resolve(&req).unwrap();
        assert_eq!(resolved.content_type(), "application/json");
    }

    #[test]
    fn test_response_chain_prefers_accept() {
        let chain = NegotiatorChain::response_default("application/json");
        let req = ApiRequest::builder()
            .header("accept", "application/x-msgpack")
            .header("content-type", "application/json")
            .build();
        let resolved = chain.resolve(&req).unwrap();
        assert_eq!(resolved.content_type(), "application/x-msgpack");
    }

    #[test]
    fn test_empty_chain_declines() {
        let chain = NegotiatorChain::new(vec![]);
        assert!(chain.resolve(&ApiRequest::builder().build()).is_none());
    }
}
