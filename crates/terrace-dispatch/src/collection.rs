//! Grouping endpoints under shared prefixes and versions.
//!
//! An [`ApiCollection`] mounts several endpoints side by side and routes a
//! request to the first endpoint whose compiled URL patterns match. A
//! [`VersionedApi`] layers version labels on top, answering requests for an
//! unknown version with a plain 418 listing the supported versions.
//!
//! Endpoints carry their full URL prefix themselves (set via
//! [`ApiConfig::url_prefix`](terrace_core::ApiConfig)), so collections only
//! select and delegate; they never rewrite paths.

use http::StatusCode;

use terrace_core::{ApiError, ApiRequest};

use crate::endpoint::Endpoint;
use crate::outcome::HttpResponse;
use crate::response::plain_response;

/// A collection of resource API endpoints.
///
/// # Example
///
/// ```rust,ignore
/// let api = ApiCollection::new("api")
///     .with_endpoint(widgets_endpoint)
///     .with_endpoint(users_endpoint);
///
/// let response = api.dispatch(request).await?;
/// ```
#[derive(Debug, Default)]
pub struct ApiCollection {
    name: String,
    endpoints: Vec<Endpoint>,
}

impl ApiCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoints: Vec::new(),
        }
    }

    /// Adds an endpoint to the collection.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Returns the collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of mounted endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Returns true if no endpoints are mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Dispatches to the first endpoint whose URL patterns match, or `None`
    /// when no endpoint claims the path.
    pub async fn try_dispatch(
        &self,
        request: ApiRequest,
    ) -> Option<Result<HttpResponse, ApiError>> {
        let endpoint = self
            .endpoints
            .iter()
            .find(|endpoint| endpoint.matches(request.path()))?;
        Some(endpoint.dispatch(request).await)
    }

    /// Dispatches a request, answering a plain 404 when no endpoint matches.
    ///
    /// # Errors
    ///
    /// Propagates the debug-mode passthrough from the matched endpoint; see
    /// [`Endpoint::dispatch`].
    pub async fn dispatch(&self, request: ApiRequest) -> Result<HttpResponse, ApiError> {
        match self.try_dispatch(request).await {
            Some(result) => result,
            None => Ok(plain_response(StatusCode::NOT_FOUND, "Not Found")),
        }
    }
}

/// A set of API collections, one per version label.
///
/// Requests whose second path segment does not name a known version are
/// answered with a plain 418 listing the supported versions; this is
/// deliberately distinct from 404 so a version mismatch is recognizable at
/// a glance.
///
/// # Example
///
/// ```rust,ignore
/// let api = VersionedApi::new("api")
///     .with_version("v1", v1_collection)
///     .with_version("v2", v2_collection);
/// ```
#[derive(Debug, Default)]
pub struct VersionedApi {
    name: String,
    versions: Vec<(String, ApiCollection)>,
}

impl VersionedApi {
    /// Creates an empty versioned API.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            versions: Vec::new(),
        }
    }

    /// Mounts a collection under a version label.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>, collection: ApiCollection) -> Self {
        self.versions.push((version.into(), collection));
        self
    }

    /// Returns the supported version labels.
    #[must_use]
    pub fn versions(&self) -> Vec<&str> {
        self.versions.iter().map(|(v, _)| v.as_str()).collect()
    }

    /// Dispatches a request to the collection for its version segment.
    ///
    /// # Errors
    ///
    /// Propagates the debug-mode passthrough from the matched endpoint.
    pub async fn dispatch(&self, request: ApiRequest) -> Result<HttpResponse, ApiError> {
        let mut segments = request.path().split('/').filter(|s| !s.is_empty());

        if segments.next() != Some(self.name.as_str()) {
            return Ok(plain_response(StatusCode::NOT_FOUND, "Not Found"));
        }

        let version = segments.next().unwrap_or("");
        match self.versions.iter().find(|(label, _)| label == version) {
            Some((_, collection)) => collection.dispatch(request).await,
            None => Ok(self.unknown_version()),
        }
    }

    /// Builds the unsupported-version response.
    fn unknown_version(&self) -> HttpResponse {
        let supported = self.versions().join(", ");
        // Technically a bad request, but a distinct status code makes the
        // mismatch obvious in logs and clients.
        plain_response(
            StatusCode::IM_A_TEAPOT,
            &format!("Unsupported API version. Available versions: {supported}"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{HandlerFuture, ResourceApi};
    use crate::outcome::Outcome;
    use terrace_core::ApiConfig;
    use terrace_routes::{PathParams, Route, RouteSet};

    struct StubApi {
        name: &'static str,
    }

    impl ResourceApi for StubApi {
        fn api_name(&self) -> &str {
            self.name
        }

        fn routes(&self) -> RouteSet {
            RouteSet::new().route(Route::listing("object_list"))
        }

        fn invoke<'a>(
            &'a self,
            handler: &str,
            _request: &'a ApiRequest,
            _params: &'a PathParams,
        ) -> Option<HandlerFuture<'a>> {
            let name = self.name;
            match handler {
                "object_list" => Some(Box::pin(async move {
                    Outcome::resource(&serde_json::json!({ "api": name }))
                })),
                _ => None,
            }
        }
    }

    fn endpoint(name: &'static str, prefix: &str) -> Endpoint {
        Endpoint::builder(StubApi { name })
            .config(ApiConfig::builder().url_prefix(prefix).build())
            .build()
    }

    fn get(path: &str) -> ApiRequest {
        ApiRequest::builder().uri(path).build()
    }

    #[tokio::test]
    async fn test_collection_routes_to_matching_endpoint() {
        let collection = ApiCollection::new("api")
            .with_endpoint(endpoint("widgets", "api/"))
            .with_endpoint(endpoint("users", "api/"));

        let response = collection.dispatch(get("/api/users/")).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["api"], "users");
    }

    #[tokio::test]
    async fn test_collection_unknown_path_is_404() {
        let collection = ApiCollection::new("api").with_endpoint(endpoint("widgets", "api/"));
        let response = collection.dispatch(get("/api/gadgets/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_versioned_dispatch() {
        let api = VersionedApi::new("api").with_version(
            "v1",
            ApiCollection::new("v1").with_endpoint(endpoint("widgets", "api/v1/")),
        );

        let response = api.dispatch(get("/api/v1/widgets/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_version_is_418() {
        let api = VersionedApi::new("api")
            .with_version(
                "v1",
                ApiCollection::new("v1").with_endpoint(endpoint("widgets", "api/v1/")),
            )
            .with_version("v2", ApiCollection::new("v2"));

        let response = api.dispatch(get("/api/v9/widgets/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        let text = std::str::from_utf8(response.body()).unwrap();
        assert!(text.contains("v1, v2"));
    }

    #[tokio::test]
    async fn test_versioned_wrong_root_is_404() {
        let api = VersionedApi::new("api").with_version("v1", ApiCollection::new("v1"));
        let response = api.dispatch(get("/other/v1/widgets/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
