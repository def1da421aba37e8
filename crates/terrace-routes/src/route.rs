//! Route declarations.
//!
//! A [`Route`] attaches routing metadata to a handler name without invoking
//! anything: the path shape addressed, the HTTP methods answered, and an
//! optional action name. Declarations are collected by a
//! [`RouteSet`](crate::RouteSet) in order and compiled later.

use http::Method;

/// Whether a route addresses the whole collection or a single resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathShape {
    /// The collection path, with no identifier (e.g. `widgets/`).
    Collection,
    /// A single addressed resource (e.g. `widgets/{id}/`).
    Resource,
}

impl std::fmt::Display for PathShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collection => write!(f, "collection"),
            Self::Resource => write!(f, "resource"),
        }
    }
}

/// The composite key grouping HTTP methods under one URL pattern.
///
/// Derived from a route's path shape plus its optional action name. Two
/// routes with the same key share a URL slot and merge their method maps.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    /// The path shape addressed.
    pub shape: PathShape,
    /// The action name, when the route addresses a named action.
    pub action: Option<String>,
}

impl std::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.action {
            Some(action) => write!(f, "{}-{}", self.shape, action),
            None => write!(f, "{}", self.shape),
        }
    }
}

/// Routing metadata for one handler.
///
/// Routes are immutable once declared. Use the shortcut constructors for the
/// conventional REST verbs, or [`Route::new`] for anything else.
///
/// # Example
///
/// ```rust
/// use terrace_routes::{PathShape, Route};
/// use http::Method;
///
/// let route = Route::collection_action("publish_all", "publish", &[Method::POST]);
/// assert_eq!(route.key().to_string(), "collection-publish");
/// assert_eq!(route.handler(), "publish_all");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// The path shape addressed.
    shape: PathShape,
    /// The HTTP methods this handler answers.
    methods: Vec<Method>,
    /// Optional action name appended to the URL.
    action: Option<String>,
    /// Name of the handler the API resolves at dispatch time.
    handler: String,
}

impl Route {
    /// Creates a new route declaration.
    #[must_use]
    pub fn new(shape: PathShape, methods: &[Method], handler: impl Into<String>) -> Self {
        Self {
            shape,
            methods: methods.to_vec(),
            action: None,
            handler: handler.into(),
        }
    }

    /// Sets the action name.
    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// A `GET` on the collection path; the conventional listing endpoint.
    #[must_use]
    pub fn listing(handler: impl Into<String>) -> Self {
        Self::new(PathShape::Collection, &[Method::GET], handler)
    }

    /// A `POST` on the collection path; the conventional creation endpoint.
    #[must_use]
    pub fn create(handler: impl Into<String>) -> Self {
        Self::new(PathShape::Collection, &[Method::POST], handler)
    }

    /// A `GET` on the resource path; the conventional detail endpoint.
    #[must_use]
    pub fn detail(handler: impl Into<String>) -> Self {
        Self::new(PathShape::Resource, &[Method::GET], handler)
    }

    /// A `PUT` on the resource path; the conventional update endpoint.
    #[must_use]
    pub fn update(handler: impl Into<String>) -> Self {
        Self::new(PathShape::Resource, &[Method::PUT], handler)
    }

    /// A `PATCH` on the resource path.
    #[must_use]
    pub fn patch(handler: impl Into<String>) -> Self {
        Self::new(PathShape::Resource, &[Method::PATCH], handler)
    }

    /// A `DELETE` on the resource path.
    #[must_use]
    pub fn delete(handler: impl Into<String>) -> Self {
        Self::new(PathShape::Resource, &[Method::DELETE], handler)
    }

    /// A named action on the collection path.
    #[must_use]
    pub fn collection_action(
        handler: impl Into<String>,
        action: impl Into<String>,
        methods: &[Method],
    ) -> Self {
        Self::new(PathShape::Collection, methods, handler).with_action(action)
    }

    /// A named action on the resource path.
    #[must_use]
    pub fn resource_action(
        handler: impl Into<String>,
        action: impl Into<String>,
        methods: &[Method],
    ) -> Self {
        Self::new(PathShape::Resource, methods, handler).with_action(action)
    }

    /// Returns the route key grouping this route into a URL slot.
    #[must_use]
    pub fn key(&self) -> RouteKey {
        RouteKey {
            shape: self.shape,
            action: self.action.clone(),
        }
    }

    /// Returns the path shape.
    #[must_use]
    pub fn shape(&self) -> PathShape {
        self.shape
    }

    /// Returns the HTTP methods this route answers.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Returns the action name, if any.
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Returns the handler name.
    #[must_use]
    pub fn handler(&self) -> &str {
        &self.handler
    }
}
