//! Route collection and the compiled dispatch table.
//!
//! [`RouteSet`] gathers route declarations in order and merges in inherited
//! sets. [`RouteTable::compile`] then folds the collection into an immutable
//! table keyed by [`RouteKey`]: the first route declared for a key claims the
//! URL slot, later routes contribute additional method handlers, and an
//! OPTIONS pseudo-handler is added to every key unless disabled.
//!
//! Compilation is a pure function of its inputs and is safe to repeat; the
//! resulting table is read-only and shared across concurrent dispatches.

use http::Method;
use indexmap::IndexMap;
use regex::Regex;

use crate::method_map::MethodMap;
use crate::params::PathParams;
use crate::route::{PathShape, Route, RouteKey};

/// Handler name reserved for the auto-generated OPTIONS responder.
pub const OPTIONS_HANDLER: &str = "options_response";

/// Name under which the resource identifier is captured into path params.
const ID_PARAM: &str = "resource_id";

/// The pattern a resource identifier segment must match.
///
/// Defaults to digits. A custom pattern can be supplied for APIs keyed by
/// slugs or UUIDs.
///
/// # Example
///
/// ```rust
/// use terrace_routes::IdPattern;
///
/// let digits = IdPattern::digits();
/// assert!(digits.matches("123"));
/// assert!(!digits.matches("abc"));
///
/// let slug = IdPattern::custom(r"[-\w]+").unwrap();
/// assert!(slug.matches("blue-widget"));
/// ```
#[derive(Debug, Clone)]
pub struct IdPattern {
    regex: Regex,
}

impl IdPattern {
    /// The default identifier pattern: one or more digits.
    #[must_use]
    pub fn digits() -> Self {
        Self {
            regex: Regex::new(r"\A\d+\z").expect("static pattern compiles"),
        }
    }

    /// Creates an identifier pattern from a custom regex.
    ///
    /// The pattern is anchored to the whole segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regex.
    pub fn custom(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(&format!(r"\A(?:{pattern})\z"))?,
        })
    }

    /// Returns whether a path segment matches this pattern.
    #[must_use]
    pub fn matches(&self, segment: &str) -> bool {
        self.regex.is_match(segment)
    }
}

impl Default for IdPattern {
    fn default() -> Self {
        Self::digits()
    }
}

/// One segment of a compiled URL pattern.
#[derive(Debug, Clone)]
enum Segment {
    /// A literal segment (e.g. `widgets`).
    Literal(String),
    /// The resource identifier segment.
    Id(IdPattern),
}

/// A compiled URL pattern for one route key.
///
/// Matching is segment-wise with empty segments filtered out, so a trailing
/// slash on the incoming path is optional.
#[derive(Debug, Clone)]
pub struct UrlSpec {
    /// Parsed path segments.
    segments: Vec<Segment>,
    /// Rendered template for display and docs (e.g. `widgets/{id}/publish`).
    template: String,
}

impl UrlSpec {
    /// Builds the URL pattern for a route key.
    fn build(
        prefix: &str,
        api_name: &str,
        shape: PathShape,
        action: Option<&str>,
        id_pattern: &IdPattern,
    ) -> Self {
        let mut segments: Vec<Segment> = prefix
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| Segment::Literal(s.to_string()))
            .collect();
        segments.push(Segment::Literal(api_name.to_lowercase()));
        if shape == PathShape::Resource {
            segments.push(Segment::Id(id_pattern.clone()));
        }
        if let Some(action) = action {
            segments.push(Segment::Literal(action.to_string()));
        }

        let template = segments
            .iter()
            .map(|s| match s {
                Segment::Literal(lit) => lit.as_str(),
                Segment::Id(_) => "{id}",
            })
            .collect::<Vec<_>>()
            .join("/");

        Self { segments, template }
    }

    /// Returns the rendered path template.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Attempts to match an incoming path against this pattern.
    ///
    /// Returns the extracted parameters when the path matches. Leading and
    /// trailing slashes are ignored.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if path_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = PathParams::new();
        for (pattern, actual) in self.segments.iter().zip(path_segments.iter()) {
            match pattern {
                Segment::Literal(expected) => {
                    if expected != actual {
                        return None;
                    }
                }
                Segment::Id(id_pattern) => {
                    if !id_pattern.matches(actual) {
                        return None;
                    }
                    params.push(ID_PARAM, (*actual).to_string());
                }
            }
        }

        Some(params)
    }
}

/// An ordered collection of route declarations.
///
/// Routes are kept in declaration order. Declaring a route for a handler
/// that already has one replaces the earlier metadata in place (the latest
/// declaration wins, one entry per handler). Inherited sets are appended
/// after local routes, preserving their internal order, so locally declared
/// routes take precedence when keys collide.
///
/// # Example
///
/// ```rust
/// use terrace_routes::{Route, RouteSet};
///
/// let base = RouteSet::new().route(Route::listing("object_list"));
/// let routes = RouteSet::new()
///     .route(Route::create("object_create"))
///     .extend_inherited(&base);
///
/// assert_eq!(routes.len(), 2);
/// assert_eq!(routes.iter().next().unwrap().handler(), "object_create");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteSet {
    routes: Vec<Route>,
}

impl RouteSet {
    /// Creates a new empty route set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route declaration.
    ///
    /// If a route for the same handler name was already declared, its
    /// metadata is replaced in place and its declaration position kept.
    #[must_use]
    pub fn route(mut self, route: Route) -> Self {
        match self
            .routes
            .iter_mut()
            .find(|existing| existing.handler() == route.handler())
        {
            Some(existing) => *existing = route,
            None => self.routes.push(route),
        }
        self
    }

    /// Appends the routes inherited from an ancestor set.
    ///
    /// Inherited routes land after all local declarations; a duplicate
    /// handler name from the ancestor is ignored.
    #[must_use]
    pub fn extend_inherited(mut self, parent: &RouteSet) -> Self {
        for route in &parent.routes {
            if !self
                .routes
                .iter()
                .any(|existing| existing.handler() == route.handler())
            {
                self.routes.push(route.clone());
            }
        }
        self
    }

    /// Returns the number of declared routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no routes are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Returns an iterator over the declarations in order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }
}

/// The compiled entry for one route key: its URL pattern plus method map.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    url: UrlSpec,
    methods: MethodMap,
}

impl RouteEntry {
    /// Returns the URL pattern for this key.
    #[must_use]
    pub fn url(&self) -> &UrlSpec {
        &self.url
    }

    /// Returns the method-to-handler map for this key.
    #[must_use]
    pub fn methods(&self) -> &MethodMap {
        &self.methods
    }
}

/// The compiled, immutable dispatch table for one API.
///
/// Invariant: every route key has exactly one URL entry and one method map,
/// and the key sets coincide by construction (they live in the same entry).
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: IndexMap<RouteKey, RouteEntry>,
}

impl RouteTable {
    /// Compiles a route set into a dispatch table.
    ///
    /// The first route declared for a key claims the URL slot; later routes
    /// for the same key contribute additional method handlers (first
    /// registration of a method wins). When `respond_to_options` is set, an
    /// OPTIONS pseudo-handler is registered on every key that does not
    /// already answer OPTIONS.
    #[must_use]
    pub fn compile(
        routes: &RouteSet,
        api_name: &str,
        url_prefix: &str,
        id_pattern: &IdPattern,
        respond_to_options: bool,
    ) -> Self {
        let mut entries: IndexMap<RouteKey, RouteEntry> = IndexMap::new();

        for route in routes.iter() {
            let entry = entries.entry(route.key()).or_insert_with(|| RouteEntry {
                url: UrlSpec::build(
                    url_prefix,
                    api_name,
                    route.shape(),
                    route.action(),
                    id_pattern,
                ),
                methods: MethodMap::new(),
            });

            for method in route.methods() {
                entry.methods.register(method, route.handler());
            }

            if respond_to_options {
                entry.methods.register(&Method::OPTIONS, OPTIONS_HANDLER);
            }
        }

        Self { entries }
    }

    /// Returns the entry for a route key.
    #[must_use]
    pub fn get(&self, key: &RouteKey) -> Option<&RouteEntry> {
        self.entries.get(key)
    }

    /// Matches an incoming path against the compiled URL patterns.
    ///
    /// Entries are tried in compilation order; the first pattern that
    /// matches wins.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&RouteKey, &RouteEntry, PathParams)> {
        self.entries.iter().find_map(|(key, entry)| {
            entry
                .url
                .match_path(path)
                .map(|params| (key, entry, params))
        })
    }

    /// Returns the number of route keys in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the compiled entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&RouteKey, &RouteEntry)> {
        self.entries.iter()
    }
}
