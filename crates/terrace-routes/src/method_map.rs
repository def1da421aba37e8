//! HTTP method to handler-name mapping.
//!
//! A [`MethodMap`] holds the handler names registered for a single route key.
//! Registration is first-wins: the first handler registered for a method
//! keeps the slot, and later registrations for the same method are ignored.
//! This is what makes inherited routes contribute additional methods without
//! overriding locally declared ones.

use http::Method;

/// Maps HTTP methods to handler names for a single route key.
///
/// # Example
///
/// ```rust
/// use terrace_routes::MethodMap;
/// use http::Method;
///
/// let map = MethodMap::new()
///     .get("object_list")
///     .post("object_create");
///
/// assert_eq!(map.lookup(&Method::GET), Some("object_list"));
/// assert_eq!(map.lookup(&Method::DELETE), None);
/// assert_eq!(map.allowed_methods(), vec![Method::GET, Method::POST]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodMap {
    /// GET handler
    get: Option<String>,
    /// POST handler
    post: Option<String>,
    /// PUT handler
    put: Option<String>,
    /// DELETE handler
    delete: Option<String>,
    /// PATCH handler
    patch: Option<String>,
    /// HEAD handler
    head: Option<String>,
    /// OPTIONS handler
    options: Option<String>,
}

impl MethodMap {
    /// Creates a new empty method map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a GET handler.
    #[must_use]
    pub fn get(mut self, handler: impl Into<String>) -> Self {
        self.get = Some(handler.into());
        self
    }

    /// Registers a POST handler.
    #[must_use]
    pub fn post(mut self, handler: impl Into<String>) -> Self {
        self.post = Some(handler.into());
        self
    }

    /// Registers a PUT handler.
    #[must_use]
    pub fn put(mut self, handler: impl Into<String>) -> Self {
        self.put = Some(handler.into());
        self
    }

    /// Registers a DELETE handler.
    #[must_use]
    pub fn delete(mut self, handler: impl Into<String>) -> Self {
        self.delete = Some(handler.into());
        self
    }

    /// Registers a PATCH handler.
    #[must_use]
    pub fn patch(mut self, handler: impl Into<String>) -> Self {
        self.patch = Some(handler.into());
        self
    }

    /// Returns a mutable reference to the slot for a method.
    fn slot(&mut self, method: &Method) -> Option<&mut Option<String>> {
        match *method {
            Method::GET => Some(&mut self.get),
            Method::POST => Some(&mut self.post),
            Method::PUT => Some(&mut self.put),
            Method::DELETE => Some(&mut self.delete),
            Method::PATCH => Some(&mut self.patch),
            Method::HEAD => Some(&mut self.head),
            Method::OPTIONS => Some(&mut self.options),
            _ => None,
        }
    }

    /// Registers a handler for a method unless one is already registered.
    ///
    /// Returns `true` if the handler was registered; `false` if the slot was
    /// already taken (first registration wins) or the method is unsupported.
    pub fn register(&mut self, method: &Method, handler: impl Into<String>) -> bool {
        match self.slot(method) {
            Some(slot) if slot.is_none() => {
                *slot = Some(handler.into());
                true
            }
            _ => false,
        }
    }

    /// Returns the handler name registered for a method.
    ///
    /// Lookup is by the `http::Method` value, so matching is effectively
    /// case-insensitive for callers constructing methods from wire strings
    /// via `Method::from_bytes` of the uppercased name.
    #[must_use]
    pub fn lookup(&self, method: &Method) -> Option<&str> {
        match *method {
            Method::GET => self.get.as_deref(),
            Method::POST => self.post.as_deref(),
            Method::PUT => self.put.as_deref(),
            Method::DELETE => self.delete.as_deref(),
            Method::PATCH => self.patch.as_deref(),
            Method::HEAD => self.head.as_deref(),
            Method::OPTIONS => self.options.as_deref(),
            _ => None,
        }
    }

    /// Merges another map into this one without overwriting existing slots.
    pub fn merge(&mut self, other: MethodMap) {
        if self.get.is_none() {
            self.get = other.get;
        }
        if self.post.is_none() {
            self.post = other.post;
        }
        if self.put.is_none() {
            self.put = other.put;
        }
        if self.delete.is_none() {
            self.delete = other.delete;
        }
        if self.patch.is_none() {
            self.patch = other.patch;
        }
        if self.head.is_none() {
            self.head = other.head;
        }
        if self.options.is_none() {
            self.options = other.options;
        }
    }

    /// Returns true if any methods are registered.
    #[must_use]
    pub fn has_any_method(&self) -> bool {
        self.get.is_some()
            || self.post.is_some()
            || self.put.is_some()
            || self.delete.is_some()
            || self.patch.is_some()
            || self.head.is_some()
            || self.options.is_some()
    }

    /// Returns the list of registered methods.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        let mut methods = Vec::with_capacity(7);
        if self.get.is_some() {
            methods.push(Method::GET);
        }
        if self.post.is_some() {
            methods.push(Method::POST);
        }
        if self.put.is_some() {
            methods.push(Method::PUT);
        }
        if self.delete.is_some() {
            methods.push(Method::DELETE);
        }
        if self.patch.is_some() {
            methods.push(Method::PATCH);
        }
        if self.head.is_some() {
            methods.push(Method::HEAD);
        }
        if self.options.is_some() {
            methods.push(Method::OPTIONS);
        }
        methods
    }

    /// Returns the registered methods whose handler is not `excluded`.
    ///
    /// Used by the auto-generated OPTIONS responder so the synthetic OPTIONS
    /// entry itself is left out of the `Allow` header.
    #[must_use]
    pub fn allowed_methods_excluding(&self, excluded: &str) -> Vec<Method> {
        let mut methods = Vec::with_capacity(7);
        let mut push = |method: Method, handler: &Option<String>| {
            if let Some(name) = handler {
                if name != excluded {
                    methods.push(method);
                }
            }
        };
        push(Method::GET, &self.get);
        push(Method::POST, &self.post);
        push(Method::PUT, &self.put);
        push(Method::DELETE, &self.delete);
        push(Method::PATCH, &self.patch);
        push(Method::HEAD, &self.head);
        push(Method::OPTIONS, &self.options);
        methods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_map() {
        let map = MethodMap::new();
        assert!(!map.has_any_method());
        assert!(map.allowed_methods().is_empty());
    }

    #[test]
    fn test_fluent_registration() {
        let map = MethodMap::new().get("list").post("create");
        assert_eq!(map.lookup(&Method::GET), Some("list"));
        assert_eq!(map.lookup(&Method::POST), Some("create"));
        assert_eq!(map.lookup(&Method::PUT), None);
    }

    #[test]
    fn test_register_first_wins() {
        let mut map = MethodMap::new();
        assert!(map.register(&Method::GET, "first"));
        assert!(!map.register(&Method::GET, "second"));
        assert_eq!(map.lookup(&Method::GET), Some("first"));
    }

    #[test]
    fn test_register_unsupported_method() {
        let mut map = MethodMap::new();
        assert!(!map.register(&Method::TRACE, "handler"));
    }

    #[test]
    fn test_merge_does_not_overwrite() {
        let mut map = MethodMap::new().get("original");
        map.merge(MethodMap::new().get("other").post("create"));
        assert_eq!(map.lookup(&Method::GET), Some("original"));
        assert_eq!(map.lookup(&Method::POST), Some("create"));
    }

    #[test]
    fn test_allowed_methods() {
        let map = MethodMap::new().get("a").post("b").delete("c");
        assert_eq!(
            map.allowed_methods(),
            vec![Method::GET, Method::POST, Method::DELETE]
        );
    }

    #[test]
    fn test_allowed_methods_excluding() {
        let mut map = MethodMap::new().get("object_list");
        map.register(&Method::OPTIONS, "options_response");
        assert_eq!(
            map.allowed_methods_excluding("options_response"),
            vec![Method::GET]
        );
        assert_eq!(
            map.allowed_methods(),
            vec![Method::GET, Method::OPTIONS]
        );
    }
}
