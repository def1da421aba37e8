//! Path parameter extraction and storage.
//!
//! Uses a small-vector optimization to avoid heap allocation for the common
//! case of one or two parameters per matched route.

use smallvec::SmallVec;

/// Maximum number of parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 2;

/// Extracted path parameters from a route match.
///
/// Parameters are stored as (name, value) pairs in extraction order.
///
/// # Example
///
/// ```rust
/// use terrace_routes::PathParams;
///
/// let mut params = PathParams::new();
/// params.push("resource_id", "123");
///
/// assert_eq!(params.get("resource_id"), Some("123"));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathParams {
    /// Storage for parameter (name, value) pairs.
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl PathParams {
    /// Creates a new empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter to the set.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value for a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_get() {
        let mut params = PathParams::new();
        params.push("resource_id", "42");
        assert_eq!(params.get("resource_id"), Some("42"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_missing_param() {
        let params = PathParams::new();
        assert!(params.is_empty());
        assert_eq!(params.get("resource_id"), None);
    }

    #[test]
    fn test_iteration_order() {
        let mut params = PathParams::new();
        params.push("a", "1");
        params.push("b", "2");
        let collected: Vec<_> = params.iter().collect();
        assert_eq!(collected, vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn test_from_iterator() {
        let params: PathParams =
            vec![("resource_id".to_string(), "9".to_string())].into_iter().collect();
        assert_eq!(params.get("resource_id"), Some("9"));
    }
}
