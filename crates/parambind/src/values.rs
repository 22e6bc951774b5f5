//! Ordered multi-map of parameter values.

use indexmap::IndexMap;

/// Parameter values keyed by name, in first-seen order.
///
/// Used for both the URL query and the submitted form. Values of a repeated
/// name keep their request order.
///
/// # Example
///
/// ```rust
/// use parambind::Values;
///
/// let values = Values::from_urlencoded(b"tag=a&limit=10&tag=b").unwrap();
/// assert_eq!(values.get("tag"), Some("a"));
/// assert_eq!(values.get_all("tag"), ["a", "b"]);
/// assert_eq!(values.get("missing"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Values {
    inner: IndexMap<String, Vec<String>>,
}

impl Values {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an `application/x-www-form-urlencoded` byte string.
    ///
    /// # Errors
    ///
    /// Returns the decoder message if the input cannot be decoded.
    pub fn from_urlencoded(input: &[u8]) -> Result<Self, String> {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_bytes(input).map_err(|e| e.to_string())?;
        Ok(pairs.into_iter().collect())
    }

    /// Appends a value for `name`.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.entry(name.into()).or_default().push(value.into());
    }

    /// Returns the first value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns every value for `name`, or an empty slice.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.inner.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns true if `name` has at least one value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        !self.get_all(name).is_empty()
    }

    /// Returns the number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if there are no names.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns an iterator over names and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.inner
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Values {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (name, value) in iter {
            values.push(name, value);
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_names_keep_order() {
        let values = Values::from_urlencoded(b"ids=3&ids=1&ids=2").unwrap();
        assert_eq!(values.get_all("ids"), ["3", "1", "2"]);
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_decoding() {
        let values = Values::from_urlencoded(b"q=hello+world&path=%2Fusr%2Fbin").unwrap();
        assert_eq!(values.get("q"), Some("hello world"));
        assert_eq!(values.get("path"), Some("/usr/bin"));
    }

    #[test]
    fn test_empty_input() {
        let values = Values::from_urlencoded(b"").unwrap();
        assert!(values.is_empty());
        assert!(values.get_all("x").is_empty());
        assert!(!values.contains("x"));
    }

    #[test]
    fn test_empty_value_is_present() {
        let values = Values::from_urlencoded(b"name=").unwrap();
        assert!(values.contains("name"));
        assert_eq!(values.get("name"), Some(""));
    }

    #[test]
    fn test_iteration_order() {
        let values: Values = [("b", "1"), ("a", "2"), ("b", "3")].into_iter().collect();
        let names: Vec<_> = values.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["b", "a"]);
    }
}
