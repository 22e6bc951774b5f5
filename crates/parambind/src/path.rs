//! Router-captured path parameters.
//!
//! Routers store the segments they capture as [`PathParams`], either directly
//! on a [`BindRequest`] or as an extension of an `http::Request`. The parser
//! only sees them through a [`PathParamFn`](crate::PathParamFn);
//! [`path_params_lookup`] is the one that reads [`PathParams`].

use smallvec::SmallVec;
use std::sync::Arc;

use crate::parser::PathParamFn;
use crate::BindRequest;

/// Parameters kept inline before spilling to the heap.
const INLINE_PARAMS: usize = 4;

/// Path parameters captured by a router, as `(name, value)` pairs.
///
/// # Example
///
/// ```rust
/// use parambind::PathParams;
///
/// let mut params = PathParams::new();
/// params.push("subject", "world");
///
/// assert_eq!(params.get("subject"), Some("world"));
/// assert_eq!(params.get("object"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathParams {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl PathParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value of the first parameter named `name`.
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

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Returns a [`PathParamFn`] reading the request's [`PathParams`].
///
/// # Example
///
/// ```rust
/// use parambind::{path_params_lookup, BindRequest, Parser};
///
/// let parser = Parser::new().with_path_param_fn(path_params_lookup());
/// let request = BindRequest::builder()
///     .uri("/hello/world")
///     .path_param("subject", "world")
///     .build();
/// # let _ = (parser, request);
/// ```
#[must_use]
pub fn path_params_lookup() -> PathParamFn {
    Arc::new(|request: &BindRequest, name: &str| {
        request.path_params().get(name).map(str::to_string)
    })
}
