//! Field tags and the `<source>=<name>` grammar.
//!
//! A [`StructTag`] holds the `(key, value)` pairs declared on a field with
//! `#[param = "..."]` or `#[tag(key = "...")]`. A [`TagResolver`] picks the
//! raw values for one key, and [`resolve_tag_value`] splits each into a source
//! modifier and a parameter name.

use std::fmt;
use std::sync::Arc;

/// Tag key the default parser reacts to.
pub const DEFAULT_TAG_NAME: &str = "param";

/// Where a bound value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// A path segment captured by the router (`path=name`).
    Path,
    /// The URL query string (`query=name`).
    Query,
    /// The submitted form body (`form=name`).
    Form,
}

impl SourceKind {
    /// Sources in the order they are resolved for a single field.
    ///
    /// A field tagged for several sources is bound from each in turn, so the
    /// last one that supplies a value wins.
    pub const RESOLUTION_ORDER: [SourceKind; 3] = [Self::Path, Self::Form, Self::Query];

    /// Returns the tag modifier selecting this source.
    #[must_use]
    pub const fn modifier(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Form => "form",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.modifier())
    }
}

/// Declared tag of a single field.
///
/// # Example
///
/// ```rust
/// use parambind::StructTag;
///
/// let tag = StructTag::new(&[("param", "query=id"), ("doc", "identifier")]);
/// assert_eq!(tag.get("param"), Some("query=id"));
/// assert_eq!(tag.get("json"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StructTag {
    pairs: &'static [(&'static str, &'static str)],
}

impl StructTag {
    /// A tag with no pairs.
    pub const EMPTY: StructTag = StructTag { pairs: &[] };

    /// Creates a tag from its `(key, value)` pairs.
    #[must_use]
    pub const fn new(pairs: &'static [(&'static str, &'static str)]) -> Self {
        Self { pairs }
    }

    /// Returns the value of the first pair with the given key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'static str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    /// Returns true if no pairs are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns an iterator over the declared pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.pairs.iter().copied()
    }
}

/// Picks the raw tag values a parser reacts to; empty if the field has none.
///
/// A field declaring several values is bound once per source they name.
pub type TagResolver = Arc<dyn Fn(&StructTag) -> Vec<String> + Send + Sync>;

/// Returns a [`TagResolver`] reading every value stored under `tag_name`.
///
/// Empty values count as absent.
///
/// # Example
///
/// ```rust
/// use parambind::{tag_name_resolver, StructTag};
///
/// let resolver = tag_name_resolver("key");
/// assert_eq!(resolver(&StructTag::new(&[("key", "query=a")])), ["query=a"]);
/// assert_eq!(
///     resolver(&StructTag::new(&[("key", "path=a"), ("doc", "x"), ("key", "query=a")])),
///     ["path=a", "query=a"]
/// );
/// assert!(resolver(&StructTag::new(&[("key", "")])).is_empty());
/// assert!(resolver(&StructTag::new(&[("param", "query=a")])).is_empty());
/// ```
pub fn tag_name_resolver(tag_name: impl Into<String>) -> TagResolver {
    let tag_name = tag_name.into();
    Arc::new(move |tag: &StructTag| {
        tag.iter()
            .filter(|(key, value)| *key == tag_name && !value.is_empty())
            .map(|(_, value)| value.to_string())
            .collect()
    })
}

/// Splits `<modifier>=<name>` and returns `name` if the modifier matches.
///
/// Values without exactly one `=` never match.
///
/// ```rust
/// use parambind::resolve_tag_value;
///
/// assert_eq!(resolve_tag_value("query=id", "query"), Some("id"));
/// assert_eq!(resolve_tag_value("query=id", "path"), None);
/// assert_eq!(resolve_tag_value("query=id=x", "query"), None);
/// assert_eq!(resolve_tag_value("query", "query"), None);
/// ```
#[must_use]
pub fn resolve_tag_value<'a>(tag_value: &'a str, modifier: &str) -> Option<&'a str> {
    let mut splits = tag_value.split('=');
    match (splits.next(), splits.next(), splits.next()) {
        (Some(found), Some(name), None) if found == modifier => Some(name),
        _ => None,
    }
}

/// Resolves the parameter name a field declares for `source`.
///
/// The first value naming `source` wins.
pub(crate) fn resolve_tag(
    resolver: &TagResolver,
    tag: &StructTag,
    source: SourceKind,
) -> Option<String> {
    resolver(tag)
        .iter()
        .find_map(|value| resolve_tag_value(value, source.modifier()))
        .map(str::to_string)
}
