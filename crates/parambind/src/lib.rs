//! # parambind
//!
//! Tag-driven binding of HTTP path, query and form parameters into typed
//! structs.
//!
//! A destination struct derives [`Bindable`] and tags each field it wants
//! filled with `#[param = "<source>=<name>"]`, where `<source>` is `path`,
//! `query` or `form`:
//!
//! | Tag | Source | Values |
//! |-----|--------|--------|
//! | `path=name` | Router-captured path segment | one |
//! | `query=name` | URL query string | all values of the name |
//! | `form=name` | URL-encoded or multipart body (POST, PUT, PATCH) | one |
//!
//! Only `pub` fields are bound. Fields marked `#[embed]` are walked as if
//! their fields were declared inline.
//!
//! ## Example
//!
//! ```rust
//! use parambind::{path_params_lookup, Bindable, BindRequest, Parser};
//!
//! #[derive(Bindable, Default)]
//! struct Paging {
//!     #[param = "query=limit"]
//!     pub limit: Option<u32>,
//!     #[param = "query=offset"]
//!     pub offset: u32,
//! }
//!
//! #[derive(Bindable, Default)]
//! struct ListComments {
//!     #[param = "path=post_id"]
//!     pub post_id: u64,
//!     #[param = "query=author"]
//!     pub authors: Vec<String>,
//!     #[embed]
//!     pub paging: Paging,
//! }
//!
//! let parser = Parser::new().with_path_param_fn(path_params_lookup());
//! let request = BindRequest::builder()
//!     .uri("/posts/7/comments?author=ann&author=bob&limit=20")
//!     .path_param("post_id", "7")
//!     .build();
//!
//! let params: ListComments = parser.bind(&request).unwrap();
//! assert_eq!(params.post_id, 7);
//! assert_eq!(params.authors, ["ann", "bob"]);
//! assert_eq!(params.paging.limit, Some(20));
//! assert_eq!(params.paging.offset, 0);
//! ```
//!
//! ## Field types
//!
//! Any type implementing [`ParamValue`] can be bound: `bool`, the integer
//! and float primitives, `String`, `Option<T>` of any depth, `Vec<T>` (query
//! only) and every type implementing [`UnmarshalText`].
//!
//! ## Errors
//!
//! [`Parser::parse`] returns a [`BindError`] naming the source and parameter
//! that failed. Numeric failures keep a [`NumErrorKind`] telling syntax
//! errors from out-of-range values.

#![doc(html_root_url = "https://docs.rs/parambind/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Lets `#[derive(Bindable)]` refer to `::parambind` inside this crate.
extern crate self as parambind;

mod coerce;
mod config;
mod discover;
mod error;
mod form;
mod parser;
mod path;
mod query;
mod record;
mod request;
mod tag;
mod values;

pub use coerce::{FieldKind, ParamSlot, ParamValue, UnmarshalText};
pub use config::{ConfigError, ConfigLoader, ParserConfig};
pub use discover::{discover, Binding, EmbedStep};
pub use error::{BindError, BindErrorKind, BoxError, CoerceError, NumError, NumErrorKind};
pub use form::{read_form, DEFAULT_MAX_MEMORY};
pub use parambind_macros::Bindable;
pub use parser::{first_form_value, FormParamFn, Parser, PathParamFn};
pub use path::{path_params_lookup, PathParams};
pub use query::read_query;
pub use record::{Bindable, EmbeddedPointer, FieldInfo, FieldRole, FieldSlot, Record, StructShape};
pub use request::{BindRequest, BindRequestBuilder};
pub use tag::{
    resolve_tag_value, tag_name_resolver, SourceKind, StructTag, TagResolver, DEFAULT_TAG_NAME,
};
pub use values::Values;
