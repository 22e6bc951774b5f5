//! Procedural macros for `parambind`.
//!
//! `#[derive(Bindable)]` turns a struct declaration and its field attributes
//! into the binding table the parser walks at runtime.
//!
//! # Attributes
//!
//! | Attribute | Meaning |
//! |-----------|---------|
//! | `#[param = "<source>=<name>"]` | Stores the value under the `param` tag key |
//! | `#[tag(key = "value", ...)]` | Stores values under arbitrary tag keys |
//! | `#[embed]` | Walks the field's struct as if its fields were declared inline |
//!
//! Only `pub` fields are exported. An exported field with at least one tag
//! value of the form `path=<name>`, `form=<name>` or `query=<name>` must
//! implement `parambind::ParamValue` and `Default`. Fields tagged only for
//! other consumers, such as `#[tag(json = "meta")]`, are left alone.

mod derive;
mod parse;

use proc_macro::TokenStream;

/// Derives `parambind::Record` and `parambind::Bindable` for a struct with
/// named fields.
///
/// # Example
///
/// ```rust,ignore
/// use parambind::Bindable;
///
/// #[derive(Bindable, Default)]
/// struct Filters {
///     #[param = "query=tag"]
///     pub tags: Vec<String>,
/// }
///
/// #[derive(Bindable, Default)]
/// struct ListUsers {
///     #[param = "path=org"]
///     pub org: String,
///     #[tag(param = "query=limit", doc = "page size")]
///     pub limit: Option<u32>,
///     #[embed]
///     pub filters: Option<Box<Filters>>,
/// }
/// ```
///
/// # Errors
///
/// Fails to compile for enums, unions and tuple or unit structs, and for
/// `#[embed]` fields that also carry tags.
#[proc_macro_derive(Bindable, attributes(param, tag, embed))]
pub fn derive_bindable(input: TokenStream) -> TokenStream {
    derive::expand_bindable(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
