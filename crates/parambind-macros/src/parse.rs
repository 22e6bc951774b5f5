//! Parsing of `#[derive(Bindable)]` input.
//!
//! Turns a struct declaration into a [`BindableStruct`]: one
//! [`BindableField`] per named field, with its visibility, declared tag
//! pairs and embedding kind.

use syn::{
    ext::IdentExt, spanned::Spanned, Attribute, Data, DeriveInput, Expr, ExprLit, Fields,
    GenericArgument, Generics, Ident, Lit, LitStr, Meta, PathArguments, Type, Visibility,
};

/// Tag key stored by `#[param = "..."]`.
const PARAM_KEY: &str = "param";

/// Sources a tag value can name.
const SOURCES: [&str; 3] = ["path", "form", "query"];

/// How an `#[embed]` field holds its struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedKind {
    /// `S`
    Inline,
    /// `Box<S>`
    Boxed,
    /// `Option<Box<S>>`
    Pointer,
}

/// A parsed field.
#[derive(Debug)]
pub struct BindableField {
    /// The field identifier.
    pub ident: Ident,
    /// The field name without any `r#` prefix.
    pub name: String,
    /// The declared type.
    pub ty: Type,
    /// Whether the field is declared `pub`.
    pub exported: bool,
    /// Declared `(key, value)` tag pairs, in declaration order.
    pub tags: Vec<(String, String)>,
    /// Set for `#[embed]` fields.
    pub embed: Option<EmbedKind>,
}

impl BindableField {
    /// Returns the embedded struct type for `#[embed]` fields.
    pub fn embedded_type(&self) -> Option<&Type> {
        match self.embed? {
            EmbedKind::Inline => Some(&self.ty),
            EmbedKind::Boxed => generic_arg(&self.ty, "Box"),
            EmbedKind::Pointer => {
                generic_arg(&self.ty, "Option").and_then(|boxed| generic_arg(boxed, "Box"))
            }
        }
    }

    /// Returns true if the field takes values from request parameters.
    ///
    /// Only tag values of the form `<source>=<name>` count; a field tagged
    /// for other consumers (`#[tag(json = "meta")]`) stays opaque.
    pub fn is_value(&self) -> bool {
        self.embed.is_none()
            && self.exported
            && self.tags.iter().any(|(_, value)| is_param_directive(value))
    }
}

/// Returns true if `value` reads `path=<name>`, `form=<name>` or `query=<name>`.
fn is_param_directive(value: &str) -> bool {
    let mut splits = value.split('=');
    match (splits.next(), splits.next(), splits.next()) {
        (Some(source), Some(_), None) => SOURCES.contains(&source),
        _ => false,
    }
}

/// A parsed destination struct.
#[derive(Debug)]
pub struct BindableStruct {
    /// The struct identifier.
    pub ident: Ident,
    /// The struct name without any `r#` prefix.
    pub name: String,
    /// Declared generics.
    pub generics: Generics,
    /// Named fields in declaration order.
    pub fields: Vec<BindableField>,
}

impl BindableStruct {
    /// Parses derive input, rejecting anything but a struct with named fields.
    pub fn parse(input: DeriveInput) -> syn::Result<Self> {
        let named = match input.data {
            Data::Struct(data) => match data.fields {
                Fields::Named(named) => named,
                other => {
                    return Err(syn::Error::new(
                        other.span(),
                        "can only bind into struct with named fields",
                    ))
                }
            },
            Data::Enum(data) => {
                return Err(syn::Error::new(
                    data.enum_token.span,
                    "can only bind into struct",
                ))
            }
            Data::Union(data) => {
                return Err(syn::Error::new(
                    data.union_token.span,
                    "can only bind into struct",
                ))
            }
        };

        let fields = named
            .named
            .into_iter()
            .map(parse_field)
            .collect::<syn::Result<Vec<_>>>()?;

        Ok(Self {
            name: input.ident.unraw().to_string(),
            ident: input.ident,
            generics: input.generics,
            fields,
        })
    }
}

fn parse_field(field: syn::Field) -> syn::Result<BindableField> {
    let span = field.span();
    let ident = field
        .ident
        .ok_or_else(|| syn::Error::new(span, "expected a named field"))?;

    let mut tags = Vec::new();
    let mut embed = false;
    for attr in &field.attrs {
        if attr.path().is_ident(PARAM_KEY) {
            tags.push((PARAM_KEY.to_string(), param_value(attr)?));
        } else if attr.path().is_ident("tag") {
            parse_tag_list(attr, &mut tags)?;
        } else if attr.path().is_ident("embed") {
            attr.meta.require_path_only()?;
            embed = true;
        }
    }

    let embed = if embed {
        if !tags.is_empty() {
            return Err(syn::Error::new(
                span,
                "embedded fields cannot carry parameter tags",
            ));
        }
        Some(embed_kind(&field.ty))
    } else {
        None
    };

    Ok(BindableField {
        name: ident.unraw().to_string(),
        ident,
        ty: field.ty,
        exported: matches!(field.vis, Visibility::Public(_)),
        tags,
        embed,
    })
}

// #[param = "query=id"]
fn param_value(attr: &Attribute) -> syn::Result<String> {
    match &attr.meta {
        Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(s), ..
            }) => Ok(s.value()),
            other => Err(syn::Error::new(other.span(), "expected string literal")),
        },
        other => Err(syn::Error::new(
            other.span(),
            "expected #[param = \"<source>=<name>\"]",
        )),
    }
}

// #[tag(param = "query=id", doc = "...")]
fn parse_tag_list(attr: &Attribute, tags: &mut Vec<(String, String)>) -> syn::Result<()> {
    attr.parse_nested_meta(|meta| {
        let key = meta
            .path
            .get_ident()
            .ok_or_else(|| meta.error("expected tag key"))?
            .unraw()
            .to_string();
        let value: LitStr = meta.value()?.parse()?;
        tags.push((key, value.value()));
        Ok(())
    })
}

fn embed_kind(ty: &Type) -> EmbedKind {
    if generic_arg(ty, "Option").is_some_and(|inner| generic_arg(inner, "Box").is_some()) {
        EmbedKind::Pointer
    } else if generic_arg(ty, "Box").is_some() {
        EmbedKind::Boxed
    } else {
        EmbedKind::Inline
    }
}

/// Returns `T` if `ty` is `<wrapper><T>`, matching on the last path segment.
fn generic_arg<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_parse_fields() {
        let input: DeriveInput = parse_quote! {
            struct Params {
                #[param = "query=id"]
                pub id: u64,
                #[tag(param = "path=name", doc = "display name")]
                pub name: String,
                hidden: bool,
                pub(crate) restricted: i32,
            }
        };
        let parsed = BindableStruct::parse(input).unwrap();

        assert_eq!(parsed.name, "Params");
        assert_eq!(parsed.fields.len(), 4);

        let id = &parsed.fields[0];
        assert_eq!(id.tags, [("param".to_string(), "query=id".to_string())]);
        assert!(id.exported);
        assert!(id.is_value());

        let name = &parsed.fields[1];
        assert_eq!(name.tags.len(), 2);
        assert_eq!(name.tags[1], ("doc".to_string(), "display name".to_string()));

        assert!(!parsed.fields[2].exported);
        assert!(!parsed.fields[2].is_value());
        assert!(!parsed.fields[3].exported);
    }

    #[test]
    fn test_only_source_directives_make_values() {
        let input: DeriveInput = parse_quote! {
            struct Params {
                #[tag(json = "meta")]
                pub meta: Meta,
                #[tag(doc = "display name", api = "form=name")]
                pub name: String,
                #[param = "header=x-id"]
                pub id: String,
                #[param = "query=a=b"]
                pub ambiguous: String,
            }
        };
        let parsed = BindableStruct::parse(input).unwrap();

        let values: Vec<_> = parsed.fields.iter().map(BindableField::is_value).collect();
        assert_eq!(values, [false, true, false, false]);
    }

    #[test]
    fn test_param_directive() {
        assert!(is_param_directive("path=id"));
        assert!(is_param_directive("form=title"));
        assert!(is_param_directive("query=q"));
        assert!(!is_param_directive("query"));
        assert!(!is_param_directive("cursor"));
        assert!(!is_param_directive("json=cursor"));
        assert!(!is_param_directive("query=q=1"));
    }

    #[test]
    fn test_embed_kinds() {
        let input: DeriveInput = parse_quote! {
            struct Params {
                #[embed]
                pub inline: Filters,
                #[embed]
                boxed: Box<Filters>,
                #[embed]
                pub pointer: Option<Box<Filters>>,
            }
        };
        let parsed = BindableStruct::parse(input).unwrap();
        let filters: Type = parse_quote!(Filters);

        let kinds: Vec<_> = parsed.fields.iter().map(|f| f.embed).collect();
        assert_eq!(
            kinds,
            [
                Some(EmbedKind::Inline),
                Some(EmbedKind::Boxed),
                Some(EmbedKind::Pointer)
            ]
        );
        for field in &parsed.fields {
            assert_eq!(field.embedded_type(), Some(&filters));
            assert!(!field.is_value());
        }
    }

    #[test]
    fn test_raw_identifiers() {
        let input: DeriveInput = parse_quote! {
            struct r#Params {
                #[param = "query=type"]
                pub r#type: String,
            }
        };
        let parsed = BindableStruct::parse(input).unwrap();

        assert_eq!(parsed.name, "Params");
        assert_eq!(parsed.fields[0].name, "type");
    }

    #[test]
    fn test_enum_rejected() {
        let input: DeriveInput = parse_quote! {
            enum Params {
                A,
                B,
            }
        };
        let err = BindableStruct::parse(input).unwrap_err();
        assert_eq!(err.to_string(), "can only bind into struct");
    }

    #[test]
    fn test_tuple_struct_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Params(pub u64);
        };
        let err = BindableStruct::parse(input).unwrap_err();
        assert!(err.to_string().contains("named fields"));
    }

    #[test]
    fn test_tagged_embed_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Params {
                #[embed]
                #[param = "query=x"]
                pub filters: Filters,
            }
        };
        assert!(BindableStruct::parse(input).is_err());
    }

    #[test]
    fn test_param_requires_string() {
        let input: DeriveInput = parse_quote! {
            struct Params {
                #[param = 5]
                pub id: u64,
            }
        };
        let err = BindableStruct::parse(input).unwrap_err();
        assert_eq!(err.to_string(), "expected string literal");
    }
}
