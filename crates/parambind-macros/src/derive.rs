//! `#[derive(Bindable)]` expansion.
//!
//! Emits two impls for the parsed struct:
//! - `parambind::Record`, matching field indices to `FieldSlot`s,
//! - `parambind::Bindable`, returning the declared `StructShape`.

use proc_macro2::{Literal, TokenStream};
use quote::quote;
use syn::DeriveInput;

use crate::parse::{BindableField, BindableStruct, EmbedKind};

/// Expands `#[derive(Bindable)]`.
pub fn expand_bindable(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = syn::parse2(input)?;
    let parsed = BindableStruct::parse(input)?;
    Ok(generate(&parsed))
}

fn generate(parsed: &BindableStruct) -> TokenStream {
    let ident = &parsed.ident;
    let name = &parsed.name;
    let (impl_generics, ty_generics, where_clause) = parsed.generics.split_for_impl();

    let arms = parsed
        .fields
        .iter()
        .enumerate()
        .filter_map(|(index, field)| field_arm(index, field));
    let infos = parsed.fields.iter().map(field_info);

    quote! {
        impl #impl_generics ::parambind::Record for #ident #ty_generics #where_clause {
            fn field_mut(
                &mut self,
                index: usize,
            ) -> ::core::option::Option<::parambind::FieldSlot<'_>> {
                match index {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl #impl_generics ::parambind::Bindable for #ident #ty_generics #where_clause {
            fn shape() -> ::parambind::StructShape {
                ::parambind::StructShape::new(#name, ::std::vec![#(#infos),*])
            }
        }
    }
}

fn field_arm(index: usize, field: &BindableField) -> Option<TokenStream> {
    let index = Literal::usize_unsuffixed(index);
    let ident = &field.ident;

    let slot = match field.embed {
        Some(EmbedKind::Inline) => quote! { ::parambind::FieldSlot::Struct(&mut self.#ident) },
        Some(EmbedKind::Boxed) => quote! { ::parambind::FieldSlot::Struct(&mut *self.#ident) },
        Some(EmbedKind::Pointer) => quote! { ::parambind::FieldSlot::Pointer(&mut self.#ident) },
        None if field.is_value() => quote! { ::parambind::FieldSlot::Value(&mut self.#ident) },
        None => return None,
    };

    Some(quote! { #index => ::core::option::Option::Some(#slot), })
}

fn field_info(field: &BindableField) -> TokenStream {
    let name = &field.name;
    let exported = field.exported;

    if let Some(embedded) = field.embedded_type() {
        let pointer = field.embed == Some(EmbedKind::Pointer);
        return quote! {
            ::parambind::FieldInfo::embedded::<#embedded>(#name, #exported, #pointer)
        };
    }

    let keys = field.tags.iter().map(|(key, _)| key);
    let values = field.tags.iter().map(|(_, value)| value);
    let tag = quote! { ::parambind::StructTag::new(&[#((#keys, #values)),*]) };

    if field.is_value() {
        let ty = &field.ty;
        quote! { ::parambind::FieldInfo::value::<#ty>(#name, #exported, #tag) }
    } else {
        quote! { ::parambind::FieldInfo::opaque(#name, #exported, #tag) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(input: TokenStream) -> String {
        expand_bindable(input).unwrap().to_string()
    }

    #[test]
    fn test_expand_value_fields() {
        let expanded = expand(quote! {
            struct Params {
                #[param = "query=id"]
                pub id: u64,
                note: String,
            }
        });

        assert!(expanded.contains("impl :: parambind :: Record for Params"));
        assert!(expanded.contains("impl :: parambind :: Bindable for Params"));
        assert!(expanded.contains("0 => :: core :: option :: Option :: Some (:: parambind :: FieldSlot :: Value (& mut self . id))"));
        assert!(!expanded.contains("1 =>"));
        assert!(expanded.contains("FieldInfo :: value :: < u64 > (\"id\" , true"));
        assert!(expanded.contains("(\"param\" , \"query=id\")"));
        assert!(expanded.contains("FieldInfo :: opaque (\"note\" , false"));
    }

    #[test]
    fn test_expand_foreign_tags_stay_opaque() {
        let expanded = expand(quote! {
            struct Params {
                #[tag(json = "meta")]
                pub meta: Meta,
            }
        });

        assert!(!expanded.contains("FieldSlot :: Value"));
        assert!(!expanded.contains("FieldInfo :: value"));
        assert!(expanded.contains("FieldInfo :: opaque (\"meta\" , true"));
        assert!(expanded.contains("(\"json\" , \"meta\")"));
    }

    #[test]
    fn test_expand_embedded_fields() {
        let expanded = expand(quote! {
            struct Params {
                #[embed]
                pub filters: Filters,
                #[embed]
                paging: Box<Paging>,
                #[embed]
                pub extra: Option<Box<Extra>>,
            }
        });

        assert!(expanded.contains("FieldSlot :: Struct (& mut self . filters)"));
        assert!(expanded.contains("FieldSlot :: Struct (& mut * self . paging)"));
        assert!(expanded.contains("FieldSlot :: Pointer (& mut self . extra)"));
        assert!(expanded.contains("FieldInfo :: embedded :: < Filters > (\"filters\" , true , false)"));
        assert!(expanded.contains("FieldInfo :: embedded :: < Paging > (\"paging\" , false , false)"));
        assert!(expanded.contains("FieldInfo :: embedded :: < Extra > (\"extra\" , true , true)"));
    }

    #[test]
    fn test_expand_generics() {
        let expanded = expand(quote! {
            struct Params<T: Clone> where T: Default {
                #[param = "query=v"]
                pub v: T,
            }
        });

        assert!(expanded.contains("impl < T : Clone > :: parambind :: Record for Params < T > where T : Default"));
    }

    #[test]
    fn test_expand_rejects_enum() {
        let err = expand_bindable(quote! {
            enum Params { A }
        })
        .unwrap_err();

        assert_eq!(err.to_string(), "can only bind into struct");
    }
}
