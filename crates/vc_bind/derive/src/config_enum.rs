use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Ident};

use crate::attributes::VariantAttributes;
use crate::manifest::bind_path;

/// `OnHold` -> `ON_HOLD`, `HTTP2Only` -> `HTTP2_ONLY`.
fn screaming_snake(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);
    for (index, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && index > 0 {
            let prev = chars[index - 1];
            let next_lower = chars.get(index + 1).is_some_and(|next| next.is_lowercase());
            if prev != '_' && (prev.is_lowercase() || prev.is_ascii_digit() || next_lower) {
                out.push('_');
            }
        }
        out.extend(ch.to_uppercase());
    }
    out
}

pub(crate) fn derive_config_enum(input: DeriveInput) -> syn::Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "`ConfigEnum` does not support generic types",
        ));
    }
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "`ConfigEnum` can only be derived for enums",
        ));
    };

    let mut variants: Vec<(Ident, String)> = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "`ConfigEnum` variants cannot hold data",
            ));
        }
        let attrs = VariantAttributes::parse(&variant.attrs)?;
        let name = match attrs.rename {
            Some(lit) => lit.value(),
            None => screaming_snake(&variant.ident.unraw().to_string()),
        };
        if let Some((other, _)) = variants.iter().find(|(_, existing)| existing.eq_ignore_ascii_case(&name)) {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                format!("variant name `{name}` clashes with `{other}`"),
            ));
        }
        variants.push((variant.ident.clone(), name));
    }

    let vc_bind = bind_path();
    let ident = &input.ident;
    let idents: Vec<&Ident> = variants.iter().map(|(ident, _)| ident).collect();
    let names: Vec<&String> = variants.iter().map(|(_, name)| name).collect();

    Ok(quote! {
        impl #vc_bind::serializer::ConfigEnum for #ident {
            fn variant_name(&self) -> &'static str {
                match *self {
                    #(Self::#idents => #names,)*
                }
            }

            fn from_variant_name(name: &str) -> ::core::option::Option<Self> {
                match name {
                    #(#names => ::core::option::Option::Some(Self::#idents),)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl #vc_bind::info::Typed for #ident {
            fn type_info() -> &'static #vc_bind::info::TypeInfo {
                static CELL: #vc_bind::info::NonGenericTypeInfoCell = #vc_bind::info::NonGenericTypeInfoCell::new();
                CELL.get_or_init(|| {
                    #vc_bind::info::TypeInfo::new::<Self>(#vc_bind::info::TypeKind::Enum(
                        #vc_bind::info::EnumInfo::new(&[#(#names),*])
                    ))
                })
            }
        }

        impl #vc_bind::serializer::Bind for #ident {
            fn synthesize(
                _: &#vc_bind::serializer::SerializerContext,
            ) -> ::core::result::Result<
                ::core::option::Option<::std::sync::Arc<dyn #vc_bind::serializer::Serializer<Self>>>,
                #vc_bind::error::Error,
            > {
                let serializer: ::std::sync::Arc<dyn #vc_bind::serializer::Serializer<Self>> =
                    ::std::sync::Arc::new(#vc_bind::serializer::EnumSerializer::<Self>::new());
                ::core::result::Result::Ok(::core::option::Option::Some(serializer))
            }
        }
    })
}

// -----------------------------------------------------------------------------
// Tests
