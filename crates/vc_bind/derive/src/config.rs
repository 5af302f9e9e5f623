use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Ident, Type};

use crate::attributes::{FieldAttributes, TypeAttributes};
use crate::manifest::bind_path;

/// A named field and its parsed attributes.
struct ConfigField {
    ident: Ident,
    /// The member name, without any raw identifier prefix.
    name: String,
    ty: Type,
    attrs: FieldAttributes,
}

impl ConfigField {
    fn is_member(&self) -> bool {
        self.attrs.skip.is_none() && self.attrs.extends.is_none()
    }
}

pub(crate) fn derive_config(input: DeriveInput) -> syn::Result<TokenStream> {
    if !input.generics.params.is_empty() || input.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "`Config` does not support generic types",
        ));
    }

    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "`Config` requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "`Config` can only be derived for structs",
            ));
        }
    };

    let type_attrs = TypeAttributes::parse(&input.attrs)?;
    let fields = named
        .named
        .iter()
        .map(|field| {
            let ident = field.ident.clone().expect("named field");
            Ok(ConfigField {
                name: ident.unraw().to_string(),
                ident,
                ty: field.ty.clone(),
                attrs: FieldAttributes::parse(&field.attrs)?,
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    if type_attrs.record.is_some()
        && let Some(field) = fields.iter().find(|field| field.attrs.extends.is_some())
    {
        return Err(syn::Error::new_spanned(
            &field.ident,
            "`extends` is not supported on records",
        ));
    }

    let vc_bind = bind_path();
    let typed = impl_typed(&vc_bind, &input.ident, &type_attrs, &fields);
    let bind = impl_bind(&vc_bind, &input.ident);
    let configuration = impl_configuration(&vc_bind, &input.ident, &type_attrs, &fields);

    Ok(quote! {
        #typed
        #bind
        #configuration
    })
}

fn impl_typed(
    vc_bind: &syn::Path,
    ident: &Ident,
    type_attrs: &TypeAttributes,
    fields: &[ConfigField],
) -> TokenStream {
    let names = fields
        .iter()
        .filter(|field| field.is_member())
        .map(|field| &field.name);
    let record = type_attrs.record.is_some();
    let default = type_attrs.default.map(|_| {
        quote! {
            .with_default(|| -> ::std::boxed::Box<dyn ::core::any::Any> {
                ::std::boxed::Box::new(<Self as ::core::default::Default>::default())
            })
        }
    });

    quote! {
        impl #vc_bind::info::Typed for #ident {
            fn type_info() -> &'static #vc_bind::info::TypeInfo {
                static CELL: #vc_bind::info::NonGenericTypeInfoCell = #vc_bind::info::NonGenericTypeInfoCell::new();
                CELL.get_or_init(|| {
                    #vc_bind::info::TypeInfo::new::<Self>(#vc_bind::info::TypeKind::Struct(
                        #vc_bind::info::StructInfo::new(&[#(#names),*])
                            .with_record(#record)
                            #default
                    ))
                })
            }
        }
    }
}

fn impl_bind(vc_bind: &syn::Path, ident: &Ident) -> TokenStream {
    quote! {
        impl #vc_bind::serializer::Bind for #ident {
            fn synthesize(
                ctx: &#vc_bind::serializer::SerializerContext,
            ) -> ::core::result::Result<
                ::core::option::Option<::std::sync::Arc<dyn #vc_bind::serializer::Serializer<Self>>>,
                #vc_bind::error::Error,
            > {
                let serializer: ::std::sync::Arc<dyn #vc_bind::serializer::Serializer<Self>> =
                    ::std::sync::Arc::new(#vc_bind::config::ConfigurationSerializer::<Self>::new(ctx)?);
                ::core::result::Result::Ok(::core::option::Option::Some(serializer))
            }
        }
    }
}

fn impl_configuration(
    vc_bind: &syn::Path,
    ident: &Ident,
    type_attrs: &TypeAttributes,
    fields: &[ConfigField],
) -> TokenStream {
    let kind = match type_attrs.record {
        Some(_) => record_kind(vc_bind, fields),
        None => quote!(#vc_bind::schema::Schema::object()),
    };
    let key_format = match &type_attrs.key_format {
        Some(format) => {
            let case = format.to_tokens(vc_bind);
            quote!(::core::option::Option::Some(#case))
        }
        None => quote!(::core::option::Option::None),
    };

    // Parents first, so own members shadow theirs in place.
    let parents = fields
        .iter()
        .filter(|field| field.attrs.extends.is_some())
        .map(|field| {
            let field_ident = &field.ident;
            let ty = &field.ty;
            quote! {
                .extend(
                    <#ty as #vc_bind::schema::Configuration>::schema(),
                    |s: &#ident| &s.#field_ident,
                    |s: &mut #ident| &mut s.#field_ident,
                )
            }
        });
    let members = fields
        .iter()
        .filter(|field| field.is_member())
        .map(|field| member(vc_bind, ident, field));

    quote! {
        impl #vc_bind::schema::Configuration for #ident {
            fn schema() -> &'static #vc_bind::schema::Schema<Self> {
                static SCHEMA: #vc_bind::__macro_exports::OnceLock<#vc_bind::schema::Schema<#ident>> =
                    #vc_bind::__macro_exports::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    #kind
                        .with_key_format(#key_format)
                        #(#parents)*
                        #(.member(#members))*
                })
            }
        }
    }
}

fn record_kind(vc_bind: &syn::Path, fields: &[ConfigField]) -> TokenStream {
    let taken = fields.iter().map(|field| {
        let field_ident = &field.ident;
        if field.is_member() {
            let name = &field.name;
            let ty = &field.ty;
            quote!(#field_ident: components.take::<#ty>(#name)?)
        } else {
            quote!(#field_ident: ::core::default::Default::default())
        }
    });
    let inserted = fields.iter().filter(|field| field.is_member()).map(|field| {
        let field_ident = &field.ident;
        let name = &field.name;
        quote!(components.insert(#name, ::std::boxed::Box::new(value.#field_ident));)
    });

    quote! {
        #vc_bind::schema::Schema::record(
            |components: &mut #vc_bind::builder::Components| {
                ::core::option::Option::Some(Self { #(#taken,)* })
            },
            |value: Self| {
                let mut components = #vc_bind::builder::Components::new();
                #(#inserted)*
                components
            },
        )
    }
}

fn member(vc_bind: &syn::Path, ident: &Ident, field: &ConfigField) -> TokenStream {
    let field_ident = &field.ident;
    let name = &field.name;
    let ty = &field.ty;
    let attrs = &field.attrs;

    let mut info = quote!(#vc_bind::schema::MemberInfo::new::<#ty>(#name));
    if let Some(key) = &attrs.key {
        info.extend(quote!(.with_key(#key)));
    }
    if let Some(format) = &attrs.key_format {
        let case = format.to_tokens(vc_bind);
        info.extend(quote!(.with_key_format(#case)));
    }
    if attrs.optional.is_some() {
        info.extend(quote!(.with_optional(true)));
    }
    if attrs.hidden.is_some() {
        info.extend(quote!(.with_hidden(true)));
    }
    if attrs.ignore.is_some() {
        info.extend(quote!(.with_ignored(true)));
    }
    if !attrs.comments.is_empty() {
        let lines = &attrs.comments;
        info.extend(quote!(.with_comments(&[#(#lines),*])));
    }
    if let Some(comment) = &attrs.inline_comment {
        info.extend(quote!(.with_inline_comment(#comment)));
    }

    let mut overrides = TokenStream::new();
    if let Some(with) = &attrs.with {
        overrides.extend(quote!(.with::<#with>()));
    }
    if let Some(write_with) = &attrs.write_with {
        overrides.extend(quote!(.write_with::<#write_with>()));
    }
    if let Some(read_with) = &attrs.read_with {
        overrides.extend(quote!(.read_with::<#read_with>()));
    }

    quote! {
        #vc_bind::schema::Field::<#ident, #ty>::new(
            #info,
            |s| &s.#field_ident,
            |s, value| s.#field_ident = value,
        )
        #overrides
    }
}
