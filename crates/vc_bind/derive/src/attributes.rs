use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::spanned::Spanned;
use syn::{Attribute, LitStr, Type};

use crate::CONFIG_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// Key formats

/// The `key_format` names and the `KeyCase` variants they select.
const KEY_CASES: &[(&str, &str)] = &[
    ("identity", "Identity"),
    ("snake", "Snake"),
    ("upper_snake", "UpperSnake"),
    ("kebab", "Kebab"),
    ("upper_kebab", "UpperKebab"),
    ("camel", "Camel"),
    ("pascal", "Pascal"),
    ("proper", "Proper"),
    ("upper", "Upper"),
];

/// A validated `key_format = "..."` value.
#[derive(Clone)]
pub(crate) struct KeyFormat {
    variant: syn::Ident,
}

impl KeyFormat {
    fn parse(lit: &LitStr) -> syn::Result<Self> {
        let value = lit.value();
        let Some((_, variant)) = KEY_CASES.iter().find(|(name, _)| *name == value) else {
            let names: Vec<&str> = KEY_CASES.iter().map(|(name, _)| *name).collect();
            return Err(syn::Error::new(
                lit.span(),
                format!("unknown key format `{value}`, expected one of: {}", names.join(", ")),
            ));
        };
        Ok(Self {
            variant: syn::Ident::new(variant, lit.span()),
        })
    }

    /// `KeyCase::Variant` under the binding crate path.
    pub fn to_tokens(&self, vc_bind: &syn::Path) -> TokenStream {
        let variant = &self.variant;
        quote!(#vc_bind::schema::KeyCase::#variant)
    }
}

// -----------------------------------------------------------------------------
// Helpers

fn config_attributes(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident(CONFIG_ATTRIBUTE_NAME))
}

fn set_flag(flag: &mut Option<Span>, meta: &ParseNestedMeta) -> syn::Result<()> {
    if flag.is_some() {
        return Err(meta.error("duplicate attribute"));
    }
    *flag = Some(meta.path.span());
    Ok(())
}

fn set_once<T>(slot: &mut Option<T>, value: T, meta: &ParseNestedMeta) -> syn::Result<()> {
    if slot.is_some() {
        return Err(meta.error("duplicate attribute"));
    }
    *slot = Some(value);
    Ok(())
}

// -----------------------------------------------------------------------------
// Type attributes

/// `#[config(...)]` on a struct.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    /// Built from its components instead of assigned member by member.
    pub record: Option<Span>,
    /// Uses `Default` as the fallback instance.
    pub default: Option<Span>,
    pub key_format: Option<KeyFormat>,
}

impl TypeAttributes {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in config_attributes(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("record") {
                    set_flag(&mut this.record, &meta)
                } else if meta.path.is_ident("default") {
                    set_flag(&mut this.default, &meta)
                } else if meta.path.is_ident("key_format") {
                    let lit: LitStr = meta.value()?.parse()?;
                    let format = KeyFormat::parse(&lit)?;
                    set_once(&mut this.key_format, format, &meta)
                } else {
                    Err(meta.error("unsupported type attribute, expected `record`, `default` or `key_format`"))
                }
            })?;
        }
        Ok(this)
    }
}

// -----------------------------------------------------------------------------
// Field attributes

/// `#[config(...)]` on a named field.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    /// Not a member at all.
    pub skip: Option<Span>,
    /// Flattens the members of this field's configuration type.
    pub extends: Option<Span>,
    pub ignore: Option<Span>,
    pub optional: Option<Span>,
    pub hidden: Option<Span>,
    pub key: Option<LitStr>,
    pub key_format: Option<KeyFormat>,
    pub comments: Vec<LitStr>,
    pub inline_comment: Option<LitStr>,
    pub with: Option<Type>,
    pub write_with: Option<Type>,
    pub read_with: Option<Type>,
}

impl FieldAttributes {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in config_attributes(attrs) {
            attr.parse_nested_meta(|meta| {
                let path = &meta.path;
                if path.is_ident("skip") {
                    set_flag(&mut this.skip, &meta)
                } else if path.is_ident("extends") {
                    set_flag(&mut this.extends, &meta)
                } else if path.is_ident("ignore") {
                    set_flag(&mut this.ignore, &meta)
                } else if path.is_ident("optional") {
                    set_flag(&mut this.optional, &meta)
                } else if path.is_ident("hidden") {
                    set_flag(&mut this.hidden, &meta)
                } else if path.is_ident("key") {
                    let lit: LitStr = meta.value()?.parse()?;
                    if lit.value().is_empty() {
                        return Err(syn::Error::new(lit.span(), "key must not be empty"));
                    }
                    set_once(&mut this.key, lit, &meta)
                } else if path.is_ident("key_format") {
                    let lit: LitStr = meta.value()?.parse()?;
                    let format = KeyFormat::parse(&lit)?;
                    set_once(&mut this.key_format, format, &meta)
                } else if path.is_ident("comment") {
                    this.comments.push(meta.value()?.parse()?);
                    Ok(())
                } else if path.is_ident("inline_comment") {
                    let lit: LitStr = meta.value()?.parse()?;
                    set_once(&mut this.inline_comment, lit, &meta)
                } else if path.is_ident("with") {
                    let ty: Type = meta.value()?.parse()?;
                    set_once(&mut this.with, ty, &meta)
                } else if path.is_ident("write_with") {
                    let ty: Type = meta.value()?.parse()?;
                    set_once(&mut this.write_with, ty, &meta)
                } else if path.is_ident("read_with") {
                    let ty: Type = meta.value()?.parse()?;
                    set_once(&mut this.read_with, ty, &meta)
                } else {
                    Err(meta.error("unsupported field attribute"))
                }
            })?;
        }
        this.validate()?;
        Ok(this)
    }

    /// Rejects combinations that have no meaning together.
    fn validate(&self) -> syn::Result<()> {
        if let Some(span) = self.skip
            && self.has_member_options()
        {
            return Err(syn::Error::new(span, "`skip` cannot be combined with other attributes"));
        }
        if let Some(span) = self.extends
            && self.has_member_options()
        {
            return Err(syn::Error::new(span, "`extends` cannot be combined with other attributes"));
        }
        if let (Some(_), Some(ty)) = (&self.with, self.write_with.as_ref().or(self.read_with.as_ref())) {
            return Err(syn::Error::new(
                ty.span(),
                "`with` already covers `write_with` and `read_with`",
            ));
        }
        Ok(())
    }

    fn has_member_options(&self) -> bool {
        self.ignore.is_some()
            || self.optional.is_some()
            || self.hidden.is_some()
            || self.key.is_some()
            || self.key_format.is_some()
            || !self.comments.is_empty()
            || self.inline_comment.is_some()
            || self.with.is_some()
            || self.write_with.is_some()
            || self.read_with.is_some()
            || (self.skip.is_some() && self.extends.is_some())
    }
}

// -----------------------------------------------------------------------------
// Variant attributes

/// `#[config(rename = "...")]` on an enum variant.
#[derive(Default)]
pub(crate) struct VariantAttributes {
    pub rename: Option<LitStr>,
}

impl VariantAttributes {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in config_attributes(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    set_once(&mut this.rename, lit, &meta)
                } else {
                    Err(meta.error("unsupported variant attribute, expected `rename`"))
                }
            })?;
        }
        Ok(this)
    }
}
