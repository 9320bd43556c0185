//! Derive macro for telepath adapters.
//!
//! `#[derive(Adapter)]` implements `telepath_value::FromArgs` and
//! `telepath_value::Object` for a struct whose fields map one-to-one onto the
//! positional arguments of a tagged wire node.
//!
//! # Example
//!
//! ```ignore
//! use telepath_value::Adapter;
//!
//! #[derive(Debug, Adapter)]
//! #[telepath(tag = "ObjectId")]
//! struct ObjectId(String);
//!
//! impl std::fmt::Display for ObjectId {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         f.write_str(&self.0)
//!     }
//! }
//! ```
//!
//! The wire node `{"_type": "ObjectId", "_args": ["abc123"]}` then builds
//! `ObjectId("abc123".into())`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr};

/// Derive `FromArgs` and `Object` for a struct.
///
/// # Attributes
///
/// - `#[telepath(tag = "Name")]` on the struct: the registered tag. Defaults
///   to the struct's own name.
///
/// Fields are filled in declaration order from the node's arguments, each
/// through `FromValue`. The argument count must match the field count
/// exactly. The struct must implement `Debug` and `Display` itself.
///
/// Generated code names `::telepath_value` directly, so a crate using the
/// derive (including through the `telepath` re-export) needs
/// `telepath-value` as a direct dependency.
#[proc_macro_derive(Adapter, attributes(telepath))]
pub fn derive_adapter(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let data = match &input.data {
        Data::Struct(data) => data,
        Data::Enum(_) | Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Adapter can only be derived for structs",
            ));
        }
    };

    let tag = get_tag(input)?.unwrap_or_else(|| name.to_string());
    let arity = data.fields.len();

    let construct = match &data.fields {
        Fields::Named(fields) => {
            let inits = fields.named.iter().enumerate().map(|(i, f)| {
                let field_name = &f.ident;
                let field_type = &f.ty;
                quote! {
                    #field_name: ::telepath_value::next_arg::<#field_type>(&mut args, #i)?
                }
            });
            quote! { Self { #(#inits),* } }
        }
        Fields::Unnamed(fields) => {
            let inits = fields.unnamed.iter().enumerate().map(|(i, f)| {
                let field_type = &f.ty;
                quote! {
                    ::telepath_value::next_arg::<#field_type>(&mut args, #i)?
                }
            });
            quote! { Self(#(#inits),*) }
        }
        Fields::Unit => quote! { Self },
    };

    // Unit structs never read from the iterator.
    let bind_args = if arity == 0 {
        quote! { let _ = args; }
    } else {
        quote! { let mut args = args.into_iter(); }
    };

    Ok(quote! {
        impl #impl_generics ::telepath_value::FromArgs for #name #ty_generics #where_clause {
            const TAG: &'static str = #tag;

            fn from_args(
                args: ::std::vec::Vec<::telepath_value::Value>,
            ) -> ::std::result::Result<Self, ::telepath_value::ConversionError> {
                ::telepath_value::check_arity(&args, #arity)?;
                #bind_args
                ::std::result::Result::Ok(#construct)
            }
        }

        impl #impl_generics ::telepath_value::Object for #name #ty_generics #where_clause {
            fn tag(&self) -> &str {
                <Self as ::telepath_value::FromArgs>::TAG
            }
        }
    })
}

/// Extract `#[telepath(tag = "...")]`
fn get_tag(input: &DeriveInput) -> syn::Result<Option<String>> {
    let mut tag = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("telepath") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("tag") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(meta.error("tag must not be empty"));
                }
                tag = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported telepath attribute, expected `tag`"))
            }
        })?;
    }
    Ok(tag)
}
