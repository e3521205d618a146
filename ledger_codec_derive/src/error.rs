//! Derive macro for codec error enums.
//!
//! Generates `std::fmt::Display` and `std::error::Error` implementations from
//! per-variant `#[error("...")]` messages.
//!
//! # Usage
//!
//! ```ignore
//! #[derive(Debug, Error)]
//! pub enum DecodeError {
//!     #[error("truncated input: needed {needed} bytes, {remaining} remaining")]
//!     TruncatedInput { needed: usize, remaining: usize },
//!
//!     #[error("malformed input: {0}")]
//!     MalformedInput(Malformed),
//!
//!     #[error("varint exceeds 64 bits")]
//!     VarintOverflow,
//! }
//! ```
//!
//! Tuple variants interpolate positional fields (`{0}`, `{1}`), struct variants
//! interpolate by field name.

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, Lit, Meta, parse_macro_input};

/// Derives `Display` and `Error` for an enum.
pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Error derive only supports enums",
        ));
    };

    let arms = data_enum
        .variants
        .iter()
        .map(|variant| {
            let variant_name = &variant.ident;
            let message = message_for(variant)?;

            Ok(match &variant.fields {
                Fields::Unit => quote! {
                    Self::#variant_name => write!(f, #message),
                },
                Fields::Unnamed(fields) => {
                    let bindings: Vec<_> = (0..fields.unnamed.len())
                        .map(|i| format_ident!("f{}", i))
                        .collect();
                    let message = positional_to_named(&message, bindings.len());
                    quote! {
                        Self::#variant_name(#(#bindings),*) => {
                            write!(f, #message, #(#bindings = #bindings),*)
                        }
                    }
                }
                Fields::Named(fields) => {
                    let bindings: Vec<_> = fields.named.iter().map(|f| &f.ident).collect();
                    quote! {
                        Self::#variant_name { #(#bindings),* } => {
                            write!(f, #message, #(#bindings = #bindings),*)
                        }
                    }
                }
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    #(#arms)*
                }
            }
        }

        impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {}
    })
}

/// Reads the string literal out of a variant's `#[error("...")]` attribute.
fn message_for(variant: &syn::Variant) -> syn::Result<String> {
    let attr = variant
        .attrs
        .iter()
        .find(|attr| attr.path().is_ident("error"))
        .ok_or_else(|| {
            syn::Error::new_spanned(
                &variant.ident,
                format!(
                    "missing #[error(\"...\")] attribute on variant `{}`",
                    variant.ident
                ),
            )
        })?;

    let Meta::List(list) = &attr.meta else {
        return Err(syn::Error::new_spanned(
            &attr.meta,
            "expected #[error(\"message\")]",
        ));
    };

    match syn::parse2::<Lit>(list.tokens.clone()) {
        Ok(Lit::Str(message)) => Ok(message.value()),
        _ => Err(syn::Error::new_spanned(
            &attr.meta,
            "#[error] message must be a string literal",
        )),
    }
}

/// Rewrites `{0}`, `{1}`, ... into `{f0}`, `{f1}`, ... so tuple fields bind by name.
///
/// Format specs survive the rewrite: `{0:?}` becomes `{f0:?}`.
fn positional_to_named(message: &str, field_count: usize) -> String {
    let mut result = message.to_string();
    for i in (0..field_count).rev() {
        result = result
            .replace(&format!("{{{i}}}"), &format!("{{f{i}}}"))
            .replace(&format!("{{{i}:"), &format!("{{f{i}:"));
    }
    result
}
