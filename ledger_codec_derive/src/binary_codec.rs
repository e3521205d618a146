//! Derive macro that turns a record declaration into a Field Layout Engine schema.
//!
//! Generates `Encode` and `Decode` implementations for structs whose fields all
//! implement those traits themselves. The generated code is generic over the
//! scalar strategy, so one declaration yields both the fixed-width and the
//! varint wire format.
//!
//! # Supported Types
//!
//! - **Named structs**: `struct Output { address: Address, coins: u64 }`
//! - **Tuple structs**: `struct Hash(pub [u8; 32])`
//!
//! Enums, unions and unit structs have no place in the ledger schema and are rejected.
//!
//! # Wire Layout
//!
//! Fields are written in declaration order with no padding, no tags and no
//! field separators. The encoded record is the concatenation of its fields.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

/// Derives `Encode` and `Decode` for a record.
///
/// # Example
///
/// ```ignore
/// #[derive(Default, BinaryCodec)]
/// pub struct Address {
///     pub version: u8,
///     pub key: [u8; 20],
/// }
/// ```
///
/// # Generated Code
///
/// ```ignore
/// impl Encode for Address {
///     fn size<S: Strategy>(&self) -> usize {
///         0 + Encode::size::<S>(&self.version) + Encode::size::<S>(&self.key)
///     }
///     fn encode<S: Strategy, W: EncodeSink>(&self, out: &mut W) -> Result<usize, EncodeError> {
///         let mut written = 0usize;
///         written += Encode::encode::<S, W>(&self.version, out)?;
///         written += Encode::encode::<S, W>(&self.key, out)?;
///         Ok(written)
///     }
///     // fixed_size sums the field fixed sizes, None if any field is variable
/// }
///
/// impl Decode for Address {
///     fn decode_into<S: Strategy>(&mut self, input: &mut Reader<'_>) -> Result<(), DecodeError> {
///         Decode::decode_into::<S>(&mut self.version, input)?;
///         Decode::decode_into::<S>(&mut self.key, input)?;
///         Ok(())
///     }
///     // min_size sums the field minimum sizes
/// }
/// ```
pub fn derive_binary_codec(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let expanded = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => {
                let accessors = fields
                    .named
                    .iter()
                    .map(|f| {
                        let ident = &f.ident;
                        quote! { #ident }
                    })
                    .collect();
                let types = fields.named.iter().map(|f| &f.ty).collect();
                generate_record_impl(&input, accessors, types)
            }
            Fields::Unnamed(fields) => {
                let accessors = (0..fields.unnamed.len())
                    .map(|i| {
                        let idx = syn::Index::from(i);
                        quote! { #idx }
                    })
                    .collect();
                let types = fields.unnamed.iter().map(|f| &f.ty).collect();
                generate_record_impl(&input, accessors, types)
            }
            Fields::Unit => syn::Error::new_spanned(
                &input.ident,
                "BinaryCodec records must declare at least one field",
            )
            .to_compile_error(),
        },
        Data::Enum(_) => {
            syn::Error::new_spanned(&input.ident, "BinaryCodec derive does not support enums")
                .to_compile_error()
        }
        Data::Union(_) => {
            syn::Error::new_spanned(&input.ident, "BinaryCodec derive does not support unions")
                .to_compile_error()
        }
    };

    TokenStream::from(expanded)
}

/// Generates both trait impls from the ordered field accessors and their types.
///
/// `accessors` are either field names or tuple indices; either form works after `self.`.
fn generate_record_impl(
    input: &DeriveInput,
    accessors: Vec<proc_macro2::TokenStream>,
    types: Vec<&syn::Type>,
) -> proc_macro2::TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let encoding = quote! { crate::types::encoding };
    let strategy = quote! { crate::types::strategy::Strategy };
    let error = quote! { crate::types::error };

    let size_terms = accessors.iter().map(|field| {
        quote! { + #encoding::Encode::size::<S>(&self.#field) }
    });

    let encode_steps = accessors.iter().map(|field| {
        quote! { written += #encoding::Encode::encode::<S, W>(&self.#field, out)?; }
    });

    let fixed_terms = types.iter().map(|ty| {
        quote! { total += <#ty as #encoding::Encode>::fixed_size::<S>()?; }
    });

    let decode_steps = accessors.iter().map(|field| {
        quote! { #encoding::Decode::decode_into::<S>(&mut self.#field, input)?; }
    });

    let min_terms = types.iter().map(|ty| {
        quote! { + <#ty as #encoding::Decode>::min_size::<S>() }
    });

    quote! {
        impl #impl_generics #encoding::Encode for #name #ty_generics #where_clause {
            fn size<S: #strategy>(&self) -> usize {
                0 #(#size_terms)*
            }

            fn encode<S: #strategy, W: #encoding::EncodeSink>(
                &self,
                out: &mut W,
            ) -> ::std::result::Result<usize, #error::EncodeError> {
                let mut written = 0usize;
                #(#encode_steps)*
                Ok(written)
            }

            fn fixed_size<S: #strategy>() -> ::std::option::Option<usize> {
                let mut total = 0usize;
                #(#fixed_terms)*
                Some(total)
            }
        }

        impl #impl_generics #encoding::Decode for #name #ty_generics #where_clause {
            fn decode_into<S: #strategy>(
                &mut self,
                input: &mut crate::types::reader::Reader<'_>,
            ) -> ::std::result::Result<(), #error::DecodeError> {
                #(#decode_steps)*
                Ok(())
            }

            fn min_size<S: #strategy>() -> usize {
                0 #(#min_terms)*
            }
        }
    }
}
