//! Derive macros for titanasm's name-keyed enums (mnemonics, registers, directives).

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::{ToTokens, quote};

/// Collects the identifiers of all variants together with their upper-case source names. Panics on non-unit variants,
/// since only unit variants can be named by a single token.
fn unit_variants(enum_: &syn::DataEnum, derive_name: &str) -> Vec<(syn::Ident, String)> {
	enum_
		.variants
		.iter()
		.map(|variant| match variant.fields {
			syn::Fields::Unit => (variant.ident.clone(), format!("{}", variant.ident).to_uppercase()),
			_ => panic!(
				"{} cannot be derived for enums containing non-unit variants; variant {} is not a unit.",
				derive_name,
				variant.to_token_stream()
			),
		})
		.collect()
}

/// Derives `crate::parser::Parse`, which maps the exact upper-case variant name to the variant.
#[proc_macro_derive(Parse)]
pub fn parse_macro_derive(input: TokenStream) -> TokenStream {
	let type_ = syn::parse::<syn::DeriveInput>(input).unwrap();

	match type_.data {
		syn::Data::Enum(enum_) => {
			let name = type_.ident;
			let variant_identifiers_and_strings = unit_variants(&enum_, "Parse");
			let variant_identifiers = variant_identifiers_and_strings.iter().map(|(identifier, _)| identifier);
			let variant_strings = variant_identifiers_and_strings.iter().map(|(_, string)| string);

			quote! {
				#[automatically_derived]
				impl crate::parser::Parse for #name {
					fn parse(value: &str) -> Option<Self> {
						Some(match value {
							#( #variant_strings => Self::#variant_identifiers, )*
							_ => return None,
						})
					}
				}
			}
			.into()
		},
		_ => panic!("Parse cannot be derived for non-enum types."),
	}
}

/// Derives `crate::VariantName`, which returns the upper-case variant name as it appears in assembly source.
#[proc_macro_derive(VariantName)]
pub fn variant_name_derive(input: TokenStream) -> TokenStream {
	let type_ = syn::parse::<syn::DeriveInput>(input).unwrap();

	match type_.data {
		syn::Data::Enum(enum_) => {
			let name = type_.ident;
			let variant_identifiers_and_strings = unit_variants(&enum_, "VariantName");
			let variant_identifiers = variant_identifiers_and_strings.iter().map(|(identifier, _)| identifier);
			let variant_strings = variant_identifiers_and_strings.iter().map(|(_, string)| string);

			quote! {
				#[automatically_derived]
				impl crate::VariantName for #name {
					fn variant_name(&self) -> &'static str {
						match self {
							#( Self::#variant_identifiers => #variant_strings, )*
						}
					}
				}
			}
			.into()
		},
		_ => panic!("VariantName cannot be derived for non-enum types."),
	}
}
