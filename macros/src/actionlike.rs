use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

use crate::utils;

/// This approach and implementation is inspired by the `strum` crate,
/// Copyright (c) 2019 Peter Glotfelty
/// available under the MIT License at <https://github.com/Peternator7/strum>
pub(crate) fn actionlike_inner(ast: &DeriveInput) -> TokenStream {
    // Splitting the abstract syntax tree
    let enum_name = &ast.ident;
    let (impl_generics, type_generics, where_clause) = &ast.generics.split_for_impl();

    let crate_path = utils::crate_path();

    let variants = match &ast.data {
        Data::Enum(v) => &v.variants,
        _ => panic!("`Actionlike` cannot be derived for non-enum types. Manually implement the trait instead."),
    };

    let identifiers: Vec<_> = variants
        .iter()
        .map(|variant| {
            if !matches!(variant.fields, Fields::Unit) {
                panic!(
                    "`Actionlike` can only be derived for enums with unit variants, but `{}` carries data.",
                    variant.ident
                );
            }
            variant.ident.clone()
        })
        .collect();

    let n_variants = identifiers.len();
    let indices: Vec<usize> = (0..n_variants).collect();

    quote! {
        impl #impl_generics #crate_path::Actionlike for #enum_name #type_generics #where_clause {
            const N_VARIANTS: usize = #n_variants;

            fn get_at(index: usize) -> ::core::option::Option<Self> {
                match index {
                    #(#indices => ::core::option::Option::Some(#enum_name::#identifiers),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn index(&self) -> usize {
                match *self {
                    #(#enum_name::#identifiers => #indices,)*
                }
            }
        }
    }
}
