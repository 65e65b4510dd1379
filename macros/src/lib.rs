//! Derives the `Actionlike` trait for the `first-person-input` crate.

extern crate proc_macro;
mod actionlike;
mod utils;

use proc_macro::TokenStream;
use syn::DeriveInput;

/// Derives the `Actionlike` trait for a unit-only enum
///
/// Variants are indexed in declaration order.
#[proc_macro_derive(Actionlike)]
pub fn actionlike(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    crate::actionlike::actionlike_inner(&ast).into()
}
