use proc_macro2::{Ident, Span, TokenStream};
use proc_macro_crate::{crate_name, FoundCrate};
use quote::quote;

pub(crate) fn crate_path() -> TokenStream {
    if let Ok(found_crate) = crate_name("first-person-input") {
        // The crate was found in the Cargo.toml
        match found_crate {
            FoundCrate::Itself => quote!(first_person_input),
            FoundCrate::Name(name) => {
                let ident = Ident::new(&name, Span::call_site());
                quote!(#ident)
            }
        }
    } else {
        // The crate was not found in the Cargo.toml,
        // so we assume that we are in the owning crate itself
        //
        // In order for this to play nicely with unit tests within the crate itself,
        // `use crate as first_person_input` at the top of each module that derives the trait
        quote!(first_person_input)
    }
}
