//! Pagewire Derive Macros: Page Objects with Checked Locators
//!
//! Locator strings are easy to get wrong and only fail when a test reaches
//! them. `#[derive(PageObject)]` parses every `#[locator = "..."]` while the
//! crate compiles, so a typo in a strategy token is a build error:
//!
//! ```ignore
//! use pagewire::{Locator, PageObject};
//!
//! #[derive(PageObject)]
//! #[page(name = "login")]
//! struct LoginPage {
//!     #[locator = "id==username"]
//!     username: Locator,
//!     #[locator = "id==password"]
//!     password: Locator,
//!     #[locator = "xpath==//button[@type='submit']"]
//!     submit: Locator,
//! }
//!
//! let page = LoginPage::new();
//! assert_eq!(page.page_name(), "login");
//! ```
//!
//! Generated items:
//!
//! - `new()` and `Default`, filling each locator field from its attribute and
//!   every other field with `Default::default()`
//! - `impl pagewire::PageObject` listing the locator fields in declaration order

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Expr, ExprLit, Fields, Lit, LitStr, Meta,
};

/// Strategy tokens and the `pagewire::Strategy` variant each maps to
const STRATEGIES: [(&str, &str); 6] = [
    ("id", "Id"),
    ("name", "Name"),
    ("xpath", "XPath"),
    ("linkText", "LinkText"),
    ("class", "Class"),
    ("css", "Css"),
];

/// Derive `pagewire::PageObject` for a struct of locator fields.
///
/// # Attributes
///
/// - `#[page(name = "...")]` on the struct: page name (defaults to the type name)
/// - `#[locator = "strategy==value"]` on a field: the field's locator
#[proc_macro_derive(PageObject, attributes(page, locator))]
pub fn derive_page_object(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_page_object(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_page_object(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let page_name = extract_page_name(&input.attrs)?.unwrap_or_else(|| name.to_string());

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            name,
            "PageObject can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            name,
            "PageObject requires a struct with named fields",
        ));
    };

    let mut initializers = Vec::new();
    let mut entries = Vec::new();

    for field in &fields.named {
        let Some(ident) = &field.ident else {
            continue;
        };
        match extract_locator(&field.attrs)? {
            Some(lit) => {
                let (variant, value) =
                    parse_locator(&lit.value()).map_err(|msg| syn::Error::new_spanned(&lit, msg))?;
                let variant = format_ident!("{}", variant);
                let key = ident.to_string();
                initializers.push(quote! {
                    #ident: ::pagewire::Locator::new(::pagewire::Strategy::#variant, #value)
                });
                entries.push(quote! { (#key, &self.#ident) });
            }
            None => initializers.push(quote! { #ident: ::core::default::Default::default() }),
        }
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            /// Page with every locator taken from its `#[locator]` attribute
            #[must_use]
            pub fn new() -> Self {
                Self {
                    #(#initializers),*
                }
            }
        }

        impl #impl_generics ::core::default::Default for #name #ty_generics #where_clause {
            fn default() -> Self {
                Self::new()
            }
        }

        impl #impl_generics ::pagewire::PageObject for #name #ty_generics #where_clause {
            fn page_name(&self) -> &str {
                #page_name
            }

            fn locators(&self) -> ::std::vec::Vec<(&str, &::pagewire::Locator)> {
                ::std::vec![#(#entries),*]
            }
        }
    })
}

/// Read `#[page(name = "...")]`
fn extract_page_name(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    for attr in attrs {
        if !attr.path().is_ident("page") {
            continue;
        }
        let Meta::NameValue(nv) = attr.parse_args::<Meta>()? else {
            return Err(syn::Error::new_spanned(attr, "expected #[page(name = \"...\")]"));
        };
        if !nv.path.is_ident("name") {
            return Err(syn::Error::new_spanned(&nv.path, "unknown page attribute"));
        }
        if let Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) = &nv.value
        {
            return Ok(Some(s.value()));
        }
        return Err(syn::Error::new_spanned(&nv.value, "page name must be a string"));
    }
    Ok(None)
}

/// Read `#[locator = "..."]`
fn extract_locator(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    for attr in attrs {
        if !attr.path().is_ident("locator") {
            continue;
        }
        let Meta::NameValue(nv) = &attr.meta else {
            return Err(syn::Error::new_spanned(attr, "expected #[locator = \"strategy==value\"]"));
        };
        if let Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) = &nv.value
        {
            return Ok(Some(s.clone()));
        }
        return Err(syn::Error::new_spanned(&nv.value, "locator must be a string literal"));
    }
    Ok(None)
}

/// Split on the first `==`, trim, and map the token to a `Strategy` variant.
///
/// Mirrors `pagewire::Locator::parse` so the macro accepts exactly what the
/// runtime parser accepts.
fn parse_locator(raw: &str) -> Result<(&'static str, String), String> {
    let Some((tag, value)) = raw.split_once("==") else {
        return Err(format!("invalid locator {raw:?}: missing \"==\" separator"));
    };
    let tag = tag.trim();
    let value = value.trim();
    if tag.is_empty() {
        return Err(format!("invalid locator {raw:?}: empty strategy"));
    }
    if value.is_empty() {
        return Err(format!("invalid locator {raw:?}: empty value"));
    }
    STRATEGIES
        .iter()
        .find(|(token, _)| token.eq_ignore_ascii_case(tag))
        .map(|(_, variant)| (*variant, value.to_string()))
        .ok_or_else(|| {
            let known: Vec<&str> = STRATEGIES.iter().map(|(t, _)| *t).collect();
            format!(
                "invalid locator {raw:?}: unknown strategy {tag:?} (expected one of {})",
                known.join(", ")
            )
        })
}
