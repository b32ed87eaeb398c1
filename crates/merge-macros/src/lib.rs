//! The `#[variant_merge]` attribute.
//!
//! The attribute itself generates nothing: resolution happens in the build
//! script, which scans the sources for it. Expanding it still matters, so
//! that malformed arguments and unsupported declarations are reported at the
//! declaration, with the same messages the generator would produce.
//!
//! # Usage
//!
//! ```ignore
//! use variant_merge_macros::variant_merge;
//!
//! #[variant_merge(name = "Greeting", priority = 2)]
//! pub struct FlavorGreeting {
//!     pub text: String,
//! }
//!
//! impl FlavorGreeting {
//!     pub fn new() -> Self {
//!         Self { text: "hello from flavor".to_string() }
//!     }
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Fields, Item, Visibility, parse_macro_input};
use variant_merge::{DEFAULT_ATTRIBUTE, MergeArgs, ScanDefect};

/// Marks a struct as one variant of a logical name.
///
/// Arguments: `name = "<Ident>"` (required) and `priority = <int>`
/// (default 0, may be negative). The struct is passed through unchanged.
#[proc_macro_attribute]
pub fn variant_merge(attr: TokenStream, item: TokenStream) -> TokenStream {
    // Arguments are only validated here; the build script reads them again.
    parse_macro_input!(attr as MergeArgs);
    let item = parse_macro_input!(item as Item);

    match check(&item) {
        Ok(()) => quote!(#item).into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn check(item: &Item) -> syn::Result<()> {
    let Item::Struct(item_struct) = item else {
        let (span, description) = describe(item);
        return Err(syn::Error::new(
            span,
            ScanDefect::NotAStruct {
                attribute: DEFAULT_ATTRIBUTE.to_string(),
                item: description.to_string(),
            }
            .to_string(),
        ));
    };

    let ty = item_struct.ident.to_string();
    let exported = match &item_struct.vis {
        Visibility::Public(_) => true,
        Visibility::Restricted(restricted) => {
            restricted.in_token.is_none() && restricted.path.is_ident("crate")
        }
        Visibility::Inherited => false,
    };
    if !exported {
        return Err(syn::Error::new(
            item_struct.ident.span(),
            ScanDefect::PrivateType { ty }.to_string(),
        ));
    }
    if matches!(item_struct.fields, Fields::Unnamed(_)) {
        return Err(syn::Error::new(
            item_struct.ident.span(),
            ScanDefect::TupleStruct { ty }.to_string(),
        ));
    }
    Ok(())
}

fn describe(item: &Item) -> (Span, &'static str) {
    match item {
        Item::Enum(i) => (i.ident.span(), "an enum"),
        Item::Union(i) => (i.ident.span(), "a union"),
        Item::Fn(i) => (i.sig.ident.span(), "a function"),
        Item::Trait(i) => (i.ident.span(), "a trait"),
        Item::Type(i) => (i.ident.span(), "a type alias"),
        Item::Const(i) => (i.ident.span(), "a const"),
        Item::Static(i) => (i.ident.span(), "a static"),
        Item::Mod(i) => (i.ident.span(), "a module"),
        Item::Impl(_) => (Span::call_site(), "an impl block"),
        _ => (Span::call_site(), "an unsupported item"),
    }
}
