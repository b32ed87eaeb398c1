//! Parsing for the merge attribute's arguments.
//!
//! Shared by the scanner and by the `#[variant_merge]` attribute macro, so
//! both reject the same inputs with the same messages.

use syn::{
    Ident, LitInt, LitStr, Token,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
};

/// Default attribute name recognized by the scanner.
pub const DEFAULT_ATTRIBUTE: &str = "variant_merge";

/// Arguments to the merge attribute
#[derive(Debug, Clone)]
pub struct MergeArgs {
    /// Logical name of the group this definition belongs to.
    pub name: String,
    /// Defaults to 0 when omitted.
    pub priority: i64,
}

/// Individual argument parsed from the attribute
enum MergeArg {
    Name(LitStr),
    Priority(i64),
}

impl Parse for MergeArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut name: Option<LitStr> = None;
        let mut priority = None;

        let args = Punctuated::<MergeArg, Token![,]>::parse_terminated(input)?;
        for arg in args {
            match arg {
                MergeArg::Name(lit) => {
                    if name.is_some() {
                        return Err(syn::Error::new(lit.span(), "duplicate `name` argument"));
                    }
                    name = Some(lit);
                }
                MergeArg::Priority(p) => {
                    if priority.is_some() {
                        return Err(input.error("duplicate `priority` argument"));
                    }
                    priority = Some(p);
                }
            }
        }

        let name = name.ok_or_else(|| input.error("missing `name = \"...\"` argument"))?;
        let value = name.value();
        if syn::parse_str::<Ident>(&value).is_err() {
            return Err(syn::Error::new(
                name.span(),
                format!("`{}` is not a valid type name", value),
            ));
        }

        Ok(MergeArgs {
            name: value,
            priority: priority.unwrap_or(0),
        })
    }
}

impl Parse for MergeArg {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let ident: Ident = input.parse()?;
        match ident.to_string().as_str() {
            "name" => {
                input.parse::<Token![=]>()?;
                let lit: LitStr = input.parse()?;
                Ok(MergeArg::Name(lit))
            }
            "priority" => {
                input.parse::<Token![=]>()?;
                let negative = input.parse::<Option<Token![-]>>()?.is_some();
                let lit: LitInt = input.parse()?;
                let value = lit.base10_parse::<i64>()?;
                Ok(MergeArg::Priority(if negative { -value } else { value }))
            }
            other => Err(syn::Error::new(
                ident.span(),
                format!("unknown argument: {}", other),
            )),
        }
    }
}
