//! Emitter: renders one forwarding declaration per resolved group.
//!
//! The artifact wraps the winning definition instead of copying it:
//!
//! ```text
//! pub struct Name<G..> { inner: Winner<G..> }
//!
//! impl<G..> Name<G..> {
//!     pub fn new(params..) -> Self     // forwards to Winner::new
//!     pub fn <prop>(&self) -> &Ty      // per exported field
//!     pub fn <prop>_mut(&mut self) -> &mut Ty
//!     pub fn into_inner(self) -> Winner<G..>
//! }
//!
//! impl Deref / DerefMut for Name<G..> { Target = Winner<G..> }
//! ```
//!
//! Rendering is a pure function of the resolved chain, so unchanged inputs
//! produce byte-identical files.

use std::io;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use rayon::prelude::*;
use syn::parse::Parse;
use tracing::{debug, info, instrument};

use crate::error::{Error, Result};
use crate::model::{GeneratedArtifact, GenericKind, ResolvedDefinition};

/// First line of every generated file.
pub const GENERATED_HEADER: &str = "// @generated by variant-merge. Do not edit.";

/// Renders every resolved group in parallel; output follows input order.
#[instrument(skip_all, name = "emit", fields(groups = resolved.len()))]
pub fn emit_all(resolved: &[ResolvedDefinition]) -> Result<Vec<GeneratedArtifact>> {
    let results: Vec<Result<GeneratedArtifact>> = resolved.par_iter().map(emit).collect();
    let artifacts = results.into_iter().collect::<Result<Vec<_>>>()?;
    info!(artifacts = artifacts.len(), "rendered artifacts");
    Ok(artifacts)
}

/// File an artifact is written to, relative to the output directory.
pub fn file_name(name: &str) -> String {
    format!("{}.rs", name)
}

/// Renders the forwarding declaration for one group.
pub fn emit(resolved: &ResolvedDefinition) -> Result<GeneratedArtifact> {
    let file_name = file_name(&resolved.name);
    let parse = Renderer {
        group: &resolved.name,
        file_name: &file_name,
    };
    let winner = resolved.winner();

    let name: syn::Ident = parse.node(&resolved.name)?;
    let winner_path: syn::Path = parse.node(&winner.type_path)?;
    let constructor: syn::Ident = parse.node(&winner.constructor)?;

    let mut declared = Vec::with_capacity(winner.generics.len());
    let mut arguments = Vec::with_capacity(winner.generics.len());
    for generic in &winner.generics {
        declared.push(parse.node::<syn::GenericParam>(&generic.declaration())?);
        arguments.push(match generic.kind {
            GenericKind::Lifetime => {
                let lifetime: syn::Lifetime = parse.node(&generic.name)?;
                quote!(#lifetime)
            }
            GenericKind::Type | GenericKind::Const { .. } => {
                let ident: syn::Ident = parse.node(&generic.name)?;
                quote!(#ident)
            }
        });
    }
    let predicates = winner
        .where_predicates
        .iter()
        .map(|predicate| parse.node::<syn::WherePredicate>(predicate))
        .collect::<Result<Vec<_>>>()?;

    let (impl_generics, ty_generics) = if declared.is_empty() {
        (TokenStream::new(), TokenStream::new())
    } else {
        (quote!(<#(#declared),*>), quote!(<#(#arguments),*>))
    };
    let where_clause = if predicates.is_empty() {
        TokenStream::new()
    } else {
        quote!(where #(#predicates),*)
    };
    let inner_ty = quote!(#winner_path #ty_generics);

    let mut param_names = Vec::with_capacity(winner.constructor_shape.len());
    let mut param_types = Vec::with_capacity(winner.constructor_shape.len());
    for param in &winner.constructor_shape {
        param_names.push(parse.node::<syn::Ident>(&param.name)?);
        param_types.push(parse.node::<syn::Type>(param.ty())?);
    }

    let mut accessors = Vec::with_capacity(winner.overridden_properties.len());
    for property in winner.overridden_properties.values() {
        let field: syn::Ident = parse.node(&property.name)?;
        let field_mut = format_ident!("{}_mut", field);
        let ty: syn::Type = parse.node(&property.ty)?;
        accessors.push(quote! {
            pub fn #field(&self) -> &#ty {
                &self.inner.#field
            }

            pub fn #field_mut(&mut self) -> &mut #ty {
                &mut self.inner.#field
            }
        });
    }

    let docs = chain_docs(resolved);

    let declaration = quote! {
        #(#[doc = #docs])*
        #[allow(dead_code)]
        pub struct #name #impl_generics #where_clause {
            inner: #inner_ty,
        }
    };
    let inherent = quote! {
        #[allow(dead_code, clippy::new_without_default)]
        impl #impl_generics #name #ty_generics #where_clause {
            pub fn #constructor(#(#param_names: #param_types),*) -> Self {
                Self {
                    inner: <#inner_ty>::#constructor(#(#param_names),*),
                }
            }

            #(#accessors)*

            pub fn into_inner(self) -> #inner_ty {
                self.inner
            }
        }
    };
    let deref = quote! {
        impl #impl_generics ::core::ops::Deref for #name #ty_generics #where_clause {
            type Target = #inner_ty;

            fn deref(&self) -> &Self::Target {
                &self.inner
            }
        }

        impl #impl_generics ::core::ops::DerefMut for #name #ty_generics #where_clause {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.inner
            }
        }
    };

    let mut contents = String::new();
    contents.push_str(GENERATED_HEADER);
    contents.push('\n');
    for item in [declaration, inherent, deref] {
        contents.push('\n');
        contents.push_str(&item.to_string());
        contents.push('\n');
    }

    debug!(group = %resolved.name, file = %file_name, "rendered");
    Ok(GeneratedArtifact {
        name: resolved.name.clone(),
        file_name,
        contents,
    })
}

/// Index file pulling every artifact into the including module.
pub fn render_index(artifacts: &[GeneratedArtifact]) -> String {
    let mut index = String::new();
    index.push_str(GENERATED_HEADER);
    index.push('\n');
    for artifact in artifacts {
        index.push_str(&format!("include!({:?});\n", artifact.file_name));
    }
    index
}

fn chain_docs(resolved: &ResolvedDefinition) -> Vec<String> {
    let mut docs = vec![
        format!(" Forwarding type for the `{}` variant group.", resolved.name),
        String::new(),
        " Resolved chain, highest priority first:".to_string(),
        String::new(),
    ];
    for (position, member) in resolved.chain.iter().enumerate() {
        let selected = if position == 0 { ", selected" } else { "" };
        docs.push(format!(
            " - `{}` (priority {}{})",
            member.type_path, member.priority, selected
        ));
    }
    docs
}

/// Parses recorded source fragments back into syntax nodes.
struct Renderer<'a> {
    group: &'a str,
    file_name: &'a str,
}

impl Renderer<'_> {
    fn node<T: Parse>(&self, source: &str) -> Result<T> {
        syn::parse_str(source).map_err(|e| {
            Error::emission(
                Some(self.group),
                self.file_name,
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("cannot render `{}`: {}", source, e),
                ),
            )
        })
    }
}
