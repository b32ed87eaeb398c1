//! Structural type shapes.
//!
//! Two definitions may spell their generic parameters differently (`T` in
//! one variant, `U` in another, or a renamed parameter on the impl block).
//! Shapes are therefore compared in a canonical form where every generic
//! parameter is replaced by its declared position.

use std::collections::HashMap;

use proc_macro2::Span;
use quote::{ToTokens, format_ident};
use syn::visit::{self, Visit};
use syn::visit_mut::{self, VisitMut};
use syn::{GenericArgument, Generics, Ident, Lifetime, PathArguments, Type};

/// Generic parameter names in scope, mapped to their declared position.
#[derive(Debug, Default, Clone)]
pub(crate) struct GenericNames {
    /// Type and const parameters.
    values: HashMap<String, usize>,
    /// Lifetimes, keyed without the leading apostrophe.
    lifetimes: HashMap<String, usize>,
}

impl GenericNames {
    /// Names declared by a struct's generic parameter list.
    pub(crate) fn declared(generics: &Generics) -> Self {
        let mut names = Self::default();
        for (position, param) in generics.params.iter().enumerate() {
            match param {
                syn::GenericParam::Type(tp) => {
                    names.values.insert(tp.ident.to_string(), position);
                }
                syn::GenericParam::Const(cp) => {
                    names.values.insert(cp.ident.to_string(), position);
                }
                syn::GenericParam::Lifetime(lp) => {
                    names.lifetimes.insert(lp.lifetime.ident.to_string(), position);
                }
            }
        }
        names
    }

    /// Names an impl block uses for the struct's parameters.
    ///
    /// `impl<U: Number> Widget<U>` maps `U` to position 0. Returns `None`
    /// when the self type's arguments are not exactly the impl's own
    /// parameters in order, i.e. the impl only covers some instantiations.
    pub(crate) fn from_impl(impl_generics: &Generics, self_ty: &Type, arity: usize) -> Option<Self> {
        let declared = Self::declared(impl_generics);
        let Type::Path(type_path) = self_ty else {
            return None;
        };
        let segment = type_path.path.segments.last()?;

        let args: Vec<&GenericArgument> = match &segment.arguments {
            PathArguments::None => Vec::new(),
            PathArguments::AngleBracketed(angle) => angle.args.iter().collect(),
            PathArguments::Parenthesized(_) => return None,
        };
        if args.len() != arity {
            return None;
        }

        let mut names = Self::default();
        for (position, arg) in args.into_iter().enumerate() {
            match arg {
                GenericArgument::Lifetime(lifetime) => {
                    let key = lifetime.ident.to_string();
                    declared.lifetimes.get(&key)?;
                    names.lifetimes.insert(key, position);
                }
                GenericArgument::Type(Type::Path(tp)) if tp.qself.is_none() => {
                    let ident = tp.path.get_ident()?;
                    let key = ident.to_string();
                    declared.values.get(&key)?;
                    names.values.insert(key, position);
                }
                GenericArgument::Const(syn::Expr::Path(ep)) => {
                    let key = ep.path.get_ident()?.to_string();
                    declared.values.get(&key)?;
                    names.values.insert(key, position);
                }
                _ => return None,
            }
        }
        Some(names)
    }

    pub(crate) fn value_position(&self, ident: &Ident) -> Option<usize> {
        self.values.get(&ident.to_string()).copied()
    }

    pub(crate) fn lifetime_position(&self, lifetime: &Lifetime) -> Option<usize> {
        self.lifetimes.get(&lifetime.ident.to_string()).copied()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.values.is_empty() && self.lifetimes.is_empty()
    }

    /// Position of `ty` when it is exactly one generic parameter.
    pub(crate) fn position_of(&self, ty: &Type) -> Option<usize> {
        match ty {
            Type::Path(tp) if tp.qself.is_none() => self.value_position(tp.path.get_ident()?),
            Type::Paren(paren) => self.position_of(&paren.elem),
            Type::Group(group) => self.position_of(&group.elem),
            _ => None,
        }
    }
}

/// Rewrites generic parameter names according to a position → name table.
struct Renamer<'a> {
    names: &'a GenericNames,
    rename_value: &'a dyn Fn(usize) -> Ident,
    rename_lifetime: &'a dyn Fn(usize) -> Ident,
}

impl VisitMut for Renamer<'_> {
    fn visit_lifetime_mut(&mut self, lifetime: &mut Lifetime) {
        if let Some(&position) = self.names.lifetimes.get(&lifetime.ident.to_string()) {
            lifetime.ident = (self.rename_lifetime)(position);
        }
    }

    fn visit_path_mut(&mut self, path: &mut syn::Path) {
        if path.leading_colon.is_none()
            && let Some(first) = path.segments.first_mut()
            && let Some(&position) = self.names.values.get(&first.ident.to_string())
        {
            first.ident = (self.rename_value)(position);
        }
        visit_mut::visit_path_mut(self, path);
    }
}

fn rename<T: Clone + ToTokens>(
    node: &T,
    names: &GenericNames,
    visit: fn(&mut Renamer<'_>, &mut T),
    rename_value: &dyn Fn(usize) -> Ident,
    rename_lifetime: &dyn Fn(usize) -> Ident,
) -> String {
    let mut node = node.clone();
    if !names.is_empty() {
        let mut renamer = Renamer {
            names,
            rename_value,
            rename_lifetime,
        };
        visit(&mut renamer, &mut node);
    }
    node.to_token_stream().to_string()
}

fn positional_value(position: usize) -> Ident {
    format_ident!("__G{}", position)
}

fn positional_lifetime(position: usize) -> Ident {
    format_ident!("__g{}", position)
}

/// Canonical form of a type for structural comparison.
pub(crate) fn canonical_type(ty: &Type, names: &GenericNames) -> String {
    rename(
        ty,
        names,
        |r, t| r.visit_type_mut(t),
        &positional_value,
        &positional_lifetime,
    )
}

/// Canonical form of a type-parameter bound.
pub(crate) fn canonical_bound(bound: &syn::TypeParamBound, names: &GenericNames) -> String {
    rename(
        bound,
        names,
        |r, b| r.visit_type_param_bound_mut(b),
        &positional_value,
        &positional_lifetime,
    )
}

/// Canonical form of a lifetime bound.
pub(crate) fn canonical_lifetime(lifetime: &Lifetime, names: &GenericNames) -> String {
    rename(
        lifetime,
        names,
        |r, l| r.visit_lifetime_mut(l),
        &positional_value,
        &positional_lifetime,
    )
}

/// Rewrites `ty`, written with an impl block's parameter names, into the
/// struct's own parameter names.
pub(crate) fn restate_type(ty: &Type, from: &GenericNames, to: &Generics) -> String {
    restate(ty, from, to, |r, t| r.visit_type_mut(t))
}

/// [`restate_type`] for a type-parameter bound.
pub(crate) fn restate_bound(
    bound: &syn::TypeParamBound,
    from: &GenericNames,
    to: &Generics,
) -> String {
    restate(bound, from, to, |r, b| r.visit_type_param_bound_mut(b))
}

/// [`restate_type`] for a lifetime bound.
pub(crate) fn restate_lifetime(lifetime: &Lifetime, from: &GenericNames, to: &Generics) -> String {
    restate(lifetime, from, to, |r, l| r.visit_lifetime_mut(l))
}

/// [`restate_type`] for a whole where-predicate.
pub(crate) fn restate_predicate(
    predicate: &syn::WherePredicate,
    from: &GenericNames,
    to: &Generics,
) -> String {
    restate(predicate, from, to, |r, p| r.visit_where_predicate_mut(p))
}

fn restate<T: Clone + ToTokens>(
    node: &T,
    from: &GenericNames,
    to: &Generics,
    visit: fn(&mut Renamer<'_>, &mut T),
) -> String {
    let params: Vec<&syn::GenericParam> = to.params.iter().collect();
    let value = |position: usize| match params.get(position) {
        Some(syn::GenericParam::Type(tp)) => tp.ident.clone(),
        Some(syn::GenericParam::Const(cp)) => cp.ident.clone(),
        _ => Ident::new("_", Span::call_site()),
    };
    let lifetime = |position: usize| match params.get(position) {
        Some(syn::GenericParam::Lifetime(lp)) => lp.lifetime.ident.clone(),
        _ => Ident::new("_", Span::call_site()),
    };
    rename(node, from, visit, &value, &lifetime)
}

/// Whether `ty` refers to `Self` anywhere.
pub(crate) fn mentions_self(ty: &Type) -> bool {
    struct Finder(bool);

    impl<'ast> Visit<'ast> for Finder {
        fn visit_path(&mut self, path: &'ast syn::Path) {
            if path.segments.first().is_some_and(|s| s.ident == "Self") {
                self.0 = true;
            }
            visit::visit_path(self, path);
        }
    }

    let mut finder = Finder(false);
    finder.visit_type(ty);
    finder.0
}
