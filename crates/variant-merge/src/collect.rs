//! Collector: scans compilation units for structs carrying the merge
//! attribute and extracts one [`AnnotatedDefinition`] per struct.
//!
//! The collector knows nothing about groups or priority semantics. Each
//! unit is scanned independently on the rayon pool; results are combined
//! once, in unit order, after every scan finished.
//!
//! # What counts as a forwardable definition
//!
//! - a `pub` or `pub(crate)` struct with named fields (or no fields)
//! - exactly one non-private `new` (configurable) in an inherent impl of the
//!   same module, taking no receiver and returning `Self`
//! - constructor parameters bound to plain identifiers
//!
//! Anything else carrying the attribute is a [`ScanDefect`].

use std::collections::HashMap;

use indexmap::IndexMap;
use proc_macro2::Span;
use quote::ToTokens;
use rayon::prelude::*;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::visit::{self, Visit};
use syn::{
    Attribute, Fields, FnArg, Generics, ImplItem, ImplItemFn, Item, ItemImpl, ItemStruct, Pat,
    ReturnType, Type, Visibility, WherePredicate,
};
use tracing::{debug, info, instrument};

use crate::attribute::MergeArgs;
use crate::config::ScanOptions;
use crate::error::{Error, Result, ScanDefect};
use crate::model::{
    AnnotatedDefinition, ConstructorParam, GenericKind, GenericParam, ParamShape, Property,
    SourceLocation,
};
use crate::shape::{
    GenericNames, canonical_bound, canonical_lifetime, canonical_type, mentions_self,
    restate_bound, restate_lifetime, restate_predicate, restate_type,
};
use crate::source::CompilationUnit;

/// Scans every unit in parallel and concatenates the results in unit order.
///
/// When several units fail, the error of the first failing unit (in the
/// given order) is reported, independent of worker scheduling.
#[instrument(skip_all, name = "collect", fields(units = units.len()))]
pub fn collect(
    units: &[CompilationUnit],
    options: &ScanOptions,
) -> Result<Vec<AnnotatedDefinition>> {
    let slices: Vec<Result<Vec<AnnotatedDefinition>>> = units
        .par_iter()
        .map(|unit| scan_unit(unit, options))
        .collect();

    let mut definitions = Vec::new();
    for slice in slices {
        definitions.extend(slice?);
    }

    info!(
        units = units.len(),
        definitions = definitions.len(),
        "collected annotated definitions"
    );
    Ok(definitions)
}

/// Scans a single compilation unit.
pub fn scan_unit(unit: &CompilationUnit, options: &ScanOptions) -> Result<Vec<AnnotatedDefinition>> {
    let file = syn::parse_file(&unit.source).map_err(|e| {
        Error::scan(location(unit, e.span()), ScanDefect::Syntax(e.to_string()))
    })?;

    let scanner = UnitScanner { unit, options };
    let mut found = Vec::new();
    scanner.scan_items(&file.items, &unit.module_path, &mut found)?;
    Ok(found)
}

struct UnitScanner<'a> {
    unit: &'a CompilationUnit,
    options: &'a ScanOptions,
}

impl UnitScanner<'_> {
    fn scan_items(
        &self,
        items: &[Item],
        module: &[String],
        found: &mut Vec<AnnotatedDefinition>,
    ) -> Result<()> {
        let mut impls: HashMap<String, Vec<&ItemImpl>> = HashMap::new();
        for item in items {
            if let Item::Impl(item_impl) = item
                && item_impl.trait_.is_none()
                && let Some(ident) = self_type_ident(&item_impl.self_ty)
            {
                impls.entry(ident).or_default().push(item_impl);
            }
        }

        for item in items {
            match item {
                Item::Struct(item_struct) => {
                    let ty = item_struct.ident.unraw().to_string();
                    if let Some(attr) = self.merge_attribute(&item_struct.attrs, &ty)? {
                        let candidates = impls.get(&ty).map(Vec::as_slice).unwrap_or_default();
                        let definition = self.definition(item_struct, attr, module, candidates)?;
                        debug!(
                            name = %definition.name,
                            priority = definition.priority,
                            ty = %definition.type_path,
                            "annotated definition"
                        );
                        found.push(definition);
                    }
                }
                Item::Mod(item_mod) => {
                    self.reject_attribute(&item_mod.attrs, "a module")?;
                    if let Some((_, content)) = &item_mod.content {
                        let mut nested = module.to_vec();
                        nested.push(item_mod.ident.unraw().to_string());
                        self.scan_items(content, &nested, found)?;
                    }
                }
                other => {
                    if let Some((attrs, description)) = describe_item(other) {
                        self.reject_attribute(attrs, description)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// The merge attribute on a struct, if present exactly once.
    fn merge_attribute<'i>(&self, attrs: &'i [Attribute], ty: &str) -> Result<Option<&'i Attribute>> {
        let mut matching = attrs.iter().filter(|attr| self.is_merge_attribute(attr));
        let first = matching.next();
        if let Some(second) = matching.next() {
            return Err(Error::scan(
                location(self.unit, second.span()),
                ScanDefect::RepeatedAttribute {
                    attribute: self.options.attribute.clone(),
                    ty: ty.to_string(),
                },
            ));
        }
        Ok(first)
    }

    fn reject_attribute(&self, attrs: &[Attribute], description: &str) -> Result<()> {
        match attrs.iter().find(|attr| self.is_merge_attribute(attr)) {
            Some(attr) => Err(Error::scan(
                location(self.unit, attr.span()),
                ScanDefect::NotAStruct {
                    attribute: self.options.attribute.clone(),
                    item: description.to_string(),
                },
            )),
            None => Ok(()),
        }
    }

    fn is_merge_attribute(&self, attr: &Attribute) -> bool {
        attr.path()
            .segments
            .last()
            .is_some_and(|segment| segment.ident == self.options.attribute)
    }

    fn definition(
        &self,
        item: &ItemStruct,
        attr: &Attribute,
        module: &[String],
        impls: &[&ItemImpl],
    ) -> Result<AnnotatedDefinition> {
        let ty = item.ident.unraw().to_string();
        let here = location(self.unit, item.ident.span());
        let defect = |defect: ScanDefect| Error::scan(here.clone(), defect);

        let args: MergeArgs = attr.parse_args().map_err(|e| {
            Error::scan(
                location(self.unit, e.span()),
                ScanDefect::InvalidAttribute {
                    attribute: self.options.attribute.clone(),
                    message: e.to_string(),
                },
            )
        })?;

        if !is_exported(&item.vis) {
            return Err(defect(ScanDefect::PrivateType { ty }));
        }
        if matches!(item.fields, Fields::Unnamed(_)) {
            return Err(defect(ScanDefect::TupleStruct { ty }));
        }

        let (item_impl, function) = self.constructor(&ty, impls).map_err(defect)?;
        let (constructor_shape, impl_names) =
            self.constructor_shape(&ty, item, item_impl, function).map_err(defect)?;

        let declared = GenericNames::declared(&item.generics);
        let (mut generics, mut where_predicates) = generic_params(&item.generics, &declared);
        impl_bounds(
            &mut generics,
            &mut where_predicates,
            &item_impl.generics,
            &impl_names,
            &item.generics,
        );

        let values = constructor_values(function, &item.ident);
        let overridden_properties = self.properties(&ty, item, &values).map_err(defect)?;

        // The index is included at the crate root, next to this struct.
        if module.len() == 1 && module[0] == "crate" && ty == args.name {
            return Err(defect(ScanDefect::NameCollision { name: args.name }));
        }

        let mut type_path = module.join("::");
        if !type_path.is_empty() {
            type_path.push_str("::");
        }
        type_path.push_str(&item.ident.to_string());

        Ok(AnnotatedDefinition {
            name: args.name,
            priority: args.priority,
            type_path,
            constructor: function.sig.ident.to_string(),
            constructor_shape,
            generics,
            where_predicates,
            overridden_properties,
            source_location: here,
        })
    }

    /// The single non-private constructor among the struct's inherent impls.
    fn constructor<'i>(
        &self,
        ty: &str,
        impls: &[&'i ItemImpl],
    ) -> std::result::Result<(&'i ItemImpl, &'i ImplItemFn), ScanDefect> {
        let constructor = &self.options.constructor;
        let mut candidates = impls.iter().copied().flat_map(|item_impl| {
            item_impl.items.iter().filter_map(move |impl_item| match impl_item {
                ImplItem::Fn(function)
                    if function.sig.ident == *constructor && is_exported(&function.vis) =>
                {
                    Some((item_impl, function))
                }
                _ => None,
            })
        });

        let Some(found) = candidates.next() else {
            return Err(ScanDefect::MissingConstructor {
                ty: ty.to_string(),
                constructor: constructor.clone(),
            });
        };
        if candidates.next().is_some() {
            return Err(ScanDefect::AmbiguousConstructor {
                ty: ty.to_string(),
                constructor: constructor.clone(),
            });
        }
        Ok(found)
    }

    fn constructor_shape(
        &self,
        ty: &str,
        item: &ItemStruct,
        item_impl: &ItemImpl,
        function: &ImplItemFn,
    ) -> std::result::Result<(Vec<ConstructorParam>, GenericNames), ScanDefect> {
        let constructor = function.sig.ident.to_string();
        let names = || (ty.to_string(), constructor.clone());

        if function.sig.receiver().is_some() {
            let (ty, constructor) = names();
            return Err(ScanDefect::ConstructorReceiver { ty, constructor });
        }
        if function.sig.asyncness.is_some() {
            let (ty, constructor) = names();
            return Err(ScanDefect::AsyncConstructor { ty, constructor });
        }
        if !function.sig.generics.params.is_empty() {
            let (ty, constructor) = names();
            return Err(ScanDefect::GenericConstructor { ty, constructor });
        }
        if !returns_self(&function.sig.output, item) {
            let (ty, constructor) = names();
            return Err(ScanDefect::ConstructorReturn { ty, constructor });
        }

        let impl_names =
            GenericNames::from_impl(&item_impl.generics, &item_impl.self_ty, item.generics.params.len())
                .ok_or_else(|| {
                    let (ty, constructor) = names();
                    ScanDefect::ImplNotGeneric { ty, constructor }
                })?;

        let mut params = Vec::with_capacity(function.sig.inputs.len());
        for (index, input) in function.sig.inputs.iter().enumerate() {
            let FnArg::Typed(pat_type) = input else {
                let (ty, constructor) = names();
                return Err(ScanDefect::ConstructorReceiver { ty, constructor });
            };
            let ident = match pat_type.pat.as_ref() {
                Pat::Ident(pat) if pat.by_ref.is_none() && pat.subpat.is_none() => &pat.ident,
                _ => {
                    let (ty, constructor) = names();
                    return Err(ScanDefect::PatternParameter {
                        ty,
                        constructor,
                        index,
                    });
                }
            };
            if mentions_self(&pat_type.ty) {
                let (ty, constructor) = names();
                return Err(ScanDefect::SelfParameter {
                    ty,
                    constructor,
                    index,
                });
            }

            let written = restate_type(&pat_type.ty, &impl_names, &item.generics);
            let shape = match impl_names.position_of(&pat_type.ty) {
                Some(position) => ParamShape::Generic {
                    position,
                    ty: written,
                },
                None => ParamShape::Concrete {
                    ty: written,
                    canonical: canonical_type(&pat_type.ty, &impl_names),
                },
            };
            params.push(ConstructorParam {
                name: ident.to_string(),
                shape,
            });
        }
        Ok((params, impl_names))
    }

    fn properties(
        &self,
        ty: &str,
        item: &ItemStruct,
        values: &HashMap<String, String>,
    ) -> std::result::Result<IndexMap<String, Property>, ScanDefect> {
        let mut properties = IndexMap::new();
        let Fields::Named(named) = &item.fields else {
            return Ok(properties);
        };

        for field in named.named.iter().filter(|field| is_exported(&field.vis)) {
            let Some(ident) = &field.ident else {
                continue;
            };
            let key = ident.unraw().to_string();
            properties.insert(
                key.clone(),
                Property {
                    name: ident.to_string(),
                    ty: render(&field.ty),
                    value: values.get(&key).cloned(),
                },
            );
        }

        let reserved = |property: &str| {
            property == self.options.constructor
                || property == "into_inner"
                || properties.contains_key(&format!("{}_mut", property))
        };
        if let Some(property) = properties.keys().find(|key| reserved(key)) {
            let property = if property == &self.options.constructor || property == "into_inner" {
                property.clone()
            } else {
                format!("{}_mut", property)
            };
            return Err(ScanDefect::ReservedProperty {
                ty: ty.to_string(),
                property,
            });
        }
        Ok(properties)
    }
}

/// Declared generic parameters, with plain `T: Bound` where-predicates folded
/// into the parameter they bound. Other predicates are returned verbatim.
fn generic_params(generics: &Generics, names: &GenericNames) -> (Vec<GenericParam>, Vec<String>) {
    let mut params: Vec<GenericParam> = generics
        .params
        .iter()
        .map(|param| match param {
            syn::GenericParam::Type(tp) => GenericParam {
                name: tp.ident.to_string(),
                kind: GenericKind::Type,
                bounds: tp.bounds.iter().map(render).collect(),
                canonical_bounds: tp.bounds.iter().map(|b| canonical_bound(b, names)).collect(),
            },
            syn::GenericParam::Lifetime(lp) => GenericParam {
                name: lp.lifetime.to_string(),
                kind: GenericKind::Lifetime,
                bounds: lp.bounds.iter().map(ToString::to_string).collect(),
                canonical_bounds: lp
                    .bounds
                    .iter()
                    .map(|l| canonical_lifetime(l, names))
                    .collect(),
            },
            syn::GenericParam::Const(cp) => GenericParam {
                name: cp.ident.to_string(),
                kind: GenericKind::Const { ty: render(&cp.ty) },
                bounds: Vec::new(),
                canonical_bounds: Default::default(),
            },
        })
        .collect();

    let mut extra = Vec::new();
    let Some(where_clause) = &generics.where_clause else {
        return (params, extra);
    };

    for predicate in &where_clause.predicates {
        match predicate {
            WherePredicate::Type(pt) if pt.lifetimes.is_none() => {
                let target = names
                    .position_of(&pt.bounded_ty)
                    .filter(|&position| params[position].kind == GenericKind::Type);
                match target {
                    Some(position) => {
                        for bound in &pt.bounds {
                            add_bound(
                                &mut params[position],
                                render(bound),
                                canonical_bound(bound, names),
                            );
                        }
                    }
                    None => add_predicate(&mut extra, render(predicate)),
                }
            }
            WherePredicate::Lifetime(pl) => match names.lifetime_position(&pl.lifetime) {
                Some(position) => {
                    for bound in &pl.bounds {
                        add_bound(
                            &mut params[position],
                            bound.to_string(),
                            canonical_lifetime(bound, names),
                        );
                    }
                }
                None => add_predicate(&mut extra, render(predicate)),
            },
            other => add_predicate(&mut extra, render(other)),
        }
    }
    (params, extra)
}

/// Folds the bounds of the impl block declaring the constructor into the
/// struct's parameters, restated to the struct's own names. The constructor
/// only exists where these hold, so the forwarding type must require them too.
fn impl_bounds(
    params: &mut [GenericParam],
    extra: &mut Vec<String>,
    impl_generics: &Generics,
    names: &GenericNames,
    to: &Generics,
) {
    for param in &impl_generics.params {
        match param {
            syn::GenericParam::Type(tp) => {
                if let Some(position) = names.value_position(&tp.ident) {
                    for bound in &tp.bounds {
                        add_bound(
                            &mut params[position],
                            restate_bound(bound, names, to),
                            canonical_bound(bound, names),
                        );
                    }
                }
            }
            syn::GenericParam::Lifetime(lp) => {
                if let Some(position) = names.lifetime_position(&lp.lifetime) {
                    for bound in &lp.bounds {
                        add_bound(
                            &mut params[position],
                            restate_lifetime(bound, names, to),
                            canonical_lifetime(bound, names),
                        );
                    }
                }
            }
            syn::GenericParam::Const(_) => {}
        }
    }

    let Some(where_clause) = &impl_generics.where_clause else {
        return;
    };
    for predicate in &where_clause.predicates {
        match predicate {
            WherePredicate::Type(pt) if pt.lifetimes.is_none() => {
                let target = names
                    .position_of(&pt.bounded_ty)
                    .filter(|&position| params[position].kind == GenericKind::Type);
                match target {
                    Some(position) => {
                        for bound in &pt.bounds {
                            add_bound(
                                &mut params[position],
                                restate_bound(bound, names, to),
                                canonical_bound(bound, names),
                            );
                        }
                    }
                    None => add_predicate(extra, restate_predicate(predicate, names, to)),
                }
            }
            WherePredicate::Lifetime(pl) => match names.lifetime_position(&pl.lifetime) {
                Some(position) => {
                    for bound in &pl.bounds {
                        add_bound(
                            &mut params[position],
                            restate_lifetime(bound, names, to),
                            canonical_lifetime(bound, names),
                        );
                    }
                }
                None => add_predicate(extra, restate_predicate(predicate, names, to)),
            },
            other => add_predicate(extra, restate_predicate(other, names, to)),
        }
    }
}

fn add_bound(param: &mut GenericParam, written: String, canonical: String) {
    if param.canonical_bounds.insert(canonical) {
        param.bounds.push(written);
    }
}

fn add_predicate(extra: &mut Vec<String>, predicate: String) {
    if !extra.contains(&predicate) {
        extra.push(predicate);
    }
}

/// Field initializers of the first `Self { .. }` literal in the constructor.
fn constructor_values(function: &ImplItemFn, ty: &syn::Ident) -> HashMap<String, String> {
    struct Finder<'a> {
        ty: &'a syn::Ident,
        values: Option<HashMap<String, String>>,
    }

    impl<'ast> Visit<'ast> for Finder<'_> {
        fn visit_expr_struct(&mut self, expr: &'ast syn::ExprStruct) {
            let builds_self = expr
                .path
                .segments
                .last()
                .is_some_and(|segment| segment.ident == "Self" || segment.ident == *self.ty);
            if builds_self && self.values.is_none() {
                let values = expr
                    .fields
                    .iter()
                    .filter_map(|field| match &field.member {
                        syn::Member::Named(ident) => {
                            let value = if field.colon_token.is_some() {
                                render(&field.expr)
                            } else {
                                ident.to_string()
                            };
                            Some((ident.unraw().to_string(), value))
                        }
                        syn::Member::Unnamed(_) => None,
                    })
                    .collect();
                self.values = Some(values);
            }
            visit::visit_expr_struct(self, expr);
        }
    }

    let mut finder = Finder { ty, values: None };
    finder.visit_block(&function.block);
    finder.values.unwrap_or_default()
}

fn returns_self(output: &ReturnType, item: &ItemStruct) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };
    match ty.as_ref() {
        Type::Path(tp) if tp.qself.is_none() => tp.path.segments.last().is_some_and(|segment| {
            (segment.ident == "Self" && tp.path.segments.len() == 1) || segment.ident == item.ident
        }),
        _ => false,
    }
}

fn self_type_ident(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(tp) if tp.qself.is_none() => tp
            .path
            .segments
            .last()
            .map(|segment| segment.ident.unraw().to_string()),
        _ => None,
    }
}

fn describe_item(item: &Item) -> Option<(&[Attribute], &'static str)> {
    let described: (&[Attribute], &'static str) = match item {
        Item::Enum(i) => (&i.attrs, "an enum"),
        Item::Union(i) => (&i.attrs, "a union"),
        Item::Fn(i) => (&i.attrs, "a function"),
        Item::Trait(i) => (&i.attrs, "a trait"),
        Item::Type(i) => (&i.attrs, "a type alias"),
        Item::Impl(i) => (&i.attrs, "an impl block"),
        Item::Const(i) => (&i.attrs, "a const"),
        Item::Static(i) => (&i.attrs, "a static"),
        _ => return None,
    };
    Some(described)
}

/// `pub` or `pub(crate)`: visible wherever the generated index is included.
fn is_exported(vis: &Visibility) -> bool {
    match vis {
        Visibility::Public(_) => true,
        Visibility::Restricted(restricted) => {
            restricted.in_token.is_none() && restricted.path.is_ident("crate")
        }
        Visibility::Inherited => false,
    }
}

fn render<T: ToTokens>(node: &T) -> String {
    node.to_token_stream().to_string()
}

fn location(unit: &CompilationUnit, span: Span) -> SourceLocation {
    let start = span.start();
    SourceLocation::new(&unit.path, start.line, start.column + 1)
}
