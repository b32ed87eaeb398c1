//! Resolver: picks the winning definition of each group and checks that
//! every other member is structurally compatible with it.
//!
//! The generated artifact exposes a single constructor signature, the
//! winner's. Lower-priority members never execute, but they must still fit
//! that signature, otherwise callers written against one variant would stop
//! compiling when another variant's source set is switched in.
//!
//! # Compatibility rules
//!
//! For every non-winning member `e`:
//!
//! 1. same constructor arity;
//! 2. parameter `i` of `e` is assignable to parameter `i` of the winner:
//!    the same concrete type, or the same generic parameter whose bounds on
//!    `e` are a subset of the winner's;
//! 3. same generic arity, same kind at each position, and `e`'s bounds a
//!    subset of the winner's.
//!
//! Members are only compared against the winner, never against each other.

use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::error::{Error, Result, ShapeMismatch};
use crate::model::{
    AnnotatedDefinition, ConstructorParam, DefinitionGroup, ParamShape, ResolvedDefinition,
};

/// Resolves every group in parallel; results and errors follow group order.
#[instrument(skip_all, name = "resolve", fields(groups = groups.len()))]
pub fn resolve_all(groups: Vec<DefinitionGroup>) -> Result<Vec<ResolvedDefinition>> {
    let results: Vec<Result<ResolvedDefinition>> = groups.into_par_iter().map(resolve).collect();
    let resolved = results.into_iter().collect::<Result<Vec<_>>>()?;
    info!(groups = resolved.len(), "resolved groups");
    Ok(resolved)
}

/// Orders a group by descending priority and validates it against the winner.
pub fn resolve(group: DefinitionGroup) -> Result<ResolvedDefinition> {
    let (name, mut chain) = group.into_parts();
    chain.sort_by(|a, b| b.priority.cmp(&a.priority));

    let (winner, others) = chain
        .split_first()
        .expect("BUG: definition groups are built non-empty");

    for member in others {
        check_compatible(winner, member).map_err(|mismatch| Error::SignatureMismatch {
            name: name.clone(),
            winner: winner.source_location.clone(),
            offending: member.source_location.clone(),
            mismatch,
        })?;
    }

    debug!(
        group = %name,
        winner = %winner.type_path,
        priority = winner.priority,
        members = chain.len(),
        "resolved"
    );
    Ok(ResolvedDefinition { name, chain })
}

/// First structural divergence of `member` from `winner`, if any.
pub fn check_compatible(
    winner: &AnnotatedDefinition,
    member: &AnnotatedDefinition,
) -> std::result::Result<(), ShapeMismatch> {
    let expected = winner.constructor_shape.len();
    let found = member.constructor_shape.len();
    if expected != found {
        return Err(ShapeMismatch::ParameterCount { expected, found });
    }

    for (index, (w, m)) in winner
        .constructor_shape
        .iter()
        .zip(&member.constructor_shape)
        .enumerate()
    {
        if !parameter_assignable(winner, w, member, m) {
            return Err(ShapeMismatch::Parameter {
                index,
                expected: describe_param(winner, w),
                found: describe_param(member, m),
            });
        }
    }

    let expected = winner.generics.len();
    let found = member.generics.len();
    if expected != found {
        return Err(ShapeMismatch::GenericCount { expected, found });
    }

    for (index, (w, m)) in winner.generics.iter().zip(&member.generics).enumerate() {
        if !w.admits(m) {
            return Err(ShapeMismatch::GenericParameter {
                index,
                expected: w.declaration(),
                found: m.declaration(),
            });
        }
    }
    Ok(())
}

fn parameter_assignable(
    winner: &AnnotatedDefinition,
    w: &ConstructorParam,
    member: &AnnotatedDefinition,
    m: &ConstructorParam,
) -> bool {
    match (&w.shape, &m.shape) {
        (ParamShape::Concrete { canonical: a, .. }, ParamShape::Concrete { canonical: b, .. }) => {
            a == b
        }
        (ParamShape::Generic { position: a, .. }, ParamShape::Generic { position: b, .. }) => {
            if a != b {
                return false;
            }
            match (winner.generics.get(*a), member.generics.get(*b)) {
                (Some(wg), Some(mg)) => wg.admits(mg),
                _ => false,
            }
        }
        _ => false,
    }
}

fn describe_param(definition: &AnnotatedDefinition, param: &ConstructorParam) -> String {
    match &param.shape {
        ParamShape::Generic { position, ty } => definition
            .generics
            .get(*position)
            .map(|generic| generic.declaration())
            .unwrap_or_else(|| ty.clone()),
        ParamShape::Concrete { ty, .. } => ty.clone(),
    }
}
