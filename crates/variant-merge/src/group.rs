//! Grouper: partitions collected definitions by logical name.
//!
//! This is the pipeline's barrier: it takes the complete record list, since
//! a group is only meaningful once every unit that could contribute to it
//! has been scanned.

use std::collections::BTreeMap;

use tracing::{debug, info, instrument};

use crate::error::{Error, Result};
use crate::model::{AnnotatedDefinition, DefinitionGroup};

/// Partitions definitions by name, sorted by name.
///
/// Fails with [`Error::DuplicatePriority`] when two definitions share a name
/// and a priority. The reported pair and the group it is reported for do not
/// depend on the order of `definitions`.
#[instrument(skip_all, name = "group", fields(definitions = definitions.len()))]
pub fn group(definitions: Vec<AnnotatedDefinition>) -> Result<Vec<DefinitionGroup>> {
    let mut partition: BTreeMap<String, Vec<AnnotatedDefinition>> = BTreeMap::new();
    for definition in definitions {
        partition
            .entry(definition.name.clone())
            .or_default()
            .push(definition);
    }

    let mut groups = Vec::with_capacity(partition.len());
    for (name, members) in partition {
        check_priorities(&name, &members)?;
        debug!(group = %name, members = members.len(), "grouped");
        groups.push(DefinitionGroup::new(name, members));
    }

    info!(groups = groups.len(), "grouped definitions");
    Ok(groups)
}

fn check_priorities(name: &str, members: &[AnnotatedDefinition]) -> Result<()> {
    let mut ordered: Vec<&AnnotatedDefinition> = members.iter().collect();
    ordered.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.source_location.cmp(&b.source_location))
    });

    for pair in ordered.windows(2) {
        if pair[0].priority == pair[1].priority {
            return Err(Error::DuplicatePriority {
                name: name.to_string(),
                priority: pair[0].priority,
                first: pair[0].source_location.clone(),
                second: pair[1].source_location.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceLocation;
    use indexmap::IndexMap;

    fn definition(name: &str, priority: i64, file: &str) -> AnnotatedDefinition {
        AnnotatedDefinition {
            name: name.to_string(),
            priority,
            type_path: format!("crate::{}", file),
            constructor: "new".to_string(),
            constructor_shape: Vec::new(),
            generics: Vec::new(),
            where_predicates: Vec::new(),
            overridden_properties: IndexMap::new(),
            source_location: SourceLocation::new(format!("src/{}.rs", file), 1, 1),
        }
    }

    #[test]
    fn test_partitions_by_name() {
        let groups = group(vec![
            definition("B", 1, "b1"),
            definition("A", 1, "a1"),
            definition("B", 2, "b2"),
        ])
        .unwrap();

        let parts: Vec<_> = groups.into_iter().map(DefinitionGroup::into_parts).collect();
        assert_eq!(parts[0].0, "A");
        assert_eq!(parts[1].0, "B");
        assert_eq!(parts[1].1.len(), 2);
    }

    #[test]
    fn test_single_member_group_is_valid() {
        let mut groups = group(vec![definition("Solo", 7, "solo")]).unwrap();
        assert_eq!(groups.len(), 1);
        let (_, members) = groups.remove(0).into_parts();
        assert_eq!(members[0].priority, 7);
    }

    #[test]
    fn test_duplicate_priority_regardless_of_order() {
        let forward = vec![definition("X", 2, "main"), definition("X", 2, "flavor")];
        let mut backward = forward.clone();
        backward.reverse();

        for definitions in [forward, backward] {
            match group(definitions).unwrap_err() {
                Error::DuplicatePriority {
                    name,
                    priority,
                    first,
                    second,
                } => {
                    assert_eq!(name, "X");
                    assert_eq!(priority, 2);
                    assert_eq!(first.file, std::path::PathBuf::from("src/flavor.rs"));
                    assert_eq!(second.file, std::path::PathBuf::from("src/main.rs"));
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_same_priority_in_different_groups_is_fine() {
        let groups = group(vec![definition("A", 1, "a"), definition("B", 1, "b")]).unwrap();
        assert_eq!(groups.len(), 2);
    }
}
