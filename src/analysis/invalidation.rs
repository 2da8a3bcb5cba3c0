//! Invalidation keys.
//!
//! The invalidation key of a group fingerprints everything the group's code can reach: the
//! scopes tagged with the group key, and transitively every tree of every method those scopes
//! depend on. Two snapshots produce the same key for a group exactly when that closure has the
//! same members with the same structural hashes.

use std::collections::HashSet;

use crate::{
    analysis::{hasher::avalanche, GroupKey, ScopeId, ScopeRef, Snapshot},
    classfile::MethodId,
};

/// Fingerprint of a group's transitive dependency closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvalidationKey(pub u64);

/// Compute the invalidation key of `group` in `snapshot`.
///
/// Returns `None` if no scope carries `group`. Dependencies on methods absent from the
/// snapshot end the closure there.
///
/// The closure starts with the scopes tagged with `group` themselves. Scopes nested inside
/// them contribute through their parents' hashes; their own dependencies are followed only
/// once their method is reached through a dependency.
#[must_use]
pub fn resolve(snapshot: &Snapshot, group: GroupKey) -> Option<InvalidationKey> {
    let tagged = snapshot.group(group);
    if tagged.is_empty() {
        return None;
    }

    let mut members: HashSet<ScopeRef> = tagged.iter().copied().collect();
    let mut visited: HashSet<&MethodId> = HashSet::new();
    let mut pending: Vec<ScopeRef> = tagged.to_vec();

    while let Some(current) = pending.pop() {
        let Some(scope) = snapshot.scope(current) else {
            continue;
        };

        for dependency in &scope.dependencies {
            if !visited.insert(dependency) {
                continue;
            }

            for &index in snapshot.method_indices(dependency) {
                let tree = &snapshot.trees()[index];
                for id in tree.descendants(ScopeId::ROOT) {
                    let member = ScopeRef {
                        tree: index,
                        scope: id,
                    };
                    if members.insert(member) {
                        pending.push(member);
                    }
                }
            }
        }
    }

    let key = members
        .iter()
        .filter_map(|member| snapshot.scope(*member))
        .fold(0u64, |acc, scope| acc.wrapping_add(avalanche(scope.hash.0)));

    Some(InvalidationKey(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ScopeHash, ScopeKind, ScopeTree};

    struct Group {
        key: i32,
        hash: u64,
        dependencies: Vec<&'static str>,
    }

    fn group(key: i32, hash: u64, dependencies: &[&'static str]) -> Group {
        Group {
            key,
            hash,
            dependencies: dependencies.to_vec(),
        }
    }

    fn id(name: &str) -> MethodId {
        MethodId::new("AppKt", name, "()V")
    }

    fn method(name: &str, hash: u64, groups: Vec<Group>) -> ScopeTree {
        let mut tree = ScopeTree::new(id(name), None);
        for group in groups {
            let scope = tree.open(ScopeKind::RestartScope, Some(GroupKey(group.key)), ScopeId::ROOT);
            for dependency in group.dependencies {
                tree.add_dependency(scope, id(dependency));
            }
            tree.close(scope, ScopeHash(group.hash));
        }
        tree.close(ScopeId::ROOT, ScopeHash(hash));
        tree
    }

    fn snapshot(trees: Vec<ScopeTree>) -> Snapshot {
        trees.into_iter().collect()
    }

    #[test]
    fn unknown_group() {
        let snapshot = snapshot(vec![method("App", 1, vec![group(10, 1, &[])])]);
        assert_eq!(resolve(&snapshot, GroupKey(99)), None);
        assert!(resolve(&snapshot, GroupKey(10)).is_some());
    }

    #[test]
    fn follows_dependencies_transitively() {
        let before = snapshot(vec![
            method("App", 1, vec![group(1902, 2, &["helper"])]),
            method("helper", 3, vec![group(5, 4, &["leaf"])]),
            method("leaf", 6, vec![]),
        ]);
        let after = snapshot(vec![
            method("App", 1, vec![group(1902, 2, &["helper"])]),
            method("helper", 3, vec![group(5, 4, &["leaf"])]),
            method("leaf", 7, vec![]),
        ]);

        assert_ne!(
            resolve(&before, GroupKey(1902)),
            resolve(&after, GroupKey(1902))
        );
        assert_ne!(resolve(&before, GroupKey(5)), resolve(&after, GroupKey(5)));
    }

    #[test]
    fn disjoint_groups_are_independent() {
        let before = snapshot(vec![
            method("App", 1, vec![group(10, 2, &["a"]), group(20, 3, &["b"])]),
            method("a", 4, vec![]),
            method("b", 5, vec![]),
        ]);
        let after = snapshot(vec![
            method("App", 1, vec![group(10, 2, &["a"]), group(20, 3, &["b"])]),
            method("a", 40, vec![]),
            method("b", 5, vec![]),
        ]);

        assert_ne!(resolve(&before, GroupKey(10)), resolve(&after, GroupKey(10)));
        assert_eq!(resolve(&before, GroupKey(20)), resolve(&after, GroupKey(20)));
    }

    #[test]
    fn cycles_terminate() {
        let snapshot = snapshot(vec![
            method("a", 1, vec![group(1, 2, &["b"])]),
            method("b", 3, vec![group(2, 4, &["a"])]),
        ]);

        assert!(resolve(&snapshot, GroupKey(1)).is_some());
        assert_eq!(resolve(&snapshot, GroupKey(1)), resolve(&snapshot, GroupKey(2)));
    }

    #[test]
    fn missing_dependencies_are_leaves() {
        let with_missing = snapshot(vec![method("App", 1, vec![group(1, 2, &["gone"])])]);
        let without = snapshot(vec![method("App", 1, vec![group(1, 2, &[])])]);

        assert_eq!(
            resolve(&with_missing, GroupKey(1)),
            resolve(&without, GroupKey(1))
        );
    }

    #[test]
    fn independent_of_tree_order() {
        let forward = snapshot(vec![
            method("App", 1, vec![group(1, 2, &["helper"])]),
            method("helper", 3, vec![]),
        ]);
        let backward = snapshot(vec![
            method("helper", 3, vec![]),
            method("App", 1, vec![group(1, 2, &["helper"])]),
        ]);

        assert_eq!(resolve(&forward, GroupKey(1)), resolve(&backward, GroupKey(1)));
    }

    #[test]
    fn shared_keys_combine_all_scopes() {
        let one = snapshot(vec![
            method("a", 1, vec![group(7, 2, &[])]),
            method("b", 3, vec![group(7, 4, &[])]),
        ]);
        let other = snapshot(vec![
            method("a", 1, vec![group(7, 2, &[])]),
            method("b", 3, vec![group(7, 5, &[])]),
        ]);

        assert_ne!(resolve(&one, GroupKey(7)), resolve(&other, GroupKey(7)));
    }
}
