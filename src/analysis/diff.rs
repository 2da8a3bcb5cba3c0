//! Snapshot diffing.
//!
//! [`diff`] compares the invalidation key of every group of the newer snapshot against the
//! older one. Groups whose key changed, or that the older snapshot did not know, are
//! invalidated directly. Because the Compose runtime wraps `remember` blocks in groups of their
//! own, the group enclosing each changed scope is invalidated as well, one level up.

use std::{collections::BTreeSet, fmt};

use rayon::prelude::*;

use crate::analysis::{invalidation::resolve, GroupKey, Snapshot};

/// Why a group is invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum InvalidationReason {
    /// The group's own invalidation key changed
    Direct,
    /// A group nested directly inside it changed
    ParentWidening,
}

/// One group to invalidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Invalidation {
    /// The group key
    pub key: GroupKey,
    /// Why it is invalidated
    pub reason: InvalidationReason,
}

impl fmt::Display for Invalidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.key, self.reason)
    }
}

/// Groups that must be invalidated when moving from `before` to `after`.
///
/// Direct invalidations come first in ascending key order, followed by the parent groups of
/// the changed scopes that are not already direct, also ascending.
#[must_use]
pub fn diff(before: &Snapshot, after: &Snapshot) -> Vec<Invalidation> {
    let keys: Vec<GroupKey> = after.group_keys().collect();

    let direct: BTreeSet<GroupKey> = keys
        .par_iter()
        .filter(|key| {
            let previous = resolve(before, **key);
            previous.is_none() || previous != resolve(after, **key)
        })
        .copied()
        .collect();

    let parents: BTreeSet<GroupKey> = direct
        .iter()
        .flat_map(|key| after.group(*key))
        .filter_map(|scope| after.scope(*scope)?.parent_group)
        .filter(|parent| !direct.contains(parent))
        .collect();

    direct
        .into_iter()
        .map(|key| Invalidation {
            key,
            reason: InvalidationReason::Direct,
        })
        .chain(parents.into_iter().map(|key| Invalidation {
            key,
            reason: InvalidationReason::ParentWidening,
        }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::{ScopeHash, ScopeId, ScopeKind, ScopeTree},
        classfile::MethodId,
    };

    fn id(name: &str) -> MethodId {
        MethodId::new("AppKt", name, "()V")
    }

    /// `App` with restart group 1 containing replace group 2 (which calls `helper`), plus an
    /// unrelated restart group 3.
    fn app(inner: u64) -> ScopeTree {
        let mut tree = ScopeTree::new(id("App"), None);
        let outer = tree.open(ScopeKind::RestartScope, Some(GroupKey(1)), ScopeId::ROOT);
        let replace = tree.open(ScopeKind::ReplaceScope, Some(GroupKey(2)), outer);
        tree.add_dependency(replace, id("helper"));
        tree.close(replace, ScopeHash(inner));
        tree.close(outer, ScopeHash(inner + 100));
        let other = tree.open(ScopeKind::RestartScope, Some(GroupKey(3)), ScopeId::ROOT);
        tree.close(other, ScopeHash(5));
        tree.close(ScopeId::ROOT, ScopeHash(inner + 200));
        tree
    }

    fn helper(hash: u64) -> ScopeTree {
        let mut tree = ScopeTree::new(id("helper"), None);
        tree.close(ScopeId::ROOT, ScopeHash(hash));
        tree
    }

    fn snapshot(trees: Vec<ScopeTree>) -> Snapshot {
        trees.into_iter().collect()
    }

    #[test]
    fn identical_snapshots() {
        let before = snapshot(vec![app(1), helper(1)]);
        let after = snapshot(vec![app(1), helper(1)]);
        assert!(diff(&before, &after).is_empty());
    }

    #[test]
    fn changed_dependency_widens_to_parent() {
        let before = snapshot(vec![app(1), helper(1)]);
        let after = snapshot(vec![app(1), helper(2)]);

        assert_eq!(
            diff(&before, &after),
            vec![
                Invalidation {
                    key: GroupKey(2),
                    reason: InvalidationReason::Direct
                },
                Invalidation {
                    key: GroupKey(1),
                    reason: InvalidationReason::ParentWidening
                },
            ]
        );
    }

    #[test]
    fn parent_already_direct_is_not_repeated() {
        let before = snapshot(vec![app(1), helper(1)]);
        let after = snapshot(vec![app(9), helper(1)]);

        let result = diff(&before, &after);
        assert_eq!(result.len(), 2);
        assert!(result
            .iter()
            .all(|entry| entry.reason == InvalidationReason::Direct));
        assert_eq!(result[0].key, GroupKey(1));
        assert_eq!(result[1].key, GroupKey(2));
    }

    #[test]
    fn new_groups_are_direct() {
        let before = Snapshot::default();
        let after = snapshot(vec![app(1)]);

        let keys: Vec<_> = diff(&before, &after)
            .into_iter()
            .map(|entry| (entry.key.0, entry.reason))
            .collect();
        assert_eq!(
            keys,
            vec![
                (1, InvalidationReason::Direct),
                (2, InvalidationReason::Direct),
                (3, InvalidationReason::Direct),
            ]
        );
    }

    #[test]
    fn display() {
        let entry = Invalidation {
            key: GroupKey(-7),
            reason: InvalidationReason::ParentWidening,
        };
        assert_eq!(entry.to_string(), "-7 (ParentWidening)");
    }
}
