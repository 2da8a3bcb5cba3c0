//! Immutable snapshots of all known scope trees.
//!
//! A [`Snapshot`] owns a flat list of per-method [`ScopeTree`]s plus two indices derived from
//! them when the snapshot is built:
//!
//! - method index: [`MethodId`] to the trees of that method
//! - group index: [`GroupKey`] to every scope carrying that key, at any depth
//!
//! Snapshots are never mutated. [`Snapshot::merge`] builds a new one, sharing the unchanged
//! trees with its inputs through [`Arc`].

use std::{
    collections::{BTreeMap, HashMap},
    fmt::Write,
    sync::Arc,
};

use crate::{
    analysis::{GroupKey, Scope, ScopeId, ScopeKind, ScopeTree},
    classfile::MethodId,
};

/// Position of a scope within a [`Snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeRef {
    /// Index into [`Snapshot::trees`]
    pub tree: usize,
    /// Scope inside that tree
    pub scope: ScopeId,
}

/// An immutable set of scope trees with method and group indices.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    trees: Vec<Arc<ScopeTree>>,
    methods: HashMap<MethodId, Vec<usize>>,
    groups: BTreeMap<GroupKey, Vec<ScopeRef>>,
}

impl Snapshot {
    /// Build a snapshot from `trees`, in the given order.
    pub fn new<I>(trees: I) -> Self
    where
        I: IntoIterator<Item = Arc<ScopeTree>>,
    {
        let trees: Vec<Arc<ScopeTree>> = trees.into_iter().collect();
        let mut methods: HashMap<MethodId, Vec<usize>> = HashMap::new();
        let mut groups: BTreeMap<GroupKey, Vec<ScopeRef>> = BTreeMap::new();

        for (index, tree) in trees.iter().enumerate() {
            methods.entry(tree.method().clone()).or_default().push(index);

            for scope in tree.descendants(ScopeId::ROOT) {
                if let Some(group) = tree[scope].group {
                    groups.entry(group).or_default().push(ScopeRef {
                        tree: index,
                        scope,
                    });
                }
            }
        }

        Snapshot {
            trees,
            methods,
            groups,
        }
    }

    /// Replace the trees of every method present in `incoming`.
    ///
    /// The result holds the trees of `self` whose method does not occur in `incoming`, followed
    /// by all trees of `incoming`. Neither input is modified.
    #[must_use]
    pub fn merge(&self, incoming: &Snapshot) -> Snapshot {
        let retained = self
            .trees
            .iter()
            .filter(|tree| !incoming.methods.contains_key(tree.method()));

        Snapshot::new(retained.chain(incoming.trees.iter()).cloned())
    }

    /// All trees in snapshot order.
    #[must_use]
    pub fn trees(&self) -> &[Arc<ScopeTree>] {
        &self.trees
    }

    /// Number of trees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Returns `true` if the snapshot holds no trees.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// The trees of `method`; empty if the method is unknown.
    pub fn method(&self, method: &MethodId) -> impl Iterator<Item = &Arc<ScopeTree>> {
        self.methods
            .get(method)
            .into_iter()
            .flatten()
            .map(|index| &self.trees[*index])
    }

    /// Indices into [`Snapshot::trees`] of the trees of `method`.
    pub(crate) fn method_indices(&self, method: &MethodId) -> &[usize] {
        self.methods.get(method).map_or(&[], Vec::as_slice)
    }

    /// Returns `true` if any tree belongs to `method`.
    #[must_use]
    pub fn contains_method(&self, method: &MethodId) -> bool {
        self.methods.contains_key(method)
    }

    /// Every scope carrying `key`; empty if the key is unknown.
    #[must_use]
    pub fn group(&self, key: GroupKey) -> &[ScopeRef] {
        self.groups.get(&key).map_or(&[], Vec::as_slice)
    }

    /// Returns `true` if at least one scope carries `key`.
    #[must_use]
    pub fn contains_group(&self, key: GroupKey) -> bool {
        self.groups.contains_key(&key)
    }

    /// All group keys in ascending order.
    pub fn group_keys(&self) -> impl Iterator<Item = GroupKey> + '_ {
        self.groups.keys().copied()
    }

    /// The tree a [`ScopeRef`] points into.
    #[must_use]
    pub fn tree(&self, scope: ScopeRef) -> Option<&Arc<ScopeTree>> {
        self.trees.get(scope.tree)
    }

    /// Resolve a [`ScopeRef`].
    #[must_use]
    pub fn scope(&self, scope: ScopeRef) -> Option<&Scope> {
        self.trees.get(scope.tree)?.get(scope.scope)
    }

    /// Human-readable dump of all trees, grouped by class in order of first appearance.
    ///
    /// ```text
    /// AppKt {
    ///     App {
    ///         desc: (Landroidx/compose/runtime/Composer;I)V
    ///         key: null
    ///         codeHash: 1234
    ///         dependencies: []
    ///
    ///         RestartGroup {
    ///             key: 1902
    ///             codeHash: 5678
    ///             dependencies: [
    ///                 AppKt.helper()V
    ///             ]
    ///         }
    ///     }
    /// }
    /// ```
    #[must_use]
    pub fn render(&self) -> String {
        let mut classes: Vec<(&str, Vec<&ScopeTree>)> = Vec::new();
        for tree in &self.trees {
            let tree: &ScopeTree = tree;
            let class = tree.method().class.as_str();
            match classes.iter_mut().find(|(name, _)| *name == class) {
                Some((_, trees)) => trees.push(tree),
                None => classes.push((class, vec![tree])),
            }
        }

        let mut out = String::new();
        for (index, (class, trees)) in classes.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            let _ = writeln!(out, "{class} {{");
            for (index, tree) in trees.iter().enumerate() {
                if index > 0 {
                    out.push('\n');
                }
                render_scope(&mut out, tree, ScopeId::ROOT, 1);
            }
            out.push_str("}\n");
        }
        out
    }
}

impl FromIterator<ScopeTree> for Snapshot {
    fn from_iter<T: IntoIterator<Item = ScopeTree>>(iter: T) -> Self {
        Snapshot::new(iter.into_iter().map(Arc::new))
    }
}

fn render_scope(out: &mut String, tree: &ScopeTree, id: ScopeId, depth: usize) {
    let indent = "    ".repeat(depth);
    let scope = &tree[id];

    let title = match scope.kind {
        ScopeKind::MethodRoot => tree.method().name.as_str(),
        ScopeKind::RestartScope => "RestartGroup",
        ScopeKind::ReplaceScope => "ReplaceGroup",
        ScopeKind::MarkerScope => "SourceInformationMarker",
    };
    let _ = writeln!(out, "{indent}{title} {{");

    if scope.kind == ScopeKind::MethodRoot {
        let _ = writeln!(out, "{indent}    desc: {}", tree.method().descriptor);
    }
    match scope.group {
        Some(group) => {
            let _ = writeln!(out, "{indent}    key: {group}");
        }
        None => {
            let _ = writeln!(out, "{indent}    key: null");
        }
    }
    let _ = writeln!(out, "{indent}    codeHash: {}", scope.hash.0);

    if scope.dependencies.is_empty() {
        let _ = writeln!(out, "{indent}    dependencies: []");
    } else {
        let _ = writeln!(out, "{indent}    dependencies: [");
        for dependency in &scope.dependencies {
            let _ = writeln!(out, "{indent}        {dependency}");
        }
        let _ = writeln!(out, "{indent}    ]");
    }

    for child in &scope.children {
        out.push('\n');
        render_scope(out, tree, *child, depth + 1);
    }

    let _ = writeln!(out, "{indent}}}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ScopeHash;

    fn tree(class: &str, name: &str, root: Option<i32>, children: &[(i32, u64)]) -> ScopeTree {
        let mut tree = ScopeTree::new(MethodId::new(class, name, "()V"), root.map(GroupKey));
        for (key, hash) in children {
            let id = tree.open(ScopeKind::RestartScope, Some(GroupKey(*key)), ScopeId::ROOT);
            tree.close(id, ScopeHash(*hash));
        }
        tree.close(ScopeId::ROOT, ScopeHash(0));
        tree
    }

    #[test]
    fn empty() {
        let snapshot = Snapshot::default();

        assert!(snapshot.is_empty());
        assert_eq!(snapshot.group_keys().count(), 0);
        assert!(snapshot.group(GroupKey(1)).is_empty());
        assert_eq!(snapshot.render(), "");
    }

    #[test]
    fn indices() {
        let snapshot: Snapshot = vec![
            tree("AppKt", "App", Some(1), &[(10, 1), (20, 2)]),
            tree("AppKt", "Other", None, &[(10, 3)]),
        ]
        .into_iter()
        .collect();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.group_keys().collect::<Vec<_>>(),
            vec![GroupKey(1), GroupKey(10), GroupKey(20)]
        );
        assert_eq!(snapshot.group(GroupKey(10)).len(), 2);
        assert_eq!(
            snapshot.group(GroupKey(10))[1],
            ScopeRef {
                tree: 1,
                scope: ScopeId(1)
            }
        );
        assert_eq!(
            snapshot.scope(snapshot.group(GroupKey(20))[0]).map(|s| s.hash),
            Some(ScopeHash(2))
        );

        let app = MethodId::new("AppKt", "App", "()V");
        assert!(snapshot.contains_method(&app));
        assert_eq!(snapshot.method(&app).count(), 1);
        assert_eq!(
            snapshot
                .method(&MethodId::new("AppKt", "Missing", "()V"))
                .count(),
            0
        );
    }

    #[test]
    fn merge_replaces_whole_methods() {
        let old: Snapshot = vec![
            tree("AppKt", "App", None, &[(10, 1), (11, 1)]),
            tree("AppKt", "Other", None, &[(20, 2)]),
        ]
        .into_iter()
        .collect();
        let incoming: Snapshot = vec![tree("AppKt", "App", None, &[(10, 5)])]
            .into_iter()
            .collect();

        let merged = old.merge(&incoming);

        assert_eq!(merged.len(), 2);
        assert!(!merged.contains_group(GroupKey(11)));
        assert_eq!(
            merged.scope(merged.group(GroupKey(10))[0]).map(|s| s.hash),
            Some(ScopeHash(5))
        );
        assert!(Arc::ptr_eq(&merged.trees()[0], &old.trees()[1]));
        assert!(Arc::ptr_eq(&merged.trees()[1], &incoming.trees()[0]));
        assert_eq!(old.len(), 2);
        assert!(old.contains_group(GroupKey(11)));
    }

    #[test]
    fn render_layout() {
        let mut app = ScopeTree::new(MethodId::new("AppKt", "App", "()V"), None);
        let restart = app.open(ScopeKind::RestartScope, Some(GroupKey(1902)), ScopeId::ROOT);
        app.add_dependency(restart, MethodId::new("AppKt", "helper", "()V"));
        app.close(restart, ScopeHash(7));
        app.close(ScopeId::ROOT, ScopeHash(3));

        let snapshot: Snapshot = vec![app, tree("Lib", "helper", Some(5), &[])]
            .into_iter()
            .collect();

        let expected = "\
AppKt {
    App {
        desc: ()V
        key: null
        codeHash: 3
        dependencies: []

        RestartGroup {
            key: 1902
            codeHash: 7
            dependencies: [
                AppKt.helper()V
            ]
        }
    }
}

Lib {
    helper {
        desc: ()V
        key: 5
        codeHash: 0
        dependencies: []
    }
}
";
        assert_eq!(snapshot.render(), expected);
    }
}
