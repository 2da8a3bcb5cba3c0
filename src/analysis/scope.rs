//! Scope trees.
//!
//! A [`ScopeTree`] holds every scope of one method in an arena. The method's implicit root
//! scope is always [`ScopeId::ROOT`]; every other scope records its parent and its children
//! by index, in the order the children were closed.

use std::fmt;

use strum::{EnumCount, EnumIter};

use crate::classfile::MethodId;

/// A Compose group key.
///
/// Keys are not unique: unrelated scopes, even in different methods, may carry the same key
/// and are then invalidated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey(pub i32);

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structural hash of a scope's instructions, its descendants' included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ScopeHash(pub u64);

/// Index of a scope inside its [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(pub usize);

impl ScopeId {
    /// The method root.
    pub const ROOT: ScopeId = ScopeId(0);
}

/// What opened a scope.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, strum::Display,
)]
pub enum ScopeKind {
    /// The implicit scope spanning a whole method
    MethodRoot,
    /// `startRestartGroup` / `endRestartGroup`
    RestartScope,
    /// `startReplaceGroup` / `endReplaceGroup` and the older replaceable groups
    ReplaceScope,
    /// `sourceInformationMarkerStart` / `sourceInformationMarkerEnd`
    MarkerScope,
}

/// One scope of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// What opened the scope
    pub kind: ScopeKind,
    /// Own group key, `None` if the marker carried none
    pub group: Option<GroupKey>,
    /// Group key of the scope that was on top of the stack when this one opened
    pub parent_group: Option<GroupKey>,
    /// Structural hash
    pub hash: ScopeHash,
    /// Enclosing scope, `None` for the root
    pub parent: Option<ScopeId>,
    /// Nested scopes in closing order
    pub children: Vec<ScopeId>,
    /// Methods referenced from instructions directly inside this scope, first occurrence order
    pub dependencies: Vec<MethodId>,
}

impl Scope {
    fn new(kind: ScopeKind, group: Option<GroupKey>, parent: Option<(ScopeId, Option<GroupKey>)>) -> Self {
        Scope {
            kind,
            group,
            parent_group: parent.and_then(|(_, group)| group),
            hash: ScopeHash::default(),
            parent: parent.map(|(id, _)| id),
            children: Vec::new(),
            dependencies: Vec::new(),
        }
    }
}

/// All scopes of one method, rooted at [`ScopeId::ROOT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTree {
    method: MethodId,
    scopes: Vec<Scope>,
}

impl ScopeTree {
    /// Create a tree holding only the method root.
    pub fn new(method: MethodId, function_key: Option<GroupKey>) -> Self {
        ScopeTree {
            method,
            scopes: vec![Scope::new(ScopeKind::MethodRoot, function_key, None)],
        }
    }

    /// Allocate a new scope under `parent`.
    ///
    /// The scope is not yet listed among `parent`'s children; that happens in
    /// [`ScopeTree::close`].
    pub(crate) fn open(&mut self, kind: ScopeKind, group: Option<GroupKey>, parent: ScopeId) -> ScopeId {
        let parent_group = self.scopes[parent.0].group;
        self.scopes
            .push(Scope::new(kind, group, Some((parent, parent_group))));
        ScopeId(self.scopes.len() - 1)
    }

    /// Record the final hash of `id` and append it to its parent's children.
    pub(crate) fn close(&mut self, id: ScopeId, hash: ScopeHash) {
        self.scopes[id.0].hash = hash;
        if let Some(parent) = self.scopes[id.0].parent {
            self.scopes[parent.0].children.push(id);
        }
    }

    /// Record a dependency of `id` unless it is already recorded.
    pub(crate) fn add_dependency(&mut self, id: ScopeId, dependency: MethodId) {
        let dependencies = &mut self.scopes[id.0].dependencies;
        if !dependencies.contains(&dependency) {
            dependencies.push(dependency);
        }
    }

    /// The method this tree belongs to.
    #[must_use]
    pub fn method(&self) -> &MethodId {
        &self.method
    }

    /// The root scope.
    #[must_use]
    pub fn root(&self) -> &Scope {
        &self.scopes[ScopeId::ROOT.0]
    }

    /// Look up a scope.
    #[must_use]
    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0)
    }

    /// Number of scopes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Always `false`; a tree holds at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// All scopes with their ids, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes
            .iter()
            .enumerate()
            .map(|(index, scope)| (ScopeId(index), scope))
    }

    /// `id` and all scopes below it, parents before children.
    #[must_use]
    pub fn descendants(&self, id: ScopeId) -> Vec<ScopeId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(scope) = self.scopes.get(current.0) else {
                continue;
            };
            result.push(current);
            stack.extend(scope.children.iter().rev().copied());
        }
        result
    }
}

impl std::ops::Index<ScopeId> for ScopeTree {
    type Output = Scope;

    fn index(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn tree() -> ScopeTree {
        let mut tree = ScopeTree::new(MethodId::new("AppKt", "App", "()V"), Some(GroupKey(7)));
        let restart = tree.open(ScopeKind::RestartScope, Some(GroupKey(1902)), ScopeId::ROOT);
        let marker = tree.open(ScopeKind::MarkerScope, None, restart);
        tree.close(marker, ScopeHash(2));
        let replace = tree.open(ScopeKind::ReplaceScope, Some(GroupKey(3)), restart);
        tree.close(replace, ScopeHash(3));
        tree.close(restart, ScopeHash(1));
        tree.close(ScopeId::ROOT, ScopeHash(0));
        tree
    }

    #[test]
    fn parent_links_and_groups() {
        let tree = tree();

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.root().group, Some(GroupKey(7)));
        assert_eq!(tree.root().children, vec![ScopeId(1)]);
        assert_eq!(tree[ScopeId(1)].parent_group, Some(GroupKey(7)));
        assert_eq!(tree[ScopeId(1)].children, vec![ScopeId(2), ScopeId(3)]);
        assert_eq!(tree[ScopeId(2)].parent, Some(ScopeId(1)));
        assert_eq!(tree[ScopeId(2)].parent_group, Some(GroupKey(1902)));
        assert_eq!(tree[ScopeId(3)].hash, ScopeHash(3));
    }

    #[test]
    fn descendants_preorder() {
        let tree = tree();

        assert_eq!(
            tree.descendants(ScopeId::ROOT),
            vec![ScopeId(0), ScopeId(1), ScopeId(2), ScopeId(3)]
        );
        assert_eq!(tree.descendants(ScopeId(3)), vec![ScopeId(3)]);
        assert!(tree.descendants(ScopeId(9)).is_empty());
    }

    #[test]
    fn dependencies_are_deduplicated() {
        let mut tree = tree();
        let helper = MethodId::new("AppKt", "helper", "()V");
        tree.add_dependency(ScopeId(1), helper.clone());
        tree.add_dependency(ScopeId(1), MethodId::new("AppKt", "other", "()V"));
        tree.add_dependency(ScopeId(1), helper.clone());

        assert_eq!(tree[ScopeId(1)].dependencies.len(), 2);
        assert_eq!(tree[ScopeId(1)].dependencies[0], helper);
    }

    #[test]
    fn scope_kinds() {
        assert_eq!(ScopeKind::COUNT, 4);
        assert_eq!(ScopeKind::iter().next(), Some(ScopeKind::MethodRoot));
        assert_eq!(ScopeKind::RestartScope.to_string(), "RestartScope");
    }
}
