//! Scope tree construction.
//!
//! [`ScopeTreeBuilder`] walks a method's instructions once, keeping a stack of open scopes.
//! For every instruction it, in this order:
//!
//! 1. feeds the instruction to the hasher of every open scope,
//! 2. records its dependency (if any) on the innermost open scope,
//! 3. applies the scope transition if the instruction is a marker call.
//!
//! A marker call therefore belongs to the scope it is called from: an enter call is part of
//! the enclosing scope, an exit call part of the scope it closes. An exit without an open
//! scope of its kind, as on the second return path of a restartable composable, stays in the
//! current scope and closes nothing.
//!
//! The key of an enter marker is the last `int` constant in the run of constant loads right
//! before the call, which covers both `startRestartGroup(key)` and
//! `sourceInformationMarkerStart(composer, key, "info")`.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    analysis::{
        dependencies::DependencyAnalyzer, hasher::StructuralHasher, GroupKey, ScopeId,
        ScopeKind, ScopeTree,
    },
    classfile::{ClassUnit, MemberRef, MethodId, MethodUnit},
    config::{AnalysisConfig, MarkerAction, MarkerSignature},
    disassembler::Instruction,
    Error, Result,
};

struct Frame {
    scope: ScopeId,
    kind: ScopeKind,
    hasher: StructuralHasher,
}

impl Frame {
    fn new(scope: ScopeId, kind: ScopeKind) -> Self {
        Frame {
            scope,
            kind,
            hasher: StructuralHasher::new(),
        }
    }
}

/// Builds [`ScopeTree`]s from instruction sequences.
pub struct ScopeTreeBuilder<'a> {
    config: &'a AnalysisConfig,
    markers: HashMap<&'a str, Vec<&'a MarkerSignature>>,
    dependencies: DependencyAnalyzer<'a>,
}

impl<'a> ScopeTreeBuilder<'a> {
    /// Create a builder for the markers and exclusions of `config`.
    #[must_use]
    pub fn new(config: &'a AnalysisConfig) -> Self {
        let mut markers: HashMap<&'a str, Vec<&'a MarkerSignature>> = HashMap::new();
        for marker in &config.markers {
            markers.entry(marker.name.as_str()).or_default().push(marker);
        }

        ScopeTreeBuilder {
            config,
            markers,
            dependencies: DependencyAnalyzer::new(config),
        }
    }

    fn marker(&self, target: &MemberRef) -> Option<MarkerAction> {
        self.markers
            .get(target.name.as_str())?
            .iter()
            .find(|marker| marker.owner == target.owner && marker.descriptor == target.descriptor)
            .map(|marker| marker.action)
    }

    /// Decode `method` and build its scope tree.
    ///
    /// The root scope carries the method's function key, if annotated with one.
    ///
    /// # Errors
    /// Returns a decode error if the method body cannot be disassembled, or
    /// [`crate::Error::MalformedScopes`] if its scopes nest deeper than allowed.
    pub fn build_method(&self, class: &ClassUnit, method: &MethodUnit) -> Result<ScopeTree> {
        let instructions = method.instructions(class)?;
        let function_key = method
            .function_key(&self.config.function_key_annotation)
            .map(GroupKey);
        self.build(method.id().clone(), function_key, &instructions)
    }

    /// Build the scope tree of `method` from its instruction sequence.
    ///
    /// Scopes still open when the sequence ends are closed under the root.
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedScopes`] if more than `max_scope_depth` scopes are open
    /// at once.
    pub fn build(
        &self,
        method: MethodId,
        function_key: Option<GroupKey>,
        instructions: &[Instruction],
    ) -> Result<ScopeTree> {
        let mut tree = ScopeTree::new(method, function_key);
        let mut stack = vec![Frame::new(ScopeId::ROOT, ScopeKind::MethodRoot)];
        let mut key = None;

        for instruction in instructions {
            for frame in &mut stack {
                frame.hasher.write_instruction(instruction);
            }

            if let Some(dependency) = self.dependencies.analyze(instruction) {
                tree.add_dependency(top(&stack), dependency);
            }

            if instruction.is_label() {
                continue;
            }
            if instruction.is_constant_load() {
                key = instruction.int_value().or(key);
                continue;
            }

            let action = match instruction {
                Instruction::Call { target, .. } => self.marker(target),
                _ => None,
            };
            match action {
                Some(MarkerAction::Enter(kind)) => {
                    if stack.len() > self.config.max_scope_depth {
                        return Err(Error::MalformedScopes {
                            method: tree.method().clone(),
                            message: format!(
                                "more than {} nested scopes",
                                self.config.max_scope_depth
                            ),
                        });
                    }
                    let scope = tree.open(kind, key.map(GroupKey), top(&stack));
                    stack.push(Frame::new(scope, kind));
                }
                Some(MarkerAction::Exit(kind)) => {
                    // `position` counts from the first non-root frame
                    match stack.iter().skip(1).rposition(|frame| frame.kind == kind) {
                        Some(position) => {
                            while stack.len() > position + 1 {
                                close(&mut tree, &mut stack);
                            }
                        }
                        None => debug!(
                            "Ignoring end of {} without an open start in '{}'",
                            kind,
                            tree.method()
                        ),
                    }
                }
                None => {}
            }
            key = None;
        }

        while !stack.is_empty() {
            close(&mut tree, &mut stack);
        }

        Ok(tree)
    }
}

fn top(stack: &[Frame]) -> ScopeId {
    stack.last().map_or(ScopeId::ROOT, |frame| frame.scope)
}

fn close(tree: &mut ScopeTree, stack: &mut Vec<Frame>) {
    if let Some(frame) = stack.pop() {
        tree.close(frame.scope, frame.hasher.finish());
    }
}
