//! Scope analysis of Compose methods.
//!
//! This module turns decoded methods into scope trees and compares sets of them to find the
//! groups a code change affects.
//!
//! # Architecture
//!
//! - [`ScopeTreeBuilder`] walks one method's instructions and produces its [`ScopeTree`],
//!   using [`StructuralHasher`] for per-scope hashes and [`DependencyAnalyzer`] for
//!   method-to-method edges
//! - [`Snapshot`] aggregates trees and indexes them by method and by group key
//! - [`resolve`] fingerprints a group's transitive dependency closure
//! - [`diff`] compares two snapshots and yields the [`Invalidation`]s to perform
//!
//! # Usage
//!
//! ```rust
//! use groupscope::{
//!     analysis::{analyze_class, diff, GroupKey, Snapshot},
//!     classfile::{ClassBuilder, ClassUnit},
//!     AnalysisConfig,
//! };
//!
//! let config = AnalysisConfig::default();
//! let version = |value: i32| {
//!     let bytes = ClassBuilder::new("AppKt")
//!         .method("App", "()V", |method| {
//!             method.code(|code| {
//!                 code.iconst(1902)
//!                     .invokeinterface("androidx/compose/runtime/Composer", "startReplaceGroup", "(I)V")
//!                     .iconst(value)
//!                     .pop()
//!                     .invokeinterface("androidx/compose/runtime/Composer", "endReplaceGroup", "()V")
//!                     .return_void();
//!             })
//!         })
//!         .build();
//!     let class = ClassUnit::parse(&bytes).unwrap();
//!     analyze_class(&class, &config).trees.into_iter().collect::<Snapshot>()
//! };
//!
//! let changes = diff(&version(1), &version(2));
//! assert_eq!(changes[0].key, GroupKey(1902));
//! ```

mod builder;
mod dependencies;
mod diff;
mod hasher;
mod invalidation;
mod scope;
mod snapshot;

pub use builder::ScopeTreeBuilder;
pub use dependencies::DependencyAnalyzer;
pub use diff::{diff, Invalidation, InvalidationReason};
pub use hasher::{avalanche, StructuralHasher};
pub use invalidation::{resolve, InvalidationKey};
pub use scope::{GroupKey, Scope, ScopeHash, ScopeId, ScopeKind, ScopeTree};
pub use snapshot::{ScopeRef, Snapshot};

use crate::{
    classfile::{ClassUnit, MethodId},
    config::AnalysisConfig,
    Error,
};

/// Result of analyzing every method of one class.
#[derive(Debug)]
pub struct ClassAnalysis {
    /// Internal name of the class
    pub class: String,
    /// Trees of the methods that were analyzed successfully, in declaration order
    pub trees: Vec<ScopeTree>,
    /// Methods that were skipped, with the reason
    pub failures: Vec<(MethodId, Error)>,
}

/// Build the scope tree of every method of `class`.
///
/// A method whose code cannot be decoded, or whose markers cannot be matched up, is reported
/// in [`ClassAnalysis::failures`] and does not affect the other methods.
#[must_use]
pub fn analyze_class(class: &ClassUnit, config: &AnalysisConfig) -> ClassAnalysis {
    let builder = ScopeTreeBuilder::new(config);
    let mut trees = Vec::with_capacity(class.methods().len());
    let mut failures = Vec::new();

    for method in class.methods() {
        match builder.build_method(class, method) {
            Ok(tree) => trees.push(tree),
            Err(error) => {
                tracing::warn!("Skipping scopes of '{}': {}", method.id(), error);
                failures.push((method.id().clone(), error));
            }
        }
    }

    ClassAnalysis {
        class: class.name().to_string(),
        trees,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classfile::{ClassBuilder, MethodAccessFlags},
        config::COMPOSER,
        test::{restart_group, COMPOSABLE},
    };

    #[test]
    fn failures_are_isolated_per_method() {
        let bytes = ClassBuilder::new("AppKt")
            .method("Good", COMPOSABLE, |method| {
                method.code(|code| {
                    restart_group(code, 10, |code| {
                        code.invokestatic("AppKt", "helper", "()V");
                    });
                    code.return_void();
                })
            })
            .method("Broken", COMPOSABLE, |method| {
                method.code(|code| {
                    for key in 0..300 {
                        code.aload(0)
                            .iconst(key)
                            .invokeinterface(COMPOSER, "startReplaceGroup", "(I)V");
                    }
                    code.return_void();
                })
            })
            .method("Abstract", "()V", |method| {
                method.access(MethodAccessFlags::PUBLIC | MethodAccessFlags::ABSTRACT)
            })
            .build();
        let class = ClassUnit::parse(&bytes).unwrap();

        let analysis = analyze_class(&class, &AnalysisConfig::default());

        assert_eq!(analysis.class, "AppKt");
        assert_eq!(analysis.trees.len(), 2);
        assert_eq!(analysis.trees[0].method().name, "Good");
        assert_eq!(analysis.trees[0].len(), 2);
        assert_eq!(analysis.trees[1].method().name, "Abstract");
        assert_eq!(analysis.trees[1].len(), 1);
        assert_eq!(analysis.failures.len(), 1);
        assert_eq!(analysis.failures[0].0.name, "Broken");
        assert!(matches!(
            analysis.failures[0].1,
            Error::MalformedScopes { .. }
        ));
    }
}
