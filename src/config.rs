//! Analysis configuration
//!
//! This module describes which classes the analysis looks at, which call targets count as
//! dependencies, and which calls demarcate groups. The defaults match the Compose runtime;
//! other runtimes with the same start/end group pattern can be described by swapping the
//! marker table.

use crate::analysis::ScopeKind;

/// Internal name of the Compose `Composer` interface.
pub const COMPOSER: &str = "androidx/compose/runtime/Composer";
/// Internal name of the file facade holding the source information markers.
pub const COMPOSER_KT: &str = "androidx/compose/runtime/ComposerKt";
/// Descriptor of the annotation the Compose compiler puts on every composable.
pub const FUNCTION_KEY_META: &str = "Landroidx/compose/runtime/internal/FunctionKeyMeta;";
/// Bootstrap class of lambda call sites.
pub const LAMBDA_METAFACTORY: &str = "java/lang/invoke/LambdaMetafactory";

/// What a marker call does to the scope stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerAction {
    /// Open a scope of the given kind
    Enter(ScopeKind),
    /// Close the innermost open scope of the given kind
    Exit(ScopeKind),
}

/// A call signature recognized as a group marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerSignature {
    /// Internal name of the declaring class
    pub owner: String,
    /// Method name
    pub name: String,
    /// Method descriptor
    pub descriptor: String,
    /// Effect on the scope stack
    pub action: MarkerAction,
}

impl MarkerSignature {
    /// Create a marker signature.
    pub fn new(owner: &str, name: &str, descriptor: &str, action: MarkerAction) -> Self {
        MarkerSignature {
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            action,
        }
    }
}

/// A bootstrap method whose call sites create closures.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LambdaBootstrap {
    /// Internal name of the bootstrap class
    pub owner: String,
    /// Bootstrap method name
    pub name: String,
}

/// Configuration for scope analysis
///
/// Presets:
/// - [`AnalysisConfig::default`] / [`AnalysisConfig::compose`]: Compose runtime markers with
///   the JDK, Kotlin and AndroidX namespaces excluded
/// - [`AnalysisConfig::permissive`]: the same markers without any exclusion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Classes whose internal name starts with one of these prefixes are not analyzed
    pub excluded_class_prefixes: Vec<String>,

    /// Calls into classes with one of these prefixes are not recorded as dependencies
    pub excluded_dependency_prefixes: Vec<String>,

    /// Calls that open and close scopes
    pub markers: Vec<MarkerSignature>,

    /// Bootstraps whose second static argument names the lambda body
    pub lambda_bootstraps: Vec<LambdaBootstrap>,

    /// Descriptor of the annotation carrying a method's own group key in its `key` element
    pub function_key_annotation: String,

    /// Maximum number of simultaneously open scopes before a method is rejected (default: 256)
    pub max_scope_depth: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            excluded_class_prefixes: to_strings(&[
                "java/", "javax/", "jdk/", "sun/", "kotlin/", "kotlinx/", "androidx/",
            ]),
            excluded_dependency_prefixes: to_strings(&[
                "androidx/compose/",
                "android/",
                "java/",
                "kotlin/",
            ]),
            markers: compose_markers(),
            lambda_bootstraps: vec![
                LambdaBootstrap {
                    owner: LAMBDA_METAFACTORY.to_string(),
                    name: "metafactory".to_string(),
                },
                LambdaBootstrap {
                    owner: LAMBDA_METAFACTORY.to_string(),
                    name: "altMetafactory".to_string(),
                },
            ],
            function_key_annotation: FUNCTION_KEY_META.to_string(),
            max_scope_depth: 256,
        }
    }
}

impl AnalysisConfig {
    /// Configuration for Compose applications, identical to the default
    #[must_use]
    pub fn compose() -> Self {
        Self::default()
    }

    /// Compose markers without namespace exclusions
    ///
    /// Analyzes every class and records every call as a dependency, including calls into the
    /// JDK and the Compose runtime itself.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            excluded_class_prefixes: Vec::new(),
            excluded_dependency_prefixes: Vec::new(),
            ..Self::default()
        }
    }

    /// Returns `true` if the class with internal name `class` is not analyzed
    #[must_use]
    pub fn is_class_excluded(&self, class: &str) -> bool {
        self.excluded_class_prefixes
            .iter()
            .any(|prefix| class.starts_with(prefix.as_str()))
    }

    /// Returns `true` if calls into `owner` are not dependencies
    #[must_use]
    pub fn is_dependency_excluded(&self, owner: &str) -> bool {
        self.excluded_dependency_prefixes
            .iter()
            .any(|prefix| owner.starts_with(prefix.as_str()))
    }

    /// Returns `true` if `owner.name` is one of the closure-creating bootstraps
    #[must_use]
    pub fn is_lambda_bootstrap(&self, owner: &str, name: &str) -> bool {
        self.lambda_bootstraps
            .iter()
            .any(|bootstrap| bootstrap.owner == owner && bootstrap.name == name)
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

fn compose_markers() -> Vec<MarkerSignature> {
    use MarkerAction::{Enter, Exit};
    use ScopeKind::{MarkerScope, ReplaceScope, RestartScope};

    vec![
        MarkerSignature::new(
            COMPOSER,
            "startRestartGroup",
            "(I)Landroidx/compose/runtime/Composer;",
            Enter(RestartScope),
        ),
        MarkerSignature::new(
            COMPOSER,
            "endRestartGroup",
            "()Landroidx/compose/runtime/ScopeUpdateScope;",
            Exit(RestartScope),
        ),
        MarkerSignature::new(COMPOSER, "startReplaceGroup", "(I)V", Enter(ReplaceScope)),
        MarkerSignature::new(COMPOSER, "endReplaceGroup", "()V", Exit(ReplaceScope)),
        MarkerSignature::new(COMPOSER, "startReplaceableGroup", "(I)V", Enter(ReplaceScope)),
        MarkerSignature::new(COMPOSER, "endReplaceableGroup", "()V", Exit(ReplaceScope)),
        MarkerSignature::new(
            COMPOSER_KT,
            "sourceInformationMarkerStart",
            "(Landroidx/compose/runtime/Composer;ILjava/lang/String;)V",
            Enter(MarkerScope),
        ),
        MarkerSignature::new(
            COMPOSER_KT,
            "sourceInformationMarkerEnd",
            "(Landroidx/compose/runtime/Composer;)V",
            Exit(MarkerScope),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AnalysisConfig::default();

        assert_eq!(config.markers.len(), 8);
        assert_eq!(config.max_scope_depth, 256);
        assert_eq!(config, AnalysisConfig::compose());
    }

    #[test]
    fn class_exclusion() {
        let config = AnalysisConfig::default();

        assert!(config.is_class_excluded("kotlin/jvm/internal/Intrinsics"));
        assert!(config.is_class_excluded("androidx/compose/runtime/ComposerImpl"));
        assert!(!config.is_class_excluded("com/example/AppKt"));
        assert!(!config.is_class_excluded("javafx/Stage"));
    }

    #[test]
    fn dependency_exclusion() {
        let config = AnalysisConfig::default();

        assert!(config.is_dependency_excluded("androidx/compose/runtime/ComposerKt"));
        assert!(config.is_dependency_excluded("android/util/Log"));
        assert!(!config.is_dependency_excluded("androidx/lifecycle/ViewModel"));
        assert!(!config.is_dependency_excluded("com/example/HelperKt"));
    }

    #[test]
    fn permissive_config() {
        let config = AnalysisConfig::permissive();

        assert!(!config.is_class_excluded("java/lang/String"));
        assert!(!config.is_dependency_excluded("kotlin/io/ConsoleKt"));
        assert_eq!(config.markers, AnalysisConfig::default().markers);
    }

    #[test]
    fn lambda_bootstraps() {
        let config = AnalysisConfig::default();

        assert!(config.is_lambda_bootstrap(LAMBDA_METAFACTORY, "metafactory"));
        assert!(config.is_lambda_bootstrap(LAMBDA_METAFACTORY, "altMetafactory"));
        assert!(!config.is_lambda_bootstrap(
            "java/lang/invoke/StringConcatFactory",
            "makeConcatWithConstants"
        ));
    }
}
