//! Method dependencies.
//!
//! A scope depends on another method when it calls it statically or when it creates a lambda
//! whose body is that method. Virtual and interface calls are not followed: their target is
//! not known statically, and the Compose compiler emits composable calls as static calls.

use crate::{
    classfile::{Constant, MethodId},
    config::AnalysisConfig,
    disassembler::{instructions::INVOKESTATIC, Instruction},
};

/// Recognizes instructions that reference other methods.
#[derive(Debug, Clone, Copy)]
pub struct DependencyAnalyzer<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> DependencyAnalyzer<'a> {
    /// Create an analyzer using the exclusion and bootstrap settings of `config`.
    #[must_use]
    pub fn new(config: &'a AnalysisConfig) -> Self {
        DependencyAnalyzer { config }
    }

    /// The method `instruction` depends on, if any.
    ///
    /// - `invokestatic` of a method outside the excluded dependency namespaces
    /// - `invokedynamic` bootstrapped by a lambda metafactory: the implementation method named
    ///   by the second static argument
    #[must_use]
    pub fn analyze(&self, instruction: &Instruction) -> Option<MethodId> {
        match instruction {
            Instruction::Call { opcode, target }
                if *opcode == INVOKESTATIC && !self.config.is_dependency_excluded(&target.owner) =>
            {
                Some(MethodId::new(
                    target.owner.as_str(),
                    target.name.as_str(),
                    target.descriptor.as_str(),
                ))
            }
            Instruction::Dynamic {
                bootstrap,
                arguments,
                ..
            } if self
                .config
                .is_lambda_bootstrap(&bootstrap.owner, &bootstrap.name) =>
            {
                match arguments.get(1) {
                    Some(Constant::MethodHandle(handle)) => Some(MethodId::new(
                        handle.owner.as_str(),
                        handle.name.as_str(),
                        handle.descriptor.as_str(),
                    )),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classfile::{Handle, MemberRef},
        config::LAMBDA_METAFACTORY,
        disassembler::instructions::{INVOKEINTERFACE, INVOKEVIRTUAL},
    };

    fn call(opcode: u8, owner: &str, name: &str) -> Instruction {
        Instruction::Call {
            opcode,
            target: MemberRef {
                owner: owner.to_string(),
                name: name.to_string(),
                descriptor: "()V".to_string(),
                interface: opcode == INVOKEINTERFACE,
            },
        }
    }

    fn handle(owner: &str, name: &str) -> Handle {
        Handle {
            kind: 6,
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: "()V".to_string(),
            interface: false,
        }
    }

    fn lambda(factory: &str, arguments: Vec<Constant>) -> Instruction {
        Instruction::Dynamic {
            name: "invoke".to_string(),
            descriptor: "()Lkotlin/jvm/functions/Function0;".to_string(),
            bootstrap: handle(LAMBDA_METAFACTORY, factory),
            arguments,
        }
    }

    #[test]
    fn static_calls() {
        let config = AnalysisConfig::default();
        let analyzer = DependencyAnalyzer::new(&config);

        assert_eq!(
            analyzer.analyze(&call(INVOKESTATIC, "com/example/AppKt", "helper")),
            Some(MethodId::new("com/example/AppKt", "helper", "()V"))
        );
        assert_eq!(
            analyzer.analyze(&call(INVOKEVIRTUAL, "com/example/App", "helper")),
            None
        );
        assert_eq!(
            analyzer.analyze(&call(INVOKESTATIC, "kotlin/io/ConsoleKt", "println")),
            None
        );
        assert_eq!(
            analyzer.analyze(&call(
                INVOKESTATIC,
                "androidx/compose/runtime/ComposerKt",
                "sourceInformation"
            )),
            None
        );
    }

    #[test]
    fn lambda_bodies() {
        let config = AnalysisConfig::default();
        let analyzer = DependencyAnalyzer::new(&config);
        let arguments = vec![
            Constant::MethodType("()Ljava/lang/Object;".to_string()),
            Constant::MethodHandle(handle("com/example/AppKt", "App$lambda$0")),
            Constant::MethodType("()Lkotlin/Unit;".to_string()),
        ];

        assert_eq!(
            analyzer.analyze(&lambda("metafactory", arguments.clone())),
            Some(MethodId::new("com/example/AppKt", "App$lambda$0", "()V"))
        );
        assert_eq!(
            analyzer.analyze(&lambda("altMetafactory", arguments.clone())),
            Some(MethodId::new("com/example/AppKt", "App$lambda$0", "()V"))
        );
        assert_eq!(analyzer.analyze(&lambda("other", arguments)), None);
        assert_eq!(
            analyzer.analyze(&lambda("metafactory", vec![Constant::Int(1)])),
            None
        );
    }
}
