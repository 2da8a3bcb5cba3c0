//! Helpers emitting the group patterns of the Compose compiler.

#![allow(dead_code)]

use groupscope::{
    config::{COMPOSER, COMPOSER_KT, FUNCTION_KEY_META},
    prelude::*,
};

/// Descriptor of a composable without parameters
pub const COMPOSABLE: &str = "(Landroidx/compose/runtime/Composer;I)V";

const COMPOSER_SLOT: u16 = 0;

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn restart_group<F>(code: &mut CodeBuilder, key: i32, body: F)
where
    F: FnOnce(&mut CodeBuilder),
{
    code.aload(COMPOSER_SLOT)
        .iconst(key)
        .invokeinterface(
            COMPOSER,
            "startRestartGroup",
            "(I)Landroidx/compose/runtime/Composer;",
        )
        .astore(COMPOSER_SLOT);
    body(code);
    code.aload(COMPOSER_SLOT)
        .invokeinterface(
            COMPOSER,
            "endRestartGroup",
            "()Landroidx/compose/runtime/ScopeUpdateScope;",
        )
        .pop();
}

pub fn replace_group<F>(code: &mut CodeBuilder, key: i32, body: F)
where
    F: FnOnce(&mut CodeBuilder),
{
    code.aload(COMPOSER_SLOT)
        .iconst(key)
        .invokeinterface(COMPOSER, "startReplaceGroup", "(I)V");
    body(code);
    code.aload(COMPOSER_SLOT)
        .invokeinterface(COMPOSER, "endReplaceGroup", "()V");
}

pub fn source_marker<F>(code: &mut CodeBuilder, key: i32, info: &str, body: F)
where
    F: FnOnce(&mut CodeBuilder),
{
    code.aload(COMPOSER_SLOT)
        .iconst(key)
        .ldc_string(info)
        .invokestatic(
            COMPOSER_KT,
            "sourceInformationMarkerStart",
            "(Landroidx/compose/runtime/Composer;ILjava/lang/String;)V",
        );
    body(code);
    code.aload(COMPOSER_SLOT).invokestatic(
        COMPOSER_KT,
        "sourceInformationMarkerEnd",
        "(Landroidx/compose/runtime/Composer;)V",
    );
}

/// A static helper `name()I` returning `value`
pub fn helper(class: ClassBuilder, name: &str, value: i32) -> ClassBuilder {
    class.method(name, "()I", |method| {
        method.code(|code| {
            code.iconst(value).ireturn();
        })
    })
}

/// A composable annotated with function key `key`
pub fn composable<F>(class: ClassBuilder, name: &str, key: i32, body: F) -> ClassBuilder
where
    F: FnOnce(&mut CodeBuilder),
{
    class.method(name, COMPOSABLE, |method| {
        method.function_key(FUNCTION_KEY_META, key).code(|code| {
            body(code);
            code.return_void();
        })
    })
}

/// Analyze `bytes` with the default configuration
pub fn snapshot(bytes: &[u8]) -> Result<Snapshot> {
    let class = ClassUnit::parse(bytes)?;
    Ok(analyze_class(&class, &AnalysisConfig::default())
        .trees
        .into_iter()
        .collect())
}

pub fn keys(invalidations: &[Invalidation]) -> Vec<(i32, InvalidationReason)> {
    invalidations
        .iter()
        .map(|entry| (entry.key.0, entry.reason))
        .collect()
}
