use crate::{
    classfile::{CodeBuilder, MemberRef},
    config::{AnalysisConfig, COMPOSER, COMPOSER_KT},
    disassembler::{
        instructions::{INVOKEINTERFACE, INVOKESTATIC},
        Instruction,
    },
};

/// Descriptor of a composable without parameters: `(Composer, changed: Int)`
pub const COMPOSABLE: &str = "(Landroidx/compose/runtime/Composer;I)V";

/// Local slot holding the `Composer` in a static composable
pub const COMPOSER_SLOT: u16 = 0;

fn marker_descriptor(owner: &str, name: &str) -> String {
    AnalysisConfig::default()
        .markers
        .into_iter()
        .find(|marker| marker.owner == owner && marker.name == name)
        .map(|marker| marker.descriptor)
        .unwrap_or_else(|| panic!("{owner}.{name} is not a marker"))
}

// Helper function to create the decoded form of a marker call
pub fn compose_call(owner: &str, name: &str) -> Instruction {
    let interface = owner == COMPOSER;
    Instruction::Call {
        opcode: if interface {
            INVOKEINTERFACE
        } else {
            INVOKESTATIC
        },
        target: MemberRef {
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: marker_descriptor(owner, name),
            interface,
        },
    }
}

// Helper function to emit `startRestartGroup(key)` ... `endRestartGroup()` around `body`
pub fn restart_group<F>(code: &mut CodeBuilder, key: i32, body: F)
where
    F: FnOnce(&mut CodeBuilder),
{
    code.aload(COMPOSER_SLOT)
        .iconst(key)
        .invokeinterface(
            COMPOSER,
            "startRestartGroup",
            &marker_descriptor(COMPOSER, "startRestartGroup"),
        )
        .astore(COMPOSER_SLOT);
    body(code);
    code.aload(COMPOSER_SLOT)
        .invokeinterface(
            COMPOSER,
            "endRestartGroup",
            &marker_descriptor(COMPOSER, "endRestartGroup"),
        )
        .pop();
}

// Helper function to emit `startReplaceGroup(key)` ... `endReplaceGroup()` around `body`
pub fn replace_group<F>(code: &mut CodeBuilder, key: i32, body: F)
where
    F: FnOnce(&mut CodeBuilder),
{
    code.aload(COMPOSER_SLOT).iconst(key).invokeinterface(
        COMPOSER,
        "startReplaceGroup",
        "(I)V",
    );
    body(code);
    code.aload(COMPOSER_SLOT)
        .invokeinterface(COMPOSER, "endReplaceGroup", "()V");
}

// Helper function to emit a source information marker around `body`
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
            &marker_descriptor(COMPOSER_KT, "sourceInformationMarkerStart"),
        );
    body(code);
    code.aload(COMPOSER_SLOT).invokestatic(
        COMPOSER_KT,
        "sourceInformationMarkerEnd",
        &marker_descriptor(COMPOSER_KT, "sourceInformationMarkerEnd"),
    );
}
