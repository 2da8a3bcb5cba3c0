use std::fmt;

use crate::{
    classfile::{Constant, Handle, MemberRef},
    disassembler::instructions::{self, INVOKEDYNAMIC},
};

/// Identity of a label inside one method: its allocation ordinal.
///
/// Labels are allocated for branch targets and exception table boundaries in ascending
/// offset order, so the first label of a method is `LabelId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabelId(pub u32);

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// One decoded instruction, classified by what its operands reference.
///
/// Opcodes are normalized: implicit-slot forms (`aload_0`) are reported with their base
/// opcode and an explicit slot, and wide variants (`ldc_w`, `ldc2_w`, `goto_w`, `jsr_w`,
/// `wide iload`) with their short form's opcode.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// `invokevirtual`, `invokespecial`, `invokestatic`, `invokeinterface`
    Call {
        /// Invoke opcode
        opcode: u8,
        /// Called method
        target: MemberRef,
    },
    /// `ldc` family and the implicit-constant opcodes (`iconst_<n>`, `aconst_null`, ...)
    Constant {
        /// Pushing opcode
        opcode: u8,
        /// Pushed value
        value: Constant,
    },
    /// `invokedynamic`
    Dynamic {
        /// Invoked name
        name: String,
        /// Call site descriptor
        descriptor: String,
        /// Bootstrap method
        bootstrap: Handle,
        /// Static bootstrap arguments
        arguments: Vec<Constant>,
    },
    /// `getstatic`, `putstatic`, `getfield`, `putfield`
    Field {
        /// Access opcode
        opcode: u8,
        /// Accessed field
        field: MemberRef,
    },
    /// `bipush`, `sipush`, `newarray`
    Immediate {
        /// Opcode
        opcode: u8,
        /// Operand value
        value: i32,
    },
    /// Local variable loads and stores, `iinc` and `ret`
    Local {
        /// Opcode
        opcode: u8,
        /// Local variable slot
        slot: u16,
        /// Increment, only for `iinc`
        increment: Option<i16>,
    },
    /// Branch target or exception table boundary
    Label(LabelId),
    /// Any other instruction, identified by its opcode alone
    Opaque {
        /// Opcode
        opcode: u8,
    },
}

impl Instruction {
    /// Opcode fed to the structural hash; labels report `-1`.
    #[must_use]
    pub fn opcode(&self) -> i32 {
        match self {
            Instruction::Call { opcode, .. }
            | Instruction::Constant { opcode, .. }
            | Instruction::Field { opcode, .. }
            | Instruction::Immediate { opcode, .. }
            | Instruction::Local { opcode, .. }
            | Instruction::Opaque { opcode } => i32::from(*opcode),
            Instruction::Dynamic { .. } => i32::from(INVOKEDYNAMIC),
            Instruction::Label(_) => -1,
        }
    }

    /// Assembler mnemonic of the (normalized) opcode.
    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        match u8::try_from(self.opcode()) {
            Ok(opcode) => instructions::instruction(opcode).map_or("???", |desc| desc.mnemonic),
            Err(_) => "label",
        }
    }

    /// Returns `true` for label pseudo-instructions.
    #[must_use]
    pub fn is_label(&self) -> bool {
        matches!(self, Instruction::Label(_))
    }

    /// Integer pushed by this instruction, if it pushes an `int` literal.
    ///
    /// Covers `iconst_<n>`, `ldc` of an `Integer`, `bipush` and `sipush`.
    #[must_use]
    pub fn int_value(&self) -> Option<i32> {
        match self {
            Instruction::Constant { value, .. } => value.as_int(),
            Instruction::Immediate { opcode, value }
                if *opcode == instructions::BIPUSH || *opcode == instructions::SIPUSH =>
            {
                Some(*value)
            }
            _ => None,
        }
    }

    /// Returns `true` if this instruction only pushes a literal.
    #[must_use]
    pub fn is_constant_load(&self) -> bool {
        match self {
            Instruction::Constant { .. } => true,
            Instruction::Immediate { opcode, .. } => *opcode != instructions::NEWARRAY,
            _ => false,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Call { target, .. } => write!(
                f,
                "{} {}.{}{}",
                self.mnemonic(),
                target.owner,
                target.name,
                target.descriptor
            ),
            Instruction::Field { field, .. } => write!(
                f,
                "{} {}.{}:{}",
                self.mnemonic(),
                field.owner,
                field.name,
                field.descriptor
            ),
            Instruction::Constant { value, .. } => write!(f, "{} {}", self.mnemonic(), value),
            Instruction::Dynamic {
                name,
                descriptor,
                bootstrap,
                ..
            } => write!(f, "invokedynamic {name}{descriptor} [{bootstrap}]"),
            Instruction::Immediate { value, .. } => write!(f, "{} {}", self.mnemonic(), value),
            Instruction::Local {
                slot,
                increment: Some(increment),
                ..
            } => write!(f, "{} {} {}", self.mnemonic(), slot, increment),
            Instruction::Local { slot, .. } => write!(f, "{} {}", self.mnemonic(), slot),
            Instruction::Label(label) => write!(f, "{label}:"),
            Instruction::Opaque { .. } => write!(f, "{}", self.mnemonic()),
        }
    }
}
