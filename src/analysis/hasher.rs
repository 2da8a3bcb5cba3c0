//! Structural hashing of instruction sequences.
//!
//! [`StructuralHasher`] folds instructions into a 64-bit state using FNV-1a sequential mixing
//! with an additional avalanche step. All input is fed as explicit bytes and integers, never
//! through `std::hash::Hash`, so the result is stable across runs and toolchains: the same
//! instruction sequence always produces the same [`ScopeHash`].
//!
//! # What gets hashed
//!
//! Every instruction contributes its opcode (`-1` for labels) followed by the operands that
//! identify it:
//!
//! | instruction | operands |
//! |---|---|
//! | call | owner, name, descriptor, interface flag |
//! | constant | the literal value |
//! | call site | name, descriptor, bootstrap name/owner/kind/descriptor, static arguments |
//! | field | owner, name, descriptor |
//! | immediate | the value |
//! | local | slot (and increment for `iinc`) |
//! | label | ordinal |

use crate::{
    analysis::ScopeHash,
    classfile::{Constant, Handle},
    disassembler::Instruction,
};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// 64-bit finalizer spreading every input bit over the whole output.
///
/// Invalidation keys sum the avalanched hashes of their scopes.
#[must_use]
pub fn avalanche(mut value: u64) -> u64 {
    value ^= value >> 33;
    value = value.wrapping_mul(0xff51_afd7_ed55_8ccd);
    value ^= value >> 33;
    value = value.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    value ^= value >> 33;
    value
}

/// Streaming, order-sensitive hash over instructions
#[derive(Debug, Clone)]
pub struct StructuralHasher {
    state: u64,
}

impl Default for StructuralHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl StructuralHasher {
    /// Create a hasher in its initial state
    #[must_use]
    pub fn new() -> Self {
        StructuralHasher {
            state: FNV_OFFSET_BASIS,
        }
    }

    fn mix(&mut self, value: u64) {
        self.state ^= value;
        self.state = self.state.wrapping_mul(FNV_PRIME);

        self.state ^= self.state >> 33;
        self.state = self.state.wrapping_mul(0xff51_afd7_ed55_8ccd);
        self.state ^= self.state >> 33;
    }

    /// Feed a signed integer
    pub fn write_i64(&mut self, value: i64) {
        self.mix(value as u64);
    }

    /// Feed a boolean
    pub fn write_bool(&mut self, value: bool) {
        self.mix(u64::from(value));
    }

    /// Feed a string, length first so that adjacent strings cannot run into each other
    pub fn write_str(&mut self, value: &str) {
        self.mix(value.len() as u64);
        for chunk in value.as_bytes().chunks(8) {
            let mut bytes = [0u8; 8];
            bytes[..chunk.len()].copy_from_slice(chunk);
            self.mix(u64::from_le_bytes(bytes));
        }
    }

    fn write_handle(&mut self, handle: &Handle) {
        self.write_str(&handle.name);
        self.write_str(&handle.owner);
        self.write_i64(i64::from(handle.kind));
        self.write_str(&handle.descriptor);
    }

    /// Feed a constant value, tagged with its type
    pub fn write_constant(&mut self, constant: &Constant) {
        match constant {
            Constant::Null => self.write_i64(0),
            Constant::Int(value) => {
                self.write_i64(1);
                self.write_i64(i64::from(*value));
            }
            Constant::Float(value) => {
                self.write_i64(2);
                self.write_i64(i64::from(value.to_bits()));
            }
            Constant::Long(value) => {
                self.write_i64(3);
                self.write_i64(*value);
            }
            Constant::Double(value) => {
                self.write_i64(4);
                self.mix(value.to_bits());
            }
            Constant::String(value) => {
                self.write_i64(5);
                self.write_str(value);
            }
            Constant::Class(value) => {
                self.write_i64(6);
                self.write_str(value);
            }
            Constant::MethodType(value) => {
                self.write_i64(7);
                self.write_str(value);
            }
            Constant::MethodHandle(handle) => {
                self.write_i64(8);
                self.write_handle(handle);
                self.write_bool(handle.interface);
            }
            Constant::Dynamic {
                name,
                descriptor,
                bootstrap,
            } => {
                self.write_i64(9);
                self.write_str(name);
                self.write_str(descriptor);
                self.write_handle(bootstrap);
            }
        }
    }

    /// Feed one instruction
    pub fn write_instruction(&mut self, instruction: &Instruction) {
        self.write_i64(i64::from(instruction.opcode()));

        match instruction {
            Instruction::Call { target, .. } => {
                self.write_str(&target.owner);
                self.write_str(&target.name);
                self.write_str(&target.descriptor);
                self.write_bool(target.interface);
            }
            Instruction::Constant { value, .. } => self.write_constant(value),
            Instruction::Dynamic {
                name,
                descriptor,
                bootstrap,
                arguments,
            } => {
                self.write_str(name);
                self.write_str(descriptor);
                self.write_handle(bootstrap);
                for argument in arguments {
                    self.write_constant(argument);
                }
            }
            Instruction::Field { field, .. } => {
                self.write_str(&field.owner);
                self.write_str(&field.name);
                self.write_str(&field.descriptor);
            }
            Instruction::Immediate { value, .. } => self.write_i64(i64::from(*value)),
            Instruction::Local {
                slot, increment, ..
            } => {
                self.write_i64(i64::from(*slot));
                if let Some(increment) = increment {
                    self.write_i64(i64::from(*increment));
                }
            }
            Instruction::Label(label) => self.write_i64(i64::from(label.0)),
            Instruction::Opaque { .. } => {}
        }
    }

    /// The hash of everything fed so far
    #[must_use]
    pub fn finish(&self) -> ScopeHash {
        ScopeHash(self.state)
    }
}
