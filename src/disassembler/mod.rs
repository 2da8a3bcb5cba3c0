//! JVM bytecode disassembler.
//!
//! This module turns the raw bytes of a `Code` attribute into the normalized instruction
//! sequence the scope analysis walks. Every instruction is classified by what its operands
//! reference (calls, constants, call sites, fields, immediates, locals) and branch targets
//! are replaced by label pseudo-instructions so that the sequence no longer depends on
//! absolute byte offsets.
//!
//! # Key Types
//! - [`Instruction`] - A decoded, normalized instruction
//! - [`LabelId`] - Ordinal identity of a branch target within one method
//! - [`DecodedInstruction`] - An instruction with its offset, size and branch targets
//! - [`JvmInstruction`] - Static opcode description (mnemonic and operand layout)
//!
//! # Main Functions
//! - [`decode_code`] - Decode a `Code` attribute, labels included
//! - [`decode_stream`] - Decode raw bytecode linearly
//! - [`decode_instruction`] - Decode a single instruction
//!
//! # Example
//! ```rust
//! use groupscope::classfile::ConstantPool;
//! use groupscope::disassembler::{decode_instruction, Instruction};
//! use groupscope::Parser;
//!
//! let bytecode = &[0x2B, 0xB1]; // aload_1, return
//! let mut parser = Parser::new(bytecode);
//! let decoded = decode_instruction(&mut parser, &ConstantPool::default(), &[])?;
//! assert!(matches!(decoded.instruction, Instruction::Local { slot: 1, .. }));
//! assert_eq!(decoded.instruction.mnemonic(), "aload");
//! # Ok::<(), groupscope::Error>(())
//! ```

mod decoder;
mod instruction;
pub mod instructions;

pub use decoder::{decode_code, decode_instruction, decode_stream, DecodedInstruction};
pub use instruction::{Instruction, LabelId};
pub use instructions::{JvmInstruction, OperandType, INSTRUCTIONS};
