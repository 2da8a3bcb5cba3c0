//! JVM bytecode decoding.
//!
//! Decoding happens in two passes. [`decode_stream`] walks the code linearly, normalizes every
//! opcode and resolves its constant pool operands, recording branch targets along the way.
//! [`decode_code`] then allocates labels for the branch targets and the exception table
//! boundaries and interleaves them with the instructions as [`Instruction::Label`]
//! pseudo-instructions. Absolute offsets never leave this module.
//!
//! # Example: Decoding a Stream of Instructions
//!
//! ```rust
//! use groupscope::{classfile::ConstantPool, disassembler::decode_stream};
//!
//! let code = [0x03, 0x57, 0xB1]; // iconst_0, pop, return
//! let decoded = decode_stream(&code, &ConstantPool::default(), &[])?;
//! assert_eq!(decoded.len(), 3);
//! assert_eq!(decoded[2].offset, 2);
//! # Ok::<(), groupscope::Error>(())
//! ```

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    classfile::{
        BootstrapMethodRef, CodeAttribute, Constant, ConstantPool, ConstantPoolEntry,
    },
    disassembler::{
        instructions::{self, OperandType},
        Instruction, LabelId,
    },
    file::parser::Parser,
    Error, Result,
};

/// An instruction together with its position in the code.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedInstruction {
    /// Offset of the opcode byte
    pub offset: u32,
    /// Encoded size including operands and padding
    pub size: u32,
    /// The normalized instruction
    pub instruction: Instruction,
    /// Absolute branch targets (switch defaults included)
    pub targets: Vec<u32>,
}

/// Decode a method's `Code` attribute into its instruction sequence, labels included.
///
/// # Errors
/// Returns [`crate::Error::InvalidOpcode`] for reserved opcodes, [`crate::Error::Malformed`]
/// if a branch or exception boundary does not land on an instruction, and constant pool
/// errors for unresolvable operands.
pub fn decode_code(
    code: &CodeAttribute,
    pool: &ConstantPool,
    bootstrap: &[BootstrapMethodRef],
) -> Result<Vec<Instruction>> {
    let decoded = decode_stream(&code.code, pool, bootstrap)?;
    let code_len = code.code.len() as u32;

    let mut boundaries: BTreeSet<u32> = decoded
        .iter()
        .flat_map(|entry| entry.targets.iter().copied())
        .collect();
    for handler in &code.exception_table {
        boundaries.insert(u32::from(handler.start_pc));
        boundaries.insert(u32::from(handler.end_pc));
        boundaries.insert(u32::from(handler.handler_pc));
    }

    let starts: BTreeSet<u32> = decoded.iter().map(|entry| entry.offset).collect();
    let mut labels = BTreeMap::new();
    for (ordinal, offset) in boundaries.into_iter().enumerate() {
        if offset != code_len && !starts.contains(&offset) {
            return Err(malformed_error!(
                "Label at offset {} is not on an instruction boundary",
                offset
            ));
        }
        labels.insert(offset, LabelId(ordinal as u32));
    }

    let mut instructions = Vec::with_capacity(decoded.len() + labels.len());
    for entry in decoded {
        if let Some(label) = labels.get(&entry.offset) {
            instructions.push(Instruction::Label(*label));
        }
        instructions.push(entry.instruction);
    }
    if let Some(label) = labels.get(&code_len) {
        instructions.push(Instruction::Label(*label));
    }

    Ok(instructions)
}

/// Decode every instruction of `code` in linear order.
///
/// # Errors
/// Returns an error if any instruction fails to decode, see [`decode_instruction`].
pub fn decode_stream(
    code: &[u8],
    pool: &ConstantPool,
    bootstrap: &[BootstrapMethodRef],
) -> Result<Vec<DecodedInstruction>> {
    let mut parser = Parser::new(code);
    let mut decoded = Vec::new();

    while parser.has_more_data() {
        decoded.push(decode_instruction(&mut parser, pool, bootstrap)?);
    }

    Ok(decoded)
}

/// Decode the instruction at the parser's position.
///
/// The parser must span exactly one method's code, since switch padding and branch targets are
/// computed from its positions.
///
/// # Errors
/// Returns [`crate::Error::InvalidOpcode`] for reserved opcodes, [`crate::Error::OutOfBounds`]
/// for truncated operands and [`crate::Error::Malformed`] for branches leaving the code.
pub fn decode_instruction(
    parser: &mut Parser,
    pool: &ConstantPool,
    bootstrap: &[BootstrapMethodRef],
) -> Result<DecodedInstruction> {
    let offset = parser.pos() as u32;
    let opcode = parser.read_be::<u8>()?;
    let Some(desc) = instructions::instruction(opcode) else {
        return Err(Error::InvalidOpcode { opcode, offset });
    };

    let mut targets = Vec::new();
    let instruction = match desc.operand {
        OperandType::None => implicit_operand(opcode),
        OperandType::Byte => Instruction::Immediate {
            opcode,
            value: i32::from(parser.read_be::<i8>()?),
        },
        OperandType::Short => Instruction::Immediate {
            opcode,
            value: i32::from(parser.read_be::<i16>()?),
        },
        OperandType::ArrayType => Instruction::Immediate {
            opcode,
            value: i32::from(parser.read_be::<u8>()?),
        },
        OperandType::ConstantByte => {
            let index = u16::from(parser.read_be::<u8>()?);
            Instruction::Constant {
                opcode: instructions::LDC,
                value: pool.loadable(index, bootstrap)?,
            }
        }
        OperandType::Constant => {
            let index = parser.read_be::<u16>()?;
            Instruction::Constant {
                opcode: instructions::LDC,
                value: pool.loadable(index, bootstrap)?,
            }
        }
        OperandType::Local => Instruction::Local {
            opcode,
            slot: u16::from(parser.read_be::<u8>()?),
            increment: None,
        },
        OperandType::Iinc => Instruction::Local {
            opcode,
            slot: u16::from(parser.read_be::<u8>()?),
            increment: Some(i16::from(parser.read_be::<i8>()?)),
        },
        OperandType::Branch => {
            let delta = i32::from(parser.read_be::<i16>()?);
            targets.push(branch_target(parser, offset, delta)?);
            Instruction::Opaque { opcode }
        }
        OperandType::BranchWide => {
            let delta = parser.read_be::<i32>()?;
            targets.push(branch_target(parser, offset, delta)?);
            Instruction::Opaque {
                opcode: if opcode == instructions::GOTO_W {
                    instructions::GOTO
                } else {
                    instructions::JSR
                },
            }
        }
        OperandType::TableSwitch => {
            parser.align(4)?;
            let default = parser.read_be::<i32>()?;
            let low = parser.read_be::<i32>()?;
            let high = parser.read_be::<i32>()?;
            if high < low {
                return Err(malformed_error!(
                    "tableswitch at {} has high {} below low {}",
                    offset,
                    high,
                    low
                ));
            }
            targets.push(branch_target(parser, offset, default)?);
            for _ in i64::from(low)..=i64::from(high) {
                let delta = parser.read_be::<i32>()?;
                targets.push(branch_target(parser, offset, delta)?);
            }
            Instruction::Opaque { opcode }
        }
        OperandType::LookupSwitch => {
            parser.align(4)?;
            let default = parser.read_be::<i32>()?;
            let pairs = parser.read_be::<i32>()?;
            if pairs < 0 {
                return Err(malformed_error!(
                    "lookupswitch at {} has {} pairs",
                    offset,
                    pairs
                ));
            }
            targets.push(branch_target(parser, offset, default)?);
            for _ in 0..pairs {
                let _match = parser.read_be::<i32>()?;
                let delta = parser.read_be::<i32>()?;
                targets.push(branch_target(parser, offset, delta)?);
            }
            Instruction::Opaque { opcode }
        }
        OperandType::Field => Instruction::Field {
            opcode,
            field: pool.member_ref(parser.read_be::<u16>()?)?,
        },
        OperandType::Method => Instruction::Call {
            opcode,
            target: pool.member_ref(parser.read_be::<u16>()?)?,
        },
        OperandType::InterfaceMethod => {
            let index = parser.read_be::<u16>()?;
            parser.advance_by(2)?;
            Instruction::Call {
                opcode,
                target: pool.member_ref(index)?,
            }
        }
        OperandType::Dynamic => {
            let index = parser.read_be::<u16>()?;
            parser.advance_by(2)?;
            call_site(pool, bootstrap, index)?
        }
        OperandType::Class => {
            parser.advance_by(2)?;
            Instruction::Opaque { opcode }
        }
        OperandType::MultiArray => {
            parser.advance_by(3)?;
            Instruction::Opaque { opcode }
        }
        OperandType::Wide => {
            let widened = parser.read_be::<u8>()?;
            match widened {
                instructions::IINC => Instruction::Local {
                    opcode: widened,
                    slot: parser.read_be::<u16>()?,
                    increment: Some(parser.read_be::<i16>()?),
                },
                instructions::ILOAD..=instructions::ALOAD
                | instructions::ISTORE..=instructions::ASTORE
                | instructions::RET => Instruction::Local {
                    opcode: widened,
                    slot: parser.read_be::<u16>()?,
                    increment: None,
                },
                _ => {
                    return Err(malformed_error!(
                        "wide at {} cannot prefix opcode 0x{:02X}",
                        offset,
                        widened
                    ))
                }
            }
        }
    };

    Ok(DecodedInstruction {
        offset,
        size: parser.pos() as u32 - offset,
        instruction,
        targets,
    })
}

/// Classify an operand-less opcode, expanding the implicit operand it encodes.
fn implicit_operand(opcode: u8) -> Instruction {
    use instructions::{
        ACONST_NULL, ALOAD_3, ASTORE_3, DCONST_0, DCONST_1, FCONST_0, FCONST_2, ICONST_0,
        ICONST_5, ICONST_M1, ILOAD, ILOAD_0, ISTORE, ISTORE_0, LCONST_0, LCONST_1,
    };

    let constant = |value| Instruction::Constant { opcode, value };
    match opcode {
        ACONST_NULL => constant(Constant::Null),
        ICONST_M1..=ICONST_5 => constant(Constant::Int(i32::from(opcode) - i32::from(ICONST_0))),
        LCONST_0..=LCONST_1 => constant(Constant::Long(i64::from(opcode - LCONST_0))),
        FCONST_0..=FCONST_2 => constant(Constant::Float(f32::from(opcode - FCONST_0))),
        DCONST_0..=DCONST_1 => constant(Constant::Double(f64::from(opcode - DCONST_0))),
        ILOAD_0..=ALOAD_3 => Instruction::Local {
            opcode: ILOAD + (opcode - ILOAD_0) / 4,
            slot: u16::from((opcode - ILOAD_0) % 4),
            increment: None,
        },
        ISTORE_0..=ASTORE_3 => Instruction::Local {
            opcode: ISTORE + (opcode - ISTORE_0) / 4,
            slot: u16::from((opcode - ISTORE_0) % 4),
            increment: None,
        },
        _ => Instruction::Opaque { opcode },
    }
}

fn branch_target(parser: &Parser, offset: u32, delta: i32) -> Result<u32> {
    let target = i64::from(offset) + i64::from(delta);
    if target < 0 || target >= parser.len() as i64 {
        return Err(malformed_error!(
            "Branch at {} targets {} outside of {} bytes of code",
            offset,
            target,
            parser.len()
        ));
    }
    Ok(target as u32)
}

fn call_site(
    pool: &ConstantPool,
    bootstrap: &[BootstrapMethodRef],
    index: u16,
) -> Result<Instruction> {
    let ConstantPoolEntry::InvokeDynamic {
        bootstrap_method_attr_index,
        name_and_type_index,
    } = pool.get(index)?
    else {
        return Err(Error::ConstantPool {
            index,
            expected: "InvokeDynamic",
        });
    };

    let Some(method) = bootstrap.get(*bootstrap_method_attr_index as usize) else {
        return Err(malformed_error!(
            "Call site #{} refers to missing bootstrap method #{}",
            index,
            bootstrap_method_attr_index
        ));
    };

    let (name, descriptor) = pool.name_and_type(*name_and_type_index)?;
    let arguments = method
        .arguments
        .iter()
        .map(|argument| pool.loadable(*argument, bootstrap))
        .collect::<Result<Vec<_>>>()?;

    Ok(Instruction::Dynamic {
        name: name.to_string(),
        descriptor: descriptor.to_string(),
        bootstrap: pool.method_handle(method.method_ref)?,
        arguments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classfile::{ExceptionHandler, MemberRef},
        disassembler::instructions::*,
    };

    fn pool() -> ConstantPool {
        let bytes = [
            0x00, 0x0A, // count
            0x01, 0x00, 0x03, b'A', b'p', b'p', // #1 Utf8 "App"
            0x07, 0x00, 0x01, // #2 Class #1
            0x01, 0x00, 0x03, b'r', b'u', b'n', // #3 Utf8 "run"
            0x01, 0x00, 0x03, b'(', b')', b'V', // #4 Utf8 "()V"
            0x0C, 0x00, 0x03, 0x00, 0x04, // #5 NameAndType
            0x0A, 0x00, 0x02, 0x00, 0x05, // #6 Methodref App.run()V
            0x09, 0x00, 0x02, 0x00, 0x05, // #7 Fieldref
            0x03, 0x00, 0x00, 0x07, 0x6E, // #8 Integer 1902
            0x08, 0x00, 0x03, // #9 String "run"
        ];
        let mut parser = Parser::new(&bytes);
        let count = parser.read_be::<u16>().unwrap();
        ConstantPool::parse(&mut parser, count).unwrap()
    }

    fn code(bytes: &[u8], exception_table: Vec<ExceptionHandler>) -> CodeAttribute {
        CodeAttribute {
            max_stack: 4,
            max_locals: 4,
            code: bytes.to_vec(),
            exception_table,
            attributes: Vec::new(),
        }
    }

    fn run() -> MemberRef {
        MemberRef {
            owner: "App".to_string(),
            name: "run".to_string(),
            descriptor: "()V".to_string(),
            interface: false,
        }
    }

    #[test]
    fn decode_call_and_locals() {
        let instructions =
            decode_code(&code(&[0x2A, 0xB8, 0x00, 0x06, 0xB1], vec![]), &pool(), &[]).unwrap();

        assert_eq!(
            instructions,
            vec![
                Instruction::Local {
                    opcode: ALOAD,
                    slot: 0,
                    increment: None
                },
                Instruction::Call {
                    opcode: INVOKESTATIC,
                    target: run()
                },
                Instruction::Opaque { opcode: RETURN },
            ]
        );
    }

    #[test]
    fn decode_folds_local_short_and_wide_forms() {
        let bytes = [
            0x1B, // iload_1
            0x15, 0x01, // iload 1
            0xC4, 0x15, 0x00, 0x01, // wide iload 1
            0x04, // iconst_1
            0x12, 0x08, // ldc #8
            0xB1,
        ];
        let instructions = decode_code(&code(&bytes, vec![]), &pool(), &[]).unwrap();

        let iload = Instruction::Local {
            opcode: ILOAD,
            slot: 1,
            increment: None,
        };
        assert_eq!(instructions[..3], [iload.clone(), iload.clone(), iload]);

        // implicit constants keep their own opcode
        assert_eq!(
            instructions[3],
            Instruction::Constant {
                opcode: ICONST_1,
                value: Constant::Int(1)
            }
        );
        assert_eq!(instructions[4].opcode(), i32::from(LDC));
    }

    #[test]
    fn decode_constants() {
        let bytes = [
            0x02, // iconst_m1
            0x10, 0xF9, // bipush -7
            0x11, 0x07, 0x6E, // sipush 1902
            0x12, 0x08, // ldc #8
            0x13, 0x00, 0x09, // ldc_w #9
            0xB2, 0x00, 0x07, // getstatic #7
            0xB1,
        ];
        let instructions = decode_code(&code(&bytes, vec![]), &pool(), &[]).unwrap();

        assert_eq!(
            instructions[0],
            Instruction::Constant {
                opcode: ICONST_M1,
                value: Constant::Int(-1)
            }
        );
        assert_eq!(instructions[1].int_value(), Some(-7));
        assert_eq!(instructions[2].int_value(), Some(1902));
        assert_eq!(
            instructions[3],
            Instruction::Constant {
                opcode: LDC,
                value: Constant::Int(1902)
            }
        );
        assert_eq!(
            instructions[4],
            Instruction::Constant {
                opcode: LDC,
                value: Constant::String("run".to_string())
            }
        );
        assert!(matches!(
            &instructions[5],
            Instruction::Field { opcode: GETSTATIC, field } if field.name == "run"
        ));
    }

    #[test]
    fn decode_branch_labels() {
        let bytes = [
            0x03, // 0: iconst_0
            0x99, 0x00, 0x06, // 1: ifeq 7
            0xA7, 0x00, 0x04, // 4: goto 8
            0x00, // 7: nop
            0xB1, // 8: return
        ];
        let instructions = decode_code(&code(&bytes, vec![]), &pool(), &[]).unwrap();

        assert_eq!(
            instructions[1..],
            [
                Instruction::Opaque { opcode: IFEQ },
                Instruction::Opaque { opcode: GOTO },
                Instruction::Label(LabelId(0)),
                Instruction::Opaque { opcode: NOP },
                Instruction::Label(LabelId(1)),
                Instruction::Opaque { opcode: RETURN },
            ]
        );
    }

    #[test]
    fn decode_exception_labels() {
        let handler = ExceptionHandler {
            start_pc: 0,
            end_pc: 3,
            handler_pc: 2,
            catch_type: 0,
        };
        let instructions =
            decode_code(&code(&[0x00, 0x00, 0xB1], vec![handler]), &pool(), &[]).unwrap();

        assert_eq!(
            instructions,
            vec![
                Instruction::Label(LabelId(0)),
                Instruction::Opaque { opcode: NOP },
                Instruction::Opaque { opcode: NOP },
                Instruction::Label(LabelId(1)),
                Instruction::Opaque { opcode: RETURN },
                Instruction::Label(LabelId(2)),
            ]
        );
    }

    #[test]
    fn decode_tableswitch() {
        let bytes = [
            0x1A, // 0: iload_0
            0xAA, 0x00, 0x00, // 1: tableswitch + padding
            0x00, 0x00, 0x00, 0x17, // default -> 24
            0x00, 0x00, 0x00, 0x00, // low
            0x00, 0x00, 0x00, 0x01, // high
            0x00, 0x00, 0x00, 0x17, // 0 -> 24
            0x00, 0x00, 0x00, 0x18, // 1 -> 25
            0x00, // 24: nop
            0xB1, // 25: return
        ];
        let decoded = decode_stream(&bytes, &pool(), &[]).unwrap();
        assert_eq!(decoded[1].size, 23);
        assert_eq!(decoded[1].targets, vec![24, 24, 25]);

        let instructions = decode_code(&code(&bytes, vec![]), &pool(), &[]).unwrap();
        assert_eq!(
            instructions,
            vec![
                Instruction::Local {
                    opcode: ILOAD,
                    slot: 0,
                    increment: None
                },
                Instruction::Opaque {
                    opcode: TABLESWITCH
                },
                Instruction::Label(LabelId(0)),
                Instruction::Opaque { opcode: NOP },
                Instruction::Label(LabelId(1)),
                Instruction::Opaque { opcode: RETURN },
            ]
        );
    }

    #[test]
    fn decode_wide_iinc() {
        let bytes = [0xC4, 0x84, 0x01, 0x00, 0xFF, 0xFE, 0xB1];
        let decoded = decode_stream(&bytes, &pool(), &[]).unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].size, 6);
        assert_eq!(
            decoded[0].instruction,
            Instruction::Local {
                opcode: IINC,
                slot: 256,
                increment: Some(-2)
            }
        );
    }

    #[test]
    fn decode_goto_w_is_normalized() {
        let bytes = [0xC8, 0x00, 0x00, 0x00, 0x05, 0xB1];
        let instructions = decode_code(&code(&bytes, vec![]), &pool(), &[]).unwrap();

        assert_eq!(instructions[0], Instruction::Opaque { opcode: GOTO });
        assert_eq!(instructions[1], Instruction::Label(LabelId(0)));
    }

    #[test]
    fn decode_invalid_opcode() {
        let result = decode_stream(&[0x00, 0xCB], &pool(), &[]);
        assert!(matches!(
            result,
            Err(Error::InvalidOpcode {
                opcode: 0xCB,
                offset: 1
            })
        ));
    }

    #[test]
    fn decode_branch_into_operand() {
        // goto 4 lands inside the operand of sipush
        let bytes = [0xA7, 0x00, 0x04, 0x11, 0x00, 0x01, 0xB1];
        let result = decode_code(&code(&bytes, vec![]), &pool(), &[]);
        assert!(matches!(result, Err(Error::Malformed { .. })));
    }

    #[test]
    fn decode_truncated_operand() {
        let result = decode_stream(&[0xB8, 0x00], &pool(), &[]);
        assert!(matches!(result, Err(Error::OutOfBounds)));
    }

    #[test]
    fn decode_wrong_constant_kind() {
        // invokestatic #8 points at an Integer
        let result = decode_stream(&[0xB8, 0x00, 0x08], &pool(), &[]);
        assert!(matches!(result, Err(Error::ConstantPool { index: 8, .. })));
    }
}
