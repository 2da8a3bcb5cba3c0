//! JVM opcode table.
//!
//! [`INSTRUCTIONS`] is indexed by opcode and describes the mnemonic and the operand layout of
//! every instruction defined by the JVM specification (§6.5). Opcodes past `jsr_w` (0xC9) are
//! reserved and rejected by the decoder.

/// How the operand bytes following an opcode are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandType {
    /// No operands
    None,
    /// Signed byte immediate (`bipush`)
    Byte,
    /// Signed short immediate (`sipush`)
    Short,
    /// `u1` constant pool index (`ldc`)
    ConstantByte,
    /// `u2` constant pool index of a loadable constant
    Constant,
    /// `u1` local variable slot (`u2` under `wide`)
    Local,
    /// Local slot and signed increment (`iinc`)
    Iinc,
    /// Signed 16-bit branch offset
    Branch,
    /// Signed 32-bit branch offset
    BranchWide,
    /// Padded jump table
    TableSwitch,
    /// Padded match/offset pairs
    LookupSwitch,
    /// `u2` field reference
    Field,
    /// `u2` method reference
    Method,
    /// `u2` interface method reference, count byte and a zero byte
    InterfaceMethod,
    /// `u2` call site reference and two zero bytes
    Dynamic,
    /// `u2` class reference
    Class,
    /// `u1` primitive array type (`newarray`)
    ArrayType,
    /// `u2` class reference and `u1` dimension count
    MultiArray,
    /// Prefix widening the operands of the next instruction
    Wide,
}

/// Static description of one opcode.
#[derive(Debug, Clone, Copy)]
pub struct JvmInstruction {
    /// Assembler mnemonic
    pub mnemonic: &'static str,
    /// Operand layout
    pub operand: OperandType,
}

/// `nop`
pub const NOP: u8 = 0x00;
/// `aconst_null`
pub const ACONST_NULL: u8 = 0x01;
/// `iconst_m1`
pub const ICONST_M1: u8 = 0x02;
/// `iconst_0`
pub const ICONST_0: u8 = 0x03;
/// `iconst_1`
pub const ICONST_1: u8 = 0x04;
/// `iconst_2`
pub const ICONST_2: u8 = 0x05;
/// `iconst_3`
pub const ICONST_3: u8 = 0x06;
/// `iconst_4`
pub const ICONST_4: u8 = 0x07;
/// `iconst_5`
pub const ICONST_5: u8 = 0x08;
/// `lconst_0`
pub const LCONST_0: u8 = 0x09;
/// `lconst_1`
pub const LCONST_1: u8 = 0x0A;
/// `fconst_0`
pub const FCONST_0: u8 = 0x0B;
/// `fconst_1`
pub const FCONST_1: u8 = 0x0C;
/// `fconst_2`
pub const FCONST_2: u8 = 0x0D;
/// `dconst_0`
pub const DCONST_0: u8 = 0x0E;
/// `dconst_1`
pub const DCONST_1: u8 = 0x0F;
/// `bipush`
pub const BIPUSH: u8 = 0x10;
/// `sipush`
pub const SIPUSH: u8 = 0x11;
/// `ldc`
pub const LDC: u8 = 0x12;
/// `ldc_w`
pub const LDC_W: u8 = 0x13;
/// `ldc2_w`
pub const LDC2_W: u8 = 0x14;
/// `iload`
pub const ILOAD: u8 = 0x15;
/// `lload`
pub const LLOAD: u8 = 0x16;
/// `fload`
pub const FLOAD: u8 = 0x17;
/// `dload`
pub const DLOAD: u8 = 0x18;
/// `aload`
pub const ALOAD: u8 = 0x19;
/// `iload_0`
pub const ILOAD_0: u8 = 0x1A;
/// `iload_1`
pub const ILOAD_1: u8 = 0x1B;
/// `iload_2`
pub const ILOAD_2: u8 = 0x1C;
/// `iload_3`
pub const ILOAD_3: u8 = 0x1D;
/// `lload_0`
pub const LLOAD_0: u8 = 0x1E;
/// `lload_1`
pub const LLOAD_1: u8 = 0x1F;
/// `lload_2`
pub const LLOAD_2: u8 = 0x20;
/// `lload_3`
pub const LLOAD_3: u8 = 0x21;
/// `fload_0`
pub const FLOAD_0: u8 = 0x22;
/// `fload_1`
pub const FLOAD_1: u8 = 0x23;
/// `fload_2`
pub const FLOAD_2: u8 = 0x24;
/// `fload_3`
pub const FLOAD_3: u8 = 0x25;
/// `dload_0`
pub const DLOAD_0: u8 = 0x26;
/// `dload_1`
pub const DLOAD_1: u8 = 0x27;
/// `dload_2`
pub const DLOAD_2: u8 = 0x28;
/// `dload_3`
pub const DLOAD_3: u8 = 0x29;
/// `aload_0`
pub const ALOAD_0: u8 = 0x2A;
/// `aload_1`
pub const ALOAD_1: u8 = 0x2B;
/// `aload_2`
pub const ALOAD_2: u8 = 0x2C;
/// `aload_3`
pub const ALOAD_3: u8 = 0x2D;
/// `iaload`
pub const IALOAD: u8 = 0x2E;
/// `laload`
pub const LALOAD: u8 = 0x2F;
/// `faload`
pub const FALOAD: u8 = 0x30;
/// `daload`
pub const DALOAD: u8 = 0x31;
/// `aaload`
pub const AALOAD: u8 = 0x32;
/// `baload`
pub const BALOAD: u8 = 0x33;
/// `caload`
pub const CALOAD: u8 = 0x34;
/// `saload`
pub const SALOAD: u8 = 0x35;
/// `istore`
pub const ISTORE: u8 = 0x36;
/// `lstore`
pub const LSTORE: u8 = 0x37;
/// `fstore`
pub const FSTORE: u8 = 0x38;
/// `dstore`
pub const DSTORE: u8 = 0x39;
/// `astore`
pub const ASTORE: u8 = 0x3A;
/// `istore_0`
pub const ISTORE_0: u8 = 0x3B;
/// `istore_1`
pub const ISTORE_1: u8 = 0x3C;
/// `istore_2`
pub const ISTORE_2: u8 = 0x3D;
/// `istore_3`
pub const ISTORE_3: u8 = 0x3E;
/// `lstore_0`
pub const LSTORE_0: u8 = 0x3F;
/// `lstore_1`
pub const LSTORE_1: u8 = 0x40;
/// `lstore_2`
pub const LSTORE_2: u8 = 0x41;
/// `lstore_3`
pub const LSTORE_3: u8 = 0x42;
/// `fstore_0`
pub const FSTORE_0: u8 = 0x43;
/// `fstore_1`
pub const FSTORE_1: u8 = 0x44;
/// `fstore_2`
pub const FSTORE_2: u8 = 0x45;
/// `fstore_3`
pub const FSTORE_3: u8 = 0x46;
/// `dstore_0`
pub const DSTORE_0: u8 = 0x47;
/// `dstore_1`
pub const DSTORE_1: u8 = 0x48;
/// `dstore_2`
pub const DSTORE_2: u8 = 0x49;
/// `dstore_3`
pub const DSTORE_3: u8 = 0x4A;
/// `astore_0`
pub const ASTORE_0: u8 = 0x4B;
/// `astore_1`
pub const ASTORE_1: u8 = 0x4C;
/// `astore_2`
pub const ASTORE_2: u8 = 0x4D;
/// `astore_3`
pub const ASTORE_3: u8 = 0x4E;
/// `iastore`
pub const IASTORE: u8 = 0x4F;
/// `lastore`
pub const LASTORE: u8 = 0x50;
/// `fastore`
pub const FASTORE: u8 = 0x51;
/// `dastore`
pub const DASTORE: u8 = 0x52;
/// `aastore`
pub const AASTORE: u8 = 0x53;
/// `bastore`
pub const BASTORE: u8 = 0x54;
/// `castore`
pub const CASTORE: u8 = 0x55;
/// `sastore`
pub const SASTORE: u8 = 0x56;
/// `pop`
pub const POP: u8 = 0x57;
/// `pop2`
pub const POP2: u8 = 0x58;
/// `dup`
pub const DUP: u8 = 0x59;
/// `dup_x1`
pub const DUP_X1: u8 = 0x5A;
/// `dup_x2`
pub const DUP_X2: u8 = 0x5B;
/// `dup2`
pub const DUP2: u8 = 0x5C;
/// `dup2_x1`
pub const DUP2_X1: u8 = 0x5D;
/// `dup2_x2`
pub const DUP2_X2: u8 = 0x5E;
/// `swap`
pub const SWAP: u8 = 0x5F;
/// `iadd`
pub const IADD: u8 = 0x60;
/// `ladd`
pub const LADD: u8 = 0x61;
/// `fadd`
pub const FADD: u8 = 0x62;
/// `dadd`
pub const DADD: u8 = 0x63;
/// `isub`
pub const ISUB: u8 = 0x64;
/// `lsub`
pub const LSUB: u8 = 0x65;
/// `fsub`
pub const FSUB: u8 = 0x66;
/// `dsub`
pub const DSUB: u8 = 0x67;
/// `imul`
pub const IMUL: u8 = 0x68;
/// `lmul`
pub const LMUL: u8 = 0x69;
/// `fmul`
pub const FMUL: u8 = 0x6A;
/// `dmul`
pub const DMUL: u8 = 0x6B;
/// `idiv`
pub const IDIV: u8 = 0x6C;
/// `ldiv`
pub const LDIV: u8 = 0x6D;
/// `fdiv`
pub const FDIV: u8 = 0x6E;
/// `ddiv`
pub const DDIV: u8 = 0x6F;
/// `irem`
pub const IREM: u8 = 0x70;
/// `lrem`
pub const LREM: u8 = 0x71;
/// `frem`
pub const FREM: u8 = 0x72;
/// `drem`
pub const DREM: u8 = 0x73;
/// `ineg`
pub const INEG: u8 = 0x74;
/// `lneg`
pub const LNEG: u8 = 0x75;
/// `fneg`
pub const FNEG: u8 = 0x76;
/// `dneg`
pub const DNEG: u8 = 0x77;
/// `ishl`
pub const ISHL: u8 = 0x78;
/// `lshl`
pub const LSHL: u8 = 0x79;
/// `ishr`
pub const ISHR: u8 = 0x7A;
/// `lshr`
pub const LSHR: u8 = 0x7B;
/// `iushr`
pub const IUSHR: u8 = 0x7C;
/// `lushr`
pub const LUSHR: u8 = 0x7D;
/// `iand`
pub const IAND: u8 = 0x7E;
/// `land`
pub const LAND: u8 = 0x7F;
/// `ior`
pub const IOR: u8 = 0x80;
/// `lor`
pub const LOR: u8 = 0x81;
/// `ixor`
pub const IXOR: u8 = 0x82;
/// `lxor`
pub const LXOR: u8 = 0x83;
/// `iinc`
pub const IINC: u8 = 0x84;
/// `i2l`
pub const I2L: u8 = 0x85;
/// `i2f`
pub const I2F: u8 = 0x86;
/// `i2d`
pub const I2D: u8 = 0x87;
/// `l2i`
pub const L2I: u8 = 0x88;
/// `l2f`
pub const L2F: u8 = 0x89;
/// `l2d`
pub const L2D: u8 = 0x8A;
/// `f2i`
pub const F2I: u8 = 0x8B;
/// `f2l`
pub const F2L: u8 = 0x8C;
/// `f2d`
pub const F2D: u8 = 0x8D;
/// `d2i`
pub const D2I: u8 = 0x8E;
/// `d2l`
pub const D2L: u8 = 0x8F;
/// `d2f`
pub const D2F: u8 = 0x90;
/// `i2b`
pub const I2B: u8 = 0x91;
/// `i2c`
pub const I2C: u8 = 0x92;
/// `i2s`
pub const I2S: u8 = 0x93;
/// `lcmp`
pub const LCMP: u8 = 0x94;
/// `fcmpl`
pub const FCMPL: u8 = 0x95;
/// `fcmpg`
pub const FCMPG: u8 = 0x96;
/// `dcmpl`
pub const DCMPL: u8 = 0x97;
/// `dcmpg`
pub const DCMPG: u8 = 0x98;
/// `ifeq`
pub const IFEQ: u8 = 0x99;
/// `ifne`
pub const IFNE: u8 = 0x9A;
/// `iflt`
pub const IFLT: u8 = 0x9B;
/// `ifge`
pub const IFGE: u8 = 0x9C;
/// `ifgt`
pub const IFGT: u8 = 0x9D;
/// `ifle`
pub const IFLE: u8 = 0x9E;
/// `if_icmpeq`
pub const IF_ICMPEQ: u8 = 0x9F;
/// `if_icmpne`
pub const IF_ICMPNE: u8 = 0xA0;
/// `if_icmplt`
pub const IF_ICMPLT: u8 = 0xA1;
/// `if_icmpge`
pub const IF_ICMPGE: u8 = 0xA2;
/// `if_icmpgt`
pub const IF_ICMPGT: u8 = 0xA3;
/// `if_icmple`
pub const IF_ICMPLE: u8 = 0xA4;
/// `if_acmpeq`
pub const IF_ACMPEQ: u8 = 0xA5;
/// `if_acmpne`
pub const IF_ACMPNE: u8 = 0xA6;
/// `goto`
pub const GOTO: u8 = 0xA7;
/// `jsr`
pub const JSR: u8 = 0xA8;
/// `ret`
pub const RET: u8 = 0xA9;
/// `tableswitch`
pub const TABLESWITCH: u8 = 0xAA;
/// `lookupswitch`
pub const LOOKUPSWITCH: u8 = 0xAB;
/// `ireturn`
pub const IRETURN: u8 = 0xAC;
/// `lreturn`
pub const LRETURN: u8 = 0xAD;
/// `freturn`
pub const FRETURN: u8 = 0xAE;
/// `dreturn`
pub const DRETURN: u8 = 0xAF;
/// `areturn`
pub const ARETURN: u8 = 0xB0;
/// `return`
pub const RETURN: u8 = 0xB1;
/// `getstatic`
pub const GETSTATIC: u8 = 0xB2;
/// `putstatic`
pub const PUTSTATIC: u8 = 0xB3;
/// `getfield`
pub const GETFIELD: u8 = 0xB4;
/// `putfield`
pub const PUTFIELD: u8 = 0xB5;
/// `invokevirtual`
pub const INVOKEVIRTUAL: u8 = 0xB6;
/// `invokespecial`
pub const INVOKESPECIAL: u8 = 0xB7;
/// `invokestatic`
pub const INVOKESTATIC: u8 = 0xB8;
/// `invokeinterface`
pub const INVOKEINTERFACE: u8 = 0xB9;
/// `invokedynamic`
pub const INVOKEDYNAMIC: u8 = 0xBA;
/// `new`
pub const NEW: u8 = 0xBB;
/// `newarray`
pub const NEWARRAY: u8 = 0xBC;
/// `anewarray`
pub const ANEWARRAY: u8 = 0xBD;
/// `arraylength`
pub const ARRAYLENGTH: u8 = 0xBE;
/// `athrow`
pub const ATHROW: u8 = 0xBF;
/// `checkcast`
pub const CHECKCAST: u8 = 0xC0;
/// `instanceof`
pub const INSTANCEOF: u8 = 0xC1;
/// `monitorenter`
pub const MONITORENTER: u8 = 0xC2;
/// `monitorexit`
pub const MONITOREXIT: u8 = 0xC3;
/// `wide`
pub const WIDE: u8 = 0xC4;
/// `multianewarray`
pub const MULTIANEWARRAY: u8 = 0xC5;
/// `ifnull`
pub const IFNULL: u8 = 0xC6;
/// `ifnonnull`
pub const IFNONNULL: u8 = 0xC7;
/// `goto_w`
pub const GOTO_W: u8 = 0xC8;
/// `jsr_w`
pub const JSR_W: u8 = 0xC9;

/// Opcode descriptions, indexed by opcode.
pub const INSTRUCTIONS: [JvmInstruction; 202] = [
    JvmInstruction { mnemonic: "nop", operand: OperandType::None }, // 0x00
    JvmInstruction { mnemonic: "aconst_null", operand: OperandType::None }, // 0x01
    JvmInstruction { mnemonic: "iconst_m1", operand: OperandType::None }, // 0x02
    JvmInstruction { mnemonic: "iconst_0", operand: OperandType::None }, // 0x03
    JvmInstruction { mnemonic: "iconst_1", operand: OperandType::None }, // 0x04
    JvmInstruction { mnemonic: "iconst_2", operand: OperandType::None }, // 0x05
    JvmInstruction { mnemonic: "iconst_3", operand: OperandType::None }, // 0x06
    JvmInstruction { mnemonic: "iconst_4", operand: OperandType::None }, // 0x07
    JvmInstruction { mnemonic: "iconst_5", operand: OperandType::None }, // 0x08
    JvmInstruction { mnemonic: "lconst_0", operand: OperandType::None }, // 0x09
    JvmInstruction { mnemonic: "lconst_1", operand: OperandType::None }, // 0x0A
    JvmInstruction { mnemonic: "fconst_0", operand: OperandType::None }, // 0x0B
    JvmInstruction { mnemonic: "fconst_1", operand: OperandType::None }, // 0x0C
    JvmInstruction { mnemonic: "fconst_2", operand: OperandType::None }, // 0x0D
    JvmInstruction { mnemonic: "dconst_0", operand: OperandType::None }, // 0x0E
    JvmInstruction { mnemonic: "dconst_1", operand: OperandType::None }, // 0x0F
    JvmInstruction { mnemonic: "bipush", operand: OperandType::Byte }, // 0x10
    JvmInstruction { mnemonic: "sipush", operand: OperandType::Short }, // 0x11
    JvmInstruction { mnemonic: "ldc", operand: OperandType::ConstantByte }, // 0x12
    JvmInstruction { mnemonic: "ldc_w", operand: OperandType::Constant }, // 0x13
    JvmInstruction { mnemonic: "ldc2_w", operand: OperandType::Constant }, // 0x14
    JvmInstruction { mnemonic: "iload", operand: OperandType::Local }, // 0x15
    JvmInstruction { mnemonic: "lload", operand: OperandType::Local }, // 0x16
    JvmInstruction { mnemonic: "fload", operand: OperandType::Local }, // 0x17
    JvmInstruction { mnemonic: "dload", operand: OperandType::Local }, // 0x18
    JvmInstruction { mnemonic: "aload", operand: OperandType::Local }, // 0x19
    JvmInstruction { mnemonic: "iload_0", operand: OperandType::None }, // 0x1A
    JvmInstruction { mnemonic: "iload_1", operand: OperandType::None }, // 0x1B
    JvmInstruction { mnemonic: "iload_2", operand: OperandType::None }, // 0x1C
    JvmInstruction { mnemonic: "iload_3", operand: OperandType::None }, // 0x1D
    JvmInstruction { mnemonic: "lload_0", operand: OperandType::None }, // 0x1E
    JvmInstruction { mnemonic: "lload_1", operand: OperandType::None }, // 0x1F
    JvmInstruction { mnemonic: "lload_2", operand: OperandType::None }, // 0x20
    JvmInstruction { mnemonic: "lload_3", operand: OperandType::None }, // 0x21
    JvmInstruction { mnemonic: "fload_0", operand: OperandType::None }, // 0x22
    JvmInstruction { mnemonic: "fload_1", operand: OperandType::None }, // 0x23
    JvmInstruction { mnemonic: "fload_2", operand: OperandType::None }, // 0x24
    JvmInstruction { mnemonic: "fload_3", operand: OperandType::None }, // 0x25
    JvmInstruction { mnemonic: "dload_0", operand: OperandType::None }, // 0x26
    JvmInstruction { mnemonic: "dload_1", operand: OperandType::None }, // 0x27
    JvmInstruction { mnemonic: "dload_2", operand: OperandType::None }, // 0x28
    JvmInstruction { mnemonic: "dload_3", operand: OperandType::None }, // 0x29
    JvmInstruction { mnemonic: "aload_0", operand: OperandType::None }, // 0x2A
    JvmInstruction { mnemonic: "aload_1", operand: OperandType::None }, // 0x2B
    JvmInstruction { mnemonic: "aload_2", operand: OperandType::None }, // 0x2C
    JvmInstruction { mnemonic: "aload_3", operand: OperandType::None }, // 0x2D
    JvmInstruction { mnemonic: "iaload", operand: OperandType::None }, // 0x2E
    JvmInstruction { mnemonic: "laload", operand: OperandType::None }, // 0x2F
    JvmInstruction { mnemonic: "faload", operand: OperandType::None }, // 0x30
    JvmInstruction { mnemonic: "daload", operand: OperandType::None }, // 0x31
    JvmInstruction { mnemonic: "aaload", operand: OperandType::None }, // 0x32
    JvmInstruction { mnemonic: "baload", operand: OperandType::None }, // 0x33
    JvmInstruction { mnemonic: "caload", operand: OperandType::None }, // 0x34
    JvmInstruction { mnemonic: "saload", operand: OperandType::None }, // 0x35
    JvmInstruction { mnemonic: "istore", operand: OperandType::Local }, // 0x36
    JvmInstruction { mnemonic: "lstore", operand: OperandType::Local }, // 0x37
    JvmInstruction { mnemonic: "fstore", operand: OperandType::Local }, // 0x38
    JvmInstruction { mnemonic: "dstore", operand: OperandType::Local }, // 0x39
    JvmInstruction { mnemonic: "astore", operand: OperandType::Local }, // 0x3A
    JvmInstruction { mnemonic: "istore_0", operand: OperandType::None }, // 0x3B
    JvmInstruction { mnemonic: "istore_1", operand: OperandType::None }, // 0x3C
    JvmInstruction { mnemonic: "istore_2", operand: OperandType::None }, // 0x3D
    JvmInstruction { mnemonic: "istore_3", operand: OperandType::None }, // 0x3E
    JvmInstruction { mnemonic: "lstore_0", operand: OperandType::None }, // 0x3F
    JvmInstruction { mnemonic: "lstore_1", operand: OperandType::None }, // 0x40
    JvmInstruction { mnemonic: "lstore_2", operand: OperandType::None }, // 0x41
    JvmInstruction { mnemonic: "lstore_3", operand: OperandType::None }, // 0x42
    JvmInstruction { mnemonic: "fstore_0", operand: OperandType::None }, // 0x43
    JvmInstruction { mnemonic: "fstore_1", operand: OperandType::None }, // 0x44
    JvmInstruction { mnemonic: "fstore_2", operand: OperandType::None }, // 0x45
    JvmInstruction { mnemonic: "fstore_3", operand: OperandType::None }, // 0x46
    JvmInstruction { mnemonic: "dstore_0", operand: OperandType::None }, // 0x47
    JvmInstruction { mnemonic: "dstore_1", operand: OperandType::None }, // 0x48
    JvmInstruction { mnemonic: "dstore_2", operand: OperandType::None }, // 0x49
    JvmInstruction { mnemonic: "dstore_3", operand: OperandType::None }, // 0x4A
    JvmInstruction { mnemonic: "astore_0", operand: OperandType::None }, // 0x4B
    JvmInstruction { mnemonic: "astore_1", operand: OperandType::None }, // 0x4C
    JvmInstruction { mnemonic: "astore_2", operand: OperandType::None }, // 0x4D
    JvmInstruction { mnemonic: "astore_3", operand: OperandType::None }, // 0x4E
    JvmInstruction { mnemonic: "iastore", operand: OperandType::None }, // 0x4F
    JvmInstruction { mnemonic: "lastore", operand: OperandType::None }, // 0x50
    JvmInstruction { mnemonic: "fastore", operand: OperandType::None }, // 0x51
    JvmInstruction { mnemonic: "dastore", operand: OperandType::None }, // 0x52
    JvmInstruction { mnemonic: "aastore", operand: OperandType::None }, // 0x53
    JvmInstruction { mnemonic: "bastore", operand: OperandType::None }, // 0x54
    JvmInstruction { mnemonic: "castore", operand: OperandType::None }, // 0x55
    JvmInstruction { mnemonic: "sastore", operand: OperandType::None }, // 0x56
    JvmInstruction { mnemonic: "pop", operand: OperandType::None }, // 0x57
    JvmInstruction { mnemonic: "pop2", operand: OperandType::None }, // 0x58
    JvmInstruction { mnemonic: "dup", operand: OperandType::None }, // 0x59
    JvmInstruction { mnemonic: "dup_x1", operand: OperandType::None }, // 0x5A
    JvmInstruction { mnemonic: "dup_x2", operand: OperandType::None }, // 0x5B
    JvmInstruction { mnemonic: "dup2", operand: OperandType::None }, // 0x5C
    JvmInstruction { mnemonic: "dup2_x1", operand: OperandType::None }, // 0x5D
    JvmInstruction { mnemonic: "dup2_x2", operand: OperandType::None }, // 0x5E
    JvmInstruction { mnemonic: "swap", operand: OperandType::None }, // 0x5F
    JvmInstruction { mnemonic: "iadd", operand: OperandType::None }, // 0x60
    JvmInstruction { mnemonic: "ladd", operand: OperandType::None }, // 0x61
    JvmInstruction { mnemonic: "fadd", operand: OperandType::None }, // 0x62
    JvmInstruction { mnemonic: "dadd", operand: OperandType::None }, // 0x63
    JvmInstruction { mnemonic: "isub", operand: OperandType::None }, // 0x64
    JvmInstruction { mnemonic: "lsub", operand: OperandType::None }, // 0x65
    JvmInstruction { mnemonic: "fsub", operand: OperandType::None }, // 0x66
    JvmInstruction { mnemonic: "dsub", operand: OperandType::None }, // 0x67
    JvmInstruction { mnemonic: "imul", operand: OperandType::None }, // 0x68
    JvmInstruction { mnemonic: "lmul", operand: OperandType::None }, // 0x69
    JvmInstruction { mnemonic: "fmul", operand: OperandType::None }, // 0x6A
    JvmInstruction { mnemonic: "dmul", operand: OperandType::None }, // 0x6B
    JvmInstruction { mnemonic: "idiv", operand: OperandType::None }, // 0x6C
    JvmInstruction { mnemonic: "ldiv", operand: OperandType::None }, // 0x6D
    JvmInstruction { mnemonic: "fdiv", operand: OperandType::None }, // 0x6E
    JvmInstruction { mnemonic: "ddiv", operand: OperandType::None }, // 0x6F
    JvmInstruction { mnemonic: "irem", operand: OperandType::None }, // 0x70
    JvmInstruction { mnemonic: "lrem", operand: OperandType::None }, // 0x71
    JvmInstruction { mnemonic: "frem", operand: OperandType::None }, // 0x72
    JvmInstruction { mnemonic: "drem", operand: OperandType::None }, // 0x73
    JvmInstruction { mnemonic: "ineg", operand: OperandType::None }, // 0x74
    JvmInstruction { mnemonic: "lneg", operand: OperandType::None }, // 0x75
    JvmInstruction { mnemonic: "fneg", operand: OperandType::None }, // 0x76
    JvmInstruction { mnemonic: "dneg", operand: OperandType::None }, // 0x77
    JvmInstruction { mnemonic: "ishl", operand: OperandType::None }, // 0x78
    JvmInstruction { mnemonic: "lshl", operand: OperandType::None }, // 0x79
    JvmInstruction { mnemonic: "ishr", operand: OperandType::None }, // 0x7A
    JvmInstruction { mnemonic: "lshr", operand: OperandType::None }, // 0x7B
    JvmInstruction { mnemonic: "iushr", operand: OperandType::None }, // 0x7C
    JvmInstruction { mnemonic: "lushr", operand: OperandType::None }, // 0x7D
    JvmInstruction { mnemonic: "iand", operand: OperandType::None }, // 0x7E
    JvmInstruction { mnemonic: "land", operand: OperandType::None }, // 0x7F
    JvmInstruction { mnemonic: "ior", operand: OperandType::None }, // 0x80
    JvmInstruction { mnemonic: "lor", operand: OperandType::None }, // 0x81
    JvmInstruction { mnemonic: "ixor", operand: OperandType::None }, // 0x82
    JvmInstruction { mnemonic: "lxor", operand: OperandType::None }, // 0x83
    JvmInstruction { mnemonic: "iinc", operand: OperandType::Iinc }, // 0x84
    JvmInstruction { mnemonic: "i2l", operand: OperandType::None }, // 0x85
    JvmInstruction { mnemonic: "i2f", operand: OperandType::None }, // 0x86
    JvmInstruction { mnemonic: "i2d", operand: OperandType::None }, // 0x87
    JvmInstruction { mnemonic: "l2i", operand: OperandType::None }, // 0x88
    JvmInstruction { mnemonic: "l2f", operand: OperandType::None }, // 0x89
    JvmInstruction { mnemonic: "l2d", operand: OperandType::None }, // 0x8A
    JvmInstruction { mnemonic: "f2i", operand: OperandType::None }, // 0x8B
    JvmInstruction { mnemonic: "f2l", operand: OperandType::None }, // 0x8C
    JvmInstruction { mnemonic: "f2d", operand: OperandType::None }, // 0x8D
    JvmInstruction { mnemonic: "d2i", operand: OperandType::None }, // 0x8E
    JvmInstruction { mnemonic: "d2l", operand: OperandType::None }, // 0x8F
    JvmInstruction { mnemonic: "d2f", operand: OperandType::None }, // 0x90
    JvmInstruction { mnemonic: "i2b", operand: OperandType::None }, // 0x91
    JvmInstruction { mnemonic: "i2c", operand: OperandType::None }, // 0x92
    JvmInstruction { mnemonic: "i2s", operand: OperandType::None }, // 0x93
    JvmInstruction { mnemonic: "lcmp", operand: OperandType::None }, // 0x94
    JvmInstruction { mnemonic: "fcmpl", operand: OperandType::None }, // 0x95
    JvmInstruction { mnemonic: "fcmpg", operand: OperandType::None }, // 0x96
    JvmInstruction { mnemonic: "dcmpl", operand: OperandType::None }, // 0x97
    JvmInstruction { mnemonic: "dcmpg", operand: OperandType::None }, // 0x98
    JvmInstruction { mnemonic: "ifeq", operand: OperandType::Branch }, // 0x99
    JvmInstruction { mnemonic: "ifne", operand: OperandType::Branch }, // 0x9A
    JvmInstruction { mnemonic: "iflt", operand: OperandType::Branch }, // 0x9B
    JvmInstruction { mnemonic: "ifge", operand: OperandType::Branch }, // 0x9C
    JvmInstruction { mnemonic: "ifgt", operand: OperandType::Branch }, // 0x9D
    JvmInstruction { mnemonic: "ifle", operand: OperandType::Branch }, // 0x9E
    JvmInstruction { mnemonic: "if_icmpeq", operand: OperandType::Branch }, // 0x9F
    JvmInstruction { mnemonic: "if_icmpne", operand: OperandType::Branch }, // 0xA0
    JvmInstruction { mnemonic: "if_icmplt", operand: OperandType::Branch }, // 0xA1
    JvmInstruction { mnemonic: "if_icmpge", operand: OperandType::Branch }, // 0xA2
    JvmInstruction { mnemonic: "if_icmpgt", operand: OperandType::Branch }, // 0xA3
    JvmInstruction { mnemonic: "if_icmple", operand: OperandType::Branch }, // 0xA4
    JvmInstruction { mnemonic: "if_acmpeq", operand: OperandType::Branch }, // 0xA5
    JvmInstruction { mnemonic: "if_acmpne", operand: OperandType::Branch }, // 0xA6
    JvmInstruction { mnemonic: "goto", operand: OperandType::Branch }, // 0xA7
    JvmInstruction { mnemonic: "jsr", operand: OperandType::Branch }, // 0xA8
    JvmInstruction { mnemonic: "ret", operand: OperandType::Local }, // 0xA9
    JvmInstruction { mnemonic: "tableswitch", operand: OperandType::TableSwitch }, // 0xAA
    JvmInstruction { mnemonic: "lookupswitch", operand: OperandType::LookupSwitch }, // 0xAB
    JvmInstruction { mnemonic: "ireturn", operand: OperandType::None }, // 0xAC
    JvmInstruction { mnemonic: "lreturn", operand: OperandType::None }, // 0xAD
    JvmInstruction { mnemonic: "freturn", operand: OperandType::None }, // 0xAE
    JvmInstruction { mnemonic: "dreturn", operand: OperandType::None }, // 0xAF
    JvmInstruction { mnemonic: "areturn", operand: OperandType::None }, // 0xB0
    JvmInstruction { mnemonic: "return", operand: OperandType::None }, // 0xB1
    JvmInstruction { mnemonic: "getstatic", operand: OperandType::Field }, // 0xB2
    JvmInstruction { mnemonic: "putstatic", operand: OperandType::Field }, // 0xB3
    JvmInstruction { mnemonic: "getfield", operand: OperandType::Field }, // 0xB4
    JvmInstruction { mnemonic: "putfield", operand: OperandType::Field }, // 0xB5
    JvmInstruction { mnemonic: "invokevirtual", operand: OperandType::Method }, // 0xB6
    JvmInstruction { mnemonic: "invokespecial", operand: OperandType::Method }, // 0xB7
    JvmInstruction { mnemonic: "invokestatic", operand: OperandType::Method }, // 0xB8
    JvmInstruction { mnemonic: "invokeinterface", operand: OperandType::InterfaceMethod }, // 0xB9
    JvmInstruction { mnemonic: "invokedynamic", operand: OperandType::Dynamic }, // 0xBA
    JvmInstruction { mnemonic: "new", operand: OperandType::Class }, // 0xBB
    JvmInstruction { mnemonic: "newarray", operand: OperandType::ArrayType }, // 0xBC
    JvmInstruction { mnemonic: "anewarray", operand: OperandType::Class }, // 0xBD
    JvmInstruction { mnemonic: "arraylength", operand: OperandType::None }, // 0xBE
    JvmInstruction { mnemonic: "athrow", operand: OperandType::None }, // 0xBF
    JvmInstruction { mnemonic: "checkcast", operand: OperandType::Class }, // 0xC0
    JvmInstruction { mnemonic: "instanceof", operand: OperandType::Class }, // 0xC1
    JvmInstruction { mnemonic: "monitorenter", operand: OperandType::None }, // 0xC2
    JvmInstruction { mnemonic: "monitorexit", operand: OperandType::None }, // 0xC3
    JvmInstruction { mnemonic: "wide", operand: OperandType::Wide }, // 0xC4
    JvmInstruction { mnemonic: "multianewarray", operand: OperandType::MultiArray }, // 0xC5
    JvmInstruction { mnemonic: "ifnull", operand: OperandType::Branch }, // 0xC6
    JvmInstruction { mnemonic: "ifnonnull", operand: OperandType::Branch }, // 0xC7
    JvmInstruction { mnemonic: "goto_w", operand: OperandType::BranchWide }, // 0xC8
    JvmInstruction { mnemonic: "jsr_w", operand: OperandType::BranchWide }, // 0xC9
];

/// Look up the description of `opcode`, `None` for reserved opcodes.
#[must_use]
pub fn instruction(opcode: u8) -> Option<&'static JvmInstruction> {
    INSTRUCTIONS.get(opcode as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_opcode() {
        assert_eq!(INSTRUCTIONS[NOP as usize].mnemonic, "nop");
        assert_eq!(INSTRUCTIONS[ALOAD_0 as usize].mnemonic, "aload_0");
        assert_eq!(INSTRUCTIONS[IINC as usize].operand, OperandType::Iinc);
        assert_eq!(INSTRUCTIONS[INVOKESTATIC as usize].mnemonic, "invokestatic");
        assert_eq!(INSTRUCTIONS[JSR_W as usize].operand, OperandType::BranchWide);
    }

    #[test]
    fn reserved_opcodes() {
        assert!(instruction(0xCA).is_none());
        assert!(instruction(0xFF).is_none());
        assert!(instruction(0xC9).is_some());
    }
}
