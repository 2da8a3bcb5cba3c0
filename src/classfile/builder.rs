//! Class file assembler.
//!
//! [`ClassBuilder`] produces the bytes of a valid class file from a fluent description of its
//! methods, which is how tests and documentation get hold of realistic input without shipping
//! binary fixtures. Instructions are recorded symbolically by [`CodeBuilder`] and only encoded
//! when [`ClassBuilder::build`] lays out the constant pool, so constants are interned in the
//! order they are first used.
//!
//! # Example
//!
//! ```rust
//! use groupscope::classfile::{ClassBuilder, ClassUnit};
//!
//! let bytes = ClassBuilder::new("com/example/AppKt")
//!     .source_file("App.kt")
//!     .method("helper", "()I", |method| {
//!         method.code(|code| {
//!             code.iconst(42).ireturn();
//!         })
//!     })
//!     .build();
//!
//! let class = ClassUnit::parse(&bytes)?;
//! assert_eq!(class.name(), "com/example/AppKt");
//! assert_eq!(class.methods()[0].name(), "helper");
//! # Ok::<(), groupscope::Error>(())
//! ```

use std::collections::HashMap;

use crate::{classfile::method::MethodAccessFlags, disassembler::instructions as op};

/// `REF_invokeStatic` method handle kind.
const REF_INVOKE_STATIC: u8 = 6;

const LAMBDA_METAFACTORY: &str = "java/lang/invoke/LambdaMetafactory";
const METAFACTORY_DESCRIPTOR: &str = "(Ljava/lang/invoke/MethodHandles$Lookup;Ljava/lang/String;\
Ljava/lang/invoke/MethodType;Ljava/lang/invoke/MethodType;Ljava/lang/invoke/MethodHandle;\
Ljava/lang/invoke/MethodType;)Ljava/lang/invoke/CallSite;";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PoolKey {
    Utf8(String),
    Integer(i32),
    Long(i64),
    Class(String),
    String(String),
    NameAndType(String, String),
    Field(String, String, String),
    Method(String, String, String),
    InterfaceMethod(String, String, String),
    MethodHandle(u8, u16),
    MethodType(String),
    InvokeDynamic(u16, u16),
}

#[derive(Default)]
struct PoolBuilder {
    bytes: Vec<u8>,
    next: u16,
    index: HashMap<PoolKey, u16>,
    bootstrap: Vec<(u16, Vec<u16>)>,
}

impl PoolBuilder {
    fn new() -> Self {
        PoolBuilder {
            next: 1,
            ..PoolBuilder::default()
        }
    }

    fn intern(&mut self, key: PoolKey) -> u16 {
        if let Some(index) = self.index.get(&key) {
            return *index;
        }

        let mut body = Vec::new();
        match &key {
            PoolKey::Utf8(value) => {
                let encoded = encode_modified_utf8(value);
                body.push(1);
                body.extend((encoded.len() as u16).to_be_bytes());
                body.extend(encoded);
            }
            PoolKey::Integer(value) => {
                body.push(3);
                body.extend(value.to_be_bytes());
            }
            PoolKey::Long(value) => {
                body.push(5);
                body.extend(value.to_be_bytes());
            }
            PoolKey::Class(name) => {
                let name = self.utf8(name);
                body.push(7);
                body.extend(name.to_be_bytes());
            }
            PoolKey::String(value) => {
                let value = self.utf8(value);
                body.push(8);
                body.extend(value.to_be_bytes());
            }
            PoolKey::NameAndType(name, descriptor) => {
                let name = self.utf8(name);
                let descriptor = self.utf8(descriptor);
                body.push(12);
                body.extend(name.to_be_bytes());
                body.extend(descriptor.to_be_bytes());
            }
            PoolKey::Field(owner, name, descriptor)
            | PoolKey::Method(owner, name, descriptor)
            | PoolKey::InterfaceMethod(owner, name, descriptor) => {
                let tag = match &key {
                    PoolKey::Field(..) => 9,
                    PoolKey::Method(..) => 10,
                    _ => 11,
                };
                let class = self.intern(PoolKey::Class(owner.clone()));
                let name_and_type =
                    self.intern(PoolKey::NameAndType(name.clone(), descriptor.clone()));
                body.push(tag);
                body.extend(class.to_be_bytes());
                body.extend(name_and_type.to_be_bytes());
            }
            PoolKey::MethodHandle(kind, reference) => {
                body.push(15);
                body.push(*kind);
                body.extend(reference.to_be_bytes());
            }
            PoolKey::MethodType(descriptor) => {
                let descriptor = self.utf8(descriptor);
                body.push(16);
                body.extend(descriptor.to_be_bytes());
            }
            PoolKey::InvokeDynamic(bootstrap, name_and_type) => {
                body.push(18);
                body.extend(bootstrap.to_be_bytes());
                body.extend(name_and_type.to_be_bytes());
            }
        }

        let index = self.next;
        self.next += if matches!(key, PoolKey::Long(_)) { 2 } else { 1 };
        self.bytes.extend(body);
        self.index.insert(key, index);
        index
    }

    fn utf8(&mut self, value: &str) -> u16 {
        self.intern(PoolKey::Utf8(value.to_string()))
    }

    fn class(&mut self, name: &str) -> u16 {
        self.intern(PoolKey::Class(name.to_string()))
    }

    fn bootstrap_method(&mut self, method: u16, arguments: Vec<u16>) -> u16 {
        if let Some(position) = self
            .bootstrap
            .iter()
            .position(|(existing, args)| *existing == method && *args == arguments)
        {
            return position as u16;
        }
        self.bootstrap.push((method, arguments));
        (self.bootstrap.len() - 1) as u16
    }
}

fn encode_modified_utf8(value: &str) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => encoded.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                encoded.push(0xC0 | (unit >> 6) as u8);
                encoded.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                encoded.push(0xE0 | (unit >> 12) as u8);
                encoded.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                encoded.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    encoded
}

/// A position in a method's code, created by [`CodeBuilder::new_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label(usize);

#[derive(Debug, Clone)]
enum Op {
    Simple(u8),
    Int(i32),
    LdcInt(i32),
    LdcString(String),
    LdcLong(i64),
    Local(u8, u16),
    Iinc(u16, i16),
    Invoke {
        opcode: u8,
        owner: String,
        name: String,
        descriptor: String,
    },
    Field {
        opcode: u8,
        owner: String,
        name: String,
        descriptor: String,
    },
    Lambda {
        name: String,
        descriptor: String,
        factory: String,
        implementation: (String, String, String),
        sam: String,
    },
    Jump(u8, Label),
    Place(Label),
    Line(u16),
}

/// Records the instructions of one method body.
///
/// Every method returns `&mut Self` so calls can be chained.
#[derive(Debug, Clone, Default)]
pub struct CodeBuilder {
    ops: Vec<Op>,
    labels: usize,
    handlers: Vec<(Label, Label, Label, Option<String>)>,
    locals: Vec<(String, String, u16)>,
}

impl CodeBuilder {
    fn push(&mut self, op: Op) -> &mut Self {
        self.ops.push(op);
        self
    }

    /// Emit an operand-less opcode as is.
    pub fn op(&mut self, opcode: u8) -> &mut Self {
        self.push(Op::Simple(opcode))
    }

    /// `nop`
    pub fn nop(&mut self) -> &mut Self {
        self.op(op::NOP)
    }

    /// `pop`
    pub fn pop(&mut self) -> &mut Self {
        self.op(op::POP)
    }

    /// `dup`
    pub fn dup(&mut self) -> &mut Self {
        self.op(op::DUP)
    }

    /// `iadd`
    pub fn iadd(&mut self) -> &mut Self {
        self.op(op::IADD)
    }

    /// `return`
    pub fn return_void(&mut self) -> &mut Self {
        self.op(op::RETURN)
    }

    /// `ireturn`
    pub fn ireturn(&mut self) -> &mut Self {
        self.op(op::IRETURN)
    }

    /// `areturn`
    pub fn areturn(&mut self) -> &mut Self {
        self.op(op::ARETURN)
    }

    /// Push an `int` with the shortest encoding, the way `javac` does
    /// (`iconst_<n>`, `bipush`, `sipush`, then `ldc`).
    pub fn iconst(&mut self, value: i32) -> &mut Self {
        self.push(Op::Int(value))
    }

    /// Push an `int` through the constant pool regardless of its size.
    pub fn ldc_int(&mut self, value: i32) -> &mut Self {
        self.push(Op::LdcInt(value))
    }

    /// Push a `long` constant (`ldc2_w`).
    pub fn ldc_long(&mut self, value: i64) -> &mut Self {
        self.push(Op::LdcLong(value))
    }

    /// Push a string constant.
    pub fn ldc_string(&mut self, value: &str) -> &mut Self {
        self.push(Op::LdcString(value.to_string()))
    }

    /// `iload`
    pub fn iload(&mut self, slot: u16) -> &mut Self {
        self.push(Op::Local(op::ILOAD, slot))
    }

    /// `aload`
    pub fn aload(&mut self, slot: u16) -> &mut Self {
        self.push(Op::Local(op::ALOAD, slot))
    }

    /// `istore`
    pub fn istore(&mut self, slot: u16) -> &mut Self {
        self.push(Op::Local(op::ISTORE, slot))
    }

    /// `astore`
    pub fn astore(&mut self, slot: u16) -> &mut Self {
        self.push(Op::Local(op::ASTORE, slot))
    }

    /// `iinc`
    pub fn iinc(&mut self, slot: u16, delta: i16) -> &mut Self {
        self.push(Op::Iinc(slot, delta))
    }

    fn invoke(&mut self, opcode: u8, owner: &str, name: &str, descriptor: &str) -> &mut Self {
        self.push(Op::Invoke {
            opcode,
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        })
    }

    /// `invokestatic`
    pub fn invokestatic(&mut self, owner: &str, name: &str, descriptor: &str) -> &mut Self {
        self.invoke(op::INVOKESTATIC, owner, name, descriptor)
    }

    /// `invokevirtual`
    pub fn invokevirtual(&mut self, owner: &str, name: &str, descriptor: &str) -> &mut Self {
        self.invoke(op::INVOKEVIRTUAL, owner, name, descriptor)
    }

    /// `invokespecial`
    pub fn invokespecial(&mut self, owner: &str, name: &str, descriptor: &str) -> &mut Self {
        self.invoke(op::INVOKESPECIAL, owner, name, descriptor)
    }

    /// `invokeinterface`
    pub fn invokeinterface(&mut self, owner: &str, name: &str, descriptor: &str) -> &mut Self {
        self.invoke(op::INVOKEINTERFACE, owner, name, descriptor)
    }

    fn field(&mut self, opcode: u8, owner: &str, name: &str, descriptor: &str) -> &mut Self {
        self.push(Op::Field {
            opcode,
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        })
    }

    /// `getstatic`
    pub fn getstatic(&mut self, owner: &str, name: &str, descriptor: &str) -> &mut Self {
        self.field(op::GETSTATIC, owner, name, descriptor)
    }

    /// `putstatic`
    pub fn putstatic(&mut self, owner: &str, name: &str, descriptor: &str) -> &mut Self {
        self.field(op::PUTSTATIC, owner, name, descriptor)
    }

    /// `getfield`
    pub fn getfield(&mut self, owner: &str, name: &str, descriptor: &str) -> &mut Self {
        self.field(op::GETFIELD, owner, name, descriptor)
    }

    /// `invokedynamic` bootstrapped by `LambdaMetafactory.metafactory`.
    ///
    /// `implementation` is the `(owner, name, descriptor)` of the static method the lambda
    /// body was compiled to and `sam` the erased descriptor of the functional interface method.
    pub fn invoke_lambda(
        &mut self,
        name: &str,
        descriptor: &str,
        implementation: (&str, &str, &str),
        sam: &str,
    ) -> &mut Self {
        self.invoke_lambda_with(name, descriptor, "metafactory", implementation, sam)
    }

    /// Like [`CodeBuilder::invoke_lambda`] with a different `LambdaMetafactory` bootstrap
    /// (`altMetafactory` for serializable lambdas).
    pub fn invoke_lambda_with(
        &mut self,
        name: &str,
        descriptor: &str,
        factory: &str,
        implementation: (&str, &str, &str),
        sam: &str,
    ) -> &mut Self {
        self.push(Op::Lambda {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            factory: factory.to_string(),
            implementation: (
                implementation.0.to_string(),
                implementation.1.to_string(),
                implementation.2.to_string(),
            ),
            sam: sam.to_string(),
        })
    }

    /// Allocate a label; it must later be placed with [`CodeBuilder::place`].
    ///
    /// Labels that are never placed resolve to the end of the code, which the decoder rejects
    /// as a branch target.
    pub fn new_label(&mut self) -> Label {
        self.labels += 1;
        Label(self.labels - 1)
    }

    /// Bind `label` to the next instruction.
    pub fn place(&mut self, label: Label) -> &mut Self {
        self.push(Op::Place(label))
    }

    /// `goto`
    pub fn goto(&mut self, label: Label) -> &mut Self {
        self.push(Op::Jump(op::GOTO, label))
    }

    /// `ifeq`
    pub fn ifeq(&mut self, label: Label) -> &mut Self {
        self.push(Op::Jump(op::IFEQ, label))
    }

    /// `ifne`
    pub fn ifne(&mut self, label: Label) -> &mut Self {
        self.push(Op::Jump(op::IFNE, label))
    }

    /// `ifnull`
    pub fn ifnull(&mut self, label: Label) -> &mut Self {
        self.push(Op::Jump(op::IFNULL, label))
    }

    /// Add an exception table entry; `catch_type` `None` catches everything.
    pub fn try_catch(
        &mut self,
        start: Label,
        end: Label,
        handler: Label,
        catch_type: Option<&str>,
    ) -> &mut Self {
        self.handlers
            .push((start, end, handler, catch_type.map(str::to_string)));
        self
    }

    /// Record a `LineNumberTable` entry for the next instruction.
    pub fn line(&mut self, line: u16) -> &mut Self {
        self.push(Op::Line(line))
    }

    /// Record a `LocalVariableTable` entry spanning the whole method.
    pub fn local_variable(&mut self, name: &str, descriptor: &str, slot: u16) -> &mut Self {
        self.locals
            .push((name.to_string(), descriptor.to_string(), slot));
        self
    }

    fn encode(&self, pool: &mut PoolBuilder) -> Vec<u8> {
        let mut code: Vec<u8> = Vec::new();
        let mut positions = vec![None; self.labels];
        let mut fixups = Vec::new();
        let mut lines = Vec::new();

        for instruction in &self.ops {
            let offset = code.len();
            match instruction {
                Op::Simple(opcode) => code.push(*opcode),
                Op::Int(value) => match *value {
                    -1..=5 => code.push((i32::from(op::ICONST_0) + value) as u8),
                    -128..=127 => code.extend([op::BIPUSH, *value as i8 as u8]),
                    -32768..=32767 => {
                        code.push(op::SIPUSH);
                        code.extend((*value as i16).to_be_bytes());
                    }
                    _ => emit_ldc(&mut code, pool.intern(PoolKey::Integer(*value))),
                },
                Op::LdcInt(value) => emit_ldc(&mut code, pool.intern(PoolKey::Integer(*value))),
                Op::LdcString(value) => {
                    emit_ldc(&mut code, pool.intern(PoolKey::String(value.clone())));
                }
                Op::LdcLong(value) => {
                    code.push(op::LDC2_W);
                    code.extend(pool.intern(PoolKey::Long(*value)).to_be_bytes());
                }
                Op::Local(opcode, slot) => match (*opcode, *slot) {
                    (opcode, 0..=3) => {
                        let base = if opcode >= op::ISTORE {
                            op::ISTORE_0 + (opcode - op::ISTORE) * 4
                        } else {
                            op::ILOAD_0 + (opcode - op::ILOAD) * 4
                        };
                        code.push(base + *slot as u8);
                    }
                    (opcode, 4..=255) => code.extend([opcode, *slot as u8]),
                    (opcode, slot) => {
                        code.extend([op::WIDE, opcode]);
                        code.extend(slot.to_be_bytes());
                    }
                },
                Op::Iinc(slot, delta) => {
                    if *slot <= 255 && i8::try_from(*delta).is_ok() {
                        code.extend([op::IINC, *slot as u8, *delta as i8 as u8]);
                    } else {
                        code.extend([op::WIDE, op::IINC]);
                        code.extend(slot.to_be_bytes());
                        code.extend(delta.to_be_bytes());
                    }
                }
                Op::Invoke {
                    opcode,
                    owner,
                    name,
                    descriptor,
                } => {
                    let (owner, name, descriptor) =
                        (owner.clone(), name.clone(), descriptor.clone());
                    let index = if *opcode == op::INVOKEINTERFACE {
                        pool.intern(PoolKey::InterfaceMethod(owner, name, descriptor))
                    } else {
                        pool.intern(PoolKey::Method(owner, name, descriptor))
                    };
                    code.push(*opcode);
                    code.extend(index.to_be_bytes());
                    if *opcode == op::INVOKEINTERFACE {
                        code.extend([1, 0]);
                    }
                }
                Op::Field {
                    opcode,
                    owner,
                    name,
                    descriptor,
                } => {
                    let index = pool.intern(PoolKey::Field(
                        owner.clone(),
                        name.clone(),
                        descriptor.clone(),
                    ));
                    code.push(*opcode);
                    code.extend(index.to_be_bytes());
                }
                Op::Lambda {
                    name,
                    descriptor,
                    factory,
                    implementation,
                    sam,
                } => {
                    let factory = pool.intern(PoolKey::Method(
                        LAMBDA_METAFACTORY.to_string(),
                        factory.clone(),
                        METAFACTORY_DESCRIPTOR.to_string(),
                    ));
                    let factory = pool.intern(PoolKey::MethodHandle(REF_INVOKE_STATIC, factory));
                    let target = pool.intern(PoolKey::Method(
                        implementation.0.clone(),
                        implementation.1.clone(),
                        implementation.2.clone(),
                    ));
                    let arguments = vec![
                        pool.intern(PoolKey::MethodType(sam.clone())),
                        pool.intern(PoolKey::MethodHandle(REF_INVOKE_STATIC, target)),
                        pool.intern(PoolKey::MethodType(sam.clone())),
                    ];
                    let bootstrap = pool.bootstrap_method(factory, arguments);
                    let name_and_type =
                        pool.intern(PoolKey::NameAndType(name.clone(), descriptor.clone()));
                    let call_site = pool.intern(PoolKey::InvokeDynamic(bootstrap, name_and_type));
                    code.push(op::INVOKEDYNAMIC);
                    code.extend(call_site.to_be_bytes());
                    code.extend([0, 0]);
                }
                Op::Jump(opcode, label) => {
                    code.push(*opcode);
                    fixups.push((offset, label.0));
                    code.extend([0, 0]);
                }
                Op::Place(label) => positions[label.0] = Some(offset),
                Op::Line(line) => lines.push((offset as u16, *line)),
            }
        }

        let code_len = code.len();
        let resolve = |label: usize| positions[label].unwrap_or(code_len);
        let patches: Vec<(usize, i16)> = fixups
            .iter()
            .map(|(offset, label)| (*offset, (resolve(*label) as i64 - *offset as i64) as i16))
            .collect();
        for (offset, delta) in patches {
            code[offset + 1..offset + 3].copy_from_slice(&delta.to_be_bytes());
        }

        let handlers: Vec<[u16; 4]> = self
            .handlers
            .iter()
            .map(|(start, end, handler, catch_type)| {
                [
                    resolve(start.0) as u16,
                    resolve(end.0) as u16,
                    resolve(handler.0) as u16,
                    catch_type.as_deref().map_or(0, |name| pool.class(name)),
                ]
            })
            .collect();

        let mut attributes = Vec::new();
        if !lines.is_empty() {
            let mut table = (lines.len() as u16).to_be_bytes().to_vec();
            for (pc, line) in &lines {
                table.extend(pc.to_be_bytes());
                table.extend(line.to_be_bytes());
            }
            attributes.push(("LineNumberTable", table));
        }
        if !self.locals.is_empty() {
            let mut table = (self.locals.len() as u16).to_be_bytes().to_vec();
            for (name, descriptor, slot) in &self.locals {
                table.extend(0u16.to_be_bytes());
                table.extend((code_len as u16).to_be_bytes());
                table.extend(pool.utf8(name).to_be_bytes());
                table.extend(pool.utf8(descriptor).to_be_bytes());
                table.extend(slot.to_be_bytes());
            }
            attributes.push(("LocalVariableTable", table));
        }

        let mut data = Vec::new();
        data.extend(16u16.to_be_bytes());
        data.extend(16u16.to_be_bytes());
        data.extend((code.len() as u32).to_be_bytes());
        data.extend(&code);
        data.extend((handlers.len() as u16).to_be_bytes());
        for handler in handlers {
            for value in handler {
                data.extend(value.to_be_bytes());
            }
        }
        encode_attributes(&mut data, pool, attributes);
        data
    }
}

fn emit_ldc(code: &mut Vec<u8>, index: u16) {
    match u8::try_from(index) {
        Ok(index) => code.extend([op::LDC, index]),
        Err(_) => {
            code.push(op::LDC_W);
            code.extend(index.to_be_bytes());
        }
    }
}

fn encode_attributes(out: &mut Vec<u8>, pool: &mut PoolBuilder, attributes: Vec<(&str, Vec<u8>)>) {
    out.extend((attributes.len() as u16).to_be_bytes());
    for (name, data) in attributes {
        out.extend(pool.utf8(name).to_be_bytes());
        out.extend((data.len() as u32).to_be_bytes());
        out.extend(data);
    }
}

/// Describes one method of a class built by [`ClassBuilder`].
#[derive(Debug, Clone)]
pub struct MethodBuilder {
    name: String,
    descriptor: String,
    access: MethodAccessFlags,
    keys: Vec<(String, i32)>,
    code: Option<CodeBuilder>,
}

impl MethodBuilder {
    fn new(name: &str, descriptor: &str) -> Self {
        MethodBuilder {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            access: MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
            keys: Vec::new(),
            code: None,
        }
    }

    /// Replace the access flags (`public static` by default).
    #[must_use]
    pub fn access(mut self, access: MethodAccessFlags) -> Self {
        self.access = access;
        self
    }

    /// Attach a runtime-visible annotation of type `annotation` with an `int` element `key`.
    #[must_use]
    pub fn function_key(mut self, annotation: &str, key: i32) -> Self {
        self.keys.push((annotation.to_string(), key));
        self
    }

    /// Give the method a body. Methods without one are emitted without a `Code` attribute.
    #[must_use]
    pub fn code<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut CodeBuilder),
    {
        let mut code = CodeBuilder::default();
        f(&mut code);
        self.code = Some(code);
        self
    }

    fn encode(&self, pool: &mut PoolBuilder) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(self.access.bits().to_be_bytes());
        out.extend(pool.utf8(&self.name).to_be_bytes());
        out.extend(pool.utf8(&self.descriptor).to_be_bytes());

        let mut attributes = Vec::new();
        if let Some(code) = &self.code {
            attributes.push(("Code", code.encode(pool)));
        }
        if !self.keys.is_empty() {
            let mut data = (self.keys.len() as u16).to_be_bytes().to_vec();
            for (annotation, key) in &self.keys {
                data.extend(pool.utf8(annotation).to_be_bytes());
                data.extend(1u16.to_be_bytes());
                data.extend(pool.utf8("key").to_be_bytes());
                data.push(b'I');
                data.extend(pool.intern(PoolKey::Integer(*key)).to_be_bytes());
            }
            attributes.push(("RuntimeVisibleAnnotations", data));
        }
        encode_attributes(&mut out, pool, attributes);
        out
    }
}

/// Assembles a class file.
#[derive(Debug, Clone)]
pub struct ClassBuilder {
    name: String,
    super_name: String,
    source_file: Option<String>,
    reserved: Vec<String>,
    methods: Vec<MethodBuilder>,
}

impl ClassBuilder {
    /// Start a class with internal name `name` extending `java/lang/Object`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        ClassBuilder {
            name: name.to_string(),
            super_name: "java/lang/Object".to_string(),
            source_file: None,
            reserved: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Set the superclass.
    #[must_use]
    pub fn super_class(mut self, name: &str) -> Self {
        self.super_name = name.to_string();
        self
    }

    /// Emit a `SourceFile` attribute.
    #[must_use]
    pub fn source_file(mut self, name: &str) -> Self {
        self.source_file = Some(name.to_string());
        self
    }

    /// Intern a `Utf8` constant ahead of everything else, shifting later pool indices.
    #[must_use]
    pub fn reserve_constant(mut self, value: &str) -> Self {
        self.reserved.push(value.to_string());
        self
    }

    /// Add a method.
    #[must_use]
    pub fn method<F>(mut self, name: &str, descriptor: &str, f: F) -> Self
    where
        F: FnOnce(MethodBuilder) -> MethodBuilder,
    {
        self.methods.push(f(MethodBuilder::new(name, descriptor)));
        self
    }

    /// Encode the class file.
    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let mut pool = PoolBuilder::new();
        for value in &self.reserved {
            pool.utf8(value);
        }

        let this_class = pool.class(&self.name);
        let super_class = pool.class(&self.super_name);

        let mut body = Vec::new();
        body.extend(0x0021u16.to_be_bytes());
        body.extend(this_class.to_be_bytes());
        body.extend(super_class.to_be_bytes());
        body.extend(0u16.to_be_bytes());
        body.extend(0u16.to_be_bytes());
        body.extend((self.methods.len() as u16).to_be_bytes());
        for method in &self.methods {
            body.extend(method.encode(&mut pool));
        }

        let mut attributes = Vec::new();
        if let Some(source) = &self.source_file {
            attributes.push(("SourceFile", pool.utf8(source).to_be_bytes().to_vec()));
        }
        if !pool.bootstrap.is_empty() {
            let mut data = (pool.bootstrap.len() as u16).to_be_bytes().to_vec();
            for (method, arguments) in &pool.bootstrap {
                data.extend(method.to_be_bytes());
                data.extend((arguments.len() as u16).to_be_bytes());
                for argument in arguments {
                    data.extend(argument.to_be_bytes());
                }
            }
            attributes.push(("BootstrapMethods", data));
        }
        encode_attributes(&mut body, &mut pool, attributes);

        let mut out = Vec::with_capacity(body.len() + pool.bytes.len() + 10);
        out.extend(0xCAFE_BABEu32.to_be_bytes());
        out.extend(0u16.to_be_bytes());
        out.extend(52u16.to_be_bytes());
        out.extend(pool.next.to_be_bytes());
        out.extend(&pool.bytes);
        out.extend(body);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classfile::{ClassUnit, Constant},
        disassembler::{Instruction, LabelId},
    };

    #[test]
    fn iconst_encodings() {
        let bytes = ClassBuilder::new("A")
            .method("m", "()V", |method| {
                method.code(|code| {
                    code.iconst(-1)
                        .iconst(5)
                        .iconst(100)
                        .iconst(1902)
                        .iconst(100_000)
                        .return_void();
                })
            })
            .build();
        let class = ClassUnit::parse(&bytes).unwrap();
        let method = &class.methods()[0];
        let code = method.code().unwrap();

        assert_eq!(code.code[0], op::ICONST_M1);
        assert_eq!(code.code[1], op::ICONST_5);
        assert_eq!(code.code[2], op::BIPUSH);
        assert_eq!(code.code[4], op::SIPUSH);
        assert_eq!(code.code[7], op::LDC);

        let values: Vec<_> = method
            .instructions(&class)
            .unwrap()
            .iter()
            .filter_map(Instruction::int_value)
            .collect();
        assert_eq!(values, vec![-1, 5, 100, 1902, 100_000]);
    }

    #[test]
    fn short_local_forms() {
        let bytes = ClassBuilder::new("A")
            .method("m", "()V", |method| {
                method.code(|code| {
                    code.aload(0).astore(3).iload(4).iinc(300, 1).return_void();
                })
            })
            .build();
        let class = ClassUnit::parse(&bytes).unwrap();
        let code = class.methods()[0].code().unwrap();

        assert_eq!(code.code[0], op::ALOAD_0);
        assert_eq!(code.code[1], op::ASTORE_3);
        assert_eq!(&code.code[2..4], &[op::ILOAD, 4]);
        assert_eq!(&code.code[4..6], &[op::WIDE, op::IINC]);
    }

    #[test]
    fn branches_and_handlers() {
        let bytes = ClassBuilder::new("A")
            .method("m", "(I)V", |method| {
                method.code(|code| {
                    let start = code.new_label();
                    let end = code.new_label();
                    let handler = code.new_label();
                    code.place(start)
                        .iload(0)
                        .ifeq(end)
                        .nop()
                        .place(end)
                        .return_void()
                        .place(handler)
                        .pop()
                        .return_void()
                        .try_catch(start, end, handler, Some("java/lang/Exception"));
                })
            })
            .build();
        let class = ClassUnit::parse(&bytes).unwrap();
        let instructions = class.methods()[0].instructions(&class).unwrap();

        let labels: Vec<_> = instructions
            .iter()
            .filter_map(|instruction| match instruction {
                Instruction::Label(label) => Some(*label),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec![LabelId(0), LabelId(1), LabelId(2)]);
        assert_eq!(instructions[0], Instruction::Label(LabelId(0)));
    }

    #[test]
    fn lambda_bootstrap_is_shared() {
        let bytes = ClassBuilder::new("A")
            .method("m", "()V", |method| {
                method.code(|code| {
                    for _ in 0..2 {
                        code.invoke_lambda(
                            "run",
                            "()Ljava/lang/Runnable;",
                            ("A", "m$lambda$0", "()V"),
                            "()V",
                        )
                        .pop();
                    }
                    code.return_void();
                })
            })
            .build();
        let class = ClassUnit::parse(&bytes).unwrap();
        assert_eq!(class.bootstrap_methods().len(), 1);

        let instructions = class.methods()[0].instructions(&class).unwrap();
        match &instructions[0] {
            Instruction::Dynamic {
                name,
                bootstrap,
                arguments,
                ..
            } => {
                assert_eq!(name, "run");
                assert_eq!(bootstrap.owner, LAMBDA_METAFACTORY);
                assert_eq!(bootstrap.name, "metafactory");
                assert!(matches!(
                    &arguments[1],
                    Constant::MethodHandle(handle) if handle.name == "m$lambda$0"
                ));
            }
            other => panic!("Expected invokedynamic, got {other}"),
        }
    }

    #[test]
    fn modified_utf8_roundtrip() {
        let bytes = ClassBuilder::new("A")
            .method("m", "()V", |method| {
                method.code(|code| {
                    code.ldc_string("nul\0 é \u{1F600}").pop().return_void();
                })
            })
            .build();
        let class = ClassUnit::parse(&bytes).unwrap();
        let instructions = class.methods()[0].instructions(&class).unwrap();

        assert_eq!(
            instructions[0],
            Instruction::Constant {
                opcode: op::LDC,
                value: Constant::String("nul\0 é \u{1F600}".to_string())
            }
        );
    }
}
