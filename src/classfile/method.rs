//! Methods of a class file and their identity.
//!
//! # Key Types
//! - [`MethodId`] - Identity of a method across class versions: class, name and descriptor
//! - [`MethodUnit`] - One method as declared in a class file
//! - [`MethodAccessFlags`] - `access_flags` of a `method_info`

use std::fmt;

use bitflags::bitflags;

use crate::{
    classfile::{
        attributes::{
            names, parse_annotations, parse_raw_attributes, Annotation, CodeAttribute,
            ElementValue, RawAttribute,
        },
        ClassUnit, ConstantPool,
    },
    disassembler::{decode_code, Instruction},
    file::parser::Parser,
    Result,
};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Method access and property flags (§4.6)
    pub struct MethodAccessFlags: u16 {
        /// Declared `public`
        const PUBLIC = 0x0001;
        /// Declared `private`
        const PRIVATE = 0x0002;
        /// Declared `protected`
        const PROTECTED = 0x0004;
        /// Declared `static`
        const STATIC = 0x0008;
        /// Declared `final`
        const FINAL = 0x0010;
        /// Declared `synchronized`
        const SYNCHRONIZED = 0x0020;
        /// Compiler-generated bridge method
        const BRIDGE = 0x0040;
        /// Variable arity
        const VARARGS = 0x0080;
        /// Declared `native`
        const NATIVE = 0x0100;
        /// Declared `abstract`
        const ABSTRACT = 0x0400;
        /// Declared `strictfp`
        const STRICT = 0x0800;
        /// Not present in source code
        const SYNTHETIC = 0x1000;
    }
}

/// Identity of a method: owning class, method name and descriptor.
///
/// The identity survives redefinition, which is what lets a new version of a method replace
/// the scopes recorded for the old one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodId {
    /// Internal name of the owning class (`com/example/AppKt`)
    pub class: String,
    /// Method name
    pub name: String,
    /// Method descriptor (`(Landroidx/compose/runtime/Composer;I)V`)
    pub descriptor: String,
}

impl MethodId {
    /// Create a new method identity.
    pub fn new(
        class: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        MethodId {
            class: class.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    /// `Class.name` without the descriptor, as used in log output.
    #[must_use]
    pub fn short_name(&self) -> String {
        format!("{}.{}", self.class, self.name)
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.class, self.name, self.descriptor)
    }
}

/// One method of a class file.
///
/// The `Code` attribute is kept undecoded; [`MethodUnit::instructions`] decodes it on demand,
/// which keeps a single broken method from failing the whole class.
#[derive(Debug, Clone)]
pub struct MethodUnit {
    id: MethodId,
    access: MethodAccessFlags,
    code: Option<CodeAttribute>,
    annotations: Vec<Annotation>,
    attributes: Vec<RawAttribute>,
}

impl MethodUnit {
    /// Parse one `method_info` structure.
    ///
    /// # Errors
    /// Returns an error if the structure is truncated or its `Code` or annotation attributes
    /// are malformed.
    pub(crate) fn parse(parser: &mut Parser, pool: &ConstantPool, class: &str) -> Result<Self> {
        let access = MethodAccessFlags::from_bits_truncate(parser.read_be::<u16>()?);
        let name = pool.utf8(parser.read_be::<u16>()?)?;
        let descriptor = pool.utf8(parser.read_be::<u16>()?)?;
        let id = MethodId::new(class, name, descriptor);

        let mut code = None;
        let mut annotations = Vec::new();
        let mut attributes = Vec::new();
        for attribute in parse_raw_attributes(parser, pool)? {
            match attribute.name.as_str() {
                names::CODE => {
                    if code.is_some() {
                        return Err(malformed_error!("{} has more than one Code attribute", id));
                    }
                    code = Some(CodeAttribute::parse(&attribute.data, pool)?);
                }
                names::RUNTIME_VISIBLE_ANNOTATIONS => {
                    annotations.extend(parse_annotations(&attribute.data, pool)?);
                }
                _ => attributes.push(attribute),
            }
        }

        Ok(MethodUnit {
            id,
            access,
            code,
            annotations,
            attributes,
        })
    }

    /// The method's identity.
    #[must_use]
    pub fn id(&self) -> &MethodId {
        &self.id
    }

    /// Method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.id.name
    }

    /// Method descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &str {
        &self.id.descriptor
    }

    /// Access flags.
    #[must_use]
    pub fn access_flags(&self) -> MethodAccessFlags {
        self.access
    }

    /// The `Code` attribute, absent for abstract and native methods.
    #[must_use]
    pub fn code(&self) -> Option<&CodeAttribute> {
        self.code.as_ref()
    }

    /// Runtime-visible annotations of the method.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Attributes not interpreted by the parser.
    #[must_use]
    pub fn attributes(&self) -> &[RawAttribute] {
        &self.attributes
    }

    /// Decode the method body into its normalized instruction sequence.
    ///
    /// Methods without code yield an empty sequence.
    ///
    /// # Errors
    /// Returns a decode error if the bytecode is invalid, see
    /// [`crate::disassembler::decode_code`].
    pub fn instructions(&self, class: &ClassUnit) -> Result<Vec<Instruction>> {
        match &self.code {
            Some(code) => decode_code(code, class.constant_pool(), class.bootstrap_methods()),
            None => Ok(Vec::new()),
        }
    }

    /// The `key` element of the annotation with type `annotation`, if present and an `int`.
    ///
    /// ```rust
    /// use groupscope::classfile::{ClassBuilder, ClassUnit};
    ///
    /// let bytes = ClassBuilder::new("AppKt")
    ///     .method("App", "()V", |method| {
    ///         method.function_key("Lcom/example/Key;", 1902).code(|code| {
    ///             code.return_void();
    ///         })
    ///     })
    ///     .build();
    /// let class = ClassUnit::parse(&bytes)?;
    /// assert_eq!(class.methods()[0].function_key("Lcom/example/Key;"), Some(1902));
    /// # Ok::<(), groupscope::Error>(())
    /// ```
    #[must_use]
    pub fn function_key(&self, annotation: &str) -> Option<i32> {
        self.annotations
            .iter()
            .filter(|candidate| candidate.descriptor == annotation)
            .find_map(|candidate| match candidate.element("key") {
                Some(ElementValue::Int(key)) => Some(*key),
                _ => None,
            })
    }
}
