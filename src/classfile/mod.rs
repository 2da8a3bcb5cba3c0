//! JVM class file parsing.
//!
//! A [`ClassUnit`] is the decoded form of one `.class` file: its name, the constant pool, the
//! bootstrap method table and the declared methods. Method bodies are kept as undecoded
//! `Code` attributes until [`MethodUnit::instructions`] is asked for them, so that a broken
//! method body costs only that method.
//!
//! # Key Types
//! - [`ClassUnit`] - A parsed class file
//! - [`MethodUnit`] / [`MethodId`] - A method and its identity
//! - [`ConstantPool`] - Constant pool with typed lookups
//! - [`ClassBuilder`] - Assembler producing class file bytes
//!
//! # Example
//!
//! ```rust
//! use groupscope::classfile::{ClassBuilder, ClassUnit};
//! use groupscope::AnalysisConfig;
//!
//! let bytes = ClassBuilder::new("androidx/compose/runtime/Recomposer").build();
//! assert_eq!(ClassUnit::peek_name(&bytes)?, "androidx/compose/runtime/Recomposer");
//!
//! let class = ClassUnit::parse(&bytes)?;
//! assert!(class.is_excluded(&AnalysisConfig::default()));
//! # Ok::<(), groupscope::Error>(())
//! ```

mod attributes;
mod builder;
mod constantpool;
mod method;

use std::path::Path;

use bitflags::bitflags;

pub use attributes::{
    Annotation, CodeAttribute, ElementValue, ExceptionHandler, RawAttribute,
};
pub use builder::{ClassBuilder, CodeBuilder, Label, MethodBuilder};
pub use constantpool::{
    decode_modified_utf8, tags, BootstrapMethodRef, Constant, ConstantPool, ConstantPoolEntry,
    Handle, MemberRef,
};
pub use method::{MethodAccessFlags, MethodId, MethodUnit};

use crate::{
    classfile::attributes::{names, parse_bootstrap_methods, parse_raw_attributes},
    config::AnalysisConfig,
    file::{parser::Parser, File},
    Error, Result,
};

/// Class file magic number.
pub const MAGIC: u32 = 0xCAFE_BABE;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Class access and property flags (§4.1)
    pub struct ClassAccessFlags: u16 {
        /// Declared `public`
        const PUBLIC = 0x0001;
        /// Declared `final`
        const FINAL = 0x0010;
        /// Treat superclass methods specially in `invokespecial`
        const SUPER = 0x0020;
        /// Is an interface
        const INTERFACE = 0x0200;
        /// Declared `abstract`
        const ABSTRACT = 0x0400;
        /// Not present in source code
        const SYNTHETIC = 0x1000;
        /// Declared as an annotation interface
        const ANNOTATION = 0x2000;
        /// Declared as an enum class
        const ENUM = 0x4000;
        /// Is a module descriptor
        const MODULE = 0x8000;
    }
}

/// A parsed class file.
#[derive(Debug, Clone)]
pub struct ClassUnit {
    minor_version: u16,
    major_version: u16,
    access: ClassAccessFlags,
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    pool: ConstantPool,
    bootstrap_methods: Vec<BootstrapMethodRef>,
    methods: Vec<MethodUnit>,
    attributes: Vec<RawAttribute>,
}

/// Header fields shared by [`ClassUnit::parse`] and [`ClassUnit::peek_name`].
struct Header<'a> {
    parser: Parser<'a>,
    minor_version: u16,
    major_version: u16,
    pool: ConstantPool,
    access: ClassAccessFlags,
    name: String,
}

impl<'a> Header<'a> {
    fn parse(data: &'a [u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::Empty);
        }

        let mut parser = Parser::new(data);
        if data.len() < 10 || parser.read_be::<u32>()? != MAGIC {
            return Err(Error::NotSupported);
        }

        let minor_version = parser.read_be::<u16>()?;
        let major_version = parser.read_be::<u16>()?;
        let pool_count = parser.read_be::<u16>()?;
        let pool = ConstantPool::parse(&mut parser, pool_count)?;
        let access = ClassAccessFlags::from_bits_truncate(parser.read_be::<u16>()?);
        let name = pool.class_name(parser.read_be::<u16>()?)?.to_string();

        Ok(Header {
            parser,
            minor_version,
            major_version,
            pool,
            access,
            name,
        })
    }
}

impl ClassUnit {
    /// Parse a class file from memory.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] for empty input, [`crate::Error::NotSupported`] if the
    /// magic does not match, and [`crate::Error::Malformed`] or [`crate::Error::OutOfBounds`]
    /// for damaged class files.
    pub fn parse(data: &[u8]) -> Result<ClassUnit> {
        let Header {
            mut parser,
            minor_version,
            major_version,
            pool,
            access,
            name,
        } = Header::parse(data)?;

        let super_name = match parser.read_be::<u16>()? {
            0 => None,
            index => Some(pool.class_name(index)?.to_string()),
        };

        let interface_count = parser.read_be::<u16>()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interfaces.push(pool.class_name(parser.read_be::<u16>()?)?.to_string());
        }

        let field_count = parser.read_be::<u16>()?;
        for _ in 0..field_count {
            parser.advance_by(6)?;
            parse_raw_attributes(&mut parser, &pool)?;
        }

        let method_count = parser.read_be::<u16>()?;
        let mut methods = Vec::with_capacity(method_count as usize);
        for _ in 0..method_count {
            methods.push(MethodUnit::parse(&mut parser, &pool, &name)?);
        }

        let mut bootstrap_methods = Vec::new();
        let mut attributes = Vec::new();
        for attribute in parse_raw_attributes(&mut parser, &pool)? {
            if attribute.name == names::BOOTSTRAP_METHODS {
                bootstrap_methods = parse_bootstrap_methods(&attribute.data)?;
            } else {
                attributes.push(attribute);
            }
        }

        if parser.has_more_data() {
            return Err(malformed_error!(
                "{} trailing bytes after class {}",
                parser.len() - parser.pos(),
                name
            ));
        }

        Ok(ClassUnit {
            minor_version,
            major_version,
            access,
            name,
            super_name,
            interfaces,
            pool,
            bootstrap_methods,
            methods,
            attributes,
        })
    }

    /// Read only as far as the class name.
    ///
    /// Cheaper than [`ClassUnit::parse`] for deciding whether a class is excluded before
    /// paying for the rest of the decode.
    ///
    /// # Errors
    /// Same as [`ClassUnit::parse`], limited to the header and constant pool.
    pub fn peek_name(data: &[u8]) -> Result<String> {
        Ok(Header::parse(data)?.name)
    }

    /// Memory-map and parse a `.class` file.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened, otherwise the same
    /// errors as [`ClassUnit::parse`].
    pub fn from_file(path: &Path) -> Result<ClassUnit> {
        let file = File::from_file(path)?;
        ClassUnit::parse(file.data())
    }

    /// Returns `true` if the class lives under one of the configured excluded namespaces.
    #[must_use]
    pub fn is_excluded(&self, config: &AnalysisConfig) -> bool {
        config.is_class_excluded(&self.name)
    }

    /// Internal name of the class.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Internal name of the superclass, `None` for `java/lang/Object` and module descriptors.
    #[must_use]
    pub fn super_name(&self) -> Option<&str> {
        self.super_name.as_deref()
    }

    /// Directly implemented interfaces.
    #[must_use]
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// Access flags.
    #[must_use]
    pub fn access_flags(&self) -> ClassAccessFlags {
        self.access
    }

    /// `(major, minor)` class file version.
    #[must_use]
    pub fn version(&self) -> (u16, u16) {
        (self.major_version, self.minor_version)
    }

    /// The constant pool.
    #[must_use]
    pub fn constant_pool(&self) -> &ConstantPool {
        &self.pool
    }

    /// Entries of the `BootstrapMethods` attribute.
    #[must_use]
    pub fn bootstrap_methods(&self) -> &[BootstrapMethodRef] {
        &self.bootstrap_methods
    }

    /// Declared methods in class file order.
    #[must_use]
    pub fn methods(&self) -> &[MethodUnit] {
        &self.methods
    }

    /// Class attributes other than `BootstrapMethods`.
    #[must_use]
    pub fn attributes(&self) -> &[RawAttribute] {
        &self.attributes
    }
}
