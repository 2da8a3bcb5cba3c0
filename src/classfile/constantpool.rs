//! Class file constant pool.
//!
//! The constant pool is the symbol table of a class file: every class, member, string and
//! numeric literal an instruction refers to is stored here and addressed by a 1-based `u2`
//! index. This module decodes the pool into [`ConstantPoolEntry`] values and offers typed
//! accessors that resolve the reference chains (`Methodref` → `Class` + `NameAndType` →
//! `Utf8`) into owned names.
//!
//! # Key Types
//! - [`ConstantPool`] - The decoded pool with typed lookups
//! - [`ConstantPoolEntry`] - One raw entry
//! - [`Constant`] - A loadable literal (`ldc` operand, bootstrap argument, annotation value)
//! - [`Handle`] - A resolved `CONSTANT_MethodHandle`
//! - [`MemberRef`] - A resolved field or method reference

use std::fmt;

use crate::{file::parser::Parser, Error, Result};

/// Constant pool tag values as defined by the JVM specification (§4.4).
pub mod tags {
    /// `CONSTANT_Utf8`
    pub const UTF8: u8 = 1;
    /// `CONSTANT_Integer`
    pub const INTEGER: u8 = 3;
    /// `CONSTANT_Float`
    pub const FLOAT: u8 = 4;
    /// `CONSTANT_Long`
    pub const LONG: u8 = 5;
    /// `CONSTANT_Double`
    pub const DOUBLE: u8 = 6;
    /// `CONSTANT_Class`
    pub const CLASS: u8 = 7;
    /// `CONSTANT_String`
    pub const STRING: u8 = 8;
    /// `CONSTANT_Fieldref`
    pub const FIELDREF: u8 = 9;
    /// `CONSTANT_Methodref`
    pub const METHODREF: u8 = 10;
    /// `CONSTANT_InterfaceMethodref`
    pub const INTERFACE_METHODREF: u8 = 11;
    /// `CONSTANT_NameAndType`
    pub const NAME_AND_TYPE: u8 = 12;
    /// `CONSTANT_MethodHandle`
    pub const METHOD_HANDLE: u8 = 15;
    /// `CONSTANT_MethodType`
    pub const METHOD_TYPE: u8 = 16;
    /// `CONSTANT_Dynamic`
    pub const DYNAMIC: u8 = 17;
    /// `CONSTANT_InvokeDynamic`
    pub const INVOKE_DYNAMIC: u8 = 18;
    /// `CONSTANT_Module`
    pub const MODULE: u8 = 19;
    /// `CONSTANT_Package`
    pub const PACKAGE: u8 = 20;
}

/// One entry of the constant pool, with references kept as raw indices.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantPoolEntry {
    /// Index 0 and the second slot of `Long`/`Double` entries
    Unusable,
    /// Modified UTF-8 string
    Utf8(String),
    /// 32-bit integer literal
    Integer(i32),
    /// 32-bit float literal
    Float(f32),
    /// 64-bit integer literal (occupies two slots)
    Long(i64),
    /// 64-bit float literal (occupies two slots)
    Double(f64),
    /// Class or interface reference
    Class {
        /// `Utf8` index of the internal name
        name_index: u16,
    },
    /// String literal
    String {
        /// `Utf8` index of the value
        string_index: u16,
    },
    /// Field reference
    Fieldref {
        /// `Class` index of the owner
        class_index: u16,
        /// `NameAndType` index
        name_and_type_index: u16,
    },
    /// Method reference on a class
    Methodref {
        /// `Class` index of the owner
        class_index: u16,
        /// `NameAndType` index
        name_and_type_index: u16,
    },
    /// Method reference on an interface
    InterfaceMethodref {
        /// `Class` index of the owner
        class_index: u16,
        /// `NameAndType` index
        name_and_type_index: u16,
    },
    /// Name and descriptor pair
    NameAndType {
        /// `Utf8` index of the name
        name_index: u16,
        /// `Utf8` index of the descriptor
        descriptor_index: u16,
    },
    /// Method handle
    MethodHandle {
        /// Handle kind (1..=9)
        reference_kind: u8,
        /// Index of the referenced member
        reference_index: u16,
    },
    /// Method type
    MethodType {
        /// `Utf8` index of the descriptor
        descriptor_index: u16,
    },
    /// Dynamically-computed constant
    Dynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method_attr_index: u16,
        /// `NameAndType` index
        name_and_type_index: u16,
    },
    /// Dynamically-computed call site
    InvokeDynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method_attr_index: u16,
        /// `NameAndType` index
        name_and_type_index: u16,
    },
    /// Module name
    Module {
        /// `Utf8` index of the name
        name_index: u16,
    },
    /// Package name
    Package {
        /// `Utf8` index of the name
        name_index: u16,
    },
}

/// A resolved `CONSTANT_MethodHandle`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle {
    /// Reference kind (`REF_invokeStatic` = 6, ...)
    pub kind: u8,
    /// Internal name of the owning class
    pub owner: String,
    /// Member name
    pub name: String,
    /// Member descriptor
    pub descriptor: String,
    /// Whether the owner is an interface
    pub interface: bool,
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{} ({})", self.owner, self.name, self.descriptor, self.kind)
    }
}

/// A resolved field or method reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    /// Internal name of the owning class
    pub owner: String,
    /// Member name
    pub name: String,
    /// Member descriptor
    pub descriptor: String,
    /// `true` if the reference is an `InterfaceMethodref`
    pub interface: bool,
}

/// A loadable constant value.
///
/// Used for `ldc` operands, the implicit values of `iconst_<n>`-style instructions,
/// bootstrap method arguments and annotation element values.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// `aconst_null`
    Null,
    /// `int` (also `byte`, `char`, `short`, `boolean` in annotations)
    Int(i32),
    /// `float`
    Float(f32),
    /// `long`
    Long(i64),
    /// `double`
    Double(f64),
    /// `java.lang.String`
    String(String),
    /// `java.lang.Class` (internal name or array descriptor)
    Class(String),
    /// `java.lang.invoke.MethodType`
    MethodType(String),
    /// `java.lang.invoke.MethodHandle`
    MethodHandle(Handle),
    /// Dynamically-computed constant
    Dynamic {
        /// Constant name
        name: String,
        /// Field descriptor of the constant
        descriptor: String,
        /// Bootstrap method producing the value
        bootstrap: Handle,
    },
}

impl Constant {
    /// The integer value, if this constant is an `int`.
    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Constant::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Null => write!(f, "null"),
            Constant::Int(value) => write!(f, "{value}"),
            Constant::Float(value) => write!(f, "{value}f"),
            Constant::Long(value) => write!(f, "{value}L"),
            Constant::Double(value) => write!(f, "{value}d"),
            Constant::String(value) => write!(f, "{value:?}"),
            Constant::Class(value) => write!(f, "{value}.class"),
            Constant::MethodType(value) => write!(f, "{value}"),
            Constant::MethodHandle(handle) => write!(f, "{handle}"),
            Constant::Dynamic {
                name, descriptor, ..
            } => write!(f, "condy {name}{descriptor}"),
        }
    }
}

/// A `BootstrapMethods` attribute entry with its arguments still unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapMethodRef {
    /// `MethodHandle` index of the bootstrap method
    pub method_ref: u16,
    /// Loadable constant indices of the static arguments
    pub arguments: Vec<u16>,
}

/// The decoded constant pool of a class file.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    entries: Vec<ConstantPoolEntry>,
}

impl ConstantPool {
    /// Parse `count - 1` entries from the parser's current position.
    ///
    /// `count` is the `constant_pool_count` field, which is one larger than the number of
    /// addressable slots.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for unknown tags or truncated entries.
    pub fn parse(parser: &mut Parser, count: u16) -> Result<ConstantPool> {
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(ConstantPoolEntry::Unusable);

        while entries.len() < count as usize {
            let tag = parser.read_be::<u8>()?;
            let entry = match tag {
                tags::UTF8 => {
                    let len = parser.read_be::<u16>()? as usize;
                    ConstantPoolEntry::Utf8(decode_modified_utf8(parser.read_bytes(len)?)?)
                }
                tags::INTEGER => ConstantPoolEntry::Integer(parser.read_be::<i32>()?),
                tags::FLOAT => ConstantPoolEntry::Float(parser.read_be::<f32>()?),
                tags::LONG => ConstantPoolEntry::Long(parser.read_be::<i64>()?),
                tags::DOUBLE => ConstantPoolEntry::Double(parser.read_be::<f64>()?),
                tags::CLASS => ConstantPoolEntry::Class {
                    name_index: parser.read_be::<u16>()?,
                },
                tags::STRING => ConstantPoolEntry::String {
                    string_index: parser.read_be::<u16>()?,
                },
                tags::FIELDREF => ConstantPoolEntry::Fieldref {
                    class_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                },
                tags::METHODREF => ConstantPoolEntry::Methodref {
                    class_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                },
                tags::INTERFACE_METHODREF => ConstantPoolEntry::InterfaceMethodref {
                    class_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                },
                tags::NAME_AND_TYPE => ConstantPoolEntry::NameAndType {
                    name_index: parser.read_be::<u16>()?,
                    descriptor_index: parser.read_be::<u16>()?,
                },
                tags::METHOD_HANDLE => ConstantPoolEntry::MethodHandle {
                    reference_kind: parser.read_be::<u8>()?,
                    reference_index: parser.read_be::<u16>()?,
                },
                tags::METHOD_TYPE => ConstantPoolEntry::MethodType {
                    descriptor_index: parser.read_be::<u16>()?,
                },
                tags::DYNAMIC => ConstantPoolEntry::Dynamic {
                    bootstrap_method_attr_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                },
                tags::INVOKE_DYNAMIC => ConstantPoolEntry::InvokeDynamic {
                    bootstrap_method_attr_index: parser.read_be::<u16>()?,
                    name_and_type_index: parser.read_be::<u16>()?,
                },
                tags::MODULE => ConstantPoolEntry::Module {
                    name_index: parser.read_be::<u16>()?,
                },
                tags::PACKAGE => ConstantPoolEntry::Package {
                    name_index: parser.read_be::<u16>()?,
                },
                _ => {
                    return Err(malformed_error!(
                        "Unknown constant pool tag {} at entry #{}",
                        tag,
                        entries.len()
                    ))
                }
            };

            let wide = matches!(
                entry,
                ConstantPoolEntry::Long(_) | ConstantPoolEntry::Double(_)
            );
            entries.push(entry);
            if wide {
                entries.push(ConstantPoolEntry::Unusable);
            }
        }

        if entries.len() != count as usize {
            return Err(malformed_error!(
                "Wide constant overruns the constant pool ({} slots declared)",
                count
            ));
        }

        Ok(ConstantPool { entries })
    }

    /// Number of slots, including the unusable slot 0.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the pool has no addressable entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Raw access to one entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::ConstantPool`] for index 0, unusable slots, or indices past the end.
    pub fn get(&self, index: u16) -> Result<&ConstantPoolEntry> {
        match self.entries.get(index as usize) {
            Some(ConstantPoolEntry::Unusable) | None => Err(Error::ConstantPool {
                index,
                expected: "entry",
            }),
            Some(entry) => Ok(entry),
        }
    }

    /// Resolve a `Utf8` entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::ConstantPool`] if the entry is missing or not `Utf8`.
    pub fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index) {
            Ok(ConstantPoolEntry::Utf8(value)) => Ok(value),
            _ => Err(Error::ConstantPool {
                index,
                expected: "Utf8",
            }),
        }
    }

    /// Resolve a `Class` entry to its internal name.
    ///
    /// # Errors
    /// Returns [`crate::Error::ConstantPool`] if the entry is missing or not `Class`.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        match self.get(index) {
            Ok(ConstantPoolEntry::Class { name_index }) => self.utf8(*name_index),
            _ => Err(Error::ConstantPool {
                index,
                expected: "Class",
            }),
        }
    }

    /// Resolve a `NameAndType` entry to `(name, descriptor)`.
    ///
    /// # Errors
    /// Returns [`crate::Error::ConstantPool`] if the entry is missing or not `NameAndType`.
    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        match self.get(index) {
            Ok(ConstantPoolEntry::NameAndType {
                name_index,
                descriptor_index,
            }) => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            _ => Err(Error::ConstantPool {
                index,
                expected: "NameAndType",
            }),
        }
    }

    /// Resolve a `Fieldref`, `Methodref` or `InterfaceMethodref` entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::ConstantPool`] if the entry is not a member reference.
    pub fn member_ref(&self, index: u16) -> Result<MemberRef> {
        let (class_index, name_and_type_index, interface) = match self.get(index) {
            Ok(ConstantPoolEntry::Fieldref {
                class_index,
                name_and_type_index,
            })
            | Ok(ConstantPoolEntry::Methodref {
                class_index,
                name_and_type_index,
            }) => (*class_index, *name_and_type_index, false),
            Ok(ConstantPoolEntry::InterfaceMethodref {
                class_index,
                name_and_type_index,
            }) => (*class_index, *name_and_type_index, true),
            _ => {
                return Err(Error::ConstantPool {
                    index,
                    expected: "member reference",
                })
            }
        };

        let (name, descriptor) = self.name_and_type(name_and_type_index)?;
        Ok(MemberRef {
            owner: self.class_name(class_index)?.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            interface,
        })
    }

    /// Resolve a `MethodHandle` entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::ConstantPool`] if the entry or its member reference is invalid.
    pub fn method_handle(&self, index: u16) -> Result<Handle> {
        match self.get(index) {
            Ok(ConstantPoolEntry::MethodHandle {
                reference_kind,
                reference_index,
            }) => {
                let member = self.member_ref(*reference_index)?;
                Ok(Handle {
                    kind: *reference_kind,
                    owner: member.owner,
                    name: member.name,
                    descriptor: member.descriptor,
                    interface: member.interface,
                })
            }
            _ => Err(Error::ConstantPool {
                index,
                expected: "MethodHandle",
            }),
        }
    }

    /// Resolve a loadable entry into a [`Constant`].
    ///
    /// Dynamic constants need the class's bootstrap table to resolve their bootstrap method.
    ///
    /// # Errors
    /// Returns [`crate::Error::ConstantPool`] if the entry is not loadable.
    pub fn loadable(&self, index: u16, bootstrap: &[BootstrapMethodRef]) -> Result<Constant> {
        Ok(match self.get(index)? {
            ConstantPoolEntry::Integer(value) => Constant::Int(*value),
            ConstantPoolEntry::Float(value) => Constant::Float(*value),
            ConstantPoolEntry::Long(value) => Constant::Long(*value),
            ConstantPoolEntry::Double(value) => Constant::Double(*value),
            ConstantPoolEntry::String { string_index } => {
                Constant::String(self.utf8(*string_index)?.to_string())
            }
            ConstantPoolEntry::Class { name_index } => {
                Constant::Class(self.utf8(*name_index)?.to_string())
            }
            ConstantPoolEntry::MethodType { descriptor_index } => {
                Constant::MethodType(self.utf8(*descriptor_index)?.to_string())
            }
            ConstantPoolEntry::MethodHandle { .. } => {
                Constant::MethodHandle(self.method_handle(index)?)
            }
            ConstantPoolEntry::Dynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            } => {
                let (name, descriptor) = self.name_and_type(*name_and_type_index)?;
                let method = bootstrap
                    .get(*bootstrap_method_attr_index as usize)
                    .ok_or_else(|| {
                        malformed_error!(
                            "Bootstrap method #{} does not exist",
                            bootstrap_method_attr_index
                        )
                    })?;
                Constant::Dynamic {
                    name: name.to_string(),
                    descriptor: descriptor.to_string(),
                    bootstrap: self.method_handle(method.method_ref)?,
                }
            }
            _ => {
                return Err(Error::ConstantPool {
                    index,
                    expected: "loadable constant",
                })
            }
        })
    }
}

/// Decode the JVM's modified UTF-8 (§4.4.7).
///
/// Differs from standard UTF-8 in that NUL is encoded as `C0 80` and supplementary
/// characters are encoded as surrogate pairs of three bytes each.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for truncated or invalid byte sequences.
pub fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    if bytes.is_ascii() {
        return Ok(String::from_utf8_lossy(bytes).into_owned());
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        let first = bytes[index];
        match first {
            0x01..=0x7F => {
                units.push(u16::from(first));
                index += 1;
            }
            0xC0..=0xDF => {
                let Some(&second) = bytes.get(index + 1) else {
                    return Err(malformed_error!("Truncated modified UTF-8 sequence"));
                };
                units.push((u16::from(first & 0x1F) << 6) | u16::from(second & 0x3F));
                index += 2;
            }
            0xE0..=0xEF => {
                let (Some(&second), Some(&third)) = (bytes.get(index + 1), bytes.get(index + 2))
                else {
                    return Err(malformed_error!("Truncated modified UTF-8 sequence"));
                };
                units.push(
                    (u16::from(first & 0x0F) << 12)
                        | (u16::from(second & 0x3F) << 6)
                        | u16::from(third & 0x3F),
                );
                index += 3;
            }
            _ => {
                return Err(malformed_error!(
                    "Invalid modified UTF-8 lead byte 0x{:02X}",
                    first
                ))
            }
        }
    }

    Ok(String::from_utf16_lossy(&units))
}
