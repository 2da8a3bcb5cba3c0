//! Class file attributes the analysis reads.
//!
//! Only three attributes carry information the scope analysis depends on: `Code` (the
//! bytecode and its exception table), `BootstrapMethods` (targets of `invokedynamic`) and
//! `RuntimeVisibleAnnotations` (the function key). Every other attribute, including the debug
//! tables, is kept as an opaque [`RawAttribute`] so that it can never influence a hash.

use crate::{
    classfile::constantpool::{BootstrapMethodRef, ConstantPool, ConstantPoolEntry},
    file::parser::Parser,
    Result,
};

/// Well-known attribute names.
pub mod names {
    /// Method bytecode
    pub const CODE: &str = "Code";
    /// `invokedynamic` bootstrap table
    pub const BOOTSTRAP_METHODS: &str = "BootstrapMethods";
    /// Annotations retained at runtime
    pub const RUNTIME_VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";
}

/// An attribute kept as undecoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    /// Attribute name
    pub name: String,
    /// Attribute payload
    pub data: Vec<u8>,
}

/// One row of a `Code` attribute's exception table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionHandler {
    /// First covered offset (inclusive)
    pub start_pc: u16,
    /// Last covered offset (exclusive)
    pub end_pc: u16,
    /// Offset of the handler code
    pub handler_pc: u16,
    /// `Class` index of the caught type, 0 for `finally`
    pub catch_type: u16,
}

/// A decoded `Code` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAttribute {
    /// Maximum operand stack depth
    pub max_stack: u16,
    /// Number of local variable slots
    pub max_locals: u16,
    /// Raw bytecode
    pub code: Vec<u8>,
    /// Exception table in declaration order
    pub exception_table: Vec<ExceptionHandler>,
    /// Nested attributes (`LineNumberTable`, `StackMapTable`, ...)
    pub attributes: Vec<RawAttribute>,
}

impl CodeAttribute {
    /// Decode the payload of a `Code` attribute.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] or [`crate::Error::Malformed`] if the payload is
    /// truncated or refers to invalid constant pool entries.
    pub fn parse(data: &[u8], pool: &ConstantPool) -> Result<CodeAttribute> {
        let mut parser = Parser::new(data);
        let max_stack = parser.read_be::<u16>()?;
        let max_locals = parser.read_be::<u16>()?;

        let code_len = parser.read_be::<u32>()? as usize;
        if code_len == 0 {
            return Err(malformed_error!("Code attribute with empty bytecode"));
        }
        let code = parser.read_bytes(code_len)?.to_vec();

        let handler_count = parser.read_be::<u16>()?;
        let mut exception_table = Vec::with_capacity(handler_count as usize);
        for _ in 0..handler_count {
            let handler = ExceptionHandler {
                start_pc: parser.read_be::<u16>()?,
                end_pc: parser.read_be::<u16>()?,
                handler_pc: parser.read_be::<u16>()?,
                catch_type: parser.read_be::<u16>()?,
            };
            if handler.start_pc >= handler.end_pc
                || handler.end_pc as usize > code_len
                || handler.handler_pc as usize >= code_len
            {
                return Err(malformed_error!(
                    "Exception handler {}..{} -> {} outside of {} bytes of code",
                    handler.start_pc,
                    handler.end_pc,
                    handler.handler_pc,
                    code_len
                ));
            }
            exception_table.push(handler);
        }

        let attributes = parse_raw_attributes(&mut parser, pool)?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }
}

/// Read an `attributes_count` prefixed attribute table without interpreting it.
///
/// # Errors
/// Returns an error if a name index is not `Utf8` or a length runs past the data.
pub fn parse_raw_attributes(parser: &mut Parser, pool: &ConstantPool) -> Result<Vec<RawAttribute>> {
    let count = parser.read_be::<u16>()?;
    let mut attributes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name = pool.utf8(parser.read_be::<u16>()?)?.to_string();
        let len = parser.read_be::<u32>()? as usize;
        let data = parser.read_bytes(len)?.to_vec();
        attributes.push(RawAttribute { name, data });
    }
    Ok(attributes)
}

/// Decode the payload of a `BootstrapMethods` attribute.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the table is truncated.
pub fn parse_bootstrap_methods(data: &[u8]) -> Result<Vec<BootstrapMethodRef>> {
    let mut parser = Parser::new(data);
    let count = parser.read_be::<u16>()?;
    let mut methods = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let method_ref = parser.read_be::<u16>()?;
        let arg_count = parser.read_be::<u16>()?;
        let mut arguments = Vec::with_capacity(arg_count as usize);
        for _ in 0..arg_count {
            arguments.push(parser.read_be::<u16>()?);
        }
        methods.push(BootstrapMethodRef {
            method_ref,
            arguments,
        });
    }
    Ok(methods)
}

/// A value of an annotation element (§4.7.16.1).
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    /// `I`, `S`, `B`, `C` or `Z`
    Int(i32),
    /// `J`
    Long(i64),
    /// `F`
    Float(f32),
    /// `D`
    Double(f64),
    /// `s`
    String(String),
    /// `e`: type descriptor and constant name
    Enum(String, String),
    /// `c`: return descriptor
    Class(String),
    /// `@`
    Annotation(Annotation),
    /// `[`
    Array(Vec<ElementValue>),
}

/// A runtime-visible annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Field descriptor of the annotation type, e.g. `Lkotlin/Metadata;`
    pub descriptor: String,
    /// Element name/value pairs in declaration order
    pub elements: Vec<(String, ElementValue)>,
}

impl Annotation {
    /// Look up an element by name.
    #[must_use]
    pub fn element(&self, name: &str) -> Option<&ElementValue> {
        self.elements
            .iter()
            .find(|(element, _)| element == name)
            .map(|(_, value)| value)
    }
}

/// Decode the payload of a `RuntimeVisibleAnnotations` attribute.
///
/// # Errors
/// Returns an error for truncated data, unknown element tags or invalid constant references.
pub fn parse_annotations(data: &[u8], pool: &ConstantPool) -> Result<Vec<Annotation>> {
    let mut parser = Parser::new(data);
    let count = parser.read_be::<u16>()?;
    let mut annotations = Vec::with_capacity(count as usize);
    for _ in 0..count {
        annotations.push(parse_annotation(&mut parser, pool)?);
    }
    Ok(annotations)
}

fn parse_annotation(parser: &mut Parser, pool: &ConstantPool) -> Result<Annotation> {
    let descriptor = pool.utf8(parser.read_be::<u16>()?)?.to_string();
    let pair_count = parser.read_be::<u16>()?;
    let mut elements = Vec::with_capacity(pair_count as usize);
    for _ in 0..pair_count {
        let name = pool.utf8(parser.read_be::<u16>()?)?.to_string();
        elements.push((name, parse_element_value(parser, pool)?));
    }
    Ok(Annotation {
        descriptor,
        elements,
    })
}

fn parse_element_value(parser: &mut Parser, pool: &ConstantPool) -> Result<ElementValue> {
    let tag = parser.read_be::<u8>()?;
    Ok(match tag {
        b'B' | b'C' | b'I' | b'S' | b'Z' => {
            let index = parser.read_be::<u16>()?;
            match pool.get(index)? {
                ConstantPoolEntry::Integer(value) => ElementValue::Int(*value),
                _ => return Err(malformed_error!("Annotation value #{} is not an int", index)),
            }
        }
        b'J' => {
            let index = parser.read_be::<u16>()?;
            match pool.get(index)? {
                ConstantPoolEntry::Long(value) => ElementValue::Long(*value),
                _ => return Err(malformed_error!("Annotation value #{} is not a long", index)),
            }
        }
        b'F' => {
            let index = parser.read_be::<u16>()?;
            match pool.get(index)? {
                ConstantPoolEntry::Float(value) => ElementValue::Float(*value),
                _ => return Err(malformed_error!("Annotation value #{} is not a float", index)),
            }
        }
        b'D' => {
            let index = parser.read_be::<u16>()?;
            match pool.get(index)? {
                ConstantPoolEntry::Double(value) => ElementValue::Double(*value),
                _ => {
                    return Err(malformed_error!(
                        "Annotation value #{} is not a double",
                        index
                    ))
                }
            }
        }
        b's' => ElementValue::String(pool.utf8(parser.read_be::<u16>()?)?.to_string()),
        b'e' => {
            let type_name = pool.utf8(parser.read_be::<u16>()?)?.to_string();
            let const_name = pool.utf8(parser.read_be::<u16>()?)?.to_string();
            ElementValue::Enum(type_name, const_name)
        }
        b'c' => ElementValue::Class(pool.utf8(parser.read_be::<u16>()?)?.to_string()),
        b'@' => ElementValue::Annotation(parse_annotation(parser, pool)?),
        b'[' => {
            let count = parser.read_be::<u16>()?;
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(parse_element_value(parser, pool)?);
            }
            ElementValue::Array(values)
        }
        _ => {
            return Err(malformed_error!(
                "Unknown annotation element tag '{}'",
                char::from(tag)
            ))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> ConstantPool {
        let bytes = [
            0x00, 0x06, // count
            0x01, 0x00, 0x05, b'L', b'K', b'e', b'y', b';', // #1 Utf8 "LKey;"
            0x01, 0x00, 0x03, b'k', b'e', b'y', // #2 Utf8 "key"
            0x03, 0x00, 0x00, 0x07, 0x6E, // #3 Integer 1902
            0x01, 0x00, 0x04, b'C', b'o', b'd', b'e', // #4 Utf8 "Code"
            0x01, 0x00, 0x01, b'x', // #5 Utf8 "x"
        ];
        let mut parser = Parser::new(&bytes);
        let count = parser.read_be::<u16>().unwrap();
        ConstantPool::parse(&mut parser, count).unwrap()
    }

    #[test]
    fn annotation_with_int_element() {
        let data = [
            0x00, 0x01, // one annotation
            0x00, 0x01, // type "LKey;"
            0x00, 0x02, // two pairs
            0x00, 0x02, b'I', 0x00, 0x03, // key = 1902
            0x00, 0x05, b'[', 0x00, 0x01, b's', 0x00, 0x02, // x = ["key"]
        ];
        let annotations = parse_annotations(&data, &pool()).unwrap();

        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].descriptor, "LKey;");
        assert_eq!(annotations[0].element("key"), Some(&ElementValue::Int(1902)));
        assert_eq!(
            annotations[0].element("x"),
            Some(&ElementValue::Array(vec![ElementValue::String(
                "key".to_string()
            )]))
        );
        assert_eq!(annotations[0].element("missing"), None);
    }

    #[test]
    fn annotation_wrong_value_kind() {
        let data = [0x00, 0x01, 0x00, 0x01, 0x00, 0x01, 0x00, 0x02, b'J', 0x00, 0x03];
        assert!(parse_annotations(&data, &pool()).is_err());
    }

    #[test]
    fn code_attribute() {
        let data = [
            0x00, 0x02, 0x00, 0x01, // max_stack, max_locals
            0x00, 0x00, 0x00, 0x03, 0x03, 0x57, 0xB1, // code: iconst_0 pop return
            0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x02, 0x00, 0x00, // handler
            0x00, 0x01, 0x00, 0x05, 0x00, 0x00, 0x00, 0x01, 0xFF, // attribute "x"
        ];
        let code = CodeAttribute::parse(&data, &pool()).unwrap();

        assert_eq!(code.max_stack, 2);
        assert_eq!(code.code, vec![0x03, 0x57, 0xB1]);
        assert_eq!(
            code.exception_table,
            vec![ExceptionHandler {
                start_pc: 0,
                end_pc: 2,
                handler_pc: 2,
                catch_type: 0
            }]
        );
        assert_eq!(code.attributes[0].name, "x");
        assert_eq!(code.attributes[0].data, vec![0xFF]);
    }

    #[test]
    fn code_attribute_handler_out_of_range() {
        let data = [
            0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0xB1, // code: return
            0x00, 0x01, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, // end past code
            0x00, 0x00,
        ];
        assert!(CodeAttribute::parse(&data, &pool()).is_err());
    }

    #[test]
    fn bootstrap_methods() {
        let data = [0x00, 0x01, 0x00, 0x07, 0x00, 0x02, 0x00, 0x08, 0x00, 0x09];
        let methods = parse_bootstrap_methods(&data).unwrap();

        assert_eq!(
            methods,
            vec![BootstrapMethodRef {
                method_ref: 7,
                arguments: vec![8, 9]
            }]
        );
    }
}
