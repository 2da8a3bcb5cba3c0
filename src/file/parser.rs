//! Low-level byte stream parser for class file and bytecode decoding.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a cursor-based binary data
//! parser used for reading class file structures and method bytecode. It offers bounds-checked
//! access to binary data in the big-endian layout the JVM class file format prescribes.
//!
//! # Key Components
//!
//! ## Navigation Methods
//! - [`crate::file::parser::Parser::advance_by`] - Move forward by specified bytes
//! - [`crate::file::parser::Parser::pos`] - Get current position
//! - [`crate::file::parser::Parser::align`] - Align to byte boundaries (switch padding)
//!
//! ## Data Access Methods
//! - [`crate::file::parser::Parser::read_be`] - Read primitive types (big-endian)
//! - [`crate::file::parser::Parser::read_bytes`] - Borrow a sub-slice and advance past it
//!
//! # Usage Examples
//!
//! ```rust
//! use groupscope::Parser;
//!
//! let data = [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x41];
//! let mut parser = Parser::new(&data);
//!
//! let magic = parser.read_be::<u32>()?;
//! assert_eq!(magic, 0xCAFE_BABE);
//!
//! parser.advance_by(2)?;
//! let major = parser.read_be::<u16>()?;
//! assert_eq!(major, 65);
//! # Ok::<(), groupscope::Error>(())
//! ```

use crate::{
    file::io::{read_be_at, ClassIO},
    Result,
};

/// A generic binary data parser for reading class file structures.
///
/// `Parser` provides a cursor-based interface for reading big-endian binary data.
/// The parser maintains an internal position cursor and provides bounds checking
/// to prevent buffer overruns when reading malformed or truncated data.
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use groupscope::Parser;
    /// let data = [0x01, 0x02];
    /// let mut parser = Parser::new(&data);
    /// assert!(parser.has_more_data());
    ///
    /// let _value = parser.read_be::<u16>()?;
    /// assert!(!parser.has_more_data());
    /// # Ok::<(), groupscope::Error>(())
    /// ```
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Move the position forward by the specified number of bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if advancing by step would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        if self.position + step > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        self.position += step;
        Ok(())
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Align the position to a specific boundary.
    ///
    /// `tableswitch` and `lookupswitch` pad their operands to a 4-byte boundary measured
    /// from the start of the method's code, which is where every code parser starts.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if aligning would exceed the data length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use groupscope::Parser;
    /// let data = [0xAA, 0x00, 0x00, 0x00, 0x01];
    /// let mut parser = Parser::new(&data);
    ///
    /// let _opcode = parser.read_be::<u8>()?;
    /// parser.align(4)?;
    /// assert_eq!(parser.pos(), 4);
    /// # Ok::<(), groupscope::Error>(())
    /// ```
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        let padding = (alignment - (self.position % alignment)) % alignment;
        if self.position + padding > self.data.len() {
            return Err(out_of_bounds_error!());
        }
        self.position += padding;
        Ok(())
    }

    /// Read a type `T` from the current position in big-endian format and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length.
    pub fn read_be<T: ClassIO>(&mut self) -> Result<T> {
        read_be_at::<T>(self.data, &mut self.position)
    }

    /// Borrow the next `len` bytes and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let start = self.position;
        self.advance_by(len)?;
        Ok(&self.data[start..start + len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn parser_read_sequence() {
        let data = [0x00, 0x10, 0xFF, 0xFF, 0xFF, 0xFE];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_be::<u16>().unwrap(), 0x10);
        assert_eq!(parser.read_be::<i32>().unwrap(), -2);
        assert!(!parser.has_more_data());
    }

    #[test]
    fn parser_read_bytes() {
        let data = [0x00, 0x03, b'f', b'o', b'o', 0x2A];
        let mut parser = Parser::new(&data);

        let len = parser.read_be::<u16>().unwrap() as usize;
        assert_eq!(parser.read_bytes(len).unwrap(), b"foo");
        assert_eq!(parser.pos(), 5);
        assert!(matches!(parser.read_bytes(2), Err(Error::OutOfBounds)));
    }

    #[test]
    fn parser_align() {
        let data = [0u8; 9];
        let mut parser = Parser::new(&data);

        parser.align(4).unwrap();
        assert_eq!(parser.pos(), 0);

        parser.advance_by(5).unwrap();
        parser.align(4).unwrap();
        assert_eq!(parser.pos(), 8);
    }

    #[test]
    fn parser_advance_out_of_bounds() {
        let data = [0x01, 0x02];
        let mut parser = Parser::new(&data);

        assert!(matches!(parser.advance_by(3), Err(Error::OutOfBounds)));
        assert!(parser.advance_by(1).is_ok());
        assert_eq!(parser.pos(), 1);
    }
}
