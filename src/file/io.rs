//! Low-level byte order and safe reading utilities for class file parsing.
//!
//! Class files store every multi-byte quantity in big-endian order. This module provides the
//! [`crate::file::io::ClassIO`] trait and bounds-checked helpers that read primitive values out of
//! byte buffers, advancing an external offset on success.
//!
//! # Key Components
//!
//! - [`crate::file::io::ClassIO`] - Trait defining endian-aware decoding for primitive types
//! - [`crate::file::io::read_be_at`] - Read a value at an offset and advance it
//!
//! # Examples
//!
//! ```rust,ignore
//! use groupscope::file::io::read_be_at;
//!
//! let data = [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x41];
//! let mut offset = 0;
//!
//! let magic: u32 = read_be_at(&data, &mut offset)?;
//! let major: u16 = read_be_at(&data, &mut offset)?;
//! assert_eq!(magic, 0xCAFE_BABE);
//! assert_eq!(major, 65);
//! # Ok::<(), groupscope::Error>(())
//! ```
//!
//! # Error Handling
//!
//! Every function returns [`crate::Error::OutOfBounds`] if the buffer holds fewer bytes than
//! the requested type needs. The offset is left untouched in that case.

use crate::{Error::OutOfBounds, Result};

/// Trait for implementing type-specific safe binary data reading operations.
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size
/// byte array required for that particular type (e.g., `[u8; 4]` for `u32`).
pub trait ClassIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_class_io {
    ($($ty:ty => $len:expr),* $(,)?) => {
        $(
            impl ClassIO for $ty {
                type Bytes = [u8; $len];

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }
            }
        )*
    };
}

impl_class_io! {
    u8 => 1,
    i8 => 1,
    u16 => 2,
    i16 => 2,
    u32 => 4,
    i32 => 4,
    u64 => 8,
    i64 => 8,
    f32 => 4,
    f64 => 8,
}

/// Safely reads a value of type `T` in big-endian byte order at a specific offset.
///
/// The offset is advanced by the number of bytes read.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_be_at<T: ClassIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..*offset + type_len].try_into() else {
        return Err(OutOfBounds);
    };

    *offset += type_len;

    Ok(T::from_be_bytes(read))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_BUFFER: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

    #[test]
    fn read_be_at_types() {
        let mut offset = 0;
        assert_eq!(read_be_at::<u32>(&TEST_BUFFER, &mut offset).unwrap(), 0x0102_0304);

        let mut offset = 0;
        assert_eq!(read_be_at::<i16>(&[0xFF, 0xFE], &mut offset).unwrap(), -2);

        let bytes = 1.5_f64.to_be_bytes();
        let mut offset = 0;
        assert_eq!(read_be_at::<f64>(&bytes, &mut offset).unwrap(), 1.5);
    }

    #[test]
    fn read_be_at_advances() {
        let mut offset = 0;
        let first = read_be_at::<u16>(&TEST_BUFFER, &mut offset).unwrap();
        let second = read_be_at::<u32>(&TEST_BUFFER, &mut offset).unwrap();

        assert_eq!(first, 0x0102);
        assert_eq!(second, 0x0304_0506);
        assert_eq!(offset, 6);
    }

    #[test]
    fn read_be_at_out_of_bounds_keeps_offset() {
        let mut offset = 6;
        let result = read_be_at::<u32>(&TEST_BUFFER, &mut offset);

        assert!(matches!(result, Err(OutOfBounds)));
        assert_eq!(offset, 6);
    }
}
