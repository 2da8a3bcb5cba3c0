use thiserror::Error;

use crate::classfile::MethodId;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Class File Errors
/// - [`Error::Malformed`] - Corrupted or invalid class file structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of the input
/// - [`Error::NotSupported`] - Input is not a class file
/// - [`Error::Empty`] - Empty input provided
/// - [`Error::ConstantPool`] - A constant pool reference has the wrong type or is missing
/// - [`Error::InvalidOpcode`] - The bytecode contains an opcode the decoder does not know
///
/// ## Analysis Errors
/// - [`Error::MalformedScopes`] - The groups of a method nest deeper than the configured limit
///
/// ## I/O
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// # Examples
///
/// ```rust,no_run
/// use groupscope::{Error, classfile::ClassUnit};
/// use std::path::Path;
///
/// match ClassUnit::from_file(Path::new("build/classes/AppKt.class")) {
///     Ok(class) => println!("Loaded {}", class.name()),
///     Err(Error::NotSupported) => eprintln!("Not a class file"),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed class: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The class file is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The input does not start with the class file magic.
    #[error("This file type is not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// A constant pool index pointed at a missing entry or at an entry of the wrong kind.
    #[error("Constant pool entry #{index} is not a valid {expected}")]
    ConstantPool {
        /// The offending constant pool index
        index: u16,
        /// What kind of entry the reader expected at this index
        expected: &'static str,
    },

    /// Unknown or reserved opcode in a `Code` attribute.
    #[error("Invalid opcode 0x{opcode:02X} at offset {offset}")]
    InvalidOpcode {
        /// The opcode byte
        opcode: u8,
        /// Offset of the opcode within the method's code
        offset: u32,
    },

    /// The group marker pattern of a method is too broken to build a scope tree from.
    ///
    /// Only the affected method is dropped from the analysis; the rest of the class
    /// still contributes.
    #[error("Malformed scopes in {method}: {message}")]
    MalformedScopes {
        /// The method whose marker calls could not be interpreted
        method: MethodId,
        /// Why the marker pattern was rejected
        message: String,
    },

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}
