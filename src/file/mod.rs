//! Class file input.
//!
//! A [`File`] memory-maps one `.class` file from disk. Parsing code only ever sees the `&[u8]`
//! view returned by [`File::data`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use groupscope::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("build/classes/AppKt.class"))?;
//! println!("{} bytes", file.len());
//! # Ok::<(), groupscope::Error>(())
//! ```

pub mod io;
pub mod parser;

use std::{fs, path::Path};

use memmap2::Mmap;

use crate::{
    Error::{Empty, Error, FileError},
    Result,
};

/// The memory-mapped bytes of a class file.
#[derive(Debug)]
pub struct File {
    data: Mmap,
}

impl File {
    /// Memory-map a file from disk.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened,
    /// [`crate::Error::Error`] if mapping fails and [`crate::Error::Empty`] if it has no
    /// content.
    pub fn from_file(path: &Path) -> Result<File> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(error) => return Err(FileError(error)),
        };

        // The mapping is read-only and lives as long as `File`
        let data = match unsafe { Mmap::map(&file) } {
            Ok(mmap) => mmap,
            Err(error) => return Err(Error(error.to_string())),
        };
        if data.is_empty() {
            return Err(Empty);
        }

        Ok(File { data })
    }

    /// The complete content.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if there is no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn from_file_roundtrip() {
        let path = std::env::temp_dir().join("groupscope_file_from_file.bin");
        std::fs::write(&path, [0xCA, 0xFE, 0xBA, 0xBE, 0x00]).unwrap();

        let file = File::from_file(&path).unwrap();
        assert_eq!(file.len(), 5);
        assert_eq!(file.data()[..4], [0xCA, 0xFE, 0xBA, 0xBE]);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn from_file_rejects_empty() {
        let path = std::env::temp_dir().join("groupscope_file_empty.class");
        std::fs::write(&path, b"").unwrap();

        assert!(matches!(File::from_file(&path), Err(Error::Empty)));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn from_file_missing() {
        match File::from_file(Path::new("/nonexistent/path/to/App.class")) {
            Err(Error::FileError(io_error)) => {
                assert_eq!(io_error.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected FileError"),
        }
    }
}
