// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]
//#![deny(unsafe_code)]
// - 'file/mod.rs' uses mmap to map a file into memory

//! # groupscope
//!
//! Structural scope analysis of JVM class files for precise Compose group invalidation during
//! hot reload.
//!
//! The Compose compiler wraps the body of every composable function in *groups*: regions
//! delimited by calls such as `Composer.startRestartGroup(key)` / `endRestartGroup()`. When a
//! class is redefined at runtime, the Compose runtime only needs to re-run the groups whose
//! code, or the code they call, actually changed. `groupscope` finds those groups.
//!
//! ## Features
//!
//! - **Zero-copy class file decoding** - Constant pool, methods, annotations and bootstrap
//!   methods, with memory-mapped file access
//! - **Normalized instruction stream** - Every JVM opcode decoded into a small set of
//!   instruction categories with symbolic labels instead of byte offsets
//! - **Scope trees** - Restart, replace and source information groups per method, each with a
//!   structural hash and its call dependencies
//! - **Invalidation keys** - A fingerprint of each group's transitive dependency closure
//! - **Reload tracking** - Buffering of redefinition batches, commit on success and diffing
//!   against the previous state
//!
//! ## Quick Start
//!
//! ```rust
//! use groupscope::prelude::*;
//!
//! let bytes = ClassBuilder::new("com/example/AppKt")
//!     .method("App", "(Landroidx/compose/runtime/Composer;I)V", |method| {
//!         method.code(|code| {
//!             code.aload(0)
//!                 .iconst(1902)
//!                 .invokeinterface(
//!                     "androidx/compose/runtime/Composer",
//!                     "startRestartGroup",
//!                     "(I)Landroidx/compose/runtime/Composer;",
//!                 )
//!                 .astore(0)
//!                 .invokestatic("com/example/AppKt", "helper", "()V")
//!                 .aload(0)
//!                 .invokeinterface(
//!                     "androidx/compose/runtime/Composer",
//!                     "endRestartGroup",
//!                     "()Landroidx/compose/runtime/ScopeUpdateScope;",
//!                 )
//!                 .pop()
//!                 .return_void();
//!         })
//!     })
//!     .build();
//!
//! let class = ClassUnit::parse(&bytes)?;
//! let analysis = analyze_class(&class, &AnalysisConfig::default());
//! let snapshot: Snapshot = analysis.trees.into_iter().collect();
//!
//! let restart = snapshot.group(GroupKey(1902));
//! assert_eq!(restart.len(), 1);
//! assert!(resolve(&snapshot, GroupKey(1902)).is_some());
//! # Ok::<(), groupscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types
//! - [`classfile`] - Class file structures and the [`classfile::ClassBuilder`] assembler
//! - [`disassembler`] - JVM bytecode decoding into normalized [`disassembler::Instruction`]s
//! - [`analysis`] - Scope trees, snapshots, invalidation keys and diffing
//! - [`reload`] - The [`reload::ReloadTracker`] driving analysis across redefinitions
//! - [`config`] - [`AnalysisConfig`] with marker signatures and namespace exclusions
//! - [`Error`] and [`Result`] - Error handling

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use groupscope::prelude::*;
///
/// let config = AnalysisConfig::default();
/// let snapshot = Snapshot::default();
/// assert_eq!(resolve(&snapshot, GroupKey(1)), None);
/// assert!(config.is_class_excluded("kotlin/Unit"));
/// ```
pub mod prelude;

/// Class file structures
///
/// Decoding of the parts of a class file the analysis needs: the constant pool, methods with
/// their `Code` attribute and annotations, and the `BootstrapMethods` table. Fields and
/// unknown attributes are skipped or kept raw.
///
/// # Key Types
///
/// - [`classfile::ClassUnit`] - A decoded class
/// - [`classfile::MethodUnit`] - One method, decoded lazily into instructions
/// - [`classfile::MethodId`] - Class, name and descriptor of a method
/// - [`classfile::ClassBuilder`] - Assembles class files for tests and tooling
pub mod classfile;

/// Instructions, Disassembler based on the JVM specification
///
/// This module decodes JVM bytecode into a normalized instruction stream:
///
/// - **Instruction Decoding**: Every opcode with its operands, constant pool references
///   resolved
/// - **Normalization**: Short and wide forms folded into their base opcode
/// - **Labels**: Branch targets and exception handler boundaries as ordinal labels
///
/// # Main Functions
///
/// - [`disassembler::decode_code`] - Decode a `Code` attribute into instructions and labels
/// - [`disassembler::decode_stream`] - Decode raw bytecode into positioned instructions
/// - [`disassembler::decode_instruction`] - Decode a single instruction
pub mod disassembler;

/// Scope analysis
pub mod analysis;

/// Analysis configuration
pub mod config;

/// Hot-reload state tracking
pub mod reload;

/// Utilities
pub mod utils;

/// The generic Result type used throughout this library
pub type Result<T> = std::result::Result<T, Error>;

/// The error type of this library.
///
/// # Example
///
/// ```rust
/// use groupscope::{classfile::ClassUnit, Error};
///
/// match ClassUnit::parse(&[0xDE, 0xAD, 0xBE, 0xEF, 0, 0, 0, 0, 0, 0]) {
///     Err(Error::NotSupported) => println!("Not a class file"),
///     Err(Error::Malformed { message, .. }) => println!("Malformed: {}", message),
///     Err(e) => println!("Error: {}", e),
///     Ok(_) => unreachable!(),
/// }
/// ```
pub use error::Error;

/// Configuration of the scope analysis.
///
/// See [`config::AnalysisConfig`] for the available settings and presets.
pub use config::AnalysisConfig;

/// Provides access to low-level file and memory parsing utilities.
///
/// The [`Parser`] type is a big-endian cursor used for decoding class files and bytecode.
///
/// # Example
///
/// ```rust
/// use groupscope::Parser;
///
/// let data = [0xCA, 0xFE, 0xBA, 0xBE];
/// let mut parser = Parser::new(&data);
/// assert_eq!(parser.read_be::<u32>()?, 0xCAFE_BABE);
/// # Ok::<(), groupscope::Error>(())
/// ```
pub use file::{parser::Parser, File};
