//! # groupscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and functions
//! of the groupscope library. Import this module to get quick access to everything needed to
//! analyze class files and track Compose groups across redefinitions.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all groupscope operations
pub use crate::Error;

/// The result type used throughout groupscope
pub use crate::Result;

/// Configuration of markers and namespace exclusions
pub use crate::AnalysisConfig;

/// Low-level file parsing utilities
pub use crate::{File, Parser};

// ================================================================================================
// Class Files
// ================================================================================================

/// Decoded class and method structures
pub use crate::classfile::{ClassUnit, MethodId, MethodUnit};

/// Class file assembler
pub use crate::classfile::{ClassBuilder, CodeBuilder, MethodBuilder};

// ================================================================================================
// Disassembly
// ================================================================================================

/// Normalized instructions
pub use crate::disassembler::{decode_code, Instruction, LabelId};

// ================================================================================================
// Analysis
// ================================================================================================

/// Scope trees
pub use crate::analysis::{GroupKey, Scope, ScopeHash, ScopeId, ScopeKind, ScopeTree};

/// Building scope trees
pub use crate::analysis::{analyze_class, ClassAnalysis, ScopeTreeBuilder};

/// Snapshots, invalidation keys and diffs
pub use crate::analysis::{
    diff, resolve, Invalidation, InvalidationKey, InvalidationReason, Snapshot,
};

// ================================================================================================
// Reload Tracking
// ================================================================================================

/// Redefinition tracking
pub use crate::reload::{
    BatchId, ClassLoad, GroupInvalidator, ParseOutcome, RedefinitionOutcome, ReloadTracker,
};
