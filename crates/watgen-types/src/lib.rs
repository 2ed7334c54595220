//! Shared types for the watgen module builder.
//!
//! This crate defines the logical value types and their mnemonic tables,
//! and the structured diagnostics produced by the symbol checker.

mod diagnostic;
pub mod ty;

pub use diagnostic::{
    Diagnostic, DiagnosticCode, DiagnosticKind, Diagnostics, Namespace, MAX_DIAGNOSTICS,
};
pub use ty::{FloatType, IntegerType, RefType, ValueType};
