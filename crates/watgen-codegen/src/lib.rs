//! watgen code generator: builds module text for a stack-machine target.
//!
//! # Architecture
//!
//! Building a module is split into two phases:
//!
//! 1. **Build.**  Operations on [`Generator`] return [`Node`] values.  Each
//!    operation maps a logical operation and its operand nodes onto one node
//!    whose header is the typed mnemonic (see [`watgen_types::ty`]).
//!    Registering data literals advances the generator's
//!    [`DataAllocator`], which decides where each literal lives in linear
//!    memory and how large the memory must be.
//! 2. **Render.**  The [`Emitter`] walks the tree and writes one construct per
//!    line, indenting children one level deeper than their parent.
//!
//! Between the two, [`checker::check`] can validate the tree's symbols:
//! every reference to a function, global, local, table or label must
//! resolve, names must not be declared twice, and calls must pass as many
//! arguments as the callee declares.
//!
//! Nothing here checks operand types.  That is left to the external
//! text-to-binary toolchain.

pub mod checker;
mod control;
pub mod data;
pub mod decl;
pub mod emitter;
pub mod error;
pub mod generator;
mod memory;
pub mod node;
mod ops;
pub mod scope;

pub use data::DataAllocator;
pub use decl::{FuncDecl, Params};
pub use emitter::{EmitOptions, Emitter};
pub use error::{CodegenError, CodegenResult};
pub use generator::{Generator, ModuleState};
pub use node::{Node, NodeKind, ScopeKind, SymbolUse};
