//! Codegen error types.

use thiserror::Error;
use watgen_types::Diagnostics;

use crate::generator::ModuleState;

/// Errors reported when finishing a module.
///
/// Building nodes never fails; these only come out of
/// [`Generator::finish`](crate::Generator::finish).
#[derive(Debug, Error)]
pub enum CodegenError {
    /// The symbol check found unresolved, duplicate or mis-called symbols.
    #[error("symbol check failed: {0}")]
    Symbols(#[from] Diagnostics),

    /// `finish` was called before a module had been built.
    #[error("module is not closed (state: {0:?})")]
    ModuleNotClosed(ModuleState),

    /// A data literal did not fit below the 4 GiB limit of 32-bit memory.
    #[error("data region overflows 32-bit memory at offset {cursor}")]
    DataOverflow { cursor: u32 },
}

/// Codegen result type alias.
pub type CodegenResult<T> = Result<T, CodegenError>;
