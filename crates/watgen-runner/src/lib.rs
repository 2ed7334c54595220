//! watgen handoff: turns a finished [`Generator`] into a running module.
//!
//! ```text
//! Generator → check → write .wat → compiler → .wasm → validate → wasmi instance
//! ```
//!
//! Each stage either succeeds or returns a [`HandoffError`] whose
//! [`stage`](HandoffError::stage) names where the pipeline stopped.  There
//! are no retries and no timeouts; the external compiler is run once.

pub mod config;
pub mod error;
pub mod runtime;
pub mod toolchain;

pub use config::{ToolchainConfig, COMPILER_ENV};
pub use error::{HandoffError, HandoffResult, Stage};
pub use runtime::{ImportTable, LoadedModule, Runtime};
pub use toolchain::{Artifact, Toolchain};

use watgen_codegen::Generator;

/// Check, write, compile, load and instantiate the module built by
/// `generator`, stopping at the first failure.
///
/// Files are written next to the generator's location.
pub fn compile_and_run(
    generator: &Generator,
    config: ToolchainConfig,
    imports: ImportTable,
) -> HandoffResult<LoadedModule> {
    tracing::info!(stage = "check", location = generator.location());
    let text = generator.finish()?;

    let toolchain = Toolchain::new(config);
    let artifact = toolchain.compile(generator.location(), &text)?;

    let loaded = Runtime::new().load(&artifact.binary_path, imports)?;
    tracing::info!(
        location = generator.location(),
        digest = %loaded.digest(),
        "module ready"
    );
    Ok(loaded)
}
