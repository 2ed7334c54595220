//! Handoff error types.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use watgen_codegen::CodegenError;

/// The step of the handoff pipeline that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Check,
    Write,
    Compile,
    Load,
    Instantiate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Check => "check",
            Self::Write => "write",
            Self::Compile => "compile",
            Self::Load => "load",
            Self::Instantiate => "instantiate",
        };
        f.write_str(name)
    }
}

/// Errors from handing module text to the toolchain and running the result.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// The module was not closed or failed the symbol check.
    #[error(transparent)]
    Check(#[from] CodegenError),

    /// The text file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The compiler binary could not be started.
    #[error("failed to spawn {compiler}: {source}")]
    Launch {
        compiler: String,
        #[source]
        source: std::io::Error,
    },

    /// The compiler exited unsuccessfully.
    #[error("{compiler} exited with {status}: {stderr}")]
    Exit {
        compiler: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    /// The compiler exited successfully but wrote to stderr.
    #[error("{compiler} reported: {stderr}")]
    Diagnostics { compiler: String, stderr: String },

    /// The binary could not be read.
    #[error("failed to read {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The binary is not a valid module.
    #[error("invalid module {path}: {message}")]
    Invalid { path: PathBuf, message: String },

    /// The runtime rejected the module or its imports.
    #[error("instantiation failed: {0}")]
    Instantiate(#[from] wasmi::Error),
}

impl HandoffError {
    /// Which pipeline step produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Check(_) => Stage::Check,
            Self::Write { .. } => Stage::Write,
            Self::Launch { .. } | Self::Exit { .. } | Self::Diagnostics { .. } => Stage::Compile,
            Self::Load { .. } | Self::Invalid { .. } => Stage::Load,
            Self::Instantiate(_) => Stage::Instantiate,
        }
    }
}

/// Handoff result type alias.
pub type HandoffResult<T> = Result<T, HandoffError>;

#[cfg(test)]
mod tests {
    use super::*;
    use watgen_codegen::ModuleState;

    #[test]
    fn stages_group_compiler_failures() {
        let launch = HandoffError::Launch {
            compiler: "wat2wasm".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let noisy = HandoffError::Diagnostics {
            compiler: "wat2wasm".into(),
            stderr: "warning".into(),
        };
        assert_eq!(launch.stage(), Stage::Compile);
        assert_eq!(noisy.stage(), Stage::Compile);
    }

    #[test]
    fn codegen_errors_are_check_stage() {
        let err = HandoffError::from(CodegenError::ModuleNotClosed(ModuleState::Empty));
        assert_eq!(err.stage(), Stage::Check);
        assert_eq!(err.to_string(), "module is not closed (state: Empty)");
    }

    #[test]
    fn stage_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Stage::Instantiate).unwrap(), "\"instantiate\"");
        assert_eq!(Stage::Load.to_string(), "load");
    }
}
