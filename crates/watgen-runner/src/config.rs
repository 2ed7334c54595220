//! Toolchain configuration.

use serde::{Deserialize, Serialize};

/// Environment variable that overrides [`ToolchainConfig::compiler`].
pub const COMPILER_ENV: &str = "WATGEN_COMPILER";

/// How to invoke the external text-to-binary compiler.
///
/// The command line is `<compiler> <input> <output_flag> <output>`, where the
/// input is `<location>.<text_extension>` and the output is
/// `<location>.<binary_extension>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    pub compiler: String,
    pub output_flag: String,
    pub text_extension: String,
    pub binary_extension: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: "wat2wasm".to_string(),
            output_flag: "-o".to_string(),
            text_extension: "wat".to_string(),
            binary_extension: "wasm".to_string(),
        }
    }
}

impl ToolchainConfig {
    /// Parse a config from JSON.  Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Defaults, with the compiler taken from `WATGEN_COMPILER` when set.
    pub fn from_env() -> Self {
        Self::default().with_env_override()
    }

    /// Replace the compiler with `WATGEN_COMPILER` when it is set and
    /// non-empty.
    pub fn with_env_override(self) -> Self {
        match std::env::var(COMPILER_ENV) {
            Ok(compiler) => self.with_compiler_override(Some(compiler)),
            Err(_) => self,
        }
    }

    fn with_compiler_override(mut self, compiler: Option<String>) -> Self {
        if let Some(compiler) = compiler.filter(|c| !c.trim().is_empty()) {
            tracing::debug!(%compiler, "compiler overridden from environment");
            self.compiler = compiler;
        }
        self
    }

    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = compiler.into();
        self
    }
}
