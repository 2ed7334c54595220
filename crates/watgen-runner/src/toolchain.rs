//! Writing module text to disk and running the external compiler on it.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::ToolchainConfig;
use crate::error::{HandoffError, HandoffResult};

/// Paths produced by one compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub text_path: PathBuf,
    pub binary_path: PathBuf,
}

/// Runs the configured compiler.  Each call is independent; nothing is
/// retried.
#[derive(Debug, Clone, Default)]
pub struct Toolchain {
    config: ToolchainConfig,
}

impl Toolchain {
    pub fn new(config: ToolchainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ToolchainConfig {
        &self.config
    }

    /// Paths for `location` without touching the filesystem.
    pub fn artifact(&self, location: &str) -> Artifact {
        Artifact {
            text_path: with_extension(location, &self.config.text_extension),
            binary_path: with_extension(location, &self.config.binary_extension),
        }
    }

    /// Write `text` to `<location>.<text_extension>` and compile it to
    /// `<location>.<binary_extension>`.
    ///
    /// Fails when the write fails, the compiler cannot be started, the
    /// compiler exits unsuccessfully, or it writes anything to stderr.
    pub fn compile(&self, location: &str, text: &str) -> HandoffResult<Artifact> {
        let artifact = self.artifact(location);

        tracing::info!(stage = "write", path = %artifact.text_path.display(), bytes = text.len());
        std::fs::write(&artifact.text_path, text).map_err(|source| HandoffError::Write {
            path: artifact.text_path.clone(),
            source,
        })?;

        let compiler = &self.config.compiler;
        tracing::info!(
            stage = "compile",
            %compiler,
            input = %artifact.text_path.display(),
            output = %artifact.binary_path.display()
        );
        let mut cmd = Command::new(compiler);
        cmd.arg(&artifact.text_path)
            .arg(&self.config.output_flag)
            .arg(&artifact.binary_path);
        run_compiler(cmd, compiler)?;

        Ok(artifact)
    }
}

fn run_compiler(mut cmd: Command, compiler: &str) -> HandoffResult<()> {
    let output = cmd.output().map_err(|source| HandoffError::Launch {
        compiler: compiler.to_string(),
        source,
    })?;
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if !output.status.success() {
        return Err(HandoffError::Exit {
            compiler: compiler.to_string(),
            status: output.status,
            stderr,
        });
    }
    if !stderr.is_empty() {
        return Err(HandoffError::Diagnostics {
            compiler: compiler.to_string(),
            stderr,
        });
    }
    Ok(())
}

fn with_extension(location: &str, extension: &str) -> PathBuf {
    let path = Path::new(location);
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}
