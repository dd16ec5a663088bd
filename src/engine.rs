//! Engine invocation: locates the external exiftool binary and runs it.
//!
//! Every invocation is blocking and prepends the fixed `-config` argument so
//! the engine knows about the custom tag. The runner captures output and
//! reports the exit status as-is; it never interprets engine semantics.

use log::{debug, info};
use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{MetaError, Result};

/// Name of the external metadata engine binary.
pub const ENGINE_BINARY: &str = "exiftool";

/// Environment variable overriding the engine configuration file location.
pub const CONFIG_ENV: &str = "DOCMETA_CONFIG";

/// File name of the engine configuration defining the custom tag.
const CONFIG_FILE: &str = "xmp.config";

/// Locate a binary by name on the host search path.
pub fn find_binary(name: &str) -> Result<PathBuf> {
    let path_var =
        env::var_os("PATH").ok_or_else(|| MetaError::ExecutableNotFound(name.to_string()))?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| MetaError::ExecutableNotFound(name.to_string()))
}

/// Resolve the engine configuration file.
///
/// Precedence: `DOCMETA_CONFIG` override, then `xmp.config` beside the
/// executable, then the repo-relative `config/xmp.config`.
fn config_path() -> PathBuf {
    if let Some(overridden) = env::var_os(CONFIG_ENV) {
        return PathBuf::from(overridden);
    }
    if let Ok(exe) = env::current_exe() {
        if let Some(dir) = exe.parent() {
            let beside = dir.join(CONFIG_FILE);
            if beside.is_file() {
                return beside;
            }
        }
    }
    PathBuf::from("config").join(CONFIG_FILE)
}

/// Captured result of one engine invocation.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    /// Standard output, as text.
    pub stdout: String,
    /// Standard error, as text.
    pub stderr: String,
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    /// Whether the engine exited successfully (exit code 0).
    pub success: bool,
}

/// Handle to the external engine: a resolved binary plus the fixed
/// configuration file. Resolution happens once per `Engine` value.
#[derive(Debug, Clone)]
pub struct Engine {
    binary: PathBuf,
    config: PathBuf,
}

impl Engine {
    /// Resolve the engine on the host search path.
    pub fn new() -> Result<Self> {
        let binary = find_binary(ENGINE_BINARY)?;
        let config = config_path();
        debug!(
            "Engine resolved: binary={} config={}",
            binary.display(),
            config.display()
        );
        Ok(Self { binary, config })
    }

    /// Build an engine around an explicit binary and configuration file.
    pub fn with_binary(binary: impl Into<PathBuf>, config: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            config: config.into(),
        }
    }

    /// Path of the resolved engine binary.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Run the engine with the fixed configuration prepended, blocking until
    /// it exits. Output is captured, not streamed. A non-zero exit status is
    /// reported in the returned [`EngineOutput`], never mapped to an error
    /// here.
    pub fn execute<I, S>(&self, args: I) -> Result<EngineOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-config")
            .arg(&self.config)
            .arg("-q")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        info!("Executing engine: {:?}", cmd);
        let output = cmd.output()?;

        let result = EngineOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
            success: output.status.success(),
        };
        debug!(
            "Engine exited: code={:?} stdout={}B stderr={}B",
            result.exit_code,
            result.stdout.len(),
            result.stderr.len()
        );
        Ok(result)
    }
}
