//! Tool settings stored in an optional TOML file next to the task.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Settings for the kubectl handle (TOML).
///
/// These are tool-level knobs, not task inputs: which binary to run, which
/// kubeconfig to point it at, how long to wait on a single call. Missing
/// fields default to sensible values; a missing file means all defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolSettings {
    /// kubectl binary to invoke.
    pub kubectl_bin: String,

    /// Kubeconfig file passed as `--kubeconfig` on every call, if set.
    pub kubeconfig: Option<PathBuf>,

    /// Wall-clock budget for a single kubectl call, in seconds.
    pub call_timeout_secs: u64,

    /// Truncate captured kubectl stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            kubectl_bin: "kubectl".to_string(),
            kubeconfig: None,
            call_timeout_secs: 10 * 60,
            output_limit_bytes: 1_000_000,
        }
    }
}

impl ToolSettings {
    pub fn validate(&self) -> Result<()> {
        if self.kubectl_bin.trim().is_empty() {
            return Err(anyhow!("kubectl_bin must be non-empty"));
        }
        if self.call_timeout_secs == 0 {
            return Err(anyhow!("call_timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        Ok(())
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

/// Load settings from a TOML file.
///
/// If the file is missing, returns `ToolSettings::default()`.
pub fn load_settings(path: &Path) -> Result<ToolSettings> {
    if !path.exists() {
        let settings = ToolSettings::default();
        settings.validate()?;
        return Ok(settings);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let settings: ToolSettings =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    settings.validate()?;
    Ok(settings)
}
