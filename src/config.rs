//! Run configuration loaded from an optional YAML file.
//!
//! Example:
//!
//! ```yaml
//! work_dir: /opt/data/raw
//! output: /opt/data/df.csv
//! remote:
//!   kind: command
//!   folder: 1AbCdEf
//! retry:
//!   attempts: 3
//!   base_delay_ms: 1000
//! ```

use std::{fs::File, io::BufReader, path::Path, path::PathBuf, time::Duration};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FETCH_PROGRAM: &str = "gdown";
pub const FETCH_PROGRAM_ENV: &str = "PROMO_DATASET_FETCH_PROGRAM";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory holding the raw extracts under their canonical names.
    pub work_dir: PathBuf,
    /// Snapshot destination.
    pub output: PathBuf,
    pub remote: Option<RemoteConfig>,
    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("data").join("raw"),
            output: PathBuf::from("data").join("df.csv"),
            remote: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let reader = BufReader::new(file);
        let config: PipelineConfig =
            serde_yaml::from_reader(reader).context("Parsing config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.retry.attempts == 0 {
            return Err(anyhow!("retry.attempts must be at least 1"));
        }
        if let Some(RemoteConfig::Command { folder, .. }) = &self.remote {
            if folder.trim().is_empty() {
                return Err(anyhow!("remote.folder cannot be empty"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemoteConfig {
    /// Shell out to a folder downloader. `{folder}` and `{dest}` in `args`
    /// are substituted before spawning.
    Command {
        folder: String,
        #[serde(default)]
        program: Option<String>,
        #[serde(default = "default_fetch_args")]
        args: Vec<String>,
    },
    /// Copy from a mounted shared directory.
    Mirror { path: PathBuf },
}

pub fn default_fetch_args() -> Vec<String> {
    [
        "--folder",
        "https://drive.google.com/drive/folders/{folder}",
        "-O",
        "{dest}",
        "--quiet",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RetryPolicy {
    pub attempts: usize,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (1-based); grows linearly.
    pub fn delay_after(&self, attempt: usize) -> Duration {
        Duration::from_millis(self.base_delay_ms.saturating_mul(attempt as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn backoff_is_linear_in_attempt_number() {
        let policy = RetryPolicy {
            attempts: 3,
            base_delay_ms: 250,
        };
        assert_eq!(policy.delay_after(1), Duration::from_millis(250));
        assert_eq!(policy.delay_after(2), Duration::from_millis(500));
    }

    #[test]
    fn loads_command_remote_with_default_args() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "work_dir: raw\nremote:\n  kind: command\n  folder: abc123\n",
        )
        .unwrap();
        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.work_dir, PathBuf::from("raw"));
        assert_eq!(config.output, PipelineConfig::default().output);
        assert_eq!(config.retry, RetryPolicy::default());
        match config.remote {
            Some(RemoteConfig::Command { folder, program, args }) => {
                assert_eq!(folder, "abc123");
                assert_eq!(program, None);
                assert_eq!(args, default_fetch_args());
            }
            other => panic!("unexpected remote {other:?}"),
        }
    }

    #[test]
    fn zero_attempts_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "retry:\n  attempts: 0\n").unwrap();
        assert!(PipelineConfig::load(&path).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "workdir: raw\n").unwrap();
        assert!(PipelineConfig::load(&path).is_err());
    }
}
