use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{io_utils, pipeline::BuildOutcome};

/// Machine-readable summary of one build, for whatever schedules it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub output: PathBuf,
    pub rows: usize,
    pub degraded: bool,
    pub promo_column: Option<String>,
    pub sha256: String,
    pub generated_at: DateTime<Utc>,
}

impl RunReport {
    pub fn from_outcome(outcome: &BuildOutcome) -> Result<Self> {
        let bytes = fs::read(&outcome.output)
            .with_context(|| format!("Reading snapshot {:?} for checksum", outcome.output))?;
        Ok(Self {
            output: outcome.output.clone(),
            rows: outcome.rows,
            degraded: outcome.degraded,
            promo_column: outcome.promo_column.clone(),
            sha256: hex_digest(&bytes),
            generated_at: Utc::now(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let body = serde_json::to_vec_pretty(self).context("Serializing run report")?;
        io_utils::publish_bytes(path, &body)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let body = fs::read(path).with_context(|| format!("Opening run report {path:?}"))?;
        serde_json::from_slice(&body).context("Parsing run report JSON")
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_of_empty_input() {
        assert_eq!(
            hex_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
