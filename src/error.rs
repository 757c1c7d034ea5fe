//! Fatal failure kinds surfaced to whoever schedules the build.
//!
//! Both are wrapped in `anyhow::Error` as they propagate; callers that need to
//! branch on the kind use `downcast_ref`.

use std::path::PathBuf;

use thiserror::Error;

/// Every (delimiter, encoding) attempt failed for a source file.
#[derive(Debug, Error)]
#[error("Unable to read {path:?} after {attempts} delimiter/encoding attempt(s)")]
pub struct UnreadableSourceError {
    pub path: PathBuf,
    pub attempts: usize,
    #[source]
    pub source: anyhow::Error,
}

/// The remote folder could not be fetched within the retry budget.
#[derive(Debug, Error)]
#[error("Fetching remote folder '{folder}' failed after {attempts} attempt(s)")]
pub struct AcquisitionError {
    pub folder: String,
    pub attempts: usize,
    #[source]
    pub source: anyhow::Error,
}
