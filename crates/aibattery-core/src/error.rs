//! Errors produced while fetching usage data.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// A failed attempt to get a usage snapshot
#[derive(Debug, Error)]
pub enum FetchError {
    /// The usage file could not be read
    #[error("failed to read usage file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The usage file is not valid usage JSON
    #[error("failed to parse usage file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Running the usage command failed
    #[error("usage command failed: {0}")]
    Command(String),

    /// The usage output contained no meters
    #[error("no usage meters found in output")]
    NoMeters,

    /// The fetch did not finish in time
    #[error("usage fetch timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}
