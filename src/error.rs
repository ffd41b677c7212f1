// Error taxonomy for the bootstrapper.
//
// Platform and architecture failures are fatal: without a target triple no
// binary can ever be fetched, so the whole run aborts. Everything network,
// archive or payload related is recovered per binary at the install-manager
// boundary and recorded as a failed result while the batch continues.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("unsupported operating system: {0}")]
    UnsupportedPlatform(String),

    #[error("unsupported CPU architecture: {0}")]
    UnsupportedArchitecture(String),

    #[error("failed to determine home directory")]
    HomeDirNotFound,

    #[error("invalid binary name: {0}")]
    InvalidBinaryName(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("no release found for {org}/{binary}: {reason}")]
    ReleaseNotFound {
        org: String,
        binary: String,
        reason: String,
    },

    #[error("no downloadable artifact found, tried: {}", .urls.join(", "))]
    ArtifactNotFound { urls: Vec<String> },

    #[error("unsupported archive format: {0}")]
    UnsupportedArchiveFormat(String),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("binary '{0}' not found in extracted archive")]
    BinaryNotFoundInArchive(String),

    #[error("'{0}' is not installed")]
    NotInstalled(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BootstrapError>;
