use thiserror::Error;

/// Unified error type for puppet-release operations
#[derive(Error, Debug)]
pub enum PuppetReleaseError {
    #[error("Malformed entry: {0}")]
    MalformedEntry(String),

    #[error("Bump policy violation: {0}")]
    BumpPolicy(String),

    #[error("Malformed version: {0}")]
    MalformedVersion(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Command failed: {0}")]
    Command(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in puppet-release
pub type Result<T> = std::result::Result<T, PuppetReleaseError>;

impl PuppetReleaseError {
    /// Create a malformed entry error with context
    pub fn malformed_entry(msg: impl Into<String>) -> Self {
        PuppetReleaseError::MalformedEntry(msg.into())
    }

    /// Create a bump policy error with context
    pub fn bump_policy(msg: impl Into<String>) -> Self {
        PuppetReleaseError::BumpPolicy(msg.into())
    }

    /// Create a malformed version error with context
    pub fn malformed_version(msg: impl Into<String>) -> Self {
        PuppetReleaseError::MalformedVersion(msg.into())
    }

    /// Create a command error with context
    pub fn command(msg: impl Into<String>) -> Self {
        PuppetReleaseError::Command(msg.into())
    }
}
