pub mod bump;
pub mod config;
pub mod each;
pub mod error;
pub mod git;
pub mod install;
pub mod manifest;
pub mod push;
pub mod report;
pub mod revision;
pub mod semver;
pub mod ui;

pub use error::{PuppetReleaseError, Result};
