//! Version-control abstraction layer
//!
//! The engines never talk to git directly; they go through the [Vcs] trait so
//! bump and diff decisions are testable without a network or a checkout. The
//! concrete implementations are:
//!
//! - [repository::Git2Vcs]: the real implementation over the `git2` crate
//! - [mock::MockVcs]: canned answers for tests
//!
//! The `diff` method doubles as the change oracle: an empty string means the
//! two revisions do not differ. Transport and tooling failures are surfaced
//! as errors and propagate unchanged; retries are the caller's concern.

pub mod mock;
pub mod repository;

pub use mock::MockVcs;
pub use repository::Git2Vcs;

use crate::error::Result;
use std::path::Path;

/// Common version-control operations over per-module checkout directories.
///
/// All implementors must be `Send + Sync` so module work can run in parallel.
pub trait Vcs: Send + Sync {
    /// Clone `url` into `dest`
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;

    /// Fetch branches and tags from origin, pruning removed refs
    fn fetch(&self, dest: &Path) -> Result<()>;

    /// Check out `reference` in `dest`. An empty reference means `master`;
    /// `force` discards local changes.
    fn checkout(&self, dest: &Path, reference: &str, force: bool) -> Result<()>;

    /// Unified diff text between two revisions of the checkout at `dir`,
    /// ignoring whitespace-only changes. Empty output means no difference.
    fn diff(&self, dir: &Path, from: &str, to: &str) -> Result<String>;

    /// Whether `name` exists as a local or origin branch of `dir`
    fn is_branch(&self, dir: &Path, name: &str) -> Result<bool>;

    /// Whether `name` exists as a tag of `dir`
    fn is_tag(&self, dir: &Path, name: &str) -> Result<bool>;
}
