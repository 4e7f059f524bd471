use crate::error::Result;
use crate::git::Vcs;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Mock VCS for testing the engines without real repositories.
///
/// `diff` answers with a per-directory canned text falling back to a global
/// default; branch and tag existence are plain name sets. Clone, fetch and
/// checkout all succeed silently.
pub struct MockVcs {
    default_diff: String,
    diffs: HashMap<PathBuf, String>,
    branches: HashSet<String>,
    tags: HashSet<String>,
}

impl MockVcs {
    /// A mock where nothing differs and no branch or tag exists
    pub fn new() -> Self {
        MockVcs {
            default_diff: String::new(),
            diffs: HashMap::new(),
            branches: HashSet::new(),
            tags: HashSet::new(),
        }
    }

    /// A mock reporting `diff` for every directory
    pub fn with_diff(diff: impl Into<String>) -> Self {
        MockVcs {
            default_diff: diff.into(),
            ..Self::new()
        }
    }

    /// Override the diff answer for one directory
    pub fn set_diff(&mut self, dir: impl Into<PathBuf>, diff: impl Into<String>) {
        self.diffs.insert(dir.into(), diff.into());
    }

    /// Register a known branch name
    pub fn add_branch(&mut self, name: impl Into<String>) {
        self.branches.insert(name.into());
    }

    /// Register a known tag name
    pub fn add_tag(&mut self, name: impl Into<String>) {
        self.tags.insert(name.into());
    }
}

impl Default for MockVcs {
    fn default() -> Self {
        Self::new()
    }
}

impl Vcs for MockVcs {
    fn clone_repo(&self, _url: &str, _dest: &Path) -> Result<()> {
        Ok(())
    }

    fn fetch(&self, _dest: &Path) -> Result<()> {
        Ok(())
    }

    fn checkout(&self, _dest: &Path, _reference: &str, _force: bool) -> Result<()> {
        Ok(())
    }

    fn diff(&self, dir: &Path, _from: &str, _to: &str) -> Result<String> {
        Ok(self
            .diffs
            .get(dir)
            .cloned()
            .unwrap_or_else(|| self.default_diff.clone()))
    }

    fn is_branch(&self, _dir: &Path, name: &str) -> Result<bool> {
        Ok(self.branches.contains(name))
    }

    fn is_tag(&self, _dir: &Path, name: &str) -> Result<bool> {
        Ok(self.tags.contains(name))
    }
}
