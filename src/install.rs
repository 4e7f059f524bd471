//! Install and checkout of the modules a Puppetfile lists.
//!
//! Each entry with a `:git =>` source gets its own checkout under the module
//! path: cloned when missing, fetched otherwise, then checked out at its pin.
//! Modules are independent, so the work runs on a bounded worker pool; one
//! module's failure is logged and never blocks the others.

use crate::error::{PuppetReleaseError, Result};
use crate::git::Vcs;
use crate::manifest::{Manifest, ModuleEntry};
use rayon::prelude::*;
use regex::Regex;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Upper bound on concurrent module jobs; 0 means one worker per module
    pub throttle: usize,
    /// Check out with local changes discarded
    pub force: bool,
    /// Skip clone/fetch entirely and only check out what is already on disk
    pub only_checkout: bool,
    /// Regex over full module names selecting what to install
    pub includes: String,
}

impl Default for InstallOptions {
    fn default() -> Self {
        InstallOptions {
            throttle: 0,
            force: false,
            only_checkout: false,
            includes: ".*".to_string(),
        }
    }
}

/// Install every selected module; returns the names of the modules that
/// failed so the caller can exit non-zero without aborting the rest.
pub fn run_install(
    manifest: &Manifest,
    opts: &InstallOptions,
    vcs: &dyn Vcs,
    module_root: &Path,
) -> Result<Vec<String>> {
    let filter = Regex::new(&opts.includes).map_err(|e| {
        PuppetReleaseError::command(format!("invalid module filter '{}': {}", opts.includes, e))
    })?;
    let targets: Vec<&ModuleEntry> = manifest
        .entries()
        .iter()
        .filter(|m| m.git().is_some() && filter.is_match(m.fullname()))
        .collect();
    if targets.is_empty() {
        return Ok(Vec::new());
    }
    fs::create_dir_all(module_root)?;

    let workers = if opts.throttle == 0 || opts.throttle > targets.len() {
        targets.len()
    } else {
        opts.throttle
    };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| PuppetReleaseError::command(format!("worker pool: {}", e)))?;

    let failed: Vec<String> = pool.install(|| {
        targets
            .par_iter()
            .filter_map(|entry| match install_one(entry, opts, vcs, module_root) {
                Ok(()) => None,
                Err(e) => {
                    log::warn!("{}: {}", entry.fullname(), e);
                    Some(entry.fullname().to_string())
                }
            })
            .collect()
    });
    Ok(failed)
}

fn install_one(
    entry: &ModuleEntry,
    opts: &InstallOptions,
    vcs: &dyn Vcs,
    module_root: &Path,
) -> Result<()> {
    let url = match entry.git() {
        Some(url) => url,
        None => return Ok(()),
    };
    let dest = entry.dest(module_root);

    if !dest.is_dir() {
        if opts.only_checkout {
            return Err(PuppetReleaseError::command(format!(
                "{} is not checked out",
                dest.display()
            )));
        }
        vcs.clone_repo(url, &dest)?;
    } else if !opts.only_checkout {
        vcs.fetch(&dest)?;
    }
    vcs.checkout(&dest, entry.pin(), opts.force)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockVcs;

    #[test]
    fn test_registry_modules_are_skipped() {
        let manifest = Manifest::parse("mod 'puppetlabs/stdlib', '4.1.0'").unwrap();
        let root = tempfile::tempdir().unwrap();
        let failed = run_install(
            &manifest,
            &InstallOptions::default(),
            &MockVcs::new(),
            root.path(),
        )
        .unwrap();
        assert!(failed.is_empty());
    }

    #[test]
    fn test_includes_filter_selects_by_full_name() {
        let manifest =
            Manifest::parse("mod 'a/one', :git => 'aaa'\nmod 'b/two', :git => 'bbb'\n").unwrap();
        let root = tempfile::tempdir().unwrap();
        let opts = InstallOptions {
            includes: "^a/".to_string(),
            only_checkout: true,
            ..InstallOptions::default()
        };
        // only a/one is selected and, being absent on disk, fails checkout-only
        let failed = run_install(&manifest, &opts, &MockVcs::new(), root.path()).unwrap();
        assert_eq!(failed, vec!["a/one".to_string()]);
    }

    #[test]
    fn test_invalid_filter_is_an_error() {
        let manifest = Manifest::parse("mod 'a/one', :git => 'aaa'").unwrap();
        let root = tempfile::tempdir().unwrap();
        let opts = InstallOptions {
            includes: "(".to_string(),
            ..InstallOptions::default()
        };
        assert!(run_install(&manifest, &opts, &MockVcs::new(), root.path()).is_err());
    }

    #[test]
    fn test_failures_are_collected_not_fatal() {
        let manifest =
            Manifest::parse("mod 'a/one', :git => 'aaa'\nmod 'b/two', :git => 'bbb'\n").unwrap();
        let root = tempfile::tempdir().unwrap();
        // one module already on disk succeeds, the missing one fails
        fs::create_dir(root.path().join("two")).unwrap();
        let opts = InstallOptions {
            only_checkout: true,
            throttle: 1,
            ..InstallOptions::default()
        };
        let failed = run_install(&manifest, &opts, &MockVcs::new(), root.path()).unwrap();
        assert_eq!(failed, vec!["a/one".to_string()]);
    }

    #[test]
    fn test_install_clones_missing_and_fetches_existing() {
        let manifest = Manifest::parse("mod 'a/one', :git => 'aaa'").unwrap();
        let root = tempfile::tempdir().unwrap();
        // MockVcs accepts everything; this exercises the clone path end to end
        let failed = run_install(
            &manifest,
            &InstallOptions::default(),
            &MockVcs::new(),
            root.path(),
        )
        .unwrap();
        assert!(failed.is_empty());
    }
}
