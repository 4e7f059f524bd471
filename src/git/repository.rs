use crate::error::{PuppetReleaseError, Result};
use crate::git::Vcs;
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{AutotagOption, BranchType, DiffFormat, DiffOptions, FetchOptions, FetchPrune, Repository};
use std::path::Path;

/// Real [Vcs] implementation backed by the `git2` crate.
///
/// Each call opens the repository at the given directory; no handle is kept
/// between calls, so one instance can serve many module checkouts from
/// concurrent workers.
pub struct Git2Vcs;

impl Git2Vcs {
    pub fn new() -> Self {
        Git2Vcs
    }

    fn open(dir: &Path) -> Result<Repository> {
        Repository::open(dir).map_err(|e| {
            PuppetReleaseError::command(format!("{} is not a git checkout: {}", dir.display(), e))
        })
    }

    fn rev_tree<'r>(repo: &'r Repository, spec: &str) -> Result<git2::Tree<'r>> {
        let object = repo.revparse_single(spec)?;
        object
            .peel(git2::ObjectType::Tree)?
            .into_tree()
            .map_err(|_| PuppetReleaseError::command(format!("'{}' does not name a tree", spec)))
    }
}

impl Default for Git2Vcs {
    fn default() -> Self {
        Self::new()
    }
}

impl Vcs for Git2Vcs {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        log::debug!("clone {} into {}", url, dest.display());
        RepoBuilder::new().clone(url, dest)?;
        Ok(())
    }

    fn fetch(&self, dest: &Path) -> Result<()> {
        log::debug!("fetch in {}", dest.display());
        let repo = Self::open(dest)?;
        let mut remote = repo.find_remote("origin")?;
        let mut options = FetchOptions::new();
        options.prune(FetchPrune::On);
        options.download_tags(AutotagOption::All);
        remote.fetch(
            &["+refs/heads/*:refs/remotes/origin/*"],
            Some(&mut options),
            None,
        )?;
        Ok(())
    }

    fn checkout(&self, dest: &Path, reference: &str, force: bool) -> Result<()> {
        let wanted = if reference.is_empty() { "master" } else { reference };
        log::debug!("checkout {} in {}", wanted, dest.display());
        let repo = Self::open(dest)?;

        // Resolve locally first; fall back to the remote-tracking branch and
        // materialize a local branch for it, the way `git checkout` would.
        let (object, head_ref) = match repo.revparse_single(wanted) {
            Ok(object) => {
                let head_ref = repo
                    .find_branch(wanted, BranchType::Local)
                    .ok()
                    .and_then(|b| b.get().name().map(String::from));
                (object, head_ref)
            }
            Err(_) => {
                let remote_object = repo.revparse_single(&format!("origin/{}", wanted))?;
                let commit = remote_object
                    .peel(git2::ObjectType::Commit)?
                    .into_commit()
                    .map_err(|_| {
                        PuppetReleaseError::command(format!(
                            "origin/{} does not name a commit",
                            wanted
                        ))
                    })?;
                let branch = repo.branch(wanted, &commit, false)?;
                let head_ref = branch.get().name().map(String::from);
                (repo.revparse_single(wanted)?, head_ref)
            }
        };

        let mut builder = CheckoutBuilder::new();
        if force {
            builder.force();
        }
        repo.checkout_tree(&object, Some(&mut builder))?;
        match head_ref {
            Some(name) => repo.set_head(&name)?,
            None => repo.set_head_detached(object.id())?,
        }
        Ok(())
    }

    fn diff(&self, dir: &Path, from: &str, to: &str) -> Result<String> {
        let repo = Self::open(dir)?;
        let from_tree = Self::rev_tree(&repo, from)?;
        let to_tree = Self::rev_tree(&repo, to)?;

        // Whitespace-only changes never count as a change.
        let mut options = DiffOptions::new();
        options.ignore_whitespace(true);
        let diff = repo.diff_tree_to_tree(Some(&from_tree), Some(&to_tree), Some(&mut options))?;

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            match line.origin() {
                '+' | '-' | ' ' => text.push(line.origin()),
                _ => {}
            }
            text.push_str(std::str::from_utf8(line.content()).unwrap_or(""));
            true
        })?;
        Ok(text)
    }

    fn is_branch(&self, dir: &Path, name: &str) -> Result<bool> {
        let repo = Self::open(dir)?;
        if repo.find_branch(name, BranchType::Local).is_ok() {
            return Ok(true);
        }
        let found = repo
            .find_branch(&format!("origin/{}", name), BranchType::Remote)
            .is_ok();
        Ok(found)
    }

    fn is_tag(&self, dir: &Path, name: &str) -> Result<bool> {
        let repo = Self::open(dir)?;
        let found = repo.find_reference(&format!("refs/tags/{}", name)).is_ok();
        Ok(found)
    }
}
