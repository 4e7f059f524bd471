//! The bump engine: decide the next pin for every module when promoting a
//! Puppetfile from one stage to another.
//!
//! Given the previously released manifest (baseline), the current development
//! manifest (proposed) and the release branch in use, each proposed entry
//! resolves to one of three outcomes: keep the baseline pin, adopt the
//! proposed pin, or derive a bumped value. Which one applies depends on the
//! baseline pin's [RevisionClass] and on whether the module's tree actually
//! changed between the two pins, as answered by the [Vcs] diff oracle.

use crate::error::{PuppetReleaseError, Result};
use crate::git::Vcs;
use crate::manifest::{Manifest, ModuleEntry};
use crate::revision::{self, RevisionClass};
use crate::ui;
use std::io::Write;
use std::path::Path;

/// Compute the formatted next line for one proposed entry.
///
/// The proposed manifest is authoritative for the source URL; only the pin is
/// decided here. A [PuppetReleaseError::BumpPolicy] failure is scoped to this
/// module and yields no output line.
pub fn bump_entry(
    proposed: &ModuleEntry,
    baseline: &Manifest,
    release_branch: &str,
    vcs: &dyn Vcs,
    module_root: &Path,
) -> Result<String> {
    let old = match baseline.find(proposed.fullname()) {
        Some(old) => old,
        None => {
            // Newly introduced module: nothing to diff against. An unpinned
            // entry stays unpinned; a pinned one starts on the release branch.
            if proposed.pin().is_empty() {
                return Ok(proposed.to_string());
            }
            return Ok(proposed.repinned(release_branch).to_string());
        }
    };

    let dir = proposed.dest(module_root);
    let old_pin = old.pin();

    if old_pin == release_branch {
        // On-branch: the module already tracks the current release branch.
        if vcs.diff(&dir, old_pin, proposed.pin())?.is_empty() {
            return Ok(proposed.repinned(old_pin).to_string());
        }
        let (major, minor) = revision::parse_release_branch(old_pin).ok_or_else(|| {
            PuppetReleaseError::bump_policy(format!(
                "release branch '{}' is not release/<major>.<minor>",
                old_pin
            ))
        })?;
        return Ok(proposed
            .repinned(revision::format_release_branch(major, minor + 1))
            .to_string());
    }

    let tag_shaped = revision::parse_tag_shape(old_pin).is_some();
    let known_tag = if tag_shaped {
        vcs.is_tag(&dir, old_pin)?
    } else {
        false
    };

    match revision::classify(old_pin, |_| known_tag) {
        RevisionClass::Tag {
            prefixed,
            major,
            minor,
            patch,
        } => {
            if vcs.diff(&dir, old_pin, proposed.pin())?.is_empty() {
                return Ok(proposed.repinned(old_pin).to_string());
            }
            // The proposed pin names the release line the new tag belongs to.
            let (target_major, target_minor) = revision::parse_release_branch(proposed.pin())
                .ok_or_else(|| {
                    PuppetReleaseError::bump_policy(format!(
                        "cannot tag '{}': proposed ref '{}' is not release/<major>.<minor>",
                        proposed.fullname(),
                        proposed.pin()
                    ))
                })?;
            let next = if (target_major, target_minor) == (major, minor) {
                revision::format_tag(prefixed, major, minor, patch + 1)
            } else {
                revision::format_tag(prefixed, target_major, target_minor, 0)
            };
            Ok(proposed.repinned(next).to_string())
        }
        // A release branch other than the one in use behaves like any other
        // ref: adopt the proposed pin only if something actually moved.
        RevisionClass::Branch { .. } | RevisionClass::Opaque(_) => {
            if vcs.diff(&dir, old_pin, proposed.pin())?.is_empty() {
                Ok(proposed.repinned(old_pin).to_string())
            } else {
                Ok(proposed.to_string())
            }
        }
    }
}

/// Bump every module of `dst` against `src` and write the resulting manifest
/// to `out`. Per-module failures are reported and skipped; the number of
/// failed modules is returned so callers can exit non-zero.
pub fn bump_file(
    src: &Path,
    dst: &Path,
    release_branch: &str,
    vcs: &dyn Vcs,
    module_root: &Path,
    out: &mut dyn Write,
) -> Result<usize> {
    let baseline = Manifest::load(src)?;
    let proposed = Manifest::load(dst)?;

    let mut failed = 0;
    for entry in proposed.entries() {
        match bump_entry(entry, &baseline, release_branch, vcs, module_root) {
            Ok(line) => writeln!(out, "{}", line)?,
            Err(e) => {
                ui::display_error(&format!("{}: {}", entry.fullname(), e));
                failed += 1;
            }
        }
    }
    Ok(failed)
}
