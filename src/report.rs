//! The diff-report engine: compare two Puppetfiles against the module trees
//! already checked out under the module path.
//!
//! Entries are matched by name with outer-join semantics. A module present on
//! both sides with differing pins counts as changed only when the diff oracle
//! finds an actual difference between the two revisions, in the module's own
//! checkout plus the corresponding subpath of every extra directory.

use crate::error::Result;
use crate::git::Vcs;
use crate::manifest::Manifest;
use clap::ValueEnum;
use std::fmt::Write;
use std::path::Path;

/// Report rendering style
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiffMode {
    /// One line per changed, added or removed module
    Stat,
    /// Stat lines followed by the unified diff text
    Full,
    /// Counts only
    Summary,
}

/// Render a comparison of `src` against `dst`.
///
/// Output order follows `dst`; modules only present in `src` are appended as
/// removed, in `src` order.
pub fn report(
    src: &Manifest,
    dst: &Manifest,
    extra_dirs: &[String],
    mode: DiffMode,
    vcs: &dyn Vcs,
    module_root: &Path,
) -> Result<String> {
    let mut out = String::new();
    let mut changed = 0;
    let mut added = 0;
    let mut removed = 0;

    for entry in dst.entries() {
        let old = match src.find(entry.fullname()) {
            Some(old) => old,
            None => {
                added += 1;
                if mode != DiffMode::Summary {
                    writeln!(out, "A {} {}", entry.fullname(), entry.pin()).unwrap();
                }
                continue;
            }
        };
        if old.pin() == entry.pin() {
            continue;
        }

        let mut diff = vcs.diff(&entry.dest(module_root), old.pin(), entry.pin())?;
        for dir in extra_dirs {
            let sub = Path::new(dir).join(entry.short_name());
            if sub.is_dir() {
                diff.push_str(&vcs.diff(&sub, old.pin(), entry.pin())?);
            }
        }
        if diff.is_empty() {
            continue;
        }

        changed += 1;
        match mode {
            DiffMode::Summary => {}
            DiffMode::Stat => {
                writeln!(out, "M {} {} -> {}", entry.fullname(), old.pin(), entry.pin()).unwrap();
            }
            DiffMode::Full => {
                writeln!(out, "M {} {} -> {}", entry.fullname(), old.pin(), entry.pin()).unwrap();
                out.push_str(&diff);
            }
        }
    }

    for entry in src.entries() {
        if dst.find(entry.fullname()).is_none() {
            removed += 1;
            if mode != DiffMode::Summary {
                writeln!(out, "D {} {}", entry.fullname(), entry.pin()).unwrap();
            }
        }
    }

    if mode == DiffMode::Summary {
        writeln!(out, "{} changed, {} added, {} removed", changed, added, removed).unwrap();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockVcs;

    fn manifests() -> (Manifest, Manifest) {
        let src = Manifest::parse(
            "mod 'a/unchanged', :git => 'aaa', :ref => 'v0.1.0'\n\
             mod 'b/moved', :git => 'bbb', :ref => 'v0.1.0'\n\
             mod 'c/gone', :git => 'ccc', :ref => 'master'\n",
        )
        .unwrap();
        let dst = Manifest::parse(
            "mod 'a/unchanged', :git => 'aaa', :ref => 'v0.1.0'\n\
             mod 'b/moved', :git => 'bbb', :ref => 'v0.2.0'\n\
             mod 'd/fresh', :git => 'ddd', :ref => 'development'\n",
        )
        .unwrap();
        (src, dst)
    }

    #[test]
    fn test_stat_mode_reports_outer_join() {
        let (src, dst) = manifests();
        let vcs = MockVcs::with_diff("+line\n");
        let got = report(&src, &dst, &[], DiffMode::Stat, &vcs, Path::new("modules")).unwrap();
        assert_eq!(
            got,
            "M b/moved v0.1.0 -> v0.2.0\nA d/fresh development\nD c/gone master\n"
        );
    }

    #[test]
    fn test_pin_change_without_tree_change_is_silent() {
        let (src, dst) = manifests();
        let vcs = MockVcs::new();
        let got = report(&src, &dst, &[], DiffMode::Stat, &vcs, Path::new("modules")).unwrap();
        // only the added and removed rows survive
        assert_eq!(got, "A d/fresh development\nD c/gone master\n");
    }

    #[test]
    fn test_full_mode_appends_diff_text() {
        let (src, dst) = manifests();
        let vcs = MockVcs::with_diff("+new line\n-old line\n");
        let got = report(&src, &dst, &[], DiffMode::Full, &vcs, Path::new("modules")).unwrap();
        assert!(got.starts_with("M b/moved v0.1.0 -> v0.2.0\n+new line\n-old line\n"));
    }

    #[test]
    fn test_summary_mode_counts_only() {
        let (src, dst) = manifests();
        let vcs = MockVcs::with_diff("+line\n");
        let got = report(&src, &dst, &[], DiffMode::Summary, &vcs, Path::new("modules")).unwrap();
        assert_eq!(got, "1 changed, 1 added, 1 removed\n");
    }

    #[test]
    fn test_extra_dirs_contribute_to_the_oracle() {
        let (src, dst) = manifests();
        let extra = tempfile::tempdir().unwrap();
        std::fs::create_dir(extra.path().join("moved")).unwrap();

        // the module tree itself is quiet; only the extra dir changed
        let mut vcs = MockVcs::new();
        vcs.set_diff(extra.path().join("moved"), "+manifest change\n");

        let dirs = vec![extra.path().to_str().unwrap().to_string()];
        let got = report(&src, &dst, &dirs, DiffMode::Stat, &vcs, Path::new("modules")).unwrap();
        assert!(got.contains("M b/moved v0.1.0 -> v0.2.0"));
    }

    #[test]
    fn test_missing_extra_subdir_is_skipped() {
        let (src, dst) = manifests();
        let extra = tempfile::tempdir().unwrap();
        let vcs = MockVcs::new();
        let dirs = vec![extra.path().to_str().unwrap().to_string()];
        let got = report(&src, &dst, &dirs, DiffMode::Summary, &vcs, Path::new("modules")).unwrap();
        assert_eq!(got, "0 changed, 1 added, 1 removed\n");
    }
}
