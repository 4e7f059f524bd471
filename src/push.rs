//! Print the git push commands a release needs (`git-push`).
//!
//! Nothing is executed; the output is meant to be reviewed and pasted. One
//! command is printed per module whose pin changed between the two manifests,
//! run from that module's checkout directory. Semver tags push as a tag ref,
//! everything else as a branch refspec.

use crate::error::Result;
use crate::manifest::Manifest;
use crate::revision;
use std::io::Write;
use std::path::Path;

pub fn print_push_commands(
    src: &Manifest,
    dst: &Manifest,
    remote: &str,
    module_root: &Path,
    out: &mut dyn Write,
) -> Result<()> {
    for entry in dst.entries() {
        if entry.git().is_none() || entry.pin().is_empty() {
            continue;
        }
        let unchanged = src
            .find(entry.fullname())
            .map(|old| old.pin() == entry.pin())
            .unwrap_or(false);
        if unchanged {
            continue;
        }

        let refspec = if revision::parse_tag_shape(entry.pin()).is_some() {
            format!("refs/tags/{}", entry.pin())
        } else {
            format!("{}:{}", entry.pin(), entry.pin())
        };
        writeln!(
            out,
            "(cd {} && git push {} {})",
            entry.dest(module_root).display(),
            remote,
            refspec
        )?;
    }
    Ok(())
}
