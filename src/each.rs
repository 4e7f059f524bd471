//! Run an arbitrary command once per module (`each`).
//!
//! Arguments and the prefix/body/suffix templates may use `{name}`, `{ref}`
//! and `{ref_semver}` placeholders; the body additionally gets `{value}`,
//! bound to the command's stdout. A failing command is reported inline and
//! never stops the remaining modules.

use crate::error::{PuppetReleaseError, Result};
use crate::manifest::{Manifest, ModuleEntry};
use std::io::Write;
use std::path::Path;
use std::process::Command;

/// Templates wrapped around each module's command output
#[derive(Debug, Clone, Default)]
pub struct EachOptions {
    pub prefix: String,
    pub body: String,
    pub suffix: String,
}

fn expand(template: &str, entry: &ModuleEntry, value: Option<&str>) -> String {
    let mut text = template
        .replace("{name}", entry.fullname())
        .replace("{ref}", entry.pin())
        .replace("{ref_semver}", entry.pin_semver());
    if let Some(value) = value {
        text = text.replace("{value}", value);
    }
    text.replace("\\n", "\n").replace("\\t", "\t")
}

/// Run `args` once per manifest entry, in that module's checkout directory
pub fn run_each(
    manifest: &Manifest,
    args: &[String],
    opts: &EachOptions,
    module_root: &Path,
    out: &mut dyn Write,
) -> Result<()> {
    if args.is_empty() {
        return Err(PuppetReleaseError::command("each needs a command to run"));
    }

    for entry in manifest.entries() {
        let argv: Vec<String> = args.iter().map(|a| expand(a, entry, None)).collect();
        let dir = entry.dest(module_root);

        log::debug!("run {:?} in {}", argv, dir.display());
        let output = Command::new(&argv[0]).args(&argv[1..]).current_dir(&dir).output();
        let output = match output {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                writeln!(out, "# Failed to run `{:?}` in {}", argv, dir.display())?;
                std::io::stderr().write_all(&output.stderr)?;
                continue;
            }
            Err(e) => {
                writeln!(out, "# Failed to run `{:?}` in {}: {}", argv, dir.display(), e)?;
                continue;
            }
        };

        write!(out, "{}", expand(&opts.prefix, entry, None))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        if opts.body.is_empty() {
            write!(out, "{}", stdout)?;
        } else {
            write!(out, "{}", expand(&opts.body, entry, Some(&stdout)))?;
        }
        write!(out, "{}", expand(&opts.suffix, entry, None))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str) -> ModuleEntry {
        Manifest::parse(text).unwrap().entries()[0].clone()
    }

    #[test]
    fn test_expand_placeholders() {
        let e = entry("mod 'bar/foo', :git => 'a@b.com', :ref => 'v1.2.3'");
        assert_eq!(
            expand("{name}\\t{ref}\\t{ref_semver}\\n", &e, None),
            "bar/foo\tv1.2.3\t1.2.3\n"
        );
    }

    #[test]
    fn test_expand_value_only_when_given() {
        let e = entry("mod 'foo'");
        assert_eq!(expand("latest:{value}", &e, Some("9.9.9")), "latest:9.9.9");
        assert_eq!(expand("latest:{value}", &e, None), "latest:{value}");
    }

    #[test]
    fn test_run_each_without_command_fails() {
        let manifest = Manifest::parse("mod 'foo'").unwrap();
        let mut out = Vec::new();
        let err = run_each(
            &manifest,
            &[],
            &EachOptions::default(),
            Path::new("modules"),
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(err, PuppetReleaseError::Command(_)));
    }

    #[test]
    fn test_run_each_reports_failures_and_continues() {
        let manifest = Manifest::parse("mod 'a/one'\nmod 'b/two'\n").unwrap();
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("one")).unwrap();
        std::fs::create_dir(root.path().join("two")).unwrap();

        let args = vec!["false".to_string()];
        let mut out = Vec::new();
        run_each(
            &manifest,
            &args,
            &EachOptions::default(),
            root.path(),
            &mut out,
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("# Failed to run").count(), 2);
    }

    #[test]
    fn test_run_each_wraps_output_in_templates() {
        let manifest = Manifest::parse("mod 'a/one', :git => 'aaa', :ref => 'v0.1.0'").unwrap();
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("one")).unwrap();

        let args = vec!["echo".to_string(), "{ref}".to_string()];
        let opts = EachOptions {
            prefix: "{name}: ".to_string(),
            body: String::new(),
            suffix: String::new(),
        };
        let mut out = Vec::new();
        run_each(&manifest, &args, &opts, root.path(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a/one: v0.1.0\n");
    }
}
