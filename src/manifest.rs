//! Puppetfile model: parsing, lookup and canonical formatting.
//!
//! A manifest is an ordered list of `mod` entries:
//!
//! ```text
//! mod 'puppetlabs/stdlib', '4.1.0'
//! mod 'fiz/buz', :git => 'user@github.com/fiz/buz', :ref => 'v0.1.0'
//! ```
//!
//! Entries are immutable values; a bump never mutates an entry in place but
//! produces a new one via [ModuleEntry::repinned].

use crate::error::{PuppetReleaseError, Result};
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// One `mod` line of a Puppetfile.
///
/// The pin slot holds whatever revision token the entry was written with: a
/// `:ref =>` value, or the bare registry version shorthand
/// (`mod 'name', '4.1.0'`). Which of the two it renders as depends on whether
/// a `:git =>` source is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEntry {
    name: String,
    git: Option<String>,
    pin: Option<String>,
}

impl ModuleEntry {
    /// Create a name-only entry
    pub fn new(name: impl Into<String>) -> Self {
        ModuleEntry {
            name: name.into(),
            git: None,
            pin: None,
        }
    }

    /// Builder-style: attach a `:git =>` source URL
    pub fn with_source(mut self, url: impl Into<String>) -> Self {
        self.git = Some(url.into());
        self
    }

    /// Builder-style: attach a pin (revision token)
    pub fn with_pin(mut self, pin: impl Into<String>) -> Self {
        self.pin = Some(pin.into());
        self
    }

    /// The module name verbatim, including the `owner/` prefix if present
    pub fn fullname(&self) -> &str {
        &self.name
    }

    /// The name without its `owner/` prefix; this is the checkout
    /// directory name under the module path
    pub fn short_name(&self) -> &str {
        match self.name.rsplit_once('/') {
            Some((_, short)) => short,
            None => &self.name,
        }
    }

    /// The `:git =>` source URL, if any
    pub fn git(&self) -> Option<&str> {
        self.git.as_deref()
    }

    /// The pinned revision, or the empty string when unpinned
    pub fn pin(&self) -> &str {
        self.pin.as_deref().unwrap_or("")
    }

    /// The pin with a single leading `v` stripped, but only when the
    /// remainder is exactly `<digits>.<digits>.<digits>`.
    ///
    /// `v10.20.30` becomes `10.20.30`; `master` and `a1.2.3` are unchanged.
    pub fn pin_semver(&self) -> &str {
        let pin = self.pin();
        match pin.strip_prefix('v') {
            Some(rest) if is_numeric_triple(rest) => rest,
            _ => pin,
        }
    }

    /// The checkout directory of this module under `module_root`
    pub fn dest(&self, module_root: &Path) -> PathBuf {
        module_root.join(self.short_name())
    }

    /// A new entry with the same name and source but a different pin.
    /// An empty pin means unpinned.
    pub fn repinned(&self, pin: impl Into<String>) -> ModuleEntry {
        let pin = pin.into();
        ModuleEntry {
            name: self.name.clone(),
            git: self.git.clone(),
            pin: if pin.is_empty() { None } else { Some(pin) },
        }
    }
}

fn is_numeric_triple(s: &str) -> bool {
    let mut segments = 0;
    for part in s.split('.') {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        segments += 1;
    }
    segments == 3
}

impl fmt::Display for ModuleEntry {
    /// Canonical entry formatting; parse-then-format is byte-for-byte
    /// idempotent for already-canonical input.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mod '{}'", self.name)?;
        match (&self.git, &self.pin) {
            (None, None) => Ok(()),
            (None, Some(version)) => write!(f, ", '{}'", version),
            (Some(url), None) => write!(f, ", :git => '{}'", url),
            (Some(url), Some(pin)) => write!(f, ", :git => '{}', :ref => '{}'", url, pin),
        }
    }
}

/// An ordered list of module entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ModuleEntry>,
}

impl Manifest {
    /// Parse Puppetfile text.
    ///
    /// Blank lines, `#` comments and `forge` declarations are skipped; any
    /// other line must tokenize as a `mod` entry. A single bad line fails the
    /// whole parse, partial manifests are not meaningful.
    pub fn parse(text: &str) -> Result<Manifest> {
        let head = Regex::new(r"^mod\s+'([^']+)'(.*)$").unwrap();
        let git_token = Regex::new(r"^\s*,\s*:git\s*=>\s*'([^']*)'").unwrap();
        let ref_token = Regex::new(r"^\s*,\s*:ref\s*=>\s*'([^']*)'").unwrap();
        let bare_token = Regex::new(r"^\s*,\s*'([^']*)'").unwrap();

        let mut entries = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with("forge") {
                continue;
            }
            let caps = head.captures(line).ok_or_else(|| {
                PuppetReleaseError::malformed_entry(format!("line {}: {}", idx + 1, raw))
            })?;
            let mut entry = ModuleEntry::new(&caps[1]);
            let mut rest = caps.get(2).map(|m| m.as_str()).unwrap_or("");

            while !rest.trim().is_empty() {
                if let Some(c) = git_token.captures(rest) {
                    if entry.git.is_some() {
                        return Err(PuppetReleaseError::malformed_entry(format!(
                            "line {}: duplicate :git in {}",
                            idx + 1,
                            raw
                        )));
                    }
                    entry.git = Some(c[1].to_string());
                    rest = &rest[c.get(0).unwrap().end()..];
                } else if let Some(c) = ref_token.captures(rest).or_else(|| bare_token.captures(rest)) {
                    if entry.pin.is_some() {
                        return Err(PuppetReleaseError::malformed_entry(format!(
                            "line {}: duplicate revision token in {}",
                            idx + 1,
                            raw
                        )));
                    }
                    entry.pin = Some(c[1].to_string());
                    rest = &rest[c.get(0).unwrap().end()..];
                } else {
                    return Err(PuppetReleaseError::malformed_entry(format!(
                        "line {}: trailing '{}' in {}",
                        idx + 1,
                        rest.trim(),
                        raw
                    )));
                }
            }
            entries.push(entry);
        }
        Ok(Manifest { entries })
    }

    /// Read and parse a Puppetfile from disk
    pub fn load(path: &Path) -> Result<Manifest> {
        let text = fs::read_to_string(path)?;
        Manifest::parse(&text)
    }

    pub fn entries(&self) -> &[ModuleEntry] {
        &self.entries
    }

    /// Exact-match lookup by full name. Duplicate names are not collapsed;
    /// the first match wins.
    pub fn find(&self, name: &str) -> Option<&ModuleEntry> {
        self.entries.iter().find(|e| e.fullname() == name)
    }

    /// Canonical text: one formatted entry per line, insertion order
    pub fn format(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out
    }

    /// A copy with entries sorted by full name (used by the `format` command)
    pub fn sorted_by_name(&self) -> Manifest {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| a.fullname().cmp(b.fullname()));
        Manifest { entries }
    }
}
