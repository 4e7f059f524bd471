//! Revision classification.
//!
//! Every pin string falls into exactly one of three classes: an opaque ref, a
//! `release/<major>.<minor>` branch, or a semver tag. Branch recognition is
//! purely syntactic; tag recognition additionally requires the caller to
//! confirm the string is a known tag, so classification stays reproducible
//! without network access once that answer is known.

use crate::error::{PuppetReleaseError, Result};

/// The class of a pin string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionClass {
    /// Anything the other two variants do not claim, including the empty pin
    Opaque(String),
    /// A `release/<major>.<minor>` branch
    Branch { major: u32, minor: u32 },
    /// A `[v]<major>.<minor>.<patch>` tag confirmed to exist
    Tag {
        prefixed: bool,
        major: u32,
        minor: u32,
        patch: u32,
    },
}

/// Classify a pin string. `is_known_tag` is consulted only when the string
/// already has the semver tag shape.
pub fn classify(text: &str, is_known_tag: impl FnOnce(&str) -> bool) -> RevisionClass {
    if let Some((major, minor)) = parse_release_branch(text) {
        return RevisionClass::Branch { major, minor };
    }
    if let Some((prefixed, major, minor, patch)) = parse_tag_shape(text) {
        if is_known_tag(text) {
            return RevisionClass::Tag {
                prefixed,
                major,
                minor,
                patch,
            };
        }
    }
    RevisionClass::Opaque(text.to_string())
}

/// Parse the literal shape `release/<digits>.<digits>`
pub fn parse_release_branch(s: &str) -> Option<(u32, u32)> {
    let rest = s.strip_prefix("release/")?;
    let (major, minor) = rest.split_once('.')?;
    Some((parse_digits(major)?, parse_digits(minor)?))
}

/// Format a release branch back from its numbers
pub fn format_release_branch(major: u32, minor: u32) -> String {
    format!("release/{}.{}", major, minor)
}

/// Parse the shape `[v]?<digits>.<digits>.<digits>`; returns whether the `v`
/// prefix was present plus the three numbers
pub fn parse_tag_shape(s: &str) -> Option<(bool, u32, u32, u32)> {
    let (prefixed, body) = match s.strip_prefix('v') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let mut it = body.split('.');
    let major = parse_digits(it.next()?)?;
    let minor = parse_digits(it.next()?)?;
    let patch = parse_digits(it.next()?)?;
    if it.next().is_some() {
        return None;
    }
    Some((prefixed, major, minor, patch))
}

/// Format a semver tag, restoring the `v` prefix when asked
pub fn format_tag(prefixed: bool, major: u32, minor: u32, patch: u32) -> String {
    format!(
        "{}{}.{}.{}",
        if prefixed { "v" } else { "" },
        major,
        minor,
        patch
    )
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Sort key for the loose 1-3 segment version grammar accepted by
/// `semver sort`. Missing trailing segments compare as 0; the shorter form
/// orders before the longer form with the same numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct VersionKey {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub segments: u8,
}

/// Parse an optionally `v`-prefixed version with 1-3 numeric dot segments.
/// Returns the string with the prefix stripped plus its sort key.
pub fn parse_loose(s: &str) -> Result<(String, VersionKey)> {
    let body = s.strip_prefix('v').unwrap_or(s);
    let parts: Vec<&str> = body.split('.').collect();
    if body.is_empty() || parts.len() > 3 {
        return Err(PuppetReleaseError::malformed_version(s.to_string()));
    }
    let mut nums = [0u32; 3];
    for (i, part) in parts.iter().enumerate() {
        nums[i] = parse_digits(part).ok_or_else(|| {
            PuppetReleaseError::malformed_version(format!("segment '{}' in '{}'", part, s))
        })?;
    }
    Ok((
        body.to_string(),
        VersionKey {
            major: nums[0],
            minor: nums[1],
            patch: nums[2],
            segments: parts.len() as u8,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_release_branch_is_syntactic() {
        // no oracle involved for the branch shape
        assert_eq!(
            classify("release/0.1", |_| false),
            RevisionClass::Branch { major: 0, minor: 1 }
        );
        assert_eq!(
            classify("release/10.20", |_| false),
            RevisionClass::Branch {
                major: 10,
                minor: 20
            }
        );
    }

    #[test]
    fn test_classify_branch_shape_rejects_non_numeric() {
        assert_eq!(
            classify("release/foobar", |_| true),
            RevisionClass::Opaque("release/foobar".to_string())
        );
        assert_eq!(
            classify("release/1.2.3", |_| false),
            RevisionClass::Opaque("release/1.2.3".to_string())
        );
    }

    #[test]
    fn test_classify_tag_needs_oracle_confirmation() {
        assert_eq!(
            classify("v0.1.3", |name| name == "v0.1.3"),
            RevisionClass::Tag {
                prefixed: true,
                major: 0,
                minor: 1,
                patch: 3
            }
        );
        assert_eq!(
            classify("3.0.3", |_| true),
            RevisionClass::Tag {
                prefixed: false,
                major: 3,
                minor: 0,
                patch: 3
            }
        );
        // tag shape without confirmation stays opaque
        assert_eq!(
            classify("v0.1.3", |_| false),
            RevisionClass::Opaque("v0.1.3".to_string())
        );
    }

    #[test]
    fn test_classify_is_total() {
        for s in ["", "master", "0123456789a", "development", "v1.2", "a1.2.3"] {
            assert_eq!(classify(s, |_| true), RevisionClass::Opaque(s.to_string()));
        }
    }

    #[test]
    fn test_parse_tag_shape() {
        assert_eq!(parse_tag_shape("v0.2.1"), Some((true, 0, 2, 1)));
        assert_eq!(parse_tag_shape("3.0.3"), Some((false, 3, 0, 3)));
        assert_eq!(parse_tag_shape("1.2"), None);
        assert_eq!(parse_tag_shape("1.2.3.4"), None);
        assert_eq!(parse_tag_shape("a1.2.3"), None);
    }

    #[test]
    fn test_format_round_trips() {
        assert_eq!(format_release_branch(0, 2), "release/0.2");
        assert_eq!(format_tag(true, 0, 2, 2), "v0.2.2");
        assert_eq!(format_tag(false, 3, 0, 4), "3.0.4");
    }

    #[test]
    fn test_parse_loose() {
        let (s, key) = parse_loose("v0.1").unwrap();
        assert_eq!(s, "0.1");
        assert_eq!(
            key,
            VersionKey {
                major: 0,
                minor: 1,
                patch: 0,
                segments: 2
            }
        );

        let (s, key) = parse_loose("0.1.0").unwrap();
        assert_eq!(s, "0.1.0");
        assert_eq!(key.segments, 3);

        assert!(parse_loose("v").is_err());
        assert!(parse_loose("1.2.3.4").is_err());
        assert!(parse_loose("a.b").is_err());
        assert!(parse_loose("release/0.1").is_err());
    }
}
