//! Ascending sort for loose version strings (`semver sort`).

use crate::error::Result;
use crate::revision;

/// Sort version strings ascending.
///
/// Each item is `[v]?` plus 1-3 dot-separated numeric segments; the output
/// never keeps the `v` prefix. Missing segments compare as 0, the shorter
/// form ordering first, and the sort is stable beyond that. One malformed
/// item fails the whole operation.
pub fn sort_versions(items: &[String]) -> Result<Vec<String>> {
    let mut keyed = Vec::with_capacity(items.len());
    for item in items {
        keyed.push(revision::parse_loose(item)?);
    }
    keyed.sort_by_key(|(_, key)| *key);
    Ok(keyed.into_iter().map(|(text, _)| text).collect())
}
