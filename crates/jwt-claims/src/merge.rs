//! Merging of same-named claims across chain levels.

use crate::claims::ExtractedClaim;
use std::collections::HashMap;

/// Group claims by name and link each group outer-to-inner.
///
/// The claim with the smallest depth in a group becomes the map value; its
/// `inner` points at the next deeper claim of the same name, and so on.
#[must_use]
pub fn merge(claims: Vec<ExtractedClaim>) -> HashMap<String, ExtractedClaim> {
    let mut grouped: HashMap<String, Vec<ExtractedClaim>> = HashMap::new();
    for claim in claims {
        grouped.entry(claim.name.clone()).or_default().push(claim);
    }

    grouped
        .into_iter()
        .filter_map(|(name, group)| link(group).map(|head| (name, head)))
        .collect()
}

/// Build the chain from the deepest claim up; `None` for an empty group.
fn link(mut group: Vec<ExtractedClaim>) -> Option<ExtractedClaim> {
    group.sort_by_key(|claim| claim.depth);

    group
        .into_iter()
        .rev()
        .fold(None, |inner: Option<ExtractedClaim>, mut claim| {
            claim.inner = inner.map(Box::new);
            Some(claim)
        })
}
