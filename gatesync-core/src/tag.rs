//! Tag merger: order-preserving union with de-duplication, plus the
//! lookup-tag equality check used during build-time tag merging.
//!
//! Instantiated fresh per run by the caller
//! (`gatesync-build::builder::StateBuilder`) rather than kept as a
//! module-level singleton.

#[derive(Debug, Clone, Default)]
pub struct TagMerger {
    select_tags: Vec<String>,
}

impl TagMerger {
    pub fn new(select_tags: Vec<String>) -> Self {
        Self { select_tags }
    }

    /// True if `tags`, once sorted, equals the kind's lookup-tag set
    /// element-wise sorted. Both sides are compared as sorted multisets so
    /// declaration order never matters.
    pub fn matches_lookup_tags(tags: &[String], lookup_tags: &[String]) -> bool {
        let mut a: Vec<&str> = tags.iter().map(String::as_str).collect();
        let mut b: Vec<&str> = lookup_tags.iter().map(String::as_str).collect();
        a.sort_unstable();
        b.sort_unstable();
        a == b
    }

    /// If `tags` (sorted) equals the kind's lookup-tag set, leave untouched
    /// (upstream-owned); otherwise union with the run's select-tag set,
    /// de-duplicated, preserving first-seen order.
    pub fn merge(&self, mut tags: Vec<String>, lookup_tags: &[String]) -> Vec<String> {
        tags.sort_unstable();
        if Self::matches_lookup_tags(&tags, lookup_tags) {
            return tags;
        }
        let mut merged = tags;
        for tag in &self.select_tags {
            if !merged.contains(tag) {
                merged.push(tag.clone());
            }
        }
        merged
    }

    pub fn select_tags(&self) -> &[String] {
        &self.select_tags
    }
}
