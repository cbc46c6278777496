//! Merges provider results into one ordered, de-duplicated fix list.

use std::collections::HashSet;

use crate::domain::models::{DedupKey, ProvidedFixes, QuickFix};

/// Accumulates fixes in evaluation order.
///
/// Fixes with the same type and primary payload (command string, URI or port)
/// collapse to the first one seen.
#[derive(Debug, Default)]
pub struct ActionAggregator {
    seen: HashSet<DedupKey>,
    fixes: Vec<QuickFix>,
    duplicates: usize,
}

impl ActionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the fixes produced for selector `source`.
    pub fn push(&mut self, source: &str, provided: ProvidedFixes) {
        for mut fix in provided.into_vec() {
            fix.set_source_if_unset(source);
            if self.seen.insert(fix.dedup_key()) {
                self.fixes.push(fix);
            } else {
                self.duplicates += 1;
                tracing::debug!(source, fix = %fix.label(), "Dropping duplicate quick fix");
            }
        }
    }

    /// Number of fixes dropped as duplicates so far.
    pub const fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    pub fn finish(self) -> Vec<QuickFix> {
        self.fixes
    }
}

/// Aggregate `(selector id, fixes)` pairs in the given order.
pub fn aggregate<I, S>(results: I) -> Vec<QuickFix>
where
    I: IntoIterator<Item = (S, ProvidedFixes)>,
    S: AsRef<str>,
{
    let mut aggregator = ActionAggregator::new();
    for (source, provided) in results {
        aggregator.push(source.as_ref(), provided);
    }
    aggregator.finish()
}
