use dashmap::DashMap;
use omnipack_core::PackageOutcome;

// One entry per package identifier for the lifetime of a batch run.
// Workers for different targets write concurrently; a repeated put for
// the same identifier replaces the previous entry.
#[derive(Debug, Default)]
pub struct BatchResults {
    entries: DashMap<String, PackageOutcome>,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, outcome: PackageOutcome) {
        self.entries.insert(outcome.identifier.clone(), outcome);
    }

    pub fn get(&self, identifier: &str) -> Option<PackageOutcome> {
        self.entries
            .get(identifier)
            .map(|entry| entry.value().clone())
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        self.entries.iter().any(|entry| !entry.value().success())
    }

    // Snapshot sorted by identifier so rendering and JSON output are
    // deterministic regardless of worker completion order.
    pub fn outcomes(&self) -> Vec<PackageOutcome> {
        let mut outcomes = self
            .entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect::<Vec<_>>();
        outcomes.sort_by(|left, right| left.identifier.cmp(&right.identifier));
        outcomes
    }

    pub fn failures(&self) -> Vec<PackageOutcome> {
        self.outcomes()
            .into_iter()
            .filter(|outcome| !outcome.success())
            .collect()
    }
}
