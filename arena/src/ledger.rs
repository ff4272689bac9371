//! Running score totals for one tournament run.

use std::collections::HashMap;

/// Cumulative points per participant. Entries only ever grow.
///
/// Totals are `u64` so that any run of `u32` round awards fits exactly.
#[derive(Debug, Clone, Default)]
pub struct ScoreLedger {
    totals: HashMap<String, u64>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger with every participant present at zero.
    pub fn with_participants<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            totals: names.into_iter().map(|n| (n.to_string(), 0)).collect(),
        }
    }

    /// Add one round's increments.
    pub fn apply(&mut self, round_scores: &[(String, u32)]) {
        for (name, points) in round_scores {
            let total = self.totals.entry(name.clone()).or_insert(0);
            *total = total.saturating_add(u64::from(*points));
        }
    }

    pub fn total(&self, name: &str) -> u64 {
        self.totals.get(name).copied().unwrap_or(0)
    }

    /// Owned point-in-time copy.
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.totals.clone()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_accumulates_and_initialises() {
        let mut ledger = ScoreLedger::new();
        assert!(ledger.is_empty());

        ledger.apply(&[("B".to_string(), 3), ("C".to_string(), 2)]);
        ledger.apply(&[("C".to_string(), 3), ("B".to_string(), 0)]);

        assert_eq!(ledger.total("B"), 3);
        assert_eq!(ledger.total("C"), 5);
        assert_eq!(ledger.total("nobody"), 0);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut ledger = ScoreLedger::with_participants(["A", "B"]);
        let before = ledger.snapshot();
        ledger.apply(&[("A".to_string(), 2)]);
        assert_eq!(before["A"], 0);
        assert_eq!(ledger.total("A"), 2);
    }

    #[test]
    fn test_totals_never_decrease() {
        let mut ledger = ScoreLedger::with_participants(["A", "B", "C"]);
        let rounds = [
            vec![("B".to_string(), 3), ("C".to_string(), 2)],
            vec![("A".to_string(), 3), ("C".to_string(), 2)],
            vec![("A".to_string(), 0), ("B".to_string(), 2)],
        ];
        let mut previous = ledger.snapshot();
        for round in &rounds {
            ledger.apply(round);
            let current = ledger.snapshot();
            for (name, total) in &previous {
                assert!(current[name] >= *total);
            }
            previous = current;
        }
    }

    #[test]
    fn test_large_awards_are_exact() {
        let mut ledger = ScoreLedger::with_participants(["A", "B"]);
        let half = u32::MAX / 2 + 1;
        ledger.apply(&[("B".to_string(), half)]);
        ledger.apply(&[("B".to_string(), half)]);
        assert_eq!(ledger.total("B"), 1u64 << 32);
    }
}
