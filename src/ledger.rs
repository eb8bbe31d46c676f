use crate::model::{ExistingSubstitution, CANCELLED_SUBJECT};
use std::collections::{HashMap, HashSet};

/// Which substitute is already committed to which period on the plan's date.
///
/// One ledger belongs to exactly one plan-generation call: it is seeded from
/// the persisted substitutions of the target date, grows while lessons are
/// assigned, and is dropped with the call.
#[derive(Debug, Clone, Default)]
pub struct ConflictLedger {
    taken: HashMap<i64, HashSet<String>>,
}

impl ConflictLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(existing: &[ExistingSubstitution]) -> Self {
        let mut ledger = Self::new();
        ledger.seed(existing);
        ledger
    }

    /// Blank substitutes and persisted "Entfall" markers are cancellations,
    /// not commitments.
    pub fn seed(&mut self, existing: &[ExistingSubstitution]) {
        for sub in existing {
            let name = sub.substitute_teacher.trim();
            if name.is_empty() || name.eq_ignore_ascii_case(CANCELLED_SUBJECT) {
                continue;
            }
            self.commit(sub.period, name);
        }
    }

    pub fn has_conflict(&self, period: i64, teacher_name: &str) -> bool {
        self.taken
            .get(&period)
            .is_some_and(|names| names.contains(teacher_name))
    }

    /// Idempotent: committing the same pair twice keeps a single entry.
    pub fn commit(&mut self, period: i64, teacher_name: &str) {
        let names = self.taken.entry(period).or_default();
        if !names.contains(teacher_name) {
            names.insert(teacher_name.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.taken.values().map(HashSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing(name: &str, period: i64) -> ExistingSubstitution {
        ExistingSubstitution {
            substitute_teacher: name.to_string(),
            period,
        }
    }

    #[test]
    fn seeded_pairs_conflict_only_for_their_period() {
        let ledger = ConflictLedger::seeded(&[existing("A", 2), existing("B", 4)]);
        assert!(ledger.has_conflict(2, "A"));
        assert!(!ledger.has_conflict(3, "A"));
        assert!(ledger.has_conflict(4, "B"));
        assert!(!ledger.has_conflict(2, "B"));
    }

    #[test]
    fn blank_substitutes_are_not_commitments() {
        let ledger = ConflictLedger::seeded(&[existing("  ", 1), existing("", 2)]);
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn persisted_entfall_rows_are_not_commitments() {
        let ledger = ConflictLedger::seeded(&[
            existing("Entfall", 1),
            existing(" entfall ", 2),
            existing("A", 3),
        ]);
        assert_eq!(ledger.len(), 1);
        assert!(!ledger.has_conflict(1, "Entfall"));
        assert!(ledger.has_conflict(3, "A"));
    }

    #[test]
    fn same_teacher_in_different_periods_counts_twice() {
        let mut ledger = ConflictLedger::new();
        ledger.commit(1, "A");
        ledger.commit(2, "A");
        ledger.commit(2, "B");
        assert_eq!(ledger.len(), 3);
        assert!(ledger.has_conflict(2, "A"));
        assert!(!ledger.has_conflict(3, "A"));
    }

    #[test]
    fn commit_is_idempotent() {
        let mut ledger = ConflictLedger::new();
        ledger.commit(1, "A");
        ledger.commit(1, "A");
        assert_eq!(ledger.len(), 1);
        assert!(ledger.has_conflict(1, "A"));
    }
}
