//! Cross-file leak deduplication.
//!
//! Sanitizer runs repeat identical leak dumps for long-lived allocations at
//! many observation points, so the same leak shows up in file after file.
//! The ledger remembers every leak identity seen during a run, across all
//! files, and classifies each new observation as the first of its kind, an
//! exact repeat, or a change in size.

use crate::scan::{LeakKind, LeakReport};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Deduplication key: classification plus the call stack exactly as it
/// appeared in the log. Any difference in the stack text, even whitespace,
/// is a different identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LeakIdentity {
    pub kind: LeakKind,
    pub stack: String,
}

impl LeakIdentity {
    pub fn of(report: &LeakReport) -> Self {
        Self {
            kind: report.kind,
            stack: report.stack.clone(),
        }
    }
}

/// Last recorded counts for a leak identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeakTotals {
    pub bytes: u64,
    pub objects: u64,
}

/// How an observed leak relates to the run's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeakVerdict {
    /// First time this identity was seen.
    New,
    /// Same identity with identical counts; nothing to report.
    Repeat,
    /// Same identity with different counts. Deltas are new minus old and
    /// may be negative for a shrinking leak; the ledger keeps the latest
    /// counts either way.
    Grown {
        byte_delta: i64,
        object_delta: i64,
    },
}

/// Run-scoped map from leak identity to its last recorded counts.
///
/// Entries are never removed; counts always track the most recent
/// observation.
pub struct LeakLedger {
    seen: HashMap<LeakIdentity, LeakTotals>,
}

impl LeakLedger {
    pub fn new() -> Self {
        Self {
            seen: HashMap::new(),
        }
    }

    /// Record one leak report and classify it against the run's history.
    pub fn observe(&mut self, report: &LeakReport) -> LeakVerdict {
        let totals = LeakTotals {
            bytes: report.bytes,
            objects: report.objects,
        };

        match self.seen.entry(LeakIdentity::of(report)) {
            Entry::Vacant(slot) => {
                slot.insert(totals);
                LeakVerdict::New
            }
            Entry::Occupied(mut slot) => {
                let known = slot.get_mut();
                if *known == totals {
                    LeakVerdict::Repeat
                } else {
                    let verdict = LeakVerdict::Grown {
                        byte_delta: totals.bytes as i64 - known.bytes as i64,
                        object_delta: totals.objects as i64 - known.objects as i64,
                    };
                    *known = totals;
                    verdict
                }
            }
        }
    }

    /// Last recorded counts for an identity, if it has been seen.
    pub fn lookup(&self, identity: &LeakIdentity) -> Option<LeakTotals> {
        self.seen.get(identity).copied()
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leak(kind: LeakKind, bytes: u64, objects: u64, stack: &str) -> LeakReport {
        LeakReport {
            kind,
            bytes,
            objects,
            stack: stack.to_string(),
        }
    }

    #[test]
    fn first_observation_is_new() {
        let mut ledger = LeakLedger::new();

        let verdict = ledger.observe(&leak(LeakKind::Direct, 10, 1, "    #0 f\n"));

        assert_eq!(verdict, LeakVerdict::New);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn identical_counts_are_a_repeat() {
        let mut ledger = LeakLedger::new();
        let report = leak(LeakKind::Direct, 10, 1, "    #0 f\n");

        ledger.observe(&report);

        assert_eq!(ledger.observe(&report), LeakVerdict::Repeat);
        assert_eq!(ledger.observe(&report), LeakVerdict::Repeat);
    }

    #[test]
    fn larger_counts_report_deltas_and_update() {
        let mut ledger = LeakLedger::new();

        ledger.observe(&leak(LeakKind::Direct, 10, 1, "    #0 f\n"));
        let verdict = ledger.observe(&leak(LeakKind::Direct, 30, 4, "    #0 f\n"));

        assert_eq!(
            verdict,
            LeakVerdict::Grown {
                byte_delta: 20,
                object_delta: 3
            }
        );
        let identity = LeakIdentity {
            kind: LeakKind::Direct,
            stack: "    #0 f\n".to_string(),
        };
        assert_eq!(
            ledger.lookup(&identity),
            Some(LeakTotals {
                bytes: 30,
                objects: 4
            })
        );
    }

    #[test]
    fn shrinking_counts_yield_negative_deltas() {
        let mut ledger = LeakLedger::new();

        ledger.observe(&leak(LeakKind::Indirect, 30, 4, "    #0 f\n"));
        let verdict = ledger.observe(&leak(LeakKind::Indirect, 10, 1, "    #0 f\n"));

        assert_eq!(
            verdict,
            LeakVerdict::Grown {
                byte_delta: -20,
                object_delta: -3
            }
        );
        // The ledger keeps the latest counts, so a third identical
        // observation is a plain repeat.
        assert_eq!(
            ledger.observe(&leak(LeakKind::Indirect, 10, 1, "    #0 f\n")),
            LeakVerdict::Repeat
        );
    }

    #[test]
    fn stack_text_must_match_exactly() {
        let mut ledger = LeakLedger::new();

        ledger.observe(&leak(LeakKind::Direct, 10, 1, "    #0 f\n"));
        let verdict = ledger.observe(&leak(LeakKind::Direct, 10, 1, "   #0 f\n"));

        assert_eq!(verdict, LeakVerdict::New);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn classification_is_part_of_the_identity() {
        let mut ledger = LeakLedger::new();

        ledger.observe(&leak(LeakKind::Direct, 10, 1, "    #0 f\n"));
        let verdict = ledger.observe(&leak(LeakKind::Indirect, 10, 1, "    #0 f\n"));

        assert_eq!(verdict, LeakVerdict::New);
    }
}
