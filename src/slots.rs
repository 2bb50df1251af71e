//! Slot ledger.
//!
//! One slot per sequence position, each bound to the base it expects. Slots are
//! filled strictly left to right: only the lowest unfilled slot (the current
//! target) accepts a submission.

use crate::model::{Alphabet, Base, Sequence};
use crate::validation::{check_base, Policy, Verdict};

/// A single fillable position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub index: usize,
    pub expected: Base,
    /// The accepted base, once filled.
    pub filled: Option<Base>,
}

impl Slot {
    pub fn is_filled(&self) -> bool {
        self.filled.is_some()
    }
}

/// What happened to a fill attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// The slot now holds `value`; `complete` is set when it was the last one.
    Accepted {
        index: usize,
        value: Base,
        verdict: Verdict,
        complete: bool,
    },
    /// Wrong base for the current target; nothing changed.
    Rejected {
        index: usize,
        expected: Base,
        offered: Base,
        verdict: Verdict,
    },
    /// Not the current target (or nothing left to fill); nothing changed.
    OutOfSequence,
}

/// Ordered slots with a single current target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotLedger {
    slots: Vec<Slot>,
    /// Index of the lowest unfilled slot; equals `slots.len()` once full.
    cursor: usize,
}

impl SlotLedger {
    pub fn new(expected: impl IntoIterator<Item = Base>) -> Self {
        let slots = expected
            .into_iter()
            .enumerate()
            .map(|(index, expected)| Slot {
                index,
                expected,
                filled: None,
            })
            .collect();
        Self { slots, cursor: 0 }
    }

    /// Slots expecting the complement of each template base, in `alphabet`.
    pub fn complementing(template: &Sequence, alphabet: Alphabet) -> Self {
        Self::new(template.bases().iter().map(|b| b.complement(alphabet)))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// The lowest-index unfilled slot, if any.
    pub fn current_target(&self) -> Option<&Slot> {
        self.slots.get(self.cursor)
    }

    pub fn is_current_target(&self, index: usize) -> bool {
        index == self.cursor && index < self.slots.len()
    }

    pub fn filled_count(&self) -> usize {
        self.cursor
    }

    pub fn all_filled(&self) -> bool {
        self.cursor >= self.slots.len()
    }

    /// Bases accepted so far, in order.
    pub fn filled_bases(&self) -> Vec<Base> {
        self.slots.iter().filter_map(|s| s.filled).collect()
    }

    /// Offers `offered` for slot `index`.
    ///
    /// Only the current target is considered; the base is then checked
    /// against the slot's expected value with `policy`.
    pub fn attempt_fill(&mut self, index: usize, offered: Base, policy: &Policy) -> FillOutcome {
        if !self.is_current_target(index) {
            return FillOutcome::OutOfSequence;
        }
        let slot = &mut self.slots[index];
        let verdict = check_base(policy, slot.expected, offered);
        if !verdict.ok {
            return FillOutcome::Rejected {
                index,
                expected: slot.expected,
                offered,
                verdict,
            };
        }

        slot.filled = Some(offered);
        self.cursor += 1;
        FillOutcome::Accepted {
            index,
            value: offered,
            verdict,
            complete: self.all_filled(),
        }
    }
}
