//! Action validation.
//!
//! Every submission is checked by a pure comparison that yields a verdict and
//! the score change it earns. Nothing here mutates state or fails: a wrong
//! answer is just a verdict with `ok == false`.

use crate::model::{Base, Codon};
use crate::stage::{Enzyme, ToolSelection};

/// Result of checking one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub ok: bool,
    pub score_delta: i32,
}

/// Reward and penalty attached to one kind of check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub reward: i32,
    /// Points removed on failure (positive number).
    pub penalty: i32,
}

impl Policy {
    /// Placing a nucleotide opposite its template base.
    pub const BASE_PAIRING: Policy = Policy {
        reward: 10,
        penalty: 5,
    };
    /// Delivering a tRNA to the A-site.
    pub const ANTICODON: Policy = Policy {
        reward: 20,
        penalty: 10,
    };
    /// Deploying enzymes from the toolbox.
    pub const TOOL_SELECTION: Policy = Policy {
        reward: 0,
        penalty: 10,
    };

    pub fn verdict(&self, ok: bool) -> Verdict {
        Verdict {
            ok,
            score_delta: if ok { self.reward } else { -self.penalty },
        }
    }

    /// Accepts iff `offered == expected`.
    pub fn check<T: PartialEq + ?Sized>(&self, expected: &T, offered: &T) -> Verdict {
        self.verdict(expected == offered)
    }
}

/// The three policies used by the games.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringRules {
    pub base_pairing: Policy,
    pub anticodon: Policy,
    pub tool_selection: Policy,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            base_pairing: Policy::BASE_PAIRING,
            anticodon: Policy::ANTICODON,
            tool_selection: Policy::TOOL_SELECTION,
        }
    }
}

/// `expected` is the precomputed complement of the template base.
pub fn check_base(policy: &Policy, expected: Base, offered: Base) -> Verdict {
    policy.check(&expected, &offered)
}

/// Accepts iff the offered anticodon pairs with `codon`.
pub fn check_anticodon(policy: &Policy, codon: Codon, offered: Codon) -> Verdict {
    policy.check(&codon.anticodon(), &offered)
}

/// Accepts iff the selection is exactly `{required}`.
pub fn check_tools(policy: &Policy, required: Enzyme, selection: &ToolSelection) -> Verdict {
    policy.verdict(selection.is_exactly(required))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_pairing() {
        let policy = Policy::BASE_PAIRING;
        assert_eq!(
            check_base(&policy, Base::U, Base::U),
            Verdict {
                ok: true,
                score_delta: 10
            }
        );
        assert_eq!(
            check_base(&policy, Base::U, Base::T),
            Verdict {
                ok: false,
                score_delta: -5
            }
        );
    }

    #[test]
    fn test_anticodon() {
        let policy = Policy::ANTICODON;
        let aug = Codon::parse("AUG").unwrap();
        let verdict = check_anticodon(&policy, aug, Codon::parse("UAC").unwrap());
        assert!(verdict.ok);
        assert_eq!(verdict.score_delta, 20);

        let verdict = check_anticodon(&policy, aug, Codon::parse("AUG").unwrap());
        assert!(!verdict.ok);
        assert_eq!(verdict.score_delta, -10);
    }

    #[test]
    fn test_tools_require_a_single_enzyme() {
        let policy = Policy::TOOL_SELECTION;
        let alone: ToolSelection = [Enzyme::Helicase].into_iter().collect();
        let pair: ToolSelection = [Enzyme::Helicase, Enzyme::Primase].into_iter().collect();
        let none = ToolSelection::new();

        assert!(check_tools(&policy, Enzyme::Helicase, &alone).ok);
        assert_eq!(check_tools(&policy, Enzyme::Helicase, &pair).score_delta, -10);
        assert!(!check_tools(&policy, Enzyme::Helicase, &none).ok);
        assert!(!check_tools(&policy, Enzyme::Primase, &alone).ok);
    }
}
