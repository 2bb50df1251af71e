//! Ribosome site model.
//!
//! The ribosome reads the mRNA one codon at a time through three sites:
//! - A (aminoacyl): receives the incoming tRNA
//! - P (peptidyl): holds the tRNA whose residue was just added to the chain
//! - E (exit): holds the previous tRNA until the next shift discards it
//!
//! A delivery locks the A-site until the ribosome has either stopped (STOP
//! tRNA) or shifted. The delays between those steps are owned by the caller.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::genetic_code::{AminoAcid, GeneticCode};
use crate::model::{Codon, Sequence};
use crate::validation::{check_anticodon, Policy, Verdict};

/// A transfer RNA: an anticodon carrying one amino acid label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Trna {
    pub amino_acid: AminoAcid,
    pub anticodon: Codon,
}

impl Trna {
    /// The tRNA that reads `codon` under `code`.
    pub fn for_codon(codon: Codon, code: &GeneticCode) -> Self {
        Self {
            amino_acid: code.translate(codon),
            anticodon: codon.anticodon(),
        }
    }
}

impl fmt::Display for Trna {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.amino_acid, self.anticodon)
    }
}

/// The three ribosome sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    E,
    P,
    A,
}

impl Site {
    pub const ALL: [Site; 3] = [Site::E, Site::P, Site::A];

    pub fn label(self) -> &'static str {
        match self {
            Site::E => "E",
            Site::P => "P",
            Site::A => "A",
        }
    }
}

/// Result of delivering a tRNA to the A-site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferOutcome {
    Accepted { verdict: Verdict },
    /// Anticodon does not pair with the codon under the A-site.
    Rejected {
        codon: Codon,
        expected: Codon,
        verdict: Verdict,
    },
    /// The A-site still holds the previous delivery.
    Occupied,
    /// Translation is over.
    Finished,
}

/// Result of the settle step that follows a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// A STOP tRNA sits in the A-site; translation ends here.
    Stop,
    /// A residue sits in the A-site; a shift must follow.
    ShiftPending,
    /// Nothing in the A-site.
    Empty,
}

/// Result of a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftOutcome {
    Advanced { next_codon: Codon },
    /// The reading position moved past the last codon.
    Exhausted,
    Empty,
}

/// The E/P/A window over an mRNA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ribosome {
    codons: Vec<Codon>,
    reading: usize,
    e: Option<Trna>,
    p: Option<Trna>,
    a: Option<Trna>,
    chain: Vec<AminoAcid>,
    finished: bool,
}

impl Ribosome {
    pub fn new(mrna: &Sequence) -> Self {
        let codons: Vec<Codon> = mrna.codons().collect();
        let finished = codons.is_empty();
        Self {
            codons,
            reading: 0,
            e: None,
            p: None,
            a: None,
            chain: Vec::new(),
            finished,
        }
    }

    pub fn codons(&self) -> &[Codon] {
        &self.codons
    }

    /// Index of the codon under the A-site.
    pub fn reading_position(&self) -> usize {
        self.reading
    }

    pub fn current_codon(&self) -> Option<Codon> {
        if self.finished {
            return None;
        }
        self.codons.get(self.reading).copied()
    }

    pub fn site(&self, site: Site) -> Option<&Trna> {
        match site {
            Site::E => self.e.as_ref(),
            Site::P => self.p.as_ref(),
            Site::A => self.a.as_ref(),
        }
    }

    pub fn chain(&self) -> &[AminoAcid] {
        &self.chain
    }

    /// The protein chain with `bond` between consecutive residues.
    pub fn chain_display(&self, bond: &str) -> String {
        self.chain
            .iter()
            .map(|aa| aa.short_name())
            .collect::<Vec<_>>()
            .join(bond)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Delivers a tRNA to the A-site.
    pub fn offer_to_a_site(&mut self, occupant: Trna, policy: &Policy) -> OfferOutcome {
        if self.finished {
            return OfferOutcome::Finished;
        }
        if self.a.is_some() {
            return OfferOutcome::Occupied;
        }
        let Some(codon) = self.current_codon() else {
            return OfferOutcome::Finished;
        };

        let verdict = check_anticodon(policy, codon, occupant.anticodon);
        if !verdict.ok {
            return OfferOutcome::Rejected {
                codon,
                expected: codon.anticodon(),
                verdict,
            };
        }
        self.a = Some(occupant);
        OfferOutcome::Accepted { verdict }
    }

    /// Inspects the A-site after a delivery; a STOP ends translation.
    pub fn settle(&mut self) -> SettleOutcome {
        match &self.a {
            None => SettleOutcome::Empty,
            Some(trna) if trna.amino_acid.is_stop() => {
                self.finished = true;
                SettleOutcome::Stop
            }
            Some(_) => SettleOutcome::ShiftPending,
        }
    }

    /// Discards E, moves P to E and A to P, adds the new P residue to the
    /// chain and reads the next codon.
    pub fn shift(&mut self) -> ShiftOutcome {
        if self.finished {
            return ShiftOutcome::Empty;
        }
        let Some(incoming) = self.a.take() else {
            return ShiftOutcome::Empty;
        };
        self.e = self.p.take();
        self.chain.push(incoming.amino_acid);
        self.p = Some(incoming);
        self.reading += 1;

        match self.codons.get(self.reading) {
            Some(&next_codon) => ShiftOutcome::Advanced { next_codon },
            None => {
                self.finished = true;
                ShiftOutcome::Exhausted
            }
        }
    }
}

/// Builds the tRNA pool for an mRNA: one matching tRNA per codon plus
/// `distractors` random residues, shuffled.
pub fn trna_pool<R: Rng + ?Sized>(
    mrna: &Sequence,
    code: &GeneticCode,
    distractors: usize,
    rng: &mut R,
) -> Vec<Trna> {
    let mut pool: Vec<Trna> = mrna.codons().map(|c| Trna::for_codon(c, code)).collect();

    for _ in 0..distractors {
        let amino_acid = AminoAcid::RESIDUES[rng.random_range(0..AminoAcid::RESIDUES.len())];
        let codons = code.codons_for(amino_acid);
        if codons.is_empty() {
            continue;
        }
        let codon = codons[rng.random_range(0..codons.len())];
        pool.push(Trna {
            amino_acid,
            anticodon: codon.anticodon(),
        });
    }

    pool.shuffle(rng);
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Alphabet;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn mrna(s: &str) -> Sequence {
        Sequence::parse(Alphabet::Rna, s).unwrap()
    }

    fn trna(codon: &str) -> Trna {
        Trna::for_codon(Codon::parse(codon).unwrap(), GeneticCode::standard())
    }

    #[test]
    fn test_trna_for_codon() {
        let met = trna("AUG");
        assert_eq!(met.amino_acid, AminoAcid::Met);
        assert_eq!(met.anticodon.to_string(), "UAC");
        assert_eq!(met.to_string(), "Met (UAC)");
    }

    #[test]
    fn test_occupied_until_shift() {
        let mut ribosome = Ribosome::new(&mrna("AUGUUU"));
        let policy = Policy::ANTICODON;

        assert!(matches!(
            ribosome.offer_to_a_site(trna("AUG"), &policy),
            OfferOutcome::Accepted { .. }
        ));
        // Second delivery before the shift, even a correct one
        assert_eq!(
            ribosome.offer_to_a_site(trna("AUG"), &policy),
            OfferOutcome::Occupied
        );
        assert_eq!(ribosome.settle(), SettleOutcome::ShiftPending);
        assert_eq!(
            ribosome.offer_to_a_site(trna("UUU"), &policy),
            OfferOutcome::Occupied
        );

        assert_eq!(
            ribosome.shift(),
            ShiftOutcome::Advanced {
                next_codon: Codon::parse("UUU").unwrap()
            }
        );
        assert!(ribosome.site(Site::A).is_none());
        assert_eq!(ribosome.site(Site::P), Some(&trna("AUG")));
        assert_eq!(ribosome.chain(), &[AminoAcid::Met]);
    }

    #[test]
    fn test_full_translation_moves_sites() {
        let mut ribosome = Ribosome::new(&mrna("AUGUUUGGG"));
        let policy = Policy::ANTICODON;

        for codon in ["AUG", "UUU"] {
            ribosome.offer_to_a_site(trna(codon), &policy);
            ribosome.settle();
            ribosome.shift();
        }
        assert_eq!(ribosome.site(Site::E), Some(&trna("AUG")));
        assert_eq!(ribosome.site(Site::P), Some(&trna("UUU")));

        ribosome.offer_to_a_site(trna("GGG"), &policy);
        ribosome.settle();
        assert_eq!(ribosome.shift(), ShiftOutcome::Exhausted);
        assert!(ribosome.is_finished());
        assert_eq!(ribosome.site(Site::E), Some(&trna("UUU")));
        assert_eq!(ribosome.chain_display("-"), "Met-Phe-Gly");
        assert_eq!(
            ribosome.offer_to_a_site(trna("GGG"), &policy),
            OfferOutcome::Finished
        );
    }

    #[test]
    fn test_wrong_anticodon() {
        let mut ribosome = Ribosome::new(&mrna("AUG"));
        let outcome = ribosome.offer_to_a_site(trna("UUU"), &Policy::ANTICODON);
        assert_eq!(
            outcome,
            OfferOutcome::Rejected {
                codon: Codon::parse("AUG").unwrap(),
                expected: Codon::parse("UAC").unwrap(),
                verdict: Verdict {
                    ok: false,
                    score_delta: -10
                },
            }
        );
        assert!(ribosome.site(Site::A).is_none());
    }

    #[test]
    fn test_stop_never_joins_chain() {
        let mut ribosome = Ribosome::new(&mrna("AUGUAA"));
        let policy = Policy::ANTICODON;
        ribosome.offer_to_a_site(trna("AUG"), &policy);
        ribosome.settle();
        ribosome.shift();

        assert!(matches!(
            ribosome.offer_to_a_site(trna("UAA"), &policy),
            OfferOutcome::Accepted { .. }
        ));
        assert_eq!(ribosome.settle(), SettleOutcome::Stop);
        assert!(ribosome.is_finished());
        assert_eq!(ribosome.shift(), ShiftOutcome::Empty);
        assert_eq!(ribosome.chain(), &[AminoAcid::Met]);
    }

    #[test]
    fn test_empty_mrna_is_finished() {
        let ribosome = Ribosome::new(&mrna("AU"));
        assert!(ribosome.is_finished());
        assert_eq!(ribosome.current_codon(), None);
    }

    #[test]
    fn test_pool_contains_every_needed_trna() {
        let mut rng = StdRng::seed_from_u64(11);
        let rna = mrna("AUGUUUUAA");
        let pool = trna_pool(&rna, GeneticCode::standard(), 15, &mut rng);
        assert_eq!(pool.len(), 18);
        for codon in rna.codons() {
            assert!(pool.iter().any(|t| t.anticodon == codon.anticodon()));
        }
        // Distractors are always real residues
        assert_eq!(pool.iter().filter(|t| t.amino_acid.is_stop()).count(), 1);
    }
}
