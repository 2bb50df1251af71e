//! The canonical genetic code.
//!
//! This module provides:
//! - Amino acid labels (three-letter names, one-letter codes, STOP)
//! - The fixed 64-codon translation table
//! - Start/stop codon constants and reverse lookup for tRNA pools

use std::fmt;
use std::sync::OnceLock;

use crate::model::{Base, Codon, Sequence};

/// AUG, read as methionine and used to open every reading frame.
pub const START_CODON: Codon = Codon::new([Base::A, Base::U, Base::G]);

/// UAA, UAG and UGA.
pub const STOP_CODONS: [Codon; 3] = [
    Codon::new([Base::U, Base::A, Base::A]),
    Codon::new([Base::U, Base::A, Base::G]),
    Codon::new([Base::U, Base::G, Base::A]),
];

/// Label a codon translates to: one of the 20 residues, or STOP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AminoAcid {
    Ala,
    Arg,
    Asn,
    Asp,
    Cys,
    Gln,
    Glu,
    Gly,
    His,
    Ile,
    Leu,
    Lys,
    Met,
    Phe,
    Pro,
    Ser,
    Thr,
    Trp,
    Tyr,
    Val,
    Stop,
}

impl AminoAcid {
    /// The 20 residues that can join a protein chain.
    pub const RESIDUES: [AminoAcid; 20] = [
        AminoAcid::Ala,
        AminoAcid::Arg,
        AminoAcid::Asn,
        AminoAcid::Asp,
        AminoAcid::Cys,
        AminoAcid::Gln,
        AminoAcid::Glu,
        AminoAcid::Gly,
        AminoAcid::His,
        AminoAcid::Ile,
        AminoAcid::Leu,
        AminoAcid::Lys,
        AminoAcid::Met,
        AminoAcid::Phe,
        AminoAcid::Pro,
        AminoAcid::Ser,
        AminoAcid::Thr,
        AminoAcid::Trp,
        AminoAcid::Tyr,
        AminoAcid::Val,
    ];

    /// Parses an NCBI one-letter code (`*` is STOP).
    pub fn from_letter(c: char) -> Option<Self> {
        let aa = match c.to_ascii_uppercase() {
            'A' => AminoAcid::Ala,
            'R' => AminoAcid::Arg,
            'N' => AminoAcid::Asn,
            'D' => AminoAcid::Asp,
            'C' => AminoAcid::Cys,
            'Q' => AminoAcid::Gln,
            'E' => AminoAcid::Glu,
            'G' => AminoAcid::Gly,
            'H' => AminoAcid::His,
            'I' => AminoAcid::Ile,
            'L' => AminoAcid::Leu,
            'K' => AminoAcid::Lys,
            'M' => AminoAcid::Met,
            'F' => AminoAcid::Phe,
            'P' => AminoAcid::Pro,
            'S' => AminoAcid::Ser,
            'T' => AminoAcid::Thr,
            'W' => AminoAcid::Trp,
            'Y' => AminoAcid::Tyr,
            'V' => AminoAcid::Val,
            '*' => AminoAcid::Stop,
            _ => return None,
        };
        Some(aa)
    }

    pub fn letter(self) -> char {
        match self {
            AminoAcid::Ala => 'A',
            AminoAcid::Arg => 'R',
            AminoAcid::Asn => 'N',
            AminoAcid::Asp => 'D',
            AminoAcid::Cys => 'C',
            AminoAcid::Gln => 'Q',
            AminoAcid::Glu => 'E',
            AminoAcid::Gly => 'G',
            AminoAcid::His => 'H',
            AminoAcid::Ile => 'I',
            AminoAcid::Leu => 'L',
            AminoAcid::Lys => 'K',
            AminoAcid::Met => 'M',
            AminoAcid::Phe => 'F',
            AminoAcid::Pro => 'P',
            AminoAcid::Ser => 'S',
            AminoAcid::Thr => 'T',
            AminoAcid::Trp => 'W',
            AminoAcid::Tyr => 'Y',
            AminoAcid::Val => 'V',
            AminoAcid::Stop => '*',
        }
    }

    /// Three-letter name, or `STOP`.
    pub fn short_name(self) -> &'static str {
        match self {
            AminoAcid::Ala => "Ala",
            AminoAcid::Arg => "Arg",
            AminoAcid::Asn => "Asn",
            AminoAcid::Asp => "Asp",
            AminoAcid::Cys => "Cys",
            AminoAcid::Gln => "Gln",
            AminoAcid::Glu => "Glu",
            AminoAcid::Gly => "Gly",
            AminoAcid::His => "His",
            AminoAcid::Ile => "Ile",
            AminoAcid::Leu => "Leu",
            AminoAcid::Lys => "Lys",
            AminoAcid::Met => "Met",
            AminoAcid::Phe => "Phe",
            AminoAcid::Pro => "Pro",
            AminoAcid::Ser => "Ser",
            AminoAcid::Thr => "Thr",
            AminoAcid::Trp => "Trp",
            AminoAcid::Tyr => "Tyr",
            AminoAcid::Val => "Val",
            AminoAcid::Stop => "STOP",
        }
    }

    pub fn is_stop(self) -> bool {
        self == AminoAcid::Stop
    }
}

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Table order of the NCBI strings: U, C, A, G for each codon position.
const TABLE_ORDER: [Base; 4] = [Base::U, Base::C, Base::A, Base::G];

/// Position of a codon in the 64-entry table (T is read as U).
fn table_index(codon: Codon) -> usize {
    codon.bases().iter().fold(0, |acc, &b| {
        let rank = match b {
            Base::U | Base::T => 0,
            Base::C => 1,
            Base::A => 2,
            Base::G => 3,
        };
        acc * 4 + rank
    })
}

/// A genetic code table for translating codons to amino acids.
#[derive(Debug, Clone)]
pub struct GeneticCode {
    /// Name of the genetic code
    pub name: &'static str,
    /// Amino acid for each codon, in NCBI order
    codon_table: [AminoAcid; 64],
}

impl GeneticCode {
    /// Creates a genetic code from an NCBI `ncbieaa` string.
    ///
    /// NCBI order: UUU, UUC, UUA, UUG, UCU, UCC, ... (Base1, Base2, Base3)
    fn new(name: &'static str, ncbieaa: &str) -> Self {
        let mut codon_table = [AminoAcid::Stop; 64];
        for (slot, letter) in codon_table.iter_mut().zip(ncbieaa.chars()) {
            *slot = AminoAcid::from_letter(letter).unwrap_or(AminoAcid::Stop);
        }
        Self { name, codon_table }
    }

    /// The standard code, shared for the whole process.
    pub fn standard() -> &'static GeneticCode {
        static STANDARD: OnceLock<GeneticCode> = OnceLock::new();
        STANDARD.get_or_init(|| {
            GeneticCode::new(
                "Standard",
                "FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG",
            )
        })
    }

    /// Translates a single codon. DNA codons are read as their RNA form.
    pub fn translate(&self, codon: Codon) -> AminoAcid {
        self.codon_table[table_index(codon)]
    }

    pub fn is_stop(&self, codon: Codon) -> bool {
        self.translate(codon).is_stop()
    }

    /// Translates every complete codon of a sequence, STOP included.
    pub fn translate_sequence(&self, sequence: &Sequence) -> Vec<AminoAcid> {
        sequence.codons().map(|c| self.translate(c)).collect()
    }

    /// All RNA codons that translate to `aa`.
    pub fn codons_for(&self, aa: AminoAcid) -> Vec<Codon> {
        all_codons().filter(|c| self.translate(*c) == aa).collect()
    }
}

/// The 64 RNA codons in table order.
pub fn all_codons() -> impl Iterator<Item = Codon> {
    TABLE_ORDER.into_iter().flat_map(|b1| {
        TABLE_ORDER.into_iter().flat_map(move |b2| {
            TABLE_ORDER
                .into_iter()
                .map(move |b3| Codon::new([b1, b2, b3]))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Alphabet;

    fn codon(s: &str) -> Codon {
        Codon::parse(s).unwrap()
    }

    #[test]
    fn test_standard_code_translation() {
        let standard = GeneticCode::standard();

        assert_eq!(standard.translate(codon("AUG")), AminoAcid::Met);
        assert_eq!(standard.translate(codon("UAA")), AminoAcid::Stop);
        assert_eq!(standard.translate(codon("UAG")), AminoAcid::Stop);
        assert_eq!(standard.translate(codon("UGA")), AminoAcid::Stop);
        assert_eq!(standard.translate(codon("UUU")), AminoAcid::Phe);
        assert_eq!(standard.translate(codon("GGG")), AminoAcid::Gly);
        assert_eq!(standard.translate(codon("UGG")), AminoAcid::Trp);
        assert_eq!(standard.translate(codon("AGA")), AminoAcid::Arg);
    }

    #[test]
    fn test_dna_codons_read_as_rna() {
        let standard = GeneticCode::standard();
        assert_eq!(standard.translate(codon("ATG")), AminoAcid::Met);
        assert_eq!(standard.translate(codon("TTT")), AminoAcid::Phe);
    }

    #[test]
    fn test_table_is_total() {
        let standard = GeneticCode::standard();
        let codons: Vec<Codon> = all_codons().collect();
        assert_eq!(codons.len(), 64);

        let stops: Vec<Codon> = codons.iter().copied().filter(|c| standard.is_stop(*c)).collect();
        assert_eq!(stops.len(), 3);
        for stop in STOP_CODONS {
            assert!(stops.contains(&stop));
        }
        for aa in AminoAcid::RESIDUES {
            assert!(!standard.codons_for(aa).is_empty(), "{} has no codon", aa);
        }
        assert_eq!(standard.translate(START_CODON), AminoAcid::Met);
    }

    #[test]
    fn test_codons_for() {
        let standard = GeneticCode::standard();
        assert_eq!(standard.codons_for(AminoAcid::Met), vec![codon("AUG")]);
        assert_eq!(standard.codons_for(AminoAcid::Leu).len(), 6);
        assert_eq!(standard.codons_for(AminoAcid::Stop).len(), 3);
    }

    #[test]
    fn test_sequence_translation() {
        let standard = GeneticCode::standard();
        let mrna = Sequence::parse(Alphabet::Rna, "AUGUUUUAGC").unwrap();
        assert_eq!(
            standard.translate_sequence(&mrna),
            vec![AminoAcid::Met, AminoAcid::Phe, AminoAcid::Stop]
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(AminoAcid::Met.to_string(), "Met");
        assert_eq!(AminoAcid::Stop.to_string(), "STOP");
        assert_eq!(AminoAcid::from_letter('w'), Some(AminoAcid::Trp));
        assert_eq!(AminoAcid::from_letter('*'), Some(AminoAcid::Stop));
        assert_eq!(AminoAcid::from_letter('X'), None);
        for aa in AminoAcid::RESIDUES {
            assert_eq!(AminoAcid::from_letter(aa.letter()), Some(aa));
            assert!(!aa.is_stop());
        }
    }
}
