//! Sequence model for the simulations.
//!
//! This module contains the value types every game is built from:
//! - Nucleotide bases and the two alphabets (DNA, RNA)
//! - Codons and their anticodons
//! - Immutable base sequences, transcription and constrained random generation
//!
//! Sequences are created when a round starts and are read-only afterwards.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use thiserror::Error;

use crate::genetic_code::{START_CODON, STOP_CODONS};

/// Nucleic acid alphabet a sequence is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alphabet {
    /// A, T, C, G
    Dna,
    /// A, U, C, G
    Rna,
}

impl Alphabet {
    /// The four bases of this alphabet, in palette order.
    pub fn bases(self) -> [Base; 4] {
        match self {
            Alphabet::Dna => [Base::A, Base::T, Base::C, Base::G],
            Alphabet::Rna => [Base::A, Base::U, Base::C, Base::G],
        }
    }

    /// Returns true if the base belongs to this alphabet.
    pub fn contains(self, base: Base) -> bool {
        match base {
            Base::T => self == Alphabet::Dna,
            Base::U => self == Alphabet::Rna,
            Base::A | Base::C | Base::G => true,
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alphabet::Dna => write!(f, "DNA"),
            Alphabet::Rna => write!(f, "RNA"),
        }
    }
}

/// A single nucleotide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Base {
    A,
    C,
    G,
    T,
    U,
}

impl Base {
    /// Parses a nucleotide letter (case-insensitive).
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Base::A),
            'C' => Some(Base::C),
            'G' => Some(Base::G),
            'T' => Some(Base::T),
            'U' => Some(Base::U),
            _ => None,
        }
    }

    /// Returns the upper-case letter for this base.
    pub fn as_char(self) -> char {
        match self {
            Base::A => 'A',
            Base::C => 'C',
            Base::G => 'G',
            Base::T => 'T',
            Base::U => 'U',
        }
    }

    /// Returns the pairing partner of this base, written in `target`.
    ///
    /// A pairs with T in DNA and with U in RNA; T and U both pair with A;
    /// C and G pair with each other.
    pub fn complement(self, target: Alphabet) -> Base {
        match (self, target) {
            (Base::A, Alphabet::Dna) => Base::T,
            (Base::A, Alphabet::Rna) => Base::U,
            (Base::T | Base::U, _) => Base::A,
            (Base::C, _) => Base::G,
            (Base::G, _) => Base::C,
        }
    }

    /// Rewrites T/U so the base belongs to `alphabet`.
    pub fn in_alphabet(self, alphabet: Alphabet) -> Base {
        match (self, alphabet) {
            (Base::U, Alphabet::Dna) => Base::T,
            (Base::T, Alphabet::Rna) => Base::U,
            (base, _) => base,
        }
    }

    /// Number of hydrogen bonds this base forms with its partner.
    pub fn hydrogen_bonds(self) -> u8 {
        match self {
            Base::A | Base::T | Base::U => 2,
            Base::C | Base::G => 3,
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Three consecutive bases read as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Codon([Base; 3]);

impl Codon {
    pub const fn new(bases: [Base; 3]) -> Self {
        Self(bases)
    }

    /// Parses a three-letter codon such as `"AUG"`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let codon = [
            Base::from_char(chars.next()?)?,
            Base::from_char(chars.next()?)?,
            Base::from_char(chars.next()?)?,
        ];
        if chars.next().is_some() {
            return None;
        }
        Some(Self(codon))
    }

    pub fn bases(self) -> [Base; 3] {
        self.0
    }

    /// The RNA anticodon carried by the transfer unit that reads this codon.
    pub fn anticodon(self) -> Codon {
        Codon(self.0.map(|b| b.complement(Alphabet::Rna)))
    }

    /// Rewrites every base into `alphabet`.
    pub fn in_alphabet(self, alphabet: Alphabet) -> Codon {
        Codon(self.0.map(|b| b.in_alphabet(alphabet)))
    }
}

impl fmt::Display for Codon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for base in self.0 {
            write!(f, "{}", base)?;
        }
        Ok(())
    }
}

/// Errors raised when a sequence cannot be built as requested.
///
/// These are configuration mistakes, not player input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("length {length} is not a multiple of 3, codon constraints cannot be applied")]
    LengthNotCodonAligned { length: usize },

    #[error("length {length} is too short for the requested codons (need at least {required})")]
    TooShort { length: usize, required: usize },

    #[error("pinned position {position} is outside a sequence of length {length}")]
    PinOutOfRange { position: usize, length: usize },

    #[error("pinned base {base} at position {position} is not a {alphabet} base")]
    PinOutsideAlphabet {
        position: usize,
        base: Base,
        alphabet: Alphabet,
    },

    #[error("position {position} is pinned to both {first} and {second}")]
    ConflictingPins {
        position: usize,
        first: Base,
        second: Base,
    },

    #[error("invalid {alphabet} symbol '{symbol}' at position {position}")]
    InvalidSymbol {
        position: usize,
        symbol: char,
        alphabet: Alphabet,
    },
}

/// An ordered, fixed-length run of bases in one alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    alphabet: Alphabet,
    bases: Vec<Base>,
}

impl Sequence {
    /// Creates a sequence, rewriting T/U into the given alphabet.
    pub fn new(alphabet: Alphabet, bases: impl IntoIterator<Item = Base>) -> Self {
        Self {
            alphabet,
            bases: bases.into_iter().map(|b| b.in_alphabet(alphabet)).collect(),
        }
    }

    /// Parses a sequence, rejecting letters outside the alphabet.
    pub fn parse(alphabet: Alphabet, s: &str) -> Result<Self, SequenceError> {
        let bases = s
            .chars()
            .enumerate()
            .map(|(position, symbol)| {
                Base::from_char(symbol)
                    .filter(|b| alphabet.contains(*b))
                    .ok_or(SequenceError::InvalidSymbol {
                        position,
                        symbol,
                        alphabet,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { alphabet, bases })
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    pub fn bases(&self) -> &[Base] {
        &self.bases
    }

    pub fn get(&self, index: usize) -> Option<Base> {
        self.bases.get(index).copied()
    }

    /// Number of complete codons; a trailing partial codon is not counted.
    pub fn codon_count(&self) -> usize {
        self.bases.len() / 3
    }

    /// Gets the codon at a codon index (not a base index).
    pub fn codon(&self, index: usize) -> Option<Codon> {
        let start = index.checked_mul(3)?;
        let chunk = self.bases.get(start..start + 3)?;
        Some(Codon([chunk[0], chunk[1], chunk[2]]))
    }

    /// Iterates over complete codons in reading order.
    pub fn codons(&self) -> impl Iterator<Item = Codon> + '_ {
        self.bases
            .chunks_exact(3)
            .map(|c| Codon([c[0], c[1], c[2]]))
    }

    /// The complementary strand in the same alphabet.
    pub fn complement(&self) -> Sequence {
        Sequence {
            alphabet: self.alphabet,
            bases: self
                .bases
                .iter()
                .map(|b| b.complement(self.alphabet))
                .collect(),
        }
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for base in &self.bases {
            write!(f, "{}", base)?;
        }
        Ok(())
    }
}

/// Position-wise RNA complement of a template strand.
pub fn transcribe(template: &Sequence) -> Sequence {
    Sequence {
        alphabet: Alphabet::Rna,
        bases: template
            .bases
            .iter()
            .map(|b| b.complement(Alphabet::Rna))
            .collect(),
    }
}

/// How pinned codons are written into a generated strand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sense {
    /// The strand itself reads the codon (ATG for a DNA start codon).
    #[default]
    Coding,
    /// The strand is the template of the codon (TAC transcribes to AUG).
    Template,
}

/// Constraints applied by [`generate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationConstraints {
    /// Force the first three bases to encode the start codon.
    pub start_codon: bool,
    /// Force the last three bases to encode a stop codon, chosen uniformly.
    pub stop_codon: bool,
    /// How the pinned codons are written.
    pub sense: Sense,
    /// Individual positions pinned to a base.
    pub pins: BTreeMap<usize, Base>,
}

impl GenerationConstraints {
    /// Template-sense constraints pinning start and/or stop codons.
    pub fn template(start_codon: bool, stop_codon: bool) -> Self {
        Self {
            start_codon,
            stop_codon,
            sense: Sense::Template,
            pins: BTreeMap::new(),
        }
    }

    fn wants_codons(&self) -> bool {
        self.start_codon || self.stop_codon
    }

    /// Reads codon `index` of `sequence` as the mRNA codon it stands for.
    fn read_codon(&self, sequence: &Sequence, index: usize) -> Option<Codon> {
        let codon = sequence.codon(index)?;
        Some(match self.sense {
            Sense::Coding => codon.in_alphabet(Alphabet::Rna),
            Sense::Template => Codon(codon.bases().map(|b| b.complement(Alphabet::Rna))),
        })
    }

    /// Whether an existing sequence already honors these constraints.
    pub fn is_satisfied_by(&self, sequence: &Sequence) -> bool {
        if self.wants_codons() && sequence.len() % 3 != 0 {
            return false;
        }
        if self.start_codon && self.read_codon(sequence, 0) != Some(START_CODON) {
            return false;
        }
        if self.stop_codon {
            let last = sequence
                .codon_count()
                .checked_sub(1)
                .and_then(|index| self.read_codon(sequence, index));
            if !last.is_some_and(|codon| STOP_CODONS.contains(&codon)) {
                return false;
            }
        }
        self.pins
            .iter()
            .all(|(&position, &base)| sequence.get(position) == Some(base))
    }
}

/// Produces a uniformly random sequence honoring the constraints.
///
/// Fails only when the constraints themselves are malformed.
pub fn generate<R: Rng + ?Sized>(
    length: usize,
    alphabet: Alphabet,
    constraints: &GenerationConstraints,
    rng: &mut R,
) -> Result<Sequence, SequenceError> {
    if constraints.wants_codons() && length % 3 != 0 {
        return Err(SequenceError::LengthNotCodonAligned { length });
    }
    let required = 3 * (usize::from(constraints.start_codon) + usize::from(constraints.stop_codon));
    if length < required {
        return Err(SequenceError::TooShort { length, required });
    }

    let mut pins = BTreeMap::new();
    for (&position, &base) in &constraints.pins {
        if position >= length {
            return Err(SequenceError::PinOutOfRange { position, length });
        }
        if !alphabet.contains(base) {
            return Err(SequenceError::PinOutsideAlphabet {
                position,
                base,
                alphabet,
            });
        }
        pins.insert(position, base);
    }

    let write_codon = |codon: Codon| -> [Base; 3] {
        match constraints.sense {
            Sense::Coding => codon.in_alphabet(alphabet).bases(),
            Sense::Template => codon.bases().map(|b| b.complement(alphabet)),
        }
    };
    let mut pinned_codons = Vec::new();
    if constraints.start_codon {
        pinned_codons.push((0, write_codon(START_CODON)));
    }
    if constraints.stop_codon {
        let stop = STOP_CODONS[rng.random_range(0..STOP_CODONS.len())];
        pinned_codons.push((length - 3, write_codon(stop)));
    }
    for (offset, bases) in pinned_codons {
        for (i, base) in bases.into_iter().enumerate() {
            let position = offset + i;
            match pins.insert(position, base) {
                Some(first) if first != base => {
                    return Err(SequenceError::ConflictingPins {
                        position,
                        first,
                        second: base,
                    });
                }
                _ => {}
            }
        }
    }

    let palette = alphabet.bases();
    let bases = (0..length)
        .map(|i| match pins.get(&i) {
            Some(&base) => base,
            None => palette[rng.random_range(0..palette.len())],
        })
        .collect();

    Ok(Sequence { alphabet, bases })
}
