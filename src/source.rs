//! Sequence backends.
//!
//! Games ask a [`SequenceSource`] for their template at every (re)start. The
//! local random generator is the default; a remote generator can be plugged in
//! front of it with [`Fallback`], which switches to the local one whenever the
//! remote side is unavailable.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::warn;

use crate::model::{generate, Alphabet, GenerationConstraints, Sequence, SequenceError};

/// What a game needs from a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRequest {
    pub length: usize,
    pub alphabet: Alphabet,
    pub constraints: GenerationConstraints,
}

/// Errors returned by sequence backends.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The request itself is malformed.
    #[error("invalid sequence request: {0}")]
    Generation(#[from] SequenceError),

    /// The backend could not be reached or answered nonsense.
    #[error("sequence backend unavailable: {0}")]
    Unavailable(String),

    #[error("expected a {expected} sequence, backend provided {found}")]
    AlphabetMismatch { expected: Alphabet, found: Alphabet },

    /// A round cannot be played on a sequence without bases.
    #[error("backend provided an empty sequence")]
    Empty,
}

/// A provider of template sequences.
pub trait SequenceSource {
    fn fetch(&mut self, request: &SequenceRequest) -> Result<Sequence, SourceError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

impl<S: SequenceSource + ?Sized> SequenceSource for Box<S> {
    fn fetch(&mut self, request: &SequenceRequest) -> Result<Sequence, SourceError> {
        (**self).fetch(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Local uniform random generation.
#[derive(Debug, Clone)]
pub struct RandomSource<R> {
    rng: R,
}

impl<R: Rng> RandomSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomSource<StdRng> {
    /// Reproducible sequences for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> SequenceSource for RandomSource<R> {
    fn fetch(&mut self, request: &SequenceRequest) -> Result<Sequence, SourceError> {
        Ok(generate(
            request.length,
            request.alphabet,
            &request.constraints,
            &mut self.rng,
        )?)
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Hands out predefined sequences in turn, cycling when exhausted.
///
/// The request length and constraints are not applied; the alphabet must match
/// and the sequence must not be empty. A sequence that breaks the requested
/// constraints is still handed out, with a warning.
#[derive(Debug, Clone)]
pub struct FixedSource {
    sequences: Vec<Sequence>,
    next: usize,
}

impl FixedSource {
    pub fn new(sequence: Sequence) -> Self {
        Self::cycle(vec![sequence])
    }

    pub fn cycle(sequences: Vec<Sequence>) -> Self {
        Self { sequences, next: 0 }
    }
}

impl SequenceSource for FixedSource {
    fn fetch(&mut self, request: &SequenceRequest) -> Result<Sequence, SourceError> {
        if self.sequences.is_empty() {
            return Err(SourceError::Unavailable("no fixed sequence configured".into()));
        }
        let sequence = self.sequences[self.next % self.sequences.len()].clone();
        if sequence.alphabet() != request.alphabet {
            return Err(SourceError::AlphabetMismatch {
                expected: request.alphabet,
                found: sequence.alphabet(),
            });
        }
        if sequence.is_empty() {
            return Err(SourceError::Empty);
        }
        if !request.constraints.is_satisfied_by(&sequence) {
            warn!(
                %sequence,
                start_codon = request.constraints.start_codon,
                stop_codon = request.constraints.stop_codon,
                "fixed sequence does not honor the requested codon constraints"
            );
        }
        self.next += 1;
        Ok(sequence)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Tries `primary` and falls back to `fallback` when it is unavailable.
///
/// Malformed requests are not retried: the fallback would reject them too.
#[derive(Debug, Clone)]
pub struct Fallback<P, F> {
    primary: P,
    fallback: F,
}

impl<P: SequenceSource, F: SequenceSource> Fallback<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: SequenceSource, F: SequenceSource> SequenceSource for Fallback<P, F> {
    fn fetch(&mut self, request: &SequenceRequest) -> Result<Sequence, SourceError> {
        match self.primary.fetch(request) {
            Err(SourceError::Unavailable(reason)) => {
                warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    %reason,
                    "sequence backend unavailable, using fallback"
                );
                self.fallback.fetch(request)
            }
            other => other,
        }
    }

    fn name(&self) -> &str {
        self.primary.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetic_code::START_CODON;
    use crate::model::transcribe;

    struct Offline;

    impl SequenceSource for Offline {
        fn fetch(&mut self, _request: &SequenceRequest) -> Result<Sequence, SourceError> {
            Err(SourceError::Unavailable("connection refused".into()))
        }

        fn name(&self) -> &str {
            "offline"
        }
    }

    fn request(length: usize) -> SequenceRequest {
        SequenceRequest {
            length,
            alphabet: Alphabet::Dna,
            constraints: GenerationConstraints::template(true, true),
        }
    }

    #[test]
    fn test_random_source_honors_request() {
        let mut source = RandomSource::seeded(5);
        let seq = source.fetch(&request(12)).unwrap();
        assert_eq!(seq.len(), 12);
        assert_eq!(transcribe(&seq).codon(0), Some(START_CODON));
    }

    #[test]
    fn test_random_source_reports_configuration_errors() {
        let mut source = RandomSource::seeded(5);
        assert_eq!(
            source.fetch(&request(10)),
            Err(SourceError::Generation(SequenceError::LengthNotCodonAligned {
                length: 10
            }))
        );
    }

    #[test]
    fn test_fallback_when_unavailable() {
        let mut source = Fallback::new(Offline, RandomSource::seeded(1));
        let seq = source.fetch(&request(9)).unwrap();
        assert_eq!(seq.len(), 9);
    }

    #[test]
    fn test_fallback_does_not_hide_configuration_errors() {
        let mut source = Fallback::new(RandomSource::seeded(1), RandomSource::seeded(2));
        assert!(matches!(
            source.fetch(&request(7)),
            Err(SourceError::Generation(_))
        ));
    }

    #[test]
    fn test_fixed_source_cycles() {
        let a = Sequence::parse(Alphabet::Dna, "TACAAA").unwrap();
        let b = Sequence::parse(Alphabet::Dna, "TACGGG").unwrap();
        let mut source = FixedSource::cycle(vec![a.clone(), b.clone()]);
        assert_eq!(source.fetch(&request(6)).unwrap(), a);
        assert_eq!(source.fetch(&request(6)).unwrap(), b);
        assert_eq!(source.fetch(&request(6)).unwrap(), a);

        let rna_request = SequenceRequest {
            alphabet: Alphabet::Rna,
            ..request(6)
        };
        assert!(matches!(
            source.fetch(&rna_request),
            Err(SourceError::AlphabetMismatch { .. })
        ));
    }

    #[test]
    fn test_fixed_source_rejects_empty_sequence() {
        let mut source = FixedSource::new(Sequence::parse(Alphabet::Dna, "").unwrap());
        assert_eq!(source.fetch(&request(6)), Err(SourceError::Empty));
    }

    #[test]
    fn test_fixed_source_serves_unconstrained_template() {
        // Served as is; the mismatch is only logged
        let seq = Sequence::parse(Alphabet::Dna, "GGGAAA").unwrap();
        assert!(!request(6).constraints.is_satisfied_by(&seq));
        let mut source = FixedSource::new(seq.clone());
        assert_eq!(source.fetch(&request(6)), Ok(seq));
    }
}
