//! Protein synthesis puzzle.
//!
//! Transcription: the player builds the mRNA base by base against a DNA
//! template. Translation: tRNAs from a pool are delivered to the ribosome's
//! A-site until a STOP codon is read or the mRNA runs out.

use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::config::{Delays, GameConfig, SynthesisConfig};
use crate::engine::{Action, Core, GameEvent, MessageKind, Outcome, Payload, Rejection, Simulation};
use crate::genetic_code::{AminoAcid, GeneticCode};
use crate::model::{Alphabet, Base, GenerationConstraints, Sequence};
use crate::ribosome::{trna_pool, OfferOutcome, Ribosome, SettleOutcome, ShiftOutcome, Trna};
use crate::slots::{FillOutcome, SlotLedger};
use crate::source::{SequenceRequest, SequenceSource, SourceError};
use crate::stage::SynthesisStage;

/// Delayed consequences of the synthesis puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisTask {
    /// The mRNA has reached the ribosome.
    BeginTranslation,
    /// Check the freshly seated tRNA for STOP.
    Settle,
    /// Move the ribosome one codon along.
    Shift,
}

/// State of one synthesis round.
pub struct SynthesisGame {
    core: Core<SynthesisStage, SynthesisTask>,
    config: SynthesisConfig,
    delays: Delays,
    source: Box<dyn SequenceSource>,
    rng: StdRng,
    code: &'static GeneticCode,
    template: Sequence,
    transcript: SlotLedger,
    mrna: Option<Sequence>,
    ribosome: Option<Ribosome>,
    pool: Vec<Trna>,
}

impl SynthesisGame {
    /// Creates a game and starts its first round.
    pub fn new(
        config: &GameConfig,
        source: Box<dyn SequenceSource>,
        rng: StdRng,
    ) -> Result<Self, SourceError> {
        let mut game = Self {
            core: Core::new(config.timing, config.rules),
            config: config.synthesis.clone(),
            delays: config.delays,
            source,
            rng,
            code: GeneticCode::standard(),
            template: Sequence::new(Alphabet::Dna, []),
            transcript: SlotLedger::new([]),
            mrna: None,
            ribosome: None,
            pool: Vec::new(),
        };
        game.restart()?;
        Ok(game)
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    pub fn code(&self) -> &GeneticCode {
        self.code
    }

    /// The DNA template strand.
    pub fn template(&self) -> &Sequence {
        &self.template
    }

    /// The mRNA being built during transcription.
    pub fn transcript(&self) -> &SlotLedger {
        &self.transcript
    }

    /// The finished mRNA, once transcription is complete.
    pub fn mrna(&self) -> Option<&Sequence> {
        self.mrna.as_ref()
    }

    pub fn ribosome(&self) -> Option<&Ribosome> {
        self.ribosome.as_ref()
    }

    pub fn pool(&self) -> &[Trna] {
        &self.pool
    }

    pub fn protein(&self) -> &[AminoAcid] {
        match &self.ribosome {
            Some(ribosome) => ribosome.chain(),
            None => &[],
        }
    }

    fn fill(&mut self, index: usize, value: Base) -> Outcome {
        if self.core.stage() != SynthesisStage::Transcription {
            return Outcome::Ignored;
        }
        let policy = self.core.rules.base_pairing;
        match self.transcript.attempt_fill(index, value, &policy) {
            FillOutcome::Accepted {
                index,
                value,
                verdict,
                complete,
            } => {
                self.core.apply_verdict(verdict);
                self.core.emit(GameEvent::SlotFilled { index, value });
                if complete {
                    self.finish_transcription();
                }
                Outcome::Accepted
            }
            FillOutcome::Rejected {
                expected,
                offered,
                verdict,
                ..
            } => {
                self.core.apply_verdict(verdict);
                self.core.message(
                    "Incorrect! Remember: A->U, T->A, C->G, G->C",
                    MessageKind::Error,
                );
                Outcome::Rejected(Rejection::WrongBase { expected, offered })
            }
            FillOutcome::OutOfSequence => Outcome::Ignored,
        }
    }

    fn finish_transcription(&mut self) {
        let mrna = Sequence::new(Alphabet::Rna, self.transcript.filled_bases());
        info!(mrna = %mrna, "transcription complete");
        self.mrna = Some(mrna);
        self.core
            .message("Transcription Complete! mRNA is ready.", MessageKind::Success);
        self.core
            .schedule(self.delays.translation_handoff, SynthesisTask::BeginTranslation);
    }

    fn begin_translation(&mut self) {
        if self.core.stage() != SynthesisStage::Transcription {
            return;
        }
        let Some(mrna) = &self.mrna else {
            warn!("translation requested before transcription finished");
            return;
        };
        let ribosome = Ribosome::new(mrna);
        self.pool = trna_pool(mrna, self.code, self.config.distractors, &mut self.rng);
        debug!(codons = ribosome.codons().len(), pool = self.pool.len(), "ribosome loaded");
        let empty = ribosome.is_finished();
        self.ribosome = Some(ribosome);

        self.core.advance_stage(SynthesisStage::Transcription);
        if empty {
            self.finish_translation();
        }
    }

    fn offer(&mut self, trna: Trna) -> Outcome {
        if self.core.stage() != SynthesisStage::Translation {
            return Outcome::Ignored;
        }
        let Some(ribosome) = self.ribosome.as_mut() else {
            return Outcome::Ignored;
        };
        let offered = trna.anticodon;
        match ribosome.offer_to_a_site(trna, &self.core.rules.anticodon) {
            OfferOutcome::Accepted { verdict } => {
                self.core.apply_verdict(verdict);
                self.core.schedule(self.delays.site_settle, SynthesisTask::Settle);
                Outcome::Accepted
            }
            OfferOutcome::Rejected {
                codon,
                expected,
                verdict,
            } => {
                self.core.apply_verdict(verdict);
                self.core.message(
                    format!("Incorrect! Need tRNA {expected} for {codon}"),
                    MessageKind::Error,
                );
                Outcome::Rejected(Rejection::WrongAnticodon {
                    codon,
                    expected,
                    offered,
                })
            }
            OfferOutcome::Occupied => {
                self.core
                    .message("A-Site is occupied! Wait for shift.", MessageKind::Error);
                Outcome::Rejected(Rejection::SiteOccupied)
            }
            OfferOutcome::Finished => Outcome::Ignored,
        }
    }

    fn finish_translation(&mut self) {
        info!(protein = %self.protein_display("-"), "translation complete");
        self.core
            .message("Protein Synthesis Complete!", MessageKind::Success);
        self.core.advance_stage(SynthesisStage::Translation);
    }

    /// The protein chain with `bond` between residues.
    pub fn protein_display(&self, bond: &str) -> String {
        self.ribosome
            .as_ref()
            .map(|r| r.chain_display(bond))
            .unwrap_or_default()
    }
}

impl Simulation for SynthesisGame {
    type Stage = SynthesisStage;
    type Task = SynthesisTask;

    fn core(&self) -> &Core<SynthesisStage, SynthesisTask> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut Core<SynthesisStage, SynthesisTask> {
        &mut self.core
    }

    fn handle(&mut self, action: Action) -> Outcome {
        if self.core.stages.is_complete() {
            return Outcome::Ignored;
        }
        match action {
            Action::BeginDrag(payload) => {
                self.core.carry(payload);
                Outcome::Accepted
            }
            Action::CancelDrag => match self.core.take_carried() {
                Some(_) => Outcome::Accepted,
                None => Outcome::Ignored,
            },
            Action::FillSlot { index, value } => self.fill(index, value),
            Action::DropOnSlot { index } => match self.core.take_carried() {
                Some(Payload::Base(value)) => self.fill(index, value),
                _ => Outcome::Ignored,
            },
            Action::OfferToSite(trna) => self.offer(trna),
            Action::DropOnSite => match self.core.take_carried() {
                Some(Payload::Trna(trna)) => self.offer(trna),
                _ => Outcome::Ignored,
            },
            Action::SelectTool(_)
            | Action::DeselectTool(_)
            | Action::ToggleTool(_)
            | Action::Deploy => Outcome::Ignored,
        }
    }

    fn restart(&mut self) -> Result<(), SourceError> {
        let request = SequenceRequest {
            length: self.config.template_length(),
            alphabet: Alphabet::Dna,
            constraints: GenerationConstraints::template(
                self.config.pin_start,
                self.config.pin_stop,
            ),
        };
        let template = self.source.fetch(&request)?;
        if template.is_empty() {
            return Err(SourceError::Empty);
        }
        info!(source = self.source.name(), template = %template, "new synthesis round");

        self.transcript = SlotLedger::complementing(&template, Alphabet::Rna);
        self.template = template;
        self.mrna = None;
        self.ribosome = None;
        self.pool.clear();
        self.core.begin_round();
        Ok(())
    }

    fn run_task(&mut self, task: SynthesisTask) {
        debug!(?task, stage = %self.core.stage(), "running continuation");
        match task {
            SynthesisTask::BeginTranslation => self.begin_translation(),
            SynthesisTask::Settle => {
                let Some(ribosome) = self.ribosome.as_mut() else {
                    return;
                };
                match ribosome.settle() {
                    SettleOutcome::Stop => self.finish_translation(),
                    SettleOutcome::ShiftPending => {
                        self.core
                            .schedule(self.delays.ribosome_shift, SynthesisTask::Shift);
                    }
                    SettleOutcome::Empty => {}
                }
            }
            SynthesisTask::Shift => {
                let Some(ribosome) = self.ribosome.as_mut() else {
                    return;
                };
                match ribosome.shift() {
                    ShiftOutcome::Advanced { next_codon } => {
                        debug!(%next_codon, "ribosome shifted");
                    }
                    ShiftOutcome::Exhausted => self.finish_translation(),
                    ShiftOutcome::Empty => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Codon;
    use crate::source::FixedSource;
    use rand::SeedableRng;
    use std::time::Duration;

    fn game(template: &str) -> SynthesisGame {
        let seq = Sequence::parse(Alphabet::Dna, template).unwrap();
        SynthesisGame::new(
            &GameConfig::default(),
            Box::new(FixedSource::new(seq)),
            StdRng::seed_from_u64(9),
        )
        .unwrap()
    }

    fn transcribe_all(game: &mut SynthesisGame) {
        let expected: Vec<Base> = game.transcript().slots().iter().map(|s| s.expected).collect();
        for (index, value) in expected.into_iter().enumerate() {
            assert_eq!(game.handle(Action::FillSlot { index, value }), Outcome::Accepted);
        }
    }

    fn trna(codon: &str) -> Trna {
        Trna::for_codon(Codon::parse(codon).unwrap(), GeneticCode::standard())
    }

    #[test]
    fn test_transcription_builds_mrna() {
        let mut game = game("TACAAA");
        assert!(game.mrna().is_none());
        transcribe_all(&mut game);
        assert_eq!(game.mrna().map(|m| m.to_string()), Some("AUGUUU".to_string()));
        assert_eq!(game.score().score, 60);
        assert_eq!(game.stage(), SynthesisStage::Transcription);

        game.advance(Duration::from_millis(2000));
        assert_eq!(game.stage(), SynthesisStage::Translation);
        assert_eq!(game.pool().len(), 2 + 15);
    }

    #[test]
    fn test_wrong_transcription_base() {
        let mut game = game("TACAAA");
        // DNA T pairs with RNA A, never with T
        assert_eq!(
            game.handle(Action::FillSlot {
                index: 0,
                value: Base::T
            }),
            Outcome::Rejected(Rejection::WrongBase {
                expected: Base::A,
                offered: Base::T
            })
        );
        assert_eq!(game.score().score, 0);
        assert_eq!(game.score().mistakes, 1);
    }

    #[test]
    fn test_translation_to_stop() {
        let mut game = game("TACAAAATT");
        transcribe_all(&mut game);
        game.settle();

        assert_eq!(game.handle(Action::OfferToSite(trna("AUG"))), Outcome::Accepted);
        assert_eq!(
            game.handle(Action::OfferToSite(trna("UUU"))),
            Outcome::Rejected(Rejection::SiteOccupied)
        );
        let mistakes = game.score().mistakes;
        game.settle();
        assert_eq!(game.score().mistakes, mistakes);

        assert_eq!(game.handle(Action::OfferToSite(trna("UUU"))), Outcome::Accepted);
        game.settle();
        assert_eq!(game.handle(Action::OfferToSite(trna("UAA"))), Outcome::Accepted);
        game.advance(Duration::from_millis(500));

        assert!(game.is_complete());
        assert_eq!(game.protein(), &[AminoAcid::Met, AminoAcid::Phe]);
        assert_eq!(game.protein_display("-"), "Met-Phe");
        assert_eq!(game.handle(Action::OfferToSite(trna("UAA"))), Outcome::Ignored);
    }

    #[test]
    fn test_wrong_trna() {
        let mut game = game("TACAAA");
        transcribe_all(&mut game);
        game.settle();
        game.drain_events();

        let outcome = game.handle(Action::OfferToSite(trna("GGG")));
        assert_eq!(
            outcome,
            Outcome::Rejected(Rejection::WrongAnticodon {
                codon: Codon::parse("AUG").unwrap(),
                expected: Codon::parse("UAC").unwrap(),
                offered: Codon::parse("CCC").unwrap(),
            })
        );
        assert!(game.drain_events().iter().any(|e| matches!(
            e,
            GameEvent::MessageRaised { text, .. } if text == "Incorrect! Need tRNA UAC for AUG"
        )));
    }

    #[test]
    fn test_translation_ends_with_mrna() {
        let mut game = game("TACAAA");
        transcribe_all(&mut game);
        game.settle();
        game.handle(Action::OfferToSite(trna("AUG")));
        game.settle();
        assert!(!game.is_complete());
        game.handle(Action::OfferToSite(trna("UUU")));
        game.settle();
        assert!(game.is_complete());
        assert_eq!(game.protein(), &[AminoAcid::Met, AminoAcid::Phe]);
    }

    #[test]
    fn test_drop_on_site() {
        let mut game = game("TACAAA");
        transcribe_all(&mut game);
        game.settle();

        // A base dropped on the site is consumed and ignored
        game.handle(Action::BeginDrag(Payload::Base(Base::A)));
        assert_eq!(game.handle(Action::DropOnSite), Outcome::Ignored);
        assert_eq!(game.handle(Action::DropOnSite), Outcome::Ignored);

        game.handle(Action::BeginDrag(Payload::Trna(trna("AUG"))));
        assert_eq!(game.handle(Action::DropOnSite), Outcome::Accepted);
    }

    #[test]
    fn test_restart_discards_translation() {
        let mut game = game("TACAAA");
        transcribe_all(&mut game);
        game.restart().unwrap();
        game.advance(Duration::from_secs(5));
        assert_eq!(game.stage(), SynthesisStage::Transcription);
        assert!(game.mrna().is_none());
        assert_eq!(game.transcript().filled_count(), 0);
    }

    #[test]
    fn test_empty_template_is_refused() {
        let empty = Sequence::parse(Alphabet::Dna, "").unwrap();
        let result = SynthesisGame::new(
            &GameConfig::default(),
            Box::new(FixedSource::new(empty)),
            StdRng::seed_from_u64(9),
        );
        assert_eq!(result.err(), Some(SourceError::Empty));

        // No codons and nothing pinned: the generator hands back no bases
        let mut config = GameConfig::default();
        config.synthesis.codons = 0;
        config.synthesis.pin_start = false;
        config.synthesis.pin_stop = false;
        let result = SynthesisGame::new(
            &config,
            Box::new(crate::source::RandomSource::seeded(1)),
            StdRng::seed_from_u64(9),
        );
        assert_eq!(result.err(), Some(SourceError::Empty));
    }
}
