//! End-to-end rounds driven through the public API.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use helixtui::autoplay::play_to_completion;
use helixtui::config::GameConfig;
use helixtui::engine::{Action, GameEvent, Outcome, Rejection, Simulation};
use helixtui::genetic_code::{AminoAcid, GeneticCode};
use helixtui::model::{Alphabet, Base, Codon, Sequence};
use helixtui::replication::{ReplicationGame, Strand};
use helixtui::ribosome::Trna;
use helixtui::source::{FixedSource, RandomSource};
use helixtui::stage::{Enzyme, ReplicationStage, Stage, SynthesisStage};
use helixtui::synthesis::SynthesisGame;

fn fixed(template: &str) -> Box<FixedSource> {
    Box::new(FixedSource::new(
        Sequence::parse(Alphabet::Dna, template).unwrap(),
    ))
}

fn replication(template: &str) -> ReplicationGame {
    ReplicationGame::new(&GameConfig::default(), fixed(template), StdRng::seed_from_u64(11))
        .unwrap()
}

fn synthesis(template: &str) -> SynthesisGame {
    SynthesisGame::new(&GameConfig::default(), fixed(template), StdRng::seed_from_u64(12)).unwrap()
}

fn trna(codon: &str) -> Trna {
    Trna::for_codon(Codon::parse(codon).unwrap(), GeneticCode::standard())
}

#[test]
fn test_transcription_scores_each_base() {
    let mut game = synthesis("TACAAA");
    for (index, value) in "AUGUUU".chars().enumerate() {
        let value = Base::from_char(value).unwrap();
        assert_eq!(game.handle(Action::FillSlot { index, value }), Outcome::Accepted);
    }
    assert_eq!(game.score().score, 60);
    assert_eq!(game.score().mistakes, 0);
    assert_eq!(game.mrna().map(|m| m.to_string()), Some("AUGUUU".to_string()));
}

#[test]
fn test_helicase_opens_priming() {
    let mut game = replication("ATCGATCGAT");
    game.handle(Action::SelectTool(Enzyme::Helicase));
    assert_eq!(game.handle(Action::Deploy), Outcome::Accepted);

    game.advance(Duration::from_millis(2000));
    game.advance(Duration::from_millis(100));
    assert_eq!(game.stage(), ReplicationStage::Prime);
    assert_eq!(game.stage().index(), 1);
}

#[test]
fn test_two_enzymes_are_rejected_and_score_floors() {
    let mut game = replication("ATCGATCGAT");
    game.handle(Action::SelectTool(Enzyme::Helicase));
    game.handle(Action::SelectTool(Enzyme::Primase));
    assert_eq!(
        game.handle(Action::Deploy),
        Outcome::Rejected(Rejection::WrongTool {
            required: Enzyme::Helicase
        })
    );
    assert_eq!(game.stage().index(), 0);
    assert_eq!(game.score().mistakes, 1);
    assert_eq!(game.score().score, 0);
    assert!(!game.is_busy());
}

#[test]
fn test_stop_codon_ends_translation() {
    let mut game = synthesis("TACATT");
    for slot in game.transcript().slots().to_vec() {
        game.handle(Action::FillSlot {
            index: slot.index,
            value: slot.expected,
        });
    }
    game.settle();
    assert_eq!(game.stage(), SynthesisStage::Translation);

    assert_eq!(game.handle(Action::OfferToSite(trna("AUG"))), Outcome::Accepted);
    game.settle();
    assert_eq!(game.handle(Action::OfferToSite(trna("UAA"))), Outcome::Accepted);
    game.settle();

    assert!(game.is_complete());
    assert_eq!(game.protein(), &[AminoAcid::Met]);
    assert!(!game.protein().contains(&AminoAcid::Stop));
    let events = game.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::ProcessComplete { .. })));
}

#[test]
fn test_restart_cancels_pending_steps() {
    let mut game = replication("ATCGATCGAT");
    game.handle(Action::SelectTool(Enzyme::Helicase));
    game.handle(Action::Deploy);
    assert!(game.is_busy());

    game.restart().unwrap();
    game.advance(Duration::from_secs(5));
    assert_eq!(game.stage(), ReplicationStage::Unwind);
    assert!(!game.is_unzipped());
    assert!(game.ledger(Strand::Leading).slots().iter().all(|s| !s.is_filled()));
}

#[test]
fn test_stage_changes_are_monotonic() {
    let mut game = ReplicationGame::new(
        &GameConfig::default(),
        Box::new(RandomSource::seeded(21)),
        StdRng::seed_from_u64(21),
    )
    .unwrap();
    game.drain_events();

    let mut stages = Vec::new();
    play_to_completion(&mut game, Duration::from_millis(300), |event| {
        if let GameEvent::StageChanged { index, .. } = event {
            stages.push(*index);
        }
    })
    .unwrap();

    assert_eq!(stages, vec![1, 2, 3, 4, 5]);
    assert_eq!(game.handle(Action::Deploy), Outcome::Ignored);
}

#[test]
fn test_autoplay_synthesis_builds_full_protein() {
    let mut game = synthesis("TACAAAGGGCCCATT");
    let score = play_to_completion(&mut game, Duration::from_millis(250), |_| {}).unwrap();

    assert!(game.is_complete());
    assert_eq!(score.mistakes, 0);
    // Five codons, the last one a stop that is never joined
    assert_eq!(game.protein().len(), 4);
    assert_eq!(
        game.protein(),
        &[AminoAcid::Met, AminoAcid::Phe, AminoAcid::Pro, AminoAcid::Gly]
    );
}

#[test]
fn test_autoplay_random_gene_translates_up_to_stop() {
    let mut game = SynthesisGame::new(
        &GameConfig::default(),
        Box::new(RandomSource::seeded(5)),
        StdRng::seed_from_u64(5),
    )
    .unwrap();
    play_to_completion(&mut game, Duration::from_millis(250), |_| {}).unwrap();

    let expected: Vec<AminoAcid> = GeneticCode::standard()
        .translate_sequence(game.mrna().unwrap())
        .into_iter()
        .take_while(|aa| !aa.is_stop())
        .collect();
    assert_eq!(game.protein().first(), Some(&AminoAcid::Met));
    assert_eq!(game.protein(), expected.as_slice());
}
