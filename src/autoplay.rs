//! Scripted play-through.
//!
//! Drives a game with correct moves only, pausing between moves like a
//! player would. Used by the `--autoplay` mode and by the scenario tests.

use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::engine::{Action, GameEvent, Outcome, Simulation};
use crate::ribosome::Trna;
use crate::replication::{ReplicationGame, Strand};
use crate::scoring::ScoreState;
use crate::stage::{Enzyme, RequiredAction, Stage, SynthesisStage};
use crate::synthesis::SynthesisGame;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AutoplayError {
    #[error("no move available at stage {stage}")]
    Stalled { stage: String },

    #[error("move {action} was not accepted: {outcome}")]
    Refused { action: String, outcome: String },
}

/// A game that knows the right answer for its current state.
pub trait Solvable: Simulation {
    /// The moves that make progress right now. Empty while waiting on a
    /// delayed step or once complete.
    fn correct_moves(&self) -> Vec<Action>;
}

fn tool_moves(required: Enzyme, selected: impl Iterator<Item = Enzyme>) -> Vec<Action> {
    let mut moves: Vec<Action> = selected
        .filter(|&enzyme| enzyme != required)
        .map(Action::DeselectTool)
        .collect();
    moves.push(Action::SelectTool(required));
    moves.push(Action::Deploy);
    moves
}

impl Solvable for ReplicationGame {
    fn correct_moves(&self) -> Vec<Action> {
        if self.is_complete() || self.is_busy() {
            return Vec::new();
        }
        let stage = self.stage();
        match stage.required_action() {
            RequiredAction::Deploy(enzyme) => tool_moves(enzyme, self.selection().iter()),
            RequiredAction::DeployThenFill(enzyme) => {
                let Some(strand) = Strand::for_stage(stage) else {
                    return Vec::new();
                };
                if self.engaged() != Some(strand) {
                    return tool_moves(enzyme, self.selection().iter());
                }
                self.ledger(strand)
                    .slots()
                    .iter()
                    .filter(|slot| !slot.is_filled())
                    .map(|slot| Action::FillSlot {
                        index: slot.index,
                        value: slot.expected,
                    })
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

impl Solvable for SynthesisGame {
    fn correct_moves(&self) -> Vec<Action> {
        if self.is_complete() || self.is_busy() {
            return Vec::new();
        }
        match self.stage() {
            SynthesisStage::Transcription => self
                .transcript()
                .slots()
                .iter()
                .filter(|slot| !slot.is_filled())
                .map(|slot| Action::FillSlot {
                    index: slot.index,
                    value: slot.expected,
                })
                .collect(),
            SynthesisStage::Translation => {
                let Some(codon) = self.ribosome().and_then(|r| r.current_codon()) else {
                    return Vec::new();
                };
                let wanted = codon.anticodon();
                let trna = self
                    .pool()
                    .iter()
                    .find(|t| t.anticodon == wanted)
                    .cloned()
                    .unwrap_or_else(|| Trna::for_codon(codon, self.code()));
                vec![Action::OfferToSite(trna)]
            }
            SynthesisStage::Complete => Vec::new(),
        }
    }
}

/// Plays `game` to its terminal stage, waiting `think_time` before each move.
///
/// Every event produced along the way is passed to `on_event`.
pub fn play_to_completion<G: Solvable>(
    game: &mut G,
    think_time: Duration,
    mut on_event: impl FnMut(&GameEvent),
) -> Result<ScoreState, AutoplayError> {
    while !game.is_complete() {
        let moves = game.correct_moves();
        if moves.is_empty() {
            if !game.is_busy() {
                return Err(AutoplayError::Stalled {
                    stage: game.stage().to_string(),
                });
            }
            game.settle();
        }
        for action in moves {
            game.advance(think_time);
            debug!(?action, "autoplay move");
            let outcome = game.handle(action.clone());
            if outcome != Outcome::Accepted {
                return Err(AutoplayError::Refused {
                    action: format!("{action:?}"),
                    outcome: format!("{outcome:?}"),
                });
            }
        }
        for event in game.drain_events() {
            on_event(&event);
        }
    }
    for event in game.drain_events() {
        on_event(&event);
    }
    debug!(stage = game.stage().index(), "autoplay finished");
    Ok(game.score())
}
