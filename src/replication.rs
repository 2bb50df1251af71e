//! DNA replication puzzle.
//!
//! The template is unzipped by helicase, primed by primase, copied into a
//! leading and a lagging strand by polymerase and finally sealed by ligase.
//! Each enzyme must be deployed alone; the two strands are filled base by
//! base against the complement of their template.

use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::config::{Delays, GameConfig, ReplicationConfig};
use crate::engine::{Action, Core, GameEvent, MessageKind, Outcome, Payload, Rejection, Simulation};
use crate::model::{Alphabet, Base, GenerationConstraints, Sequence};
use crate::slots::{FillOutcome, SlotLedger};
use crate::source::{SequenceRequest, SequenceSource, SourceError};
use crate::stage::{Enzyme, ReplicationStage, RequiredAction, Stage, ToolSelection};
use crate::validation::check_tools;

/// Delayed consequences of the replication puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationTask {
    /// An enzyme has finished working during `stage`.
    EnzymeDone(ReplicationStage),
    /// Close `stage` after its pause.
    Advance(ReplicationStage),
    /// Primers have faded; the strands can be sealed.
    Seal,
}

/// The two daughter strands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Leading,
    Lagging,
}

impl Strand {
    /// The strand built during `stage`, if any.
    pub fn for_stage(stage: ReplicationStage) -> Option<Self> {
        match stage {
            ReplicationStage::SynthesizeLeading => Some(Strand::Leading),
            ReplicationStage::SynthesizeLagging => Some(Strand::Lagging),
            _ => None,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Leading => f.write_str("Leading"),
            Strand::Lagging => f.write_str("Lagging"),
        }
    }
}

/// State of one replication round.
pub struct ReplicationGame {
    core: Core<ReplicationStage, ReplicationTask>,
    config: ReplicationConfig,
    delays: Delays,
    source: Box<dyn SequenceSource>,
    rng: StdRng,
    /// Top strand; the leading strand is built against it.
    template: Sequence,
    /// Bottom strand, the complement of `template`.
    lagging_template: Sequence,
    leading: SlotLedger,
    lagging: SlotLedger,
    toolbox: [Enzyme; 4],
    selection: ToolSelection,
    /// Strand polymerase is working on in the current stage.
    engaged: Option<Strand>,
    unzipped: bool,
    primed: bool,
    sealed: bool,
}

impl ReplicationGame {
    /// Creates a game and starts its first round.
    pub fn new(
        config: &GameConfig,
        source: Box<dyn SequenceSource>,
        rng: StdRng,
    ) -> Result<Self, SourceError> {
        let empty = Sequence::new(Alphabet::Dna, []);
        let mut game = Self {
            core: Core::new(config.timing, config.rules),
            config: config.replication.clone(),
            delays: config.delays,
            source,
            rng,
            template: empty.clone(),
            lagging_template: empty,
            leading: SlotLedger::new([]),
            lagging: SlotLedger::new([]),
            toolbox: Enzyme::ALL,
            selection: ToolSelection::new(),
            engaged: None,
            unzipped: false,
            primed: false,
            sealed: false,
        };
        game.restart()?;
        Ok(game)
    }

    pub fn config(&self) -> &ReplicationConfig {
        &self.config
    }

    pub fn template(&self) -> &Sequence {
        &self.template
    }

    pub fn lagging_template(&self) -> &Sequence {
        &self.lagging_template
    }

    pub fn ledger(&self, strand: Strand) -> &SlotLedger {
        match strand {
            Strand::Leading => &self.leading,
            Strand::Lagging => &self.lagging,
        }
    }

    /// The strand being built in the current stage.
    pub fn active_strand(&self) -> Option<Strand> {
        Strand::for_stage(self.core.stage())
    }

    pub fn engaged(&self) -> Option<Strand> {
        self.engaged
    }

    /// Enzymes in the order the toolbox shows them (shuffled every round).
    pub fn toolbox(&self) -> &[Enzyme; 4] {
        &self.toolbox
    }

    pub fn selection(&self) -> &ToolSelection {
        &self.selection
    }

    pub fn is_unzipped(&self) -> bool {
        self.unzipped
    }

    pub fn is_primed(&self) -> bool {
        self.primed
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Slot indices a primer sits in front of. Ligase removes them.
    ///
    /// The leading strand has one primer at its start; the lagging strand is
    /// built in two Okazaki fragments, each opened by its own primer.
    pub fn primer_positions(&self, strand: Strand) -> Vec<usize> {
        if !self.primed || self.sealed {
            return Vec::new();
        }
        match strand {
            Strand::Leading => vec![0],
            Strand::Lagging => {
                let split = self.template.len() / 2;
                if split == 0 {
                    vec![0]
                } else {
                    vec![0, split]
                }
            }
        }
    }

    fn ledger_mut(&mut self, strand: Strand) -> &mut SlotLedger {
        match strand {
            Strand::Leading => &mut self.leading,
            Strand::Lagging => &mut self.lagging,
        }
    }

    fn required_enzyme(stage: ReplicationStage) -> Option<Enzyme> {
        match stage.required_action() {
            RequiredAction::Deploy(enzyme) | RequiredAction::DeployThenFill(enzyme) => Some(enzyme),
            _ => None,
        }
    }

    fn deploy(&mut self) -> Outcome {
        let stage = self.core.stage();
        let Some(required) = Self::required_enzyme(stage) else {
            return Outcome::Ignored;
        };
        if self.is_busy() || self.engaged.is_some() {
            return Outcome::Ignored;
        }

        let verdict = check_tools(&self.core.rules.tool_selection, required, &self.selection);
        self.core.apply_verdict(verdict);
        if !verdict.ok {
            debug!(%stage, ?required, selected = self.selection.len(), "wrong enzyme selection");
            self.core.message(
                format!("Incorrect enzyme! Penalty: {} points.", verdict.score_delta),
                MessageKind::Error,
            );
            return Outcome::Rejected(Rejection::WrongTool { required });
        }

        self.selection.clear();
        info!(%stage, enzyme = %required, "enzyme deployed");
        match stage {
            ReplicationStage::Unwind => {
                self.core.message("Unzipping DNA...", MessageKind::Info);
                self.core
                    .schedule(self.delays.enzyme_action, ReplicationTask::EnzymeDone(stage));
            }
            ReplicationStage::Prime => {
                self.core.message("Adding Primers...", MessageKind::Info);
                self.core
                    .schedule(self.delays.enzyme_action, ReplicationTask::EnzymeDone(stage));
            }
            ReplicationStage::SynthesizeLeading | ReplicationStage::SynthesizeLagging => {
                self.engaged = Strand::for_stage(stage);
                self.core.message(
                    "Polymerase ready: place the matching nucleotides.",
                    MessageKind::Info,
                );
            }
            ReplicationStage::Ligate => {
                self.core.message("Sealing the strands...", MessageKind::Info);
                self.core
                    .schedule(self.delays.enzyme_action, ReplicationTask::EnzymeDone(stage));
            }
            ReplicationStage::Complete => {}
        }
        Outcome::Accepted
    }

    fn fill(&mut self, index: usize, value: Base) -> Outcome {
        let stage = self.core.stage();
        let Some(strand) = Strand::for_stage(stage) else {
            return Outcome::Ignored;
        };
        if self.engaged != Some(strand) {
            return Outcome::Ignored;
        }

        let policy = self.core.rules.base_pairing;
        match self.ledger_mut(strand).attempt_fill(index, value, &policy) {
            FillOutcome::Accepted {
                index,
                value,
                verdict,
                complete,
            } => {
                self.core.apply_verdict(verdict);
                self.core.emit(GameEvent::SlotFilled { index, value });
                if complete {
                    debug!(%strand, "strand complete");
                    self.core.message(
                        format!("{strand} strand complete!"),
                        MessageKind::Success,
                    );
                    self.core
                        .schedule(self.delays.strand_settle, ReplicationTask::Advance(stage));
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
                    format!("Incorrect base! Penalty: {} points.", verdict.score_delta),
                    MessageKind::Error,
                );
                Outcome::Rejected(Rejection::WrongBase { expected, offered })
            }
            FillOutcome::OutOfSequence => Outcome::Ignored,
        }
    }

    fn advance_from(&mut self, from: ReplicationStage) {
        if self.core.advance_stage(from).is_some() {
            self.selection.clear();
            self.engaged = None;
        }
    }
}

impl Simulation for ReplicationGame {
    type Stage = ReplicationStage;
    type Task = ReplicationTask;

    fn core(&self) -> &Core<ReplicationStage, ReplicationTask> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut Core<ReplicationStage, ReplicationTask> {
        &mut self.core
    }

    fn handle(&mut self, action: Action) -> Outcome {
        if self.core.stages.is_complete() {
            return Outcome::Ignored;
        }
        match action {
            Action::SelectTool(enzyme) => {
                self.selection.select(enzyme);
                Outcome::Accepted
            }
            Action::DeselectTool(enzyme) => {
                self.selection.deselect(enzyme);
                Outcome::Accepted
            }
            Action::ToggleTool(enzyme) => {
                self.selection.toggle(enzyme);
                Outcome::Accepted
            }
            Action::Deploy => self.deploy(),
            Action::BeginDrag(payload @ Payload::Base(_)) => {
                self.core.carry(payload);
                Outcome::Accepted
            }
            Action::BeginDrag(Payload::Trna(_)) => Outcome::Ignored,
            Action::CancelDrag => match self.core.take_carried() {
                Some(_) => Outcome::Accepted,
                None => Outcome::Ignored,
            },
            Action::FillSlot { index, value } => self.fill(index, value),
            Action::DropOnSlot { index } => match self.core.take_carried() {
                Some(Payload::Base(value)) => self.fill(index, value),
                _ => Outcome::Ignored,
            },
            Action::OfferToSite(_) | Action::DropOnSite => Outcome::Ignored,
        }
    }

    fn restart(&mut self) -> Result<(), SourceError> {
        let request = SequenceRequest {
            length: self.config.strand_length,
            alphabet: Alphabet::Dna,
            constraints: GenerationConstraints::default(),
        };
        let template = self.source.fetch(&request)?;
        if template.is_empty() {
            return Err(SourceError::Empty);
        }
        info!(source = self.source.name(), template = %template, "new replication round");

        self.lagging_template = template.complement();
        self.leading = SlotLedger::complementing(&template, Alphabet::Dna);
        self.lagging = SlotLedger::complementing(&self.lagging_template, Alphabet::Dna);
        self.template = template;
        self.toolbox.shuffle(&mut self.rng);
        self.selection.clear();
        self.engaged = None;
        self.unzipped = false;
        self.primed = false;
        self.sealed = false;
        self.core.begin_round();
        Ok(())
    }

    fn run_task(&mut self, task: ReplicationTask) {
        let stage = self.core.stage();
        debug!(?task, %stage, "running continuation");
        match task {
            ReplicationTask::EnzymeDone(from) if from != stage => {}
            ReplicationTask::EnzymeDone(ReplicationStage::Unwind) => {
                self.unzipped = true;
                self.core.schedule(
                    self.delays.stage_switch,
                    ReplicationTask::Advance(ReplicationStage::Unwind),
                );
            }
            ReplicationTask::EnzymeDone(ReplicationStage::Prime) => {
                self.primed = true;
                self.advance_from(ReplicationStage::Prime);
            }
            ReplicationTask::EnzymeDone(ReplicationStage::Ligate) => {
                self.core
                    .schedule(self.delays.ligase_fade, ReplicationTask::Seal);
            }
            ReplicationTask::EnzymeDone(_) => {}
            ReplicationTask::Seal => {
                if stage == ReplicationStage::Ligate {
                    self.sealed = true;
                    self.advance_from(ReplicationStage::Ligate);
                }
            }
            ReplicationTask::Advance(from) => self.advance_from(from),
        }
    }
}
