//! Shared simulation plumbing.
//!
//! Both games are driven the same way: the presentation layer submits an
//! [`Action`], gets an [`Outcome`] back synchronously, and drains the
//! [`GameEvent`]s produced since the last call. Delayed consequences are
//! queued on the game's scheduler and run from [`Simulation::advance`].

use std::fmt;
use std::time::Duration;

use tracing::{debug, info};

use crate::model::{Base, Codon};
use crate::ribosome::Trna;
use crate::scheduler::{Scheduler, TaskId};
use crate::scoring::{ScoreKeeper, ScoreState, TimingConfig};
use crate::source::SourceError;
use crate::stage::{Enzyme, Stage, StageMachine};
use crate::validation::{ScoringRules, Verdict};

/// Something the player can pick up and drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Base(Base),
    Trna(Trna),
}

/// A player intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SelectTool(Enzyme),
    DeselectTool(Enzyme),
    ToggleTool(Enzyme),
    /// Deploy the current tool selection.
    Deploy,
    BeginDrag(Payload),
    CancelDrag,
    /// Submit a base for a slot of the active strand.
    FillSlot { index: usize, value: Base },
    /// Drop the carried base on a slot of the active strand.
    DropOnSlot { index: usize },
    /// Deliver a tRNA to the A-site.
    OfferToSite(Trna),
    /// Drop the carried tRNA on the A-site.
    DropOnSite,
}

/// Why an action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    WrongTool { required: Enzyme },
    WrongBase { expected: Base, offered: Base },
    WrongAnticodon { codon: Codon, expected: Codon, offered: Codon },
    /// The A-site still holds the previous tRNA. Carries no penalty.
    SiteOccupied,
}

/// Synchronous result of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected(Rejection),
    /// Not applicable right now (wrong stage, not the current slot, waiting
    /// on a delayed step). Nothing changed and nothing was scored.
    Ignored,
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
    Success,
}

/// Notification for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    ScoreChanged { score: u32, mistakes: u32 },
    StageChanged { index: usize, name: String },
    SlotFilled { index: usize, value: Base },
    TimerTick { stage_remaining: u32, global_elapsed: u32 },
    ProcessComplete { score: u32 },
    MessageRaised { text: String, kind: MessageKind },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::ScoreChanged { score, mistakes } => {
                write!(f, "score {score} ({mistakes} mistakes)")
            }
            GameEvent::StageChanged { index, name } => write!(f, "stage {index}: {name}"),
            GameEvent::SlotFilled { index, value } => write!(f, "slot {index} <- {value}"),
            GameEvent::TimerTick {
                stage_remaining,
                global_elapsed,
            } => write!(
                f,
                "stage {stage_remaining}s left, {:02}:{:02} elapsed",
                global_elapsed / 60,
                global_elapsed % 60
            ),
            GameEvent::ProcessComplete { score } => write!(f, "complete, final score {score}"),
            GameEvent::MessageRaised { text, .. } => f.write_str(text),
        }
    }
}

/// Stage machine, score keeper, scheduler and event queue shared by the games.
#[derive(Debug, Clone)]
pub struct Core<S, T> {
    pub stages: StageMachine<S>,
    pub scoring: ScoreKeeper,
    pub scheduler: Scheduler<T>,
    pub rules: ScoringRules,
    events: Vec<GameEvent>,
    carried: Option<Payload>,
}

impl<S: Stage, T> Core<S, T> {
    pub fn new(timing: TimingConfig, rules: ScoringRules) -> Self {
        Self {
            stages: StageMachine::new(),
            scoring: ScoreKeeper::new(timing),
            scheduler: Scheduler::new(),
            rules,
            events: Vec::new(),
            carried: None,
        }
    }

    pub fn stage(&self) -> S {
        self.stages.current()
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn message(&mut self, text: impl Into<String>, kind: MessageKind) {
        self.emit(GameEvent::MessageRaised {
            text: text.into(),
            kind,
        });
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Applies a verdict to the score and reports the new totals.
    pub fn apply_verdict(&mut self, verdict: Verdict) {
        self.scoring.apply(verdict);
        self.emit_score();
    }

    pub fn emit_score(&mut self) {
        let state = self.scoring.state();
        self.emit(GameEvent::ScoreChanged {
            score: state.score,
            mistakes: state.mistakes,
        });
    }

    fn emit_timers(&mut self) {
        let state = self.scoring.state();
        self.emit(GameEvent::TimerTick {
            stage_remaining: state.stage_time_remaining,
            global_elapsed: state.global_elapsed,
        });
    }

    fn emit_stage(&mut self, stage: S) {
        self.emit(GameEvent::StageChanged {
            index: stage.index(),
            name: stage.to_string(),
        });
    }

    /// Cancels everything pending and starts a fresh round at the initial stage.
    pub fn begin_round(&mut self) {
        let dropped = self.scheduler.cancel_all();
        if dropped > 0 {
            debug!(dropped, "cancelled pending continuations");
        }
        self.stages.reset();
        self.carried = None;
        self.scoring.start_round();

        let stage = self.stages.current();
        self.emit_stage(stage);
        self.emit_score();
        self.emit_timers();
        self.message(stage.instruction(), MessageKind::Info);
    }

    /// Moves from `from` to the next stage, awarding the stage bonus.
    ///
    /// Entering the terminal stage also stops the clock, awards the global
    /// bonus and reports completion. Returns `None` when `from` is stale.
    pub fn advance_stage(&mut self, from: S) -> Option<S> {
        let next = self.stages.advance_from(from)?;
        let stage_bonus = self.scoring.award_stage_bonus();
        info!(from = %from, to = %next, stage_bonus, "stage advanced");
        self.emit_stage(next);

        if next.is_complete() {
            let time_bonus = self.scoring.finish();
            self.emit_score();
            let score = self.scoring.state().score;
            info!(score, time_bonus, "process complete");
            let text = if time_bonus > 0 {
                format!("{} Time Bonus: +{time_bonus}!", next.instruction())
            } else {
                next.instruction().to_string()
            };
            self.message(text, MessageKind::Success);
            self.emit(GameEvent::ProcessComplete { score });
        } else {
            self.scoring.start_stage();
            self.emit_score();
            self.emit_timers();
            self.message(next.instruction(), MessageKind::Info);
        }
        Some(next)
    }

    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskId {
        self.scheduler.schedule(delay, task)
    }

    /// Advances the timers, reporting whole-second ticks.
    pub fn tick(&mut self, dt: Duration) {
        if self.scoring.advance(dt) {
            self.emit_timers();
        }
    }

    pub fn carried(&self) -> Option<&Payload> {
        self.carried.as_ref()
    }

    pub fn carry(&mut self, payload: Payload) {
        self.carried = Some(payload);
    }

    /// Drops whatever is carried.
    pub fn take_carried(&mut self) -> Option<Payload> {
        self.carried.take()
    }
}

/// A game driven by actions and elapsed time.
pub trait Simulation {
    type Stage: Stage;
    type Task;

    fn core(&self) -> &Core<Self::Stage, Self::Task>;

    fn core_mut(&mut self) -> &mut Core<Self::Stage, Self::Task>;

    /// Validates and applies one action.
    fn handle(&mut self, action: Action) -> Outcome;

    /// Fetches a new sequence and resets every piece of round state.
    ///
    /// On error the current round is left untouched.
    fn restart(&mut self) -> Result<(), SourceError>;

    /// Runs a continuation that has come due.
    fn run_task(&mut self, task: Self::Task);

    /// Moves time forward by `dt`, running due continuations in order.
    fn advance(&mut self, dt: Duration) {
        let mut remaining = dt;
        loop {
            while let Some(task) = self.core_mut().scheduler.pop_due() {
                self.run_task(task);
            }
            if remaining.is_zero() {
                break;
            }
            let step = self
                .core()
                .scheduler
                .until_next()
                .map_or(remaining, |next| next.min(remaining));
            let core = self.core_mut();
            core.tick(step);
            core.scheduler.advance_clock(step);
            remaining -= step;
        }
    }

    /// Runs every pending continuation, however far away.
    fn settle(&mut self) {
        while let Some(wait) = self.core().scheduler.until_next() {
            self.advance(wait);
        }
    }

    fn stage(&self) -> Self::Stage {
        self.core().stage()
    }

    fn score(&self) -> ScoreState {
        self.core().scoring.state()
    }

    fn is_complete(&self) -> bool {
        self.core().stages.is_complete()
    }

    fn is_busy(&self) -> bool {
        !self.core().scheduler.is_idle()
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        self.core_mut().drain_events()
    }
}
