//! Stage state machine.
//!
//! A simulation is a strictly ordered, non-branching run of stages ending in a
//! terminal `Complete` stage. The machine only moves forward, and only from the
//! stage the caller believes is current, so a late continuation can never
//! skip or repeat a stage.

use std::collections::BTreeSet;
use std::fmt;

/// Enzymes available in the replication toolbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Enzyme {
    Helicase,
    Primase,
    Polymerase,
    Ligase,
}

impl Enzyme {
    pub const ALL: [Enzyme; 4] = [
        Enzyme::Helicase,
        Enzyme::Primase,
        Enzyme::Polymerase,
        Enzyme::Ligase,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Enzyme::Helicase => "Helicase",
            Enzyme::Primase => "Primase",
            Enzyme::Polymerase => "Polymerase",
            Enzyme::Ligase => "Ligase",
        }
    }
}

impl fmt::Display for Enzyme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of enzymes currently selected in the toolbox.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolSelection {
    selected: BTreeSet<Enzyme>,
}

impl ToolSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, enzyme: Enzyme) {
        self.selected.insert(enzyme);
    }

    pub fn deselect(&mut self, enzyme: Enzyme) {
        self.selected.remove(&enzyme);
    }

    /// Flips the selection state of an enzyme.
    pub fn toggle(&mut self, enzyme: Enzyme) {
        if !self.selected.remove(&enzyme) {
            self.selected.insert(enzyme);
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn contains(&self, enzyme: Enzyme) -> bool {
        self.selected.contains(&enzyme)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// True when exactly `enzyme`, and nothing else, is selected.
    pub fn is_exactly(&self, enzyme: Enzyme) -> bool {
        self.selected.len() == 1 && self.selected.contains(&enzyme)
    }

    pub fn iter(&self) -> impl Iterator<Item = Enzyme> + '_ {
        self.selected.iter().copied()
    }
}

impl FromIterator<Enzyme> for ToolSelection {
    fn from_iter<I: IntoIterator<Item = Enzyme>>(iter: I) -> Self {
        Self {
            selected: iter.into_iter().collect(),
        }
    }
}

/// What the player has to do to get through a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredAction {
    /// Deploy exactly this enzyme.
    Deploy(Enzyme),
    /// Deploy this enzyme, then fill every slot of a strand.
    DeployThenFill(Enzyme),
    /// Fill every slot of a strand.
    Fill,
    /// Deliver tRNAs to the ribosome until a STOP or the end of the mRNA.
    Translate,
    /// Terminal stage.
    None,
}

/// A stage of a simulated process.
pub trait Stage: Copy + Eq + fmt::Debug + fmt::Display {
    /// The only initial stage.
    const INITIAL: Self;

    fn index(self) -> usize;

    /// The following stage, or `None` for the terminal stage.
    fn next(self) -> Option<Self>;

    fn required_action(self) -> RequiredAction;

    /// The instruction shown when the stage starts.
    fn instruction(self) -> &'static str;

    fn is_complete(self) -> bool {
        self.next().is_none()
    }
}

/// Owns the current stage and enforces monotonic advancement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageMachine<S> {
    current: S,
}

impl<S: Stage> StageMachine<S> {
    pub fn new() -> Self {
        Self {
            current: S::INITIAL,
        }
    }

    pub fn current(&self) -> S {
        self.current
    }

    pub fn is_complete(&self) -> bool {
        self.current.is_complete()
    }

    /// Moves from `from` to its successor.
    ///
    /// Returns `None` without changing anything when `from` is no longer the
    /// current stage or is terminal.
    pub fn advance_from(&mut self, from: S) -> Option<S> {
        if self.current != from {
            return None;
        }
        let next = from.next()?;
        self.current = next;
        Some(next)
    }

    /// Back to the initial stage (full restart only).
    pub fn reset(&mut self) {
        self.current = S::INITIAL;
    }
}

impl<S: Stage> Default for StageMachine<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Stages of the DNA replication puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReplicationStage {
    Unwind,
    Prime,
    SynthesizeLeading,
    SynthesizeLagging,
    Ligate,
    Complete,
}

impl Stage for ReplicationStage {
    const INITIAL: Self = ReplicationStage::Unwind;

    fn index(self) -> usize {
        match self {
            ReplicationStage::Unwind => 0,
            ReplicationStage::Prime => 1,
            ReplicationStage::SynthesizeLeading => 2,
            ReplicationStage::SynthesizeLagging => 3,
            ReplicationStage::Ligate => 4,
            ReplicationStage::Complete => 5,
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            ReplicationStage::Unwind => Some(ReplicationStage::Prime),
            ReplicationStage::Prime => Some(ReplicationStage::SynthesizeLeading),
            ReplicationStage::SynthesizeLeading => Some(ReplicationStage::SynthesizeLagging),
            ReplicationStage::SynthesizeLagging => Some(ReplicationStage::Ligate),
            ReplicationStage::Ligate => Some(ReplicationStage::Complete),
            ReplicationStage::Complete => None,
        }
    }

    fn required_action(self) -> RequiredAction {
        match self {
            ReplicationStage::Unwind => RequiredAction::Deploy(Enzyme::Helicase),
            ReplicationStage::Prime => RequiredAction::Deploy(Enzyme::Primase),
            ReplicationStage::SynthesizeLeading | ReplicationStage::SynthesizeLagging => {
                RequiredAction::DeployThenFill(Enzyme::Polymerase)
            }
            ReplicationStage::Ligate => RequiredAction::Deploy(Enzyme::Ligase),
            ReplicationStage::Complete => RequiredAction::None,
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            ReplicationStage::Unwind => "Step 1: Separate the strands!",
            ReplicationStage::Prime => "Step 2: Prepare for replication!",
            ReplicationStage::SynthesizeLeading => "Step 3: Build the Leading Strand!",
            ReplicationStage::SynthesizeLagging => "Step 4: Build the Lagging Strand!",
            ReplicationStage::Ligate => "Step 5: Finalize the DNA!",
            ReplicationStage::Complete => "Replication Complete!",
        }
    }
}

impl fmt::Display for ReplicationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReplicationStage::Unwind => "Unwind",
            ReplicationStage::Prime => "Prime",
            ReplicationStage::SynthesizeLeading => "Leading strand",
            ReplicationStage::SynthesizeLagging => "Lagging strand",
            ReplicationStage::Ligate => "Ligate",
            ReplicationStage::Complete => "Complete",
        };
        f.write_str(name)
    }
}

/// Stages of the protein synthesis puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SynthesisStage {
    Transcription,
    Translation,
    Complete,
}

impl Stage for SynthesisStage {
    const INITIAL: Self = SynthesisStage::Transcription;

    fn index(self) -> usize {
        match self {
            SynthesisStage::Transcription => 0,
            SynthesisStage::Translation => 1,
            SynthesisStage::Complete => 2,
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            SynthesisStage::Transcription => Some(SynthesisStage::Translation),
            SynthesisStage::Translation => Some(SynthesisStage::Complete),
            SynthesisStage::Complete => None,
        }
    }

    fn required_action(self) -> RequiredAction {
        match self {
            SynthesisStage::Transcription => RequiredAction::Fill,
            SynthesisStage::Translation => RequiredAction::Translate,
            SynthesisStage::Complete => RequiredAction::None,
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            SynthesisStage::Transcription => "Step 1: Transcribe DNA to mRNA!",
            SynthesisStage::Translation => "Step 2: Bring the matching tRNA to the A-Site!",
            SynthesisStage::Complete => "Protein Complete!",
        }
    }
}

impl fmt::Display for SynthesisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SynthesisStage::Transcription => "Transcription",
            SynthesisStage::Translation => "Translation",
            SynthesisStage::Complete => "Complete",
        };
        f.write_str(name)
    }
}
