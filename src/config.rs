//! Game configuration.
//!
//! Every constant of the two puzzles lives here. `Default` gives the classroom
//! settings; the command line overrides a few of them.

use std::time::Duration;

use crate::scoring::TimingConfig;
use crate::validation::ScoringRules;

/// Replication puzzle settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationConfig {
    /// Number of base pairs in the template.
    pub strand_length: usize,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self { strand_length: 10 }
    }
}

/// Protein synthesis puzzle settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisConfig {
    /// Number of codons in the gene (the template holds three times as many bases).
    pub codons: usize,
    /// The mRNA opens with AUG.
    pub pin_start: bool,
    /// The mRNA closes with a stop codon.
    pub pin_stop: bool,
    /// Extra random tRNAs mixed into the pool.
    pub distractors: usize,
}

impl SynthesisConfig {
    pub fn template_length(&self) -> usize {
        self.codons * 3
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            codons: 5,
            pin_start: true,
            pin_stop: true,
            distractors: 15,
        }
    }
}

/// Pauses between an accepted action and its consequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delays {
    /// An enzyme working on the DNA.
    pub enzyme_action: Duration,
    /// After helicase, before the next stage opens.
    pub stage_switch: Duration,
    /// Primers fading out under ligase.
    pub ligase_fade: Duration,
    /// Last slot of a strand filled, before the stage closes.
    pub strand_settle: Duration,
    /// mRNA travelling to the ribosome.
    pub translation_handoff: Duration,
    /// tRNA seated in the A-site, before the STOP check.
    pub site_settle: Duration,
    /// Ribosome moving one codon along.
    pub ribosome_shift: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            enzyme_action: Duration::from_millis(2000),
            stage_switch: Duration::from_millis(100),
            ligase_fade: Duration::from_millis(1000),
            strand_settle: Duration::from_millis(500),
            translation_handoff: Duration::from_millis(2000),
            site_settle: Duration::from_millis(500),
            ribosome_shift: Duration::from_millis(1000),
        }
    }
}

/// Complete configuration shared by both games.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameConfig {
    pub replication: ReplicationConfig,
    pub synthesis: SynthesisConfig,
    pub delays: Delays,
    pub timing: TimingConfig,
    pub rules: ScoringRules,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.replication.strand_length, 10);
        assert_eq!(config.synthesis.template_length(), 15);
        assert_eq!(config.timing.stage_seconds, 15);
        assert_eq!(config.timing.target_seconds, 180);
        assert_eq!(config.rules.base_pairing.reward, 10);
        assert_eq!(config.delays.ribosome_shift, Duration::from_secs(1));
    }
}
