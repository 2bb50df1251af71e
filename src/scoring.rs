//! Scoring and timing.
//!
//! Score and mistakes change only through validation verdicts and bonuses.
//! Two timers run alongside a round:
//! - a per-stage countdown, whose remaining seconds become a bonus when the
//!   stage is completed (reaching zero is not fatal)
//! - a global stopwatch, compared against a target time at the end
//!
//! Timers are driven by explicit `advance` calls and tick once per whole second.

use std::time::Duration;

use crate::validation::Verdict;

const SECOND: Duration = Duration::from_secs(1);

/// Snapshot exposed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreState {
    /// Never negative; penalties floor at zero.
    pub score: u32,
    pub mistakes: u32,
    pub stage_time_remaining: u32,
    pub global_elapsed: u32,
}

/// Timer lengths and bonus rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// Length of the per-stage countdown.
    pub stage_seconds: u32,
    /// Bonus per second left on the countdown when a stage is completed.
    pub stage_bonus_per_second: u32,
    /// Global time under which the final bonus is awarded.
    pub target_seconds: u32,
    /// Bonus per second under the target at completion.
    pub global_bonus_per_second: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            stage_seconds: 15,
            stage_bonus_per_second: 10,
            target_seconds: 180,
            global_bonus_per_second: 10,
        }
    }
}

/// A one-second countdown that stops at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    carry: Duration,
    running: bool,
}

impl Countdown {
    pub fn start(&mut self, seconds: u32) {
        self.remaining = seconds;
        self.carry = Duration::ZERO;
        self.running = seconds > 0;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.carry = Duration::ZERO;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns how many seconds were counted down.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if !self.running {
            return 0;
        }
        self.carry += dt;
        let mut ticks = 0;
        while self.carry >= SECOND && self.remaining > 0 {
            self.carry -= SECOND;
            self.remaining -= 1;
            ticks += 1;
        }
        if self.remaining == 0 {
            self.stop();
        }
        ticks
    }
}

/// A one-second counter running upwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stopwatch {
    elapsed: u32,
    carry: Duration,
    running: bool,
}

impl Stopwatch {
    pub fn start(&mut self) {
        self.elapsed = 0;
        self.carry = Duration::ZERO;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.carry = Duration::ZERO;
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns how many whole seconds were counted.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if !self.running {
            return 0;
        }
        self.carry += dt;
        let mut ticks = 0;
        while self.carry >= SECOND {
            self.carry -= SECOND;
            self.elapsed = self.elapsed.saturating_add(1);
            ticks += 1;
        }
        ticks
    }
}

/// Owns the score, the mistake counter and both timers of a round.
#[derive(Debug, Clone)]
pub struct ScoreKeeper {
    timing: TimingConfig,
    score: u32,
    mistakes: u32,
    stage_timer: Countdown,
    global_timer: Stopwatch,
}

impl ScoreKeeper {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            timing,
            score: 0,
            mistakes: 0,
            stage_timer: Countdown::default(),
            global_timer: Stopwatch::default(),
        }
    }

    pub fn state(&self) -> ScoreState {
        ScoreState {
            score: self.score,
            mistakes: self.mistakes,
            stage_time_remaining: self.stage_timer.remaining(),
            global_elapsed: self.global_timer.elapsed(),
        }
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Applies a verdict: score moves by its delta (floored at zero) and a
    /// failure counts as a mistake.
    pub fn apply(&mut self, verdict: Verdict) {
        self.score = self.score.saturating_add_signed(verdict.score_delta);
        if !verdict.ok {
            self.mistakes += 1;
        }
    }

    /// Stops every timer and zeroes the state.
    pub fn reset(&mut self) {
        self.stage_timer.stop();
        self.global_timer.stop();
        *self = Self::new(self.timing);
    }

    /// Fresh round: zeroed state, stopwatch and first stage countdown running.
    pub fn start_round(&mut self) {
        self.reset();
        self.global_timer.start();
        self.start_stage();
    }

    /// Restarts the per-stage countdown.
    pub fn start_stage(&mut self) {
        self.stage_timer.start(self.timing.stage_seconds);
    }

    /// Stops the stage countdown and awards its remaining seconds.
    pub fn award_stage_bonus(&mut self) -> u32 {
        let bonus = self.stage_timer.remaining() * self.timing.stage_bonus_per_second;
        self.stage_timer.stop();
        self.score = self.score.saturating_add(bonus);
        bonus
    }

    /// Stops both timers and awards the global bonus when under target.
    pub fn finish(&mut self) -> u32 {
        self.stage_timer.stop();
        self.global_timer.stop();
        let elapsed = self.global_timer.elapsed();
        let bonus = self.timing.target_seconds.saturating_sub(elapsed)
            * self.timing.global_bonus_per_second;
        self.score = self.score.saturating_add(bonus);
        bonus
    }

    pub fn timers_running(&self) -> bool {
        self.stage_timer.is_running() || self.global_timer.is_running()
    }

    /// Advances both timers; returns true if either ticked.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let stage_ticks = self.stage_timer.advance(dt);
        let global_ticks = self.global_timer.advance(dt);
        stage_ticks + global_ticks > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Policy;

    #[test]
    fn test_score_never_negative() {
        let mut keeper = ScoreKeeper::new(TimingConfig::default());
        keeper.apply(Policy::BASE_PAIRING.verdict(true));
        assert_eq!(keeper.state().score, 10);

        for _ in 0..50 {
            keeper.apply(Policy::TOOL_SELECTION.verdict(false));
            keeper.apply(Policy::ANTICODON.verdict(false));
            assert_eq!(keeper.state().score, 0);
        }
        assert_eq!(keeper.state().mistakes, 100);
    }

    #[test]
    fn test_penalty_below_threshold_floors_at_zero() {
        let mut keeper = ScoreKeeper::new(TimingConfig::default());
        keeper.apply(Policy::BASE_PAIRING.verdict(true));
        keeper.apply(Policy::TOOL_SELECTION.verdict(false));
        assert_eq!(keeper.state().score, 0);
        assert_eq!(keeper.state().mistakes, 1);
    }

    #[test]
    fn test_countdown_stops_at_zero() {
        let mut countdown = Countdown::default();
        countdown.start(2);
        assert_eq!(countdown.advance(Duration::from_millis(600)), 0);
        assert_eq!(countdown.advance(Duration::from_millis(600)), 1);
        assert_eq!(countdown.remaining(), 1);
        assert_eq!(countdown.advance(Duration::from_secs(5)), 1);
        assert_eq!(countdown.remaining(), 0);
        assert!(!countdown.is_running());
        assert_eq!(countdown.advance(Duration::from_secs(5)), 0);
    }

    #[test]
    fn test_stage_bonus() {
        let mut keeper = ScoreKeeper::new(TimingConfig::default());
        keeper.start_round();
        keeper.advance(Duration::from_secs(5));
        assert_eq!(keeper.state().stage_time_remaining, 10);
        assert_eq!(keeper.state().global_elapsed, 5);

        assert_eq!(keeper.award_stage_bonus(), 100);
        assert_eq!(keeper.state().score, 100);

        // The countdown is stopped until the next stage starts
        keeper.advance(Duration::from_secs(3));
        assert_eq!(keeper.state().stage_time_remaining, 10);
        assert_eq!(keeper.state().global_elapsed, 8);
    }

    #[test]
    fn test_expired_stage_gives_no_bonus() {
        let mut keeper = ScoreKeeper::new(TimingConfig::default());
        keeper.start_round();
        keeper.advance(Duration::from_secs(20));
        assert_eq!(keeper.award_stage_bonus(), 0);
        assert_eq!(keeper.state().global_elapsed, 20);
    }

    #[test]
    fn test_global_bonus() {
        let mut keeper = ScoreKeeper::new(TimingConfig::default());
        keeper.start_round();
        keeper.advance(Duration::from_secs(30));
        assert_eq!(keeper.finish(), 1500);
        assert!(!keeper.timers_running());

        let mut slow = ScoreKeeper::new(TimingConfig::default());
        slow.start_round();
        slow.advance(Duration::from_secs(200));
        assert_eq!(slow.finish(), 0);
    }

    #[test]
    fn test_reset_stops_timers() {
        let mut keeper = ScoreKeeper::new(TimingConfig::default());
        keeper.start_round();
        keeper.apply(Policy::BASE_PAIRING.verdict(true));
        keeper.advance(Duration::from_secs(3));
        keeper.reset();
        assert!(!keeper.timers_running());
        assert_eq!(keeper.state(), ScoreState::default());
        assert!(!keeper.advance(Duration::from_secs(3)));
    }
}
