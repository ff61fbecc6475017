use serde::{Deserialize, Serialize};

use crate::judge::Judgement;

/// Score, combo, health and revenge state of one play session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    /// Always `1 + combo / 10`
    pub multiplier: u32,
    /// In [0, 1]
    pub health: f64,
    pub missed_notes: u32,
    pub notes_hit: u32,
    pub bad_taps: u32,
    pub revenge_active: bool,
    /// Song time at which revenge ends (set while active)
    pub revenge_end_us: Option<i64>,
    /// Terminal: miss limit reached
    pub failed: bool,
    /// Terminal: latched by the completion check
    pub completed: bool,
    pub last_judgement: Option<Judgement>,
    pub total_notes: u32,
}

impl GameState {
    pub fn new(total_notes: u32) -> Self {
        Self {
            score: 0,
            combo: 0,
            max_combo: 0,
            multiplier: 1,
            health: 1.0,
            missed_notes: 0,
            notes_hit: 0,
            bad_taps: 0,
            revenge_active: false,
            revenge_end_us: None,
            failed: false,
            completed: false,
            last_judgement: None,
            total_notes,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.failed || self.completed
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Inputs to the score state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreEvent {
    Judged(Judgement),
    BadTap,
    /// Manual or shake-triggered revenge request
    ActivateRevenge { at_us: i64 },
    /// Per-frame tick; ends revenge once its end time is reached
    Tick { at_us: i64 },
    Complete,
}

/// Scoring parameters fixed for a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRule {
    pub miss_limit: u32,
    pub health_recovery: f64,
    pub revenge_enabled: bool,
    pub revenge_threshold: u32,
    pub revenge_duration_us: i64,
    pub revenge_multiplier: u64,
}

impl Default for ScoreRule {
    fn default() -> Self {
        Self {
            miss_limit: 100,
            health_recovery: 0.01,
            revenge_enabled: true,
            revenge_threshold: 30,
            revenge_duration_us: 8_000_000,
            revenge_multiplier: 2,
        }
    }
}

/// Pure `(state, event) -> state` transition function.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreMachine {
    rule: ScoreRule,
}

impl ScoreMachine {
    pub fn new(rule: ScoreRule) -> Self {
        Self { rule }
    }

    pub fn can_activate_revenge(&self, state: &GameState) -> bool {
        self.rule.revenge_enabled
            && !state.is_terminal()
            && !state.revenge_active
            && state.combo >= self.rule.revenge_threshold
    }

    /// Apply one event. A terminal state is returned unchanged.
    pub fn apply(&self, state: &GameState, event: ScoreEvent) -> GameState {
        let mut next = *state;
        if state.is_terminal() {
            return next;
        }
        match event {
            ScoreEvent::Judged(Judgement::Miss) => self.apply_miss(&mut next),
            ScoreEvent::Judged(judgement) => self.apply_hit(&mut next, judgement),
            ScoreEvent::BadTap => {
                next.bad_taps += 1;
                next.combo = 0;
                next.multiplier = 1;
            }
            ScoreEvent::ActivateRevenge { at_us } => {
                if self.can_activate_revenge(state) {
                    next.revenge_active = true;
                    next.revenge_end_us = Some(at_us + self.rule.revenge_duration_us);
                }
            }
            ScoreEvent::Tick { at_us } => {
                let expired = next.revenge_end_us.is_some_and(|end| at_us >= end);
                if next.revenge_active && expired {
                    next.revenge_active = false;
                    next.revenge_end_us = None;
                }
            }
            ScoreEvent::Complete => next.completed = true,
        }
        next
    }

    fn apply_hit(&self, state: &mut GameState, judgement: Judgement) {
        let revenge = if state.revenge_active {
            self.rule.revenge_multiplier
        } else {
            1
        };
        // Multiplier from before this hit's combo update
        state.score += judgement.base_score() * u64::from(state.multiplier) * revenge;
        state.combo += 1;
        state.max_combo = state.max_combo.max(state.combo);
        state.notes_hit += 1;
        state.multiplier = 1 + state.combo / 10;
        state.health = (state.health + self.rule.health_recovery).min(1.0);
        state.last_judgement = Some(judgement);
    }

    fn apply_miss(&self, state: &mut GameState) {
        let limit = self.rule.miss_limit.max(1);
        state.combo = 0;
        state.multiplier = 1;
        state.missed_notes += 1;
        state.revenge_active = false;
        state.revenge_end_us = None;
        state.last_judgement = Some(Judgement::Miss);
        state.health = (1.0 - f64::from(state.missed_notes) / f64::from(limit)).max(0.0);
        if state.missed_notes >= limit {
            state.failed = true;
            state.health = 0.0;
        }
    }
}
