use serde::{Deserialize, Serialize};

use crate::score::GameState;

/// Final result of a session, handed to persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub song_name: String,
    pub score: u64,
    pub max_combo: u32,
    pub notes_hit: u32,
    pub total_notes: u32,
    pub missed_notes: u32,
    pub bad_taps: u32,
    pub failed: bool,
    pub completed: bool,
}

impl SessionSummary {
    pub fn from_state(song_name: &str, state: &GameState) -> Self {
        Self {
            song_name: song_name.to_string(),
            score: state.score,
            max_combo: state.max_combo,
            notes_hit: state.notes_hit,
            total_notes: state.total_notes,
            missed_notes: state.missed_notes,
            bad_taps: state.bad_taps,
            failed: state.failed,
            completed: state.completed,
        }
    }

    /// Hit ratio in percent (0 for an empty chart).
    pub fn accuracy(&self) -> f64 {
        if self.total_notes == 0 {
            return 0.0;
        }
        f64::from(self.notes_hit) * 100.0 / f64::from(self.total_notes)
    }
}
