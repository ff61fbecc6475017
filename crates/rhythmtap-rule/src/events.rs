use rhythmtap_model::NoteHandle;

use crate::judge::Judgement;
use crate::score::GameState;
use crate::summary::SessionSummary;

/// Per-note lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteState {
    #[default]
    Pending,
    Active,
    Hit(Judgement),
    Missed,
    /// Spawned but never judged: the session stopped or failed first
    Dropped,
}

/// Events emitted by `PlaySession` for a presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayEvent {
    Spawned {
        note: NoteHandle,
    },
    Judged {
        note: NoteHandle,
        judgement: Judgement,
        lane: usize,
        /// Song time at which the judgement was made
        time_us: i64,
    },
    BadTap {
        lane: usize,
        time_us: i64,
    },
    HoldStarted {
        note: NoteHandle,
        lane: usize,
        time_us: i64,
    },
    StateChanged(GameState),
    RevengeActivated {
        end_time_us: i64,
    },
    RevengeEnded,
    Failed(SessionSummary),
    Completed(SessionSummary),
}
