use std::fmt;

use rhythmtap_model::{Note, NoteHandle};
use serde::{Deserialize, Serialize};

/// Result of judging a single note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Judgement {
    Perfect,
    Great,
    Good,
    Miss,
}

impl Judgement {
    pub fn base_score(self) -> u64 {
        match self {
            Judgement::Perfect => 1000,
            Judgement::Great => 600,
            Judgement::Good => 300,
            Judgement::Miss => 0,
        }
    }

    pub fn is_miss(self) -> bool {
        self == Judgement::Miss
    }
}

impl fmt::Display for Judgement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Judgement::Perfect => "PERFECT",
            Judgement::Great => "GREAT",
            Judgement::Good => "GOOD",
            Judgement::Miss => "MISS",
        };
        f.write_str(name)
    }
}

/// Judgement bands in microseconds of absolute offset. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JudgeWindows {
    pub perfect_us: i64,
    pub great_us: i64,
    pub hit_us: i64,
}

impl JudgeWindows {
    /// Band for an input `delta_us` away from the note. None outside the hit window.
    pub fn judge(&self, delta_us: i64) -> Option<Judgement> {
        let d = delta_us.saturating_abs();
        if d <= self.perfect_us {
            Some(Judgement::Perfect)
        } else if d <= self.great_us {
            Some(Judgement::Great)
        } else if d <= self.hit_us {
            Some(Judgement::Good)
        } else {
            None
        }
    }

    pub fn contains(&self, delta_us: i64) -> bool {
        delta_us.saturating_abs() <= self.hit_us
    }
}

/// Pick the note closest to `time_us` within `window_us`.
///
/// Equal offsets resolve to the earlier note time, then the lower handle.
/// Callers filter lane and note type beforehand.
pub fn select_candidate<'a, I>(candidates: I, time_us: i64, window_us: i64) -> Option<NoteHandle>
where
    I: IntoIterator<Item = (NoteHandle, &'a Note)>,
{
    candidates
        .into_iter()
        .filter_map(|(handle, note)| {
            let d = note.time_us.saturating_sub(time_us).saturating_abs();
            (d <= window_us).then_some((d, note.time_us, handle))
        })
        .min()
        .map(|(_, _, handle)| handle)
}
