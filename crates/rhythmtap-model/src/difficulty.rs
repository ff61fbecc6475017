use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chart::Chart;
use crate::note::Note;

/// Gap above which Extreme inserts one extra tap (0.5s).
const DENSIFY_MID_GAP_US: i64 = 500_000;
/// Gap above which Extreme inserts a second extra tap (1.2s).
const DENSIFY_LONG_GAP_US: i64 = 1_200_000;

/// Chart difficulty. Lower difficulties thin the note list; Extreme adds notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Extreme,
}

impl Difficulty {
    pub fn all() -> &'static [Difficulty] {
        &[
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::Extreme,
        ]
    }

    /// Keep every n-th note.
    pub fn density_divisor(self) -> usize {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Medium => 3,
            Difficulty::Hard => 2,
            Difficulty::Extreme => 1,
        }
    }

    /// Keep every n-th note, counting in the order given.
    pub fn thin(self, notes: Vec<Note>) -> Vec<Note> {
        let divisor = self.density_divisor();
        notes
            .into_iter()
            .enumerate()
            .filter(|(i, _)| i % divisor == 0)
            .map(|(_, n)| n)
            .collect()
    }

    /// Extreme only: add extra taps in long gaps. Expects time-sorted notes.
    pub fn fill(self, notes: Vec<Note>, lanes: usize) -> Vec<Note> {
        if self == Difficulty::Extreme {
            densify(notes, lanes)
        } else {
            notes
        }
    }

    /// Thin (or densify) an already built chart, counting in time order.
    ///
    /// Chart files go through [`Chart::from_json_str_for`] instead, which
    /// thins in file order.
    pub fn prepare(self, chart: Chart) -> Chart {
        let notes = self.fill(self.thin(chart.notes), chart.lanes);
        Chart { notes, ..chart }
    }
}

/// Fill long gaps with extra taps on neighbouring lanes.
fn densify(notes: Vec<Note>, lanes: usize) -> Vec<Note> {
    if notes.len() < 2 {
        return notes;
    }
    let lane_count = lanes.max(1);

    let mut extras = Vec::new();
    for pair in notes.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        let gap = next.time_us - current.time_us;

        if gap >= DENSIFY_MID_GAP_US {
            extras.push(Note::tap(
                (current.lane + 1) % lane_count,
                current.time_us + gap / 2,
            ));
        }
        if gap >= DENSIFY_LONG_GAP_US {
            extras.push(Note::tap(
                (current.lane + 2) % lane_count,
                current.time_us + (i128::from(gap) * 2 / 3) as i64,
            ));
        }
    }

    let mut combined = notes;
    combined.extend(extras);
    combined.sort_by_key(|n| n.time_us);
    combined
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Extreme => "Extreme",
        };
        f.write_str(name)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "extreme" => Ok(Difficulty::Extreme),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}
