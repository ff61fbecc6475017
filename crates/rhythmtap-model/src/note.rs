use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Microseconds per second.
const US_PER_SEC: f64 = 1_000_000.0;

/// Convert seconds (chart file unit) to integer microseconds.
pub fn secs_to_us(secs: f64) -> i64 {
    (secs * US_PER_SEC).round() as i64
}

/// Convert integer microseconds back to seconds.
pub fn us_to_secs(us: i64) -> f64 {
    us as f64 / US_PER_SEC
}

/// Stable identity of a note within a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub Uuid);

impl NoteId {
    /// Fresh random identity (used for notes created during chart preparation).
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The type of a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    #[default]
    Tap,
    Shake,
    Hold,
}

impl NoteType {
    /// Whether a lane press can judge this note directly.
    pub fn is_tappable(self) -> bool {
        matches!(self, NoteType::Tap | NoteType::Shake)
    }
}

/// A single note in the chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Scheduled time in microseconds from song start
    pub time_us: i64,
    /// Lane index (0-indexed)
    pub lane: usize,
    pub note_type: NoteType,
    /// Hold length in microseconds (hold notes only)
    pub duration_us: Option<i64>,
}

impl Note {
    pub fn tap(lane: usize, time_us: i64) -> Self {
        Self {
            id: NoteId::new_random(),
            time_us,
            lane,
            note_type: NoteType::Tap,
            duration_us: None,
        }
    }

    pub fn shake(lane: usize, time_us: i64) -> Self {
        Self {
            id: NoteId::new_random(),
            time_us,
            lane,
            note_type: NoteType::Shake,
            duration_us: None,
        }
    }

    pub fn hold(lane: usize, time_us: i64, duration_us: i64) -> Self {
        Self {
            id: NoteId::new_random(),
            time_us,
            lane,
            note_type: NoteType::Hold,
            duration_us: Some(duration_us),
        }
    }

    /// Time at which the note is over: start + hold duration (or start for taps).
    pub fn end_time_us(&self) -> i64 {
        self.time_us.saturating_add(self.duration_us.unwrap_or(0))
    }

    pub fn is_hold(&self) -> bool {
        self.note_type == NoteType::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secs_to_us_rounds_to_nearest() {
        assert_eq!(secs_to_us(1.0), 1_000_000);
        assert_eq!(secs_to_us(0.06), 60_000);
        assert_eq!(secs_to_us(1.0601), 1_060_100);
        assert_eq!(secs_to_us(0.0000004), 0);
    }

    #[test]
    fn test_us_to_secs_inverse() {
        assert!((us_to_secs(2_500_000) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_end_time_includes_hold_duration() {
        let hold = Note::hold(1, 5_000_000, 2_000_000);
        assert_eq!(hold.end_time_us(), 7_000_000);
        let tap = Note::tap(0, 1_000_000);
        assert_eq!(tap.end_time_us(), 1_000_000);
    }

    #[test]
    fn test_tappable_types() {
        assert!(NoteType::Tap.is_tappable());
        assert!(NoteType::Shake.is_tappable());
        assert!(!NoteType::Hold.is_tappable());
    }

    #[test]
    fn test_note_type_serde_lowercase() {
        let json = serde_json::to_string(&NoteType::Shake).unwrap();
        assert_eq!(json, "\"shake\"");
        let parsed: NoteType = serde_json::from_str("\"hold\"").unwrap();
        assert_eq!(parsed, NoteType::Hold);
    }
}
