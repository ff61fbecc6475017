use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::chart::Chart;
use crate::note::{Note, NoteId};

/// Index of a note inside a [`NoteTimeline`].
///
/// Handles follow note time order, so comparing two handles compares schedule order.
/// Presentation layers can use the handle to key their own visual objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteHandle(pub usize);

/// Immutable, time-sorted notes of the active chart.
#[derive(Debug, Clone)]
pub struct NoteTimeline {
    song_name: String,
    bpm: f64,
    offset_us: i64,
    lane_count: usize,
    notes: Vec<Note>,
    by_id: HashMap<NoteId, NoteHandle>,
    last_note_end_us: i64,
}

impl NoteTimeline {
    pub fn new(chart: Chart) -> Self {
        let Chart {
            song_name,
            bpm,
            offset_us,
            lanes,
            notes,
        } = chart;

        let by_id = notes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id, NoteHandle(i)))
            .collect();
        let last_note_end_us = notes.iter().map(Note::end_time_us).max().unwrap_or(0);

        Self {
            song_name,
            bpm,
            offset_us,
            lane_count: lanes,
            notes,
            by_id,
            last_note_end_us,
        }
    }

    /// Notes with `song_time <= time <= song_time + lead`, in time order.
    pub fn notes_in_time_range(&self, song_time_us: i64, lead_us: i64) -> &[Note] {
        let end_time = song_time_us.saturating_add(lead_us);
        let start = self.notes.partition_point(|n| n.time_us < song_time_us);
        let end = self.notes.partition_point(|n| n.time_us <= end_time);
        &self.notes[start..end.max(start)]
    }

    pub fn note_by_id(&self, id: NoteId) -> Option<&Note> {
        self.handle_of(id).map(|h| &self.notes[h.0])
    }

    pub fn handle_of(&self, id: NoteId) -> Option<NoteHandle> {
        self.by_id.get(&id).copied()
    }

    pub fn note(&self, handle: NoteHandle) -> Option<&Note> {
        self.notes.get(handle.0)
    }

    /// Latest `time + duration` over all notes (0 for an empty chart).
    pub fn last_note_end_time_us(&self) -> i64 {
        self.last_note_end_us
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    pub fn offset_us(&self) -> i64 {
        self.offset_us
    }

    pub fn song_name(&self) -> &str {
        &self.song_name
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline() -> NoteTimeline {
        let chart = Chart::new(
            "tl",
            100.0,
            500_000,
            3,
            vec![
                Note::tap(0, 3_000_000),
                Note::tap(1, 1_000_000),
                Note::hold(2, 2_000_000, 4_000_000),
                Note::shake(0, 2_000_000),
            ],
        )
        .unwrap();
        NoteTimeline::new(chart)
    }

    #[test]
    fn test_notes_are_time_sorted() {
        let tl = timeline();
        let times: Vec<i64> = tl.notes().iter().map(|n| n.time_us).collect();
        assert_eq!(times, vec![1_000_000, 2_000_000, 2_000_000, 3_000_000]);
    }

    #[test]
    fn test_range_query_is_inclusive() {
        let tl = timeline();
        let range = tl.notes_in_time_range(1_000_000, 1_000_000);
        assert_eq!(range.len(), 3);
        assert!(range.iter().all(|n| n.time_us <= 2_000_000));

        let none = tl.notes_in_time_range(3_500_000, 1_000_000);
        assert!(none.is_empty());
    }

    #[test]
    fn test_lookup_by_id_and_handle() {
        let tl = timeline();
        let note = &tl.notes()[3];
        let handle = tl.handle_of(note.id).unwrap();
        assert_eq!(handle, NoteHandle(3));
        assert_eq!(tl.note_by_id(note.id), Some(note));
        assert_eq!(tl.note(handle), Some(note));
        assert!(tl.note(NoteHandle(99)).is_none());
    }

    #[test]
    fn test_last_end_includes_holds() {
        let tl = timeline();
        assert_eq!(tl.last_note_end_time_us(), 6_000_000);
    }

    #[test]
    fn test_metadata_carried_over() {
        let tl = timeline();
        assert_eq!(tl.song_name(), "tl");
        assert_eq!(tl.lane_count(), 3);
        assert_eq!(tl.offset_us(), 500_000);
        assert_eq!(tl.len(), 4);
        assert!((tl.bpm() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_timeline() {
        let tl = NoteTimeline::new(Chart::new("e", 1.0, 0, 1, vec![]).unwrap());
        assert!(tl.is_empty());
        assert_eq!(tl.last_note_end_time_us(), 0);
        assert!(tl.notes_in_time_range(0, 10_000_000).is_empty());
    }
}
