use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use rhythmtap_model::{NoteHandle, NoteTimeline, NoteType};

use crate::active::ActiveNoteSet;
use crate::judge::{Judgement, select_candidate};

/// An engaged hold note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveHold {
    /// Song time of the engaging press
    pub started_us: i64,
    pub lane: usize,
}

/// Tracks held lanes and engaged hold notes.
///
/// A hold is checked only at its end time: Perfect if its lane is held at
/// that instant, Miss otherwise. Releasing and re-pressing before the end is
/// allowed.
#[derive(Debug, Clone, Default)]
pub struct HoldTracker {
    engaged: BTreeMap<NoteHandle, ActiveHold>,
    held_lanes: BTreeSet<usize>,
}

impl HoldTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, lane: usize) {
        self.held_lanes.insert(lane);
    }

    pub fn release(&mut self, lane: usize) {
        self.held_lanes.remove(&lane);
    }

    pub fn is_held(&self, lane: usize) -> bool {
        self.held_lanes.contains(&lane)
    }

    /// Engage the closest active, unengaged hold note in `lane` within `window_us`.
    pub fn try_engage(
        &mut self,
        timeline: &NoteTimeline,
        active: &ActiveNoteSet,
        lane: usize,
        time_us: i64,
        window_us: i64,
    ) -> Option<NoteHandle> {
        let candidates = active.iter().filter_map(|h| {
            let note = timeline.note(h)?;
            (note.note_type == NoteType::Hold
                && note.lane == lane
                && !self.engaged.contains_key(&h))
            .then_some((h, note))
        });
        let handle = select_candidate(candidates, time_us, window_us)?;
        self.engaged.insert(
            handle,
            ActiveHold {
                started_us: time_us,
                lane,
            },
        );
        debug!("Hold {} engaged in lane {} at {} us", handle.0, lane, time_us);
        Some(handle)
    }

    /// Resolve holds whose end time has been reached.
    ///
    /// Engaged holds resolve at `time + duration`. Holds never engaged resolve
    /// as Miss once both their end time and their engage window have passed.
    /// Resolved notes are removed from `active`.
    pub fn resolve(
        &mut self,
        timeline: &NoteTimeline,
        song_time_us: i64,
        hit_window_us: i64,
        active: &mut ActiveNoteSet,
    ) -> Vec<(NoteHandle, Judgement)> {
        let mut resolved = Vec::new();

        let finished: Vec<(NoteHandle, ActiveHold)> = self
            .engaged
            .iter()
            .filter(|(h, _)| {
                timeline
                    .note(**h)
                    .is_none_or(|n| song_time_us >= n.end_time_us())
            })
            .map(|(h, hold)| (*h, *hold))
            .collect();
        for (handle, hold) in finished {
            self.engaged.remove(&handle);
            active.remove(handle);
            let judgement = if self.is_held(hold.lane) {
                Judgement::Perfect
            } else {
                Judgement::Miss
            };
            debug!("Hold {} resolved {} at {} us", handle.0, judgement, song_time_us);
            resolved.push((handle, judgement));
        }

        let abandoned: Vec<NoteHandle> = active
            .iter()
            .filter(|h| !self.engaged.contains_key(h))
            .filter(|&h| {
                timeline.note(h).is_some_and(|n| {
                    n.is_hold()
                        && song_time_us >= n.end_time_us()
                        && song_time_us - n.time_us > hit_window_us
                })
            })
            .collect();
        for handle in abandoned {
            active.remove(handle);
            debug!("Hold {} never engaged; miss at {} us", handle.0, song_time_us);
            resolved.push((handle, Judgement::Miss));
        }

        resolved
    }

    pub fn engaged(&self, handle: NoteHandle) -> Option<&ActiveHold> {
        self.engaged.get(&handle)
    }

    pub fn engaged_count(&self) -> usize {
        self.engaged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engaged.is_empty()
    }

    /// Drop engaged holds and held lanes.
    pub fn clear(&mut self) {
        self.engaged.clear();
        self.held_lanes.clear();
    }
}
