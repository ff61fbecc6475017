use log::debug;
use rhythmtap_model::{NoteHandle, NoteTimeline};

use crate::active::ActiveNoteSet;

/// Forward-only spawn cursor over the timeline.
///
/// Notes are activated strictly in timeline order; the cursor never rescans.
#[derive(Debug, Clone, Default)]
pub struct SpawnScheduler {
    cursor: usize,
    halted: bool,
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate every pending note with `note.time - song_time <= lead_us`.
    pub fn spawn(
        &mut self,
        timeline: &NoteTimeline,
        song_time_us: i64,
        lead_us: i64,
        active: &mut ActiveNoteSet,
    ) -> Vec<NoteHandle> {
        let mut spawned = Vec::new();
        if self.halted {
            return spawned;
        }
        let notes = timeline.notes();
        while let Some(note) = notes.get(self.cursor) {
            if note.time_us - song_time_us > lead_us {
                break;
            }
            let handle = NoteHandle(self.cursor);
            active.insert(handle);
            spawned.push(handle);
            debug!(
                "Spawn note {} lane {} at {} us (song {} us)",
                handle.0, note.lane, note.time_us, song_time_us
            );
            self.cursor += 1;
        }
        spawned
    }

    /// Remove and return active tap/shake notes whose window has fully passed.
    ///
    /// Hold notes are left to the hold tracker.
    pub fn expire(
        &self,
        timeline: &NoteTimeline,
        song_time_us: i64,
        hit_window_us: i64,
        active: &mut ActiveNoteSet,
    ) -> Vec<NoteHandle> {
        let expired: Vec<NoteHandle> = active
            .iter()
            .filter(|&h| {
                timeline.note(h).is_some_and(|n| {
                    n.note_type.is_tappable() && song_time_us - n.time_us > hit_window_us
                })
            })
            .collect();
        for &h in &expired {
            active.remove(h);
            debug!("Expire note {} (song {} us)", h.0, song_time_us);
        }
        expired
    }

    /// True once every note has been spawned.
    pub fn is_exhausted(&self, timeline: &NoteTimeline) -> bool {
        self.cursor >= timeline.len()
    }

    pub fn halt(&mut self) {
        self.halted = true;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.halted = false;
    }
}

#[cfg(test)]
mod tests {
    use rhythmtap_model::{Chart, Note};

    use super::*;

    const LEAD: i64 = 2_800_000;
    const WINDOW: i64 = 160_000;

    fn timeline() -> NoteTimeline {
        NoteTimeline::new(
            Chart::new(
                "sched",
                120.0,
                0,
                3,
                vec![
                    Note::tap(0, 1_000_000),
                    Note::tap(1, 3_000_000),
                    Note::hold(2, 4_000_000, 1_000_000),
                    Note::tap(0, 10_000_000),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_spawn_within_lead() {
        let tl = timeline();
        let mut sched = SpawnScheduler::new();
        let mut active = ActiveNoteSet::new();

        let spawned = sched.spawn(&tl, 0, LEAD, &mut active);
        assert_eq!(spawned, vec![NoteHandle(0)]);

        // 3.0 - 0.2 = 2.8 is exactly the lead
        let spawned = sched.spawn(&tl, 200_000, LEAD, &mut active);
        assert_eq!(spawned, vec![NoteHandle(1)]);
        assert_eq!(active.len(), 2);
    }

    #[test]
    fn test_spawn_never_repeats() {
        let tl = timeline();
        let mut sched = SpawnScheduler::new();
        let mut active = ActiveNoteSet::new();
        sched.spawn(&tl, 2_000_000, LEAD, &mut active);
        active.clear();
        assert!(sched.spawn(&tl, 2_000_000, LEAD, &mut active).is_empty());
        assert!(active.is_empty());
        assert!(!sched.is_exhausted(&tl));
        assert_eq!(
            sched.spawn(&tl, 8_000_000, LEAD, &mut active),
            vec![NoteHandle(3)]
        );
    }

    #[test]
    fn test_spawn_late_start_activates_backlog_in_order() {
        let tl = timeline();
        let mut sched = SpawnScheduler::new();
        let mut active = ActiveNoteSet::new();
        let spawned = sched.spawn(&tl, 8_000_000, LEAD, &mut active);
        assert_eq!(
            spawned,
            vec![NoteHandle(0), NoteHandle(1), NoteHandle(2), NoteHandle(3)]
        );
        assert!(sched.is_exhausted(&tl));
    }

    #[test]
    fn test_expire_taps_only_after_window() {
        let tl = timeline();
        let mut sched = SpawnScheduler::new();
        let mut active = ActiveNoteSet::new();
        sched.spawn(&tl, 2_000_000, LEAD, &mut active);

        // Exactly at the window edge: still hittable
        assert!(sched.expire(&tl, 1_160_000, WINDOW, &mut active).is_empty());
        let expired = sched.expire(&tl, 1_160_001, WINDOW, &mut active);
        assert_eq!(expired, vec![NoteHandle(0)]);
        assert!(!active.contains(NoteHandle(0)));

        // The hold at 4.0 is never expired here
        let expired = sched.expire(&tl, 9_000_000, WINDOW, &mut active);
        assert_eq!(expired, vec![NoteHandle(1)]);
        assert!(active.contains(NoteHandle(2)));
    }

    #[test]
    fn test_halt_and_reset() {
        let tl = timeline();
        let mut sched = SpawnScheduler::new();
        let mut active = ActiveNoteSet::new();
        sched.halt();
        assert!(sched.is_halted());
        assert!(sched.spawn(&tl, 5_000_000, LEAD, &mut active).is_empty());

        sched.reset();
        assert!(!sched.is_halted());
        assert_eq!(sched.spawn(&tl, 0, LEAD, &mut active).len(), 1);
    }

    #[test]
    fn test_empty_timeline_is_exhausted() {
        let tl = NoteTimeline::new(Chart::new("e", 1.0, 0, 1, vec![]).unwrap());
        let sched = SpawnScheduler::new();
        assert!(sched.is_exhausted(&tl));
    }
}
