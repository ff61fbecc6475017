//! Play session: drives spawn, judgement, holds, shakes and scoring from a song clock.
//!
//! Single-threaded. The host calls [`PlaySession::update`] once per frame and
//! [`PlaySession::handle_input`] for each touch event; motion samples may be
//! pushed from any thread through a [`MotionSender`].

use anyhow::Result;
use log::{debug, info};
use rhythmtap_model::{Note, NoteHandle, NoteTimeline, NoteType};
use rhythmtap_timing::{PlaybackClock, SongClock};

use crate::active::ActiveNoteSet;
use crate::config::RuleConfig;
use crate::events::{NoteState, PlayEvent};
use crate::hold::HoldTracker;
use crate::input::{InputEvent, InputPhase};
use crate::judge::{JudgeWindows, Judgement, select_candidate};
use crate::motion::{MotionReceiver, MotionSender, ShakeDetector, motion_channel};
use crate::scheduler::SpawnScheduler;
use crate::score::{GameState, ScoreEvent, ScoreMachine};
use crate::summary::SessionSummary;

pub struct PlaySession<C: PlaybackClock> {
    timeline: NoteTimeline,
    clock: SongClock<C>,
    config: RuleConfig,
    windows: JudgeWindows,
    machine: ScoreMachine,
    state: GameState,
    note_states: Vec<NoteState>,
    active: ActiveNoteSet,
    scheduler: SpawnScheduler,
    holds: HoldTracker,
    shake: ShakeDetector,
    motion_tx: MotionSender,
    motion_rx: MotionReceiver,
}

impl<C: PlaybackClock> PlaySession<C> {
    pub fn new(timeline: NoteTimeline, source: C, config: RuleConfig) -> Result<Self> {
        config.validate()?;
        let (motion_tx, motion_rx) = motion_channel(config.motion_queue_capacity);
        let total_notes = timeline.len() as u32;
        Ok(Self {
            note_states: vec![NoteState::Pending; timeline.len()],
            timeline,
            clock: SongClock::new(source),
            windows: config.judge_windows(),
            machine: ScoreMachine::new(config.score_rule()),
            state: GameState::new(total_notes),
            active: ActiveNoteSet::new(),
            scheduler: SpawnScheduler::new(),
            holds: HoldTracker::new(),
            shake: ShakeDetector::new(config.shake_threshold, config.shake_debounce_us),
            motion_tx,
            motion_rx,
            config,
        })
    }

    // --- Lifecycle ---

    /// Reset the attempt and start the clock. False if the clock source is not ready.
    pub fn start(&mut self) -> bool {
        self.reset();
        if !self.clock.start(self.config.start_delay_us) {
            return false;
        }
        info!(
            "Session started: {} ({} notes)",
            self.timeline.song_name(),
            self.timeline.len()
        );
        true
    }

    pub fn restart(&mut self) -> bool {
        self.clock.stop();
        self.start()
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }

    /// Drop active notes and holds, halt spawning and stop the clock.
    pub fn stop(&mut self) {
        self.drop_active();
        self.scheduler.halt();
        self.clock.stop();
        info!("Session stopped: {}", self.timeline.song_name());
    }

    /// Replace the chart. The session is stopped and must be started again.
    pub fn set_timeline(&mut self, timeline: NoteTimeline) {
        self.stop();
        self.timeline = timeline;
        self.reset();
    }

    fn reset(&mut self) {
        self.state = GameState::new(self.timeline.len() as u32);
        self.note_states = vec![NoteState::Pending; self.timeline.len()];
        self.active.clear();
        self.holds.clear();
        self.scheduler.reset();
        self.shake.reset();
        self.motion_rx.drain();
    }

    // --- Per-frame update ---

    /// Advance the session to the current song time.
    ///
    /// Order: revenge expiry, spawn, motion, tap expiry, hold resolution, completion.
    pub fn update(&mut self) -> Vec<PlayEvent> {
        let motion = self.motion_rx.drain();
        let mut events = Vec::new();
        let Some(t) = self.active_song_time() else {
            return events;
        };
        let before = self.state;

        self.apply_score(ScoreEvent::Tick { at_us: t }, &mut events);
        self.spawn_until(t, &mut events);

        for sample in motion {
            if self.shake.observe(sample) {
                self.judge_shake(t, &mut events);
            }
        }

        let expired = self.scheduler.expire(
            &self.timeline,
            t,
            self.windows.hit_us,
            &mut self.active,
        );
        for handle in expired {
            self.record_judgement(handle, Judgement::Miss, t, &mut events);
        }

        let resolved = self
            .holds
            .resolve(&self.timeline, t, self.windows.hit_us, &mut self.active);
        for (handle, judgement) in resolved {
            self.record_judgement(handle, judgement, t, &mut events);
        }

        self.check_completion(t, &mut events);
        self.finish(before, &mut events);
        events
    }

    // --- Input ---

    /// Judge a lane input at its own song time.
    pub fn handle_input(&mut self, input: InputEvent) -> Vec<PlayEvent> {
        let mut events = Vec::new();
        if self.active_song_time().is_none() {
            return events;
        }
        if input.lane >= self.timeline.lane_count() {
            debug!("Discard input for lane {} (lanes: {})", input.lane, self.timeline.lane_count());
            return events;
        }
        let before = self.state;
        let t = input.time_us;
        self.spawn_until(t, &mut events);

        match input.phase {
            InputPhase::Begin => self.press(input.lane, t, &mut events),
            InputPhase::Move => self.holds.press(input.lane),
            InputPhase::End => self.holds.release(input.lane),
        }

        self.finish(before, &mut events);
        events
    }

    fn press(&mut self, lane: usize, t: i64, events: &mut Vec<PlayEvent>) {
        self.holds.press(lane);
        let engaged =
            self.holds
                .try_engage(&self.timeline, &self.active, lane, t, self.windows.hit_us);
        if let Some(note) = engaged {
            events.push(PlayEvent::HoldStarted {
                note,
                lane,
                time_us: t,
            });
        }

        let timeline = &self.timeline;
        let candidates = self.active.iter().filter_map(|h| {
            let note = timeline.note(h)?;
            (note.note_type.is_tappable() && note.lane == lane).then_some((h, note))
        });
        // Hold notes are never tap candidates, so a hold press with no
        // tap or shake nearby also counts as a bad tap
        match select_candidate(candidates, t, self.windows.hit_us) {
            Some(handle) => self.judge_at(handle, t, events),
            None => {
                debug!("Bad tap in lane {lane} at {t} us");
                events.push(PlayEvent::BadTap { lane, time_us: t });
                self.apply_score(ScoreEvent::BadTap, events);
            }
        }
    }

    /// Request revenge mode at the current song time.
    pub fn activate_revenge(&mut self) -> Vec<PlayEvent> {
        let mut events = Vec::new();
        let Some(t) = self.active_song_time() else {
            return events;
        };
        let before = self.state;
        self.apply_score(ScoreEvent::ActivateRevenge { at_us: t }, &mut events);
        self.finish(before, &mut events);
        events
    }

    /// Shake: judge the closest active shake note in any lane, then try revenge.
    fn judge_shake(&mut self, t: i64, events: &mut Vec<PlayEvent>) {
        let timeline = &self.timeline;
        let candidates = self.active.iter().filter_map(|h| {
            let note = timeline.note(h)?;
            (note.note_type == NoteType::Shake).then_some((h, note))
        });
        let Some(handle) = select_candidate(candidates, t, self.windows.hit_us) else {
            return;
        };
        self.judge_at(handle, t, events);
        self.apply_score(ScoreEvent::ActivateRevenge { at_us: t }, events);
    }

    // --- Internals ---

    /// Song time while running, unpaused and not terminal.
    fn active_song_time(&self) -> Option<i64> {
        if self.clock.is_paused() || self.state.is_terminal() {
            return None;
        }
        self.clock.current_song_time_us()
    }

    fn spawn_until(&mut self, t: i64, events: &mut Vec<PlayEvent>) {
        let spawned =
            self.scheduler
                .spawn(&self.timeline, t, self.config.spawn_lead_us, &mut self.active);
        for note in spawned {
            self.note_states[note.0] = NoteState::Active;
            events.push(PlayEvent::Spawned { note });
        }
    }

    fn judge_at(&mut self, handle: NoteHandle, t: i64, events: &mut Vec<PlayEvent>) {
        let Some(note) = self.timeline.note(handle) else {
            return;
        };
        if let Some(judgement) = self.windows.judge(note.time_us.saturating_sub(t)) {
            self.record_judgement(handle, judgement, t, events);
        }
    }

    fn record_judgement(
        &mut self,
        handle: NoteHandle,
        judgement: Judgement,
        t: i64,
        events: &mut Vec<PlayEvent>,
    ) {
        if self.state.is_terminal() {
            // Expired or resolved in the same pass that ended the session
            self.mark_dropped(handle);
            return;
        }
        let Some(lane) = self.timeline.note(handle).map(|n| n.lane) else {
            return;
        };
        self.active.remove(handle);
        self.note_states[handle.0] = if judgement.is_miss() {
            NoteState::Missed
        } else {
            NoteState::Hit(judgement)
        };
        events.push(PlayEvent::Judged {
            note: handle,
            judgement,
            lane,
            time_us: t,
        });
        self.apply_score(ScoreEvent::Judged(judgement), events);
    }

    fn apply_score(&mut self, event: ScoreEvent, events: &mut Vec<PlayEvent>) {
        let prev = self.state;
        self.state = self.machine.apply(&prev, event);

        if !prev.revenge_active && self.state.revenge_active {
            let end_time_us = self.state.revenge_end_us.unwrap_or_default();
            info!("Revenge mode until {end_time_us} us");
            events.push(PlayEvent::RevengeActivated { end_time_us });
        } else if prev.revenge_active && !self.state.revenge_active {
            events.push(PlayEvent::RevengeEnded);
        }

        if !prev.is_terminal() && self.state.is_terminal() {
            self.scheduler.halt();
            self.drop_active();
        }
    }

    fn drop_active(&mut self) {
        for handle in self.active.iter() {
            if let Some(state) = self.note_states.get_mut(handle.0) {
                *state = NoteState::Dropped;
            }
        }
        self.active.clear();
        self.holds.clear();
    }

    fn mark_dropped(&mut self, handle: NoteHandle) {
        let active = self
            .note_states
            .get_mut(handle.0)
            .filter(|state| **state == NoteState::Active);
        if let Some(state) = active {
            *state = NoteState::Dropped;
        }
    }

    fn check_completion(&mut self, t: i64, events: &mut Vec<PlayEvent>) {
        if self.state.is_terminal() || !self.active.is_empty() || !self.holds.is_empty() {
            return;
        }
        let end_of_song = self
            .timeline
            .last_note_end_time_us()
            .saturating_add(self.timeline.offset_us())
            .saturating_add(self.config.completion_grace_us);
        if self.scheduler.is_exhausted(&self.timeline) || t >= end_of_song {
            self.apply_score(ScoreEvent::Complete, events);
        }
    }

    /// Append the state snapshot and any terminal outcome.
    fn finish(&self, before: GameState, events: &mut Vec<PlayEvent>) {
        if self.state != before {
            events.push(PlayEvent::StateChanged(self.state));
        }
        if !before.failed && self.state.failed {
            info!(
                "Session failed: {} (score {})",
                self.timeline.song_name(),
                self.state.score
            );
            events.push(PlayEvent::Failed(self.summary()));
        }
        if !before.completed && self.state.completed {
            info!(
                "Session completed: {} (score {}, max combo {})",
                self.timeline.song_name(),
                self.state.score,
                self.state.max_combo
            );
            events.push(PlayEvent::Completed(self.summary()));
        }
    }

    // --- Accessors ---

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary::from_state(self.timeline.song_name(), &self.state)
    }

    pub fn timeline(&self) -> &NoteTimeline {
        &self.timeline
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    pub fn clock(&self) -> &SongClock<C> {
        &self.clock
    }

    pub fn song_time_us(&self) -> Option<i64> {
        self.clock.current_song_time_us()
    }

    pub fn note_state(&self, handle: NoteHandle) -> Option<NoteState> {
        self.note_states.get(handle.0).copied()
    }

    pub fn active_notes(&self) -> &ActiveNoteSet {
        &self.active
    }

    pub fn engaged_holds(&self) -> usize {
        self.holds.engaged_count()
    }

    pub fn is_lane_held(&self, lane: usize) -> bool {
        self.holds.is_held(lane)
    }

    /// Notes from now through the spawn lead, for drawing.
    pub fn upcoming_notes(&self) -> &[Note] {
        match self.clock.current_song_time_us() {
            Some(t) => self
                .timeline
                .notes_in_time_range(t, self.config.spawn_lead_us),
            None => &[],
        }
    }

    pub fn can_activate_revenge(&self) -> bool {
        self.machine.can_activate_revenge(&self.state)
    }

    /// Handle for feeding motion samples, possibly from another thread.
    pub fn motion_sender(&self) -> MotionSender {
        self.motion_tx.clone()
    }
}
