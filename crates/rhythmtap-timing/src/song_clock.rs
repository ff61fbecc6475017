use log::{debug, warn};

use crate::playback_clock::PlaybackClock;

/// Derives song time from a playback clock's device time.
///
/// `song_time = max(0, device_time - (start_anchor + start_delay))`. The anchor
/// already includes the start delay. Pausing freezes the raw (unclamped) song
/// time; resuming moves the anchor so playback continues from the frozen value.
pub struct SongClock<C: PlaybackClock> {
    source: C,
    /// Device time at which song time 0 occurs. None = not started.
    anchor_us: Option<i64>,
    /// Raw song time captured at pause (may be negative inside the start delay).
    paused_at_us: Option<i64>,
}

impl<C: PlaybackClock> SongClock<C> {
    pub fn new(source: C) -> Self {
        Self {
            source,
            anchor_us: None,
            paused_at_us: None,
        }
    }

    /// Start playback after `delay_us`. Returns false when the source is not ready.
    ///
    /// Calling `start` on a running clock restarts it from song time 0.
    pub fn start(&mut self, delay_us: i64) -> bool {
        if !self.source.is_ready() {
            warn!("Playback source not ready; song clock not started");
            return false;
        }
        let now = self.source.device_time_us();
        self.source.play(delay_us);
        self.anchor_us = Some(now + delay_us);
        self.paused_at_us = None;
        debug!("Song clock started at device time {now} (delay {delay_us} us)");
        true
    }

    /// Current song time in microseconds, or None before `start`.
    pub fn current_song_time_us(&self) -> Option<i64> {
        self.raw_song_time_us().map(|t| t.max(0))
    }

    fn raw_song_time_us(&self) -> Option<i64> {
        let anchor = self.anchor_us?;
        Some(match self.paused_at_us {
            Some(frozen) => frozen,
            None => self.source.device_time_us() - anchor,
        })
    }

    pub fn pause(&mut self) {
        if self.paused_at_us.is_some() {
            return;
        }
        if let Some(raw) = self.raw_song_time_us() {
            self.paused_at_us = Some(raw);
            self.source.pause();
        }
    }

    pub fn resume(&mut self) {
        if let Some(frozen) = self.paused_at_us.take() {
            self.anchor_us = Some(self.source.device_time_us() - frozen);
            self.source.resume();
        }
    }

    pub fn stop(&mut self) {
        self.anchor_us = None;
        self.paused_at_us = None;
        self.source.stop();
    }

    pub fn is_running(&self) -> bool {
        self.anchor_us.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at_us.is_some()
    }

    pub fn source(&self) -> &C {
        &self.source
    }
}
