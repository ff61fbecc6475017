use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Instant;

/// Abstraction over the audio engine's clock and transport.
///
/// `device_time_us` must come from the audio device (sample-accurate), not from a
/// rendering-frame timer. Transport calls are fire-and-forget.
/// Implementations: SystemPlaybackClock (wall clock fallback), ManualPlaybackClock (testing).
pub trait PlaybackClock {
    /// Current device time in microseconds from an arbitrary epoch.
    fn device_time_us(&self) -> i64;

    /// Whether the audio is loaded and can start.
    fn is_ready(&self) -> bool {
        true
    }

    /// Start playback `delay_us` after the current device time.
    fn play(&mut self, delay_us: i64);

    fn pause(&mut self);

    fn resume(&mut self);

    fn stop(&mut self);
}

/// Transport state as last commanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Wall-clock playback clock using `std::time::Instant`.
///
/// For hosts without a device clock. Keeps ticking while paused; `SongClock`
/// compensates for paused spans.
pub struct SystemPlaybackClock {
    start: Instant,
    state: TransportState,
}

impl SystemPlaybackClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            state: TransportState::Stopped,
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }
}

impl Default for SystemPlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackClock for SystemPlaybackClock {
    fn device_time_us(&self) -> i64 {
        self.start.elapsed().as_micros() as i64
    }

    fn play(&mut self, _delay_us: i64) {
        self.state = TransportState::Playing;
    }

    fn pause(&mut self) {
        self.state = TransportState::Paused;
    }

    fn resume(&mut self) {
        self.state = TransportState::Playing;
    }

    fn stop(&mut self) {
        self.state = TransportState::Stopped;
    }
}

/// Manually stepped playback clock for deterministic simulation and tests.
///
/// Clones share the same time and readiness, so a driver can keep one handle
/// while the session owns another.
#[derive(Debug, Clone)]
pub struct ManualPlaybackClock {
    now_us: Arc<AtomicI64>,
    ready: Arc<AtomicBool>,
    state: TransportState,
    last_delay_us: Option<i64>,
}

impl ManualPlaybackClock {
    pub fn new() -> Self {
        Self {
            now_us: Arc::new(AtomicI64::new(0)),
            ready: Arc::new(AtomicBool::new(true)),
            state: TransportState::Stopped,
            last_delay_us: None,
        }
    }

    pub fn set_time(&self, us: i64) {
        self.now_us.store(us, Ordering::Relaxed);
    }

    pub fn advance(&self, delta_us: i64) {
        self.now_us.fetch_add(delta_us, Ordering::Relaxed);
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Relaxed);
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Delay passed to the most recent `play` call.
    pub fn last_delay_us(&self) -> Option<i64> {
        self.last_delay_us
    }
}

impl Default for ManualPlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackClock for ManualPlaybackClock {
    fn device_time_us(&self) -> i64 {
        self.now_us.load(Ordering::Relaxed)
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    fn play(&mut self, delay_us: i64) {
        self.state = TransportState::Playing;
        self.last_delay_us = Some(delay_us);
    }

    fn pause(&mut self) {
        self.state = TransportState::Paused;
    }

    fn resume(&mut self) {
        self.state = TransportState::Playing;
    }

    fn stop(&mut self) {
        self.state = TransportState::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualPlaybackClock::new();
        assert_eq!(clock.device_time_us(), 0);
        clock.advance(1_000_000);
        assert_eq!(clock.device_time_us(), 1_000_000);
        clock.advance(500_000);
        assert_eq!(clock.device_time_us(), 1_500_000);
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualPlaybackClock::new();
        let handle = clock.clone();
        handle.set_time(5_000_000);
        assert_eq!(clock.device_time_us(), 5_000_000);
        handle.set_ready(false);
        assert!(!clock.is_ready());
    }

    #[test]
    fn test_manual_clock_transport() {
        let mut clock = ManualPlaybackClock::new();
        assert_eq!(clock.state(), TransportState::Stopped);
        clock.play(350_000);
        assert_eq!(clock.state(), TransportState::Playing);
        assert_eq!(clock.last_delay_us(), Some(350_000));
        clock.pause();
        assert_eq!(clock.state(), TransportState::Paused);
        clock.resume();
        assert_eq!(clock.state(), TransportState::Playing);
        clock.stop();
        assert_eq!(clock.state(), TransportState::Stopped);
    }

    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemPlaybackClock::new();
        let t1 = clock.device_time_us();
        let t2 = clock.device_time_us();
        assert!(t2 >= t1);
        assert!(clock.is_ready());
    }
}
