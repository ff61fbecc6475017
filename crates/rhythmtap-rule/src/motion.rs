use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use serde::{Deserialize, Serialize};

/// One accelerometer reading, reduced to its magnitude (in g).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionSample {
    pub magnitude: f64,
    /// Wall-clock time of the reading; used only for debouncing
    pub wall_time_us: i64,
}

impl MotionSample {
    pub fn from_acceleration(x: f64, y: f64, z: f64, wall_time_us: i64) -> Self {
        Self {
            magnitude: (x * x + y * y + z * z).sqrt(),
            wall_time_us,
        }
    }
}

/// Threshold crossing with a debounce interval.
#[derive(Debug, Clone)]
pub struct ShakeDetector {
    threshold: f64,
    debounce_us: i64,
    last_shake_us: Option<i64>,
}

impl ShakeDetector {
    pub fn new(threshold: f64, debounce_us: i64) -> Self {
        Self {
            threshold,
            debounce_us,
            last_shake_us: None,
        }
    }

    /// True when the sample counts as a new shake.
    pub fn observe(&mut self, sample: MotionSample) -> bool {
        if sample.magnitude <= self.threshold {
            return false;
        }
        let debounced = self
            .last_shake_us
            .is_none_or(|last| sample.wall_time_us - last > self.debounce_us);
        if debounced {
            self.last_shake_us = Some(sample.wall_time_us);
        }
        debounced
    }

    pub fn reset(&mut self) {
        self.last_shake_us = None;
    }
}

/// Producer side of the bounded motion queue. Cheap to clone and `Send`.
#[derive(Debug, Clone)]
pub struct MotionSender {
    tx: SyncSender<MotionSample>,
}

impl MotionSender {
    /// Enqueue without blocking. Returns false when the sample was dropped.
    pub fn send(&self, sample: MotionSample) -> bool {
        match self.tx.try_send(sample) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Consumer side, drained once per update tick.
#[derive(Debug)]
pub struct MotionReceiver {
    rx: Receiver<MotionSample>,
}

impl MotionReceiver {
    pub fn drain(&self) -> Vec<MotionSample> {
        self.rx.try_iter().collect()
    }
}

pub fn motion_channel(capacity: usize) -> (MotionSender, MotionReceiver) {
    let (tx, rx) = mpsc::sync_channel(capacity);
    (MotionSender { tx }, MotionReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(magnitude: f64, wall_time_us: i64) -> MotionSample {
        MotionSample {
            magnitude,
            wall_time_us,
        }
    }

    #[test]
    fn test_magnitude() {
        let s = MotionSample::from_acceleration(3.0, 4.0, 0.0, 7);
        assert!((s.magnitude - 5.0).abs() < 1e-12);
        assert_eq!(s.wall_time_us, 7);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut d = ShakeDetector::new(1.8, 500_000);
        assert!(!d.observe(sample(1.8, 0)));
        assert!(d.observe(sample(1.81, 0)));
    }

    #[test]
    fn test_debounce() {
        let mut d = ShakeDetector::new(1.8, 500_000);
        assert!(d.observe(sample(2.5, 1_000_000)));
        assert!(!d.observe(sample(2.5, 1_200_000)));
        assert!(!d.observe(sample(2.5, 1_500_000)));
        assert!(d.observe(sample(2.5, 1_500_001)));
        d.reset();
        assert!(d.observe(sample(2.5, 1_600_000)));
    }

    #[test]
    fn test_channel_drops_when_full() {
        let (tx, rx) = motion_channel(2);
        assert!(tx.send(sample(1.0, 0)));
        assert!(tx.clone().send(sample(2.0, 1)));
        assert!(!tx.send(sample(3.0, 2)));
        let drained = rx.drain();
        assert_eq!(drained.len(), 2);
        assert!((drained[1].magnitude - 2.0).abs() < f64::EPSILON);
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn test_sender_from_other_thread() {
        let (tx, rx) = motion_channel(8);
        let handle = std::thread::spawn(move || tx.send(sample(2.0, 5)));
        assert!(handle.join().unwrap());
        assert_eq!(rx.drain().len(), 1);
    }
}
