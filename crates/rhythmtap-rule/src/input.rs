use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::motion::MotionSample;

/// Touch phase of a lane input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputPhase {
    Begin,
    Move,
    End,
}

/// A discrete lane input, stamped with song time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputEvent {
    pub phase: InputPhase,
    pub lane: usize,
    pub time_us: i64,
}

impl InputEvent {
    pub fn begin(lane: usize, time_us: i64) -> Self {
        Self {
            phase: InputPhase::Begin,
            lane,
            time_us,
        }
    }

    pub fn moved(lane: usize, time_us: i64) -> Self {
        Self {
            phase: InputPhase::Move,
            lane,
            time_us,
        }
    }

    pub fn end(lane: usize, time_us: i64) -> Self {
        Self {
            phase: InputPhase::End,
            lane,
            time_us,
        }
    }
}

/// Recorded inputs for replaying a session.
///
/// Motion sample times are song times when replayed by the simulator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputLog {
    pub events: Vec<InputEvent>,
    pub motion: Vec<MotionSample>,
}

impl InputLog {
    /// Sort events and motion samples by time (stable).
    pub fn sort(&mut self) {
        self.events.sort_by_key(|e| e.time_us);
        self.motion.sort_by_key(|m| m.wall_time_us);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.motion.is_empty()
    }

    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let mut log: InputLog = serde_json::from_str(&data)?;
        log.sort();
        Ok(log)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
