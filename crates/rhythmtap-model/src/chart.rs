use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::error::ChartError;
use crate::note::{Note, NoteId, NoteType, secs_to_us};

/// Chart file layout as written by the chart generators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChart {
    song_name: String,
    bpm: f64,
    #[serde(default)]
    offset: f64,
    lanes: usize,
    notes: Vec<RawNote>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawNote {
    #[serde(default)]
    id: Option<NoteId>,
    time: f64,
    lane: i64,
    #[serde(rename = "type", default)]
    note_type: NoteType,
    #[serde(default)]
    duration: Option<f64>,
}

/// A finalized chart: notes sorted by time, every lane index inside `0..lanes`.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub song_name: String,
    /// Informational only; judgement never reads it
    pub bpm: f64,
    /// Shifts the completion-time safety net, in microseconds
    pub offset_us: i64,
    pub lanes: usize,
    pub notes: Vec<Note>,
}

impl Chart {
    /// Build a chart, validating notes and sorting them by time.
    ///
    /// The sort is stable, so notes sharing a timestamp keep their input order.
    pub fn new(
        song_name: impl Into<String>,
        bpm: f64,
        offset_us: i64,
        lanes: usize,
        mut notes: Vec<Note>,
    ) -> Result<Self, ChartError> {
        validate_notes(&notes, lanes)?;

        // Durations only mean something on holds
        for note in &mut notes {
            if !note.is_hold() {
                note.duration_us = None;
            }
        }
        notes.sort_by_key(|n| n.time_us);

        Ok(Self {
            song_name: song_name.into(),
            bpm,
            offset_us,
            lanes,
            notes,
        })
    }

    /// Decode a chart from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self, ChartError> {
        let raw: RawChart = serde_json::from_str(json)?;
        Self::from_raw(raw, None)
    }

    /// Decode a chart and prepare it for `difficulty`.
    ///
    /// Thinning counts notes in file order, before they are sorted by time.
    pub fn from_json_str_for(json: &str, difficulty: Difficulty) -> Result<Self, ChartError> {
        let raw: RawChart = serde_json::from_str(json)?;
        Self::from_raw(raw, Some(difficulty))
    }

    fn from_raw(raw: RawChart, difficulty: Option<Difficulty>) -> Result<Self, ChartError> {
        if raw.lanes == 0 {
            return Err(ChartError::NoLanes);
        }

        let mut notes = Vec::with_capacity(raw.notes.len());
        for (index, rn) in raw.notes.into_iter().enumerate() {
            if !rn.time.is_finite() || rn.time < 0.0 {
                return Err(ChartError::InvalidTime {
                    index,
                    time: rn.time,
                });
            }
            if rn.lane < 0 || rn.lane as usize >= raw.lanes {
                return Err(ChartError::LaneOutOfRange {
                    index,
                    lane: rn.lane,
                    lanes: raw.lanes,
                });
            }
            let duration_us = match rn.duration {
                Some(d) if d.is_finite() => Some(secs_to_us(d)),
                Some(_) => return Err(ChartError::InvalidHoldDuration { index }),
                None => None,
            };
            notes.push(Note {
                id: rn.id.unwrap_or_else(NoteId::new_random),
                time_us: secs_to_us(rn.time),
                lane: rn.lane as usize,
                note_type: rn.note_type,
                duration_us,
            });
        }
        let offset_us = secs_to_us(raw.offset);

        let Some(difficulty) = difficulty else {
            return Self::new(raw.song_name, raw.bpm, offset_us, raw.lanes, notes);
        };
        // Reject bad notes even when thinning would drop them
        validate_notes(&notes, raw.lanes)?;
        let chart = Self::new(
            raw.song_name,
            raw.bpm,
            offset_us,
            raw.lanes,
            difficulty.thin(notes),
        )?;
        let notes = difficulty.fill(chart.notes, chart.lanes);
        Ok(Self { notes, ..chart })
    }

    /// Fallback chart used when the requested chart cannot be loaded.
    ///
    /// 3 lanes, 96 taps cycling lanes 0,1,2,1 every 0.4s from 1.0s.
    pub fn placeholder() -> Self {
        const PATTERN: [usize; 4] = [0, 1, 2, 1];
        const REPEATS: usize = 24;
        const STEP_US: i64 = 400_000;

        let mut notes = Vec::with_capacity(PATTERN.len() * REPEATS);
        let mut t = 1_000_000;
        for _ in 0..REPEATS {
            for lane in PATTERN {
                notes.push(Note::tap(lane, t));
                t += STEP_US;
            }
        }

        Self {
            song_name: "Placeholder".to_string(),
            bpm: 120.0,
            offset_us: 0,
            lanes: 3,
            notes,
        }
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    /// Count notes of a given type.
    pub fn count_of(&self, note_type: NoteType) -> usize {
        self.notes
            .iter()
            .filter(|n| n.note_type == note_type)
            .count()
    }
}

fn validate_notes(notes: &[Note], lanes: usize) -> Result<(), ChartError> {
    if lanes == 0 {
        return Err(ChartError::NoLanes);
    }

    let mut seen = HashSet::with_capacity(notes.len());
    for (index, note) in notes.iter().enumerate() {
        if note.lane >= lanes {
            return Err(ChartError::LaneOutOfRange {
                index,
                lane: note.lane as i64,
                lanes,
            });
        }
        if note.time_us < 0 {
            return Err(ChartError::InvalidTime {
                index,
                time: note.time_us as f64 / 1_000_000.0,
            });
        }
        if note.is_hold() && !note.duration_us.is_some_and(|d| d > 0) {
            return Err(ChartError::InvalidHoldDuration { index });
        }
        if !seen.insert(note.id) {
            return Err(ChartError::DuplicateId {
                id: note.id.to_string(),
            });
        }
    }
    Ok(())
}

/// Loads chart files and applies difficulty preparation.
pub struct ChartLoader;

impl ChartLoader {
    /// Load and prepare a chart, rejecting malformed data.
    pub fn load(path: &Path, difficulty: Difficulty) -> Result<Chart, ChartError> {
        let content = fs::read_to_string(path).map_err(|source| ChartError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let prepared = Chart::from_json_str_for(&content, difficulty)?;
        info!(
            "Loaded chart '{}' ({:?}): {} notes, {} lanes",
            prepared.song_name,
            difficulty,
            prepared.note_count(),
            prepared.lanes
        );
        Ok(prepared)
    }

    /// Load a chart, falling back to the placeholder chart on any error.
    pub fn load_or_placeholder(path: &Path, difficulty: Difficulty) -> Chart {
        match Self::load(path, difficulty) {
            Ok(chart) => chart,
            Err(e) => {
                warn!("{e}; using placeholder chart");
                Chart::placeholder()
            }
        }
    }
}
