use std::path::PathBuf;

use thiserror::Error;

/// Reasons a chart is rejected at load time.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Failed to read chart file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse chart JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Chart must have at least one lane")]
    NoLanes,

    #[error("Note {index} has lane {lane}, chart has {lanes} lanes")]
    LaneOutOfRange {
        index: usize,
        lane: i64,
        lanes: usize,
    },

    #[error("Note {index} has invalid time {time}")]
    InvalidTime { index: usize, time: f64 },

    #[error("Hold note {index} needs a positive duration")]
    InvalidHoldDuration { index: usize },

    #[error("Duplicate note id: {id}")]
    DuplicateId { id: String },
}
