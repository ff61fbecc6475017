// Chart data model: notes, chart decoding, difficulty preparation, timeline

mod chart;
mod difficulty;
mod error;
mod note;
mod timeline;

pub use chart::{Chart, ChartLoader};
pub use difficulty::Difficulty;
pub use error::ChartError;
pub use note::{Note, NoteId, NoteType, secs_to_us, us_to_secs};
pub use timeline::{NoteHandle, NoteTimeline};
