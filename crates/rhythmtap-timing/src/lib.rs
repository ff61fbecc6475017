// Song clock: playback clock sources and the song-time adapter

mod playback_clock;
mod song_clock;

pub use playback_clock::{ManualPlaybackClock, PlaybackClock, SystemPlaybackClock, TransportState};
pub use song_clock::SongClock;
