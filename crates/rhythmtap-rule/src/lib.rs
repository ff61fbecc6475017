// Judgement rules: windows, spawn scheduling, holds, shakes, scoring and the play session

mod active;
mod autoplay;
mod config;
mod events;
mod hold;
mod input;
mod judge;
mod motion;
mod scheduler;
mod score;
mod session;
mod summary;

pub use active::ActiveNoteSet;
pub use autoplay::generate_autoplay;
pub use config::{RuleConfig, RuleVersion};
pub use events::{NoteState, PlayEvent};
pub use hold::{ActiveHold, HoldTracker};
pub use input::{InputEvent, InputLog, InputPhase};
pub use judge::{JudgeWindows, Judgement, select_candidate};
pub use motion::{MotionReceiver, MotionSample, MotionSender, ShakeDetector, motion_channel};
pub use scheduler::SpawnScheduler;
pub use score::{GameState, ScoreEvent, ScoreMachine, ScoreRule};
pub use session::PlaySession;
pub use summary::SessionSummary;
