use rhythmtap_model::{NoteTimeline, NoteType};

use crate::config::RuleConfig;
use crate::input::{InputEvent, InputLog};
use crate::motion::MotionSample;

/// Time between an autoplay press and its release (50ms).
const RELEASE_AFTER_US: i64 = 50_000;

/// Margin above the shake threshold for generated motion samples (in g).
const SHAKE_MARGIN: f64 = 1.0;

/// Build a perfect-timing input script for a timeline.
///
/// Taps press at the note time and release 50ms later; holds press at the start
/// and release 50ms after the end; shakes emit one strong motion sample at the
/// note time. Releases that would cut an ongoing hold in the same lane are
/// omitted.
pub fn generate_autoplay(timeline: &NoteTimeline, config: &RuleConfig) -> InputLog {
    let notes = timeline.notes();

    // (lane, press, release) for every hold
    let holds: Vec<(usize, i64, i64)> = notes
        .iter()
        .filter(|n| n.is_hold())
        .map(|n| (n.lane, n.time_us, n.end_time_us() + RELEASE_AFTER_US))
        .collect();
    let inside_hold = |lane: usize, t: i64| {
        holds
            .iter()
            .any(|&(l, start, end)| l == lane && start <= t && t < end)
    };

    let mut log = InputLog::default();
    for note in notes {
        match note.note_type {
            NoteType::Tap => {
                log.events.push(InputEvent::begin(note.lane, note.time_us));
                let release = note.time_us + RELEASE_AFTER_US;
                if !inside_hold(note.lane, release) {
                    log.events.push(InputEvent::end(note.lane, release));
                }
            }
            NoteType::Hold => {
                log.events.push(InputEvent::begin(note.lane, note.time_us));
                let release = note.end_time_us() + RELEASE_AFTER_US;
                let overlapped = holds
                    .iter()
                    .any(|&(l, start, end)| {
                        l == note.lane && start > note.time_us && start <= release && release < end
                    });
                if !overlapped {
                    log.events.push(InputEvent::end(note.lane, release));
                }
            }
            NoteType::Shake => log.motion.push(MotionSample {
                magnitude: config.shake_threshold + SHAKE_MARGIN,
                wall_time_us: note.time_us,
            }),
        }
    }
    log.sort();
    log
}

#[cfg(test)]
mod tests {
    use rhythmtap_model::{Chart, Note};

    use super::*;
    use crate::input::InputPhase;

    fn timeline(notes: Vec<Note>) -> NoteTimeline {
        NoteTimeline::new(Chart::new("auto", 120.0, 0, 3, notes).unwrap())
    }

    #[test]
    fn test_tap_press_and_release() {
        let tl = timeline(vec![Note::tap(1, 1_000_000)]);
        let log = generate_autoplay(&tl, &RuleConfig::default());
        assert_eq!(
            log.events,
            vec![InputEvent::begin(1, 1_000_000), InputEvent::end(1, 1_050_000)]
        );
        assert!(log.motion.is_empty());
    }

    #[test]
    fn test_hold_released_after_end() {
        let tl = timeline(vec![Note::hold(2, 5_000_000, 2_000_000)]);
        let log = generate_autoplay(&tl, &RuleConfig::default());
        assert_eq!(
            log.events,
            vec![InputEvent::begin(2, 5_000_000), InputEvent::end(2, 7_050_000)]
        );
    }

    #[test]
    fn test_tap_inside_hold_keeps_lane_held() {
        let tl = timeline(vec![
            Note::hold(0, 1_000_000, 2_000_000),
            Note::tap(0, 2_000_000),
        ]);
        let log = generate_autoplay(&tl, &RuleConfig::default());
        let ends: Vec<_> = log
            .events
            .iter()
            .filter(|e| e.phase == InputPhase::End)
            .collect();
        assert_eq!(ends.len(), 1);
        assert_eq!(ends[0].time_us, 3_050_000);
    }

    #[test]
    fn test_shake_motion_above_threshold() {
        let tl = timeline(vec![Note::shake(0, 3_000_000)]);
        let config = RuleConfig::default();
        let log = generate_autoplay(&tl, &config);
        assert!(log.events.is_empty());
        assert_eq!(log.motion.len(), 1);
        assert!(log.motion[0].magnitude > config.shake_threshold);
        assert_eq!(log.motion[0].wall_time_us, 3_000_000);
    }

    #[test]
    fn test_events_sorted() {
        let tl = timeline(vec![
            Note::tap(0, 1_000_000),
            Note::tap(1, 1_020_000),
            Note::tap(2, 1_040_000),
        ]);
        let log = generate_autoplay(&tl, &RuleConfig::default());
        assert!(log.events.windows(2).all(|w| w[0].time_us <= w[1].time_us));
    }
}
