#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rhythmtap_model::{Chart, Note, NoteTimeline};
use rhythmtap_rule::{InputEvent, InputPhase, MotionSample, PlaySession, RuleConfig};
use rhythmtap_timing::ManualPlaybackClock;

const LANES: usize = 4;

#[derive(Arbitrary, Debug)]
struct FuzzNote {
    lane: u8,
    time_ms: u16,
    kind: u8,
    duration_ms: u16,
}

#[derive(Arbitrary, Debug)]
enum Action {
    Tick { advance_ms: u8 },
    Press { lane: u8, phase: u8, offset_ms: i8 },
    Shake { magnitude: u8 },
    Revenge,
    Pause,
    Resume,
}

#[derive(Arbitrary, Debug)]
struct Input {
    notes: Vec<FuzzNote>,
    actions: Vec<Action>,
}

fuzz_target!(|input: Input| {
    let notes = input
        .notes
        .iter()
        .map(|n| {
            let lane = usize::from(n.lane) % LANES;
            let time = i64::from(n.time_ms) * 1_000;
            match n.kind % 3 {
                0 => Note::tap(lane, time),
                1 => Note::shake(lane, time),
                _ => Note::hold(lane, time, i64::from(n.duration_ms.max(1)) * 1_000),
            }
        })
        .collect();
    let Ok(chart) = Chart::new("fuzz", 120.0, 0, LANES, notes) else {
        return;
    };

    let clock = ManualPlaybackClock::new();
    let Ok(mut session) =
        PlaySession::new(NoteTimeline::new(chart), clock.clone(), RuleConfig::default())
    else {
        return;
    };
    session.start();
    let motion = session.motion_sender();
    let mut wall_us = 0;

    for action in input.actions {
        match action {
            Action::Tick { advance_ms } => {
                clock.advance(i64::from(advance_ms) * 1_000);
                session.update();
            }
            Action::Press {
                lane,
                phase,
                offset_ms,
            } => {
                let t = session.song_time_us().unwrap_or(0) + i64::from(offset_ms) * 1_000;
                let phase = match phase % 3 {
                    0 => InputPhase::Begin,
                    1 => InputPhase::Move,
                    _ => InputPhase::End,
                };
                session.handle_input(InputEvent {
                    phase,
                    lane: usize::from(lane) % (LANES + 1),
                    time_us: t,
                });
            }
            Action::Shake { magnitude } => {
                wall_us += 100_000;
                motion.send(MotionSample {
                    magnitude: f64::from(magnitude) / 50.0,
                    wall_time_us: wall_us,
                });
            }
            Action::Revenge => {
                session.activate_revenge();
            }
            Action::Pause => session.pause(),
            Action::Resume => session.resume(),
        }

        let state = session.state();
        assert_eq!(state.multiplier, 1 + state.combo / 10);
        assert!(state.max_combo >= state.combo);
        assert!((0.0..=1.0).contains(&state.health));
        assert!(!(state.failed && state.completed));
        assert!(state.notes_hit + state.missed_notes <= state.total_notes);
    }
});
