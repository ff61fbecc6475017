// Property tests for the score state machine invariants.

use proptest::prelude::*;
use rhythmtap_rule::{GameState, Judgement, ScoreEvent, ScoreMachine, ScoreRule};

fn judgement() -> impl Strategy<Value = Judgement> {
    prop_oneof![
        Just(Judgement::Perfect),
        Just(Judgement::Great),
        Just(Judgement::Good),
        Just(Judgement::Miss),
    ]
}

fn score_event() -> impl Strategy<Value = ScoreEvent> {
    prop_oneof![
        6 => judgement().prop_map(ScoreEvent::Judged),
        1 => Just(ScoreEvent::BadTap),
        1 => (0i64..60_000_000).prop_map(|at_us| ScoreEvent::ActivateRevenge { at_us }),
        1 => (0i64..60_000_000).prop_map(|at_us| ScoreEvent::Tick { at_us }),
    ]
}

fn machine(miss_limit: u32) -> ScoreMachine {
    ScoreMachine::new(ScoreRule {
        miss_limit,
        revenge_threshold: 5,
        ..Default::default()
    })
}

proptest! {
    #[test]
    fn combo_multiplier_and_health_invariants(
        miss_limit in 1u32..20,
        events in proptest::collection::vec(score_event(), 0..300),
    ) {
        let m = machine(miss_limit);
        let mut state = GameState::new(300);
        for event in events {
            let prev = state;
            state = m.apply(&prev, event);

            prop_assert_eq!(state.multiplier, 1 + state.combo / 10);
            prop_assert!(state.max_combo >= state.combo);
            prop_assert!((0.0..=1.0).contains(&state.health));
            prop_assert!(state.score >= prev.score);

            if prev.failed {
                prop_assert_eq!(state, prev);
                continue;
            }
            match event {
                ScoreEvent::Judged(Judgement::Miss) | ScoreEvent::BadTap => {
                    prop_assert_eq!(state.combo, 0);
                }
                ScoreEvent::Judged(_) => prop_assert_eq!(state.combo, prev.combo + 1),
                _ => prop_assert_eq!(state.combo, prev.combo),
            }
            prop_assert_eq!(state.failed, state.missed_notes >= miss_limit);
            if state.failed {
                prop_assert_eq!(state.health, 0.0);
            }
        }
    }

    #[test]
    fn completion_is_idempotent(
        events in proptest::collection::vec(score_event(), 0..50),
    ) {
        let m = machine(100);
        let mut state = GameState::new(50);
        for event in events {
            state = m.apply(&state, event);
        }
        let completed = m.apply(&state, ScoreEvent::Complete);
        prop_assert_eq!(completed.completed, !state.failed);
        let again = m.apply(&completed, ScoreEvent::Complete);
        prop_assert_eq!(again, completed);
    }

    #[test]
    fn revenge_end_is_activation_plus_duration(
        hits in 5u32..40,
        at_us in 0i64..100_000_000,
    ) {
        let m = machine(100);
        let mut state = GameState::new(64);
        for _ in 0..hits {
            state = m.apply(&state, ScoreEvent::Judged(Judgement::Perfect));
        }
        state = m.apply(&state, ScoreEvent::ActivateRevenge { at_us });
        prop_assert!(state.revenge_active);
        prop_assert_eq!(state.revenge_end_us, Some(at_us + 8_000_000));

        let before_end = m.apply(&state, ScoreEvent::Tick { at_us: at_us + 7_999_999 });
        prop_assert!(before_end.revenge_active);
        let after_end = m.apply(&state, ScoreEvent::Tick { at_us: at_us + 8_000_000 });
        prop_assert!(!after_end.revenge_active);
    }
}
