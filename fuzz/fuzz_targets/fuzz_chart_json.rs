#![no_main]

use libfuzzer_sys::fuzz_target;
use rhythmtap_model::{Chart, Difficulty, NoteTimeline};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(chart) = Chart::from_json_str(text) else {
        return;
    };
    for &difficulty in Difficulty::all() {
        let Ok(prepared) = Chart::from_json_str_for(text, difficulty) else {
            panic!("chart decodes but fails to prepare for {difficulty}");
        };
        assert_eq!(prepared.song_name, chart.song_name);
        assert!(prepared.notes.windows(2).all(|w| w[0].time_us <= w[1].time_us));
        assert!(prepared.notes.iter().all(|n| n.lane < prepared.lanes));
        let timeline = NoteTimeline::new(prepared);
        let _ = timeline.notes_in_time_range(0, i64::MAX);
    }
});
