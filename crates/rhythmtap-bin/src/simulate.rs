use std::time::Duration;

use anyhow::Result;
use log::{debug, info};
use rhythmtap_model::NoteTimeline;
use rhythmtap_rule::{InputLog, Judgement, PlayEvent, PlaySession, RuleConfig, SessionSummary};
use rhythmtap_timing::{ManualPlaybackClock, PlaybackClock, SystemPlaybackClock};

/// Extra song time after the completion point before the driver gives up.
const RUNOUT_US: i64 = 2_000_000;

/// Judgement tallies over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JudgementCounts {
    pub perfect: u32,
    pub great: u32,
    pub good: u32,
    pub miss: u32,
}

impl JudgementCounts {
    fn record(&mut self, judgement: Judgement) {
        match judgement {
            Judgement::Perfect => self.perfect += 1,
            Judgement::Great => self.great += 1,
            Judgement::Good => self.good += 1,
            Judgement::Miss => self.miss += 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub summary: SessionSummary,
    pub counts: JudgementCounts,
    pub bad_taps: u32,
    pub revenge_activations: u32,
    pub ticks: u64,
}

/// Replay `log` on a manually stepped clock. Deterministic.
pub fn run_stepped(
    timeline: NoteTimeline,
    config: RuleConfig,
    log: &InputLog,
    tick_hz: u32,
) -> Result<SimulationReport> {
    let tick_us = tick_interval_us(tick_hz);
    let clock = ManualPlaybackClock::new();
    let mut session = PlaySession::new(timeline, clock.clone(), config)?;
    anyhow::ensure!(session.start(), "playback clock not ready");
    Ok(drive(&mut session, log, || clock.advance(tick_us)))
}

/// Replay `log` against the wall clock, sleeping between ticks.
pub fn run_realtime(
    timeline: NoteTimeline,
    config: RuleConfig,
    log: &InputLog,
    tick_hz: u32,
) -> Result<SimulationReport> {
    let tick = Duration::from_micros(tick_interval_us(tick_hz) as u64);
    let mut session = PlaySession::new(timeline, SystemPlaybackClock::new(), config)?;
    anyhow::ensure!(session.start(), "playback clock not ready");
    Ok(drive(&mut session, log, || std::thread::sleep(tick)))
}

fn tick_interval_us(tick_hz: u32) -> i64 {
    1_000_000 / i64::from(tick_hz.max(1))
}

/// Song time after which the driver stops waiting for completion.
fn run_end_us(timeline: &NoteTimeline, config: &RuleConfig) -> i64 {
    timeline
        .last_note_end_time_us()
        .saturating_add(timeline.offset_us())
        .saturating_add(config.completion_grace_us)
        .saturating_add(RUNOUT_US)
}

fn drive<C: PlaybackClock>(
    session: &mut PlaySession<C>,
    log: &InputLog,
    mut advance: impl FnMut(),
) -> SimulationReport {
    let end_us = run_end_us(session.timeline(), session.config());

    let motion = session.motion_sender();
    let mut inputs = log.events.iter().peekable();
    let mut samples = log.motion.iter().peekable();
    let mut counts = JudgementCounts::default();
    let mut revenge_activations = 0;
    let mut ticks = 0;

    let mut tally = |events: Vec<PlayEvent>| {
        for event in events {
            match event {
                PlayEvent::Judged { judgement, .. } => counts.record(judgement),
                PlayEvent::RevengeActivated { .. } => revenge_activations += 1,
                _ => {}
            }
        }
    };

    loop {
        advance();
        ticks += 1;
        let Some(t) = session.song_time_us() else {
            break;
        };
        while let Some(event) = inputs.next_if(|e| e.time_us <= t) {
            tally(session.handle_input(*event));
        }
        while let Some(sample) = samples.next_if(|m| m.wall_time_us <= t) {
            if !motion.send(*sample) {
                debug!("Motion queue full; dropped sample at {} us", sample.wall_time_us);
            }
        }
        tally(session.update());

        if session.state().is_terminal() || t >= end_us {
            break;
        }
    }

    let summary = session.summary();
    info!(
        "Simulation finished after {ticks} ticks: score {}, {} / {} notes",
        summary.score, summary.notes_hit, summary.total_notes
    );
    SimulationReport {
        bad_taps: summary.bad_taps,
        summary,
        counts,
        revenge_activations,
        ticks,
    }
}
