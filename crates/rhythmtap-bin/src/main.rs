// rhythmtap: command-line driver for the judgement engine.
//
// Simulates play sessions from a chart and a recorded input log (or autoplay)
// and inspects chart files.

mod simulate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use rhythmtap_model::{Chart, ChartLoader, Difficulty, NoteTimeline, NoteType, us_to_secs};
use rhythmtap_rule::{InputLog, RuleConfig, generate_autoplay};

use simulate::SimulationReport;

#[derive(Parser, Debug)]
#[command(name = "rhythmtap", version, about = "Rhythm tap judgement engine")]
struct Args {
    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a chart against recorded inputs or autoplay
    Simulate {
        /// Chart JSON file. Omit to play the placeholder chart.
        #[arg(long)]
        chart: Option<PathBuf>,

        #[arg(long, default_value = "medium")]
        difficulty: Difficulty,

        /// Fall back to the placeholder chart when the chart cannot be loaded
        #[arg(long)]
        fallback: bool,

        /// Rule config JSON file
        #[arg(long)]
        rule: Option<PathBuf>,

        /// Recorded input log JSON file
        #[arg(long, conflicts_with = "autoplay", required_unless_present = "autoplay")]
        inputs: Option<PathBuf>,

        /// Generate perfect-timing inputs
        #[arg(long)]
        autoplay: bool,

        /// Write the inputs used to this file
        #[arg(long, value_name = "FILE")]
        record: Option<PathBuf>,

        /// Update rate in Hz
        #[arg(long, default_value_t = 120)]
        tick_hz: u32,

        /// Run against the wall clock instead of stepping
        #[arg(long)]
        realtime: bool,

        /// Write the session summary as JSON
        #[arg(long, value_name = "FILE")]
        summary_out: Option<PathBuf>,
    },

    /// Print chart statistics
    Inspect {
        #[arg(long)]
        chart: PathBuf,

        #[arg(long, default_value = "medium")]
        difficulty: Difficulty,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    match args.command {
        Commands::Simulate {
            chart,
            difficulty,
            fallback,
            rule,
            inputs,
            autoplay,
            record,
            tick_hz,
            realtime,
            summary_out,
        } => {
            let chart = load_chart(chart.as_deref(), difficulty, fallback)?;
            let config = match &rule {
                Some(path) => RuleConfig::read(path)
                    .with_context(|| format!("reading rule config {}", path.display()))?,
                None => RuleConfig::default(),
            };
            let timeline = NoteTimeline::new(chart);

            let log = match &inputs {
                Some(path) if !autoplay => InputLog::read(path)
                    .with_context(|| format!("reading input log {}", path.display()))?,
                _ => generate_autoplay(&timeline, &config),
            };
            if let Some(path) = &record {
                log.write(path)?;
                info!("Recorded inputs to {}", path.display());
            }

            let report = if realtime {
                simulate::run_realtime(timeline, config, &log, tick_hz)?
            } else {
                simulate::run_stepped(timeline, config, &log, tick_hz)?
            };
            print_report(&report);

            if let Some(path) = &summary_out {
                let json = serde_json::to_string_pretty(&report.summary)?;
                std::fs::write(path, json)
                    .with_context(|| format!("writing summary {}", path.display()))?;
                info!("Wrote summary to {}", path.display());
            }
            Ok(())
        }
        Commands::Inspect { chart, difficulty } => {
            let chart = ChartLoader::load(&chart, difficulty)?;
            print_chart(&chart, difficulty);
            Ok(())
        }
    }
}

fn load_chart(path: Option<&Path>, difficulty: Difficulty, fallback: bool) -> Result<Chart> {
    match path {
        None => {
            info!("No chart given; using placeholder");
            Ok(Chart::placeholder())
        }
        Some(path) if fallback => Ok(ChartLoader::load_or_placeholder(path, difficulty)),
        Some(path) => ChartLoader::load(path, difficulty)
            .with_context(|| format!("loading chart {}", path.display())),
    }
}

fn print_report(report: &SimulationReport) {
    let s = &report.summary;
    let outcome = if s.failed {
        "FAILED"
    } else if s.completed {
        "CLEARED"
    } else {
        "INCOMPLETE"
    };
    println!("{}: {}", s.song_name, outcome);
    println!("  score:      {}", s.score);
    println!("  max combo:  {}", s.max_combo);
    println!(
        "  notes hit:  {} / {} ({:.1}%)",
        s.notes_hit,
        s.total_notes,
        s.accuracy()
    );
    println!(
        "  perfect {}  great {}  good {}  miss {}",
        report.counts.perfect, report.counts.great, report.counts.good, report.counts.miss
    );
    println!("  bad taps:   {}", report.bad_taps);
    println!("  revenge:    {}", report.revenge_activations);
    println!("  ticks:      {}", report.ticks);
}

fn print_chart(chart: &Chart, difficulty: Difficulty) {
    let timeline = NoteTimeline::new(chart.clone());
    println!("{} [{}]", chart.song_name, difficulty);
    println!("  bpm:     {}", chart.bpm);
    println!("  offset:  {:.3}s", us_to_secs(chart.offset_us));
    println!("  lanes:   {}", chart.lanes);
    println!("  length:  {:.3}s", us_to_secs(timeline.last_note_end_time_us()));
    println!(
        "  notes:   {} (tap {}, hold {}, shake {})",
        chart.note_count(),
        chart.count_of(NoteType::Tap),
        chart.count_of(NoteType::Hold),
        chart.count_of(NoteType::Shake)
    );
    for lane in 0..chart.lanes {
        let count = chart.notes.iter().filter(|n| n.lane == lane).count();
        println!("  lane {lane}:  {count}");
    }
}
