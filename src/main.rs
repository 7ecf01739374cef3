//! PUYORS - headless driver
//!
//! Plays a command script against a session and reports the result. Useful
//! for replays, regression runs and checking scoring by hand.

use clap::Parser;
use puyors::{Action, GameEvent, GameSession, GameState, GarbageRule, PhaseResult, Settings};
use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;

/// Play a falling pair puzzle session from a command script.
#[derive(Debug, Parser)]
#[command(
    name = "puyors",
    version,
    about = "Headless falling pair puzzle engine.",
    long_about = "Reads commands one per line (from --script or stdin) and plays them against a fresh session.\n\n\
        COMMANDS:\n  left, right      Move\n  down             Soft drop\n  cw, ccw          Rotate\n  drop             Hard drop\n\n\
        Blank lines and text after '#' are ignored."
)]
struct Args {
    /// Seed for the pair stream. Overrides the settings file.
    #[arg(long)]
    seed: Option<u64>,

    /// Command script; stdin when omitted.
    #[arg(short, long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// What happens to garbage next to a clear. Overrides the settings file.
    #[arg(long, value_enum)]
    garbage: Option<GarbageRule>,

    /// Print the final session snapshot as JSON.
    #[arg(long)]
    json: bool,

    /// Write the default settings file and exit.
    #[arg(long)]
    init_config: bool,
}

/// Get the puyors temp directory, creating it if needed
fn puyors_temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("puyors");
    let _ = fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let mut settings = Settings::load();

    if args.init_config {
        Settings::default().save().map_err(io::Error::other)?;
        if let Some(path) = Settings::settings_path() {
            println!("Wrote {}", path.display());
        }
        return Ok(());
    }

    // Setup tracing to a per-run log file
    let run_id: u32 = rand::random();
    let log_dir = puyors_temp_dir();
    let log_file = format!("{:08x}.log", run_id);
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let directive: tracing_subscriber::filter::Directive = settings
        .logging
        .filter
        .parse()
        .unwrap_or_else(|_| "puyors=info".parse().expect("static directive"));
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .with_ansi(false)
        .init();

    tracing::info!("PUYORS starting, run={:08x}, log={}", run_id, log_dir.join(&log_file).display());

    if let Some(seed) = args.seed {
        settings.session.seed = Some(seed);
    }
    if let Some(garbage) = args.garbage {
        settings.rules.garbage = garbage;
    }

    let mut session = match settings.session.seed {
        Some(seed) => GameSession::with_seed(settings.rules(), seed),
        None => GameSession::new(settings.rules()),
    };

    let lines: Vec<String> = match &args.script {
        Some(path) => fs::read_to_string(path)?.lines().map(str::to_string).collect(),
        None => io::stdin().lock().lines().collect::<io::Result<_>>()?,
    };

    let rejected = run_script(&mut session, &lines, settings.session.auto_fall);

    let score = session.score();
    println!("Final Score: {}", score.points);
    println!("Max Chain: {} | Cleared: {}", score.max_chain, score.total_cleared);
    if session.state() == GameState::GameOver {
        println!("Game over");
    }
    if rejected > 0 {
        println!("Rejected {} script line(s), see log", rejected);
    }
    if args.json {
        let json = serde_json::to_string_pretty(&session.snapshot()).map_err(io::Error::other)?;
        println!("{}", json);
    }
    Ok(())
}

/// Play every command in order. Returns how many lines were rejected.
fn run_script(session: &mut GameSession, lines: &[String], auto_fall: bool) -> usize {
    let mut rejected = 0;
    for (number, line) in lines.iter().enumerate() {
        let command = line.split('#').next().unwrap_or("").trim();
        if command.is_empty() {
            continue;
        }
        let action: Action = match command.parse() {
            Ok(action) => action,
            Err(e) => {
                tracing::warn!("line {}: {}", number + 1, e);
                rejected += 1;
                continue;
            }
        };

        session.process_action(action);
        if auto_fall {
            session.fall();
        }
        settle(session);

        if session.state() == GameState::GameOver {
            tracing::info!("session ended at line {}", number + 1);
            break;
        }
    }
    rejected
}

/// Run any pending chain to completion and log what happened
fn settle(session: &mut GameSession) {
    while !matches!(session.advance_phase(), PhaseResult::Idle) {}
    for event in session.drain_events() {
        match event {
            GameEvent::ChainStepResolved {
                groups_cleared,
                score_delta,
                chain_count,
            } => tracing::info!(
                "chain {}: {} group(s), +{}",
                chain_count,
                groups_cleared,
                score_delta
            ),
            GameEvent::GameOver => tracing::info!("game over"),
            other => tracing::debug!(?other, "event"),
        }
    }
}
