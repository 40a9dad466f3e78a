use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use luxtris_engine::{
    Command, EngineConfig, GameEvent, GameResult, GameSession, GameSnapshot, PieceSeed,
};
use luxtris_scores::{HighScoreEntry, HighScoreTable};
use rand::Rng as _;
use serde::{Deserialize, Serialize};

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Path to the replay script (JSON format)
    script_file: PathBuf,
    /// Print every engine event as a JSON line before the summary
    #[arg(long)]
    events: bool,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Player name for the high score table
    #[arg(long, requires = "scores")]
    name: Option<String>,
    /// High score table to update, created if missing
    #[arg(long, requires = "name")]
    scores: Option<PathBuf>,
}

/// A recorded game: rules, piece seed and the inputs in order.
#[derive(Debug, Clone, Deserialize)]
struct ReplayScript {
    /// Random when absent.
    #[serde(default)]
    seed: Option<PieceSeed>,
    #[serde(default)]
    config: EngineConfig,
    commands: Vec<Command>,
}

#[derive(Debug, Clone, Serialize)]
struct ReplaySummary {
    seed: PieceSeed,
    applied: usize,
    rejected: usize,
    /// Result of the last game that ended, if any.
    game_over: Option<GameResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    high_score_rank: Option<usize>,
    snapshot: GameSnapshot,
}

#[derive(Debug)]
struct Replay {
    summary: ReplaySummary,
    events: Vec<GameEvent>,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg {
        script_file,
        events,
        output,
        name,
        scores,
    } = arg;

    eprintln!("Loading replay script from {}", script_file.display());
    let script: ReplayScript = util::read_json_file("replay script", script_file)?;
    eprintln!("Loaded {} commands", script.commands.len());

    let Replay {
        mut summary,
        events: game_events,
    } = replay(script)?;
    eprintln!(
        "Applied {} commands, rejected {}; status {:?}, score {}",
        summary.applied,
        summary.rejected,
        summary.snapshot.status,
        summary.snapshot.stats.score()
    );

    if let (Some(name), Some(scores_path)) = (name, scores) {
        let result = summary
            .game_over
            .unwrap_or_else(|| summary.snapshot.stats.result());
        let mut table: HighScoreTable = if scores_path.exists() {
            util::read_json_file("high score", scores_path)?
        } else {
            HighScoreTable::new()
        };
        let entry = HighScoreEntry::new(name, result, Utc::now())
            .context("Cannot record high score")?;
        summary.high_score_rank = table.insert(entry);
        match summary.high_score_rank {
            Some(rank) => eprintln!("New high score, rank {rank}"),
            None => eprintln!("Score did not make the high score table"),
        }
        Output::from_output_path(Some(scores_path.as_path()))?.write_json(&table)?;
    }

    let mut output = Output::from_output_path(output.as_deref())?;
    if *events {
        for event in &game_events {
            output.write_json_line(event)?;
        }
    }
    output.write_json(&summary)?;
    eprintln!("Wrote summary to {}", output.display_path());
    Ok(())
}

fn replay(script: ReplayScript) -> anyhow::Result<Replay> {
    let seed = script.seed.unwrap_or_else(|| rand::rng().random());
    let mut session = GameSession::with_seed(script.config, seed)
        .context("Replay script has an invalid engine configuration")?;

    let mut applied = 0;
    let mut rejected = 0;
    let mut events = Vec::new();
    for command in script.commands {
        if session.apply(command) {
            applied += 1;
        } else {
            rejected += 1;
        }
        session.flush_events(&mut events);
    }

    let game_over = events.iter().rev().find_map(|event| match event {
        GameEvent::GameOver { result } => Some(*result),
        _ => None,
    });

    Ok(Replay {
        summary: ReplaySummary {
            seed,
            applied,
            rejected,
            game_over,
            high_score_rank: None,
            snapshot: session.snapshot(),
        },
        events,
    })
}
