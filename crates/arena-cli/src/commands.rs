//! Subcommand implementations.
//!
//! Everything that produces output returns it as a `String`; `main` does
//! the printing.

use std::fmt::Write as _;
use std::io::{BufRead, Write as _};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arena::orchestrator::validate_participants;
use arena::report::summary::MEDALS;
use arena::{
    fallback_questions, generate_questions, load_run, CompetitionRun, Difficulty, HttpInvoker,
    JsonFileSink, Participant, ProviderInvoker, Question, QuestionBank, ReportSink, RunSummary,
    Tournament, TournamentSettings,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::config::ArenaConfig;

/// `arena run`
pub async fn run(args: RunArgs) -> Result<()> {
    let config = ArenaConfig::load(&args.config)?;
    config.validate().context("Invalid configuration")?;

    let participants = config.participants();
    let settings = config.tournament_settings(args.seed);
    validate_participants(&participants, settings.min_participants)
        .context("Not enough usable models in configuration")?;

    let invoker = Arc::new(HttpInvoker::new(settings.timeout).context("Failed to build HTTP client")?);
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let questions = prepare_questions(
        &config,
        &participants,
        invoker.as_ref(),
        args.questions,
        &mut rng,
    )
    .await?;

    println!("{}", render_plan(&participants, &questions, &settings));
    if !args.yes && !confirm("Start the competition? [y/N] ")? {
        println!("Cancelled.");
        return Ok(());
    }

    let tournament = Tournament::new(participants, invoker, settings)?;
    let run = tournament.run(questions).await?;
    println!("{}", render_standings(&run));

    let sink = match args.output {
        Some(path) => JsonFileSink::new(path),
        None => JsonFileSink::timestamped(".", run.started_at),
    };
    sink.publish(&run).context("Failed to save results")?;
    println!("Results saved to {}", sink.path().display());
    Ok(())
}

/// Pick the run's questions: generated when enabled, otherwise sampled from
/// the built-in bank, with the fixed fallback set as the last resort.
pub async fn prepare_questions(
    config: &ArenaConfig,
    participants: &[Participant],
    invoker: &dyn ProviderInvoker,
    count_override: Option<usize>,
    rng: &mut StdRng,
) -> Result<Vec<Question>> {
    let settings = &config.competition_settings;
    let generation = &settings.question_generation;
    let count = count_override.unwrap_or(generation.count).max(1);

    if generation.enabled {
        if let Some(generator) = participants.first() {
            let run_settings = config.tournament_settings(None);
            return Ok(generate_questions(
                invoker,
                generator,
                &run_settings.options,
                run_settings.timeout,
                settings.locale,
                count,
                generation.difficulty,
                &generation.topics,
            )
            .await);
        }
    }

    let bank = QuestionBank::builtin().context("Built-in question bank is malformed")?;
    let sampled = bank.sample(count, &generation.topics, None, rng);
    if sampled.is_empty() {
        warn!(topics = ?generation.topics, "No bank questions match, using fallback questions");
        return Ok(fallback_questions());
    }
    info!(count = sampled.len(), "Sampled questions from the built-in bank");
    Ok(sampled)
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    std::io::stdout().flush().context("Failed to flush stdout")?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read confirmation")?;
    Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

pub fn render_plan(
    participants: &[Participant],
    questions: &[Question],
    settings: &TournamentSettings,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Participants ({}):", participants.len());
    for p in participants {
        let _ = writeln!(out, "  - {} ({} / {})", p.name, p.provider, p.model);
    }
    let _ = writeln!(out, "Questions ({}):", questions.len());
    for q in questions {
        let _ = writeln!(out, "  {}. [{} / {}] {}", q.id, q.topic, q.difficulty, q.preview(60));
    }
    let _ = write!(
        out,
        "Rounds: {} | points {}/{}/{}/{} | timeout {}s",
        questions.len() * participants.len(),
        settings.points.first_place,
        settings.points.second_place,
        settings.points.third_place,
        settings.points.other_place,
        settings.timeout.as_secs()
    );
    out
}

pub fn render_standings(run: &CompetitionRun) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Final standings:");
    for (i, (name, total)) in run.final_ranking.iter().enumerate() {
        let place = MEDALS
            .get(i)
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("{}.", i + 1));
        let _ = writeln!(out, "  {} {:<20} {:>4}", place, name, total);
    }
    let _ = write!(out, "{}", run.summary_line());
    out
}

/// `arena questions`
pub fn list_questions(topic: Option<&str>, difficulty: Option<Difficulty>) -> Result<String> {
    let bank = QuestionBank::builtin().context("Built-in question bank is malformed")?;
    let mut out = String::new();

    let selected: Vec<&Question> = bank
        .questions()
        .iter()
        .filter(|q| topic.map_or(true, |t| q.topic == t))
        .filter(|q| difficulty.map_or(true, |d| q.difficulty == d))
        .collect();

    for q in &selected {
        let _ = writeln!(out, "{:>3}. [{} / {}] {}", q.id, q.topic, q.difficulty, q.content);
    }

    let stats = bank.statistics();
    let _ = writeln!(out, "\n{} of {} questions shown", selected.len(), stats.total);
    let _ = writeln!(out, "By topic:");
    for (topic, count) in &stats.by_topic {
        let _ = writeln!(out, "  {}: {}", topic, count);
    }
    let _ = write!(out, "By difficulty:");
    for (difficulty, count) in &stats.by_difficulty {
        let _ = write!(out, "\n  {}: {}", difficulty, count);
    }
    Ok(out)
}

/// `arena analyze`
pub fn analyze(path: &Path) -> Result<String> {
    let run = load_run(path).with_context(|| format!("Failed to load results {}", path.display()))?;
    Ok(RunSummary::from_run(&run).render_markdown())
}

/// `arena check-config`
pub fn check_config(path: &Path) -> Result<String> {
    let config = ArenaConfig::load(path)?;
    config.validate().context("Invalid configuration")?;

    let participants = config.participants();
    let settings = config.tournament_settings(None);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} of {} models usable:",
        participants.len(),
        config.models.len()
    );
    for p in &participants {
        let _ = writeln!(out, "  - {} ({} / {}) at {}", p.name, p.provider, p.model, p.base_url);
    }

    match validate_participants(&participants, settings.min_participants) {
        Ok(()) => {
            let _ = write!(out, "Configuration OK");
        }
        Err(e) => {
            let _ = write!(out, "Not ready: {}", e);
        }
    }
    Ok(out)
}
