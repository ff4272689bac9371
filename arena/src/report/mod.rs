//! Finalized run records and where they go.
//!
//! A [`CompetitionRun`] is produced once by the orchestrator after the last
//! round and never modified afterwards. Sinks persist it; [`summary`] turns
//! it into per-participant statistics and a Markdown report.

pub mod summary;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::SinkError;
use crate::question::Question;
use crate::round::JudgmentRound;
use crate::scoring::PointTable;

pub use summary::{ParticipantStats, RunSummary, TopicStats};

/// Everything that happened in one tournament run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionRun {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Participant names in rotation order
    pub participants: Vec<String>,
    pub questions: Vec<Question>,
    pub points: PointTable,
    pub rounds: Vec<JudgmentRound>,
    /// `(name, total)` best first, every participant included
    pub final_ranking: Vec<(String, u64)>,
}

impl CompetitionRun {
    pub fn winner(&self) -> Option<&str> {
        self.final_ranking.first().map(|(name, _)| name.as_str())
    }

    pub fn question(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn rounds_for_question(&self, id: u32) -> impl Iterator<Item = &JudgmentRound> {
        self.rounds.iter().filter(move |r| r.question_id == id)
    }

    pub fn degraded_rounds(&self) -> usize {
        self.rounds.iter().filter(|r| r.degraded).count()
    }

    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// Compact summary line.
    pub fn summary_line(&self) -> String {
        format!(
            "run {} | {} participants | {} questions | {} rounds ({} degraded) | winner={}",
            self.run_id,
            self.participants.len(),
            self.questions.len(),
            self.rounds.len(),
            self.degraded_rounds(),
            self.winner().unwrap_or("-"),
        )
    }
}

/// Destination for finalized runs.
pub trait ReportSink {
    fn publish(&self, run: &CompetitionRun) -> Result<(), SinkError>;
}

/// Writes the run as pretty-printed JSON to a single file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `competition_results_<timestamp>.json` inside `dir`.
    pub fn timestamped(dir: impl AsRef<Path>, at: DateTime<Utc>) -> Self {
        let file = format!("competition_results_{}.json", at.format("%Y%m%d_%H%M%S"));
        Self::new(dir.as_ref().join(file))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for JsonFileSink {
    fn publish(&self, run: &CompetitionRun) -> Result<(), SinkError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(run)?;
        std::fs::write(&self.path, json)?;
        info!(path = %self.path.display(), run_id = %run.run_id, "Run saved");
        Ok(())
    }
}

/// Read a run previously written by [`JsonFileSink`].
pub fn load_run(path: impl AsRef<Path>) -> Result<CompetitionRun, SinkError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::question::Difficulty;
    use crate::round::{AnswerAttempt, Ranking, RankingSource};

    fn round(
        round_index: usize,
        question_id: u32,
        judge: &str,
        order: &[&str],
        failed: &[&str],
        source: RankingSource,
    ) -> JudgmentRound {
        let answers = order
            .iter()
            .map(|name| {
                if failed.contains(name) {
                    AnswerAttempt::failed(*name, "timed out", "sorry")
                } else {
                    AnswerAttempt::ok(*name, format!("answer from {}", name))
                }
            })
            .collect();
        let ranking = Ranking::from_order(order.iter().map(|n| (n.to_string(), None)));
        let awarded = crate::scoring::award(&ranking, &PointTable::default());
        JudgmentRound {
            round_index,
            question_id,
            judge: judge.to_string(),
            answers,
            ranking,
            reasoning: "because".to_string(),
            source,
            degraded: source.is_fallback() || !failed.is_empty(),
            awarded,
        }
    }

    /// Two questions, three participants, two degraded rounds.
    pub(crate) fn sample_run() -> CompetitionRun {
        let started_at = Utc::now();
        CompetitionRun {
            run_id: Uuid::new_v4(),
            started_at,
            finished_at: started_at + chrono::Duration::seconds(42),
            participants: vec!["A".into(), "B".into(), "C".into()],
            questions: vec![
                Question::new(1, "Explain ownership", "技术", Difficulty::Medium),
                Question::new(2, "Write a haiku", "创意", Difficulty::Easy),
            ],
            points: PointTable::default(),
            rounds: vec![
                round(0, 1, "A", &["B", "C"], &[], RankingSource::Structured),
                round(1, 1, "B", &["A", "C"], &[], RankingSource::Structured),
                round(2, 1, "C", &["B", "A"], &[], RankingSource::FreeText),
                round(3, 2, "A", &["C", "B"], &[], RankingSource::Structured),
                round(4, 2, "B", &["C", "A"], &["A"], RankingSource::Structured),
                round(5, 2, "C", &["B", "A"], &[], RankingSource::ShuffledFallback),
            ],
            final_ranking: vec![("B".into(), 11), ("C".into(), 10), ("A".into(), 9)],
        }
    }
}
