//! Per-round records: answers, rankings, and the judgment round itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a contestant's answer was actually produced by its provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum AnswerOutcome {
    Ok,
    Failed(String),
}

/// One contestant's answer for one round. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerAttempt {
    pub participant: String,
    /// Provider text, or the localized sentinel when the call failed
    pub content: String,
    pub produced_at: DateTime<Utc>,
    pub outcome: AnswerOutcome,
}

impl AnswerAttempt {
    pub fn ok(participant: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            participant: participant.into(),
            content: content.into(),
            produced_at: Utc::now(),
            outcome: AnswerOutcome::Ok,
        }
    }

    pub fn failed(
        participant: impl Into<String>,
        reason: impl Into<String>,
        sentinel: impl Into<String>,
    ) -> Self {
        Self {
            participant: participant.into(),
            content: sentinel.into(),
            produced_at: Utc::now(),
            outcome: AnswerOutcome::Failed(reason.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, AnswerOutcome::Failed(_))
    }
}

/// A single placed contestant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub participant: String,
    /// 1-based finishing position
    pub position: u32,
    /// Score declared by the judge, when the response carried one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Total order over a round's contestants, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    entries: Vec<RankEntry>,
}

impl Ranking {
    /// Build from names in finishing order; positions are assigned `1..=n`.
    pub fn from_order<I>(order: I) -> Self
    where
        I: IntoIterator<Item = (String, Option<f64>)>,
    {
        let entries = order
            .into_iter()
            .enumerate()
            .map(|(i, (participant, score))| RankEntry {
                participant,
                position: i as u32 + 1,
                score,
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[RankEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.participant.as_str())
    }

    pub fn position_of(&self, participant: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.participant == participant)
            .map(|e| e.position)
    }

    pub fn winner(&self) -> Option<&str> {
        self.entries.first().map(|e| e.participant.as_str())
    }

    /// True when the ranking names every contestant exactly once and nobody else.
    pub fn covers_exactly(&self, contestants: &[String]) -> bool {
        self.entries.len() == contestants.len()
            && contestants
                .iter()
                .all(|c| self.entries.iter().filter(|e| &e.participant == c).count() == 1)
    }
}

/// Which path produced a round's ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingSource {
    /// JSON rankings covering every contestant
    Structured,
    /// Numbered-line rankings covering every contestant
    FreeText,
    /// A partial parse completed in contestant order
    PartialFallback,
    /// Nothing usable in the response; contestants shuffled
    ShuffledFallback,
    /// The judge call failed; contestants shuffled
    JudgeUnavailable,
}

impl RankingSource {
    /// Whether the terminal fallback contributed any position.
    pub fn is_fallback(&self) -> bool {
        !matches!(self, Self::Structured | Self::FreeText)
    }
}

impl std::fmt::Display for RankingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Structured => write!(f, "structured"),
            Self::FreeText => write!(f, "free_text"),
            Self::PartialFallback => write!(f, "partial_fallback"),
            Self::ShuffledFallback => write!(f, "shuffled_fallback"),
            Self::JudgeUnavailable => write!(f, "judge_unavailable"),
        }
    }
}

/// Complete record of one (question, judge) round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgmentRound {
    /// Global round counter across the run, starting at 0
    pub round_index: usize,
    pub question_id: u32,
    pub judge: String,
    pub answers: Vec<AnswerAttempt>,
    pub ranking: Ranking,
    pub reasoning: String,
    pub source: RankingSource,
    /// Set when any fallback path was taken in this round
    pub degraded: bool,
    /// Points awarded in this round, in ranking order
    pub awarded: Vec<(String, u32)>,
}

impl JudgmentRound {
    pub fn failed_answers(&self) -> usize {
        self.answers.iter().filter(|a| a.is_failed()).count()
    }

    pub fn points_for(&self, participant: &str) -> Option<u32> {
        self.awarded
            .iter()
            .find(|(name, _)| name == participant)
            .map(|(_, points)| *points)
    }
}
