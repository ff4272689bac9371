//! Tournament orchestrator: drives question × judge rotation end to end.
//!
//! ```text
//! for question in questions:
//!   for k in 0..N:
//!     judge       = participants[k]
//!     contestants = participants \ {judge}      (original order)
//!     answers     = AnswerCollector::collect     (concurrent, isolated)
//!     raw         = judge.invoke(judge_prompt)   (bounded by timeout)
//!     ranking     = JudgmentInterpreter          (never fails)
//!     ledger.apply(award(ranking))
//! final_ranking = stable sort of ledger by total, desc
//! ```
//!
//! Rounds run strictly one after another. Only validation can stop a run;
//! every failure after the first round starts degrades that round instead.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::collector::{invoke_with_timeout, AnswerCollector};
use crate::error::SetupError;
use crate::interpreter::JudgmentInterpreter;
use crate::ledger::ScoreLedger;
use crate::participant::Participant;
use crate::prompts::{self, JudgeFormat, Locale};
use crate::provider::{InvokeOptions, ProviderInvoker};
use crate::question::Question;
use crate::report::CompetitionRun;
use crate::round::JudgmentRound;
use crate::scoring::{self, PointTable};

/// Fewest participants a tournament accepts, whatever the configuration says.
pub const MIN_PARTICIPANTS: usize = 3;

/// Per-call timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Knobs for a single run.
#[derive(Debug, Clone)]
pub struct TournamentSettings {
    /// Raised to [`MIN_PARTICIPANTS`] when lower.
    pub min_participants: usize,
    pub points: PointTable,
    /// Budget for every provider call, answers and judgments alike.
    pub timeout: Duration,
    pub options: InvokeOptions,
    pub locale: Locale,
    pub judge_format: JudgeFormat,
    /// Seed for fallback shuffles; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for TournamentSettings {
    fn default() -> Self {
        Self {
            min_participants: MIN_PARTICIPANTS,
            points: PointTable::default(),
            timeout: DEFAULT_TIMEOUT,
            options: InvokeOptions::default(),
            locale: Locale::default(),
            judge_format: JudgeFormat::default(),
            seed: None,
        }
    }
}

impl TournamentSettings {
    pub fn effective_min_participants(&self) -> usize {
        self.min_participants.max(MIN_PARTICIPANTS)
    }
}

/// Check a participant list before any round runs.
pub fn validate_participants(
    participants: &[Participant],
    min_participants: usize,
) -> Result<(), SetupError> {
    let need = min_participants.max(MIN_PARTICIPANTS);
    if participants.len() < need {
        return Err(SetupError::InsufficientParticipants {
            got: participants.len(),
            need,
        });
    }

    let mut seen = HashSet::with_capacity(participants.len());
    for p in participants {
        if p.name.trim().is_empty() {
            return Err(SetupError::EmptyParticipantName);
        }
        // Judges' replies are matched against exact names after trimming
        if p.name.trim() != p.name {
            return Err(SetupError::UntrimmedParticipantName(p.name.clone()));
        }
        if !seen.insert(p.name.as_str()) {
            return Err(SetupError::DuplicateParticipant(p.name.clone()));
        }
    }
    Ok(())
}

/// A validated field of participants ready to play.
pub struct Tournament {
    participants: Vec<Arc<Participant>>,
    invoker: Arc<dyn ProviderInvoker>,
    interpreter: JudgmentInterpreter,
    settings: TournamentSettings,
}

impl Tournament {
    pub fn new(
        participants: Vec<Participant>,
        invoker: Arc<dyn ProviderInvoker>,
        settings: TournamentSettings,
    ) -> Result<Self, SetupError> {
        validate_participants(&participants, settings.min_participants)?;
        Ok(Self {
            participants: participants.into_iter().map(Arc::new).collect(),
            invoker,
            interpreter: JudgmentInterpreter::new(settings.locale),
            settings,
        })
    }

    /// Replace the default dialect chain.
    pub fn with_interpreter(mut self, interpreter: JudgmentInterpreter) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn participant_names(&self) -> Vec<String> {
        self.participants.iter().map(|p| p.name.clone()).collect()
    }

    pub fn settings(&self) -> &TournamentSettings {
        &self.settings
    }

    /// Judge for global round `k`.
    pub fn judge_for_round(&self, k: usize) -> &Participant {
        &self.participants[k % self.participants.len()]
    }

    /// Play every question with every judge and return the finalized run.
    pub async fn run(&self, questions: Vec<Question>) -> Result<CompetitionRun, SetupError> {
        if questions.is_empty() {
            return Err(SetupError::NoQuestions);
        }

        let started_at = Utc::now();
        let run_id = Uuid::new_v4();
        let names = self.participant_names();
        let n = self.participants.len();

        let mut rng = match self.settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut ledger = ScoreLedger::with_participants(names.iter().map(String::as_str));
        let mut rounds: Vec<JudgmentRound> = Vec::with_capacity(questions.len() * n);

        let collector = AnswerCollector::new(
            self.invoker.clone(),
            self.settings.options,
            self.settings.timeout,
            self.settings.locale,
        );

        info!(
            %run_id,
            participants = n,
            questions = questions.len(),
            rounds = questions.len() * n,
            "Tournament starting"
        );

        for (q_index, question) in questions.iter().enumerate() {
            info!(
                question_id = question.id,
                topic = %question.topic,
                difficulty = %question.difficulty,
                "Question {}/{}: {}",
                q_index + 1,
                questions.len(),
                question.preview(50)
            );

            for judge_index in 0..n {
                let round_index = rounds.len();
                let round = self
                    .play_round(&collector, question, round_index, judge_index, &mut rng)
                    .await;
                ledger.apply(&round.awarded);

                info!(
                    round = round_index,
                    judge = %round.judge,
                    winner = round.ranking.winner().unwrap_or("-"),
                    source = %round.source,
                    degraded = round.degraded,
                    "Round complete"
                );
                rounds.push(round);
            }
        }

        let final_ranking = scoring::final_standings(&ledger.snapshot(), &names);
        let run = CompetitionRun {
            run_id,
            started_at,
            finished_at: Utc::now(),
            participants: names,
            questions,
            points: self.settings.points,
            rounds,
            final_ranking,
        };

        info!(
            %run_id,
            winner = run.winner().unwrap_or("-"),
            degraded_rounds = run.degraded_rounds(),
            "Tournament finished"
        );
        Ok(run)
    }

    async fn play_round(
        &self,
        collector: &AnswerCollector,
        question: &Question,
        round_index: usize,
        judge_index: usize,
        rng: &mut StdRng,
    ) -> JudgmentRound {
        let judge = &self.participants[judge_index];
        let contestants: Vec<Arc<Participant>> = self
            .participants
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != judge_index)
            .map(|(_, p)| p.clone())
            .collect();
        let contestant_names: Vec<String> = contestants.iter().map(|p| p.name.clone()).collect();

        debug!(round = round_index, judge = %judge.name, contestants = ?contestant_names, "Round starting");

        let answers = collector.collect(question, &contestants).await;

        let prompt = prompts::judge_prompt(
            self.settings.locale,
            self.settings.judge_format,
            question,
            &answers,
        );
        let judged = invoke_with_timeout(
            self.invoker.as_ref(),
            judge,
            &prompt,
            &self.settings.options,
            self.settings.timeout,
        )
        .await;

        let interpretation = match judged {
            Ok(raw) => self.interpreter.interpret(&raw, &contestant_names, rng),
            Err(e) => {
                warn!(judge = %judge.name, error = %e, "Judge call failed, shuffling contestants");
                self.interpreter
                    .judge_unavailable(&e, &contestant_names, rng)
            }
        };

        let failed_answers = answers.iter().filter(|a| a.is_failed()).count();
        let degraded = interpretation.degraded() || failed_answers > 0;
        let awarded = scoring::award(&interpretation.ranking, &self.settings.points);

        JudgmentRound {
            round_index,
            question_id: question.id,
            judge: judge.name.clone(),
            answers,
            ranking: interpretation.ranking,
            reasoning: interpretation.reasoning,
            source: interpretation.source,
            degraded,
            awarded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::ProviderKind;

    fn field(names: &[&str]) -> Vec<Participant> {
        names
            .iter()
            .map(|n| Participant::new(*n, ProviderKind::Openai, "m", "k"))
            .collect()
    }

    #[test]
    fn test_validate_enforces_floor_of_three() {
        assert_eq!(
            validate_participants(&field(&["A", "B"]), 2),
            Err(SetupError::InsufficientParticipants { got: 2, need: 3 })
        );
        assert_eq!(
            validate_participants(&field(&["A", "B", "C"]), 4),
            Err(SetupError::InsufficientParticipants { got: 3, need: 4 })
        );
        assert!(validate_participants(&field(&["A", "B", "C"]), 0).is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicates_and_blank_names() {
        assert_eq!(
            validate_participants(&field(&["A", "B", "A"]), 3),
            Err(SetupError::DuplicateParticipant("A".to_string()))
        );
        assert_eq!(
            validate_participants(&field(&["A", " ", "C"]), 3),
            Err(SetupError::EmptyParticipantName)
        );
    }

    #[test]
    fn test_validate_rejects_padded_names() {
        assert_eq!(
            validate_participants(&field(&["A", "B ", "C"]), 3),
            Err(SetupError::UntrimmedParticipantName("B ".to_string()))
        );
        assert_eq!(
            validate_participants(&field(&["\tA", "B", "C"]), 3),
            Err(SetupError::UntrimmedParticipantName("\tA".to_string()))
        );
    }

    #[test]
    fn test_effective_minimum() {
        let settings = TournamentSettings {
            min_participants: 1,
            ..Default::default()
        };
        assert_eq!(settings.effective_min_participants(), 3);
    }
}
