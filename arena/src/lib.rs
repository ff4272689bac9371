//! Peer-judged LLM arena.
//!
//! A fixed field of model participants answers a list of questions. For
//! every question each participant takes one turn as judge and ranks the
//! answers of everyone else; place-based points accumulate into a final
//! standing.
//!
//! # Components
//!
//! - [`provider`]: one prompt in, one text out (`HttpInvoker` speaks the
//!   openai, anthropic, google and dashscope wire formats)
//! - [`collector`]: concurrent answer fan-out with per-contestant isolation
//! - [`interpreter`]: judge text to a complete ranking (structured JSON,
//!   free text, then a fallback that never fails)
//! - [`scoring`] / [`ledger`]: point table and running totals
//! - [`orchestrator`]: judge rotation and the round loop
//! - [`report`]: finalized run records, JSON sink, summary statistics
//! - [`question`]: built-in bank, fallback set and model-generated questions
//!
//! # Usage
//!
//! ```no_run
//! # async fn demo(participants: Vec<arena::Participant>) -> anyhow::Result<()> {
//! use std::sync::Arc;
//! use arena::{HttpInvoker, QuestionBank, Tournament, TournamentSettings};
//!
//! let settings = TournamentSettings::default();
//! let invoker = Arc::new(HttpInvoker::new(settings.timeout)?);
//! let questions = QuestionBank::builtin()?.questions()[..2].to_vec();
//!
//! let tournament = Tournament::new(participants, invoker, settings)?;
//! let run = tournament.run(questions).await?;
//! println!("{}", run.summary_line());
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod error;
pub mod interpreter;
pub mod ledger;
pub mod orchestrator;
pub mod participant;
pub mod prompts;
pub mod provider;
pub mod question;
pub mod report;
pub mod round;
pub mod scoring;

pub use collector::AnswerCollector;
pub use error::{ParseError, ProviderError, SetupError, SinkError};
pub use interpreter::{Interpretation, JudgmentInterpreter, RankingParser};
pub use ledger::ScoreLedger;
pub use orchestrator::{Tournament, TournamentSettings, MIN_PARTICIPANTS};
pub use participant::{Participant, ProviderKind};
pub use prompts::{JudgeFormat, Locale};
pub use provider::{HttpInvoker, InvokeOptions, ProviderInvoker};
pub use question::{fallback_questions, generate_questions, Difficulty, Question, QuestionBank};
pub use report::{load_run, CompetitionRun, JsonFileSink, ReportSink, RunSummary};
pub use round::{AnswerAttempt, AnswerOutcome, JudgmentRound, RankEntry, Ranking, RankingSource};
pub use scoring::PointTable;
