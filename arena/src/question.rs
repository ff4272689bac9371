//! Question supply: the built-in bank, sampling, and model-generated questions.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::collector::invoke_with_timeout;
use crate::error::ParseError;
use crate::interpreter::extract_json;
use crate::participant::Participant;
use crate::prompts::{self, Locale};
use crate::provider::{InvokeOptions, ProviderInvoker};

const BUILTIN_BANK: &str = include_str!("../data/questions.toml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "简单" => Ok(Self::Easy),
            "medium" | "中等" => Ok(Self::Medium),
            "hard" | "困难" => Ok(Self::Hard),
            other => Err(format!("unknown difficulty: {}", other)),
        }
    }
}

/// A prompt posed to every contestant in a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Caller-assigned, unique within a run
    pub id: u32,
    pub content: String,
    pub topic: String,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expected_skills: Vec<String>,
}

impl Question {
    pub fn new(
        id: u32,
        content: impl Into<String>,
        topic: impl Into<String>,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            id,
            content: content.into(),
            topic: topic.into(),
            difficulty,
            expected_skills: Vec::new(),
        }
    }

    /// First `max_chars` characters of the content, for log lines.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut preview: String = self.content.chars().take(max_chars).collect();
        if self.content.chars().count() > max_chars {
            preview.push_str("...");
        }
        preview
    }
}

#[derive(Debug, Deserialize)]
struct BankFile {
    questions: Vec<Question>,
}

/// Counts by topic and difficulty.
#[derive(Debug, Clone, Serialize)]
pub struct BankStatistics {
    pub total: usize,
    pub by_topic: BTreeMap<String, usize>,
    pub by_difficulty: BTreeMap<Difficulty, usize>,
}

/// Fixed collection of predefined questions.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Load the bank embedded in the crate.
    pub fn builtin() -> Result<Self, toml::de::Error> {
        Self::from_toml(BUILTIN_BANK)
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        let file: BankFile = toml::from_str(raw)?;
        Ok(Self {
            questions: file.questions,
        })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn by_topic(&self, topic: &str) -> Vec<&Question> {
        self.questions.iter().filter(|q| q.topic == topic).collect()
    }

    pub fn by_difficulty(&self, difficulty: Difficulty) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| q.difficulty == difficulty)
            .collect()
    }

    pub fn get(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Topics in first-seen order.
    pub fn topics(&self) -> Vec<&str> {
        let mut topics: Vec<&str> = Vec::new();
        for q in &self.questions {
            if !topics.contains(&q.topic.as_str()) {
                topics.push(&q.topic);
            }
        }
        topics
    }

    /// Add a question, assigning it the next free id.
    pub fn add(&mut self, mut question: Question) -> u32 {
        let next_id = self.questions.iter().map(|q| q.id).max().unwrap_or(0) + 1;
        question.id = next_id;
        self.questions.push(question);
        next_id
    }

    /// Sample up to `count` questions matching the filters.
    ///
    /// Returns every match (in bank order) when fewer than `count` exist.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        count: usize,
        topics: &[String],
        difficulty: Option<Difficulty>,
        rng: &mut R,
    ) -> Vec<Question> {
        let filtered: Vec<&Question> = self
            .questions
            .iter()
            .filter(|q| topics.is_empty() || topics.contains(&q.topic))
            .filter(|q| difficulty.map_or(true, |d| q.difficulty == d))
            .collect();

        if filtered.len() <= count {
            return filtered.into_iter().cloned().collect();
        }

        filtered
            .choose_multiple(rng, count)
            .map(|q| (*q).clone())
            .collect()
    }

    pub fn statistics(&self) -> BankStatistics {
        let mut by_topic = BTreeMap::new();
        let mut by_difficulty = BTreeMap::new();
        for q in &self.questions {
            *by_topic.entry(q.topic.clone()).or_insert(0) += 1;
            *by_difficulty.entry(q.difficulty).or_insert(0) += 1;
        }
        BankStatistics {
            total: self.questions.len(),
            by_topic,
            by_difficulty,
        }
    }
}

/// Questions used when neither the bank nor generation yields any.
pub fn fallback_questions() -> Vec<Question> {
    vec![
        Question::new(
            1,
            "请解释量子计算的基本原理，并说明它与经典计算的主要区别。",
            "科学技术",
            Difficulty::Medium,
        ),
        Question::new(
            2,
            "如果你是一家初创公司的CEO，面临资金短缺的困境，你会采取哪些策略来解决这个问题？",
            "商业管理",
            Difficulty::Medium,
        ),
        Question::new(
            3,
            "编写一个Python函数，实现快速排序算法，并分析其时间复杂度。",
            "编程算法",
            Difficulty::Medium,
        ),
        Question::new(
            4,
            "分析莎士比亚《哈姆雷特》中'生存还是毁灭'这句话的深层含义。",
            "文学艺术",
            Difficulty::Hard,
        ),
        Question::new(
            5,
            "设计一个可持续发展的城市交通系统，考虑环保、效率和成本因素。",
            "创新设计",
            Difficulty::Hard,
        ),
    ]
}

#[derive(Debug, Deserialize)]
struct GeneratedQuestion {
    content: String,
    #[serde(default)]
    topic: String,
    #[serde(default)]
    difficulty: Option<String>,
}

/// Parse a generator model's reply into questions with ids `1..=n`.
///
/// Entries with empty content are dropped; unknown difficulty labels fall
/// back to `default_difficulty`.
pub fn parse_generated_questions(
    raw: &str,
    default_difficulty: Difficulty,
) -> Result<Vec<Question>, ParseError> {
    let json = extract_json(raw, '[', ']').ok_or(ParseError::NotFound("JSON array"))?;
    let generated: Vec<GeneratedQuestion> =
        serde_json::from_str(json).map_err(|e| ParseError::Malformed(e.to_string()))?;

    let questions: Vec<Question> = generated
        .into_iter()
        .filter(|g| !g.content.trim().is_empty())
        .enumerate()
        .map(|(i, g)| {
            let difficulty = g
                .difficulty
                .as_deref()
                .and_then(|d| d.parse().ok())
                .unwrap_or(default_difficulty);
            Question::new(i as u32 + 1, g.content.trim(), g.topic.trim(), difficulty)
        })
        .collect();

    if questions.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(questions)
}

/// Ask `generator` for `count` questions, falling back to
/// [`fallback_questions`] on any provider or parse failure, including a
/// reply that does not arrive within `timeout`.
#[allow(clippy::too_many_arguments)]
pub async fn generate_questions(
    invoker: &dyn ProviderInvoker,
    generator: &Participant,
    options: &InvokeOptions,
    timeout: Duration,
    locale: Locale,
    count: usize,
    difficulty: Difficulty,
    topics: &[String],
) -> Vec<Question> {
    let prompt = prompts::generation_prompt(locale, count, difficulty, topics);
    info!(generator = %generator.name, count, "Generating questions");

    let raw = match invoke_with_timeout(invoker, generator, &prompt, options, timeout).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(generator = %generator.name, error = %e, "Question generation failed, using fallback questions");
            return fallback_questions();
        }
    };

    match parse_generated_questions(&raw, difficulty) {
        Ok(mut questions) => {
            questions.truncate(count.max(1));
            info!(count = questions.len(), "Generated questions ready");
            questions
        }
        Err(e) => {
            warn!(error = %e, "Generated questions unusable, using fallback questions");
            fallback_questions()
        }
    }
}
