//! Prompt templates and localized fixed texts.
//!
//! Every text the arena sends to a model or substitutes for a model's
//! output lives here, in both supported locales.

use serde::{Deserialize, Serialize};

use crate::question::{Difficulty, Question};
use crate::round::AnswerAttempt;

/// Language used for prompts and sentinel texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Zh,
    En,
}

/// Response format the judge is asked to produce.
///
/// The interpreter accepts both regardless of what was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeFormat {
    #[default]
    Structured,
    FreeText,
}

/// Content recorded for a contestant whose answer could not be obtained.
pub fn failure_sentinel(locale: Locale) -> &'static str {
    match locale {
        Locale::Zh => "抱歉，我无法回答这个问题。",
        Locale::En => "Sorry, I am unable to answer this question.",
    }
}

pub fn answer_prompt(locale: Locale, question: &Question) -> String {
    match locale {
        Locale::Zh => format!(
            "请回答以下问题：\n\n{}\n\n请提供详细、准确的答案。",
            question.content
        ),
        Locale::En => format!(
            "Please answer the following question:\n\n{}\n\nProvide a detailed and accurate answer.",
            question.content
        ),
    }
}

pub fn judge_prompt(
    locale: Locale,
    format: JudgeFormat,
    question: &Question,
    answers: &[AnswerAttempt],
) -> String {
    match (locale, format) {
        (Locale::Zh, JudgeFormat::Structured) => zh_structured(question, answers),
        (Locale::Zh, JudgeFormat::FreeText) => zh_free_text(question, answers),
        (Locale::En, JudgeFormat::Structured) => en_structured(question, answers),
        (Locale::En, JudgeFormat::FreeText) => en_free_text(question, answers),
    }
}

fn list_answers(answers: &[AnswerAttempt], heading: impl Fn(usize, &str) -> String) -> String {
    answers
        .iter()
        .enumerate()
        .map(|(i, a)| format!("{}\n{}", heading(i + 1, &a.participant), a.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn zh_structured(question: &Question, answers: &[AnswerAttempt]) -> String {
    let answers_text = list_answers(answers, |i, name| format!("答案 {} (来自 {}):", i, name));
    format!(
        r#"作为公正的裁判，请对以下问题的各个答案进行评分和排名。

问题：{question}

答案列表：
{answers_text}

评分标准：
1. 准确性：答案是否正确、准确
2. 完整性：答案是否全面、详细
3. 逻辑性：答案是否逻辑清晰、条理分明
4. 创新性：答案是否有独特见解或创新思路

请按以下JSON格式返回评判结果：
{{
  "rankings": [
    {{"model_name": "模型名称", "score": 分数, "rank": 排名}}
  ],
  "reasoning": "详细的评判理由"
}}

注意：分数范围1-10，排名从1开始（1为最佳）。"#,
        question = question.content,
    )
}

fn zh_free_text(question: &Question, answers: &[AnswerAttempt]) -> String {
    let answers_text = list_answers(answers, |i, name| format!("{}. {}的回答：", i, name));
    format!(
        r#"请作为一个公正的裁判，对以下问题的多个回答进行评价和排名。

问题：{question}

回答：
{answers_text}

请按照以下格式给出评价：

排名：
1. [模型名称] - [简短评价]
2. [模型名称] - [简短评价]
...

评价理由：
[详细说明你的评价标准和理由]

请确保评价公正、客观，考虑回答的准确性、完整性、逻辑性和实用性。"#,
        question = question.content,
    )
}

fn en_structured(question: &Question, answers: &[AnswerAttempt]) -> String {
    let answers_text = list_answers(answers, |i, name| format!("Answer {} (from {}):", i, name));
    format!(
        r#"As an impartial judge, score and rank the following answers to the question.

Question: {question}

Answers:
{answers_text}

Criteria:
1. Accuracy: is the answer correct?
2. Completeness: is it thorough and detailed?
3. Logic: is it clearly reasoned and well structured?
4. Originality: does it offer distinctive insight?

Reply with JSON in exactly this shape:
{{
  "rankings": [
    {{"model_name": "name", "score": score, "rank": rank}}
  ],
  "reasoning": "detailed justification"
}}

Scores range from 1 to 10; rank 1 is the best."#,
        question = question.content,
    )
}

fn en_free_text(question: &Question, answers: &[AnswerAttempt]) -> String {
    let answers_text = list_answers(answers, |i, name| format!("{}. Answer from {}:", i, name));
    format!(
        r#"As an impartial judge, evaluate and rank the following answers.

Question: {question}

Answers:
{answers_text}

Use this format:

Rankings:
1. [model name] - [short comment]
2. [model name] - [short comment]
...

Reasoning:
[your criteria and justification]"#,
        question = question.content,
    )
}

pub fn generation_prompt(
    locale: Locale,
    count: usize,
    difficulty: Difficulty,
    topics: &[String],
) -> String {
    match locale {
        Locale::Zh => format!(
            r#"请生成 {count} 个用于大模型竞技的问题。

要求：
- 难度等级：{difficulty}
- 涵盖主题：{topics}
- 每个问题应该有一定的挑战性，能够区分不同模型的能力
- 问题应该客观、公平，便于评判

请按以下JSON格式返回：
[
  {{
    "content": "问题内容",
    "topic": "问题主题",
    "difficulty": "难度等级"
  }}
]"#,
            topics = topics.join(", "),
        ),
        Locale::En => format!(
            r#"Generate {count} questions for a language model competition.

Requirements:
- Difficulty: {difficulty}
- Topics: {topics}
- Each question should be challenging enough to separate strong models from weak ones
- Questions must be objective and fair to judge

Reply with a JSON array:
[
  {{
    "content": "question text",
    "topic": "topic",
    "difficulty": "easy|medium|hard"
  }}
]"#,
            topics = topics.join(", "),
        ),
    }
}

/// Reasoning recorded when the judge call itself failed.
pub fn judge_failure_reasoning(locale: Locale, error: &str) -> String {
    match locale {
        Locale::Zh => format!("裁判评价失败: {}，使用随机排名", error),
        Locale::En => format!("Judge call failed: {}; positions assigned at random", error),
    }
}
