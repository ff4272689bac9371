//! Structured dialect: a JSON object with `rankings` and `reasoning`.
//!
//! ```json
//! {"rankings": [{"model_name": "B", "score": 9, "rank": 1}], "reasoning": "..."}
//! ```
//!
//! Declared scores are authoritative. The `rank` field is accepted but
//! ignored; order is score descending, ties by contestant order.

use serde::{Deserialize, Deserializer};

use super::{extract_json, ParsedJudgment, RankingParser};
use crate::error::ParseError;
use crate::round::RankingSource;

#[derive(Debug, Deserialize)]
struct Verdict {
    rankings: Vec<VerdictEntry>,
    #[serde(default)]
    reasoning: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerdictEntry {
    #[serde(alias = "model", alias = "name")]
    model_name: String,
    #[serde(deserialize_with = "lenient_score")]
    score: f64,
}

/// Accept `9`, `8.5` and `"9"`.
fn lenient_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom("score out of range")),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("score is not numeric: {}", s))),
        other => Err(D::Error::custom(format!("invalid score: {}", other))),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredParser;

impl RankingParser for StructuredParser {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn source(&self) -> RankingSource {
        RankingSource::Structured
    }

    fn parse(&self, raw: &str, contestants: &[String]) -> Result<ParsedJudgment, ParseError> {
        let json = extract_json(raw, '{', '}').ok_or(ParseError::NotFound("JSON object"))?;
        let verdict: Verdict =
            serde_json::from_str(json).map_err(|e| ParseError::Malformed(e.to_string()))?;

        let mut scored: Vec<(usize, String, f64)> = Vec::with_capacity(verdict.rankings.len());
        for entry in verdict.rankings {
            let name = entry.model_name.trim();
            let index = contestants
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| ParseError::UnknownContestant(name.to_string()))?;
            if scored.iter().any(|(i, _, _)| *i == index) {
                return Err(ParseError::DuplicateContestant(name.to_string()));
            }
            scored.push((index, contestants[index].clone(), entry.score));
        }

        if scored.is_empty() {
            return Err(ParseError::Empty);
        }

        scored.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.0.cmp(&b.0)));

        Ok(ParsedJudgment {
            order: scored
                .into_iter()
                .map(|(_, name, score)| (name, Some(score)))
                .collect(),
            reasoning: verdict
                .reasoning
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
        })
    }
}
