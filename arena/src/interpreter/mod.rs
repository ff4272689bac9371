//! Judgment interpretation: judge text in, complete ranking out.
//!
//! # Fallback chain
//!
//! ```text
//! raw response
//!   ├─ StructuredParser  (JSON rankings + reasoning)   complete? → done
//!   ├─ FreeTextParser    (numbered lines + markers)     complete? → done
//!   └─ terminal fallback
//!        ├─ best partial parse → append unranked contestants in contestant order
//!        └─ nothing ranked     → uniform shuffle of contestants
//! judge call failed → uniform shuffle of contestants
//! ```
//!
//! The interpreter never fails: whatever the input, the returned ranking
//! names every contestant exactly once.

pub mod free_text;
pub mod structured;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::error::{ParseError, ProviderError};
use crate::prompts::{self, Locale};
use crate::round::{Ranking, RankingSource};

pub use free_text::FreeTextParser;
pub use structured::StructuredParser;

/// What a single dialect managed to read from a response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedJudgment {
    /// Contestants in finishing order with their declared scores. May be
    /// partial or empty.
    pub order: Vec<(String, Option<f64>)>,
    pub reasoning: Option<String>,
}

impl ParsedJudgment {
    /// Drop names that are not contestants and any repeat of a name.
    fn retain_contestants(mut self, contestants: &[String]) -> Self {
        let mut seen: Vec<String> = Vec::with_capacity(self.order.len());
        self.order.retain(|(name, _)| {
            if !contestants.contains(name) || seen.contains(name) {
                return false;
            }
            seen.push(name.clone());
            true
        });
        self
    }

    fn is_complete(&self, contestants: &[String]) -> bool {
        self.order.len() == contestants.len()
    }
}

/// One accepted judge response dialect.
///
/// Names outside `contestants` and repeated names in a returned order are
/// discarded by the interpreter.
pub trait RankingParser: Send + Sync {
    fn name(&self) -> &'static str;

    /// Source recorded when this parser ranks every contestant.
    fn source(&self) -> RankingSource;

    fn parse(&self, raw: &str, contestants: &[String]) -> Result<ParsedJudgment, ParseError>;
}

/// Final reading of a round's judgment.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub ranking: Ranking,
    pub reasoning: String,
    pub source: RankingSource,
}

impl Interpretation {
    pub fn degraded(&self) -> bool {
        self.source.is_fallback()
    }
}

/// Owns the ordered dialect chain and the terminal fallback.
pub struct JudgmentInterpreter {
    parsers: Vec<Box<dyn RankingParser>>,
    locale: Locale,
}

impl JudgmentInterpreter {
    /// Structured dialect first, free text second.
    pub fn new(locale: Locale) -> Self {
        Self::with_parsers(
            vec![Box::new(StructuredParser), Box::new(FreeTextParser)],
            locale,
        )
    }

    pub fn with_parsers(parsers: Vec<Box<dyn RankingParser>>, locale: Locale) -> Self {
        Self { parsers, locale }
    }

    /// Interpret a judge's raw response.
    pub fn interpret<R: Rng + ?Sized>(
        &self,
        raw: &str,
        contestants: &[String],
        rng: &mut R,
    ) -> Interpretation {
        let mut partial: Option<ParsedJudgment> = None;
        let mut reasoning: Option<String> = None;

        for parser in &self.parsers {
            let parsed = parser
                .parse(raw, contestants)
                .map(|p| p.retain_contestants(contestants));
            match parsed {
                Ok(parsed) if parsed.is_complete(contestants) => {
                    debug!(parser = parser.name(), "Judgment parsed");
                    return Interpretation {
                        ranking: Ranking::from_order(parsed.order),
                        reasoning: parsed.reasoning.unwrap_or_else(|| raw.trim().to_string()),
                        source: parser.source(),
                    };
                }
                Ok(parsed) => {
                    debug!(
                        parser = parser.name(),
                        ranked = parsed.order.len(),
                        expected = contestants.len(),
                        "Judgment parsed partially"
                    );
                    if reasoning.is_none() {
                        reasoning = parsed.reasoning.clone();
                    }
                    if partial.is_none() && !parsed.order.is_empty() {
                        partial = Some(parsed);
                    }
                }
                Err(e) => {
                    debug!(parser = parser.name(), error = %e, "Dialect rejected response");
                }
            }
        }

        let reasoning = reasoning.unwrap_or_else(|| raw.trim().to_string());

        match partial {
            Some(parsed) => {
                warn!(
                    ranked = parsed.order.len(),
                    expected = contestants.len(),
                    "Completing partial judgment in contestant order"
                );
                Interpretation {
                    ranking: complete_in_order(parsed.order, contestants),
                    reasoning,
                    source: RankingSource::PartialFallback,
                }
            }
            None => {
                warn!("Judgment unparseable, shuffling contestants");
                Interpretation {
                    ranking: shuffled(contestants, rng),
                    reasoning,
                    source: RankingSource::ShuffledFallback,
                }
            }
        }
    }

    /// Ranking used when the judge could not be reached at all.
    pub fn judge_unavailable<R: Rng + ?Sized>(
        &self,
        error: &ProviderError,
        contestants: &[String],
        rng: &mut R,
    ) -> Interpretation {
        Interpretation {
            ranking: shuffled(contestants, rng),
            reasoning: prompts::judge_failure_reasoning(self.locale, &error.to_string()),
            source: RankingSource::JudgeUnavailable,
        }
    }
}

/// Append every contestant missing from `order`, in contestant order.
fn complete_in_order(mut order: Vec<(String, Option<f64>)>, contestants: &[String]) -> Ranking {
    for contestant in contestants {
        if !order.iter().any(|(name, _)| name == contestant) {
            order.push((contestant.clone(), None));
        }
    }
    Ranking::from_order(order)
}

fn shuffled<R: Rng + ?Sized>(contestants: &[String], rng: &mut R) -> Ranking {
    let mut names = contestants.to_vec();
    names.shuffle(rng);
    Ranking::from_order(names.into_iter().map(|n| (n, None)))
}

/// Slice of `raw` from the first `open` to the last `close`, after
/// stripping a surrounding Markdown code fence.
pub fn extract_json(raw: &str, open: char, close: char) -> Option<&str> {
    let stripped = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let start = stripped.find(open)?;
    let end = stripped.rfind(close)?;
    (start < end).then(|| &stripped[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn interpreter() -> JudgmentInterpreter {
        JudgmentInterpreter::new(Locale::Zh)
    }

    #[test]
    fn test_structured_response_wins() {
        let raw = r#"{"rankings": [{"model_name": "C", "score": 7, "rank": 2}, {"model_name": "B", "score": 9, "rank": 1}], "reasoning": "B is clearer"}"#;
        let mut rng = StdRng::seed_from_u64(0);
        let result = interpreter().interpret(raw, &names(&["B", "C"]), &mut rng);

        assert_eq!(result.source, RankingSource::Structured);
        assert!(!result.degraded());
        assert_eq!(result.ranking.position_of("B"), Some(1));
        assert_eq!(result.ranking.position_of("C"), Some(2));
        assert_eq!(result.reasoning, "B is clearer");
    }

    #[test]
    fn test_free_text_response() {
        let raw = "排名：\n1. B - 清晰\n2. C - 一般\n评价理由：\n内容详实";
        let mut rng = StdRng::seed_from_u64(0);
        let result = interpreter().interpret(raw, &names(&["B", "C"]), &mut rng);

        assert_eq!(result.source, RankingSource::FreeText);
        assert!(!result.degraded());
        let order: Vec<&str> = result.ranking.names().collect();
        assert_eq!(order, vec!["B", "C"]);
        assert_eq!(result.reasoning, "内容详实");
    }

    #[test]
    fn test_partial_free_text_completed_in_contestant_order() {
        let raw = "Rankings:\n1. D is best\nReasoning:\nonly looked at D";
        let mut rng = StdRng::seed_from_u64(0);
        let contestants = names(&["B", "C", "D"]);
        let result = interpreter().interpret(raw, &contestants, &mut rng);

        assert_eq!(result.source, RankingSource::PartialFallback);
        assert!(result.degraded());
        let order: Vec<&str> = result.ranking.names().collect();
        assert_eq!(order, vec!["D", "B", "C"]);
        assert_eq!(result.reasoning, "only looked at D");
        assert!(result.ranking.covers_exactly(&contestants));
    }

    #[test]
    fn test_structured_with_unknown_name_falls_through() {
        // Structured payload names a non-contestant; the free-text pass
        // finds nothing either, so the response is noise.
        let raw = r#"{"rankings": [{"model_name": "Z", "score": 9}], "reasoning": "?"}"#;
        let mut rng = StdRng::seed_from_u64(3);
        let contestants = names(&["B", "C"]);
        let result = interpreter().interpret(raw, &contestants, &mut rng);
        assert_eq!(result.source, RankingSource::ShuffledFallback);
        assert!(result.ranking.covers_exactly(&contestants));
    }

    #[test]
    fn test_noise_is_shuffled_and_kept_as_reasoning() {
        let raw = "  lorem ipsum dolor  ";
        let mut rng = StdRng::seed_from_u64(11);
        let contestants = names(&["B", "C", "D", "E"]);
        let result = interpreter().interpret(raw, &contestants, &mut rng);

        assert_eq!(result.source, RankingSource::ShuffledFallback);
        assert!(result.degraded());
        assert!(result.ranking.covers_exactly(&contestants));
        assert_eq!(result.reasoning, "lorem ipsum dolor");
    }

    #[test]
    fn test_noise_shuffle_is_fair() {
        let contestants = names(&["B", "C"]);
        let interp = interpreter();
        let mut b_first = 0;
        for seed in 0..1000u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = interp.interpret("@@@ ### !!!", &contestants, &mut rng);
            if result.ranking.winner() == Some("B") {
                b_first += 1;
            }
        }
        assert!(
            (430..=570).contains(&b_first),
            "B won {} of 1000 shuffles",
            b_first
        );
    }

    #[test]
    fn test_judge_unavailable_shuffles_and_records_error() {
        let contestants = names(&["B", "C", "D"]);
        let mut rng = StdRng::seed_from_u64(5);
        let err = ProviderError::with_status(401, "bad key");
        let result = interpreter().judge_unavailable(&err, &contestants, &mut rng);

        assert_eq!(result.source, RankingSource::JudgeUnavailable);
        assert!(result.degraded());
        assert!(result.ranking.covers_exactly(&contestants));
        assert!(result.reasoning.contains("bad key"));
    }

    #[test]
    fn test_custom_chain_order() {
        // Free text only: a JSON payload is not understood.
        let interp = JudgmentInterpreter::with_parsers(vec![Box::new(FreeTextParser)], Locale::En);
        let raw = r#"{"rankings": [{"model_name": "B", "score": 9}, {"model_name": "C", "score": 1}]}"#;
        let mut rng = StdRng::seed_from_u64(0);
        let result = interp.interpret(raw, &names(&["B", "C"]), &mut rng);
        assert_eq!(result.source, RankingSource::ShuffledFallback);
    }

    struct Sloppy;

    impl RankingParser for Sloppy {
        fn name(&self) -> &'static str {
            "sloppy"
        }

        fn source(&self) -> RankingSource {
            RankingSource::FreeText
        }

        fn parse(&self, _raw: &str, _contestants: &[String]) -> Result<ParsedJudgment, ParseError> {
            Ok(ParsedJudgment {
                order: vec![
                    ("C".to_string(), None),
                    ("X".to_string(), None),
                    ("C".to_string(), None),
                ],
                reasoning: None,
            })
        }
    }

    #[test]
    fn test_outsiders_and_repeats_discarded() {
        let interp = JudgmentInterpreter::with_parsers(vec![Box::new(Sloppy)], Locale::En);
        let contestants = names(&["B", "C"]);
        let mut rng = StdRng::seed_from_u64(0);
        let result = interp.interpret("whatever", &contestants, &mut rng);

        assert_eq!(result.source, RankingSource::PartialFallback);
        let order: Vec<&str> = result.ranking.names().collect();
        assert_eq!(order, vec!["C", "B"]);
    }

    #[test]
    fn test_extract_json_variants() {
        assert_eq!(extract_json("```json\n{\"a\":1}\n```", '{', '}'), Some("{\"a\":1}"));
        assert_eq!(extract_json("Verdict: {\"a\":1} thanks", '{', '}'), Some("{\"a\":1}"));
        assert_eq!(extract_json("no braces", '{', '}'), None);
        assert_eq!(extract_json("} backwards {", '{', '}'), None);
    }
}
