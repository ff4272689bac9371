//! Free-text dialect: numbered lines under an optional rankings header,
//! followed by a reasoning section.
//!
//! ```text
//! 排名：
//! 1. B - 清晰
//! 2. C - 一般
//! 评价理由：
//! 内容详实
//! ```

use std::sync::LazyLock;

use regex::Regex;

use super::{ParsedJudgment, RankingParser};
use crate::error::ParseError;
use crate::round::RankingSource;

static RANKING_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[\s#*>]*(?:排名|rankings?)[*\s]*[:：]")
        .expect("RANKING_MARKER regex should compile")
});

static REASONING_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[\s#*>]*(?:评价理由|理由|reasoning|rationale)[*\s]*[:：][*\s]*(?P<rest>.*)$")
        .expect("REASONING_MARKER regex should compile")
});

/// Ordinal prefix used by Chinese-language rankings (第一, 第二, ...).
const ORDINAL_MARKER: char = '第';

#[derive(Debug, Clone, Copy, Default)]
pub struct FreeTextParser;

fn is_ranking_line(line: &str) -> bool {
    let body = line.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '#' | '*' | '>'));
    match body.chars().next() {
        Some(c) => c.is_ascii_digit() || ('０'..='９').contains(&c) || c == ORDINAL_MARKER,
        None => false,
    }
}

/// The unranked contestant mentioned earliest in `line`; the longer name
/// wins when two start at the same offset ("gpt-4o" over "gpt-4").
fn first_mentioned<'a>(line: &str, unranked: impl Iterator<Item = &'a String>) -> Option<&'a String> {
    unranked
        .filter_map(|name| line.find(name.as_str()).map(|at| (at, name)))
        .min_by(|(at_a, a), (at_b, b)| at_a.cmp(at_b).then(b.len().cmp(&a.len())))
        .map(|(_, name)| name)
}

impl RankingParser for FreeTextParser {
    fn name(&self) -> &'static str {
        "free_text"
    }

    fn source(&self) -> RankingSource {
        RankingSource::FreeText
    }

    fn parse(&self, raw: &str, contestants: &[String]) -> Result<ParsedJudgment, ParseError> {
        let mut order: Vec<(String, Option<f64>)> = Vec::new();
        let mut reasoning: Option<Vec<&str>> = None;

        for line in raw.lines() {
            if let Some(collected) = reasoning.as_mut() {
                collected.push(line);
                continue;
            }

            if RANKING_MARKER.is_match(line) {
                continue;
            }

            if let Some(caps) = REASONING_MARKER.captures(line) {
                let rest = caps.name("rest").map_or("", |m| m.as_str());
                reasoning = Some(if rest.trim().is_empty() {
                    Vec::new()
                } else {
                    vec![rest]
                });
                continue;
            }

            if !is_ranking_line(line) {
                continue;
            }

            let unranked = contestants
                .iter()
                .filter(|c| !order.iter().any(|(ranked, _)| ranked == *c));
            if let Some(name) = first_mentioned(line, unranked) {
                order.push((name.clone(), None));
            }
        }

        let reasoning = match reasoning {
            Some(lines) => lines.join("\n").trim().to_string(),
            None => raw.trim().to_string(),
        };

        Ok(ParsedJudgment {
            order,
            reasoning: Some(reasoning).filter(|r| !r.is_empty()),
        })
    }
}
