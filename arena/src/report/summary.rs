//! Post-run statistics and the Markdown report.

use std::fmt::Write as _;

use serde::Serialize;

use super::CompetitionRun;

/// Place markers for the top three.
pub const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

/// How one participant fared across the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantStats {
    pub name: String,
    pub total: u64,
    /// Rounds in which this participant was a contestant
    pub rounds_contested: usize,
    pub mean_points: f64,
    pub first_places: usize,
    pub failed_answers: usize,
    /// Up to two topics with the highest mean points
    pub strongest_topics: Vec<String>,
    pub rounds_judged: usize,
    /// Judged rounds that needed a fallback
    pub degraded_as_judge: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicStats {
    pub topic: String,
    pub rounds: usize,
    /// Highest points collected within the topic; ties go to the earlier participant
    pub best_participant: Option<String>,
    pub best_points: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub participant_count: usize,
    pub question_count: usize,
    pub round_count: usize,
    pub degraded_rounds: usize,
    pub duration_secs: f64,
    /// In final ranking order
    pub participants: Vec<ParticipantStats>,
    /// In order of first appearance among the questions
    pub topics: Vec<TopicStats>,
}

impl RunSummary {
    pub fn from_run(run: &CompetitionRun) -> Self {
        let topics = topic_order(run);

        let participants = run
            .final_ranking
            .iter()
            .map(|(name, total)| participant_stats(run, &topics, name, *total))
            .collect();

        let topic_stats = topics
            .iter()
            .map(|topic| topic_stats(run, topic))
            .collect();

        Self {
            participant_count: run.participants.len(),
            question_count: run.questions.len(),
            round_count: run.rounds.len(),
            degraded_rounds: run.degraded_rounds(),
            duration_secs: run.duration_secs(),
            participants,
            topics: topic_stats,
        }
    }

    pub fn render_markdown(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "# Competition Report\n");
        let _ = writeln!(out, "## Overview\n");
        let _ = writeln!(out, "- Participants: {}", self.participant_count);
        let _ = writeln!(out, "- Questions: {}", self.question_count);
        let _ = writeln!(
            out,
            "- Rounds: {} ({} degraded)",
            self.round_count, self.degraded_rounds
        );
        let _ = writeln!(out, "- Duration: {:.1}s\n", self.duration_secs);

        let _ = writeln!(out, "## Final Standings\n");
        let _ = writeln!(out, "| Place | Participant | Total | Mean | Wins | Failed answers |");
        let _ = writeln!(out, "|---|---|---|---|---|---|");
        for (i, p) in self.participants.iter().enumerate() {
            let place = MEDALS
                .get(i)
                .map(|m| m.to_string())
                .unwrap_or_else(|| (i + 1).to_string());
            let _ = writeln!(
                out,
                "| {} | {} | {} | {:.2} | {} | {} |",
                place, p.name, p.total, p.mean_points, p.first_places, p.failed_answers
            );
        }

        let _ = writeln!(out, "\n## Participants\n");
        for p in &self.participants {
            let strongest = if p.strongest_topics.is_empty() {
                "-".to_string()
            } else {
                p.strongest_topics.join(", ")
            };
            let _ = writeln!(out, "### {}\n", p.name);
            let _ = writeln!(out, "- Rounds contested: {}", p.rounds_contested);
            let _ = writeln!(out, "- Strongest topics: {}", strongest);
            let _ = writeln!(
                out,
                "- Rounds judged: {} ({} degraded)\n",
                p.rounds_judged, p.degraded_as_judge
            );
        }

        if !self.topics.is_empty() {
            let _ = writeln!(out, "## Topics\n");
            let _ = writeln!(out, "| Topic | Rounds | Best | Points |");
            let _ = writeln!(out, "|---|---|---|---|");
            for t in &self.topics {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} |",
                    t.topic,
                    t.rounds,
                    t.best_participant.as_deref().unwrap_or("-"),
                    t.best_points
                );
            }
        }

        out
    }
}

fn topic_order(run: &CompetitionRun) -> Vec<String> {
    let mut topics: Vec<String> = Vec::new();
    for q in &run.questions {
        if !topics.contains(&q.topic) {
            topics.push(q.topic.clone());
        }
    }
    topics
}

fn topic_of(run: &CompetitionRun, question_id: u32) -> Option<&str> {
    run.question(question_id).map(|q| q.topic.as_str())
}

fn participant_stats(
    run: &CompetitionRun,
    topics: &[String],
    name: &str,
    total: u64,
) -> ParticipantStats {
    let mut rounds_contested = 0;
    let mut awarded_sum = 0u64;
    let mut first_places = 0;
    let mut failed_answers = 0;
    let mut per_topic: Vec<(u64, usize)> = vec![(0, 0); topics.len()];

    for round in &run.rounds {
        let Some(points) = round.points_for(name).map(u64::from) else {
            continue;
        };
        rounds_contested += 1;
        awarded_sum += points;
        if round.ranking.winner() == Some(name) {
            first_places += 1;
        }
        if round
            .answers
            .iter()
            .any(|a| a.participant == name && a.is_failed())
        {
            failed_answers += 1;
        }
        if let Some(i) = topic_of(run, round.question_id)
            .and_then(|t| topics.iter().position(|known| known == t))
        {
            per_topic[i].0 += points;
            per_topic[i].1 += 1;
        }
    }

    let mut topic_means: Vec<(usize, f64)> = per_topic
        .iter()
        .enumerate()
        .filter(|(_, (_, count))| *count > 0)
        .map(|(i, (sum, count))| (i, *sum as f64 / *count as f64))
        .collect();
    topic_means.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let judged: Vec<_> = run.rounds.iter().filter(|r| r.judge == name).collect();

    ParticipantStats {
        name: name.to_string(),
        total,
        rounds_contested,
        mean_points: if rounds_contested == 0 {
            0.0
        } else {
            awarded_sum as f64 / rounds_contested as f64
        },
        first_places,
        failed_answers,
        strongest_topics: topic_means
            .into_iter()
            .take(2)
            .map(|(i, _)| topics[i].clone())
            .collect(),
        rounds_judged: judged.len(),
        degraded_as_judge: judged.iter().filter(|r| r.degraded).count(),
    }
}

fn topic_stats(run: &CompetitionRun, topic: &str) -> TopicStats {
    let rounds: Vec<_> = run
        .rounds
        .iter()
        .filter(|r| topic_of(run, r.question_id) == Some(topic))
        .collect();

    let mut best: Option<(&str, u64)> = None;
    for name in &run.participants {
        let points: u64 = rounds
            .iter()
            .filter_map(|r| r.points_for(name))
            .map(u64::from)
            .sum();
        if best.map_or(true, |(_, top)| points > top) {
            best = Some((name.as_str(), points));
        }
    }

    TopicStats {
        topic: topic.to_string(),
        rounds: rounds.len(),
        best_participant: best.map(|(name, _)| name.to_string()),
        best_points: best.map_or(0, |(_, points)| points),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::sample_run;

    fn stats<'a>(summary: &'a RunSummary, name: &str) -> &'a ParticipantStats {
        summary
            .participants
            .iter()
            .find(|p| p.name == name)
            .unwrap()
    }

    #[test]
    fn test_overview_counts() {
        let summary = RunSummary::from_run(&sample_run());
        assert_eq!(summary.participant_count, 3);
        assert_eq!(summary.question_count, 2);
        assert_eq!(summary.round_count, 6);
        assert_eq!(summary.degraded_rounds, 2);
        let order: Vec<&str> = summary.participants.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_participant_stats() {
        let summary = RunSummary::from_run(&sample_run());

        let b = stats(&summary, "B");
        assert_eq!(b.total, 11);
        assert_eq!(b.rounds_contested, 4);
        assert_eq!(b.first_places, 3);
        assert!((b.mean_points - 2.75).abs() < 1e-9);
        assert_eq!(b.rounds_judged, 2);
        assert_eq!(b.degraded_as_judge, 1);
        // 技术: 3 + 3 over two rounds, 创意: 2 + 3 over two rounds
        assert_eq!(b.strongest_topics, vec!["技术".to_string(), "创意".to_string()]);

        let a = stats(&summary, "A");
        assert_eq!(a.failed_answers, 1);
        assert_eq!(a.first_places, 1);
    }

    #[test]
    fn test_topic_stats() {
        let summary = RunSummary::from_run(&sample_run());
        assert_eq!(summary.topics.len(), 2);

        let tech = &summary.topics[0];
        assert_eq!(tech.topic, "技术");
        assert_eq!(tech.rounds, 3);
        // A: 3 + 2 = 5, B: 3 + 3 = 6, C: 2 + 2 = 4
        assert_eq!(tech.best_participant.as_deref(), Some("B"));
        assert_eq!(tech.best_points, 6);

        let creative = &summary.topics[1];
        // A: 2 + 2 = 4, B: 2 + 3 = 5, C: 3 + 3 = 6
        assert_eq!(creative.best_participant.as_deref(), Some("C"));
    }

    #[test]
    fn test_markdown_has_medals_and_sections() {
        let md = RunSummary::from_run(&sample_run()).render_markdown();
        assert!(md.contains("# Competition Report"));
        assert!(md.contains("| 🥇 | B | 11 |"));
        assert!(md.contains("| 🥈 | C | 10 |"));
        assert!(md.contains("| 🥉 | A | 9 |"));
        assert!(md.contains("## Topics"));
        assert!(md.contains("Rounds: 6 (2 degraded)"));
    }

    #[test]
    fn test_large_awards_do_not_overflow() {
        let mut run = sample_run();
        for round in &mut run.rounds {
            for (name, points) in &mut round.awarded {
                if name == "B" {
                    *points = u32::MAX;
                }
            }
        }
        run.final_ranking[0].1 = 4 * u64::from(u32::MAX);

        let summary = RunSummary::from_run(&run);
        let b = stats(&summary, "B");
        assert_eq!(b.total, 4 * u64::from(u32::MAX));
        assert!((b.mean_points - f64::from(u32::MAX)).abs() < 1.0);
        assert_eq!(summary.topics[0].best_points, 2 * u64::from(u32::MAX));
    }
}
