//! Console rendering for match and comparison results

use crate::matching::{ComparisonResult, MatchStats, Strategy, StrategyCorrelation};
use crate::models::MatchResult;
use colored::Colorize;
use std::collections::BTreeMap;

fn percent(score: f32) -> String {
    format!("{:.1}%", score * 100.0)
}

fn score_colored(score: f32) -> colored::ColoredString {
    let text = percent(score);
    if score >= 0.7 {
        text.green()
    } else if score >= 0.4 {
        text.yellow()
    } else {
        text.red()
    }
}

/// Ranked result table for one strategy run.
pub fn render_results(results: &[MatchResult], stats: Option<&MatchStats>) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{:<4} {:<24} {:>8} {:>8} {:>8}  {}",
        "#", "Resume", "Overall", "Skills", "Signal", "Method"
    ));
    lines.push("-".repeat(72));

    for (rank, result) in results.iter().enumerate() {
        lines.push(format!(
            "{:<4} {:<24} {:>8} {:>8} {:>8}  {}",
            rank + 1,
            result.resume_id,
            score_colored(result.overall_score),
            percent(result.skills_match),
            percent(result.similarity),
            result.matching_method.dimmed(),
        ));
        if !result.matched_skills.is_empty() {
            lines.push(format!(
                "     {} {}",
                "matched:".dimmed(),
                result.matched_skills.join(", ")
            ));
        }
        if !result.missing_skills.is_empty() {
            lines.push(format!(
                "     {} {}",
                "missing:".dimmed(),
                result.missing_skills.join(", ")
            ));
        }
        if !result.explanation.is_empty() {
            lines.push(format!("     {} {}", "why:".dimmed(), result.explanation));
        }
    }

    if let Some(stats) = stats {
        lines.push(String::new());
        lines.push(format!(
            "{} candidates | avg {} | max {} | min {}",
            stats.total_candidates,
            percent(stats.avg_score),
            percent(stats.max_score),
            percent(stats.min_score),
        ));
    }

    lines.join("\n")
}

/// Comparison report: per-resume strategy table plus win counts and
/// pairwise correlations.
pub fn render_comparisons(
    comparisons: &[ComparisonResult],
    wins: &BTreeMap<Strategy, usize>,
    correlations: &[StrategyCorrelation],
) -> String {
    let mut lines = Vec::new();

    for comparison in comparisons {
        lines.push(format!(
            "{} {} vs {}",
            "Comparison:".bold(),
            comparison.resume_id,
            comparison.job_id
        ));
        for (strategy, result) in &comparison.results {
            lines.push(format!(
                "  {:<12} overall {:>8}  skills {:>8}  signal {:>8}",
                strategy.to_string(),
                score_colored(result.overall_score),
                percent(result.skills_match),
                percent(result.similarity),
            ));
        }
        lines.push(format!(
            "  avg {} | median {} | variance {:.4} | agreement {}",
            percent(comparison.average_score),
            percent(comparison.median_score),
            comparison.score_variance,
            comparison.agreement_level.to_string().bold(),
        ));
        lines.push(String::new());
    }

    if !wins.is_empty() {
        let summary = wins
            .iter()
            .map(|(strategy, count)| format!("{}: {}", strategy, count))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("{} {}", "Wins:".bold(), summary));
    }

    for correlation in correlations {
        let value = match correlation.coefficient {
            Some(r) => format!("{:.3}", r),
            None => "undefined".to_string(),
        };
        lines.push(format!(
            "Correlation {} vs {}: {}",
            correlation.first, correlation.second, value
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn render_results_includes_skills_and_stats() {
        let results = vec![MatchResult {
            resume_id: "cv-1".into(),
            job_id: "job-1".into(),
            overall_score: 0.75,
            skills_match: 0.5,
            similarity: 0.9,
            matched_skills: vec!["python".into()],
            missing_skills: vec!["django".into()],
            matching_method: "semantic".into(),
            explanation: String::new(),
            matched_at: Utc::now(),
        }];
        let stats = crate::matching::stats(&results);

        let rendered = render_results(&results, stats.as_ref());

        assert!(rendered.contains("cv-1"));
        assert!(rendered.contains("matched:"));
        assert!(rendered.contains("python"));
        assert!(rendered.contains("1 candidates"));
    }
}
