//! Comparison harness: run several strategies over the same pairs and
//! measure how much they agree

use crate::config::{ComparisonConfig, Config};
use crate::matching::{AnyMatcher, Matcher, Strategy};
use crate::models::{Job, MatchResult, Resume};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgreementLevel {
    High,
    Medium,
    Low,
    /// Fewer than two strategies produced a score.
    Unknown,
}

impl std::fmt::Display for AgreementLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            AgreementLevel::High => "high",
            AgreementLevel::Medium => "medium",
            AgreementLevel::Low => "low",
            AgreementLevel::Unknown => "unknown",
        };
        f.write_str(tag)
    }
}

/// Per-resume outcome of running every active strategy.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub resume_id: String,
    pub job_id: String,
    /// One result per strategy that completed; iteration order is the fixed
    /// strategy priority order.
    pub results: BTreeMap<Strategy, MatchResult>,
    pub average_score: f32,
    pub median_score: f32,
    /// Sample variance of the overall scores.
    pub score_variance: f32,
    pub agreement_level: AgreementLevel,
}

impl ComparisonResult {
    /// Derive the summary statistics from the per-strategy results.
    pub fn from_results(
        resume_id: String,
        job_id: String,
        results: BTreeMap<Strategy, MatchResult>,
        thresholds: &ComparisonConfig,
    ) -> Self {
        let scores: Vec<f32> = results.values().map(|r| r.overall_score).collect();

        let (average_score, median_score) = if scores.is_empty() {
            (0.0, 0.0)
        } else {
            (mean(&scores), median(&scores))
        };

        let (score_variance, agreement_level) = if scores.len() >= 2 {
            let variance = sample_variance(&scores);
            let level = if variance < thresholds.high_agreement_variance {
                AgreementLevel::High
            } else if variance < thresholds.medium_agreement_variance {
                AgreementLevel::Medium
            } else {
                AgreementLevel::Low
            };
            (variance, level)
        } else {
            (0.0, AgreementLevel::Unknown)
        };

        Self {
            resume_id,
            job_id,
            results,
            average_score,
            median_score,
            score_variance,
            agreement_level,
        }
    }
}

/// Pearson correlation between two strategies' score vectors across a
/// compared set. `coefficient` is `None` when undefined (fewer than two
/// aligned points, or a zero-variance vector).
#[derive(Debug, Clone, Serialize)]
pub struct StrategyCorrelation {
    pub first: Strategy,
    pub second: Strategy,
    pub coefficient: Option<f32>,
}

/// Runs two or more strategies over the same inputs and aggregates
/// agreement and win statistics.
pub struct MatcherComparison {
    matchers: BTreeMap<Strategy, AnyMatcher>,
    thresholds: ComparisonConfig,
}

impl MatcherComparison {
    /// Build one matcher per requested strategy. Construction never fails;
    /// strategies with unavailable backends participate in fallback mode.
    pub fn new(strategies: &[Strategy], config: &Config) -> Self {
        let matchers = strategies
            .iter()
            .map(|&s| (s, AnyMatcher::build(s, config)))
            .collect();
        Self {
            matchers,
            thresholds: config.comparison.clone(),
        }
    }

    /// Harness over pre-built matchers (tests, custom wiring).
    pub fn from_matchers(
        matchers: Vec<AnyMatcher>,
        thresholds: ComparisonConfig,
    ) -> Self {
        Self {
            matchers: matchers.into_iter().map(|m| (m.strategy(), m)).collect(),
            thresholds,
        }
    }

    pub fn strategies(&self) -> Vec<Strategy> {
        self.matchers.keys().copied().collect()
    }

    /// Score one pair with every active strategy. A strategy whose call
    /// fails is omitted from the result map with a logged reason.
    pub fn compare_single(&self, resume: &Resume, job: &Job) -> ComparisonResult {
        let mut results = BTreeMap::new();

        for (&strategy, matcher) in &self.matchers {
            match matcher.match_one(resume, job) {
                Ok(result) => {
                    log::debug!(
                        "{} scored '{}' at {:.3}",
                        matcher.name(),
                        resume.id,
                        result.overall_score
                    );
                    results.insert(strategy, result);
                }
                Err(e) => log::warn!("{} failed on '{}': {}", matcher.name(), resume.id, e),
            }
        }

        ComparisonResult::from_results(
            resume.id.clone(),
            job.id.clone(),
            results,
            &self.thresholds,
        )
    }

    /// Compare a resume set, ranked by average score descending (ties:
    /// resume id ascending), truncated to `top_n`.
    pub fn compare_many(
        &self,
        resumes: &[Resume],
        job: &Job,
        top_n: usize,
    ) -> Vec<ComparisonResult> {
        let mut comparisons: Vec<ComparisonResult> = resumes
            .iter()
            .map(|resume| self.compare_single(resume, job))
            .collect();

        comparisons.sort_by(|a, b| {
            b.average_score
                .partial_cmp(&a.average_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.resume_id.cmp(&b.resume_id))
        });
        comparisons.truncate(top_n);
        comparisons
    }

    /// Win counts: per resume, which strategy produced the highest overall
    /// score. Exact ties award the win to the strategy earliest in the
    /// fixed priority order.
    pub fn get_best_matcher(comparisons: &[ComparisonResult]) -> BTreeMap<Strategy, usize> {
        let mut wins: BTreeMap<Strategy, usize> = BTreeMap::new();
        for comparison in comparisons {
            for &strategy in comparison.results.keys() {
                wins.entry(strategy).or_insert(0);
            }
        }

        for comparison in comparisons {
            let mut winner: Option<(Strategy, f32)> = None;
            for (&strategy, result) in &comparison.results {
                let beats = match winner {
                    // Strict comparison keeps the earliest strategy on ties.
                    Some((_, best)) => result.overall_score > best,
                    None => true,
                };
                if beats {
                    winner = Some((strategy, result.overall_score));
                }
            }
            if let Some((strategy, _)) = winner {
                *wins.entry(strategy).or_insert(0) += 1;
            }
        }

        wins
    }

    /// Pairwise Pearson correlation between strategies' overall scores
    /// across the compared set. Only pairs scored in every comparison where
    /// both strategies are present contribute.
    pub fn calculate_correlation(comparisons: &[ComparisonResult]) -> Vec<StrategyCorrelation> {
        let mut present: Vec<Strategy> = Vec::new();
        for comparison in comparisons {
            for &strategy in comparison.results.keys() {
                if !present.contains(&strategy) {
                    present.push(strategy);
                }
            }
        }
        present.sort();

        let mut correlations = Vec::new();
        for (i, &first) in present.iter().enumerate() {
            for &second in &present[i + 1..] {
                let pairs: Vec<(f32, f32)> = comparisons
                    .iter()
                    .filter_map(|c| {
                        let a = c.results.get(&first)?.overall_score;
                        let b = c.results.get(&second)?.overall_score;
                        Some((a, b))
                    })
                    .collect();

                correlations.push(StrategyCorrelation {
                    first,
                    second,
                    coefficient: pearson(&pairs),
                });
            }
        }
        correlations
    }
}

fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}

fn median(values: &[f32]) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn sample_variance(values: &[f32]) -> f32 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f32>() / (values.len() - 1) as f32
}

fn pearson(pairs: &[(f32, f32)]) -> Option<f32> {
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f32;
    let mean_a = pairs.iter().map(|(a, _)| a).sum::<f32>() / n;
    let mean_b = pairs.iter().map(|(_, b)| b).sum::<f32>() / n;

    let mut covariance = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (a, b) in pairs {
        covariance += (a - mean_a) * (b - mean_b);
        var_a += (a - mean_a).powi(2);
        var_b += (b - mean_b).powi(2);
    }

    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }

    Some(covariance / (var_a * var_b).sqrt())
}
