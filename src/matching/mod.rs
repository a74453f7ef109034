//! Matching strategies and the shared matcher abstraction

pub mod comparison;
pub mod generative;
pub mod lexical;
pub mod reranker;
pub mod semantic;
pub mod similarity;
pub mod skills;
pub mod supervised;

pub use comparison::{AgreementLevel, ComparisonResult, MatcherComparison, StrategyCorrelation};
pub use generative::GenerativeMatcher;
pub use lexical::LexicalMatcher;
pub use reranker::RerankerMatcher;
pub use semantic::SemanticMatcher;
pub use skills::{skill_match, SkillMatch};
pub use supervised::SupervisedMatcher;

use crate::config::Config;
use crate::error::{MatcherError, Result};
use crate::models::{Job, MatchResult, Resume};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The closed set of matching strategies. Declaration order doubles as the
/// fixed priority order used to break exact score ties in
/// [`MatcherComparison::get_best_matcher`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Semantic,
    Lexical,
    Supervised,
    Reranking,
    Generative,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Semantic,
        Strategy::Lexical,
        Strategy::Supervised,
        Strategy::Reranking,
        Strategy::Generative,
    ];

    /// Stable tag used in `matching_method` (without fallback suffix).
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Semantic => "semantic",
            Strategy::Lexical => "lexical",
            Strategy::Supervised => "supervised",
            Strategy::Reranking => "reranking",
            Strategy::Generative => "generative",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability interface implemented by every strategy.
pub trait Matcher {
    /// Human-readable strategy name for logs and console output.
    fn name(&self) -> &str;

    /// Score one (resume, job) pair. Backend trouble degrades to the
    /// skill-overlap fallback; the only error is structurally invalid input
    /// (missing identifiers).
    fn match_one(&self, resume: &Resume, job: &Job) -> Result<MatchResult>;

    /// Score a resume set against one job. Failing resumes are skipped with
    /// a logged reason; the output is sorted by `overall_score` descending,
    /// ties broken by resume id ascending, truncated to `top_n`.
    fn match_many(&self, resumes: &[Resume], job: &Job, top_n: usize) -> Vec<MatchResult> {
        let mut results = Vec::with_capacity(resumes.len());
        for resume in resumes {
            match self.match_one(resume, job) {
                Ok(result) => results.push(result),
                Err(e) => log::warn!("Skipping resume '{}': {}", resume.id, e),
            }
        }
        rank(&mut results, top_n);
        results
    }

    /// Batch-optimized variant of [`Matcher::match_many`] with identical
    /// output. Strategies without a meaningful batch optimization alias the
    /// plain implementation.
    fn match_many_optimized(&self, resumes: &[Resume], job: &Job, top_n: usize) -> Vec<MatchResult> {
        self.match_many(resumes, job, top_n)
    }
}

/// Tagged-variant dispatcher over the closed strategy set.
pub enum AnyMatcher {
    Semantic(SemanticMatcher),
    Lexical(LexicalMatcher),
    Supervised(SupervisedMatcher),
    Reranking(RerankerMatcher),
    Generative(GenerativeMatcher),
}

impl AnyMatcher {
    /// Construct the matcher for a strategy tag. Construction never fails:
    /// an unavailable backend puts the matcher into fallback mode instead.
    pub fn build(strategy: Strategy, config: &Config) -> Self {
        match strategy {
            Strategy::Semantic => AnyMatcher::Semantic(SemanticMatcher::new(config)),
            Strategy::Lexical => AnyMatcher::Lexical(LexicalMatcher::new(config)),
            Strategy::Supervised => AnyMatcher::Supervised(SupervisedMatcher::new(config)),
            Strategy::Reranking => AnyMatcher::Reranking(RerankerMatcher::new(config)),
            Strategy::Generative => AnyMatcher::Generative(GenerativeMatcher::new(config)),
        }
    }

    /// Construct the fallback-mode matcher directly, without probing any
    /// backend or emitting warnings.
    pub fn stub(strategy: Strategy, config: &Config) -> Self {
        match strategy {
            Strategy::Semantic => AnyMatcher::Semantic(SemanticMatcher::stub(config)),
            Strategy::Lexical => AnyMatcher::Lexical(LexicalMatcher::new(config)),
            Strategy::Supervised => AnyMatcher::Supervised(SupervisedMatcher::stub(config)),
            Strategy::Reranking => AnyMatcher::Reranking(RerankerMatcher::stub(config)),
            Strategy::Generative => AnyMatcher::Generative(GenerativeMatcher::stub(config)),
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            AnyMatcher::Semantic(_) => Strategy::Semantic,
            AnyMatcher::Lexical(_) => Strategy::Lexical,
            AnyMatcher::Supervised(_) => Strategy::Supervised,
            AnyMatcher::Reranking(_) => Strategy::Reranking,
            AnyMatcher::Generative(_) => Strategy::Generative,
        }
    }
}

impl Matcher for AnyMatcher {
    fn name(&self) -> &str {
        match self {
            AnyMatcher::Semantic(m) => m.name(),
            AnyMatcher::Lexical(m) => m.name(),
            AnyMatcher::Supervised(m) => m.name(),
            AnyMatcher::Reranking(m) => m.name(),
            AnyMatcher::Generative(m) => m.name(),
        }
    }

    fn match_one(&self, resume: &Resume, job: &Job) -> Result<MatchResult> {
        match self {
            AnyMatcher::Semantic(m) => m.match_one(resume, job),
            AnyMatcher::Lexical(m) => m.match_one(resume, job),
            AnyMatcher::Supervised(m) => m.match_one(resume, job),
            AnyMatcher::Reranking(m) => m.match_one(resume, job),
            AnyMatcher::Generative(m) => m.match_one(resume, job),
        }
    }

    fn match_many(&self, resumes: &[Resume], job: &Job, top_n: usize) -> Vec<MatchResult> {
        match self {
            AnyMatcher::Semantic(m) => m.match_many(resumes, job, top_n),
            AnyMatcher::Lexical(m) => m.match_many(resumes, job, top_n),
            AnyMatcher::Supervised(m) => m.match_many(resumes, job, top_n),
            AnyMatcher::Reranking(m) => m.match_many(resumes, job, top_n),
            AnyMatcher::Generative(m) => m.match_many(resumes, job, top_n),
        }
    }

    fn match_many_optimized(&self, resumes: &[Resume], job: &Job, top_n: usize) -> Vec<MatchResult> {
        match self {
            AnyMatcher::Semantic(m) => m.match_many_optimized(resumes, job, top_n),
            AnyMatcher::Lexical(m) => m.match_many_optimized(resumes, job, top_n),
            AnyMatcher::Supervised(m) => m.match_many_optimized(resumes, job, top_n),
            AnyMatcher::Reranking(m) => m.match_many_optimized(resumes, job, top_n),
            AnyMatcher::Generative(m) => m.match_many_optimized(resumes, job, top_n),
        }
    }
}

/// Summary statistics over one ranked result list.
#[derive(Debug, Clone, Serialize)]
pub struct MatchStats {
    pub total_candidates: usize,
    pub avg_score: f32,
    pub max_score: f32,
    pub min_score: f32,
    pub method: String,
}

pub fn stats(results: &[MatchResult]) -> Option<MatchStats> {
    let first = results.first()?;
    let scores: Vec<f32> = results.iter().map(|r| r.overall_score).collect();
    Some(MatchStats {
        total_candidates: results.len(),
        avg_score: scores.iter().sum::<f32>() / scores.len() as f32,
        max_score: scores.iter().cloned().fold(f32::MIN, f32::max),
        min_score: scores.iter().cloned().fold(f32::MAX, f32::min),
        method: first.matching_method.clone(),
    })
}

/// Sort by overall score descending, ties broken by resume id ascending,
/// then truncate to `top_n`. The tie-break makes the ranking a total,
/// deterministic order.
pub(crate) fn rank(results: &mut Vec<MatchResult>, top_n: usize) {
    results.sort_by(|a, b| {
        b.overall_score
            .partial_cmp(&a.overall_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.resume_id.cmp(&b.resume_id))
    });
    results.truncate(top_n);
}

/// Reject pairs whose identifiers are missing; ranking output is
/// meaningless without them.
pub(crate) fn validate_pair(resume: &Resume, job: &Job) -> Result<()> {
    if resume.id.trim().is_empty() {
        return Err(MatcherError::InvalidInput(
            "resume is missing an identifier".to_string(),
        ));
    }
    if job.id.trim().is_empty() {
        return Err(MatcherError::InvalidInput(
            "job is missing an identifier".to_string(),
        ));
    }
    Ok(())
}

/// Assemble a result record from a computed similarity and skill overlap.
pub(crate) fn build_result(
    resume: &Resume,
    job: &Job,
    overall_score: f32,
    similarity: f32,
    skill: SkillMatch,
    matching_method: String,
    explanation: String,
) -> MatchResult {
    MatchResult {
        resume_id: resume.id.clone(),
        job_id: job.id.clone(),
        overall_score,
        skills_match: skill.score,
        similarity,
        matched_skills: skill.matched,
        missing_skills: skill.missing,
        matching_method,
        explanation,
        matched_at: Utc::now(),
    }
}

/// Degraded result: the skill-overlap score alone, with the method tag
/// carrying the `_fallback` suffix and all numeric fields populated.
pub(crate) fn fallback_result(
    resume: &Resume,
    job: &Job,
    skill: SkillMatch,
    strategy: Strategy,
) -> MatchResult {
    let score = skill.score;
    build_result(
        resume,
        job,
        score,
        score,
        skill,
        format!("{}_fallback", strategy.as_str()),
        String::new(),
    )
}
