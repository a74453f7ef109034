//! Semantic strategy: Model2Vec static embeddings + cosine similarity

use crate::config::{Config, FusionWeights};
use crate::error::Result;
use crate::matching::similarity::clamped_cosine_similarity;
use crate::matching::{
    build_result, fallback_result, rank, skill_match, validate_pair, Matcher, Strategy,
};
use crate::models::{Job, MatchResult, Resume};
use model2vec_rs::model::StaticModel;
use std::sync::{Arc, OnceLock};

/// Process-lifetime embedding model handle: loaded once on first
/// construction, read-only afterwards. `None` records a failed probe so the
/// unavailability warning fires once per process.
static EMBEDDING_MODEL: OnceLock<Option<Arc<StaticModel>>> = OnceLock::new();

fn shared_model(model_id: &str) -> Option<Arc<StaticModel>> {
    EMBEDDING_MODEL
        .get_or_init(|| {
            log::info!("Loading embedding model: {}", model_id);
            match StaticModel::from_pretrained(model_id, None, None, None) {
                Ok(model) => Some(Arc::new(model)),
                Err(e) => {
                    log::warn!(
                        "Embedding model '{}' unavailable, semantic matching degrades to skill overlap: {}",
                        model_id,
                        e
                    );
                    None
                }
            }
        })
        .clone()
}

pub struct SemanticMatcher {
    model: Option<Arc<StaticModel>>,
    weights: FusionWeights,
    shortlist_threshold: usize,
}

impl SemanticMatcher {
    pub fn new(config: &Config) -> Self {
        Self {
            model: shared_model(&config.models.embedding_model),
            weights: config.scoring.semantic,
            shortlist_threshold: config.models.shortlist_threshold,
        }
    }

    /// Fallback-mode instance that never touches the embedding backend.
    pub fn stub(config: &Config) -> Self {
        Self {
            model: None,
            weights: config.scoring.semantic,
            shortlist_threshold: config.models.shortlist_threshold,
        }
    }

    fn result_from_similarity(
        &self,
        resume: &Resume,
        job: &Job,
        similarity: f32,
    ) -> MatchResult {
        let skill = skill_match(resume, job);
        let overall = self.weights.blend(similarity, skill.score);
        build_result(
            resume,
            job,
            overall,
            similarity,
            skill,
            Strategy::Semantic.as_str().to_string(),
            String::new(),
        )
    }
}

impl Matcher for SemanticMatcher {
    fn name(&self) -> &str {
        "Semantic Matcher (Model2Vec)"
    }

    fn match_one(&self, resume: &Resume, job: &Job) -> Result<MatchResult> {
        validate_pair(resume, job)?;

        let Some(model) = &self.model else {
            return Ok(fallback_result(
                resume,
                job,
                skill_match(resume, job),
                Strategy::Semantic,
            ));
        };

        let resume_embedding = model.encode_single(&resume.full_text);
        let job_embedding = model.encode_single(&job.full_text);
        let similarity = clamped_cosine_similarity(&resume_embedding, &job_embedding);

        Ok(self.result_from_similarity(resume, job, similarity))
    }

    /// One batched encode call for the whole resume set and one for the job
    /// text. Above the shortlist threshold, candidates are pre-filtered by
    /// raw embedding similarity to `max(top_n * 3, 10)` before exact scoring;
    /// the shortlist size caps recall.
    fn match_many_optimized(&self, resumes: &[Resume], job: &Job, top_n: usize) -> Vec<MatchResult> {
        let Some(model) = &self.model else {
            return self.match_many(resumes, job, top_n);
        };

        if job.id.trim().is_empty() {
            log::warn!("Skipping batch: job is missing an identifier");
            return Vec::new();
        }

        let valid: Vec<&Resume> = resumes
            .iter()
            .filter(|r| {
                if r.id.trim().is_empty() {
                    log::warn!("Skipping resume without identifier");
                    false
                } else {
                    true
                }
            })
            .collect();

        let texts: Vec<String> = valid.iter().map(|r| r.full_text.clone()).collect();
        let embeddings = model.encode(&texts);
        let job_embedding = model.encode_single(&job.full_text);

        let similarities: Vec<f32> = embeddings
            .iter()
            .map(|e| clamped_cosine_similarity(e, &job_embedding))
            .collect();

        let mut candidates: Vec<usize> = (0..valid.len()).collect();
        if valid.len() > self.shortlist_threshold {
            let shortlist = (top_n * 3).max(10);
            candidates.sort_by(|&a, &b| {
                similarities[b]
                    .partial_cmp(&similarities[a])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            candidates.truncate(shortlist);
            log::debug!(
                "Shortlisted {} of {} resumes by embedding similarity",
                candidates.len(),
                valid.len()
            );
        }

        let mut results: Vec<MatchResult> = candidates
            .into_iter()
            .map(|i| self.result_from_similarity(valid[i], job, similarities[i]))
            .collect();
        rank(&mut results, top_n);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::default()
    }

    fn resume(id: &str, skills: &[&str]) -> Resume {
        Resume::new(
            id,
            "worked on backend services",
            None,
            skills.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn job() -> Job {
        Job::new(
            "job-1",
            "Backend Engineer",
            None,
            "build backend services",
            vec!["python".into(), "django".into()],
            vec![],
        )
    }

    #[test]
    fn stub_degrades_to_skill_overlap() {
        let matcher = SemanticMatcher::stub(&config());
        let result = matcher.match_one(&resume("cv-1", &["python"]), &job()).unwrap();

        assert_eq!(result.matching_method, "semantic_fallback");
        assert_eq!(result.overall_score, result.skills_match);
        assert_eq!(result.similarity, result.skills_match);
        assert!((result.skills_match - 0.5).abs() < 1e-6);
    }

    #[test]
    fn stub_optimized_matches_plain_batch() {
        let matcher = SemanticMatcher::stub(&config());
        let resumes = vec![
            resume("cv-a", &["python", "django"]),
            resume("cv-b", &["python"]),
            resume("cv-c", &[]),
        ];

        let plain = matcher.match_many(&resumes, &job(), 3);
        let optimized = matcher.match_many_optimized(&resumes, &job(), 3);

        let plain_ids: Vec<_> = plain.iter().map(|r| (&r.resume_id, r.overall_score)).collect();
        let optimized_ids: Vec<_> = optimized
            .iter()
            .map(|r| (&r.resume_id, r.overall_score))
            .collect();
        assert_eq!(plain_ids, optimized_ids);
    }

    #[test]
    fn invalid_resume_is_skipped_in_batch() {
        let matcher = SemanticMatcher::stub(&config());
        let resumes = vec![resume("", &["python"]), resume("cv-ok", &["python"])];

        let results = matcher.match_many(&resumes, &job(), 5);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].resume_id, "cv-ok");
    }
}
