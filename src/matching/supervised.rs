//! Supervised strategy: TF-IDF features + pretrained binary classifier
//!
//! The classifier is a logistic regression trained offline on labeled
//! (resume, job) pairs; training itself is out of scope. The artifact is a
//! JSON file holding the fitted vectorizer alongside the regression weights
//! and intercept. A missing or unreadable artifact puts the matcher into
//! permanent fallback mode.

use crate::config::{Config, FusionWeights};
use crate::error::{MatcherError, Result};
use crate::matching::{build_result, fallback_result, skill_match, validate_pair, Matcher, Strategy};
use crate::models::{Job, MatchResult, Resume};
use crate::text::TfidfVectorizer;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Once};

static UNAVAILABLE_WARNING: Once = Once::new();

/// Pretrained vectorizer + logistic regression, serialized as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    pub vectorizer: TfidfVectorizer,
    pub weights: Vec<f32>,
    pub intercept: f32,
}

impl ClassifierArtifact {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let artifact: ClassifierArtifact = serde_json::from_str(&content)?;
        if artifact.weights.len() != artifact.vectorizer.vocabulary_len() {
            return Err(MatcherError::Classifier(format!(
                "weight vector length {} does not match vocabulary size {}",
                artifact.weights.len(),
                artifact.vectorizer.vocabulary_len()
            )));
        }
        Ok(artifact)
    }

    /// Relevance probability for a feature vector, via the logistic link.
    fn probability(&self, features: &[f32]) -> f32 {
        let z: f32 = self
            .weights
            .iter()
            .zip(features.iter())
            .map(|(w, x)| w * x)
            .sum::<f32>()
            + self.intercept;
        1.0 / (1.0 + (-z).exp())
    }
}

pub struct SupervisedMatcher {
    artifact: Option<Arc<ClassifierArtifact>>,
    weights: FusionWeights,
}

impl SupervisedMatcher {
    pub fn new(config: &Config) -> Self {
        let path = &config.models.classifier_path;
        let artifact = match ClassifierArtifact::load(path) {
            Ok(artifact) => {
                log::info!("Loaded classifier artifact from {}", path.display());
                Some(Arc::new(artifact))
            }
            Err(e) => {
                UNAVAILABLE_WARNING.call_once(|| {
                    log::warn!(
                        "Classifier artifact '{}' unavailable, supervised matching degrades to skill overlap: {}",
                        path.display(),
                        e
                    );
                });
                None
            }
        };

        Self {
            artifact,
            weights: config.scoring.supervised,
        }
    }

    /// Fallback-mode instance without probing the artifact path.
    pub fn stub(config: &Config) -> Self {
        Self {
            artifact: None,
            weights: config.scoring.supervised,
        }
    }

    /// Instance backed by an in-memory artifact (tests, embedded callers).
    pub fn with_artifact(artifact: ClassifierArtifact, config: &Config) -> Self {
        Self {
            artifact: Some(Arc::new(artifact)),
            weights: config.scoring.supervised,
        }
    }

    /// Joint text representation of the pair, matching the layout the
    /// classifier was trained on.
    fn combine_text(resume: &Resume, job: &Job) -> String {
        format!("{}\n [SEP] \n{}", resume.full_text, job.full_text)
    }
}

impl Matcher for SupervisedMatcher {
    fn name(&self) -> &str {
        "TF-IDF + Classifier Matcher"
    }

    fn match_one(&self, resume: &Resume, job: &Job) -> Result<MatchResult> {
        validate_pair(resume, job)?;

        let skill = skill_match(resume, job);

        let Some(artifact) = &self.artifact else {
            return Ok(fallback_result(resume, job, skill, Strategy::Supervised));
        };

        let features = artifact.vectorizer.transform(&Self::combine_text(resume, job));
        let probability = artifact.probability(&features).clamp(0.0, 1.0);
        let overall = self.weights.blend(probability, skill.score);

        Ok(build_result(
            resume,
            job,
            overall,
            probability,
            skill,
            Strategy::Supervised.as_str().to_string(),
            String::new(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::default()
    }

    fn resume(id: &str, text: &str, skills: &[&str]) -> Resume {
        Resume::new(id, text, None, skills.iter().map(|s| s.to_string()).collect())
    }

    fn job() -> Job {
        Job::new(
            "job-1",
            "Backend Engineer",
            None,
            "python django services",
            vec!["python".into()],
            vec![],
        )
    }

    fn trained_artifact() -> ClassifierArtifact {
        // A vectorizer fitted over representative pair texts with uniform
        // positive weights: more shared vocabulary means higher probability.
        let vectorizer = TfidfVectorizer::fit(
            &["python django services", "rust tokio systems"],
            100,
            false,
        );
        let weights = vec![1.0; vectorizer.vocabulary_len()];
        ClassifierArtifact {
            vectorizer,
            weights,
            intercept: -1.0,
        }
    }

    #[test]
    fn missing_artifact_degrades_to_skill_overlap() {
        let matcher = SupervisedMatcher::stub(&config());
        let result = matcher
            .match_one(&resume("cv-1", "python work", &["python"]), &job())
            .unwrap();

        assert_eq!(result.matching_method, "supervised_fallback");
        assert_eq!(result.overall_score, result.skills_match);
        assert_eq!(result.similarity, result.skills_match);
    }

    #[test]
    fn probability_is_a_valid_score() {
        let matcher = SupervisedMatcher::with_artifact(trained_artifact(), &config());
        let result = matcher
            .match_one(&resume("cv-1", "python django services", &["python"]), &job())
            .unwrap();

        assert_eq!(result.matching_method, "supervised");
        assert!((0.0..=1.0).contains(&result.similarity));
        let expected = 0.6 * result.similarity + 0.4 * result.skills_match;
        assert!((result.overall_score - expected).abs() < 1e-6);
    }

    #[test]
    fn relevant_text_outscores_unrelated_text() {
        let matcher = SupervisedMatcher::with_artifact(trained_artifact(), &config());
        let relevant = matcher
            .match_one(&resume("cv-a", "python django services", &[]), &job())
            .unwrap();
        let unrelated = matcher
            .match_one(&resume("cv-b", "watercolor painting", &[]), &job())
            .unwrap();

        assert!(relevant.similarity > unrelated.similarity);
    }

    #[test]
    fn artifact_round_trips_through_json_file() {
        let artifact = trained_artifact();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classifier.json");
        std::fs::write(&path, serde_json::to_string(&artifact).unwrap()).unwrap();

        let loaded = ClassifierArtifact::load(&path).unwrap();
        assert_eq!(loaded.weights.len(), artifact.weights.len());
        assert_eq!(loaded.intercept, artifact.intercept);
    }

    #[test]
    fn mismatched_weight_length_is_rejected() {
        let mut artifact = trained_artifact();
        artifact.weights.pop();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classifier.json");
        std::fs::write(&path, serde_json::to_string(&artifact).unwrap()).unwrap();

        assert!(matches!(
            ClassifierArtifact::load(&path),
            Err(MatcherError::Classifier(_))
        ));
    }
}
