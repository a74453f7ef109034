//! Match result record produced by every strategy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of scoring one (resume, job) pair. Created fresh per invocation,
/// never mutated after return, and serializable as a flat record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub resume_id: String,
    pub job_id: String,
    /// Fused score in [0, 1].
    pub overall_score: f32,
    /// Skill-overlap score in [0, 1].
    pub skills_match: f32,
    /// Strategy-specific similarity in [0, 1]: embedding cosine, TF-IDF
    /// cosine, classifier probability, rerank relevance or parsed
    /// generative score. In fallback mode it mirrors `skills_match`.
    pub similarity: f32,
    /// Required skills found in the resume, in job order.
    pub matched_skills: Vec<String>,
    /// Required skills absent from the resume, in job order.
    pub missing_skills: Vec<String>,
    /// Strategy tag, e.g. "semantic" or "semantic_fallback".
    pub matching_method: String,
    /// Populated only by the generative strategy.
    #[serde(default)]
    pub explanation: String,
    pub matched_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_a_flat_record() {
        let result = MatchResult {
            resume_id: "cv-1".into(),
            job_id: "job-1".into(),
            overall_score: 0.5,
            skills_match: 0.5,
            similarity: 0.5,
            matched_skills: vec!["python".into()],
            missing_skills: vec!["django".into()],
            matching_method: "lexical".into(),
            explanation: String::new(),
            matched_at: Utc::now(),
        };

        let value = serde_json::to_value(&result).unwrap();
        assert!(value.is_object());
        assert_eq!(value["matching_method"], "lexical");
        assert_eq!(value["explanation"], "");
        assert!(value["matched_skills"].is_array());
    }
}
