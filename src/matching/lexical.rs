//! Lexical strategy: TF-IDF sparse vectors + cosine similarity
//!
//! The vectorizer is fitted per pair over the two-document corpus, so this
//! strategy has no heavy backend and never degrades.

use crate::config::{Config, FusionWeights, LexicalConfig, StopWordsMode};
use crate::error::Result;
use crate::matching::similarity::clamped_cosine_similarity;
use crate::matching::{build_result, skill_match, validate_pair, Matcher, Strategy};
use crate::models::{Job, MatchResult, Resume};
use crate::text::{contains_cyrillic, TfidfVectorizer};

pub struct LexicalMatcher {
    lexical: LexicalConfig,
    weights: FusionWeights,
}

impl LexicalMatcher {
    pub fn new(config: &Config) -> Self {
        Self {
            lexical: config.lexical.clone(),
            weights: config.scoring.lexical,
        }
    }

    /// English stop words apply unless the pair is detected as Russian (or
    /// stop-word handling is disabled outright).
    fn use_english_stop_words(&self, resume: &Resume, job: &Job) -> bool {
        match self.lexical.stop_words {
            StopWordsMode::English => true,
            StopWordsMode::Disabled => false,
            StopWordsMode::Auto => {
                !contains_cyrillic(&resume.full_text) && !contains_cyrillic(&job.full_text)
            }
        }
    }

    fn lexical_similarity(&self, resume: &Resume, job: &Job) -> f32 {
        let vectorizer = TfidfVectorizer::fit(
            &[resume.full_text.as_str(), job.full_text.as_str()],
            self.lexical.max_features,
            self.use_english_stop_words(resume, job),
        );
        let resume_vector = vectorizer.transform(&resume.full_text);
        let job_vector = vectorizer.transform(&job.full_text);
        clamped_cosine_similarity(&resume_vector, &job_vector)
    }
}

impl Matcher for LexicalMatcher {
    fn name(&self) -> &str {
        "TF-IDF Matcher"
    }

    fn match_one(&self, resume: &Resume, job: &Job) -> Result<MatchResult> {
        validate_pair(resume, job)?;

        let similarity = self.lexical_similarity(resume, job);
        let skill = skill_match(resume, job);
        let overall = self.weights.blend(similarity, skill.score);

        Ok(build_result(
            resume,
            job,
            overall,
            similarity,
            skill,
            Strategy::Lexical.as_str().to_string(),
            String::new(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> LexicalMatcher {
        LexicalMatcher::new(&Config::default())
    }

    fn job() -> Job {
        Job::new(
            "job-1",
            "Backend Engineer",
            None,
            "We build Python web services with Django and PostgreSQL.",
            vec!["Python".into(), "Django".into(), "PostgreSQL".into()],
            vec![],
        )
    }

    #[test]
    fn overlapping_texts_score_higher_than_disjoint_ones() {
        let close = Resume::new(
            "cv-close",
            "Python engineer building Django web services backed by PostgreSQL.",
            None,
            vec![],
        );
        let far = Resume::new(
            "cv-far",
            "Graphic designer focused on typography and branding.",
            None,
            vec![],
        );

        let matcher = matcher();
        let close_result = matcher.match_one(&close, &job()).unwrap();
        let far_result = matcher.match_one(&far, &job()).unwrap();

        assert!(close_result.similarity > far_result.similarity);
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let resume = Resume::new("cv-1", "Python and Django.", None, vec!["python".into()]);
        let result = matcher().match_one(&resume, &job()).unwrap();

        assert!((0.0..=1.0).contains(&result.overall_score));
        assert!((0.0..=1.0).contains(&result.similarity));
        assert!((0.0..=1.0).contains(&result.skills_match));
        assert_eq!(result.matching_method, "lexical");
        assert!(result.explanation.is_empty());
    }

    #[test]
    fn fusion_follows_the_documented_weights() {
        // With skills_match = 1/3 and a known similarity, the fused score is
        // 0.5 * similarity + 0.5 * skills.
        let resume = Resume::new(
            "cv-1",
            "Python services.",
            None,
            vec!["Python".into(), "Docker".into()],
        );
        let matcher = matcher();
        let result = matcher.match_one(&resume, &job()).unwrap();

        assert!((result.skills_match - 1.0 / 3.0).abs() < 1e-6);
        let expected = 0.5 * result.similarity + 0.5 * result.skills_match;
        assert!((result.overall_score - expected).abs() < 1e-6);
        assert_eq!(result.matched_skills, vec!["python"]);
        assert_eq!(result.missing_skills, vec!["django", "postgresql"]);
    }

    #[test]
    fn identical_texts_score_full_similarity() {
        let job = job();
        let resume = Resume::new("cv-twin", job.full_text.clone(), None, vec![]);
        let result = matcher().match_one(&resume, &job).unwrap();

        assert!((result.similarity - 1.0).abs() < 1e-4);
    }

    #[test]
    fn cyrillic_pair_skips_english_stop_words() {
        let resume = Resume::new("cv-ru", "Разработчик Python из Москвы", None, vec![]);
        let job = Job::new(
            "job-ru",
            "Инженер",
            None,
            "Нужен разработчик Python",
            vec![],
            vec![],
        );
        // Must not panic and must produce a usable score.
        let result = matcher().match_one(&resume, &job).unwrap();
        assert!((0.0..=1.0).contains(&result.similarity));
    }
}
