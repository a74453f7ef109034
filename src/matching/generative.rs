//! Generative strategy: external generative-model call with structured output
//!
//! Sends resume text, job text and required skills to an OpenAI-style
//! chat-completions endpoint and parses a strict JSON response holding a
//! score in [0, 1] plus a short rationale. Every failure mode (unreachable
//! service, timeout, auth/quota rejection, unparseable response) falls back
//! to the skill-overlap score and is logged, never raised.

use crate::config::{Config, FusionWeights, GenerativeConfig};
use crate::error::{MatcherError, Result};
use crate::matching::{build_result, fallback_result, skill_match, validate_pair, Matcher, Strategy};
use crate::models::{Job, MatchResult, Resume};
use regex::Regex;
use std::sync::Once;
use std::time::Duration;

static UNAVAILABLE_WARNING: Once = Once::new();

const SYSTEM_PROMPT: &str = "You are an expert technical recruiter. Return only JSON with fields \
     \"score\" (a number from 0 to 1) and \"reason\" (a brief explanation). \
     Answer in the language of the job posting.";

/// Transport errors, split by whether a single retry is worthwhile.
#[derive(Debug)]
pub enum ClientError {
    /// Timeout, connection failure or server error; retried once.
    Transient(String),
    /// Authentication, quota or request rejection; never retried.
    Fatal(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Transient(msg) => write!(f, "transient failure: {}", msg),
            ClientError::Fatal(msg) => write!(f, "rejected: {}", msg),
        }
    }
}

/// Chat transport behind the generative matcher. The production
/// implementation is a blocking HTTP client; tests inject a deterministic
/// mock.
pub trait GenerativeClient {
    fn complete(&self, system: &str, user: &str) -> std::result::Result<String, ClientError>;
}

/// Blocking OpenAI-style chat-completions client with a bounded timeout.
pub struct HttpGenerativeClient {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl HttpGenerativeClient {
    pub fn new(config: &GenerativeConfig, api_key: String) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MatcherError::ExternalService(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }
}

impl GenerativeClient for HttpGenerativeClient {
    fn complete(&self, system: &str, user: &str) -> std::result::Result<String, ClientError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "temperature": 0.0,
            "max_tokens": 400,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    ClientError::Transient(e.to_string())
                } else {
                    ClientError::Fatal(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(ClientError::Transient(format!("server error: {}", status)));
        }
        if !status.is_success() {
            return Err(ClientError::Fatal(format!("status {}", status)));
        }

        let payload: serde_json::Value = response
            .json()
            .map_err(|e| ClientError::Fatal(format!("unreadable response body: {}", e)))?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ClientError::Fatal("response holds no message content".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ParsedScore {
    score: f32,
    explanation: String,
}

/// Parse the model's reply: strip markdown code fences, decode the JSON
/// object, clamp the score. A reply that is not valid JSON but still carries
/// a `"score":` field is salvaged with the raw text as explanation.
fn parse_score_response(content: &str) -> Result<ParsedScore> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(MatcherError::MalformedResponse(
            "empty response".to_string(),
        ));
    }

    let fence = Regex::new(r"(?s)^```(?:json)?\s*\n?(.*?)\n?```$").expect("static regex");
    let cleaned = fence
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or(trimmed);

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(cleaned) {
        if let Some(score) = value["score"].as_f64() {
            let explanation = value["reason"]
                .as_str()
                .or_else(|| value["reasoning"].as_str())
                .unwrap_or("No explanation provided")
                .to_string();
            return Ok(ParsedScore {
                score: (score as f32).clamp(0.0, 1.0),
                explanation,
            });
        }
    }

    let salvage = Regex::new(r#""score"\s*:\s*([0-9.]+)"#).expect("static regex");
    if let Some(score) = salvage
        .captures(cleaned)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f32>().ok())
    {
        return Ok(ParsedScore {
            score: score.clamp(0.0, 1.0),
            explanation: truncate_chars(cleaned, 200),
        });
    }

    Err(MatcherError::MalformedResponse(format!(
        "no score in response: {}",
        truncate_chars(cleaned, 120)
    )))
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

pub struct GenerativeMatcher {
    client: Option<Box<dyn GenerativeClient>>,
    weights: FusionWeights,
    max_retries: u32,
}

impl GenerativeMatcher {
    pub fn new(config: &Config) -> Self {
        let client: Option<Box<dyn GenerativeClient>> = match config.generative_api_key() {
            Some(api_key) => match HttpGenerativeClient::new(&config.generative, api_key) {
                Ok(client) => Some(Box::new(client)),
                Err(e) => {
                    UNAVAILABLE_WARNING.call_once(|| {
                        log::warn!(
                            "Generative client unavailable, matching degrades to skill overlap: {}",
                            e
                        );
                    });
                    None
                }
            },
            None => {
                UNAVAILABLE_WARNING.call_once(|| {
                    log::warn!(
                        "No generative API key configured, matching degrades to skill overlap"
                    );
                });
                None
            }
        };

        Self {
            client,
            weights: config.scoring.generative,
            max_retries: config.generative.max_retries,
        }
    }

    /// Fallback-mode instance that never builds a client.
    pub fn stub(config: &Config) -> Self {
        Self {
            client: None,
            weights: config.scoring.generative,
            max_retries: config.generative.max_retries,
        }
    }

    /// Instance with an injected transport (tests, alternative backends).
    pub fn with_client(client: Box<dyn GenerativeClient>, config: &Config) -> Self {
        Self {
            client: Some(client),
            weights: config.scoring.generative,
            max_retries: config.generative.max_retries,
        }
    }

    fn build_prompt(resume: &Resume, job: &Job) -> String {
        let mut candidate = vec!["Candidate:".to_string()];
        if !resume.skills.is_empty() {
            candidate.push(format!("Skills: {}", resume.skills.join(", ")));
        }
        if let Some(summary) = resume.summary.as_deref() {
            candidate.push(format!("Summary: {}", truncate_chars(summary, 200)));
        }
        candidate.push(truncate_chars(&resume.raw_text, 500));

        let mut posting = vec!["Job:".to_string(), format!("Title: {}", job.title)];
        if let Some(company) = job.company.as_deref() {
            posting.push(format!("Company: {}", company));
        }
        if !job.required_skills.is_empty() {
            posting.push(format!("Required Skills: {}", job.required_skills.join(", ")));
        }
        posting.push(format!(
            "Description: {}",
            truncate_chars(&job.description, 400)
        ));

        format!(
            "{}\n\n{}\n\nTask: rate how well the candidate matches the job.\n\
             Response format (JSON only):\n{{\"score\": 0.85, \"reason\": \"...\"}}",
            candidate.join("\n"),
            posting.join("\n")
        )
    }

    /// One call with at most one retry on transient failure.
    fn generate(&self, client: &dyn GenerativeClient, resume: &Resume, job: &Job) -> Result<ParsedScore> {
        let user_prompt = Self::build_prompt(resume, job);
        let mut last_error = String::new();

        for attempt in 0..=self.max_retries {
            match client.complete(SYSTEM_PROMPT, &user_prompt) {
                Ok(content) => return parse_score_response(&content),
                Err(ClientError::Transient(msg)) => {
                    log::warn!("Generative attempt {} failed: {}", attempt + 1, msg);
                    last_error = msg;
                }
                Err(ClientError::Fatal(msg)) => {
                    return Err(MatcherError::ExternalService(msg));
                }
            }
        }

        Err(MatcherError::ExternalService(last_error))
    }
}

impl Matcher for GenerativeMatcher {
    fn name(&self) -> &str {
        "Generative Matcher"
    }

    fn match_one(&self, resume: &Resume, job: &Job) -> Result<MatchResult> {
        validate_pair(resume, job)?;

        let skill = skill_match(resume, job);

        let Some(client) = &self.client else {
            return Ok(fallback_result(resume, job, skill, Strategy::Generative));
        };

        match self.generate(client.as_ref(), resume, job) {
            Ok(parsed) => {
                let overall = self.weights.blend(parsed.score, skill.score);
                Ok(build_result(
                    resume,
                    job,
                    overall,
                    parsed.score,
                    skill,
                    Strategy::Generative.as_str().to_string(),
                    parsed.explanation,
                ))
            }
            Err(e) => {
                log::warn!("Generative matching failed for '{}': {}", resume.id, e);
                Ok(fallback_result(resume, job, skill, Strategy::Generative))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Deterministic transport: pops scripted replies in order; the last
    /// reply repeats once the script is exhausted.
    struct MockClient {
        replies: RefCell<Vec<std::result::Result<String, ClientError>>>,
        calls: RefCell<u32>,
    }

    impl MockClient {
        fn new(replies: Vec<std::result::Result<String, ClientError>>) -> Self {
            Self {
                replies: RefCell::new(replies),
                calls: RefCell::new(0),
            }
        }
    }

    impl GenerativeClient for Rc<MockClient> {
        fn complete(&self, _system: &str, _user: &str) -> std::result::Result<String, ClientError> {
            *self.calls.borrow_mut() += 1;
            let mut replies = self.replies.borrow_mut();
            if replies.len() > 1 {
                replies.remove(0)
            } else {
                match replies.first() {
                    Some(Ok(s)) => Ok(s.clone()),
                    Some(Err(ClientError::Transient(m))) => Err(ClientError::Transient(m.clone())),
                    Some(Err(ClientError::Fatal(m))) => Err(ClientError::Fatal(m.clone())),
                    None => Err(ClientError::Fatal("script exhausted".to_string())),
                }
            }
        }
    }

    fn matcher_with(replies: Vec<std::result::Result<String, ClientError>>) -> GenerativeMatcher {
        GenerativeMatcher::with_client(
            Box::new(Rc::new(MockClient::new(replies))),
            &Config::default(),
        )
    }

    fn resume() -> Resume {
        Resume::new("cv-1", "Python developer", None, vec!["python".into()])
    }

    fn job() -> Job {
        Job::new(
            "job-1",
            "Backend Engineer",
            None,
            "Python services",
            vec!["python".into(), "django".into()],
            vec![],
        )
    }

    #[test]
    fn parses_structured_score_and_rationale() {
        let matcher = matcher_with(vec![Ok(
            r#"{"score": 0.9, "reason": "Strong Python background"}"#.to_string(),
        )]);

        let result = matcher.match_one(&resume(), &job()).unwrap();

        assert_eq!(result.matching_method, "generative");
        assert_eq!(result.explanation, "Strong Python background");
        assert!((result.similarity - 0.9).abs() < 1e-6);
        // skills_match = 1/2; overall = 0.7 * 0.9 + 0.3 * 0.5
        let expected = 0.7 * 0.9 + 0.3 * 0.5;
        assert!((result.overall_score - expected).abs() < 1e-6);
    }

    #[test]
    fn strips_markdown_fences_before_parsing() {
        let matcher = matcher_with(vec![Ok(
            "```json\n{\"score\": 0.4, \"reason\": \"partial fit\"}\n```".to_string(),
        )]);

        let result = matcher.match_one(&resume(), &job()).unwrap();

        assert_eq!(result.matching_method, "generative");
        assert!((result.similarity - 0.4).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_score_is_clamped() {
        let parsed = parse_score_response(r#"{"score": 1.7, "reason": "x"}"#).unwrap();
        assert_eq!(parsed.score, 1.0);
    }

    #[test]
    fn timeout_falls_back_to_skill_overlap() {
        let matcher = matcher_with(vec![
            Err(ClientError::Transient("timed out".to_string())),
            Err(ClientError::Transient("timed out".to_string())),
        ]);

        let result = matcher.match_one(&resume(), &job()).unwrap();

        assert_eq!(result.matching_method, "generative_fallback");
        assert_eq!(result.overall_score, result.skills_match);
        assert!(result.explanation.is_empty());
    }

    #[test]
    fn transient_failure_is_retried_once() {
        let client = Rc::new(MockClient::new(vec![
            Err(ClientError::Transient("blip".to_string())),
            Ok(r#"{"score": 0.6, "reason": "ok"}"#.to_string()),
        ]));
        let matcher =
            GenerativeMatcher::with_client(Box::new(Rc::clone(&client)), &Config::default());

        let result = matcher.match_one(&resume(), &job()).unwrap();

        assert_eq!(result.matching_method, "generative");
        // One failed attempt plus one successful retry.
        assert_eq!(*client.calls.borrow(), 2);
    }

    #[test]
    fn quota_rejection_is_not_retried() {
        let client = Rc::new(MockClient::new(vec![Err(ClientError::Fatal(
            "status 429".to_string(),
        ))]));
        let matcher =
            GenerativeMatcher::with_client(Box::new(Rc::clone(&client)), &Config::default());

        let result = matcher.match_one(&resume(), &job()).unwrap();

        assert_eq!(result.matching_method, "generative_fallback");
        assert_eq!(*client.calls.borrow(), 1);
    }

    #[test]
    fn malformed_response_falls_back() {
        let matcher = matcher_with(vec![Ok("I cannot rate this candidate.".to_string())]);

        let result = matcher.match_one(&resume(), &job()).unwrap();

        assert_eq!(result.matching_method, "generative_fallback");
        assert_eq!(result.overall_score, result.skills_match);
        assert!(result.explanation.is_empty());
    }

    #[test]
    fn bare_score_is_salvaged_from_invalid_json() {
        let parsed = parse_score_response(r#"score follows: {"score": 0.55, oops"#).unwrap();
        assert!((parsed.score - 0.55).abs() < 1e-6);
        assert!(!parsed.explanation.is_empty());
    }

    #[test]
    fn mocked_backend_is_deterministic() {
        let reply = r#"{"score": 0.8, "reason": "same"}"#.to_string();
        let first = matcher_with(vec![Ok(reply.clone())])
            .match_one(&resume(), &job())
            .unwrap();
        let second = matcher_with(vec![Ok(reply)])
            .match_one(&resume(), &job())
            .unwrap();

        assert_eq!(first.overall_score, second.overall_score);
        assert_eq!(first.similarity, second.similarity);
        assert_eq!(first.explanation, second.explanation);
    }

    #[test]
    fn stub_reports_fallback_method() {
        let matcher = GenerativeMatcher::stub(&Config::default());
        let result = matcher.match_one(&resume(), &job()).unwrap();
        assert_eq!(result.matching_method, "generative_fallback");
    }
}
