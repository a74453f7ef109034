//! Job value type, supplied by the caller or job storage

use serde::{Deserialize, Deserializer, Serialize};

/// A job posting. Immutable after construction; `full_text` is computed once
/// from the source fields with fixed separators, so equal inputs always
/// produce the same matching text.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: Option<String>,
    pub description: String,
    /// Lowercased, deduplicated required skills.
    pub required_skills: Vec<String>,
    /// Lowercased, deduplicated nice-to-have skills.
    pub nice_to_have_skills: Vec<String>,
    /// Text unit embedded/vectorized by the matchers.
    pub full_text: String,
}

impl Job {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        company: Option<String>,
        description: impl Into<String>,
        required_skills: Vec<String>,
        nice_to_have_skills: Vec<String>,
    ) -> Self {
        let title = title.into();
        let description = description.into();
        let required_skills = super::normalize_skills(required_skills);
        let nice_to_have_skills = super::normalize_skills(nice_to_have_skills);

        let mut parts = vec![format!("Job Title: {}", title)];
        if let Some(company) = company.as_deref() {
            if !company.trim().is_empty() {
                parts.push(format!("Company: {}", company.trim()));
            }
        }
        parts.push(format!("\nDescription:\n{}", description));
        if !required_skills.is_empty() {
            parts.push(format!("\nRequired Skills: {}", required_skills.join(", ")));
        }
        if !nice_to_have_skills.is_empty() {
            parts.push(format!("\nNice to Have: {}", nice_to_have_skills.join(", ")));
        }
        let full_text = parts.join("\n");

        Self {
            id: id.into(),
            title,
            company,
            description,
            required_skills,
            nice_to_have_skills,
            full_text,
        }
    }
}

/// Deserialization re-runs the constructor so normalization and the derived
/// `full_text` hold for externally supplied records too.
impl<'de> Deserialize<'de> for Job {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct JobRecord {
            id: String,
            title: String,
            #[serde(default)]
            company: Option<String>,
            #[serde(default)]
            description: String,
            #[serde(default)]
            required_skills: Vec<String>,
            #[serde(default)]
            nice_to_have_skills: Vec<String>,
        }

        let record = JobRecord::deserialize(deserializer)?;
        Ok(Job::new(
            record.id,
            record.title,
            record.company,
            record.description,
            record.required_skills,
            record.nice_to_have_skills,
        ))
    }
}
