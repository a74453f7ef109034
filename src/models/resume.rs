//! Resume value type, produced by the external parsing collaborator

use serde::{Deserialize, Deserializer, Serialize};

/// A parsed resume. Constructed once, immutable thereafter: the constructor
/// normalizes the skill set and derives `full_text`, and no mutation API is
/// exposed.
#[derive(Debug, Clone, Serialize)]
pub struct Resume {
    /// Stable identifier (file name or storage id).
    pub id: String,
    pub raw_text: String,
    pub summary: Option<String>,
    /// Lowercased, deduplicated skill strings.
    pub skills: Vec<String>,
    /// Text unit embedded/vectorized by the matchers: summary followed by
    /// the raw text.
    pub full_text: String,
}

impl Resume {
    pub fn new(
        id: impl Into<String>,
        raw_text: impl Into<String>,
        summary: Option<String>,
        skills: Vec<String>,
    ) -> Self {
        let raw_text = raw_text.into();
        let full_text = match summary.as_deref() {
            Some(summary) if !summary.trim().is_empty() => {
                format!("Summary: {}\n\n{}", summary.trim(), raw_text)
            }
            _ => raw_text.clone(),
        };

        Self {
            id: id.into(),
            raw_text,
            summary,
            skills: super::normalize_skills(skills),
            full_text,
        }
    }
}

/// Deserialization re-runs the constructor so skill normalization and the
/// derived `full_text` hold for externally supplied records too.
impl<'de> Deserialize<'de> for Resume {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ResumeRecord {
            id: String,
            #[serde(default)]
            raw_text: String,
            #[serde(default)]
            summary: Option<String>,
            #[serde(default)]
            skills: Vec<String>,
        }

        let record = ResumeRecord::deserialize(deserializer)?;
        Ok(Resume::new(
            record.id,
            record.raw_text,
            record.summary,
            record.skills,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skills_are_normalized_at_construction() {
        let resume = Resume::new(
            "cv-1",
            "Worked with Python and Docker.",
            None,
            vec!["Python".into(), "PYTHON".into(), "Docker".into()],
        );
        assert_eq!(resume.skills, vec!["python", "docker"]);
    }

    #[test]
    fn full_text_includes_summary_when_present() {
        let resume = Resume::new(
            "cv-1",
            "raw body",
            Some("Backend engineer".into()),
            vec![],
        );
        assert!(resume.full_text.starts_with("Summary: Backend engineer"));
        assert!(resume.full_text.ends_with("raw body"));
    }

    #[test]
    fn deserialization_applies_normalization() {
        let resume: Resume = serde_json::from_str(
            r#"{"id": "cv-2", "raw_text": "text", "skills": ["Rust", "rust", "Go"]}"#,
        )
        .unwrap();
        assert_eq!(resume.skills, vec!["rust", "go"]);
        assert_eq!(resume.full_text, "text");
    }
}
