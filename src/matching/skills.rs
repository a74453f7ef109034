//! Skill-overlap scorer shared by every matching strategy

use crate::models::{Job, Resume};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct SkillMatch {
    /// Fraction of required skills present in the resume, in [0, 1].
    pub score: f32,
    /// Required skills found in the resume, in job order.
    pub matched: Vec<String>,
    /// Required skills absent from the resume, in job order.
    pub missing: Vec<String>,
}

/// Case-insensitive overlap between the resume's skills and the job's
/// required skills. Both sides are already normalized at construction, so
/// this reduces to exact set intersection.
///
/// A job without required skills is trivially fully matched: score 1.0 with
/// both lists empty.
pub fn skill_match(resume: &Resume, job: &Job) -> SkillMatch {
    if job.required_skills.is_empty() {
        return SkillMatch {
            score: 1.0,
            matched: Vec::new(),
            missing: Vec::new(),
        };
    }

    let resume_skills: HashSet<&str> = resume.skills.iter().map(String::as_str).collect();

    let (matched, missing): (Vec<String>, Vec<String>) = job
        .required_skills
        .iter()
        .cloned()
        .partition(|skill| resume_skills.contains(skill.as_str()));

    let score = matched.len() as f32 / job.required_skills.len() as f32;

    SkillMatch {
        score,
        matched,
        missing,
    }
}
