//! Value types exchanged with the parsing and storage collaborators

pub mod job;
pub mod resume;
pub mod result;

pub use job::Job;
pub use resume::Resume;
pub use result::MatchResult;

use std::collections::HashSet;

/// Case-normalize and deduplicate a skill list, preserving first-occurrence
/// order. Shared by [`Resume`] and [`Job`] construction.
pub(crate) fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_dedupes() {
        let skills = vec![
            "Python".to_string(),
            "  python ".to_string(),
            "Docker".to_string(),
            "".to_string(),
        ];
        assert_eq!(normalize_skills(skills), vec!["python", "docker"]);
    }
}
