//! Term-frequency / inverse-document-frequency vectorizer
//!
//! Fits over a small corpus (typically one resume plus one job text),
//! producing L2-normalized dense vectors over a capped vocabulary of
//! unigrams and bigrams. Smooth idf weighting keeps terms present in every
//! document from zeroing out.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    english_stop_words: bool,
}

impl TfidfVectorizer {
    /// Fit a vocabulary and idf weights over `documents`. The vocabulary is
    /// capped to the `max_features` most frequent terms across the corpus,
    /// ties broken alphabetically.
    pub fn fit(documents: &[&str], max_features: usize, english_stop_words: bool) -> Self {
        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| tokenize(doc, english_stop_words))
            .collect();

        let mut corpus_counts: HashMap<&str, usize> = HashMap::new();
        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for tokens in &tokenized {
            let mut seen = HashSet::new();
            for token in tokens {
                *corpus_counts.entry(token.as_str()).or_insert(0) += 1;
                if seen.insert(token.as_str()) {
                    *document_frequency.entry(token.as_str()).or_insert(0) += 1;
                }
            }
        }

        let mut terms: Vec<(&str, usize)> = corpus_counts.into_iter().collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        terms.truncate(max_features);

        let mut kept: Vec<&str> = terms.into_iter().map(|(term, _)| term).collect();
        kept.sort_unstable();

        let n_documents = documents.len() as f32;
        let mut vocabulary = HashMap::with_capacity(kept.len());
        let mut idf = Vec::with_capacity(kept.len());
        for (index, term) in kept.into_iter().enumerate() {
            let df = document_frequency.get(term).copied().unwrap_or(0) as f32;
            vocabulary.insert(term.to_string(), index);
            idf.push(((1.0 + n_documents) / (1.0 + df)).ln() + 1.0);
        }

        Self {
            vocabulary,
            idf,
            english_stop_words,
        }
    }

    /// Transform a text into an L2-normalized dense tf-idf vector over the
    /// fitted vocabulary. Out-of-vocabulary terms are ignored.
    pub fn transform(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.idf.len()];
        for token in tokenize(text, self.english_stop_words) {
            if let Some(&index) = self.vocabulary.get(token.as_str()) {
                vector[index] += 1.0;
            }
        }
        for (value, idf) in vector.iter_mut().zip(self.idf.iter()) {
            *value *= idf;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Lowercased unigrams and bigrams; words shorter than two characters and
/// (optionally) English stop words are dropped before bigram generation.
fn tokenize(text: &str, english_stop_words: bool) -> Vec<String> {
    let words: Vec<String> = text
        .unicode_words()
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() >= 2)
        .filter(|w| !english_stop_words || !super::ENGLISH_STOP_WORDS.contains(&w.as_str()))
        .collect();

    let mut tokens = words.clone();
    for pair in words.windows(2) {
        tokens.push(format!("{} {}", pair[0], pair[1]));
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_emits_unigrams_and_bigrams() {
        let tokens = tokenize("Python developer builds services", false);
        assert!(tokens.contains(&"python".to_string()));
        assert!(tokens.contains(&"python developer".to_string()));
        assert!(tokens.contains(&"builds services".to_string()));
    }

    #[test]
    fn stop_words_are_removed_before_bigrams() {
        let tokens = tokenize("experience with python", true);
        assert!(!tokens.iter().any(|t| t.contains("with")));
        assert!(tokens.contains(&"experience python".to_string()));
    }

    #[test]
    fn identical_documents_produce_identical_vectors() {
        let text = "rust engineer writing rust services";
        let vectorizer = TfidfVectorizer::fit(&[text, text], 100, true);
        assert_eq!(vectorizer.transform(text), vectorizer.transform(text));
    }

    #[test]
    fn transform_is_l2_normalized() {
        let vectorizer =
            TfidfVectorizer::fit(&["python django services", "rust tokio services"], 100, false);
        let vector = vectorizer.transform("python django services");
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn vocabulary_respects_max_features() {
        let vectorizer = TfidfVectorizer::fit(
            &["one two three four five", "six seven eight nine ten"],
            3,
            false,
        );
        assert_eq!(vectorizer.vocabulary_len(), 3);
    }

    #[test]
    fn out_of_vocabulary_text_maps_to_zero_vector() {
        let vectorizer = TfidfVectorizer::fit(&["python django"], 100, false);
        let vector = vectorizer.transform("haskell prolog");
        assert!(vector.iter().all(|v| *v == 0.0));
    }
}
